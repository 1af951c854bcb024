use std::time::UNIX_EPOCH;

use tmplpack::service::TemplateService;
use tmplpack::test_utils::TemplateFixture;
use tmplpack::test_utils::fixtures::at;
use tmplpack::tree::KeyPath;

#[test]
fn test_ancestors_absorb_newest_leaf() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();
    let tree = service.tree();

    let freshness = |path: &str| tree.effective_freshness(tree.resolve(&KeyPath::parse(path)).unwrap());

    assert_eq!(freshness("directory/subdirectory/baz"), at(140));
    assert_eq!(freshness("directory/subdirectory"), at(140));
    assert_eq!(freshness("directory"), at(140));
    assert_eq!(freshness("both"), at(160));
    assert_eq!(tree.effective_freshness(tree.root()), at(160));
}

#[test]
fn test_blocks_match_owner_after_merge() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();
    let tree = service.tree();

    let both = tree.resolve(&KeyPath::parse("both")).unwrap();
    let header = tree.resolve(&KeyPath::parse("both/Header")).unwrap();
    // both.tmpl is stamped 150, both/foo.tmpl is 160 and raises its owner.
    assert_eq!(tree.effective_freshness(both), at(160));
    assert_eq!(tree.effective_freshness(header), tree.effective_freshness(both));
    assert_eq!(tree.unit(header).own_freshness(), None);
}

#[test]
fn test_monotonic_after_bump() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    fixture.touch("views/directory/subdirectory/baz.tmpl", 5_000).unwrap();
    let tree = service.rebuild().unwrap();

    let mut current = tree.resolve(&KeyPath::parse("directory/subdirectory/baz"));
    while let Some(id) = current {
        assert!(tree.effective_freshness(id) >= at(5_000));
        current = tree.unit(id).parent();
    }

    // Siblings outside the bumped chain keep their own stamps.
    let single = tree.resolve(&KeyPath::parse("single")).unwrap();
    assert_eq!(tree.effective_freshness(single), at(100));
}

#[test]
fn test_empty_directory_placeholder_is_epoch() {
    let fixture = TemplateFixture::new().unwrap();
    std::fs::create_dir(fixture.source().join("empty")).unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();
    let tree = service.tree();

    let empty = tree.resolve(&KeyPath::parse("empty")).unwrap();
    assert_eq!(tree.effective_freshness(empty), UNIX_EPOCH);
}
