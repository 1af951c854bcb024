use std::fs;
use std::sync::Arc;

use tmplpack::artifact::Action;
use tmplpack::core::BundleError;
use tmplpack::service::{Outcome, TemplateService};
use tmplpack::test_utils::TemplateFixture;
use tmplpack::test_utils::fixtures::at;
use tmplpack::utils::fs::set_modified_time;

use crate::common::{bindings, stored_path};

#[test]
fn test_persist_writes_under_prefix() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.persist_config("/views")).unwrap();

    let outcome = service.handle("GET", "/views/directory/subdirectory.js").unwrap();
    let path = stored_path(&outcome);
    assert_eq!(path, fixture.public().join("views").join("directory").join("subdirectory.js"));
    assert_eq!(outcome.action(), Some(Action::Rebuild));

    let body = fs::read_to_string(&path).unwrap();
    assert_eq!(bindings(&body), vec!["T", "T.baz"]);

    let root = stored_path(&service.handle("GET", "/views.js").unwrap());
    assert_eq!(root, fixture.public().join("views.js"));
}

#[test]
fn test_second_request_reuses_artifact() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.persist_config("/views")).unwrap();

    let first = service.handle("GET", "/views/multiple.js").unwrap();
    assert_eq!(first.action(), Some(Action::Rebuild));
    let path = stored_path(&first);
    let written = fs::metadata(&path).unwrap().modified().unwrap();

    let second = service.handle("HEAD", "/views/multiple.js").unwrap();
    assert_eq!(second.action(), Some(Action::Reuse));
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), written);
}

#[test]
fn test_stale_artifact_is_rebuilt() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.persist_config("/views")).unwrap();

    let path = stored_path(&service.handle("GET", "/views/directory.js").unwrap());
    // Pretend the artifact was written before the newest template under it.
    set_modified_time(&path, at(135)).unwrap();

    let outcome = service.handle("GET", "/views/directory.js").unwrap();
    assert_eq!(outcome.action(), Some(Action::Rebuild));

    // Exactly as new as the subtree counts as current.
    set_modified_time(&path, at(140)).unwrap();
    let outcome = service.handle("GET", "/views/directory.js").unwrap();
    assert_eq!(outcome.action(), Some(Action::Reuse));
}

#[test]
fn test_unrelated_change_keeps_artifact() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.persist_config("/views")).unwrap();

    let path = stored_path(&service.handle("GET", "/views/directory.js").unwrap());
    set_modified_time(&path, at(1_000)).unwrap();

    fixture.write("single.tmpl", "<p>changed</p>", 2_000).unwrap();
    service.rebuild().unwrap();

    assert_eq!(service.handle("GET", "/views/directory.js").unwrap().action(), Some(Action::Reuse));
    assert_eq!(service.handle("GET", "/views.js").unwrap().action(), Some(Action::Rebuild));
}

#[test]
fn test_respond_mode_keeps_artifacts_in_memory() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    let Outcome::Inline { artifact: first, action } = service.handle("GET", "/views/both.js").unwrap() else {
        panic!("expected inline outcome");
    };
    assert_eq!(action, Action::Rebuild);
    assert_eq!(first.content_type(), "application/javascript");

    let Outcome::Inline { artifact: second, action } = service.handle("GET", "/views/both.js").unwrap() else {
        panic!("expected inline outcome");
    };
    assert_eq!(action, Action::Reuse);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(!fixture.public().exists());
}

#[test]
fn test_storage_failure_leaves_tree_intact() {
    let fixture = TemplateFixture::sample().unwrap();
    fs::create_dir_all(fixture.public()).unwrap();
    fs::write(fixture.public().join("views"), "occupied").unwrap();
    let service = TemplateService::new(fixture.persist_config("/views")).unwrap();
    let before = service.tree();

    let error = service.handle("GET", "/views/single.js").unwrap_err();
    assert!(matches!(error, BundleError::Storage { .. }));
    assert!(Arc::ptr_eq(&before, &service.tree()));
}

#[test]
fn test_concurrent_requests_for_same_artifact() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = Arc::new(TemplateService::new(fixture.persist_config("/views")).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || service.handle("GET", "/views.js").unwrap())
        })
        .collect();

    for handle in handles {
        let outcome = handle.join().unwrap();
        assert!(matches!(outcome, Outcome::Stored { .. }));
    }

    let body = fs::read_to_string(fixture.public().join("views.js")).unwrap();
    assert!(body.ends_with("})();"));
    assert_eq!(bindings(&body).len(), service.tree().len());
}
