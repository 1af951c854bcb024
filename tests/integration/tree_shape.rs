use tmplpack::service::TemplateService;
use tmplpack::test_utils::{TemplateFixture, init_test_logging};
use tmplpack::tree::{KeyPath, UnitOrigin};

use crate::common::{bindings, inline_body};

fn key_paths(service: &TemplateService) -> Vec<String> {
    service.tree().key_paths().iter().map(ToString::to_string).collect()
}

#[test]
fn test_sample_tree_shape() {
    init_test_logging(None);
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    // Files before directories at each level, each group in name order.
    assert_eq!(
        key_paths(&service),
        vec![
            "both",
            "both/Header",
            "both/foo",
            "multiple",
            "multiple/First",
            "multiple/Second",
            "single",
            "directory",
            "directory/bar",
            "directory/foo",
            "directory/subdirectory",
            "directory/subdirectory/baz",
        ]
    );
}

#[test]
fn test_single_file_artifact() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    let body = inline_body(&service.handle("GET", "/views/single.js").unwrap());
    assert_eq!(bindings(&body), vec!["T"]);
    assert!(body.contains("<p>{{ message }}</p>"));
    assert!(body.contains("module.exports.Templates = T : window.Templates = T;"));
}

#[test]
fn test_inline_blocks_artifact() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    let body = inline_body(&service.handle("GET", "/views/multiple.js").unwrap());
    assert_eq!(bindings(&body), vec!["T", "T.First", "T.Second"]);
}

#[test]
fn test_directory_artifact() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    let body = inline_body(&service.handle("GET", "/views/directory.js").unwrap());
    assert_eq!(bindings(&body), vec!["T", "T.bar", "T.foo", "T.subdirectory", "T.subdirectory.baz"]);
    // The placeholder binds an empty renderer.
    assert!(body.contains("T = function anonymous(locals) {\nreturn \"\";\n};"));
}

#[test]
fn test_file_and_directory_merge() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    let body = inline_body(&service.handle("GET", "/views/both.js").unwrap());
    assert_eq!(bindings(&body), vec!["T", "T.Header", "T.foo"]);
    assert!(body.contains("<h1>both</h1>"));

    let tree = service.tree();
    let both = tree.resolve(&KeyPath::parse("both")).unwrap();
    assert!(matches!(tree.unit(both).origin(), UnitOrigin::File(_)));
}

#[test]
fn test_root_artifact_binds_every_unit() {
    let fixture = TemplateFixture::new().unwrap();
    fixture.write("a.tmpl", "A\n//-- X.tmpl\nX\n", 10).unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    let body = inline_body(&service.handle("GET", "/views.js").unwrap());
    assert_eq!(bindings(&body), vec!["T", "T.a", "T.a.X"]);

    let sub = inline_body(&service.handle("GET", "/views/a.js").unwrap());
    assert_eq!(bindings(&sub), vec!["T", "T.X"]);
}

#[test]
fn test_block_names_that_are_not_identifiers() {
    let fixture = TemplateFixture::new().unwrap();
    fixture.write("list.tmpl", "//-- Row.item.tmpl\n<li/>\n//-- row-alt.tmpl\n<li/>\n", 10).unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    let body = inline_body(&service.handle("GET", "/views/list.js").unwrap());
    assert_eq!(bindings(&body), vec!["T", r#"T["Row.item"]"#, r#"T["row-alt"]"#]);
}

#[test]
fn test_custom_global_name() {
    let fixture = TemplateFixture::sample().unwrap();
    let mut config = fixture.respond_config("/views");
    config.global = "Views".to_string();
    let service = TemplateService::new(config).unwrap();

    let body = inline_body(&service.handle("GET", "/views/single.js").unwrap());
    assert!(body.contains("module.exports.Views = T : window.Views = T;"));
}
