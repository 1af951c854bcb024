use std::fs;

use tmplpack::artifact::Action;
use tmplpack::service::TemplateService;
use tmplpack::test_utils::TemplateFixture;

use crate::common::{inline_body, stored_path};

#[test]
fn test_reload_off_serves_previous_artifact() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.persist_config("/views")).unwrap();

    let path = stored_path(&service.handle("GET", "/views/single.js").unwrap());
    let before = fs::read_to_string(&path).unwrap();

    fixture.write("single.tmpl", "junk", 5_000).unwrap();

    let outcome = service.handle("GET", "/views/single.js").unwrap();
    assert_eq!(outcome.action(), Some(Action::Reuse));
    let after = fs::read_to_string(stored_path(&outcome)).unwrap();
    assert_eq!(before, after);
    assert!(!after.contains("junk"));
}

#[test]
fn test_reload_on_reflects_changes() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.persist_config("/views").with_reload(true)).unwrap();

    let path = stored_path(&service.handle("GET", "/views/single.js").unwrap());
    assert!(!fs::read_to_string(&path).unwrap().contains("junk"));

    fixture.write("single.tmpl", "junk", 100).unwrap();

    let outcome = service.handle("GET", "/views/single.js").unwrap();
    assert_eq!(outcome.action(), Some(Action::Rebuild));
    assert!(fs::read_to_string(&path).unwrap().contains("junk"));
}

#[test]
fn test_reload_on_sees_new_files() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views").with_reload(true)).unwrap();

    assert!(service.handle("GET", "/views/added.js").unwrap().is_pass_through());

    fixture.write("added.tmpl", "new", 200).unwrap();
    let body = inline_body(&service.handle("GET", "/views/added.js").unwrap());
    assert!(body.contains("\"new\""));
}

#[test]
fn test_explicit_rebuild_replaces_placeholder() {
    let fixture = TemplateFixture::new().unwrap();
    fixture.write("panel/item.tmpl", "item", 10).unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    let placeholder = inline_body(&service.handle("GET", "/views/panel.js").unwrap());
    assert!(placeholder.contains("T = function anonymous(locals) {\nreturn \"\";\n};"));

    fixture.write("panel.tmpl", "<div>panel</div>", 20).unwrap();
    service.rebuild().unwrap();

    let real = inline_body(&service.handle("GET", "/views/panel.js").unwrap());
    assert!(real.contains("<div>panel</div>"));
    assert!(real.contains("T.item = "));
}

#[test]
fn test_explicit_rebuild_drops_deleted_template() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    let before = inline_body(&service.handle("GET", "/views/directory.js").unwrap());
    assert!(before.contains("T.foo = "));

    fs::remove_file(fixture.source().join("directory/foo.tmpl")).unwrap();
    service.rebuild().unwrap();

    let outcome = service.handle("GET", "/views/directory.js").unwrap();
    assert_eq!(outcome.action(), Some(Action::Rebuild));
    let after = inline_body(&outcome);
    assert!(!after.contains("T.foo = "));
    assert!(after.contains("T.bar = "));
}

#[test]
fn test_explicit_rebuild_with_restored_older_file() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views")).unwrap();

    assert!(inline_body(&service.handle("GET", "/views/single.js").unwrap()).contains("message"));

    // Content changes while the mtime moves back, as a checkout would do.
    fixture.write("single.tmpl", "<b>restored</b>", 50).unwrap();
    service.rebuild().unwrap();

    let body = inline_body(&service.handle("GET", "/views/single.js").unwrap());
    assert!(body.contains("<b>restored</b>"));
}

#[test]
fn test_reload_with_broken_template_fails_request() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/views").with_reload(true)).unwrap();

    fixture.write("single.tmpl", "{% for x in %}", 300).unwrap();
    let error = service.handle("GET", "/views/single.js").unwrap_err();
    assert!(error.is_build_error());
}
