use tmplpack::core::BundleError;
use tmplpack::service::{Outcome, TemplateService};
use tmplpack::test_utils::TemplateFixture;
use tmplpack::tree::KeyPath;

use crate::common::{bindings, inline_body};

fn service() -> (TemplateFixture, TemplateService) {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("/static/views")).unwrap();
    (fixture, service)
}

#[test]
fn test_nested_prefix() {
    let (_fixture, service) = service();

    let body = inline_body(&service.handle("GET", "/static/views/directory/subdirectory/baz.js").unwrap());
    assert_eq!(bindings(&body), vec!["T"]);
    assert!(matches!(service.handle("GET", "/static/views.js").unwrap(), Outcome::Inline { .. }));
}

#[test]
fn test_query_string_ignored() {
    let (_fixture, service) = service();
    let outcome = service.handle("GET", "/static/views/single.js?v=42#top").unwrap();
    assert!(matches!(outcome, Outcome::Inline { .. }));
}

#[test]
fn test_empty_segments_dropped() {
    let (_fixture, service) = service();
    assert_eq!(
        service.key_path_for_url("/static/views//directory///foo.js"),
        Some(KeyPath::parse("directory/foo"))
    );
}

#[test]
fn test_pass_through_cases() {
    let (_fixture, service) = service();

    for (method, url) in [
        ("POST", "/static/views/single.js"),
        ("DELETE", "/static/views.js"),
        ("GET", "/static/views/unknown.js"),
        ("GET", "/static/views/single/extra.js"),
        ("GET", "/static/views/single.css"),
        ("GET", "/static/viewsingle.js"),
        ("GET", "/static/views/.js"),
        ("GET", "/elsewhere/single.js"),
        ("GET", "/"),
    ] {
        let outcome = service.handle(method, url).unwrap();
        assert!(outcome.is_pass_through(), "{method} {url} should pass through, got {outcome:?}");
    }
}

#[test]
fn test_prefix_normalized_from_config() {
    let fixture = TemplateFixture::sample().unwrap();
    let config = fixture.respond_config("views/").normalize().unwrap();
    assert_eq!(config.prefix, "/views");

    let service = TemplateService::new(config).unwrap();
    assert!(!service.handle("GET", "/views/single.js").unwrap().is_pass_through());
}

#[test]
fn test_service_normalizes_prefix() {
    let fixture = TemplateFixture::sample().unwrap();
    let service = TemplateService::new(fixture.respond_config("views/")).unwrap();

    assert_eq!(service.config().prefix, "/views");
    assert!(!service.handle("GET", "/views/single.js").unwrap().is_pass_through());
    assert!(!service.handle("GET", "/views.js").unwrap().is_pass_through());
}

#[test]
fn test_service_rejects_invalid_config() {
    let fixture = TemplateFixture::sample().unwrap();

    let mut config = fixture.respond_config("/views");
    config.global = "Templates = evil; x".to_string();
    assert!(matches!(TemplateService::new(config), Err(BundleError::InvalidConfig { .. })));

    let mut config = fixture.respond_config("/views");
    config.extension = ".tmpl".to_string();
    assert!(matches!(TemplateService::new(config), Err(BundleError::InvalidConfig { .. })));

    assert!(matches!(
        TemplateService::new(fixture.respond_config("/")),
        Err(BundleError::InvalidConfig { .. })
    ));
}
