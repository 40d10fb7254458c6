use deferref_cli::config::{BindingConfig, ConfigError, HostConfig};
use deferref_cli::{install, roundtrip, RoundtripRequest};
use deferref_core::{CollaboratorRegistry, DeferredState, Format, LocatorKey};
use pretty_assertions::assert_eq;
use std::io::Write;

const CONFIG: &str = r#"
default_key = "catalog.primary"

[[bindings]]
key = "catalog.primary"
connection = "memory://primary?token=TOP-SECRET-42"
entries = [
    { id = 1, value = "portrait-001.jpg" },
    { id = 2, value = "portrait-002.jpg" },
]

[[bindings]]
key = "catalog.archive"
entries = [{ id = 1, value = "archived-001.jpg" }]
"#;

fn load_from_file() -> HostConfig {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    HostConfig::load(file.path()).unwrap()
}

fn request(id: u64, key: &str, format: Format) -> RoundtripRequest {
    RoundtripRequest {
        id,
        name: "Alice".to_string(),
        key: LocatorKey::new(key),
        format,
    }
}

#[test]
fn test_install_binds_configured_keys() {
    let registry = CollaboratorRegistry::<u64, String>::new();
    let keys = install(&load_from_file(), &registry).unwrap();

    let names: Vec<_> = keys.iter().map(LocatorKey::as_str).collect();
    assert_eq!(names, vec!["catalog.primary", "catalog.archive"]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_install_rejects_invalid_config_without_binding() {
    let registry = CollaboratorRegistry::<u64, String>::new();
    let config = HostConfig::new()
        .with_binding(BindingConfig::new("catalog.primary"))
        .with_binding(BindingConfig::new("catalog.primary"));

    assert!(matches!(install(&config, &registry), Err(ConfigError::DuplicateKey(_))));
    assert!(registry.is_empty());
}

#[test]
fn test_load_missing_file() {
    let err = HostConfig::load("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[tokio::test]
async fn test_roundtrip_json() {
    let registry = CollaboratorRegistry::<u64, String>::new();
    install(&load_from_file(), &registry).unwrap();

    let report = roundtrip(&registry, request(2, "catalog.primary", Format::Json))
        .await
        .unwrap();

    assert_eq!(
        report.unresolved_payload,
        r#"{"id":2,"data":"Alice","locator":"catalog.primary"}"#
    );
    assert_eq!(
        report.resolved_payload,
        r#"{"id":2,"data":"Alice","locator":"catalog.primary","deferred":"portrait-002.jpg"}"#
    );
    assert_eq!(report.deferred, "portrait-002.jpg");
    assert_eq!(report.decoded_state, DeferredState::Resolved);
    assert_eq!(report.re_resolved, "portrait-002.jpg");
    assert!(!report.resolved_payload.contains("TOP-SECRET"));
    assert!(report.generate_text().contains("Re-resolved after decode: portrait-002.jpg"));
}

#[tokio::test]
async fn test_roundtrip_yaml_with_second_binding() {
    let registry = CollaboratorRegistry::<u64, String>::new();
    install(&load_from_file(), &registry).unwrap();

    let report = roundtrip(&registry, request(1, "catalog.archive", Format::Yaml))
        .await
        .unwrap();

    assert_eq!(report.deferred, "archived-001.jpg");
    assert!(report.resolved_payload.contains("locator: catalog.archive"));
    assert!(!report.unresolved_payload.contains("deferred"));
}

#[tokio::test]
async fn test_roundtrip_unbound_key_fails() {
    let registry = CollaboratorRegistry::<u64, String>::new();
    let err = roundtrip(&registry, request(1, "catalog.primary", Format::Json))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("no binding for locator key 'catalog.primary'"));
}

#[tokio::test]
async fn test_roundtrip_unknown_id_fails() {
    let registry = CollaboratorRegistry::<u64, String>::new();
    install(&load_from_file(), &registry).unwrap();

    let err = roundtrip(&registry, request(77, "catalog.primary", Format::Json))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("catalog has no entry for id 77"));
}
