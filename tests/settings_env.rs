mod common;

// Kept alone in its own binary: it sets process-wide environment variables.

use std::io::Write;

use solrmap::query::CalculationAccuracy;
use solrmap::settings::Settings;

#[test]
fn environment_overrides_the_file() {
    common::init_tracing();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"[query]\ndefault_accuracy = \"radius\"\n\n[mapping]\ndefault_field = \"text\"\n")
        .unwrap();
    file.flush().unwrap();

    unsafe {
        std::env::set_var("SOLRMAP_QUERY__DEFAULT_ACCURACY", "bounding_box");
        std::env::set_var("SOLRMAP_MAPPING__DEFAULT_FIELD", "body");
    }
    let loaded = Settings::load(Some(file.path()));
    let without_file = Settings::load(None);
    unsafe {
        std::env::remove_var("SOLRMAP_QUERY__DEFAULT_ACCURACY");
        std::env::remove_var("SOLRMAP_MAPPING__DEFAULT_FIELD");
    }

    let settings = loaded.unwrap();
    assert_eq!(settings.query.default_accuracy, CalculationAccuracy::BoundingBox);
    assert_eq!(settings.mapping.default_field.as_deref(), Some("body"));
    let settings = without_file.unwrap();
    assert_eq!(settings.query.default_accuracy, CalculationAccuracy::BoundingBox);

    let restored = Settings::load(Some(file.path())).unwrap();
    assert_eq!(restored.query.default_accuracy, CalculationAccuracy::Radius);
    assert_eq!(restored.mapping.default_field.as_deref(), Some("text"));
}
