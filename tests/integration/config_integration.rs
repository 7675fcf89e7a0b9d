//! Configuration loading from TOML files and defaults.

use adloom::config::AdloomConfig;
use adloom::types::GenerationKind;
use std::io::Write;


#[test]
fn load_with_no_file_uses_defaults() {
    let config = AdloomConfig::load(None).unwrap();
    assert_eq!(config.polling.interval_secs, 5);
    assert_eq!(config.polling.budget_for(GenerationKind::Image), 60);
    assert_eq!(config.polling.budget_for(GenerationKind::Video), 120);
    assert_eq!(config.pricing.image_base["4K"], 60);
}

#[test]
fn toml_file_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[polling]
interval_secs = 2
image_budget = 10

[pricing]
font_addon_points = 7

[backend]
base_url = "https://gen.example.com/api"
"#
    )
    .unwrap();

    let config = AdloomConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.polling.interval_secs, 2);
    assert_eq!(config.polling.budget_for(GenerationKind::Image), 10);
    // Unset keys keep their defaults.
    assert_eq!(config.polling.budget_for(GenerationKind::Video), 120);
    assert_eq!(config.pricing.font_addon_points, 7);
    assert_eq!(config.pricing.image_base["1K"], 27);
    assert_eq!(config.backend.base_url, "https://gen.example.com/api");
}

#[test]
fn invalid_values_are_rejected_with_all_problems() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[polling]
interval_secs = 0
image_budget = 0
"#
    )
    .unwrap();

    let err = AdloomConfig::load(Some(file.path())).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("interval_secs"));
    assert!(message.contains("budgets"));
}

#[test]
fn missing_file_is_an_error() {
    assert!(AdloomConfig::load(Some(std::path::Path::new("/nonexistent/adloom.toml"))).is_err());
}

#[test]
fn custom_video_rates_replace_the_table() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[[pricing.video_rates]]
model = "custom-model"
resolution = "720p"
points_per_second = 1.5
"#
    )
    .unwrap();

    let config = AdloomConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.pricing.video_rates.len(), 1);
    assert_eq!(config.pricing.video_rates[0].model, "custom-model");
}
