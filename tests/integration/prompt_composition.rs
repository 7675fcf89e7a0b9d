//! Composition through the public session API: the prompt and reference
//! list that actually reach the backend.

use crate::integration::test_utils::{demo_catalog, ready_session};
use adloom::compose::{compose, ComposeInput};
use adloom::error::OrchestratorError;
use adloom::provider::mock::ScriptedBackend;
use std::collections::HashMap;

#[tokio::test(start_paused = true)]
async fn dispatched_prompt_carries_all_paragraphs() {
    let backend = ScriptedBackend::new()
        .submit_accepted("remote-1")
        .then_succeeded("https://cdn.test/ad.png");
    let mut session = ready_session(backend);
    session
        .wizard_mut()
        .set_field_value("headline", "Acme Rockets".to_string());

    let result = session.generate_image().await.unwrap();
    let paragraphs: Vec<&str> = result.prompt.split("\n\n").collect();
    assert_eq!(paragraphs[0], "An ad for Acme Rockets");
    assert_eq!(paragraphs[1], "Acme builds delightful rockets.");
    assert_eq!(paragraphs[2], "bold colors, high contrast");
}

#[test]
fn reference_order_is_logo_selection_then_fields() {
    let catalog = demo_catalog();
    let input = ComposeInput {
        brand_id: "brand-acme".to_string(),
        style_id: "style-bold".to_string(),
        template_id: "tmpl-launch".to_string(),
        field_values: HashMap::from([(
            "hero_shot".to_string(),
            "https://img.test/hero.png".to_string(),
        )]),
        selected_reference_images: vec![
            "https://img.test/ref-b.png".to_string(),
            "https://img.test/ref-a.png".to_string(),
        ],
    };
    let out = compose(catalog.as_ref(), &input).unwrap();
    assert_eq!(
        out.reference_images,
        vec![
            "https://img.test/logo.png",
            "https://img.test/ref-b.png",
            "https://img.test/ref-a.png",
            "https://img.test/hero.png",
        ]
    );
}

#[test]
fn unresolvable_style_is_a_composition_error() {
    let catalog = demo_catalog();
    let input = ComposeInput {
        brand_id: "brand-acme".to_string(),
        style_id: "style-missing".to_string(),
        template_id: "tmpl-launch".to_string(),
        field_values: HashMap::new(),
        selected_reference_images: Vec::new(),
    };
    let err = compose(catalog.as_ref(), &input).unwrap_err();
    assert!(matches!(err, OrchestratorError::Composition(_)));
}

#[tokio::test(start_paused = true)]
async fn unfilled_placeholder_survives_to_the_prompt() {
    let backend = ScriptedBackend::new()
        .submit_accepted("remote-1")
        .then_succeeded("https://cdn.test/ad.png");
    let mut session = ready_session(backend);

    let result = session.generate_image().await.unwrap();
    assert!(result.prompt.contains("{{headline}}"));
}
