//! End-to-end wizard navigation and cascading invalidation.

use crate::integration::test_utils::{demo_catalog, ready_session, select_all};
use adloom::config::AdloomConfig;
use adloom::provider::mock::ScriptedBackend;
use adloom::session::Session;
use adloom::types::AspectRatio;
use adloom::wizard::{BrandSelection, WizardState, WizardStep};
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn full_wizard_walkthrough() {
    let backend = ScriptedBackend::new()
        .submit_accepted("remote-1")
        .then_processing(3)
        .then_succeeded("https://cdn.test/ad.png");
    let mut session = Session::new(AdloomConfig::default(), demo_catalog(), Arc::new(backend));

    // Gated at Brand until a brand is chosen.
    assert_eq!(session.wizard_mut().advance(), WizardStep::Brand);
    select_all(&mut session);
    assert_eq!(session.wizard_mut().advance(), WizardStep::Product);
    assert_eq!(session.wizard_mut().advance(), WizardStep::Generate);

    // Cannot advance past Generate without a result.
    assert_eq!(session.wizard_mut().advance(), WizardStep::Generate);

    session.wizard_mut().set_aspect_ratio(AspectRatio::Story);
    session
        .wizard_mut()
        .set_field_value("headline", "Acme Rockets".to_string());
    let result = session.generate_image().await.unwrap();
    assert!(result.prompt.contains("Acme Rockets"));
    assert_eq!(session.wizard().step(), WizardStep::Result);
}

#[tokio::test(start_paused = true)]
async fn selecting_new_brand_after_result_clears_downstream() {
    let backend = ScriptedBackend::new()
        .submit_accepted("remote-1")
        .then_succeeded("https://cdn.test/ad.png");
    let mut session = ready_session(backend);
    session.generate_image().await.unwrap();
    assert!(session.wizard().state().result.is_some());

    session.wizard_mut().select_brand(BrandSelection {
        id: "brand-other".to_string(),
        name: "Other".to_string(),
    });
    let state = session.wizard().state();
    assert!(state.product.is_none());
    assert!(state.preset.is_none());
    assert!(state.result.is_none());
}

#[tokio::test(start_paused = true)]
async fn reset_to_generate_keeps_selections_for_retry() {
    let backend = ScriptedBackend::new()
        .submit_accepted("remote-1")
        .submit_accepted("remote-2")
        .then_succeeded("https://cdn.test/first.png")
        .then_succeeded("https://cdn.test/second.png");
    let mut session = ready_session(backend);

    session.generate_image().await.unwrap();
    session.wizard_mut().reset_to(WizardStep::Generate);
    assert!(session.wizard().state().result.is_none());

    // Selections survived, so a second run works without reselecting.
    let second = session.generate_image().await.unwrap();
    assert_eq!(second.result_url, "https://cdn.test/second.png");
}

#[tokio::test(start_paused = true)]
async fn snapshot_restores_into_fresh_session() {
    let backend = ScriptedBackend::new()
        .submit_accepted("remote-1")
        .then_succeeded("https://cdn.test/ad.png");
    let mut session = ready_session(backend);
    session.wizard_mut().set_aspect_ratio(AspectRatio::Landscape);
    session.generate_image().await.unwrap();

    let json = serde_json::to_string(&session.wizard().snapshot()).unwrap();
    let snapshot: WizardState = serde_json::from_str(&json).unwrap();

    let mut fresh = Session::new(
        AdloomConfig::default(),
        demo_catalog(),
        Arc::new(ScriptedBackend::new()),
    );
    fresh.wizard_mut().restore(snapshot);
    let state = fresh.wizard().state();
    assert_eq!(state.step, WizardStep::Result);
    assert_eq!(state.settings.aspect_ratio, AspectRatio::Landscape);
    assert_eq!(
        state.result.as_ref().unwrap().result_url,
        "https://cdn.test/ad.png"
    );
}
