//! Wizard invariants under arbitrary action sequences.

use adloom::job::ActiveJobs;
use adloom::poller::PollerRegistry;
use adloom::types::{AspectRatio, GenerationKind, GenerationResult};
use adloom::wizard::{
    BrandSelection, PresetSelection, ProductSelection, WizardController, WizardStep,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    SelectBrand(u8),
    SelectProduct(u8),
    SelectPreset(u8),
    Advance,
    Back,
    ResetTo(WizardStep),
    RecordSuccess,
    SetAspect(AspectRatio),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..4).prop_map(Action::SelectBrand),
        (0u8..4).prop_map(Action::SelectProduct),
        (0u8..4).prop_map(Action::SelectPreset),
        Just(Action::Advance),
        Just(Action::Back),
        proptest::sample::select(vec![
            WizardStep::Brand,
            WizardStep::Product,
            WizardStep::Generate,
        ])
        .prop_map(Action::ResetTo),
        Just(Action::RecordSuccess),
        proptest::sample::select(vec![
            AspectRatio::Square,
            AspectRatio::Story,
            AspectRatio::Landscape,
        ])
        .prop_map(Action::SetAspect),
    ]
}

fn apply(wizard: &mut WizardController, action: &Action) {
    match action {
        Action::SelectBrand(n) => wizard.select_brand(BrandSelection {
            id: format!("brand-{}", n),
            name: format!("Brand {}", n),
        }),
        Action::SelectProduct(n) => {
            let _ = wizard.select_product(ProductSelection {
                id: format!("prod-{}", n),
                name: format!("Product {}", n),
            });
        }
        Action::SelectPreset(n) => {
            let _ = wizard.select_preset(PresetSelection {
                id: format!("preset-{}", n),
                name: format!("Preset {}", n),
                style_id: "style-1".to_string(),
                template_id: "tmpl-1".to_string(),
            });
        }
        Action::Advance => {
            wizard.advance();
        }
        Action::Back => {
            wizard.back();
        }
        Action::ResetTo(step) => wizard.reset_to(*step),
        Action::RecordSuccess => wizard.record_success(GenerationResult {
            job_id: "job-x".to_string(),
            kind: GenerationKind::Image,
            result_url: "https://cdn.test/x.png".to_string(),
            prompt: "p".to_string(),
        }),
        Action::SetAspect(ratio) => wizard.set_aspect_ratio(*ratio),
    }
}

/// No action sequence can produce a selection hierarchy with holes: a
/// product requires a brand, a preset requires a product.
#[test]
fn selection_hierarchy_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &proptest::collection::vec(action_strategy(), 0..40),
            |actions| {
                let mut wizard =
                    WizardController::new(ActiveJobs::new(), PollerRegistry::new());
                for action in &actions {
                    apply(&mut wizard, action);
                    let state = wizard.state();
                    if state.product.is_some() {
                        assert!(state.brand.is_some());
                    }
                    if state.preset.is_some() {
                        assert!(state.product.is_some());
                    }
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Whatever the history, the wizard can only sit past the Brand step when
/// the selections that gate those steps are present.
#[test]
fn step_gating_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &proptest::collection::vec(action_strategy(), 0..40),
            |actions| {
                let mut wizard =
                    WizardController::new(ActiveJobs::new(), PollerRegistry::new());
                for action in &actions {
                    apply(&mut wizard, action);
                }
                // Advancing never skips a gate.
                let before = wizard.step();
                let after = wizard.advance();
                if after > before {
                    match before {
                        WizardStep::Brand => assert!(wizard.state().brand.is_some()),
                        WizardStep::Product => assert!(wizard.state().product.is_some()),
                        WizardStep::Generate => assert!(wizard.state().result.is_some()),
                        WizardStep::Result => unreachable!(),
                    }
                }
                Ok(())
            },
        )
        .unwrap();
}
