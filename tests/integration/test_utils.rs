//! Shared fixtures for the integration suite.

use adloom::catalog::{Brand, BrandImage, FieldType, InMemoryCatalog, Style, Template, TemplateField};
use adloom::config::AdloomConfig;
use adloom::provider::mock::ScriptedBackend;
use adloom::session::Session;
use adloom::wizard::{BrandSelection, PresetSelection, ProductSelection};
use std::sync::Arc;

/// Catalog with one fully populated brand, style, and template.
pub fn demo_catalog() -> Arc<InMemoryCatalog> {
    Arc::new(
        InMemoryCatalog::new()
            .with_brand(Brand {
                id: "brand-acme".to_string(),
                name: "Acme".to_string(),
                logo_url: Some("https://img.test/logo.png".to_string()),
                context_text: Some("Acme builds delightful rockets.".to_string()),
                images: vec![
                    BrandImage {
                        url: "https://img.test/ref-a.png".to_string(),
                        description: Some("studio shot".to_string()),
                    },
                    BrandImage {
                        url: "https://img.test/ref-b.png".to_string(),
                        description: None,
                    },
                ],
            })
            .with_style(Style {
                id: "style-bold".to_string(),
                name: "Bold".to_string(),
                prompt_modifiers: "bold colors, high contrast".to_string(),
            })
            .with_template(Template {
                id: "tmpl-launch".to_string(),
                name: "Launch ad".to_string(),
                goal_prompt: "An ad for {{headline}}".to_string(),
                fields: vec![
                    TemplateField {
                        field_name: "headline".to_string(),
                        field_type: FieldType::Text,
                    },
                    TemplateField {
                        field_name: "hero_shot".to_string(),
                        field_type: FieldType::Image,
                    },
                ],
            }),
    )
}

/// Session over a scripted backend with brand, product, and preset selected.
pub fn ready_session(backend: ScriptedBackend) -> Session {
    let mut session = Session::new(AdloomConfig::default(), demo_catalog(), Arc::new(backend));
    select_all(&mut session);
    session
}

pub fn select_all(session: &mut Session) {
    session.wizard_mut().select_brand(BrandSelection {
        id: "brand-acme".to_string(),
        name: "Acme".to_string(),
    });
    session
        .wizard_mut()
        .select_product(ProductSelection {
            id: "prod-rocket".to_string(),
            name: "Rocket".to_string(),
        })
        .unwrap();
    session
        .wizard_mut()
        .select_preset(PresetSelection {
            id: "preset-launch".to_string(),
            name: "Launch".to_string(),
            style_id: "style-bold".to_string(),
            template_id: "tmpl-launch".to_string(),
        })
        .unwrap();
}
