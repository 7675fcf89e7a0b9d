//! Prompt composition: merges brand context, style modifiers, and template
//! field substitutions into one generation payload.
//!
//! Paragraph order is semantically required — instance specifics (the filled
//! goal prompt), then identity (brand context), then aesthetic (style
//! modifiers). Reference-image order matters too: providers may weight
//! earlier images more heavily.

use crate::catalog::{Catalog, FieldType};
use crate::error::OrchestratorError;
use crate::types::GenerationRequest;
use crate::types::{AspectRatio, GenerationKind};
use std::collections::HashMap;
use tracing::debug;

/// Identifiers and per-run inputs for one composition.
#[derive(Debug, Clone, Default)]
pub struct ComposeInput {
    pub brand_id: String,
    pub style_id: String,
    pub template_id: String,
    /// Supplied field values keyed by field name; empty values are ignored.
    pub field_values: HashMap<String, String>,
    /// Brand reference images the user picked, in selection order.
    pub selected_reference_images: Vec<String>,
}

/// The composed payload handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub prompt: String,
    pub reference_images: Vec<String>,
}

/// Compose the final prompt and reference list.
///
/// Unmatched placeholders are left verbatim in the goal prompt — an
/// unfilled `{{field}}` is not an error. Unresolvable brand/style/template
/// ids are `Composition` errors (external lookup failures).
pub fn compose(
    catalog: &dyn Catalog,
    input: &ComposeInput,
) -> Result<ComposedPrompt, OrchestratorError> {
    let brand = catalog.brand(&input.brand_id).ok_or_else(|| {
        OrchestratorError::Composition(format!("Brand not found: {}", input.brand_id))
    })?;
    let style = catalog.style(&input.style_id).ok_or_else(|| {
        OrchestratorError::Composition(format!("Style not found: {}", input.style_id))
    })?;
    let template = catalog.template(&input.template_id).ok_or_else(|| {
        OrchestratorError::Composition(format!("Template not found: {}", input.template_id))
    })?;

    // Fill the goal prompt. Literal replacement of every occurrence; fields
    // without a non-empty value keep their placeholder text.
    let mut goal_prompt = template.goal_prompt.clone();
    for field in &template.fields {
        if let Some(value) = input.field_values.get(&field.field_name) {
            if !value.is_empty() {
                let placeholder = format!("{{{{{}}}}}", field.field_name);
                goal_prompt = goal_prompt.replace(&placeholder, value);
            }
        }
    }

    let mut paragraphs = vec![goal_prompt];
    if let Some(context) = &brand.context_text {
        if !context.is_empty() {
            paragraphs.push(context.clone());
        }
    }
    paragraphs.push(style.prompt_modifiers.clone());
    let prompt = paragraphs.join("\n\n");

    // Reference order: logo, then selected brand refs in selection order,
    // then image-type field values in field order.
    let mut reference_images = Vec::new();
    if let Some(logo) = &brand.logo_url {
        reference_images.push(logo.clone());
    }
    reference_images.extend(input.selected_reference_images.iter().cloned());
    for field in &template.fields {
        if field.field_type == FieldType::Image {
            if let Some(url) = input.field_values.get(&field.field_name) {
                if !url.is_empty() {
                    reference_images.push(url.clone());
                }
            }
        }
    }

    debug!(
        brand_id = %input.brand_id,
        template_id = %input.template_id,
        reference_count = reference_images.len(),
        "composed generation prompt"
    );

    Ok(ComposedPrompt {
        prompt,
        reference_images,
    })
}

impl ComposedPrompt {
    /// Wrap the composition into a dispatchable request, attaching source
    /// identifiers for traceability.
    pub fn into_request(
        self,
        kind: GenerationKind,
        model: String,
        aspect_ratio: AspectRatio,
        metadata: HashMap<String, String>,
    ) -> GenerationRequest {
        let mut metadata = metadata;
        metadata.insert("kind".to_string(), kind.to_string());
        GenerationRequest {
            prompt: self.prompt,
            model,
            aspect_ratio,
            reference_images: self.reference_images,
            metadata,
        }
    }
}
