//! Wizard step state machine.
//!
//! The wizard walks Brand -> Product -> Generate -> Result. Navigation is
//! gated on the selections each step requires, and changing an upstream
//! selection cascades: a new brand invalidates the product, preset, result,
//! and any in-flight jobs; a new product invalidates the preset and result.
//! All mutation goes through [`WizardController`]; the state itself is a
//! plain serializable value so sessions can be snapshotted and restored.

use crate::error::OrchestratorError;
use crate::job::ActiveJobs;
use crate::poller::PollerRegistry;
use crate::types::{AspectRatio, GenerationResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Longest sample text accepted for a custom font overlay.
pub const MAX_FONT_TEXT_CHARS: usize = 300;

/// Maximum custom fonts attached to one generation.
pub const MAX_FONTS: usize = 2;

/// Ordered wizard steps. Exactly one is current at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Brand,
    Product,
    Generate,
    Result,
}

impl WizardStep {
    fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Brand => Some(WizardStep::Product),
            WizardStep::Product => Some(WizardStep::Generate),
            WizardStep::Generate => Some(WizardStep::Result),
            WizardStep::Result => None,
        }
    }

    fn prev(self) -> Option<WizardStep> {
        match self {
            WizardStep::Brand => None,
            WizardStep::Product => Some(WizardStep::Brand),
            WizardStep::Generate => Some(WizardStep::Product),
            WizardStep::Result => Some(WizardStep::Generate),
        }
    }
}

/// Opaque id plus denormalized display data for a selected brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandSelection {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSelection {
    pub id: String,
    pub name: String,
}

/// A preset bundles the style and template driving composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSelection {
    pub id: String,
    pub name: String,
    pub style_id: String,
    pub template_id: String,
}

/// One custom font overlay with its sample text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontChoice {
    pub family: String,
    pub sample_text: String,
}

/// Settings accumulated on the Generate step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Image resolution key into the pricing table (`1K`, `2K`, `4K`).
    #[serde(default = "default_image_resolution")]
    pub image_resolution: String,
    #[serde(default = "default_video_model")]
    pub video_model: String,
    #[serde(default = "default_video_resolution")]
    pub video_resolution: String,
    /// Clip duration; `None` until the audio/script length is known.
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    /// Brand reference images picked for this run, in selection order.
    #[serde(default)]
    pub selected_reference_images: Vec<String>,
    #[serde(default)]
    pub fonts: Vec<FontChoice>,
    /// Template field values keyed by field name.
    #[serde(default)]
    pub field_values: HashMap<String, String>,
}

fn default_image_model() -> String {
    "riverflow-v2".to_string()
}

fn default_image_resolution() -> String {
    "1K".to_string()
}

fn default_video_model() -> String {
    "kling-avatar-v2-standard".to_string()
}

fn default_video_resolution() -> String {
    "720p".to_string()
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            image_model: default_image_model(),
            image_resolution: default_image_resolution(),
            video_model: default_video_model(),
            video_resolution: default_video_resolution(),
            duration_seconds: None,
            selected_reference_images: Vec::new(),
            fonts: Vec::new(),
            field_values: HashMap::new(),
        }
    }
}

/// Full wizard state. Owned by the session; mutated only through
/// [`WizardController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    pub step: WizardStep,
    #[serde(default)]
    pub brand: Option<BrandSelection>,
    #[serde(default)]
    pub product: Option<ProductSelection>,
    #[serde(default)]
    pub preset: Option<PresetSelection>,
    #[serde(default)]
    pub settings: GenerationSettings,
    #[serde(default)]
    pub result: Option<GenerationResult>,
    #[serde(default)]
    pub last_error: Option<String>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: WizardStep::Brand,
            brand: None,
            product: None,
            preset: None,
            settings: GenerationSettings::default(),
            result: None,
            last_error: None,
        }
    }
}

/// The only mutator of [`WizardState`].
///
/// Holds handles to the active-job registry and the poller registry so
/// cascading invalidation can also stop in-flight work.
pub struct WizardController {
    state: WizardState,
    active: ActiveJobs,
    pollers: PollerRegistry,
}

impl WizardController {
    pub fn new(active: ActiveJobs, pollers: PollerRegistry) -> Self {
        Self {
            state: WizardState::default(),
            active,
            pollers,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.step
    }

    /// Advance to the next step if the current step's gate is satisfied;
    /// otherwise a no-op. Returns the (possibly unchanged) current step.
    pub fn advance(&mut self) -> WizardStep {
        let allowed = match self.state.step {
            WizardStep::Brand => self.state.brand.is_some(),
            WizardStep::Product => self.state.brand.is_some() && self.state.product.is_some(),
            WizardStep::Generate => self.state.result.is_some(),
            WizardStep::Result => false,
        };
        if allowed {
            if let Some(next) = self.state.step.next() {
                debug!(from = ?self.state.step, to = ?next, "wizard advance");
                self.state.step = next;
            }
        }
        self.state.step
    }

    /// Step back one step; a no-op on the first step. Never clears state.
    pub fn back(&mut self) -> WizardStep {
        if let Some(prev) = self.state.step.prev() {
            self.state.step = prev;
        }
        self.state.step
    }

    /// Jump to an earlier step, invalidating everything downstream of it.
    pub fn reset_to(&mut self, step: WizardStep) {
        info!(?step, "wizard reset");
        self.state.step = step;
        match step {
            WizardStep::Brand => {
                self.state.product = None;
                self.state.preset = None;
                self.clear_result();
                self.cancel_jobs();
            }
            WizardStep::Product => {
                self.state.preset = None;
                self.clear_result();
            }
            WizardStep::Generate => {
                self.clear_result();
            }
            WizardStep::Result => {}
        }
    }

    /// Select a brand. Choosing a different brand invalidates the product,
    /// preset, result, and any in-flight jobs.
    pub fn select_brand(&mut self, selection: BrandSelection) {
        let changed = self
            .state
            .brand
            .as_ref()
            .map(|b| b.id != selection.id)
            .unwrap_or(true);
        if changed {
            self.state.product = None;
            self.state.preset = None;
            self.state.settings.selected_reference_images.clear();
            self.clear_result();
            self.cancel_jobs();
        }
        self.state.brand = Some(selection);
    }

    /// Select a product. Choosing a different product invalidates the preset
    /// and result.
    pub fn select_product(
        &mut self,
        selection: ProductSelection,
    ) -> Result<(), OrchestratorError> {
        if self.state.brand.is_none() {
            return Err(OrchestratorError::Validation(
                "select a brand before a product".to_string(),
            ));
        }
        let changed = self
            .state
            .product
            .as_ref()
            .map(|p| p.id != selection.id)
            .unwrap_or(true);
        if changed {
            self.state.preset = None;
            self.clear_result();
        }
        self.state.product = Some(selection);
        Ok(())
    }

    pub fn select_preset(
        &mut self,
        selection: PresetSelection,
    ) -> Result<(), OrchestratorError> {
        if self.state.brand.is_none() || self.state.product.is_none() {
            return Err(OrchestratorError::Validation(
                "select a brand and product before a preset".to_string(),
            ));
        }
        if self
            .state
            .preset
            .as_ref()
            .map(|p| p.id != selection.id)
            .unwrap_or(true)
        {
            self.clear_result();
        }
        self.state.preset = Some(selection);
        Ok(())
    }

    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.state.settings.aspect_ratio = ratio;
    }

    pub fn set_image_model(&mut self, model: String) {
        self.state.settings.image_model = model;
    }

    pub fn set_image_resolution(&mut self, resolution: String) {
        self.state.settings.image_resolution = resolution;
    }

    pub fn set_video_model(&mut self, model: String) {
        self.state.settings.video_model = model;
    }

    pub fn set_video_resolution(&mut self, resolution: String) {
        self.state.settings.video_resolution = resolution;
    }

    pub fn set_duration_seconds(&mut self, duration: Option<f64>) {
        self.state.settings.duration_seconds = duration;
    }

    pub fn set_field_value(&mut self, name: &str, value: String) {
        self.state.settings.field_values.insert(name.to_string(), value);
    }

    pub fn clear_field_values(&mut self) {
        self.state.settings.field_values.clear();
    }

    /// Toggle a brand reference image; selection order is preserved for the
    /// composed reference list.
    pub fn toggle_reference_image(&mut self, url: &str) {
        let refs = &mut self.state.settings.selected_reference_images;
        if let Some(pos) = refs.iter().position(|r| r == url) {
            refs.remove(pos);
        } else {
            refs.push(url.to_string());
        }
    }

    /// Attach a custom font. At most [`MAX_FONTS`] fonts, each with sample
    /// text no longer than [`MAX_FONT_TEXT_CHARS`] characters.
    pub fn add_font(&mut self, font: FontChoice) -> Result<(), OrchestratorError> {
        if self.state.settings.fonts.len() >= MAX_FONTS {
            return Err(OrchestratorError::Validation(format!(
                "at most {} custom fonts may be attached",
                MAX_FONTS
            )));
        }
        if font.sample_text.chars().count() > MAX_FONT_TEXT_CHARS {
            return Err(OrchestratorError::Validation(format!(
                "font sample text exceeds {} characters",
                MAX_FONT_TEXT_CHARS
            )));
        }
        self.state.settings.fonts.push(font);
        Ok(())
    }

    pub fn remove_font(&mut self, family: &str) {
        self.state.settings.fonts.retain(|f| f.family != family);
    }

    /// Whether the Generate step has everything it needs to dispatch.
    pub fn can_generate(&self) -> bool {
        self.state.brand.is_some() && self.state.product.is_some() && self.state.preset.is_some()
    }

    /// Record a successful generation and move to the Result step.
    pub fn record_success(&mut self, result: GenerationResult) {
        self.state.last_error = None;
        self.state.result = Some(result);
        self.state.step = WizardStep::Result;
    }

    /// Record a failed or unresolved generation. The wizard never throws
    /// past its boundary; the outcome lands on the Result step as data.
    pub fn record_failure(&mut self, message: String) {
        self.state.result = None;
        self.state.last_error = Some(message);
        self.state.step = WizardStep::Result;
    }

    /// Serializable snapshot of the wizard state. In-flight jobs are not
    /// part of a snapshot.
    pub fn snapshot(&self) -> WizardState {
        self.state.clone()
    }

    /// Replace the wizard state with a snapshot, stopping any in-flight
    /// work first.
    pub fn restore(&mut self, state: WizardState) {
        self.cancel_jobs();
        self.state = state;
    }

    fn clear_result(&mut self) {
        self.state.result = None;
        self.state.last_error = None;
    }

    fn cancel_jobs(&mut self) {
        self.pollers.cancel_all();
        self.active.clear_all();
    }
}
