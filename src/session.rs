//! One user's generation session: the wizard, the dispatcher, the poller,
//! and the cost estimator behind a single facade.
//!
//! `generate_image` and `generate_video` run the whole pipeline: compose
//! from the current wizard selections, dispatch, poll to a terminal status,
//! and record the outcome on the wizard's Result step. Terminal outcomes are
//! always recorded as state before an error is returned, so the wizard
//! never loses what happened.

use crate::catalog::Catalog;
use crate::compose::{compose, ComposeInput};
use crate::config::AdloomConfig;
use crate::cost::{CostBreakdown, CostEstimator};
use crate::dispatch::GenerationDispatcher;
use crate::error::OrchestratorError;
use crate::job::{JobStatus, SharedJob};
use crate::poller::JobPoller;
use crate::provider::{GenerationBackend, HttpBackend};
use crate::types::{GenerationKind, GenerationResult};
use crate::wizard::WizardController;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub struct Session {
    config: AdloomConfig,
    catalog: Arc<dyn Catalog>,
    dispatcher: GenerationDispatcher,
    poller: JobPoller,
    estimator: CostEstimator,
    wizard: WizardController,
}

impl Session {
    pub fn new(
        config: AdloomConfig,
        catalog: Arc<dyn Catalog>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        let dispatcher = GenerationDispatcher::new(Arc::clone(&backend));
        let poller = JobPoller::new(backend, config.polling.clone());
        let wizard = WizardController::new(
            dispatcher.active_jobs().clone(),
            poller.registry().clone(),
        );
        let estimator = CostEstimator::new(config.pricing.clone());
        Self {
            config,
            catalog,
            dispatcher,
            poller,
            estimator,
            wizard,
        }
    }

    /// Session against the configured HTTP backend.
    pub fn with_http_backend(
        config: AdloomConfig,
        catalog: Arc<dyn Catalog>,
    ) -> Result<Self, OrchestratorError> {
        let backend = HttpBackend::new(&config.backend)
            .map_err(|e| OrchestratorError::Provider(e.to_string()))?;
        Ok(Self::new(config, catalog, Arc::new(backend)))
    }

    pub fn config(&self) -> &AdloomConfig {
        &self.config
    }

    pub fn wizard(&self) -> &WizardController {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut WizardController {
        &mut self.wizard
    }

    /// Cost of an image generation at the current settings.
    pub fn estimate_image_cost(&self) -> Result<CostBreakdown, OrchestratorError> {
        let settings = &self.wizard.state().settings;
        self.estimator
            .image_cost(&settings.image_resolution, settings.fonts.len())
    }

    /// Cost of a video generation at the current settings. Zero while the
    /// clip duration is unknown.
    pub fn estimate_video_cost(&self) -> Result<CostBreakdown, OrchestratorError> {
        let settings = &self.wizard.state().settings;
        self.estimator.video_cost(
            &settings.video_model,
            &settings.video_resolution,
            settings.duration_seconds,
        )
    }

    /// Run an image generation end to end.
    pub async fn generate_image(&mut self) -> Result<GenerationResult, OrchestratorError> {
        let input = self.compose_input()?;
        let composed = compose(self.catalog.as_ref(), &input)?;
        let state = self.wizard.state();
        let request = composed.into_request(
            GenerationKind::Image,
            state.settings.image_model.clone(),
            state.settings.aspect_ratio,
            self.request_metadata(&state.settings.image_resolution),
        );

        let handle = self.dispatcher.dispatch(GenerationKind::Image, request).await?;
        self.run_to_outcome(GenerationKind::Image, handle).await
    }

    /// Run a lip-sync video generation end to end.
    ///
    /// Requires a known clip duration, and when the wizard holds an image
    /// result the video job is derived from it: the image becomes the first
    /// reference and its job id is recorded as the source.
    pub async fn generate_video(&mut self) -> Result<GenerationResult, OrchestratorError> {
        if self.wizard.state().settings.duration_seconds.is_none() {
            return Err(OrchestratorError::Validation(
                "clip duration is unknown; cannot dispatch video generation".to_string(),
            ));
        }
        // Fail fast on an unpriceable model/resolution pair before dispatch.
        self.estimate_video_cost()?;

        let input = self.compose_input()?;
        let composed = compose(self.catalog.as_ref(), &input)?;
        let state = self.wizard.state();
        let source_image = state.result.clone().filter(|r| r.kind == GenerationKind::Image);

        let mut request = composed.into_request(
            GenerationKind::Video,
            state.settings.video_model.clone(),
            state.settings.aspect_ratio,
            self.request_metadata(&state.settings.video_resolution),
        );
        if let Some(duration) = state.settings.duration_seconds {
            request
                .metadata
                .insert("duration_seconds".to_string(), duration.to_string());
        }

        let handle = match source_image {
            Some(image) => {
                request.reference_images.insert(0, image.result_url.clone());
                self.dispatcher
                    .dispatch_derived(GenerationKind::Video, request, image.job_id)
                    .await?
            }
            None => self.dispatcher.dispatch(GenerationKind::Video, request).await?,
        };
        self.run_to_outcome(GenerationKind::Video, handle).await
    }

    /// Stop watching the active job of one kind, keeping its last status.
    pub fn cancel_generation(&mut self, kind: GenerationKind) {
        if let Some(job) = self.dispatcher.active_jobs().get(kind) {
            self.poller.registry().cancel(&job.read().id);
        }
    }

    fn compose_input(&self) -> Result<ComposeInput, OrchestratorError> {
        let state = self.wizard.state();
        let missing = || {
            OrchestratorError::Validation(
                "brand, product, and preset must be selected before generating".to_string(),
            )
        };
        if state.product.is_none() {
            return Err(missing());
        }
        let brand = state.brand.as_ref().ok_or_else(missing)?;
        let preset = state.preset.as_ref().ok_or_else(missing)?;
        Ok(ComposeInput {
            brand_id: brand.id.clone(),
            style_id: preset.style_id.clone(),
            template_id: preset.template_id.clone(),
            field_values: state.settings.field_values.clone(),
            selected_reference_images: state.settings.selected_reference_images.clone(),
        })
    }

    fn request_metadata(&self, resolution: &str) -> HashMap<String, String> {
        let state = self.wizard.state();
        let mut metadata = HashMap::new();
        if let Some(brand) = &state.brand {
            metadata.insert("brand_id".to_string(), brand.id.clone());
        }
        if let Some(product) = &state.product {
            metadata.insert("product_id".to_string(), product.id.clone());
        }
        if let Some(preset) = &state.preset {
            metadata.insert("preset_id".to_string(), preset.id.clone());
        }
        metadata.insert("resolution".to_string(), resolution.to_string());
        metadata
    }

    /// Poll the job to a terminal status and record the outcome on the
    /// wizard before reporting it to the caller.
    async fn run_to_outcome(
        &mut self,
        kind: GenerationKind,
        handle: SharedJob,
    ) -> Result<GenerationResult, OrchestratorError> {
        let status = match self.poller.start(Arc::clone(&handle)) {
            Some(watcher) => watcher.wait().await,
            // Already terminal (synchronous completion or rejection).
            None => handle.read().status,
        };

        let job = handle.read();
        match status {
            JobStatus::Succeeded => {
                let result = GenerationResult {
                    job_id: job.id.clone(),
                    kind,
                    result_url: job
                        .result_url
                        .clone()
                        .unwrap_or_default(),
                    prompt: job.prompt.clone(),
                };
                drop(job);
                info!(job_id = %result.job_id, %kind, "generation recorded");
                self.wizard.record_success(result.clone());
                Ok(result)
            }
            JobStatus::Failed => {
                let message = job
                    .error
                    .clone()
                    .unwrap_or_else(|| "Generation failed".to_string());
                drop(job);
                self.wizard.record_failure(message.clone());
                Err(OrchestratorError::Provider(message))
            }
            JobStatus::Unknown => {
                let polls = self.config.polling.budget_for(kind);
                drop(job);
                self.wizard.record_failure(
                    "Generation status is unknown; check back later".to_string(),
                );
                Err(OrchestratorError::PollTimeout { polls })
            }
            // Cancelled mid-flight; last-known status stands.
            JobStatus::Pending | JobStatus::Processing => {
                let message = "Generation cancelled before completion".to_string();
                drop(job);
                Err(OrchestratorError::Validation(message))
            }
        }
    }
}
