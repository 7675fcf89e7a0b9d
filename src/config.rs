//! Configuration for the orchestration core.
//!
//! Cost tables and poll budgets are data the core reads but does not own:
//! they layer defaults, an optional TOML file, and `ADLOOM_*` environment
//! overrides, in that order. Defaults match the production pricing sheet at
//! the time of writing.

use crate::error::OrchestratorError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdloomConfig {
    /// Cost tables for the estimator
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Poll interval and budgets
    #[serde(default)]
    pub polling: PollingConfig,

    /// Generation backend endpoint
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Per-second pricing for one video model/resolution pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRate {
    pub model: String,
    pub resolution: String,
    pub points_per_second: f64,
}

/// Cost tables read by the estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Image base cost in points, keyed by resolution
    #[serde(default = "default_image_base")]
    pub image_base: HashMap<String, u32>,

    /// Points per attached custom font
    #[serde(default = "default_font_addon_points")]
    pub font_addon_points: u32,

    /// Maximum number of custom fonts billed (and accepted)
    #[serde(default = "default_max_fonts")]
    pub max_fonts: usize,

    /// Per-second video rates, one entry per model/resolution pair
    #[serde(default = "default_video_rates")]
    pub video_rates: Vec<VideoRate>,
}

fn default_image_base() -> HashMap<String, u32> {
    HashMap::from([
        ("1K".to_string(), 27),
        ("2K".to_string(), 27),
        ("4K".to_string(), 60),
    ])
}

fn default_font_addon_points() -> u32 {
    5
}

fn default_max_fonts() -> usize {
    2
}

fn default_video_rates() -> Vec<VideoRate> {
    vec![
        VideoRate {
            model: "kling-avatar-v2-standard".to_string(),
            resolution: "720p".to_string(),
            points_per_second: 3.0,
        },
        VideoRate {
            model: "kling-avatar-v2-standard".to_string(),
            resolution: "1080p".to_string(),
            points_per_second: 5.0,
        },
        VideoRate {
            model: "kling-avatar-v2-pro".to_string(),
            resolution: "720p".to_string(),
            points_per_second: 6.0,
        },
        VideoRate {
            model: "kling-avatar-v2-pro".to_string(),
            resolution: "1080p".to_string(),
            points_per_second: 10.0,
        },
    ]
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            image_base: default_image_base(),
            font_addon_points: default_font_addon_points(),
            max_fonts: default_max_fonts(),
            video_rates: default_video_rates(),
        }
    }
}

/// Poll interval and per-kind budgets.
///
/// Video generation is observed to take materially longer than image
/// generation, hence the doubled budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds between status checks
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,

    /// Maximum polls for image jobs (~5 minutes at the default interval)
    #[serde(default = "default_image_budget")]
    pub image_budget: u32,

    /// Maximum polls for video/lip-sync jobs (~10 minutes)
    #[serde(default = "default_video_budget")]
    pub video_budget: u32,
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_image_budget() -> u32 {
    60
}

fn default_video_budget() -> u32 {
    120
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            image_budget: default_image_budget(),
            video_budget: default_video_budget(),
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn budget_for(&self, kind: crate::types::GenerationKind) -> u32 {
        match kind {
            crate::types::GenerationKind::Image => self.image_budget,
            crate::types::GenerationKind::Video => self.video_budget,
        }
    }
}

/// Generation backend endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the generation API
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Bearer token; omitted for backends that authenticate elsewhere
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8080/api/generation".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            api_key: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AdloomConfig {
    /// Load configuration: defaults, then an optional TOML file, then
    /// `ADLOOM_*` environment overrides (e.g. `ADLOOM_POLLING__INTERVAL_SECS`).
    pub fn load(file: Option<&Path>) -> Result<Self, OrchestratorError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("ADLOOM").separator("__"))
            .build()?;
        let config: AdloomConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        let mut errors = Vec::new();

        if self.pricing.image_base.is_empty() {
            errors.push("pricing.image_base must not be empty".to_string());
        }
        for (resolution, cost) in &self.pricing.image_base {
            if *cost == 0 {
                errors.push(format!("pricing.image_base[{}] must be positive", resolution));
            }
        }
        for rate in &self.pricing.video_rates {
            if rate.points_per_second <= 0.0 {
                errors.push(format!(
                    "pricing.video_rates[{}/{}] must be positive",
                    rate.model, rate.resolution
                ));
            }
        }
        if self.polling.interval_secs == 0 {
            errors.push("polling.interval_secs must be positive".to_string());
        }
        if self.polling.image_budget == 0 || self.polling.video_budget == 0 {
            errors.push("polling budgets must be positive".to_string());
        }
        if self.backend.base_url.is_empty() {
            errors.push("backend.base_url must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(OrchestratorError::Config(errors.join("\n")))
        }
    }
}
