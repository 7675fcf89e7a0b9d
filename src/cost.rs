//! Point-cost estimation for image and video generation.
//!
//! Pure functions over the pricing tables in [`PricingConfig`]; nothing here
//! is persisted. Callers recompute on every settings change and show the
//! result before dispatch.

use crate::config::PricingConfig;
use crate::error::OrchestratorError;

/// One itemized add-on line in a [`CostBreakdown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostAddon {
    pub label: String,
    pub points: u32,
}

/// Itemized cost of one generation at the current settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostBreakdown {
    pub base: u32,
    pub addons: Vec<CostAddon>,
    pub total: u32,
}

impl CostBreakdown {
    fn flat(base: u32) -> Self {
        Self {
            base,
            addons: Vec::new(),
            total: base,
        }
    }
}

/// Stateless estimator over externally-owned pricing tables.
#[derive(Debug, Clone)]
pub struct CostEstimator {
    pricing: PricingConfig,
}

impl CostEstimator {
    pub fn new(pricing: PricingConfig) -> Self {
        Self { pricing }
    }

    /// Cost of one image generation: base cost by resolution plus a flat
    /// add-on per attached custom font, with the billable font count capped.
    ///
    /// An unknown resolution fails fast rather than pricing at zero.
    pub fn image_cost(
        &self,
        resolution: &str,
        font_count: usize,
    ) -> Result<CostBreakdown, OrchestratorError> {
        let base = *self.pricing.image_base.get(resolution).ok_or_else(|| {
            OrchestratorError::Pricing {
                model: "image".to_string(),
                resolution: resolution.to_string(),
            }
        })?;

        let billable_fonts = font_count.min(self.pricing.max_fonts) as u32;
        let mut addons = Vec::new();
        if billable_fonts > 0 {
            addons.push(CostAddon {
                label: format!("custom fonts x{}", billable_fonts),
                points: billable_fonts * self.pricing.font_addon_points,
            });
        }

        let total = base + addons.iter().map(|a| a.points).sum::<u32>();
        Ok(CostBreakdown {
            base,
            addons,
            total,
        })
    }

    /// Cost of one video generation: per-second rate for the model/resolution
    /// pair times the clip duration, rounded to the nearest point.
    ///
    /// A missing duration prices at zero; callers must not dispatch until the
    /// duration is known. An unknown model/resolution pair fails fast.
    pub fn video_cost(
        &self,
        model: &str,
        resolution: &str,
        duration_seconds: Option<f64>,
    ) -> Result<CostBreakdown, OrchestratorError> {
        let rate = self
            .pricing
            .video_rates
            .iter()
            .find(|r| r.model == model && r.resolution == resolution)
            .ok_or_else(|| OrchestratorError::Pricing {
                model: model.to_string(),
                resolution: resolution.to_string(),
            })?;

        let total = match duration_seconds {
            Some(duration) if duration > 0.0 => {
                (rate.points_per_second * duration).round() as u32
            }
            _ => 0,
        };
        Ok(CostBreakdown::flat(total))
    }
}
