//! Shared value types for the orchestration core.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// The kind of asset a generation job produces.
///
/// Lip-sync video ads share the `Video` kind; they obey the same poll budget
/// and the same one-active-job-per-kind rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Image,
    Video,
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationKind::Image => write!(f, "image"),
            GenerationKind::Video => write!(f, "video"),
        }
    }
}

/// Output aspect ratios supported by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Portrait,
    #[serde(rename = "9:16")]
    Story,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "4:3")]
    Classic,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "4:5",
            AspectRatio::Story => "9:16",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Classic => "4:3",
        }
    }

    /// Display label shown next to the ratio in pickers.
    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Square => "Square",
            AspectRatio::Portrait => "Portrait",
            AspectRatio::Story => "Story",
            AspectRatio::Landscape => "Landscape",
            AspectRatio::Classic => "Classic",
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Square
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A composed request ready for submission to a generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Final composed prompt (goal + brand context + style modifiers).
    pub prompt: String,
    /// Provider model identifier.
    pub model: String,
    pub aspect_ratio: AspectRatio,
    /// Ordered reference images; providers may weight earlier entries more
    /// heavily, so order is part of the contract.
    pub reference_images: Vec<String>,
    /// Free-form source identifiers for traceability (brand id, template id,
    /// session id, and the like).
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// The terminal outcome of a successful generation, as recorded on the
/// wizard's result step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub job_id: String,
    pub kind: GenerationKind,
    pub result_url: String,
    /// The prompt that produced the asset, kept for "copy prompt" and audit.
    pub prompt: String,
}

static JOB_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Process-unique job identifier.
pub fn new_job_id(kind: GenerationKind) -> String {
    let ts = now_millis();
    let seq = JOB_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("job-{kind}-{ts}-{seq}")
}
