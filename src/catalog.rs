//! Brand/product/style/template entities and their resolution seam.
//!
//! Persistence and admin CRUD live outside the core; the composer only needs
//! to resolve opaque ids into entities, so that seam is a trait. A failed
//! lookup is an external failure (`CompositionError`), not a logic bug.

use serde::{Deserialize, Serialize};

/// A user's identity bundle used across generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub name: String,
    /// Logo is always the first reference image when present.
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Free-text identity paragraph appended after the goal prompt.
    #[serde(default)]
    pub context_text: Option<String>,
    /// Reference gallery in display order.
    #[serde(default)]
    pub images: Vec<BrandImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandImage {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A product sold under a brand; gates wizard navigation and travels in
/// request metadata, but does not participate in prompt composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub brand_id: String,
    pub name: String,
}

/// Aesthetic modifiers appended as the final prompt paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub id: String,
    pub name: String,
    pub prompt_modifiers: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Image,
}

/// One substitutable field in a template's goal prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    /// Placeholder name; `{{field_name}}` occurrences in the goal prompt are
    /// replaced when a value is supplied.
    pub field_name: String,
    pub field_type: FieldType,
}

/// A reusable generation blueprint: a goal prompt with substitutable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub goal_prompt: String,
    /// Field order matters: image-type field values join the reference list
    /// in this order.
    #[serde(default)]
    pub fields: Vec<TemplateField>,
}

/// Resolution seam for brand/style/template lookups.
///
/// Implementations are external collaborators (database, HTTP service); the
/// in-memory variant below serves embedding and tests.
pub trait Catalog: Send + Sync {
    fn brand(&self, id: &str) -> Option<Brand>;
    fn style(&self, id: &str) -> Option<Style>;
    fn template(&self, id: &str) -> Option<Template>;
}

/// Catalog backed by plain vectors.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    brands: Vec<Brand>,
    styles: Vec<Style>,
    templates: Vec<Template>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brand(mut self, brand: Brand) -> Self {
        self.brands.push(brand);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.styles.push(style);
        self
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.templates.push(template);
        self
    }
}

impl Catalog for InMemoryCatalog {
    fn brand(&self, id: &str) -> Option<Brand> {
        self.brands.iter().find(|b| b.id == id).cloned()
    }

    fn style(&self, id: &str) -> Option<Style> {
        self.styles.iter().find(|s| s.id == id).cloned()
    }

    fn template(&self, id: &str) -> Option<Template> {
        self.templates.iter().find(|t| t.id == id).cloned()
    }
}
