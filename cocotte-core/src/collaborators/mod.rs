//! Interfaces to the services that enrichment depends on.
//!
//! Translation and nutrition lookup may involve network or model calls. The
//! enricher only sees these traits and treats a `None` answer as a cache miss.

mod fake;

pub use fake::{FakeMatcher, FakeTranslator};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Service not configured: {0}")]
    NotConfigured(String),
}

/// Nutrient content per 100 g of an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    #[serde(default)]
    pub fiber: f64,
}

impl NutrientProfile {
    /// Reject profiles with negative or non-finite values.
    pub fn checked(self) -> Result<Self, CollaboratorError> {
        let values = [self.calories, self.protein, self.fat, self.carbs, self.fiber];
        if values.iter().all(|v| v.is_finite() && *v >= 0.0) {
            Ok(self)
        } else {
            Err(CollaboratorError::InvalidResponse(format!(
                "nutrient values out of range: {:?}",
                self
            )))
        }
    }
}

/// Translates ingredient names to English.
#[async_trait]
pub trait IngredientTranslator: Send + Sync + fmt::Debug {
    /// English name for `name`, or `None` if the service has no answer.
    async fn translate(
        &self,
        name: &str,
        source_language: &str,
    ) -> Result<Option<String>, CollaboratorError>;

    fn translator_name(&self) -> &'static str;
}

/// Looks up nutrient content by English ingredient name.
#[async_trait]
pub trait NutritionMatcher: Send + Sync + fmt::Debug {
    async fn match_nutrition(
        &self,
        name_en: &str,
    ) -> Result<Option<NutrientProfile>, CollaboratorError>;

    fn matcher_name(&self) -> &'static str;
}

pub type Collaborators = (Arc<dyn IngredientTranslator>, Arc<dyn NutritionMatcher>);

/// Build the translator and matcher for a nutrition provider.
///
/// Providers:
/// - `"fake"`: offline, with the staples table of [`FakeMatcher::with_staples`]
///   and no translations
pub fn create_collaborators(provider: &str) -> Result<Collaborators, CollaboratorError> {
    match provider.trim() {
        "fake" => Ok((
            Arc::new(FakeTranslator::new()),
            Arc::new(FakeMatcher::with_staples()),
        )),
        other => Err(CollaboratorError::NotConfigured(format!(
            "unknown nutrition provider '{}'. Supported: fake",
            other
        ))),
    }
}
