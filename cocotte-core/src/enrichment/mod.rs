//! Recipe enrichment.
//!
//! Deterministic enrichments (diets, seasons, times) are stateless structs
//! implementing [`Enrichment`] and listed in [`ALL_ENRICHMENTS`]. They are
//! independent of one another, so registry order does not affect the result.
//! Nutrition needs external lookups and lives on [`RecipeEnricher`].

mod compute_times;
mod determine_diets;
mod determine_seasons;
mod enricher;
mod nutrition;

pub use compute_times::ComputeTimes;
pub use determine_diets::{determine_diets, DetermineDiets};
pub use determine_seasons::{determine_seasons, DetermineSeasons};
pub use enricher::RecipeEnricher;
pub use nutrition::{adjust_suspect_servings, nutrition_tags, restore_stated_servings};

use crate::cache::CacheError;
use crate::collaborators::CollaboratorError;
use crate::timing::TimingOptions;
use crate::types::RecipeDocument;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Enrichment cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Settings shared by every enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichOptions {
    pub timing: TimingOptions,
    /// Language of ingredient names, passed to the translator.
    pub source_language: String,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            timing: TimingOptions::default(),
            source_language: "fr".to_string(),
        }
    }
}

/// Description of an enrichment type, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentInfo {
    #[serde(rename = "type")]
    pub enrichment_type: String,
    pub display_name: String,
    pub description: String,
    pub output_fields: Vec<String>,
}

/// A deterministic, side-effect-free recipe enrichment.
pub trait Enrichment: Send + Sync + std::fmt::Debug {
    /// Type identifier (e.g., "determine_diets").
    fn enrichment_type(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Metadata fields this enrichment writes.
    fn output_fields(&self) -> &'static [&'static str];

    /// Compute the enrichment.
    ///
    /// Must start from `original.clone()` and only modify fields listed in `output_fields()`.
    fn apply(
        &self,
        original: &RecipeDocument,
        options: &EnrichOptions,
    ) -> Result<RecipeDocument, EnrichmentError>;

    fn info(&self) -> EnrichmentInfo {
        EnrichmentInfo {
            enrichment_type: self.enrichment_type().to_string(),
            display_name: self.display_name().to_string(),
            description: self.description().to_string(),
            output_fields: self.output_fields().iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Registry of deterministic enrichments.
pub static ALL_ENRICHMENTS: &[&dyn Enrichment] = &[&DetermineDiets, &DetermineSeasons, &ComputeTimes];

pub fn get_enrichment(type_name: &str) -> Option<&'static dyn Enrichment> {
    ALL_ENRICHMENTS
        .iter()
        .find(|e| e.enrichment_type() == type_name)
        .copied()
}

pub fn all_enrichment_info() -> Vec<EnrichmentInfo> {
    ALL_ENRICHMENTS.iter().map(|e| e.info()).collect()
}

/// Run every registered enrichment, continuing past failures.
///
/// Returns the enriched recipe and the errors of any enrichment that failed.
pub fn run_all_enrichments(
    recipe: &RecipeDocument,
    options: &EnrichOptions,
) -> (RecipeDocument, Vec<(String, EnrichmentError)>) {
    let mut current = recipe.clone();
    let mut errors = Vec::new();

    for enrichment in ALL_ENRICHMENTS {
        match enrichment.apply(&current, options) {
            Ok(enriched) => {
                current = enriched;
            }
            Err(e) => {
                tracing::warn!(
                    enrichment = enrichment.enrichment_type(),
                    error = %e,
                    "Enrichment failed, continuing"
                );
                errors.push((enrichment.enrichment_type().to_string(), e));
            }
        }
    }

    (current, errors)
}
