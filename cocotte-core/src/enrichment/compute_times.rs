//! ComputeTimes enrichment.

use super::{EnrichOptions, Enrichment, EnrichmentError};
use crate::timing::calculate_times_from_dag_with;
use crate::types::RecipeDocument;

/// Writes critical-path preparation times into the metadata.
#[derive(Debug, Clone, Copy)]
pub struct ComputeTimes;

impl Enrichment for ComputeTimes {
    fn enrichment_type(&self) -> &'static str {
        "compute_times"
    }

    fn display_name(&self) -> &'static str {
        "Compute Times"
    }

    fn description(&self) -> &'static str {
        "Compute total, active and passive time from the step graph"
    }

    fn output_fields(&self) -> &'static [&'static str] {
        &[
            "totalTime",
            "totalActiveTime",
            "totalPassiveTime",
            "totalTimeMinutes",
            "totalActiveTimeMinutes",
            "totalPassiveTimeMinutes",
        ]
    }

    fn apply(
        &self,
        original: &RecipeDocument,
        options: &EnrichOptions,
    ) -> Result<RecipeDocument, EnrichmentError> {
        let mut recipe = original.clone();
        calculate_times_from_dag_with(&recipe, &options.timing).apply_to(&mut recipe.metadata);
        Ok(recipe)
    }
}
