//! DetermineSeasons enrichment.

use super::{EnrichOptions, Enrichment, EnrichmentError};
use crate::seasonality::match_produce;
use crate::types::{Ingredient, IngredientCategory, RecipeDocument, Season};
use std::collections::BTreeSet;

/// Seasons and peak months of the produce in a recipe.
///
/// Unions the peak months of every matched produce ingredient. No match, or
/// produce spanning the whole year, gives `[all]`.
pub fn determine_seasons(ingredients: &[Ingredient]) -> (Vec<Season>, Vec<u32>) {
    let mut months: BTreeSet<u32> = BTreeSet::new();

    for ingredient in ingredients
        .iter()
        .filter(|i| i.category == IngredientCategory::Produce)
    {
        let mut matched = ingredient
            .name_en
            .as_deref()
            .map(match_produce)
            .unwrap_or_default();
        if matched.is_empty() {
            matched = match_produce(&ingredient.name);
        }
        for produce in matched {
            tracing::debug!(ingredient = %ingredient.id, produce = %produce.name, "Seasonal match");
            months.extend(produce.peak_months.iter().copied());
        }
    }

    if months.is_empty() {
        return (vec![Season::All], Vec::new());
    }

    let peak_months: Vec<u32> = months.into_iter().collect();
    if peak_months.len() == 12 {
        return (vec![Season::All], peak_months);
    }

    let present: BTreeSet<u32> = peak_months.iter().copied().collect();
    let seasons = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter]
        .into_iter()
        .filter(|season| present.iter().any(|m| Season::of_month(*m) == *season))
        .collect();
    (seasons, peak_months)
}

#[derive(Debug, Clone, Copy)]
pub struct DetermineSeasons;

impl Enrichment for DetermineSeasons {
    fn enrichment_type(&self) -> &'static str {
        "determine_seasons"
    }

    fn display_name(&self) -> &'static str {
        "Determine Seasons"
    }

    fn description(&self) -> &'static str {
        "Infer seasons and peak months from the produce in the recipe"
    }

    fn output_fields(&self) -> &'static [&'static str] {
        &["seasons", "peakMonths"]
    }

    fn apply(
        &self,
        original: &RecipeDocument,
        _options: &EnrichOptions,
    ) -> Result<RecipeDocument, EnrichmentError> {
        let mut recipe = original.clone();
        let (seasons, peak_months) = determine_seasons(&recipe.ingredients);
        recipe.metadata.seasons = seasons;
        recipe.metadata.peak_months = peak_months;
        Ok(recipe)
    }
}
