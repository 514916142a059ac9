use super::nutrition::{
    adjust_suspect_servings, nutrition_tags, restore_stated_servings, NutrientTotals,
};
use super::{run_all_enrichments, EnrichOptions, EnrichmentError};
use crate::cache::EnrichmentCache;
use crate::collaborators::{IngredientTranslator, NutrientProfile, NutritionMatcher};
use crate::types::RecipeDocument;
use crate::weights::{estimate_grams, is_negligible};
use std::sync::Arc;
use tracing::{info_span, Instrument};

/// Orchestrates recipe enrichment.
///
/// [`enrich_recipe`](Self::enrich_recipe) runs the deterministic enrichments
/// (diets, seasons, times). [`enrich_recipe_async`](Self::enrich_recipe_async)
/// additionally estimates nutrition through the injected translator and matcher,
/// memoizing their answers in the injected cache.
#[derive(Debug)]
pub struct RecipeEnricher {
    options: EnrichOptions,
    translator: Option<Arc<dyn IngredientTranslator>>,
    matcher: Option<Arc<dyn NutritionMatcher>>,
    cache: EnrichmentCache,
}

impl Default for RecipeEnricher {
    fn default() -> Self {
        Self::new(EnrichOptions::default())
    }
}

impl RecipeEnricher {
    pub fn new(options: EnrichOptions) -> Self {
        Self {
            options,
            translator: None,
            matcher: None,
            cache: EnrichmentCache::in_memory(),
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn IngredientTranslator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn NutritionMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn with_cache(mut self, cache: EnrichmentCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn options(&self) -> &EnrichOptions {
        &self.options
    }

    pub fn cache(&self) -> &EnrichmentCache {
        &self.cache
    }

    /// Persist the cache if it is file-backed and has new entries.
    pub fn save_cache(&mut self) -> Result<bool, EnrichmentError> {
        Ok(self.cache.save()?)
    }

    pub fn into_cache(self) -> EnrichmentCache {
        self.cache
    }

    /// Diets, seasons and critical-path times. Pure and idempotent.
    pub fn enrich_recipe(&self, recipe: &RecipeDocument) -> RecipeDocument {
        let _span = info_span!("enrich_recipe", title = %recipe.metadata.title).entered();
        let (enriched, errors) = run_all_enrichments(recipe, &self.options);
        if !errors.is_empty() {
            tracing::warn!(failed = errors.len(), "Some enrichments failed");
        }
        enriched
    }

    /// Everything [`enrich_recipe`](Self::enrich_recipe) does, plus nutrition.
    ///
    /// Fails only when no translator or matcher is configured; individual
    /// lookup failures leave that ingredient unresolved.
    pub async fn enrich_recipe_async(
        &mut self,
        recipe: &RecipeDocument,
    ) -> Result<RecipeDocument, EnrichmentError> {
        let mut enriched = self.enrich_recipe(recipe);
        let span = info_span!("enrich_nutrition", title = %recipe.metadata.title);
        self.enrich_nutrition(&mut enriched).instrument(span).await?;
        Ok(enriched)
    }

    async fn enrich_nutrition(&mut self, recipe: &mut RecipeDocument) -> Result<(), EnrichmentError> {
        let translator = self
            .translator
            .clone()
            .ok_or(EnrichmentError::NotConfigured("ingredient translator"))?;
        let matcher = self
            .matcher
            .clone()
            .ok_or(EnrichmentError::NotConfigured("nutrition matcher"))?;

        let mut totals = NutrientTotals::default();
        let mut issues = Vec::new();
        let mut resolved = 0;
        let mut counted = 0;

        for ingredient in recipe.ingredients.iter_mut() {
            if ingredient.name_en.as_deref().map_or(true, |n| n.trim().is_empty()) {
                ingredient.name_en = self
                    .translate(translator.as_ref(), &ingredient.name)
                    .await;
            }
            ingredient.estimated_weight_grams = estimate_grams(ingredient);

            if ingredient.optional {
                continue;
            }
            counted += 1;

            let name_en = ingredient.display_name_en().to_string();
            if is_negligible(&name_en) {
                resolved += 1;
                continue;
            }
            let Some(grams) = ingredient.estimated_weight_grams else {
                issues.push(format!("no weight estimate for '{}'", ingredient.name));
                continue;
            };
            match self.lookup_nutrition(matcher.as_ref(), &name_en).await {
                Some(profile) => {
                    totals.add(&profile, grams);
                    resolved += 1;
                }
                None => issues.push(format!("no nutrition match for '{}'", name_en)),
            }
        }

        restore_stated_servings(&mut recipe.metadata);
        let servings = recipe.metadata.serving_count().unwrap_or(1);
        let per_serving = totals.per_serving(servings, resolved, counted, issues);
        tracing::info!(
            calories = per_serving.calories,
            resolved,
            total = counted,
            "Estimated nutrition"
        );

        let metadata = &mut recipe.metadata;
        metadata.nutrition_per_serving = Some(per_serving);
        adjust_suspect_servings(metadata);
        metadata.nutrition_tags = metadata
            .nutrition_per_serving
            .as_ref()
            .map(nutrition_tags)
            .unwrap_or_default();
        Ok(())
    }

    async fn translate(&mut self, translator: &dyn IngredientTranslator, name: &str) -> Option<String> {
        if let Some(cached) = self.cache.translation(name) {
            tracing::debug!(name, "Translation cache hit");
            return Some(cached.to_string());
        }
        match translator
            .translate(name, &self.options.source_language)
            .await
        {
            Ok(Some(name_en)) => {
                self.cache.insert_translation(name, &name_en);
                Some(name_en)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    translator = translator.translator_name(),
                    name,
                    error = %e,
                    "Translation failed, continuing"
                );
                None
            }
        }
    }

    async fn lookup_nutrition(
        &mut self,
        matcher: &dyn NutritionMatcher,
        name_en: &str,
    ) -> Option<NutrientProfile> {
        if let Some(cached) = self.cache.nutrition(name_en) {
            tracing::debug!(name_en, "Nutrition cache hit");
            return cached;
        }
        let answer = matcher
            .match_nutrition(name_en)
            .await
            .and_then(|profile| profile.map(NutrientProfile::checked).transpose());
        match answer {
            Ok(profile) => {
                self.cache.insert_nutrition(name_en, profile);
                profile
            }
            Err(e) => {
                tracing::warn!(
                    matcher = matcher.matcher_name(),
                    name_en,
                    error = %e,
                    "Nutrition lookup failed, continuing"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{FakeMatcher, FakeTranslator};
    use crate::types::{Diet, Ingredient, IngredientCategory, NutritionConfidence, Step, Unit};

    fn crepes() -> RecipeDocument {
        let ingredient = |id: &str, name: &str, qty: f64, unit: &str, category: IngredientCategory| Ingredient {
            id: id.to_string(),
            name: name.to_string(),
            quantity: Some(qty),
            unit: Some(Unit::parse(unit)),
            category,
            ..Ingredient::default()
        };
        let mut doc = RecipeDocument {
            ingredients: vec![
                ingredient("farine", "Farine", 250.0, "g", IngredientCategory::Grain),
                ingredient("lait", "Lait", 50.0, "cl", IngredientCategory::Dairy),
                ingredient("oeufs", "Oeufs", 4.0, "pièce", IngredientCategory::Egg),
                ingredient("sel", "Sel", 1.0, "pincée", IngredientCategory::Spice),
            ],
            steps: vec![
                Step {
                    id: "s1".to_string(),
                    action: "Mélanger".to_string(),
                    uses: vec!["farine".into(), "lait".into(), "oeufs".into(), "sel".into()],
                    produces: "pate".to_string(),
                    duration: Some("PT10M".to_string()),
                    ..Step::default()
                },
                Step {
                    id: "s2".to_string(),
                    action: "Laisser reposer".to_string(),
                    uses: vec!["pate".into()],
                    produces: "pate_reposee".to_string(),
                    duration: Some("PT1H".to_string()),
                    is_passive: true,
                    ..Step::default()
                },
            ],
            final_state: "pate_reposee".to_string(),
            ..RecipeDocument::default()
        };
        doc.metadata.title = "Crêpes".to_string();
        doc.metadata.servings = Some(4.0);
        doc
    }

    fn translator() -> FakeTranslator {
        FakeTranslator::with_translations(&[
            ("farine", "flour"),
            ("lait", "milk"),
            ("oeufs", "egg"),
            ("sel", "salt"),
        ])
    }

    #[test]
    fn test_enrich_recipe_sync() {
        let enricher = RecipeEnricher::default();
        let enriched = enricher.enrich_recipe(&crepes());
        assert_eq!(
            enriched.metadata.diets,
            vec![Diet::Vegetarian, Diet::Pescatarian, Diet::Omnivorous]
        );
        assert_eq!(enriched.metadata.total_time.as_deref(), Some("PT1H10M"));
        assert_eq!(enriched.metadata.total_passive_time_minutes, Some(60.0));
        assert!(enriched.metadata.nutrition_per_serving.is_none());
    }

    #[test]
    fn test_enrich_recipe_is_idempotent() {
        let enricher = RecipeEnricher::default();
        let once = enricher.enrich_recipe(&crepes());
        let twice = enricher.enrich_recipe(&once);
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_enrich_recipe_async_requires_collaborators() {
        let mut enricher = RecipeEnricher::default();
        let result = enricher.enrich_recipe_async(&crepes()).await;
        assert!(matches!(result, Err(EnrichmentError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_enrich_recipe_async_nutrition() {
        let mut enricher = RecipeEnricher::default()
            .with_translator(Arc::new(translator()))
            .with_matcher(Arc::new(FakeMatcher::with_staples()));

        let enriched = enricher.enrich_recipe_async(&crepes()).await.unwrap();

        assert_eq!(enriched.ingredients[0].name_en.as_deref(), Some("flour"));
        assert_eq!(enriched.ingredients[1].estimated_weight_grams, Some(500.0));
        assert_eq!(enriched.ingredients[2].estimated_weight_grams, Some(200.0));

        let n = enriched.metadata.nutrition_per_serving.unwrap();
        // flour 910 + milk 305 + egg 286 = 1501 kcal over 4 servings
        assert_eq!(n.calories, 375.3);
        assert_eq!(n.confidence, NutritionConfidence::High);
        assert_eq!(n.resolved_ingredients, 4);
        assert!(enriched.metadata.nutrition_tags.contains(&"low-calorie".to_string()));
        assert_eq!(enriched.metadata.total_time_minutes, Some(70.0));
    }

    #[tokio::test]
    async fn test_enrich_recipe_async_is_idempotent_after_servings_adjustment() {
        let mut enricher = RecipeEnricher::default()
            .with_translator(Arc::new(translator()))
            .with_matcher(Arc::new(FakeMatcher::with_staples()));
        let mut single = crepes();
        single.metadata.servings = Some(1.0);

        // 1501 kcal for a single serving is suspect
        let once = enricher.enrich_recipe_async(&single).await.unwrap();
        assert_eq!(once.metadata.servings, Some(4.0));
        assert_eq!(once.metadata.servings_original, Some(1.0));
        assert_eq!(once.metadata.nutrition_per_serving.as_ref().unwrap().calories, 375.3);

        let twice = enricher.enrich_recipe_async(&once).await.unwrap();
        assert_eq!(twice, once);
    }

    #[tokio::test]
    async fn test_malformed_profile_is_not_used_or_cached() {
        let matcher = FakeMatcher::with_staples().with_profile(
            "milk",
            NutrientProfile {
                calories: -61.0,
                ..NutrientProfile::default()
            },
        );
        let mut enricher = RecipeEnricher::default()
            .with_translator(Arc::new(translator()))
            .with_matcher(Arc::new(matcher));

        let enriched = enricher.enrich_recipe_async(&crepes()).await.unwrap();
        let n = enriched.metadata.nutrition_per_serving.unwrap();
        assert_eq!(n.resolved_ingredients, 3);
        assert!(n.nutrition_issues.iter().any(|i| i.contains("milk")));
        assert!(enricher.cache().nutrition("milk").is_none());
    }

    #[test]
    fn test_save_cache_reports_write_failure() {
        let dir = std::env::temp_dir().join(format!("cocotte-enricher-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        // the cache path's parent is a regular file
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let cache = EnrichmentCache::load(blocker.join("cache.json")).unwrap();

        let mut enricher = RecipeEnricher::default().with_cache(cache);
        assert!(!enricher.save_cache().unwrap());

        enricher.cache.insert_translation("beurre", "butter");
        assert!(matches!(enricher.save_cache(), Err(EnrichmentError::Cache(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_cache_avoids_repeat_lookups() {
        let translator = Arc::new(translator());
        let matcher = Arc::new(FakeMatcher::with_staples());
        let mut enricher = RecipeEnricher::default()
            .with_translator(translator.clone())
            .with_matcher(matcher.clone());

        enricher.enrich_recipe_async(&crepes()).await.unwrap();
        let translations = translator.calls();
        let lookups = matcher.calls();
        assert_eq!(translations, 4);
        // salt is negligible and never looked up
        assert_eq!(lookups, 3);

        enricher.enrich_recipe_async(&crepes()).await.unwrap();
        assert_eq!(translator.calls(), translations);
        assert_eq!(matcher.calls(), lookups);
        assert_eq!(enricher.cache().stats().translations, 4);
    }

    #[tokio::test]
    async fn test_lookup_failure_leaves_ingredient_unresolved() {
        let mut enricher = RecipeEnricher::default()
            .with_translator(Arc::new(translator()))
            .with_matcher(Arc::new(FakeMatcher::with_staples().fail_on("milk")));

        let enriched = enricher.enrich_recipe_async(&crepes()).await.unwrap();
        let n = enriched.metadata.nutrition_per_serving.unwrap();
        assert_eq!(n.resolved_ingredients, 3);
        assert_eq!(n.confidence, NutritionConfidence::Medium);
        assert!(n.nutrition_issues.iter().any(|i| i.contains("milk")));
        // failures are not cached
        assert_eq!(enricher.cache().nutrition("milk"), None);
    }
}
