//! `enrich` command.
//!
//! Nutrition needs a provider (`--provider` or `COCOTTE_NUTRITION_PROVIDER`).
//! Lookups go through the persistent enrichment cache.

use crate::selection::select_recipes;
use anyhow::{Context, Result};
use cocotte_core::storage::{load_document, save_document, slug_of};
use cocotte_core::{
    create_collaborators, CocotteConfig, EnrichOptions, EnrichmentCache, EnrichmentError, Recipe,
    RecipeDocument, RecipeEnricher,
};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub enriched: usize,
    pub skipped: usize,
}

fn describe(doc: &RecipeDocument) -> String {
    let meta = &doc.metadata;
    let diets: Vec<&str> = meta.diets.iter().map(|d| d.as_str()).collect();
    let seasons: Vec<&str> = meta.seasons.iter().map(|s| s.as_str()).collect();
    let mut line = format!(
        "diets [{}], seasons [{}], total {}",
        diets.join(", "),
        seasons.join(", "),
        meta.total_time.as_deref().unwrap_or("?")
    );
    if let Some(n) = &meta.nutrition_per_serving {
        line.push_str(&format!(", {} kcal/serving ({:?})", n.calories, n.confidence));
    }
    line
}

pub async fn enrich(
    config: &CocotteConfig,
    slugs: &[String],
    nutrition: bool,
    dry_run: bool,
) -> Result<EnrichSummary> {
    let dir = &config.recipes_dir;
    let options = EnrichOptions {
        timing: config.timing_options(),
        ..EnrichOptions::default()
    };

    let mut enricher = RecipeEnricher::new(options);
    if nutrition {
        let provider = config
            .nutrition_provider
            .as_deref()
            .ok_or(EnrichmentError::NotConfigured("nutrition provider"))?;
        let (translator, matcher) = create_collaborators(provider)
            .with_context(|| format!("Cannot use nutrition provider '{}'", provider))?;
        let cache = EnrichmentCache::load(&config.cache_path).with_context(|| {
            format!("Failed to load enrichment cache {}", config.cache_path.display())
        })?;
        tracing::info!(provider, cache = %config.cache_path.display(), "Estimating nutrition");
        enricher = enricher
            .with_translator(translator)
            .with_matcher(matcher)
            .with_cache(cache);
    }

    let mut summary = EnrichSummary::default();
    for path in select_recipes(dir, slugs)? {
        let slug = slug_of(&path).unwrap_or("?").to_string();
        let doc = match load_document(&path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(recipe = %slug, error = %e, "Skipping unreadable recipe");
                summary.skipped += 1;
                continue;
            }
        };

        let enriched = if nutrition {
            enricher.enrich_recipe_async(&doc).await?
        } else {
            enricher.enrich_recipe(&doc)
        };

        let recipe = match Recipe::try_from_document(enriched) {
            Ok(recipe) => recipe,
            Err(e) => {
                tracing::warn!(recipe = %slug, error = %e, "Skipping invalid recipe");
                summary.skipped += 1;
                continue;
            }
        };

        println!("{}: {}", slug, describe(recipe.document()));
        if !dry_run {
            save_document(dir, &slug, &recipe)
                .with_context(|| format!("Failed to save {}", slug))?;
        }
        summary.enriched += 1;
    }

    if nutrition && enricher.save_cache().context("Failed to save enrichment cache")? {
        println!("Saved enrichment cache to {}", config.cache_path.display());
    }

    Ok(summary)
}
