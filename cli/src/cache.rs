//! `cache-stats` command.

use anyhow::{Context, Result};
use cocotte_core::{CacheStats, EnrichmentCache};
use std::path::Path;

pub fn cache_stats(path: &Path, clear: bool) -> Result<CacheStats> {
    let mut cache = EnrichmentCache::load(path)
        .with_context(|| format!("Failed to load enrichment cache {}", path.display()))?;
    let stats = cache.stats();

    println!("Enrichment cache: {}", path.display());
    println!("  translations: {}", stats.translations);
    println!("  nutrition:    {}", stats.nutrition);

    if clear {
        cache.clear();
        if cache.save().context("Failed to save cleared cache")? {
            println!("Cleared {} entries", stats.translations + stats.nutrition);
        }
    }

    Ok(stats)
}
