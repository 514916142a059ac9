//! `times` command.

use crate::selection::select_recipes;
use anyhow::{Context, Result};
use cocotte_core::storage::{load_document, save_document, slug_of};
use cocotte_core::timing::calculate_times_from_dag_with;
use cocotte_core::{Recipe, RecipeTimes, TimingOptions};
use std::path::Path;

pub fn times(
    dir: &Path,
    slugs: &[String],
    options: &TimingOptions,
    write: bool,
) -> Result<Vec<(String, RecipeTimes)>> {
    let mut results = Vec::new();

    for path in select_recipes(dir, slugs)? {
        let slug = slug_of(&path).unwrap_or("?").to_string();
        let mut doc = match load_document(&path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(recipe = %slug, error = %e, "Skipping unreadable recipe");
                continue;
            }
        };
        let times = calculate_times_from_dag_with(&doc, options);

        println!(
            "{}: total {} (active {}, passive {})",
            slug, times.total_time, times.total_active_time, times.total_passive_time
        );

        if write {
            times.apply_to(&mut doc.metadata);
            match Recipe::try_from_document(doc) {
                Ok(recipe) => {
                    save_document(dir, &slug, &recipe)
                        .with_context(|| format!("Failed to save {}", slug))?;
                }
                Err(e) => {
                    tracing::warn!(recipe = %slug, error = %e, "Not saving invalid recipe, continuing");
                }
            }
        }

        results.push((slug, times));
    }

    Ok(results)
}
