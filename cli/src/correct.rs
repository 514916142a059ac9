//! `correct` command.

use crate::selection::select_recipes;
use anyhow::{Context, Result};
use cocotte_core::references::correct_step_references_within;
use cocotte_core::storage::{load_document, save_document, slug_of};
use cocotte_core::{CorrectionReport, Recipe};
use std::path::Path;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CorrectSummary {
    pub corrected: usize,
    pub dropped: usize,
    pub saved: usize,
    /// Recipes still refused after correction.
    pub still_invalid: usize,
    /// Files that could not be read.
    pub skipped: usize,
}

pub fn correct(
    dir: &Path,
    slugs: &[String],
    max_distance: usize,
    dry_run: bool,
) -> Result<CorrectSummary> {
    let mut summary = CorrectSummary::default();

    for path in select_recipes(dir, slugs)? {
        let slug = slug_of(&path).unwrap_or("?").to_string();
        let mut doc = match load_document(&path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(recipe = %slug, error = %e, "Skipping unreadable recipe");
                summary.skipped += 1;
                continue;
            }
        };

        let ingredient_ids = doc.ingredient_ids();
        let produced_states = doc.produced_states();
        let report: CorrectionReport = correct_step_references_within(
            &mut doc.steps,
            &ingredient_ids,
            &produced_states,
            max_distance,
        );
        if report.is_clean() {
            continue;
        }

        summary.corrected += report.corrected;
        summary.dropped += report.dropped;
        println!(
            "{}: {} corrected, {} dropped",
            slug, report.corrected, report.dropped
        );

        match Recipe::try_from_document(doc) {
            Ok(recipe) if !dry_run => {
                save_document(dir, &slug, &recipe)
                    .with_context(|| format!("Failed to save {}", slug))?;
                summary.saved += 1;
            }
            Ok(_) => {}
            Err(e) => {
                summary.still_invalid += 1;
                println!("  still invalid, not saved: {}", e);
            }
        }
    }

    Ok(summary)
}
