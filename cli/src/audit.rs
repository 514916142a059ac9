//! `audit` and `validate` commands.

use crate::selection::select_recipes;
use anyhow::{Context, Result};
use cocotte_core::storage::{load_recipe, slug_of};
use cocotte_core::{audit_directory, AuditReport, RecipeError};
use std::fs;
use std::path::Path;

/// Audit the whole directory and print or write the report.
pub fn audit(dir: &Path, json: bool, output: Option<&Path>) -> Result<AuditReport> {
    let report = audit_directory(dir)
        .with_context(|| format!("Failed to audit recipes in {}", dir.display()))?;

    let rendered = if json {
        serde_json::to_string_pretty(&report).context("Failed to serialize audit report")?
    } else {
        report.render()
    };

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!(
                "Audited {} recipes, report written to {}",
                report.summary.total_files,
                path.display()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(report)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ValidateSummary {
    pub checked: usize,
    pub blocked: usize,
}

/// Construct each selected recipe and list blocking issues for those that fail.
pub fn validate(dir: &Path, slugs: &[String]) -> Result<ValidateSummary> {
    let mut summary = ValidateSummary::default();

    for path in select_recipes(dir, slugs)? {
        summary.checked += 1;
        let slug = slug_of(&path).unwrap_or("?");
        match load_recipe(&path) {
            Ok(recipe) => {
                println!("ok    {} ({} advisory issues)", slug, recipe.issues().len());
            }
            Err(RecipeError::Validation(blocking)) => {
                summary.blocked += 1;
                println!("FAIL  {}", slug);
                for violation in &blocking {
                    println!("        {}", violation);
                }
            }
            Err(e) => {
                summary.blocked += 1;
                println!("FAIL  {}: {}", slug, e);
            }
        }
    }

    Ok(summary)
}
