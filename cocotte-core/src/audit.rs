//! Batch data-quality audit over a directory of recipe documents.
//!
//! Every file is checked independently with [`validate`]. A file that cannot be
//! read or parsed becomes a CRITICAL `json` issue and the batch moves on.

use crate::error::RecipeError;
use crate::storage::{load_document, recipe_files, slug_of};
use crate::validation::{validate, Severity, Violation, ViolationCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Number of recipes listed under "top offenders".
pub const TOP_OFFENDERS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAudit {
    pub slug: String,
    pub path: String,
    pub issues: Vec<Violation>,
}

impl FileAudit {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|v| v.severity == severity).count()
    }

    /// Whether [`Recipe::try_from_document`](crate::Recipe::try_from_document) would refuse it.
    pub fn is_blocked(&self) -> bool {
        self.issues.iter().any(Violation::is_blocking)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_files: usize,
    pub clean_files: usize,
    pub blocked_files: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_category: BTreeMap<ViolationCategory, usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditReport {
    pub files: Vec<FileAudit>,
    pub summary: AuditSummary,
}

impl AuditReport {
    pub fn from_files(files: Vec<FileAudit>) -> Self {
        let mut summary = AuditSummary {
            total_files: files.len(),
            ..AuditSummary::default()
        };
        for file in &files {
            if file.issues.is_empty() {
                summary.clean_files += 1;
            }
            if file.is_blocked() {
                summary.blocked_files += 1;
            }
            for issue in &file.issues {
                *summary.by_severity.entry(issue.severity).or_default() += 1;
                *summary.by_category.entry(issue.category).or_default() += 1;
            }
        }
        Self { files, summary }
    }

    /// Recipes with the most severe issues first, then the most issues.
    pub fn top_offenders(&self, limit: usize) -> Vec<&FileAudit> {
        let mut ranked: Vec<&FileAudit> = self.files.iter().filter(|f| !f.issues.is_empty()).collect();
        ranked.sort_by(|a, b| {
            let key = |f: &FileAudit| {
                (
                    f.count(Severity::Critical),
                    f.count(Severity::Error),
                    f.issues.len(),
                )
            };
            key(b).cmp(&key(a)).then_with(|| a.slug.cmp(&b.slug))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Stable, diffable markdown summary.
    pub fn render(&self) -> String {
        let s = &self.summary;
        let mut report = String::new();

        report.push_str("# Recipe Audit Report\n\n");
        report.push_str("## Overall\n\n");
        report.push_str(&format!("- Recipes: {}\n", s.total_files));
        report.push_str(&format!(
            "- Clean: {} ({:.1}%)\n",
            s.clean_files,
            pct(s.clean_files, s.total_files)
        ));
        report.push_str(&format!(
            "- Blocked: {} ({:.1}%)\n",
            s.blocked_files,
            pct(s.blocked_files, s.total_files)
        ));

        report.push_str("\n## By Severity\n\n");
        for severity in Severity::ALL {
            let count = s.by_severity.get(severity).copied().unwrap_or(0);
            report.push_str(&format!("- {}: {}\n", severity, count));
        }

        if !s.by_category.is_empty() {
            report.push_str("\n## By Category\n\n");
            report.push_str("| Category | Issues |\n");
            report.push_str("|----------|--------|\n");
            for (category, count) in &s.by_category {
                report.push_str(&format!("| {} | {} |\n", category, count));
            }
        }

        let offenders = self.top_offenders(TOP_OFFENDERS);
        if !offenders.is_empty() {
            report.push_str("\n## Top Offenders\n\n");
            for file in offenders {
                report.push_str(&format!(
                    "- {}: {} critical, {} error, {} warning\n",
                    file.slug,
                    file.count(Severity::Critical),
                    file.count(Severity::Error),
                    file.count(Severity::Warning)
                ));
            }
        }

        report
    }
}

fn pct(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64 * 100.0
    }
}

/// Audit one file. Never fails: load errors become issues.
pub fn audit_file(path: &Path) -> FileAudit {
    let slug = slug_of(path)
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string());

    let issues = match load_document(path) {
        Ok(doc) => validate(&doc),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable recipe, continuing");
            vec![Violation::new(Severity::Critical, ViolationCategory::Json, e.to_string())]
        }
    };

    FileAudit {
        slug,
        path: path.display().to_string(),
        issues,
    }
}

/// Audit every `*.recipe.json` in `dir`.
///
/// Fails only if the directory itself cannot be listed.
pub fn audit_directory(dir: &Path) -> Result<AuditReport, RecipeError> {
    let files = recipe_files(dir)?;
    tracing::info!(dir = %dir.display(), count = files.len(), "Auditing recipes");

    let audits: Vec<FileAudit> = files.iter().map(|p| audit_file(p)).collect();
    let report = AuditReport::from_files(audits);

    tracing::info!(
        total = report.summary.total_files,
        clean = report.summary.clean_files,
        blocked = report.summary.blocked_files,
        "Audit complete"
    );
    Ok(report)
}
