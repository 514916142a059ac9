//! Repair of near-miss step references.
//!
//! Structured steps arrive from a language model and sometimes point at
//! identifiers that almost exist: `flor` for `flour`, `tomatoe` for `tomato`.
//! This pass snaps each dangling reference to the closest known identifier when
//! it is within a small edit distance and drops it otherwise. It never invents
//! identifiers and never fails.

use crate::types::Step;
use std::collections::HashSet;

/// Largest accepted Levenshtein distance (inclusive).
pub const MAX_REFERENCE_DISTANCE: usize = 3;

/// Counts of what a correction pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionReport {
    pub corrected: usize,
    pub dropped: usize,
}

impl CorrectionReport {
    pub fn is_clean(&self) -> bool {
        self.corrected == 0 && self.dropped == 0
    }
}

/// Find the identifier closest to `reference`.
///
/// Returns the reference itself on an exact match, otherwise the candidate with
/// the smallest edit distance if that distance is at most `max_distance`. Ties
/// go to the lexicographically smallest candidate.
pub fn fuzzy_match_id<'a>(
    reference: &str,
    candidates: &'a HashSet<String>,
    max_distance: usize,
) -> Option<&'a str> {
    if let Some(exact) = candidates.get(reference) {
        return Some(exact.as_str());
    }

    let mut sorted: Vec<&String> = candidates.iter().collect();
    sorted.sort();

    let mut best: Option<(&str, usize)> = None;
    for candidate in sorted {
        let distance = strsim::levenshtein(reference, candidate);
        if distance > max_distance {
            continue;
        }
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate.as_str(), distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Correct every `uses` and `requires` reference in place.
///
/// `uses` may point at ingredients or produced states; `requires` only at
/// produced states. Unmatched references are removed.
pub fn correct_step_references(
    steps: &mut [Step],
    ingredient_ids: &HashSet<String>,
    produced_states: &HashSet<String>,
) -> CorrectionReport {
    correct_step_references_within(
        steps,
        ingredient_ids,
        produced_states,
        MAX_REFERENCE_DISTANCE,
    )
}

/// [`correct_step_references`] with an explicit distance threshold.
pub fn correct_step_references_within(
    steps: &mut [Step],
    ingredient_ids: &HashSet<String>,
    produced_states: &HashSet<String>,
    max_distance: usize,
) -> CorrectionReport {
    let all_ids: HashSet<String> = ingredient_ids.union(produced_states).cloned().collect();
    let mut report = CorrectionReport::default();

    for step in steps.iter_mut() {
        step.uses = correct_list(&step.id, "uses", &step.uses, &all_ids, max_distance, &mut report);
        step.requires = correct_list(
            &step.id,
            "requires",
            &step.requires,
            produced_states,
            max_distance,
            &mut report,
        );
    }

    if !report.is_clean() {
        tracing::info!(
            corrected = report.corrected,
            dropped = report.dropped,
            "Corrected step references"
        );
    }
    report
}

fn correct_list(
    step_id: &str,
    field: &str,
    references: &[String],
    candidates: &HashSet<String>,
    max_distance: usize,
    report: &mut CorrectionReport,
) -> Vec<String> {
    let mut kept = Vec::with_capacity(references.len());
    for reference in references {
        match fuzzy_match_id(reference, candidates, max_distance) {
            Some(matched) if matched == reference => kept.push(reference.clone()),
            Some(matched) => {
                tracing::warn!(
                    step = %step_id,
                    field,
                    from = %reference,
                    to = %matched,
                    "Fuzzy-corrected reference"
                );
                report.corrected += 1;
                kept.push(matched.to_string());
            }
            None => {
                tracing::error!(
                    step = %step_id,
                    field,
                    reference = %reference,
                    "Dropped unresolvable reference"
                );
                report.dropped += 1;
            }
        }
    }
    kept
}

/// Build a snake_case identifier from an ingredient name.
///
/// Accented Latin letters are folded to ASCII; runs of anything else collapse
/// into a single underscore.
pub fn make_ingredient_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.trim().to_lowercase().chars() {
        let folded = match c {
            'à' | 'á' | 'â' | 'ä' | 'ã' | 'å' => 'a',
            'ç' => 'c',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ñ' => 'n',
            'ò' | 'ó' | 'ô' | 'ö' | 'õ' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ÿ' => 'y',
            'œ' => {
                push_word(&mut id, &mut pending_separator, "oe");
                continue;
            }
            'æ' => {
                push_word(&mut id, &mut pending_separator, "ae");
                continue;
            }
            other => other,
        };
        if folded.is_ascii_alphanumeric() {
            let mut buf = [0u8; 4];
            push_word(&mut id, &mut pending_separator, folded.encode_utf8(&mut buf));
        } else {
            pending_separator = true;
        }
    }
    id
}

fn push_word(id: &mut String, pending_separator: &mut bool, text: &str) {
    if *pending_separator && !id.is_empty() {
        id.push('_');
    }
    *pending_separator = false;
    id.push_str(text);
}
