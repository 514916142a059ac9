//! Preparation time from the step graph.
//!
//! Independent branches run concurrently, so the total is the longest
//! duration-weighted path through the step DAG rather than the sum of all steps.

use crate::duration::{minutes_to_iso8601, parse_duration};
use crate::graph::StepGraph;
use crate::types::{RecipeDocument, RecipeMetadata, Step};
use serde::{Deserialize, Serialize};

/// Minutes assumed for a step with inputs but no stated duration.
pub const DEFAULT_FALLBACK_STEP_MINUTES: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingOptions {
    pub fallback_step_minutes: f64,
}

impl Default for TimingOptions {
    fn default() -> Self {
        Self {
            fallback_step_minutes: DEFAULT_FALLBACK_STEP_MINUTES,
        }
    }
}

/// Computed preparation times, in minutes and as ISO-8601 durations.
///
/// `total_time_minutes` always equals active plus passive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeTimes {
    pub total_time_minutes: f64,
    pub total_active_time_minutes: f64,
    pub total_passive_time_minutes: f64,
    pub total_time: String,
    pub total_active_time: String,
    pub total_passive_time: String,
}

impl RecipeTimes {
    pub fn zero() -> Self {
        Self::from_parts(0.0, 0.0)
    }

    fn from_parts(active: f64, passive: f64) -> Self {
        let total = active + passive;
        Self {
            total_time_minutes: total,
            total_active_time_minutes: active,
            total_passive_time_minutes: passive,
            total_time: minutes_to_iso8601(total),
            total_active_time: minutes_to_iso8601(active),
            total_passive_time: minutes_to_iso8601(passive),
        }
    }

    /// Write the six time fields into recipe metadata.
    pub fn apply_to(&self, metadata: &mut RecipeMetadata) {
        metadata.total_time = Some(self.total_time.clone());
        metadata.total_active_time = Some(self.total_active_time.clone());
        metadata.total_passive_time = Some(self.total_passive_time.clone());
        metadata.total_time_minutes = Some(self.total_time_minutes);
        metadata.total_active_time_minutes = Some(self.total_active_time_minutes);
        metadata.total_passive_time_minutes = Some(self.total_passive_time_minutes);
    }
}

/// Duration of one step in minutes.
///
/// A step without a stated duration takes the fallback, except a step with no
/// inputs (a trigger such as preheating), which takes zero.
pub fn step_duration_minutes(step: &Step, options: &TimingOptions) -> f64 {
    match step.duration.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(text) => parse_duration(Some(text)),
        None if step.uses.is_empty() => 0.0,
        None => options.fallback_step_minutes,
    }
}

pub fn calculate_times_from_dag(doc: &RecipeDocument) -> RecipeTimes {
    calculate_times_from_dag_with(doc, &TimingOptions::default())
}

/// Longest path through the step DAG, split into active and passive time.
///
/// The split follows one critical path: from the step finishing last, back
/// through the latest-finishing dependency of each step. Ties resolve to the
/// step producing `finalState`, then to the earliest step in the document.
///
/// A cyclic graph has no longest path; it falls back to the linear sum.
pub fn calculate_times_from_dag_with(doc: &RecipeDocument, options: &TimingOptions) -> RecipeTimes {
    if doc.steps.is_empty() {
        return RecipeTimes::zero();
    }

    let graph = StepGraph::build(&doc.steps);
    if graph.has_cycle() {
        tracing::warn!(
            title = %doc.metadata.title,
            steps = graph.cycle_members().len(),
            "Step graph has a cycle, using linear time estimate"
        );
        return calculate_linear_times_with(doc, options);
    }

    let durations: Vec<f64> = doc
        .steps
        .iter()
        .map(|s| step_duration_minutes(s, options))
        .collect();

    let mut finish = vec![0.0_f64; doc.steps.len()];
    let mut critical_dep: Vec<Option<usize>> = vec![None; doc.steps.len()];

    for &idx in graph.topological_order() {
        let mut start = 0.0;
        for &dep in graph.dependencies(idx) {
            if critical_dep[idx].is_none() || finish[dep] > start {
                start = finish[dep];
                critical_dep[idx] = Some(dep);
            }
        }
        finish[idx] = start + durations[idx];
    }

    let mut end = 0;
    for idx in 1..finish.len() {
        if finish[idx] > finish[end] {
            end = idx;
        }
    }
    if let Some(final_idx) = doc
        .steps
        .iter()
        .position(|s| !s.produces.is_empty() && s.produces == doc.final_state)
    {
        if finish[final_idx] >= finish[end] {
            end = final_idx;
        }
    }

    let (mut active, mut passive) = (0.0, 0.0);
    let mut cursor = Some(end);
    while let Some(idx) = cursor {
        if doc.steps[idx].is_passive {
            passive += durations[idx];
        } else {
            active += durations[idx];
        }
        cursor = critical_dep[idx];
    }

    RecipeTimes::from_parts(active, passive)
}

pub fn calculate_linear_times(doc: &RecipeDocument) -> RecipeTimes {
    calculate_linear_times_with(doc, &TimingOptions::default())
}

/// Flat sum of every step duration, ignoring graph structure.
///
/// Overestimates any recipe with parallel branches; for data without a usable
/// step graph.
pub fn calculate_linear_times_with(doc: &RecipeDocument, options: &TimingOptions) -> RecipeTimes {
    let (mut active, mut passive) = (0.0, 0.0);
    for step in &doc.steps {
        let minutes = step_duration_minutes(step, options);
        if step.is_passive {
            passive += minutes;
        } else {
            active += minutes;
        }
    }
    RecipeTimes::from_parts(active, passive)
}
