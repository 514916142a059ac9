//! Nutrition aggregation, servings sanity check, and nutrition tags.

use crate::collaborators::NutrientProfile;
use crate::types::{NutritionConfidence, NutritionPerServing, RecipeMetadata, RecipeType};

/// kcal per serving above which a main course with few servings is suspect.
const MAIN_COURSE_KCAL_THRESHOLD: f64 = 2000.0;
/// Same, for any other recipe type.
const OTHER_KCAL_THRESHOLD: f64 = 1500.0;
/// kcal per serving that is suspect regardless of servings.
const EXTREME_KCAL_THRESHOLD: f64 = 3000.0;
/// Target kcal per serving used to re-estimate servings.
const TARGET_KCAL_PER_SERVING: f64 = 500.0;
const MIN_ESTIMATED_SERVINGS: i64 = 4;
const MAX_SERVINGS_MULTIPLIER: i64 = 4;

// Balanced-meal ranges, as a share of calories.
const BALANCED_PROTEIN: (f64, f64) = (15.0, 35.0);
const BALANCED_CARBS: (f64, f64) = (40.0, 65.0);
const BALANCED_FAT: (f64, f64) = (20.0, 35.0);

const HIGH_PROTEIN_GRAMS: f64 = 20.0;
const HIGH_PROTEIN_SHARE: f64 = 20.0;
const LOW_CALORIE_KCAL: f64 = 400.0;
const HIGH_FIBER_GRAMS: f64 = 6.0;

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whole-recipe nutrient totals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct NutrientTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub fiber: f64,
}

impl NutrientTotals {
    /// Add `grams` of an ingredient with the given per-100 g profile.
    pub fn add(&mut self, profile: &NutrientProfile, grams: f64) {
        let factor = grams / 100.0;
        self.calories += profile.calories * factor;
        self.protein += profile.protein * factor;
        self.fat += profile.fat * factor;
        self.carbs += profile.carbs * factor;
        self.fiber += profile.fiber * factor;
    }

    pub fn per_serving(
        &self,
        servings: i64,
        resolved: usize,
        total: usize,
        issues: Vec<String>,
    ) -> NutritionPerServing {
        let servings = servings.max(1) as f64;
        let confidence = if total == 0 {
            NutritionConfidence::None
        } else {
            NutritionConfidence::from_resolved_fraction(resolved as f64 / total as f64)
        };
        NutritionPerServing {
            calories: round1(self.calories / servings),
            protein: round1(self.protein / servings),
            fat: round1(self.fat / servings),
            carbs: round1(self.carbs / servings),
            fiber: round1(self.fiber / servings),
            confidence,
            resolved_ingredients: resolved,
            total_ingredients: total,
            nutrition_issues: issues,
        }
    }
}

/// Re-estimate servings when per-serving calories are implausible.
///
/// Source recipes often state "1 serving" for a whole cake. When a recipe with
/// two servings or fewer exceeds the kcal threshold for its type, or any recipe
/// exceeds 3000 kcal per serving, servings are raised toward 500 kcal each
/// (at least 4, at most four times the stated value) and per-serving values are
/// rescaled. Returns whether servings changed.
pub fn adjust_suspect_servings(metadata: &mut RecipeMetadata) -> bool {
    let Some(servings) = metadata.serving_count() else {
        return false;
    };
    let Some(nutrition) = metadata.nutrition_per_serving.as_mut() else {
        return false;
    };
    if nutrition.confidence == NutritionConfidence::None {
        return false;
    }

    let threshold = if metadata.recipe_type == Some(RecipeType::MainCourse) {
        MAIN_COURSE_KCAL_THRESHOLD
    } else {
        OTHER_KCAL_THRESHOLD
    };
    let kcal = nutrition.calories;
    let suspect = (servings <= 2 && kcal > threshold) || kcal > EXTREME_KCAL_THRESHOLD;
    if !suspect {
        return false;
    }

    let by_target = (kcal * servings as f64 / TARGET_KCAL_PER_SERVING).round() as i64;
    let estimated = by_target
        .max(MIN_ESTIMATED_SERVINGS)
        .min(servings * MAX_SERVINGS_MULTIPLIER);
    if estimated <= servings {
        return false;
    }

    let ratio = servings as f64 / estimated as f64;
    nutrition.calories = round1(nutrition.calories * ratio);
    nutrition.protein = round1(nutrition.protein * ratio);
    nutrition.fat = round1(nutrition.fat * ratio);
    nutrition.carbs = round1(nutrition.carbs * ratio);
    nutrition.fiber = round1(nutrition.fiber * ratio);
    nutrition.nutrition_issues.push(format!(
        "servings adjusted from {} to {} ({} kcal per serving)",
        servings, estimated, kcal
    ));

    tracing::warn!(
        title = %metadata.title,
        from = servings,
        to = estimated,
        kcal,
        "Suspect servings, rescaled nutrition"
    );

    if metadata.servings_original.is_none() {
        metadata.servings_original = metadata.servings;
    }
    metadata.servings_suspect = Some(true);
    metadata.servings = Some(estimated as f64);
    true
}

/// Undo an earlier [`adjust_suspect_servings`], so nutrition is always
/// computed from the servings the source stated.
pub fn restore_stated_servings(metadata: &mut RecipeMetadata) {
    if let Some(original) = metadata.servings_original.take() {
        metadata.servings = Some(original);
    }
    metadata.servings_suspect = None;
}

/// Descriptive tags for a per-serving nutrition estimate.
pub fn nutrition_tags(nutrition: &NutritionPerServing) -> Vec<String> {
    let kcal = nutrition.calories;
    if nutrition.confidence == NutritionConfidence::None || kcal <= 0.0 {
        return Vec::new();
    }

    let pct_protein = 100.0 * nutrition.protein * 4.0 / kcal;
    let pct_carbs = 100.0 * nutrition.carbs * 4.0 / kcal;
    let pct_fat = 100.0 * nutrition.fat * 9.0 / kcal;
    let within = |value: f64, (low, high): (f64, f64)| value >= low && value <= high;

    let mut tags = Vec::new();
    if within(pct_protein, BALANCED_PROTEIN)
        && within(pct_carbs, BALANCED_CARBS)
        && within(pct_fat, BALANCED_FAT)
    {
        tags.push("balanced".to_string());
    }
    if nutrition.fiber >= HIGH_FIBER_GRAMS {
        tags.push("high-fiber".to_string());
    }
    if nutrition.protein >= HIGH_PROTEIN_GRAMS && pct_protein >= HIGH_PROTEIN_SHARE {
        tags.push("high-protein".to_string());
    }
    if kcal <= LOW_CALORIE_KCAL {
        tags.push("low-calorie".to_string());
    }
    tags
}
