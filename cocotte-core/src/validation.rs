//! Recipe graph validation.
//!
//! [`validate`] is the audit entry point: it walks every rule and returns every
//! issue it finds. [`Recipe::try_from_document`] runs the same rules and refuses
//! documents with blocking issues, so code holding a [`Recipe`] can walk its
//! graph without re-checking references or cycles.

use crate::error::RecipeError;
use crate::graph::StepGraph;
use crate::types::{NutritionConfidence, RecipeDocument, StepType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Violations at or above this severity block construction of a [`Recipe`].
pub const BLOCKING_SEVERITY: Severity = Severity::Critical;

/// Unused share of required ingredients above which the issue is an error.
pub const UNUSED_INGREDIENTS_ERROR_RATIO: f64 = 0.5;

/// Unused share above which a summary warning is raised.
pub const UNUSED_INGREDIENTS_WARNING_RATIO: f64 = 0.2;

/// Share of ingredients without an English name above which a warning is raised.
pub const MISSING_NAME_EN_RATIO: f64 = 0.2;

const MAX_SERVINGS: f64 = 50.0;
const MAX_TOTAL_MINUTES: f64 = 1440.0;
const MAX_TEMPERATURE_C: f64 = 350.0;
const MAX_CALORIES: f64 = 3000.0;
const MIN_CALORIES: f64 = 10.0;

/// Actions that legitimately start from nothing (equipment triggers).
const EQUIPMENT_KEYWORDS: &[&str] = &[
    "preheat",
    "pre-heat",
    "préchauffer",
    "préchauffez",
    "allumer",
    "préparer le four",
];

/// Sources that publish in French.
const FRENCH_SOURCES: &[&str] = &["marmiton", "papilles et pupilles", "free the pickle"];

/// English words that should not appear as ingredient names in French sources.
const ENGLISH_INGREDIENT_WORDS: &[&str] = &[
    "flour", "sugar", "butter", "salt", "pepper", "milk", "water", "egg", "oil", "chicken",
    "onion",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub const ALL: &'static [Severity] = &[Severity::Critical, Severity::Error, Severity::Warning];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationCategory {
    Metadata,
    Ingredients,
    Steps,
    Graph,
    Temperature,
    Nutrition,
    Language,
    /// The document could not be read or parsed at all.
    Json,
}

impl ViolationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCategory::Metadata => "metadata",
            ViolationCategory::Ingredients => "ingredients",
            ViolationCategory::Steps => "steps",
            ViolationCategory::Graph => "graph",
            ViolationCategory::Temperature => "temperature",
            ViolationCategory::Nutrition => "nutrition",
            ViolationCategory::Language => "language",
            ViolationCategory::Json => "json",
        }
    }
}

impl fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem found in a recipe document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub severity: Severity,
    pub category: ViolationCategory,
    pub message: String,
    /// Step or ingredient id the issue is about, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Violation {
    pub fn new(severity: Severity, category: ViolationCategory, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            subject: None,
        }
    }

    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity >= BLOCKING_SEVERITY
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)
    }
}

/// Collects violations for one validation run.
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn push(
        &mut self,
        severity: Severity,
        category: ViolationCategory,
        subject: Option<&str>,
        message: String,
    ) {
        let mut violation = Violation::new(severity, category, message);
        if let Some(subject) = subject.filter(|s| !s.is_empty()) {
            violation = violation.about(subject);
        }
        self.violations.push(violation);
    }
}

/// Run every rule against a document and return all issues found.
///
/// Never stops at the first problem. The result is ordered by rule, then by
/// position in the document, so the same input always yields the same list.
pub fn validate(doc: &RecipeDocument) -> Vec<Violation> {
    let mut checker = Checker {
        violations: Vec::new(),
    };

    check_metadata(doc, &mut checker);
    check_nutrition(doc, &mut checker);
    check_ingredients(doc, &mut checker);
    check_steps(doc, &mut checker);
    check_temperatures(doc, &mut checker);
    check_graph(doc, &mut checker);
    check_language(doc, &mut checker);

    checker.violations
}

fn check_metadata(doc: &RecipeDocument, checker: &mut Checker) {
    use Severity::*;
    use ViolationCategory::Metadata;
    let meta = &doc.metadata;

    if meta.title.trim().is_empty() {
        checker.push(Error, Metadata, None, "Empty or missing title".to_string());
    }

    match meta.servings {
        None => checker.push(Error, Metadata, None, "Missing servings".to_string()),
        Some(s) if !s.is_finite() || s <= 0.0 => {
            checker.push(Error, Metadata, None, format!("Invalid servings: {}", s))
        }
        Some(s) => {
            if s.fract() != 0.0 {
                checker.push(
                    Warning,
                    Metadata,
                    None,
                    format!("Non-integral servings: {}", s),
                );
            }
            if s > MAX_SERVINGS {
                checker.push(
                    Warning,
                    Metadata,
                    None,
                    format!("Suspicious servings: {}", s),
                );
            }
        }
    }

    if let Some(difficulty) = meta.difficulty.as_ref().filter(|d| !d.is_known()) {
        checker.push(
            Error,
            Metadata,
            None,
            format!("Invalid difficulty: '{}'", difficulty),
        );
    }
    if let Some(recipe_type) = meta.recipe_type.as_ref().filter(|t| !t.is_known()) {
        checker.push(
            Error,
            Metadata,
            None,
            format!("Invalid recipeType: '{}'", recipe_type),
        );
    }
    for diet in meta.diets.iter().filter(|d| !d.is_known()) {
        checker.push(Error, Metadata, None, format!("Invalid diet: '{}'", diet));
    }
    for season in meta.seasons.iter().filter(|s| !s.is_known()) {
        checker.push(Error, Metadata, None, format!("Invalid season: '{}'", season));
    }

    if let Some(total) = meta.total_time_minutes {
        if total > MAX_TOTAL_MINUTES {
            checker.push(
                Warning,
                Metadata,
                None,
                format!("Total time over 24h: {} min", total),
            );
        }
        if let (Some(active), Some(passive)) =
            (meta.total_active_time_minutes, meta.total_passive_time_minutes)
        {
            if (active + passive - total).abs() > 1.0 {
                checker.push(
                    Warning,
                    Metadata,
                    None,
                    format!(
                        "Active ({}) + passive ({}) time does not match total ({})",
                        active, passive, total
                    ),
                );
            }
        }
    }
}

fn check_nutrition(doc: &RecipeDocument, checker: &mut Checker) {
    use Severity::*;
    use ViolationCategory::Nutrition;

    let Some(nutrition) = &doc.metadata.nutrition_per_serving else {
        return;
    };
    if nutrition.confidence == NutritionConfidence::None {
        return;
    }

    if nutrition.calories <= 0.0 {
        checker.push(
            Error,
            Nutrition,
            None,
            format!("Non-positive calories: {}", nutrition.calories),
        );
    } else if nutrition.calories > MAX_CALORIES {
        checker.push(
            Warning,
            Nutrition,
            None,
            format!("Very high calories per serving: {}", nutrition.calories),
        );
    } else if nutrition.calories < MIN_CALORIES {
        checker.push(
            Warning,
            Nutrition,
            None,
            format!("Very low calories per serving: {}", nutrition.calories),
        );
    }

    for (name, value) in [
        ("protein", nutrition.protein),
        ("fat", nutrition.fat),
        ("carbs", nutrition.carbs),
    ] {
        if value < 0.0 {
            checker.push(Error, Nutrition, None, format!("Negative {}: {}", name, value));
        }
    }
}

fn check_ingredients(doc: &RecipeDocument, checker: &mut Checker) {
    use Severity::*;
    use ViolationCategory::Ingredients;

    if doc.ingredients.is_empty() {
        checker.push(Critical, Ingredients, None, "No ingredients".to_string());
        return;
    }
    if doc.ingredients.len() < 2 {
        checker.push(
            Warning,
            Ingredients,
            None,
            format!("Only {} ingredient", doc.ingredients.len()),
        );
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for (idx, ingredient) in doc.ingredients.iter().enumerate() {
        let id = ingredient.id.as_str();
        let subject = Some(id);

        if id.is_empty() {
            checker.push(
                Error,
                Ingredients,
                None,
                format!("Ingredient #{} has no id", idx + 1),
            );
        } else if !seen.insert(id) {
            checker.push(
                Error,
                Ingredients,
                subject,
                format!("Duplicate ingredient id '{}'", id),
            );
        }

        if ingredient.name.trim().is_empty() {
            checker.push(
                Error,
                Ingredients,
                subject,
                format!("Ingredient '{}' has an empty name", id),
            );
        }

        match ingredient.quantity {
            Some(q) if q < 0.0 => checker.push(
                Error,
                Ingredients,
                subject,
                format!("Ingredient '{}' has negative quantity {}", id, q),
            ),
            Some(q) if q == 0.0 && !ingredient.optional => checker.push(
                Warning,
                Ingredients,
                subject,
                format!("Required ingredient '{}' has zero quantity", id),
            ),
            _ => {}
        }

        if !ingredient.category.is_known() {
            checker.push(
                Error,
                Ingredients,
                subject,
                format!(
                    "Ingredient '{}' has invalid category '{}'",
                    id, ingredient.category
                ),
            );
        }
    }

    let missing_en = doc
        .ingredients
        .iter()
        .filter(|i| i.name_en.as_deref().map_or(true, |n| n.trim().is_empty()))
        .count();
    let ratio = missing_en as f64 / doc.ingredients.len() as f64;
    if ratio > MISSING_NAME_EN_RATIO {
        checker.push(
            Warning,
            ViolationCategory::Language,
            None,
            format!(
                "{}/{} ingredients have no English name",
                missing_en,
                doc.ingredients.len()
            ),
        );
    }
}

fn is_equipment_action(action: &str) -> bool {
    let action = action.to_lowercase();
    EQUIPMENT_KEYWORDS.iter().any(|k| action.contains(k))
}

fn check_steps(doc: &RecipeDocument, checker: &mut Checker) {
    use Severity::*;
    use ViolationCategory::Steps;

    if doc.steps.is_empty() {
        checker.push(Critical, Steps, None, "No steps".to_string());
        return;
    }
    if doc.steps.len() < 2 {
        checker.push(
            Warning,
            Steps,
            None,
            format!("Only {} step", doc.steps.len()),
        );
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for (idx, step) in doc.steps.iter().enumerate() {
        let id = step.id.as_str();
        let subject = Some(id);

        if id.is_empty() {
            checker.push(Error, Steps, None, format!("Step #{} has no id", idx + 1));
        } else if !seen.insert(id) {
            checker.push(Error, Steps, subject, format!("Duplicate step id '{}'", id));
        }

        if step.action.trim().is_empty() {
            checker.push(
                Error,
                Steps,
                subject,
                format!("Step '{}' has an empty action", id),
            );
        }

        if !step.step_type.is_known() {
            checker.push(
                Error,
                Steps,
                subject,
                format!("Step '{}' has invalid stepType '{}'", id, step.step_type),
            );
        }

        if step.uses.is_empty() && !is_equipment_action(&step.action) {
            checker.push(
                Warning,
                Steps,
                subject,
                format!("Step '{}' uses nothing", id),
            );
        }

        if step.produces.is_empty() && step.step_type != StepType::Serve {
            checker.push(
                Warning,
                Steps,
                subject,
                format!("Step '{}' produces no state", id),
            );
        }
    }
}

fn check_temperatures(doc: &RecipeDocument, checker: &mut Checker) {
    use Severity::*;
    use ViolationCategory::Temperature;

    for step in &doc.steps {
        let Some(temp) = step.temperature else {
            continue;
        };
        if !temp.is_finite() {
            checker.push(
                Error,
                Temperature,
                Some(&step.id),
                format!("Step '{}' has invalid temperature {}", step.id, temp),
            );
            continue;
        }
        if temp.fract() != 0.0 {
            checker.push(
                Warning,
                Temperature,
                Some(&step.id),
                format!("Step '{}' temperature {}°C is not a whole degree", step.id, temp),
            );
        }
        if temp > MAX_TEMPERATURE_C {
            checker.push(
                Warning,
                Temperature,
                Some(&step.id),
                format!("Step '{}' temperature {}°C is unusually high", step.id, temp),
            );
        } else if temp < 0.0 {
            checker.push(
                Error,
                Temperature,
                Some(&step.id),
                format!("Step '{}' has negative temperature {}°C", step.id, temp),
            );
        }
    }
}

fn check_graph(doc: &RecipeDocument, checker: &mut Checker) {
    use Severity::*;
    use ViolationCategory::Graph;

    let ingredient_ids = doc.ingredient_ids();

    let mut producers: HashMap<&str, Vec<&str>> = HashMap::new();
    for step in doc.steps.iter().filter(|s| !s.produces.is_empty()) {
        producers
            .entry(step.produces.as_str())
            .or_default()
            .push(step.id.as_str());
    }
    // Report duplicates once per state, in document order.
    let mut reported: HashSet<&str> = HashSet::new();
    for step in &doc.steps {
        let state = step.produces.as_str();
        if let Some(by) = producers.get(state).filter(|by| by.len() > 1) {
            if reported.insert(state) {
                checker.push(
                    Critical,
                    Graph,
                    Some(state),
                    format!("State '{}' is produced by {} steps: {}", state, by.len(), by.join(", ")),
                );
            }
        }
    }

    for step in &doc.steps {
        for reference in &step.uses {
            if !ingredient_ids.contains(reference) && !producers.contains_key(reference.as_str()) {
                checker.push(
                    Critical,
                    Graph,
                    Some(&step.id),
                    format!("Step '{}' uses unknown reference '{}'", step.id, reference),
                );
            }
        }
        for reference in &step.requires {
            if !producers.contains_key(reference.as_str()) {
                checker.push(
                    Critical,
                    Graph,
                    Some(&step.id),
                    format!(
                        "Step '{}' requires '{}', which no step produces",
                        step.id, reference
                    ),
                );
            }
        }
    }

    if doc.final_state.is_empty() {
        checker.push(Critical, Graph, None, "Missing finalState".to_string());
    } else if !producers.contains_key(doc.final_state.as_str()) {
        checker.push(
            Critical,
            Graph,
            Some(&doc.final_state),
            format!("finalState '{}' is not produced by any step", doc.final_state),
        );
    }

    let graph = StepGraph::build(&doc.steps);
    if graph.has_cycle() {
        let members: Vec<&str> = graph
            .cycle_members()
            .iter()
            .map(|&idx| doc.steps[idx].id.as_str())
            .collect();
        checker.push(
            Critical,
            Graph,
            None,
            format!("Step graph contains a cycle through: {}", members.join(", ")),
        );
    }

    let consumed: HashSet<&str> = doc
        .steps
        .iter()
        .flat_map(|s| s.references())
        .map(String::as_str)
        .collect();

    let required: Vec<&str> = doc
        .ingredients
        .iter()
        .filter(|i| !i.optional && !i.id.is_empty())
        .map(|i| i.id.as_str())
        .collect();
    let unused: Vec<&str> = required
        .iter()
        .copied()
        .filter(|id| !consumed.contains(id))
        .collect();
    if !unused.is_empty() {
        let ratio = unused.len() as f64 / required.len() as f64;
        let severity = if ratio > UNUSED_INGREDIENTS_ERROR_RATIO {
            Error
        } else {
            Warning
        };
        if ratio > UNUSED_INGREDIENTS_WARNING_RATIO {
            checker.push(
                severity,
                Graph,
                None,
                format!(
                    "{}/{} required ingredients are never used",
                    unused.len(),
                    required.len()
                ),
            );
        }
        for id in unused {
            checker.push(
                severity,
                Graph,
                Some(id),
                format!("Ingredient '{}' is never used", id),
            );
        }
    }

    for step in &doc.steps {
        let state = step.produces.as_str();
        if !state.is_empty() && state != doc.final_state && !consumed.contains(state) {
            checker.push(
                Warning,
                Graph,
                Some(state),
                format!("State '{}' is produced but never used", state),
            );
        }
    }
}

fn check_language(doc: &RecipeDocument, checker: &mut Checker) {
    let Some(source) = doc.metadata.source.as_deref() else {
        return;
    };
    let source = source.to_lowercase();
    if !FRENCH_SOURCES.iter().any(|s| source.contains(s)) {
        return;
    }

    for ingredient in &doc.ingredients {
        let name = ingredient.name.trim().to_lowercase();
        if ENGLISH_INGREDIENT_WORDS.contains(&name.as_str()) {
            checker.push(
                Severity::Warning,
                ViolationCategory::Language,
                Some(&ingredient.id),
                format!(
                    "Ingredient '{}' from a French source has an English name",
                    ingredient.name
                ),
            );
        }
    }
}

/// A recipe document that passed validation.
///
/// Holds non-blocking issues found at construction. The document is only
/// reachable mutably through [`Recipe::modify`], which validates again.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    document: RecipeDocument,
    issues: Vec<Violation>,
}

impl Recipe {
    /// Validate a document, refusing it if any violation is blocking.
    pub fn try_from_document(document: RecipeDocument) -> Result<Self, RecipeError> {
        let (blocking, issues): (Vec<Violation>, Vec<Violation>) = validate(&document)
            .into_iter()
            .partition(Violation::is_blocking);

        if !blocking.is_empty() {
            return Err(RecipeError::Validation(blocking));
        }
        Ok(Self { document, issues })
    }

    pub fn document(&self) -> &RecipeDocument {
        &self.document
    }

    pub fn into_document(self) -> RecipeDocument {
        self.document
    }

    /// Non-blocking issues recorded at the last validation.
    pub fn issues(&self) -> &[Violation] {
        &self.issues
    }

    /// Apply an edit and validate the result.
    ///
    /// On failure the recipe is left unchanged.
    pub fn modify<F>(&mut self, edit: F) -> Result<(), RecipeError>
    where
        F: FnOnce(&mut RecipeDocument),
    {
        let mut draft = self.document.clone();
        edit(&mut draft);
        *self = Recipe::try_from_document(draft)?;
        Ok(())
    }
}

impl TryFrom<RecipeDocument> for Recipe {
    type Error = RecipeError;

    fn try_from(document: RecipeDocument) -> Result<Self, Self::Error> {
        Recipe::try_from_document(document)
    }
}

impl Serialize for Recipe {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Ingredient, IngredientCategory, Step};

    fn ingredient(id: &str) -> Ingredient {
        Ingredient {
            id: id.to_string(),
            name: id.to_string(),
            name_en: Some(id.to_string()),
            quantity: Some(100.0),
            category: IngredientCategory::Pantry,
            ..Ingredient::default()
        }
    }

    fn step(id: &str, uses: &[&str], produces: &str) -> Step {
        Step {
            id: id.to_string(),
            action: format!("do {}", id),
            uses: uses.iter().map(|s| s.to_string()).collect(),
            produces: produces.to_string(),
            ..Step::default()
        }
    }

    fn valid_doc() -> RecipeDocument {
        let mut doc = RecipeDocument {
            ingredients: vec![ingredient("flour"), ingredient("water")],
            steps: vec![
                step("s1", &["flour", "water"], "dough"),
                step("s2", &["dough"], "bread"),
            ],
            final_state: "bread".to_string(),
            ..RecipeDocument::default()
        };
        doc.metadata.title = "Pain".to_string();
        doc.metadata.servings = Some(4.0);
        doc
    }

    fn has(violations: &[Violation], severity: Severity, needle: &str) -> bool {
        violations
            .iter()
            .any(|v| v.severity == severity && v.message.contains(needle))
    }

    #[test]
    fn test_valid_document_is_clean() {
        let violations = validate(&valid_doc());
        assert!(violations.is_empty(), "{:?}", violations);
        assert!(Recipe::try_from_document(valid_doc()).is_ok());
    }

    #[test]
    fn test_dangling_reference_is_critical() {
        let mut doc = valid_doc();
        doc.steps[1].uses.push("yeast".to_string());
        let violations = validate(&doc);
        assert!(has(&violations, Severity::Critical, "unknown reference 'yeast'"));
    }

    #[test]
    fn test_requires_must_be_produced_state() {
        let mut doc = valid_doc();
        doc.steps[1].requires.push("flour".to_string());
        let violations = validate(&doc);
        assert!(has(&violations, Severity::Critical, "requires 'flour'"));
    }

    #[test]
    fn test_forward_reference_is_accepted() {
        let mut doc = valid_doc();
        doc.steps.swap(0, 1);
        assert!(validate(&doc).is_empty());
    }

    #[test]
    fn test_duplicate_produced_state() {
        let mut doc = valid_doc();
        doc.steps.push(step("s3", &["dough"], "bread"));
        let violations = validate(&doc);
        assert!(has(&violations, Severity::Critical, "produced by 2 steps: s2, s3"));
    }

    #[test]
    fn test_final_state_not_produced() {
        let mut doc = valid_doc();
        doc.final_state = "cake".to_string();
        let violations = validate(&doc);
        assert!(has(&violations, Severity::Critical, "finalState 'cake'"));
        // bread is now an orphan
        assert!(has(&violations, Severity::Warning, "'bread' is produced but never used"));
    }

    #[test]
    fn test_cycle_is_critical() {
        let mut doc = valid_doc();
        doc.steps[0].uses.push("bread".to_string());
        let violations = validate(&doc);
        assert!(has(&violations, Severity::Critical, "cycle through: s1, s2"));
    }

    #[test]
    fn test_unused_ingredient_severity_scales() {
        let mut doc = valid_doc();
        doc.ingredients.push(ingredient("salt"));
        let violations = validate(&doc);
        assert!(has(&violations, Severity::Warning, "1/3 required ingredients"));
        assert!(has(&violations, Severity::Warning, "'salt' is never used"));

        doc.ingredients.push(ingredient("yeast"));
        doc.ingredients.push(ingredient("sugar"));
        let violations = validate(&doc);
        assert!(has(&violations, Severity::Error, "3/5 required ingredients"));
    }

    #[test]
    fn test_optional_ingredient_may_be_unused() {
        let mut doc = valid_doc();
        let mut salt = ingredient("salt");
        salt.optional = true;
        doc.ingredients.push(salt);
        assert!(validate(&doc).is_empty());
    }

    #[test]
    fn test_preheat_may_use_nothing() {
        let mut doc = valid_doc();
        let mut preheat = step("s0", &[], "hot_oven");
        preheat.action = "Préchauffer le four à 200°C".to_string();
        preheat.temperature = Some(200.0);
        doc.steps.insert(0, preheat);
        doc.steps[2].requires.push("hot_oven".to_string());
        assert!(validate(&doc).is_empty());
    }

    #[test]
    fn test_audit_enumerates_every_issue() {
        let mut doc = valid_doc();
        doc.metadata.title = String::new();
        doc.metadata.servings = Some(0.0);
        doc.steps[0].temperature = Some(500.0);
        doc.steps[1].step_type = StepType::parse("flambe");
        doc.ingredients[0].quantity = Some(-1.0);
        let violations = validate(&doc);
        assert!(has(&violations, Severity::Error, "title"));
        assert!(has(&violations, Severity::Error, "Invalid servings"));
        assert!(has(&violations, Severity::Warning, "500°C"));
        assert!(has(&violations, Severity::Error, "invalid stepType 'flambe'"));
        assert!(has(&violations, Severity::Error, "negative quantity"));
    }

    #[test]
    fn test_fractional_servings_and_temperature_are_advisory() {
        let mut doc = valid_doc();
        doc.metadata.servings = Some(4.5);
        doc.steps[1].temperature = Some(180.5);
        let violations = validate(&doc);
        assert!(has(&violations, Severity::Warning, "Non-integral servings: 4.5"));
        assert!(has(&violations, Severity::Warning, "180.5°C is not a whole degree"));
        assert!(Recipe::try_from_document(doc).is_ok());
    }

    #[test]
    fn test_fractional_servings_from_json_are_audited_per_field() {
        let json = r#"{
            "metadata": {"title": "Pain", "servings": 4.5},
            "ingredients": [{"id": "flour", "name": "flour"}, {"id": "water", "name": "water"}],
            "steps": [
                {"id": "s1", "action": "Mix", "uses": ["flour", "water"], "produces": "dough"},
                {"id": "s2", "action": "Bake", "uses": ["dough"], "produces": "bread", "temperature": 220.5}
            ],
            "finalState": "bread"
        }"#;
        let doc: RecipeDocument = serde_json::from_str(json).unwrap();
        let violations = validate(&doc);
        assert!(violations.iter().all(|v| !v.is_blocking()), "{:?}", violations);
        assert!(has(&violations, Severity::Warning, "servings"));
        assert!(violations
            .iter()
            .any(|v| v.category == ViolationCategory::Temperature && v.subject.as_deref() == Some("s2")));
    }

    #[test]
    fn test_missing_title_and_duplicate_ingredient_do_not_block() {
        let mut doc = valid_doc();
        doc.metadata.title = "  ".to_string();
        doc.ingredients.push(ingredient("flour"));
        let violations = validate(&doc);
        assert!(has(&violations, Severity::Error, "title"));
        assert!(has(&violations, Severity::Error, "Duplicate ingredient id 'flour'"));

        let recipe = Recipe::try_from_document(doc).unwrap();
        assert!(recipe.issues().iter().all(|v| !v.is_blocking()));
    }

    #[test]
    fn test_construction_rejects_empty_ingredients_with_references() {
        let mut doc = valid_doc();
        doc.ingredients.clear();
        let err = Recipe::try_from_document(doc).unwrap_err();
        let violations = err.violations();
        assert!(has(violations, Severity::Critical, "No ingredients"));
        assert!(has(violations, Severity::Critical, "unknown reference 'flour'"));
        assert!(violations.iter().all(|v| v.is_blocking()));
    }

    #[test]
    fn test_construction_keeps_warnings() {
        let mut doc = valid_doc();
        doc.ingredients.push(ingredient("salt"));
        let recipe = Recipe::try_from_document(doc).unwrap();
        assert!(!recipe.issues().is_empty());
    }

    #[test]
    fn test_modify_revalidates() {
        let mut recipe = Recipe::try_from_document(valid_doc()).unwrap();
        let result = recipe.modify(|doc| doc.steps[1].uses = vec!["dogh".to_string()]);
        assert!(result.is_err());
        assert_eq!(recipe.document().steps[1].uses, vec!["dough"]);

        recipe
            .modify(|doc| doc.metadata.title = "Pain de campagne".to_string())
            .unwrap();
        assert_eq!(recipe.document().metadata.title, "Pain de campagne");
    }

    #[test]
    fn test_french_source_with_english_name() {
        let mut doc = valid_doc();
        doc.metadata.source = Some("Marmiton".to_string());
        let violations = validate(&doc);
        assert!(violations
            .iter()
            .any(|v| v.category == ViolationCategory::Language && v.subject.as_deref() == Some("flour")));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let mut doc = valid_doc();
        doc.ingredients.push(ingredient("salt"));
        doc.steps[1].uses.push("ghost".to_string());
        assert_eq!(validate(&doc), validate(&doc));
    }
}
