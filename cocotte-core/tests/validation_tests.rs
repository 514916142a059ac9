//! Golden file tests for the graph validator and recipe construction.
//!
//! Cases in `fixtures/validation/` list issues that must appear in the audit
//! output, and whether construction must refuse the document. Recipes in
//! `fixtures/recipes/` must all construct.

use cocotte_core::references::correct_step_references;
use cocotte_core::{validate, Recipe, RecipeDocument, RecipeError, Severity, Violation, ViolationCategory};
use glob::glob;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct TestCase {
    description: String,
    blocking: bool,
    expected: Vec<ExpectedIssue>,
    document: RecipeDocument,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpectedIssue {
    severity: Severity,
    category: ViolationCategory,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    message_contains: Option<String>,
}

impl ExpectedIssue {
    fn matches(&self, violation: &Violation) -> bool {
        violation.severity == self.severity
            && violation.category == self.category
            && self
                .subject
                .as_ref()
                .map_or(true, |s| violation.subject.as_ref() == Some(s))
            && self
                .message_contains
                .as_ref()
                .map_or(true, |m| violation.message.contains(m.as_str()))
    }
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

fn glob_sorted(subdir: &str, pattern: &str) -> Vec<PathBuf> {
    let pattern = fixtures_dir().join(subdir).join(pattern);
    let mut paths: Vec<PathBuf> = glob(&pattern.to_string_lossy())
        .expect("Failed to read glob pattern")
        .map(|entry| entry.expect("Failed to read directory entry"))
        .collect();
    paths.sort();
    paths
}

#[test]
fn test_validation_golden_files() {
    let paths = glob_sorted("validation", "*.json");
    assert!(!paths.is_empty(), "No validation fixtures found");

    let mut failures = Vec::new();
    for path in &paths {
        let name = path.file_stem().unwrap().to_string_lossy().into_owned();
        let case: TestCase = load_json(path);
        let issues = validate(&case.document);

        for expected in &case.expected {
            if !issues.iter().any(|v| expected.matches(v)) {
                failures.push(format!(
                    "\n=== {} ({}) ===\nMissing: {:?}\nActual:\n  {}\n",
                    name,
                    case.description,
                    expected,
                    issues.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("\n  ")
                ));
            }
        }

        let constructed = Recipe::try_from_document(case.document.clone());
        if constructed.is_err() != case.blocking {
            failures.push(format!(
                "\n=== {} ===\nExpected blocking={}, got {:?}\n",
                name,
                case.blocking,
                constructed.err()
            ));
        }
    }

    if !failures.is_empty() {
        panic!("\n{} failures:\n{}", failures.len(), failures.join(""));
    }
}

#[test]
fn test_construction_error_lists_only_blocking_issues() {
    let case: TestCase = load_json(&fixtures_dir().join("validation/dangling-reference.json"));
    let all = validate(&case.document);

    match Recipe::try_from_document(case.document) {
        Err(RecipeError::Validation(blocking)) => {
            assert!(!blocking.is_empty());
            assert!(blocking.iter().all(|v| v.severity == Severity::Critical));
            assert!(blocking.len() < all.len());
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[test]
fn test_recipe_fixtures_construct() {
    let paths = glob_sorted("recipes", "*.recipe.json");
    assert!(paths.len() >= 3);

    for path in &paths {
        let doc: RecipeDocument = load_json(path);
        let recipe = Recipe::try_from_document(doc)
            .unwrap_or_else(|e| panic!("{} should construct: {}", path.display(), e));
        assert!(
            recipe.issues().iter().all(|v| v.severity == Severity::Warning),
            "{}: {:?}",
            path.display(),
            recipe.issues()
        );
    }
}

#[test]
fn test_tarte_aux_fraises_is_clean() {
    let doc: RecipeDocument = load_json(&fixtures_dir().join("recipes/tarte-aux-fraises.recipe.json"));
    assert_eq!(validate(&doc), Vec::new());
}

#[test]
fn test_validation_is_idempotent() {
    for path in glob_sorted("validation", "*.json") {
        let case: TestCase = load_json(&path);
        assert_eq!(validate(&case.document), validate(&case.document), "{}", path.display());
    }
}

#[test]
fn test_corrected_typos_construct() {
    let mut doc: RecipeDocument = load_json(&fixtures_dir().join("recipes/tarte-aux-fraises.recipe.json"));
    doc.steps[1].uses = vec!["farrine".into(), "beure".into(), "sucre".into(), "oeufs".into()];
    doc.steps[4].requires = vec!["four_chau".into()];
    assert!(Recipe::try_from_document(doc.clone()).is_err());

    let ingredient_ids = doc.ingredient_ids();
    let produced = doc.produced_states();
    let report = correct_step_references(&mut doc.steps, &ingredient_ids, &produced);
    assert_eq!(report.corrected, 4);
    assert_eq!(report.dropped, 0);
    assert_eq!(doc.steps[1].uses, vec!["farine", "beurre", "sucre", "oeuf"]);
    assert_eq!(doc.steps[4].requires, vec!["four_chaud"]);
    assert!(Recipe::try_from_document(doc).is_ok());
}

#[test]
fn test_unknown_metadata_survives_round_trip() {
    let path = fixtures_dir().join("recipes/pain-maison.recipe.json");
    let doc: RecipeDocument = load_json(&path);
    let recipe = Recipe::try_from_document(doc).unwrap();

    let json = serde_json::to_value(&recipe).unwrap();
    assert_eq!(json["metadata"]["bakersPercentage"], 70);
    assert_eq!(json["steps"][0]["subRecipe"], "main");
    assert_eq!(json["ingredients"][0]["name_en"], "bread flour");
}
