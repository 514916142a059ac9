//! Recipe documents on disk, one `{slug}.recipe.json` per recipe.

use crate::error::RecipeError;
use crate::references::make_ingredient_id;
use crate::types::RecipeDocument;
use crate::validation::Recipe;
use std::fs;
use std::path::{Path, PathBuf};

pub const RECIPE_FILE_SUFFIX: &str = ".recipe.json";

/// URL- and filename-safe slug: lowercase ASCII words joined by `-`.
pub fn slugify(title: &str) -> String {
    let slug = make_ingredient_id(title).replace('_', "-");
    if slug.is_empty() {
        "recipe".to_string()
    } else {
        slug
    }
}

pub fn recipe_path(dir: &Path, slug: &str) -> PathBuf {
    dir.join(format!("{}{}", slug, RECIPE_FILE_SUFFIX))
}

/// Read a document without validating it.
pub fn load_document(path: &Path) -> Result<RecipeDocument, RecipeError> {
    let content = fs::read_to_string(path).map_err(|source| RecipeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| RecipeError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and validate a document.
pub fn load_recipe(path: &Path) -> Result<Recipe, RecipeError> {
    Recipe::try_from_document(load_document(path)?)
}

/// Write a validated recipe as pretty JSON. Returns the file written.
pub fn save_document(dir: &Path, slug: &str, recipe: &Recipe) -> Result<PathBuf, RecipeError> {
    fs::create_dir_all(dir).map_err(|source| RecipeError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = recipe_path(dir, slug);
    let json = serde_json::to_string_pretty(recipe).map_err(|source| RecipeError::Json {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, json + "\n").map_err(|source| RecipeError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Saved recipe");
    Ok(path)
}

/// Every `*.recipe.json` directly inside `dir`, sorted by path.
pub fn recipe_files(dir: &Path) -> Result<Vec<PathBuf>, RecipeError> {
    let entries = fs::read_dir(dir).map_err(|source| RecipeError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| RecipeError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_recipe = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(RECIPE_FILE_SUFFIX));
        if is_recipe && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Slug of a recipe file, i.e. its name without `.recipe.json`.
pub fn slug_of(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()?.strip_suffix(RECIPE_FILE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Ingredient, Step};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cocotte-storage-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn salad() -> RecipeDocument {
        let mut doc = RecipeDocument {
            ingredients: vec![
                Ingredient {
                    id: "tomate".to_string(),
                    name: "Tomate".to_string(),
                    ..Ingredient::default()
                },
                Ingredient {
                    id: "huile".to_string(),
                    name: "Huile".to_string(),
                    ..Ingredient::default()
                },
            ],
            steps: vec![Step {
                id: "s1".to_string(),
                action: "Mélanger".to_string(),
                uses: vec!["tomate".into(), "huile".into()],
                produces: "salade".to_string(),
                ..Step::default()
            }],
            final_state: "salade".to_string(),
            ..RecipeDocument::default()
        };
        doc.metadata.title = "Salade de tomates".to_string();
        doc.metadata.servings = Some(2.0);
        doc
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Tarte aux fraises"), "tarte-aux-fraises");
        assert_eq!(slugify("  Bœuf Bourguignon (facile!) "), "boeuf-bourguignon-facile");
        assert_eq!(slugify("!!!"), "recipe");
    }

    #[test]
    fn test_save_load_and_list() {
        let dir = temp_dir("roundtrip");
        let recipe = Recipe::try_from_document(salad()).unwrap();
        let path = save_document(&dir, &slugify(&recipe.document().metadata.title), &recipe).unwrap();
        assert_eq!(slug_of(&path), Some("salade-de-tomates"));

        fs::write(dir.join("notes.txt"), "not a recipe").unwrap();
        let files = recipe_files(&dir).unwrap();
        assert_eq!(files, vec![path.clone()]);

        let loaded = load_recipe(&path).unwrap();
        assert_eq!(loaded.document(), recipe.document());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_errors_carry_path() {
        let dir = temp_dir("errors");
        fs::create_dir_all(&dir).unwrap();
        let bad = dir.join("bad.recipe.json");
        fs::write(&bad, "{ not json").unwrap();

        assert!(matches!(load_document(&bad), Err(RecipeError::Json { .. })));
        assert!(matches!(
            load_document(&dir.join("missing.recipe.json")),
            Err(RecipeError::Io { .. })
        ));

        fs::remove_dir_all(&dir).ok();
    }
}
