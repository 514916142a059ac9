use crate::validation::Violation;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Recipe failed validation: {}", summarize(.0))]
    Validation(Vec<Violation>),

    #[error("Failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid recipe JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl RecipeError {
    /// Blocking violations, if this is a validation failure.
    pub fn violations(&self) -> &[Violation] {
        match self {
            RecipeError::Validation(violations) => violations,
            _ => &[],
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    let messages: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
    format!("{} blocking issue(s): {}", violations.len(), messages.join("; "))
}
