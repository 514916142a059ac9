//! Resolve command-line slugs to recipe files.

use anyhow::{Context, Result};
use cocotte_core::storage::{recipe_files, recipe_path};
use std::path::{Path, PathBuf};

/// The files named by `slugs`, or every recipe in `dir` when none are given.
pub fn select_recipes(dir: &Path, slugs: &[String]) -> Result<Vec<PathBuf>> {
    if slugs.is_empty() {
        return recipe_files(dir)
            .with_context(|| format!("Failed to list recipes in {}", dir.display()));
    }

    slugs
        .iter()
        .map(|slug| {
            let path = recipe_path(dir, slug);
            if path.is_file() {
                Ok(path)
            } else {
                anyhow::bail!("No recipe '{}' at {}", slug, path.display())
            }
        })
        .collect()
}

#[cfg(test)]
pub mod test_support {
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Fresh directory under the system temp dir.
    pub fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cocotte-cli-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Copy recipe fixtures from cocotte-core into `dir`.
    pub fn copy_fixtures(dir: &Path, slugs: &[&str]) {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../cocotte-core/tests/fixtures/recipes");
        for slug in slugs {
            let name = format!("{}.recipe.json", slug);
            fs::copy(fixtures.join(&name), dir.join(&name))
                .unwrap_or_else(|e| panic!("Failed to copy fixture {}: {}", name, e));
        }
    }
}
