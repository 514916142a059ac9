//! Enrichment lookup cache.
//!
//! Translations and nutrition matches are slow to obtain, so the enricher
//! remembers them here. The cache is an explicit value owned by the caller:
//! load it once, hand it to the enricher, save it when convenient.

use crate::collaborators::NutrientProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to access cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt cache file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheMeta {
    saved_at: DateTime<Utc>,
    translations: usize,
    nutrition: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    meta: Option<CacheMeta>,
    #[serde(default)]
    translations: BTreeMap<String, String>,
    /// `null` records a lookup that found nothing.
    #[serde(default)]
    nutrition: BTreeMap<String, Option<NutrientProfile>>,
}

/// Number of entries held by an [`EnrichmentCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub translations: usize,
    pub nutrition: usize,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct EnrichmentCache {
    path: Option<PathBuf>,
    translations: BTreeMap<String, String>,
    nutrition: BTreeMap<String, Option<NutrientProfile>>,
    dirty: bool,
}

impl EnrichmentCache {
    /// A cache with no backing file. `save` does nothing.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `path`. A missing file gives an empty cache bound to `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No enrichment cache yet, starting empty");
            return Ok(Self {
                path: Some(path),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;
        let file: CacheFile = serde_json::from_str(&content).map_err(|source| CacheError::Json {
            path: path.clone(),
            source,
        })?;

        let translations: BTreeMap<String, String> = file
            .translations
            .into_iter()
            .filter(|(k, _)| !k.starts_with('_'))
            .map(|(k, v)| (normalize(&k), v))
            .collect();
        let nutrition: BTreeMap<String, Option<NutrientProfile>> = file
            .nutrition
            .into_iter()
            .filter(|(k, _)| !k.starts_with('_'))
            .map(|(k, v)| (normalize(&k), v))
            .collect();

        tracing::info!(
            path = %path.display(),
            translations = translations.len(),
            nutrition = nutrition.len(),
            "Loaded enrichment cache"
        );
        Ok(Self {
            path: Some(path),
            translations,
            nutrition,
            dirty: false,
        })
    }

    /// Write to the file this cache was loaded from, if anything changed.
    ///
    /// Returns whether a file was written.
    pub fn save(&mut self) -> Result<bool, CacheError> {
        let Some(path) = self.path.clone() else {
            return Ok(false);
        };
        if !self.dirty {
            return Ok(false);
        }
        self.save_to(&path)?;
        Ok(true)
    }

    /// Write the cache to `path` unconditionally.
    pub fn save_to(&mut self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = CacheFile {
            meta: Some(CacheMeta {
                saved_at: Utc::now(),
                translations: self.translations.len(),
                nutrition: self.nutrition.len(),
            }),
            translations: self.translations.clone(),
            nutrition: self.nutrition.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| CacheError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.dirty = false;
        tracing::debug!(path = %path.display(), "Saved enrichment cache");
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn translation(&self, name: &str) -> Option<&str> {
        self.translations.get(&normalize(name)).map(String::as_str)
    }

    pub fn insert_translation(&mut self, name: &str, name_en: &str) {
        let previous = self
            .translations
            .insert(normalize(name), name_en.to_string());
        if previous.as_deref() != Some(name_en) {
            self.dirty = true;
        }
    }

    /// `None` if never looked up; `Some(None)` if looked up and not found.
    pub fn nutrition(&self, name_en: &str) -> Option<Option<NutrientProfile>> {
        self.nutrition.get(&normalize(name_en)).copied()
    }

    pub fn insert_nutrition(&mut self, name_en: &str, profile: Option<NutrientProfile>) {
        let previous = self.nutrition.insert(normalize(name_en), profile);
        if previous != Some(profile) {
            self.dirty = true;
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            translations: self.translations.len(),
            nutrition: self.nutrition.len(),
        }
    }

    pub fn clear(&mut self) {
        if !self.translations.is_empty() || !self.nutrition.is_empty() {
            self.dirty = true;
        }
        self.translations.clear();
        self.nutrition.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("cocotte-cache-test-{}-{}", name, std::process::id()))
            .join("cache.json")
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let cache = EnrichmentCache::load(temp_path("missing")).unwrap();
        assert_eq!(cache.stats(), CacheStats::default());
        assert!(!cache.is_dirty());
    }

    #[test]
    fn test_lookup_is_normalized() {
        let mut cache = EnrichmentCache::in_memory();
        cache.insert_translation(" Farine ", "flour");
        assert_eq!(cache.translation("farine"), Some("flour"));
        assert!(cache.is_dirty());
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let mut cache = EnrichmentCache::in_memory();
        cache.insert_translation("sel", "salt");
        assert!(!cache.save().unwrap());
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_path("roundtrip");
        let mut cache = EnrichmentCache::load(&path).unwrap();
        cache.insert_translation("beurre", "butter");
        cache.insert_nutrition(
            "butter",
            Some(NutrientProfile {
                calories: 717.0,
                ..NutrientProfile::default()
            }),
        );
        cache.insert_nutrition("dragon fruit dust", None);

        assert!(cache.save().unwrap());
        assert!(!cache.is_dirty());
        // Nothing changed since, so nothing is written.
        assert!(!cache.save().unwrap());

        let reloaded = EnrichmentCache::load(&path).unwrap();
        assert_eq!(reloaded.translation("beurre"), Some("butter"));
        assert_eq!(reloaded.nutrition("butter").unwrap().unwrap().calories, 717.0);
        assert_eq!(reloaded.nutrition("dragon fruit dust"), Some(None));
        assert_eq!(reloaded.nutrition("unknown"), None);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["_meta"]["translations"], 1);

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_underscore_keys_ignored() {
        let path = temp_path("underscore");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"translations": {"_comment": "x", "oeuf": "egg"}, "nutrition": {}}"#,
        )
        .unwrap();

        let cache = EnrichmentCache::load(&path).unwrap();
        assert_eq!(cache.stats().translations, 1);
        assert_eq!(cache.translation("oeuf"), Some("egg"));

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
