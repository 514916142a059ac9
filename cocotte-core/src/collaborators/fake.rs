//! In-memory collaborators for tests and offline runs.

use super::{CollaboratorError, IngredientTranslator, NutrientProfile, NutritionMatcher};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Dictionary-backed translator. Names are matched case-insensitively.
#[derive(Debug, Default)]
pub struct FakeTranslator {
    translations: HashMap<String, String>,
    failures: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translations(pairs: &[(&str, &str)]) -> Self {
        let mut translator = Self::new();
        for (from, to) in pairs {
            translator.add_translation(from, to);
        }
        translator
    }

    pub fn add_translation(&mut self, name: &str, name_en: &str) {
        self.translations.insert(key(name), name_en.to_string());
    }

    /// Make lookups for `name` fail with a request error.
    pub fn fail_on(mut self, name: &str) -> Self {
        self.failures.insert(key(name));
        self
    }

    /// Number of `translate` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IngredientTranslator for FakeTranslator {
    async fn translate(
        &self,
        name: &str,
        _source_language: &str,
    ) -> Result<Option<String>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = key(name);
        if self.failures.contains(&name) {
            return Err(CollaboratorError::RequestFailed(format!(
                "FakeTranslator: configured to fail for '{}'",
                name
            )));
        }
        Ok(self.translations.get(&name).cloned())
    }

    fn translator_name(&self) -> &'static str {
        "fake"
    }
}

/// Table-backed nutrition matcher.
#[derive(Debug, Default)]
pub struct FakeMatcher {
    profiles: HashMap<String, NutrientProfile>,
    failures: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_profile(&mut self, name_en: &str, profile: NutrientProfile) {
        self.profiles.insert(key(name_en), profile);
    }

    pub fn with_profile(mut self, name_en: &str, profile: NutrientProfile) -> Self {
        self.add_profile(name_en, profile);
        self
    }

    pub fn fail_on(mut self, name_en: &str) -> Self {
        self.failures.insert(key(name_en));
        self
    }

    /// A matcher preloaded with a handful of staples, per 100 g.
    pub fn with_staples() -> Self {
        let staples = [
            ("flour", 364.0, 10.3, 1.0, 76.3, 2.7),
            ("butter", 717.0, 0.9, 81.1, 0.1, 0.0),
            ("sugar", 387.0, 0.0, 0.0, 100.0, 0.0),
            ("egg", 143.0, 12.6, 9.5, 0.7, 0.0),
            ("milk", 61.0, 3.2, 3.3, 4.8, 0.0),
            ("chicken breast", 165.0, 31.0, 3.6, 0.0, 0.0),
            ("rice", 130.0, 2.7, 0.3, 28.2, 0.4),
            ("tomato", 18.0, 0.9, 0.2, 3.9, 1.2),
            ("onion", 40.0, 1.1, 0.1, 9.3, 1.7),
            ("olive oil", 884.0, 0.0, 100.0, 0.0, 0.0),
            ("lentils", 116.0, 9.0, 0.4, 20.1, 7.9),
        ];
        let mut matcher = Self::new();
        for (name, calories, protein, fat, carbs, fiber) in staples {
            matcher.add_profile(
                name,
                NutrientProfile {
                    calories,
                    protein,
                    fat,
                    carbs,
                    fiber,
                },
            );
        }
        matcher
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NutritionMatcher for FakeMatcher {
    async fn match_nutrition(
        &self,
        name_en: &str,
    ) -> Result<Option<NutrientProfile>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = key(name_en);
        if self.failures.contains(&name) {
            return Err(CollaboratorError::RequestFailed(format!(
                "FakeMatcher: configured to fail for '{}'",
                name
            )));
        }
        Ok(self.profiles.get(&name).copied())
    }

    fn matcher_name(&self) -> &'static str {
        "fake"
    }
}
