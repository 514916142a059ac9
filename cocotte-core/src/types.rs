use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

/// Declares a string-backed vocabulary that keeps unrecognized values verbatim.
///
/// Documents come from an upstream language model, so an out-of-vocabulary value
/// must survive deserialization and be reported by the validator instead of
/// failing the whole parse.
macro_rules! open_vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal $(| $alias:literal)*,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value outside the known vocabulary, kept as written.
            Unknown(String),
        }

        impl $name {
            /// Every known value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Unknown(raw) => raw.as_str(),
                }
            }

            pub fn parse(raw: &str) -> Self {
                match raw.trim().to_lowercase().as_str() {
                    $($text $(| $alias)* => $name::$variant,)+
                    _ => $name::Unknown(raw.to_string()),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Unknown(_))
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                $name::parse(&raw)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_vocabulary! {
    /// Ingredient category, used for diet detection and seasonal matching.
    pub enum IngredientCategory {
        Meat => "meat",
        Poultry => "poultry",
        Seafood => "seafood" | "fish",
        Produce => "produce" | "vegetable" | "fruit",
        Dairy => "dairy",
        Egg => "egg" | "eggs",
        Grain => "grain",
        Legume => "legume",
        NutsSeeds => "nuts_seeds",
        Oil => "oil",
        Herb => "herb",
        Pantry => "pantry",
        Spice => "spice",
        Condiment => "condiment",
        Beverage => "beverage",
        Other => "other",
    }
}

impl IngredientCategory {
    /// Categories that rule out a vegan diet.
    pub fn is_animal_product(&self) -> bool {
        matches!(
            self,
            IngredientCategory::Meat
                | IngredientCategory::Poultry
                | IngredientCategory::Seafood
                | IngredientCategory::Dairy
                | IngredientCategory::Egg
        )
    }
}

impl Default for IngredientCategory {
    fn default() -> Self {
        IngredientCategory::Other
    }
}

open_vocabulary! {
    /// Kind of work a step performs.
    pub enum StepType {
        Prep => "prep",
        Combine => "combine",
        Cook => "cook",
        Rest => "rest",
        Serve => "serve",
    }
}

impl Default for StepType {
    fn default() -> Self {
        StepType::Prep
    }
}

open_vocabulary! {
    pub enum Difficulty {
        Easy => "easy",
        Medium => "medium",
        Hard => "hard",
    }
}

open_vocabulary! {
    pub enum RecipeType {
        Appetizer => "appetizer",
        Starter => "starter",
        MainCourse => "main_course",
        Dessert => "dessert",
        Drink => "drink",
        Base => "base",
    }
}

open_vocabulary! {
    /// Measurement unit. Unknown units pass through untouched.
    pub enum Unit {
        Gram => "g" | "gram" | "grams" | "gr",
        Kilogram => "kg" | "kilogram" | "kilograms",
        Milliliter => "ml" | "milliliter" | "milliliters",
        Centiliter => "cl" | "centiliter" | "centiliters",
        Liter => "l" | "liter" | "liters" | "litre" | "litres",
        Teaspoon => "tsp" | "teaspoon" | "teaspoons" | "c. à café" | "cuillère à café",
        Tablespoon => "tbsp" | "tablespoon" | "tablespoons" | "c. à soupe" | "cuillère à soupe",
        Cup => "cup" | "cups",
        Ounce => "oz" | "ounce" | "ounces",
        Pound => "lb" | "lbs" | "pound" | "pounds",
        Piece => "piece" | "pieces" | "pièce" | "pièces",
        Pinch => "pinch" | "pincée",
        Bunch => "bunch" | "botte",
        Clove => "clove" | "cloves" | "gousse" | "gousses",
        Slice => "slice" | "slices" | "tranche" | "tranches",
        Can => "can" | "cans" | "boîte",
        Sprig => "sprig" | "sprigs" | "brin",
        Leaf => "leaf" | "leaves" | "feuille" | "feuilles",
    }
}

open_vocabulary! {
    pub enum Diet {
        Vegan => "vegan",
        Vegetarian => "vegetarian",
        Pescatarian => "pescatarian",
        Omnivorous => "omnivorous",
        GlutenFree => "gluten-free" | "gluten_free",
    }
}

open_vocabulary! {
    pub enum Season {
        Spring => "spring",
        Summer => "summer",
        Autumn => "autumn" | "fall",
        Winter => "winter",
        All => "all",
    }
}

impl Season {
    /// Meteorological season of a month (1 = January).
    pub fn of_month(month: u32) -> Season {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

/// How much of the ingredient list the nutrition estimate covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutritionConfidence {
    High,
    Medium,
    Low,
    None,
}

impl NutritionConfidence {
    pub fn from_resolved_fraction(fraction: f64) -> Self {
        if fraction >= 0.9 {
            NutritionConfidence::High
        } else if fraction >= 0.5 {
            NutritionConfidence::Medium
        } else if fraction > 0.0 {
            NutritionConfidence::Low
        } else {
            NutritionConfidence::None
        }
    }
}

/// Per-serving nutrition estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionPerServing {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    #[serde(default)]
    pub fiber: f64,
    pub confidence: NutritionConfidence,
    #[serde(default)]
    pub resolved_ingredients: usize,
    #[serde(default)]
    pub total_ingredients: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nutrition_issues: Vec<String>,
}

/// Recipe-level metadata, including the computed enrichment fields.
///
/// Keys this crate does not model are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stated servings. Non-integral values are kept and reported by validation.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_number"
    )]
    pub servings: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_type: Option<RecipeType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diets: Vec<Diet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<Season>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub peak_months: Vec<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_active_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_passive_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_active_time_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_passive_time_minutes: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_per_serving: Option<NutritionPerServing>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nutrition_tags: Vec<String>,
    /// Stated servings before a suspect-servings adjustment.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_number"
    )]
    pub servings_original: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings_suspect: Option<bool>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RecipeMetadata {
    /// Whole number of servings to divide by, if the stated value is usable.
    pub fn serving_count(&self) -> Option<i64> {
        self.servings
            .filter(|s| s.is_finite() && *s >= 1.0)
            .map(|s| s.round() as i64)
    }
}

/// Integral values are written without a fractional part.
fn serialize_number<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => serializer.serialize_i64(*v as i64),
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}

/// A typed ingredient node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "name_en", default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub category: IngredientCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_weight_grams: Option<f64>,
}

impl Ingredient {
    /// English name if known, otherwise the original name.
    pub fn display_name_en(&self) -> &str {
        self.name_en
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

fn default_sub_recipe() -> String {
    "main".to_string()
}

/// A transformation step in the recipe graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub step_type: StepType,
    /// ISO-8601 duration, e.g. `PT15M`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Oven or cooking temperature in degrees Celsius.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_number"
    )]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub is_passive: bool,
    /// Ingredient ids or produced states consumed by this step.
    #[serde(default)]
    pub uses: Vec<String>,
    /// States that must exist but are not consumed (e.g. a preheated oven).
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub produces: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_cue: Option<String>,
    #[serde(default = "default_sub_recipe")]
    pub sub_recipe: String,
}

impl Default for Step {
    fn default() -> Self {
        Self {
            id: String::new(),
            action: String::new(),
            step_type: StepType::default(),
            duration: None,
            temperature: None,
            is_passive: false,
            uses: Vec::new(),
            requires: Vec::new(),
            produces: String::new(),
            visual_cue: None,
            sub_recipe: default_sub_recipe(),
        }
    }
}

impl Step {
    /// Every reference this step depends on, `uses` first.
    pub fn references(&self) -> impl Iterator<Item = &String> {
        self.uses.iter().chain(self.requires.iter())
    }
}

/// A recipe document as persisted in `{slug}.recipe.json`.
///
/// This is the untrusted shape: it may violate graph invariants. Use
/// [`crate::validation::Recipe`] for a document that passed validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDocument {
    #[serde(default)]
    pub metadata: RecipeMetadata,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub final_state: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

impl RecipeDocument {
    pub fn ingredient_ids(&self) -> HashSet<String> {
        self.ingredients
            .iter()
            .filter(|i| !i.id.is_empty())
            .map(|i| i.id.clone())
            .collect()
    }

    pub fn produced_states(&self) -> HashSet<String> {
        self.steps
            .iter()
            .filter(|s| !s.produces.is_empty())
            .map(|s| s.produces.clone())
            .collect()
    }
}
