//! DetermineDiets enrichment.

use super::{EnrichOptions, Enrichment, EnrichmentError};
use crate::types::{Diet, Ingredient, IngredientCategory, RecipeDocument};

const MEAT_KEYWORDS: &[&str] = &[
    "beef", "pork", "chicken", "turkey", "lamb", "duck", "venison", "bacon", "sausage", "ham",
    "veal", "boeuf", "bœuf", "porc", "poulet", "dinde", "agneau", "canard", "lardon", "lardons",
    "jambon", "saucisse", "veau",
];

const SEAFOOD_KEYWORDS: &[&str] = &[
    "fish", "salmon", "tuna", "cod", "shrimp", "prawn", "lobster", "crab", "mussel", "oyster",
    "clam", "scallop", "anchovy", "poisson", "saumon", "thon", "cabillaud", "crevette",
    "homard", "crabe", "moule", "huître", "anchois",
];

const DAIRY_KEYWORDS: &[&str] = &[
    "milk", "cheese", "butter", "cream", "yogurt", "yoghurt", "curd", "whey", "ricotta",
    "mozzarella", "lait", "fromage", "beurre", "crème", "yaourt",
];

const EGG_KEYWORDS: &[&str] = &["egg", "oeuf", "œuf"];

#[derive(Debug, Default, Clone, Copy)]
struct AnimalProducts {
    meat: bool,
    seafood: bool,
    dairy: bool,
    egg: bool,
}

/// Matches whole words, allowing a plural `s`/`x`.
fn mentions(name: &str, keywords: &[&str]) -> bool {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|word| {
            keywords.iter().any(|k| {
                word == *k
                    || word
                        .strip_suffix(['s', 'x'])
                        .is_some_and(|stem| stem == *k)
            })
        })
}

fn scan(ingredients: &[Ingredient]) -> AnimalProducts {
    let mut found = AnimalProducts::default();

    for ingredient in ingredients.iter().filter(|i| !i.optional) {
        match &ingredient.category {
            IngredientCategory::Meat | IngredientCategory::Poultry => found.meat = true,
            IngredientCategory::Seafood => found.seafood = true,
            IngredientCategory::Dairy => found.dairy = true,
            IngredientCategory::Egg => found.egg = true,
            IngredientCategory::Other | IngredientCategory::Unknown(_) => {
                let names = format!(
                    "{} {}",
                    ingredient.name.to_lowercase(),
                    ingredient.name_en.as_deref().unwrap_or("").to_lowercase()
                );
                found.meat |= mentions(&names, MEAT_KEYWORDS);
                found.seafood |= mentions(&names, SEAFOOD_KEYWORDS);
                found.dairy |= mentions(&names, DAIRY_KEYWORDS);
                found.egg |= mentions(&names, EGG_KEYWORDS);
            }
            _ => {}
        }
    }
    found
}

/// Diets a recipe is compatible with.
///
/// Categories decide; names are only scanned for uncategorized ingredients.
/// Optional ingredients are ignored since they can be left out.
pub fn determine_diets(ingredients: &[Ingredient]) -> Vec<Diet> {
    let found = scan(ingredients);

    if found.meat {
        vec![Diet::Omnivorous]
    } else if found.seafood {
        vec![Diet::Pescatarian, Diet::Omnivorous]
    } else if found.dairy || found.egg {
        vec![Diet::Vegetarian, Diet::Pescatarian, Diet::Omnivorous]
    } else {
        vec![
            Diet::Vegan,
            Diet::Vegetarian,
            Diet::Pescatarian,
            Diet::Omnivorous,
        ]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DetermineDiets;

impl Enrichment for DetermineDiets {
    fn enrichment_type(&self) -> &'static str {
        "determine_diets"
    }

    fn display_name(&self) -> &'static str {
        "Determine Diets"
    }

    fn description(&self) -> &'static str {
        "Classify the recipe as vegan, vegetarian, pescatarian or omnivorous from its ingredients"
    }

    fn output_fields(&self) -> &'static [&'static str] {
        &["diets"]
    }

    fn apply(
        &self,
        original: &RecipeDocument,
        _options: &EnrichOptions,
    ) -> Result<RecipeDocument, EnrichmentError> {
        let mut recipe = original.clone();
        recipe.metadata.diets = determine_diets(&recipe.ingredients);
        Ok(recipe)
    }
}
