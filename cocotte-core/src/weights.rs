//! Ingredient weight estimation for nutrition.
//!
//! Converts a quantity and unit to grams with fixed factors. Liquids are
//! treated as water density; count units use typical per-item weights.

use crate::types::{Ingredient, Unit};

const GRAMS_PER_OZ: f64 = 28.35;
const GRAMS_PER_LB: f64 = 453.6;

/// Weight of one unnamed piece when nothing better is known.
pub const DEFAULT_PIECE_GRAMS: f64 = 100.0;

/// Typical weight of one item, keyed by a word in its English name.
/// Checked in order, so compound names precede the words they contain.
const PIECE_WEIGHTS: &[(&str, f64)] = &[
    ("eggplant", 300.0),
    ("pineapple", 900.0),
    ("egg", 50.0),
    ("shallot", 30.0),
    ("onion", 150.0),
    ("garlic", 5.0),
    ("tomato", 120.0),
    ("carrot", 80.0),
    ("potato", 150.0),
    ("lemon", 100.0),
    ("lime", 65.0),
    ("apple", 150.0),
    ("banana", 120.0),
    ("zucchini", 200.0),
    ("courgette", 200.0),
    ("pepper", 150.0),
    ("avocado", 170.0),
];

/// Ingredients whose contribution to nutrition is negligible.
const NEGLIGIBLE_INGREDIENTS: &[&str] = &[
    "salt", "table salt", "sea salt", "fleur de sel", "coarse salt",
    "black pepper", "white pepper", "pepper", "peppercorns",
    "water", "ice", "ice water", "cold water", "hot water",
    "baking soda", "baking powder",
    "cinnamon", "nutmeg", "paprika", "cumin", "turmeric",
    "cayenne pepper", "chili powder", "curry powder",
    "cloves", "allspice", "cardamom", "star anise",
    "oregano", "thyme", "rosemary", "bay leaf",
    "basil", "fresh basil", "parsley", "fresh parsley",
    "cilantro", "fresh cilantro", "mint", "fresh mint",
    "dill", "fresh dill", "chives", "fresh chives", "tarragon",
    "vanilla extract", "vanilla paste", "vanilla bean",
    "food coloring", "gelatin",
];

pub fn is_negligible(name_en: &str) -> bool {
    let name = name_en.trim().to_lowercase();
    NEGLIGIBLE_INGREDIENTS.contains(&name.as_str())
}

fn piece_grams(name_en: &str) -> f64 {
    let name = name_en.to_lowercase();
    PIECE_WEIGHTS
        .iter()
        .find(|(word, _)| name.contains(word))
        .map(|(_, grams)| *grams)
        .unwrap_or(DEFAULT_PIECE_GRAMS)
}

/// Grams for one unit, or `None` for units with no sensible conversion.
fn grams_per_unit(unit: &Unit, name_en: &str) -> Option<f64> {
    let grams = match unit {
        Unit::Gram | Unit::Milliliter => 1.0,
        Unit::Kilogram | Unit::Liter => 1000.0,
        Unit::Centiliter => 10.0,
        Unit::Teaspoon => 5.0,
        Unit::Tablespoon => 15.0,
        Unit::Cup => 240.0,
        Unit::Ounce => GRAMS_PER_OZ,
        Unit::Pound => GRAMS_PER_LB,
        Unit::Pinch => 0.5,
        Unit::Clove => 5.0,
        Unit::Sprig => 1.0,
        Unit::Leaf => 0.5,
        Unit::Slice => 30.0,
        Unit::Bunch => 30.0,
        Unit::Can => 400.0,
        Unit::Piece => piece_grams(name_en),
        Unit::Unknown(_) => return None,
    };
    Some(grams)
}

/// Estimated weight of an ingredient in grams.
///
/// A quantity with no unit counts pieces. Returns `None` without a quantity or
/// with an unrecognized unit.
pub fn estimate_grams(ingredient: &Ingredient) -> Option<f64> {
    let quantity = ingredient.quantity.filter(|q| *q >= 0.0)?;
    let name_en = ingredient.display_name_en();
    let per_unit = match &ingredient.unit {
        Some(unit) => grams_per_unit(unit, name_en)?,
        None => piece_grams(name_en),
    };
    Some(quantity * per_unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name_en: &str, quantity: Option<f64>, unit: Option<&str>) -> Ingredient {
        Ingredient {
            id: name_en.replace(' ', "_"),
            name: name_en.to_string(),
            name_en: Some(name_en.to_string()),
            quantity,
            unit: unit.map(Unit::parse),
            ..Ingredient::default()
        }
    }

    #[test]
    fn test_metric_and_volume_units() {
        assert_eq!(estimate_grams(&ingredient("flour", Some(250.0), Some("g"))), Some(250.0));
        assert_eq!(estimate_grams(&ingredient("flour", Some(0.5), Some("kg"))), Some(500.0));
        assert_eq!(estimate_grams(&ingredient("milk", Some(20.0), Some("cl"))), Some(200.0));
        assert_eq!(estimate_grams(&ingredient("oil", Some(2.0), Some("tbsp"))), Some(30.0));
        assert_eq!(estimate_grams(&ingredient("butter", Some(1.0), Some("lb"))), Some(453.6));
    }

    #[test]
    fn test_pieces() {
        assert_eq!(estimate_grams(&ingredient("eggs", Some(3.0), None)), Some(150.0));
        assert_eq!(
            estimate_grams(&ingredient("onion", Some(1.0), Some("pièce"))),
            Some(150.0)
        );
        assert_eq!(estimate_grams(&ingredient("mystery", Some(2.0), None)), Some(200.0));
    }

    #[test]
    fn test_unconvertible() {
        assert_eq!(estimate_grams(&ingredient("flour", None, Some("g"))), None);
        assert_eq!(estimate_grams(&ingredient("flour", Some(1.0), Some("handful"))), None);
    }

    #[test]
    fn test_negligible() {
        assert!(is_negligible("Salt"));
        assert!(is_negligible(" bay leaf "));
        assert!(!is_negligible("butter"));
    }
}
