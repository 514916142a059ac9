//! Seasonal produce reference table.
//!
//! Peak months for common vegetables and fruits, loaded from
//! `data/seasonal_produce.json` at compile time. Names are matched in English
//! and French.

use serde::Deserialize;
use std::sync::LazyLock;

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonalProduce {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub peak_months: Vec<u32>,
}

#[derive(Deserialize)]
struct SeasonalData {
    produce: Vec<SeasonalProduce>,
}

static PRODUCE: LazyLock<Vec<SeasonalProduce>> = LazyLock::new(|| {
    let json = include_str!("../data/seasonal_produce.json");
    let data: SeasonalData =
        serde_json::from_str(json).expect("Failed to parse seasonal_produce.json");
    data.produce
});

/// (lowercased name or alias, index into PRODUCE), longest name first.
static MATCH_TABLE: LazyLock<Vec<(String, usize)>> = LazyLock::new(|| {
    let mut table: Vec<(String, usize)> = PRODUCE
        .iter()
        .enumerate()
        .flat_map(|(idx, p)| {
            std::iter::once(p.name.to_lowercase())
                .chain(p.aliases.iter().map(|a| a.to_lowercase()))
                .map(move |name| (name, idx))
        })
        .collect();
    // Longer names first so "sweet potato" wins over "potato" and "peach" over "pea".
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
    table
});

pub fn all_produce() -> &'static [SeasonalProduce] {
    &PRODUCE
}

fn starts_word(haystack: &str, at: usize) -> bool {
    haystack[..at]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric())
}

/// Produce items named in an ingredient name.
///
/// A name may mention several items ("cherry tomatoes"); each table entry must
/// start at a word boundary and may not overlap a longer entry already matched.
pub fn match_produce(ingredient_name: &str) -> Vec<&'static SeasonalProduce> {
    let name = ingredient_name.trim().to_lowercase();
    let mut taken: Vec<(usize, usize)> = Vec::new();
    let mut matched: Vec<usize> = Vec::new();

    for (entry, idx) in MATCH_TABLE.iter() {
        for (start, _) in name.match_indices(entry.as_str()) {
            let end = start + entry.len();
            if !starts_word(&name, start) || taken.iter().any(|&(s, e)| start < e && s < end) {
                continue;
            }
            taken.push((start, end));
            if !matched.contains(idx) {
                matched.push(*idx);
            }
        }
    }

    matched.sort_unstable();
    matched.into_iter().map(|idx| &PRODUCE[idx]).collect()
}
