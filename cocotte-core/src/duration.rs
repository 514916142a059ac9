//! Duration parsing and ISO-8601 formatting.
//!
//! Durations are optional hints on steps, so parsing never fails: anything
//! unrecognized reads as zero minutes.

use regex::Regex;
use std::sync::LazyLock;

static ISO_8601: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^P(?:(\d+(?:\.\d+)?)D)?(?:T(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .expect("valid ISO-8601 duration regex")
});

/// `1h30min`, `1h30`, `5min`, `2h`, `90`
static COMPACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(\d+(?:\.\d+)?)\s*h)?\s*(?:(\d+(?:\.\d+)?)\s*(?:min|mn|m)?)?$")
        .expect("valid compact duration regex")
});

/// `45 minutes`, `1 hour 15 minutes`, `2 heures`
static VERBOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*(days?|jours?|hours?|hrs?|heures?|minutes?|mins?|seconds?|secondes?|secs?)\b",
    )
    .expect("valid verbose duration regex")
});

fn number(capture: Option<regex::Match<'_>>) -> f64 {
    capture
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Parse a human or ISO-8601 duration into minutes.
///
/// Patterns are tried in order: ISO-8601 (`PT1H30M`, `PT30S`), compact
/// (`1h30min`, `5min`), then verbose (`1 hour 15 minutes`). Empty, missing, or
/// unparseable input yields `0.0`.
pub fn parse_duration(text: Option<&str>) -> f64 {
    let Some(text) = text else {
        return 0.0;
    };
    let text = text.trim().replace(',', ".");
    if text.is_empty() {
        return 0.0;
    }

    if let Some(caps) = ISO_8601.captures(&text) {
        return number(caps.get(1)) * 1440.0
            + number(caps.get(2)) * 60.0
            + number(caps.get(3))
            + number(caps.get(4)) / 60.0;
    }

    if let Some(caps) = COMPACT.captures(&text) {
        if caps.get(1).is_some() || caps.get(2).is_some() {
            return number(caps.get(1)) * 60.0 + number(caps.get(2));
        }
    }

    VERBOSE
        .captures_iter(&text)
        .map(|caps| {
            let value = number(caps.get(1));
            let unit = caps.get(2).map(|m| m.as_str().to_lowercase());
            match unit.as_deref().and_then(|u| u.chars().next()) {
                Some('d') | Some('j') => value * 1440.0,
                Some('h') => value * 60.0,
                Some('s') => value / 60.0,
                _ => value,
            }
        })
        .sum()
}

/// Format minutes as a canonical ISO-8601 duration.
///
/// `0` → `PT0M`, `45` → `PT45M`, `120` → `PT2H`, `90` → `PT1H30M`. Fractional
/// minutes keep their seconds (`0.5` → `PT30S`) so the output always parses back
/// to the same value. Negative or non-finite input formats as `PT0M`.
pub fn minutes_to_iso8601(minutes: f64) -> String {
    if !minutes.is_finite() || minutes <= 0.0 {
        return "PT0M".to_string();
    }

    let total_seconds = (minutes * 60.0).round() as u64;
    let hours = total_seconds / 3600;
    let mins = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if mins > 0 {
        out.push_str(&format!("{}M", mins));
    }
    if secs > 0 {
        out.push_str(&format!("{}S", secs));
    }
    if out.len() == 2 {
        out.push_str("0M");
    }
    out
}
