//! Field parsers. Every parser is total: bad input gives `None`, never an error.

use crate::processing::columns::{FLOOR_RULES, FURNISHED_NEGATIVE};
use crate::scrapers::pisos::parse_price_text;
use regex::Regex;
use std::sync::OnceLock;

fn decimal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+\.?\d*)").unwrap())
}

fn fee_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+[,.]?\d*)").unwrap())
}

fn integer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)").unwrap())
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// `"40,4168"` or `"40.4168"` -> 40.4168
pub fn parse_coordinate(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse().ok().and_then(finite)
}

/// First `\d+\.?\d*` token, e.g. `"85 m²"` -> 85.0
pub fn first_number(text: &str) -> Option<f64> {
    let m = decimal_regex().find(text)?;
    m.as_str().parse().ok().and_then(finite)
}

/// Integer prices, also accepting the `"349000.0"` form of float-typed columns
/// and display text such as `"1.234.567 €"`
pub fn parse_price(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(finite).map(|p| p.round() as i64))
        .or_else(|| parse_price_text(text))
}

/// Presence-only amenity: any value means present
pub fn parse_amenity(value: Option<&str>) -> bool {
    value.is_some()
}

/// Tri-state furnished flag
pub fn parse_furnished(value: Option<&str>) -> Option<bool> {
    let lower = value?.trim().to_lowercase();
    Some(!FURNISHED_NEGATIVE.contains(&lower.as_str()))
}

/// Community fee text such as `"1.200,50 €/mes"` -> 1200.5
pub fn parse_community_fee(text: &str) -> Option<f64> {
    let without_thousands = text.replace('.', "");
    let m = fee_regex().find(&without_thousands)?;
    m.as_str().replace(',', ".").parse().ok().and_then(finite)
}

/// Floor text -> numeric floor
pub fn parse_floor(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    if let Some((_, floor)) = FLOOR_RULES.iter().find(|(name, _)| lower.contains(name)) {
        return Some(*floor);
    }
    let m = integer_regex().find(&lower)?;
    m.as_str().parse().ok()
}

/// Case-insensitive lookup in an ordinal scale
pub fn parse_ordinal(text: &str, scale: &[(&str, f64)]) -> Option<f64> {
    let lower = text.trim().to_lowercase();
    scale.iter().find(|(label, _)| *label == lower).map(|(_, v)| *v)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Orientation {
    pub norte: bool,
    pub sur: bool,
    pub este: bool,
    pub oeste: bool,
}

/// Split orientation text into the four compass flags.
///
/// Flags are substring matches, with "oeste" removed before looking for
/// "este". Single-letter abbreviations count as whole words.
pub fn parse_orientation(value: Option<&str>) -> Orientation {
    let Some(text) = value else {
        return Orientation::default();
    };

    let lower = text.to_lowercase();
    let has_letter = |letter: &str| {
        lower
            .split(|c: char| !c.is_alphabetic())
            .any(|word| word == letter)
    };

    Orientation {
        norte: lower.contains("nor") || has_letter("n"),
        sur: lower.contains("sur") || lower.contains("sud") || has_letter("s"),
        este: lower.replace("oeste", "").contains("este") || has_letter("e"),
        oeste: lower.contains("oeste") || has_letter("o"),
    }
}
