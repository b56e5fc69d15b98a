//! Field extractors for pisos.com property detail pages.
//!
//! Each field with more than one way to find it is an ordered list of
//! strategies; the first one that yields a value wins.

use crate::models::{EnergyCertificate, FeatureValue, Location, PropertyDetails};
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub type Strategy<T> = (&'static str, fn(&Html) -> Option<T>);

pub const PRICE_STRATEGIES: &[Strategy<i64>] = &[
    ("data-ad-price", price_from_data_attribute),
    ("price__value", price_from_value_element),
    ("toolbar-mobile__price", price_from_mobile_toolbar),
];

pub const LOCATION_STRATEGIES: &[Strategy<Location>] = &[
    ("title-subtitle", location_from_title_block),
    ("paragraph-scan", location_from_any_paragraph),
];

/// Run strategies in order and return the first hit with its name
pub fn first_match<T>(document: &Html, strategies: &[Strategy<T>]) -> Option<(&'static str, T)> {
    strategies
        .iter()
        .find_map(|(name, strategy)| strategy(document).map(|value| (*name, value)))
}

/// Parse a fixed CSS selector once per call site
macro_rules! selector {
    ($css:literal) => {{
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        SELECTOR.get_or_init(|| Selector::parse($css).unwrap())
    }};
}

/// Collapse whitespace runs to single spaces; `None` when nothing is left
pub fn clean_text(text: &str) -> Option<String> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

fn element_text(element: ElementRef) -> Option<String> {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Strip currency symbol, thousands dots and whitespace, then parse
pub fn parse_price_text(text: &str) -> Option<i64> {
    let digits: String = text
        .chars()
        .filter(|c| *c != '€' && *c != '.' && !c.is_whitespace())
        .collect();
    digits.parse().ok()
}

fn price_from_data_attribute(document: &Html) -> Option<i64> {
    document
        .select(selector!("div.details[data-ad-price]"))
        .find_map(|div| div.value().attr("data-ad-price"))
        .and_then(|raw| raw.trim().parse().ok())
}

fn price_from_text_element(document: &Html, selector: &Selector) -> Option<i64> {
    let element = document.select(selector).next()?;
    parse_price_text(&element_text(element)?)
}

fn price_from_value_element(document: &Html) -> Option<i64> {
    price_from_text_element(document, selector!("div.price__value.jsPriceValue"))
}

fn price_from_mobile_toolbar(document: &Html) -> Option<i64> {
    price_from_text_element(document, selector!("div.toolbar-mobile__price"))
}

pub fn extract_price(document: &Html) -> Option<i64> {
    first_match(document, PRICE_STRATEGIES).map(|(_, price)| price)
}

pub fn extract_native_id(document: &Html) -> Option<String> {
    document
        .select(selector!("div.details[data-ad-id]"))
        .find_map(|div| div.value().attr("data-ad-id"))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn distrito_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Distrito\s+([^.)]+)").unwrap())
}

/// Parse `"Opañel (Distrito Carabanchel. Madrid Capital)"`
pub fn parse_location_text(text: &str) -> Option<Location> {
    if !(text.contains('(') && text.contains("Distrito") && text.contains("Madrid Capital")) {
        return None;
    }
    let (barrio, rest) = text.split_once('(')?;
    let barrio = clean_text(barrio);
    let distrito = distrito_regex()
        .captures(rest)
        .and_then(|caps| caps.get(1))
        .and_then(|m| clean_text(m.as_str()));
    Some(Location { barrio, distrito })
}

fn looks_like_title(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains(" en venta en ") || lower.contains(" en alquiler en ") || text.chars().count() > 15
}

fn next_sibling_named<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == name)
}

fn location_from_title_block(document: &Html) -> Option<Location> {
    let h1 = selector!("h1");
    document
        .select(selector!("div.details__block"))
        .filter_map(|block| block.select(h1).next())
        .filter(|title| element_text(*title).is_some_and(|t| looks_like_title(&t)))
        .filter_map(|title| next_sibling_named(title, "p"))
        .find_map(|p| element_text(p).and_then(|t| parse_location_text(&t)))
}

fn location_from_any_paragraph(document: &Html) -> Option<Location> {
    document.select(selector!("p")).find_map(|p| {
        let location = element_text(p).and_then(|t| parse_location_text(&t))?;
        let previous = p.prev_siblings().find_map(ElementRef::wrap)?;
        (previous.value().name() == "h1").then_some(location)
    })
}

pub fn extract_location(document: &Html) -> Location {
    first_match(document, LOCATION_STRATEGIES)
        .map(|(_, location)| location)
        .unwrap_or_default()
}

pub fn extract_features(document: &Html) -> BTreeMap<String, FeatureValue> {
    let mut features = BTreeMap::new();
    let Some(section) = document.select(selector!("div.features")).next() else {
        return features;
    };

    let label_selector = selector!("span.features__label");
    let value_selector = selector!("span.features__value");

    for feature in section.select(selector!("div.features__feature")) {
        let Some(label) = feature.select(label_selector).next().and_then(element_text) else {
            continue;
        };
        let label = label.replace(':', "").trim().to_string();
        if label.is_empty() {
            continue;
        }

        let value = match feature.select(value_selector).next() {
            Some(value) => FeatureValue::Text(element_text(value).unwrap_or_default()),
            None => FeatureValue::Present,
        };
        features.insert(label, value);
    }
    features
}

pub fn extract_energy_certificate(document: &Html) -> EnergyCertificate {
    let mut energy = EnergyCertificate::default();
    let Some(block) = document
        .select(selector!("div.details__block.energy-certificate"))
        .next()
    else {
        return energy;
    };

    if let Some(text) = block.select(selector!("p")).next().and_then(element_text) {
        energy.main_classification = clean_text(&text.replace("Clasificación:", ""));
    }

    let tag_selector = selector!("span.energy-certificate__tag");
    for row in block.select(selector!("div.energy-certificate__data")) {
        let Some(tag) = row.select(tag_selector).next() else { continue };
        let Some(info) = next_sibling_named(tag, "span").and_then(element_text) else {
            continue;
        };
        let rating = element_text(tag).map(|r| r.to_uppercase());

        if let Some((_, value)) = info.split_once("Consumo:") {
            energy.consumption_rating = rating;
            energy.consumption_value = clean_text(value);
        } else if let Some((_, value)) = info.split_once("Emisiones:") {
            energy.emissions_rating = rating;
            energy.emissions_value = clean_text(value);
        }
    }
    energy
}

pub fn extract_description(document: &Html) -> Option<String> {
    let content = document.select(selector!("div.description__content")).next()?;
    let mut text = String::new();
    for child in content.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push('\n'),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    text.extend(el.text());
                }
            }
            _ => {}
        }
    }
    clean_text(&text)
}

/// Extract every field from a detail page body
pub fn parse_detail_page(html: &str) -> PropertyDetails {
    let document = Html::parse_document(html);
    PropertyDetails {
        property_native_id: extract_native_id(&document),
        price: extract_price(&document),
        location: extract_location(&document),
        features: extract_features(&document),
        energy: extract_energy_certificate(&document),
        description: extract_description(&document),
    }
}
