use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::scrapers::types::{FetchError, NetworkErrorKind};

/// Which pisos.com market a run targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Sale,
    Rental,
}

impl Operation {
    /// First listing page for Madrid Capital
    pub fn default_listing_url(self) -> &'static str {
        match self {
            Operation::Sale => "https://www.pisos.com/venta/pisos-madrid_capital_zona_urbana/",
            Operation::Rental => "https://www.pisos.com/alquiler/pisos-madrid_capital_zona_urbana/",
        }
    }

    /// Name of the price column in the raw table
    pub fn price_column(self) -> &'static str {
        match self {
            Operation::Sale => "price_eur",
            Operation::Rental => "rent_eur_per_month",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Operation::Sale => "sale",
            Operation::Rental => "rental",
        }
    }
}

/// A property link discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingStub {
    pub url: String,
    pub latitude: String,
    pub longitude: String,
    pub page_source: u32,
}

/// Value of a feature row on the detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureValue {
    Text(String),
    /// Label-only feature such as "Ascensor"
    Present,
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Text(text) => f.write_str(text),
            FeatureValue::Present => f.write_str("True"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub barrio: Option<String>,
    pub distrito: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyCertificate {
    pub main_classification: Option<String>,
    pub consumption_rating: Option<String>,
    pub consumption_value: Option<String>,
    pub emissions_rating: Option<String>,
    pub emissions_value: Option<String>,
}

/// Outcome of a single detail-page scrape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrapeStatus {
    Success,
    HttpError { code: u16 },
    NetworkError { kind: NetworkErrorKind },
    ParseError { field: String },
}

impl ScrapeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeStatus::Success)
    }
}

impl From<&FetchError> for ScrapeStatus {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::Http { status } => ScrapeStatus::HttpError { code: *status },
            FetchError::Network { kind, .. } => ScrapeStatus::NetworkError { kind: *kind },
        }
    }
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeStatus::Success => f.write_str("Success"),
            ScrapeStatus::HttpError { code } => write!(f, "HTTP Error: {}", code),
            ScrapeStatus::NetworkError { kind } => write!(f, "Request Error: {}", kind),
            ScrapeStatus::ParseError { field } => {
                write!(f, "Unexpected Error: ParseError({})", field)
            }
        }
    }
}

/// Everything extracted from one property detail page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub property_native_id: Option<String>,
    pub price: Option<i64>,
    pub location: Location,
    pub features: BTreeMap<String, FeatureValue>,
    pub energy: EnergyCertificate,
    pub description: Option<String>,
}

/// Core property data model: details plus scrape outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub url: String,
    pub details: PropertyDetails,
    pub scrape_status: ScrapeStatus,
    pub scraped_at: DateTime<Utc>,
}

impl PropertyRecord {
    pub fn success(url: &str, details: PropertyDetails) -> Self {
        Self {
            url: url.to_string(),
            details,
            scrape_status: ScrapeStatus::Success,
            scraped_at: Utc::now(),
        }
    }

    pub fn failed(url: &str, status: ScrapeStatus) -> Self {
        Self {
            url: url.to_string(),
            details: PropertyDetails::default(),
            scrape_status: status,
            scraped_at: Utc::now(),
        }
    }

    /// Flatten into `(column, value)` pairs. Feature labels become columns.
    pub fn columns(&self, price_column: &str) -> Vec<(String, Option<String>)> {
        let d = &self.details;
        let mut cols = vec![
            ("url".to_string(), Some(self.url.clone())),
            ("property_native_id".to_string(), d.property_native_id.clone()),
            (price_column.to_string(), d.price.map(|p| p.to_string())),
            ("barrio".to_string(), d.location.barrio.clone()),
            ("distrito".to_string(), d.location.distrito.clone()),
            ("scrape_status".to_string(), Some(self.scrape_status.to_string())),
            ("scraped_timestamp".to_string(), Some(self.scraped_at.to_rfc3339())),
            ("description".to_string(), d.description.clone()),
            (
                "energy_certificate_main_classification".to_string(),
                d.energy.main_classification.clone(),
            ),
            ("energy_consumption_rating".to_string(), d.energy.consumption_rating.clone()),
            ("energy_consumption_value".to_string(), d.energy.consumption_value.clone()),
            ("energy_emissions_rating".to_string(), d.energy.emissions_rating.clone()),
            ("energy_emissions_value".to_string(), d.energy.emissions_value.clone()),
        ];
        for (label, value) in &d.features {
            let rendered = value.to_string();
            cols.push((label.clone(), (!rendered.is_empty()).then_some(rendered)));
        }
        cols
    }
}

/// A listing stub joined with its detail record
#[derive(Debug, Clone)]
pub struct CombinedRecord {
    pub stub: ListingStub,
    pub record: PropertyRecord,
}

impl CombinedRecord {
    /// Stub fields own url/latitude/longitude/page_source.
    pub fn columns(&self, price_column: &str) -> Vec<(String, Option<String>)> {
        let mut cols: Vec<(String, Option<String>)> = self
            .record
            .columns(price_column)
            .into_iter()
            .filter(|(name, _)| !matches!(name.as_str(), "url" | "latitude" | "longitude" | "page_source"))
            .collect();
        cols.push(("url".to_string(), Some(self.stub.url.clone())));
        cols.push(("latitude".to_string(), Some(self.stub.latitude.clone())));
        cols.push(("longitude".to_string(), Some(self.stub.longitude.clone())));
        cols.push(("page_source".to_string(), Some(self.stub.page_source.to_string())));
        cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_follow_the_csv_taxonomy() {
        assert_eq!(ScrapeStatus::Success.to_string(), "Success");
        assert_eq!(ScrapeStatus::HttpError { code: 404 }.to_string(), "HTTP Error: 404");
        assert_eq!(
            ScrapeStatus::NetworkError { kind: NetworkErrorKind::Timeout }.to_string(),
            "Request Error: Timeout"
        );
        assert_eq!(
            ScrapeStatus::ParseError { field: "body".into() }.to_string(),
            "Unexpected Error: ParseError(body)"
        );
    }

    #[test]
    fn stub_fields_take_precedence_in_combined_columns() {
        let mut details = PropertyDetails::default();
        details.features.insert("latitude".into(), FeatureValue::Text("0".into()));
        details.features.insert("Ascensor".into(), FeatureValue::Present);
        let combined = CombinedRecord {
            stub: ListingStub {
                url: "https://www.pisos.com/piso/1".into(),
                latitude: "40.41".into(),
                longitude: "-3.70".into(),
                page_source: 2,
            },
            record: PropertyRecord::success("https://other/", details),
        };

        let cols = combined.columns("price_eur");
        let get = |name: &str| {
            cols.iter()
                .filter(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(get("url"), vec![Some("https://www.pisos.com/piso/1".to_string())]);
        assert_eq!(get("latitude"), vec![Some("40.41".to_string())]);
        assert_eq!(get("page_source"), vec![Some("2".to_string())]);
        assert_eq!(get("Ascensor"), vec![Some("True".to_string())]);
    }
}
