//! Raw scrape table -> fixed-schema processed table.

pub mod columns;
pub mod impute;
pub mod parse;
pub mod row;

pub use row::ProcessedPropertyRow;

use crate::table::{RawRow, RawTable};
use anyhow::{Context, Result};
use columns::{ANTIQUITY_SCALE, CONDITION_SCALE, DROP_COLUMNS};
use parse::{
    first_number, parse_amenity, parse_community_fee, parse_coordinate, parse_floor,
    parse_furnished, parse_ordinal, parse_orientation, parse_price,
};
use row::AMENITY_COLUMNS;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct CleanReport {
    pub rows: Vec<ProcessedPropertyRow>,
    pub input_rows: usize,
    pub dropped_without_price: usize,
    pub discarded_columns: Vec<String>,
}

/// Read a raw column under its processed name, trying every source column
fn field<'a>(row: &RawRow<'a>, processed: &'static str) -> Option<&'a str> {
    columns::sources_of(processed).find_map(|raw| row.get(raw))
}

fn clean_row(row: &RawRow<'_>) -> Option<ProcessedPropertyRow> {
    let price_eur = field(row, "price_eur").and_then(parse_price)?;
    let text = |name: &'static str| field(row, name).map(str::to_string);

    let orientation = parse_orientation(field(row, "orientacion"));

    let mut out = ProcessedPropertyRow {
        url: text("url"),
        property_id: text("property_id"),
        price_eur,
        barrio: text("barrio"),
        distrito: text("distrito"),
        latitude: field(row, "latitude").and_then(parse_coordinate),
        longitude: field(row, "longitude").and_then(parse_coordinate),
        scraped_at: text("scraped_at"),
        description: text("description"),
        energy_cert_classification: text("energy_cert_classification"),
        energy_consumption_rating: text("energy_consumption_rating"),
        energy_emissions_rating: text("energy_emissions_rating"),
        energy_consumption_kwh_m2_yr: field(row, "energy_consumption_value").and_then(first_number),
        energy_emissions_kg_co2_m2_yr: field(row, "energy_emissions_value").and_then(first_number),
        antiguedad: field(row, "antiguedad").and_then(|t| parse_ordinal(t, ANTIQUITY_SCALE)),
        conservacion: field(row, "conservacion").and_then(|t| parse_ordinal(t, CONDITION_SCALE)),
        banos: field(row, "banos").and_then(first_number),
        habitaciones: field(row, "habitaciones").and_then(first_number),
        superficie_construida: field(row, "superficie_construida").and_then(first_number),
        superficie_util: field(row, "superficie_util").and_then(first_number),
        planta_numerica: field(row, "planta").and_then(parse_floor),
        gastos_comunidad_eur: field(row, "gastos_comunidad").and_then(parse_community_fee),
        amueblado: parse_furnished(field(row, "amueblado")),
        orientacion_norte: orientation.norte,
        orientacion_sur: orientation.sur,
        orientacion_este: orientation.este,
        orientacion_oeste: orientation.oeste,
        ..Default::default()
    };

    for (name, flag) in AMENITY_COLUMNS {
        *flag(&mut out) = parse_amenity(field(row, *name));
    }

    Some(out)
}

/// Run the full cleaning pipeline. Median imputation runs last.
pub fn clean(raw: &RawTable) -> CleanReport {
    let (dropped, unknown): (Vec<&String>, Vec<&String>) = raw
        .columns()
        .iter()
        .filter(|c| !columns::is_consumed(c))
        .partition(|c| DROP_COLUMNS.contains(&c.as_str()));
    debug!("Dropping {} listed columns: {:?}", dropped.len(), dropped);
    if !unknown.is_empty() {
        debug!("Discarding {} columns outside the schema: {:?}", unknown.len(), unknown);
    }

    let mut rows: Vec<ProcessedPropertyRow> = raw.rows().filter_map(|r| clean_row(&r)).collect();
    let dropped_without_price = raw.len() - rows.len();
    if dropped_without_price > 0 {
        info!("Dropped {} rows without a price", dropped_without_price);
    }

    impute::impute_medians(&mut rows);

    CleanReport {
        rows,
        input_rows: raw.len(),
        dropped_without_price,
        discarded_columns: dropped.into_iter().chain(unknown).cloned().collect(),
    }
}

pub fn write_processed(rows: &[ProcessedPropertyRow], path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_processed(path: &Path) -> Result<Vec<ProcessedPropertyRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<ProcessedPropertyRow>, _>>()
        .with_context(|| format!("Malformed processed table {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[Option<&str>]]) -> RawTable {
        RawTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| v.map(str::to_string)).collect())
                .collect(),
        )
    }

    const COLUMNS: &[&str] = &[
        "url",
        "property_native_id",
        "price_eur",
        "latitude",
        "longitude",
        "page_source",
        "scrape_status",
        "energy_consumption_value",
        "Amueblado",
        "Ascensor",
        "Orientación",
        "Planta",
        "Superficie construida",
        "Gastos de comunidad",
        "Antigüedad",
        "Referencia",
        "Vistas al mar",
    ];

    fn raw() -> RawTable {
        table(
            COLUMNS,
            &[
                &[
                    Some("https://p/1"), Some("11"), Some("300000"), Some("40,41"), Some("-3,70"),
                    Some("1"), Some("Success"), Some("180 kWh/m² año"), Some("Vacío"), Some("True"),
                    Some("Norte, Sur"), Some("Bajo"), Some("80 m²"), Some("1.200,50 €"),
                    Some("Entre 20 y 30 años"), Some("REF-1"), Some("True"),
                ],
                &[
                    Some("https://p/2"), Some("12"), None, Some("40,42"), Some("-3,71"),
                    Some("1"), Some("HTTP Error: 404"), None, None, None,
                    None, None, None, None, None, None, None,
                ],
                &[
                    Some("https://p/3"), Some("13"), Some("500000"), Some("x"), Some("-3,72"),
                    Some("2"), Some("Success"), None, None, None,
                    Some("Oeste"), Some("Ático"), Some("120 m²"), None,
                    Some("Menos de 5 años"), None, None,
                ],
                &[
                    Some("https://p/4"), Some("14"), Some("400000"), Some("40,43"), Some("-3,73"),
                    Some("2"), Some("Success"), Some("90 kWh/m² año"), Some("Amueblado"), None,
                    None, Some("3ª"), Some("100 m²"), Some("80 €"), None, None, None,
                ],
            ],
        )
    }

    #[test]
    fn rows_without_price_are_dropped() {
        let report = clean(&raw());
        assert_eq!(report.input_rows, 4);
        assert_eq!(report.dropped_without_price, 1);
        assert!(report.rows.iter().all(|r| r.url.as_deref() != Some("https://p/2")));
    }

    #[test]
    fn fields_are_renamed_and_typed() {
        let report = clean(&raw());
        let first = &report.rows[0];

        assert_eq!(first.property_id.as_deref(), Some("11"));
        assert_eq!(first.price_eur, 300000);
        assert_eq!(first.latitude, Some(40.41));
        assert_eq!(first.energy_consumption_kwh_m2_yr, Some(180.0));
        assert_eq!(first.amueblado, Some(false));
        assert!(first.ascensor);
        assert!(first.orientacion_norte && first.orientacion_sur);
        assert!(!first.orientacion_este && !first.orientacion_oeste);
        assert_eq!(first.planta_numerica, Some(0.0));
        assert_eq!(first.superficie_construida, Some(80.0));
        assert_eq!(first.gastos_comunidad_eur, Some(1200.5));
        assert_eq!(first.antiguedad, Some(2.0));

        assert_eq!(report.rows[2].amueblado, Some(true));
        assert!(!report.rows[2].ascensor);
        assert!(report.rows[1].orientacion_oeste && !report.rows[1].orientacion_este);
    }

    #[test]
    fn unparseable_numbers_are_median_imputed() {
        let report = clean(&raw());
        let attic = &report.rows[1];

        // "Ático" has no floor number: median of 0 and 3
        assert_eq!(attic.planta_numerica, Some(1.5));
        // "x" is not a coordinate: median of 40.41 and 40.43
        assert!((attic.latitude.unwrap() - 40.42).abs() < 1e-9);
        assert_eq!(attic.amueblado, None);
    }

    #[test]
    fn dropped_and_unknown_columns_are_reported() {
        let report = clean(&raw());
        for c in ["page_source", "scrape_status", "Referencia", "Vistas al mar"] {
            assert!(report.discarded_columns.iter().any(|d| d == c), "{}", c);
        }
    }

    #[test]
    fn rental_price_column_becomes_price_eur() {
        let raw = table(
            &["url", "rent_eur_per_month", "Terraza"],
            &[&[Some("https://p/9"), Some("1450"), None]],
        );
        let report = clean(&raw);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].price_eur, 1450);
        assert!(!report.rows[0].terraza);
    }

    #[test]
    fn formatted_prices_are_kept() {
        let raw = table(&["url", "price_eur"], &[&[Some("https://p/8"), Some("1.234.567 €")]]);
        let report = clean(&raw);
        assert_eq!(report.dropped_without_price, 0);
        assert_eq!(report.rows[0].price_eur, 1234567);
    }

    #[test]
    fn processed_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("out.csv");
        let report = clean(&raw());

        write_processed(&report.rows, &path).unwrap();
        let back = read_processed(&path).unwrap();

        assert_eq!(back, report.rows);
    }
}
