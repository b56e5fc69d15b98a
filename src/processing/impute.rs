use crate::processing::row::{ProcessedPropertyRow, NUMERIC_COLUMNS};
use tracing::info;

/// Median of the non-null values; the mean of the middle pair for even counts
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Fill nulls in every numeric column with that column's median.
/// Columns with no values at all are left null. Returns the filled columns.
pub fn impute_medians(rows: &mut [ProcessedPropertyRow]) -> Vec<(&'static str, f64)> {
    let mut filled = Vec::new();

    for (name, field) in NUMERIC_COLUMNS {
        let present: Vec<f64> = rows.iter_mut().filter_map(|r| *field(r)).collect();
        if present.len() == rows.len() {
            continue;
        }
        let Some(median) = median(&present) else { continue };

        for row in rows.iter_mut() {
            field(row).get_or_insert(median);
        }
        info!(
            "Imputed {} nulls in '{}' with median {:.2}",
            rows.len() - present.len(),
            name,
            median
        );
        filled.push((*name, median));
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(floor: Option<f64>, surface: Option<f64>) -> ProcessedPropertyRow {
        ProcessedPropertyRow {
            price_eur: 1,
            planta_numerica: floor,
            superficie_construida: surface,
            ..Default::default()
        }
    }

    #[test]
    fn median_of_even_and_odd_counts() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn nulls_take_the_column_median() {
        let mut rows = vec![row(Some(0.0), Some(50.0)), row(None, Some(70.0)), row(Some(4.0), None)];
        let filled = impute_medians(&mut rows);

        assert_eq!(rows[1].planta_numerica, Some(2.0));
        assert_eq!(rows[2].superficie_construida, Some(60.0));
        assert_eq!(rows[0].planta_numerica, Some(0.0));
        assert!(filled.contains(&("planta_numerica", 2.0)));
        // no values at all: nothing to impute from
        assert!(rows.iter().all(|r| r.gastos_comunidad_eur.is_none()));
    }
}
