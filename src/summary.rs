use crate::processing::impute::median;
use crate::processing::ProcessedPropertyRow;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct BarrioSummary {
    pub barrio: String,
    pub count: usize,
    pub mean_price: f64,
    pub mean_surface: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSpread {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// `q3 + 1.5 * iqr`
    pub outlier_threshold: f64,
    pub outliers: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub properties: usize,
    pub barrios: usize,
    pub max_rooms: Option<f64>,
    pub max_surface: Option<f64>,
    pub top_energy_rating: Option<String>,
    pub price: Option<PriceSpread>,
    /// Sorted by mean price, cheapest first
    pub by_barrio: Vec<BarrioSummary>,
}

/// Linear-interpolated quantile over sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn price_spread(rows: &[ProcessedPropertyRow]) -> Option<PriceSpread> {
    let mut prices: Vec<f64> = rows.iter().map(|r| r.price_eur as f64).collect();
    if prices.is_empty() {
        return None;
    }
    prices.sort_by(f64::total_cmp);
    let q1 = quantile(&prices, 0.25);
    let q3 = quantile(&prices, 0.75);
    let outlier_threshold = q3 + 1.5 * (q3 - q1);
    Some(PriceSpread {
        q1,
        median: median(&prices)?,
        q3,
        outlier_threshold,
        outliers: prices.iter().filter(|p| **p > outlier_threshold).count(),
    })
}

fn max_of(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().max_by(f64::total_cmp)
}

/// Most frequent rating; ties go to the alphabetically first
fn mode(values: impl Iterator<Item = String>) -> Option<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(String, usize)>, (v, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((v, n)),
        })
        .map(|(v, _)| v)
}

pub fn summarize(rows: &[ProcessedPropertyRow]) -> DatasetSummary {
    let mut groups: HashMap<&str, Vec<&ProcessedPropertyRow>> = HashMap::new();
    for row in rows {
        if let Some(barrio) = row.barrio.as_deref() {
            groups.entry(barrio).or_default().push(row);
        }
    }

    let mut by_barrio: Vec<BarrioSummary> = groups
        .into_iter()
        .map(|(barrio, members)| {
            let count = members.len();
            let mean_price = members.iter().map(|r| r.price_eur as f64).sum::<f64>() / count as f64;
            let surfaces: Vec<f64> = members.iter().filter_map(|r| r.superficie_construida).collect();
            let mean_surface =
                (!surfaces.is_empty()).then(|| surfaces.iter().sum::<f64>() / surfaces.len() as f64);
            BarrioSummary {
                barrio: barrio.to_string(),
                count,
                mean_price,
                mean_surface,
            }
        })
        .collect();
    by_barrio.sort_by(|a, b| a.mean_price.total_cmp(&b.mean_price).then_with(|| a.barrio.cmp(&b.barrio)));

    DatasetSummary {
        properties: rows.len(),
        barrios: by_barrio.len(),
        max_rooms: max_of(rows.iter().map(|r| r.habitaciones)),
        max_surface: max_of(rows.iter().map(|r| r.superficie_construida)),
        top_energy_rating: mode(rows.iter().filter_map(|r| r.energy_consumption_rating.clone())),
        price: price_spread(rows),
        by_barrio,
    }
}

/// Render the summary as a plain-text report
pub fn render(summary: &DatasetSummary, top: usize) -> String {
    let fmt_opt = |v: Option<f64>, digits: usize| {
        v.map(|v| format!("{:.*}", digits, v)).unwrap_or_else(|| "-".into())
    };

    let mut out = String::new();
    out.push_str(&format!("Properties:          {}\n", summary.properties));
    out.push_str(&format!("Barrios:             {}\n", summary.barrios));
    out.push_str(&format!("Max rooms:           {}\n", fmt_opt(summary.max_rooms, 0)));
    out.push_str(&format!("Max surface (m²):    {}\n", fmt_opt(summary.max_surface, 1)));
    out.push_str(&format!(
        "Top energy rating:   {}\n",
        summary.top_energy_rating.as_deref().unwrap_or("-")
    ));
    if let Some(p) = &summary.price {
        out.push_str(&format!(
            "Price q1/median/q3:  {:.0} / {:.0} / {:.0} €\n",
            p.q1, p.median, p.q3
        ));
        out.push_str(&format!(
            "Outliers:            {} above {:.0} €\n",
            p.outliers, p.outlier_threshold
        ));
    }

    out.push_str(&format!(
        "\n{:<28} | {:>5} | {:>14} | {:>10}\n",
        "Barrio", "Count", "Mean price (€)", "Mean m²"
    ));
    out.push_str(&format!("{}\n", "-".repeat(66)));
    for b in summary.by_barrio.iter().take(top) {
        out.push_str(&format!(
            "{:<28} | {:>5} | {:>14.0} | {:>10}\n",
            b.barrio,
            b.count,
            b.mean_price,
            fmt_opt(b.mean_surface, 1)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(barrio: &str, price: i64, surface: Option<f64>, rating: Option<&str>) -> ProcessedPropertyRow {
        ProcessedPropertyRow {
            barrio: Some(barrio.to_string()),
            price_eur: price,
            superficie_construida: surface,
            energy_consumption_rating: rating.map(str::to_string),
            habitaciones: Some(2.0),
            ..Default::default()
        }
    }

    #[test]
    fn barrios_are_grouped_and_sorted_by_mean_price() {
        let rows = vec![
            row("Sol", 400_000, Some(60.0), Some("E")),
            row("Opañel", 150_000, Some(70.0), Some("E")),
            row("Sol", 600_000, None, Some("D")),
        ];
        let summary = summarize(&rows);

        assert_eq!(summary.properties, 3);
        assert_eq!(summary.barrios, 2);
        assert_eq!(summary.by_barrio[0].barrio, "Opañel");
        assert_eq!(summary.by_barrio[1].count, 2);
        assert_eq!(summary.by_barrio[1].mean_price, 500_000.0);
        assert_eq!(summary.by_barrio[1].mean_surface, Some(60.0));
        assert_eq!(summary.top_energy_rating.as_deref(), Some("E"));
        assert_eq!(summary.max_surface, Some(70.0));
    }

    #[test]
    fn price_spread_flags_outliers() {
        let mut rows: Vec<_> = (1..=8).map(|i| row("A", i * 100_000, None, None)).collect();
        rows.push(row("A", 5_000_000, None, None));
        let spread = summarize(&rows).price.unwrap();

        assert_eq!(spread.median, 500_000.0);
        assert_eq!(spread.q1, 300_000.0);
        assert_eq!(spread.q3, 700_000.0);
        assert_eq!(spread.outliers, 1);
    }

    #[test]
    fn empty_input_renders() {
        let summary = summarize(&[]);
        assert_eq!(summary.price, None);
        assert!(render(&summary, 10).contains("Properties:          0"));
    }
}
