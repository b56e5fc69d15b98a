use crate::models::CombinedRecord;
use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Columns that lead the raw CSV; `{price}` is the operation's price column
const PREFERRED_COLUMNS: &[&str] = &[
    "url",
    "property_native_id",
    "{price}",
    "barrio",
    "distrito",
    "latitude",
    "longitude",
    "page_source",
    "scrape_status",
    "scraped_timestamp",
    "description",
    "energy_certificate_main_classification",
    "energy_consumption_rating",
    "energy_consumption_value",
    "energy_emissions_rating",
    "energy_emissions_value",
];

/// A string table with a variable schema. `None` cells are written as empty.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { columns, index, rows }
    }

    /// Union every record's columns, order them, and fill the grid.
    pub fn from_records(records: &[CombinedRecord], price_column: &str) -> Self {
        let flattened: Vec<HashMap<String, Option<String>>> = records
            .iter()
            .map(|r| r.columns(price_column).into_iter().collect())
            .collect();

        let discovered: BTreeSet<&str> = flattened
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();

        let front: Vec<String> = PREFERRED_COLUMNS
            .iter()
            .map(|c| if *c == "{price}" { price_column } else { *c })
            .filter(|c| discovered.contains(c))
            .map(str::to_string)
            .collect();
        let mut columns = front.clone();
        columns.extend(
            discovered
                .iter()
                .filter(|c| !front.iter().any(|f| f.as_str() == **c))
                .map(|c| c.to_string()),
        );

        let rows = flattened
            .into_iter()
            .map(|mut row| {
                columns
                    .iter()
                    .map(|c| row.remove(c).flatten())
                    .collect()
            })
            .collect();

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(move |values| RawRow { table: self, values })
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let columns: Vec<String> = reader
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("Malformed row in {}", path.display()))?;
            let row = (0..columns.len())
                .map(|i| record.get(i).filter(|v| !v.is_empty()).map(str::to_string))
                .collect();
            rows.push(row);
        }

        Ok(Self::new(columns, rows))
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|v| v.as_deref().unwrap_or("")))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Borrowed view of one table row, addressed by column name
#[derive(Clone, Copy)]
pub struct RawRow<'a> {
    table: &'a RawTable,
    values: &'a [Option<String>],
}

impl<'a> RawRow<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let i = *self.table.index.get(column)?;
        self.values.get(i)?.as_deref()
    }
}
