//! Score Table Builder
//! Decodes the centile-score workbook into a lookup table keyed by ZIP code.

use crate::config::SheetLayout;
use calamine::{open_workbook_auto, Data, Reader};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataFormatError {
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("Workbook has no sheets")]
    MissingSheet,
}

/// Demographic detail and score for a single ZIP code.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    /// Precomputed percentile ranking, 0-100.
    pub centile_score: f64,
    pub city: String,
    pub state: String,
    pub population: u64,
    /// Percent with a bachelor's degree, 0-100.
    pub bachelors_pct: f64,
    /// Median income in thousands of dollars.
    pub median_income: f64,
}

/// Mapping from ZIP code to its score record. Built once per run.
pub type ScoreTable = HashMap<u32, ScoreRecord>;

/// Build the score table from the first sheet of the workbook at `path`.
///
/// On failure no partial table is exposed; the caller surfaces the error and
/// skips the map join.
pub fn load_score_table(path: &Path, layout: &SheetLayout) -> Result<ScoreTable, DataFormatError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DataFormatError::MissingSheet)??;

    let table = build_table(range.rows(), layout);
    tracing::info!(path = ?path, records = table.len(), "score table loaded");
    Ok(table)
}

/// Build the table from raw sheet rows.
///
/// Rows up to and including the header are layout, and the first data row is
/// a units/label row in the source format; both are skipped. A row is kept
/// only when its key cell is present and numeric.
pub fn build_table<'a, R>(rows: R, layout: &SheetLayout) -> ScoreTable
where
    R: IntoIterator<Item = &'a [Data]>,
{
    let mut table = ScoreTable::new();
    let mut skipped = 0usize;

    for row in rows.into_iter().skip(layout.header_row + 2) {
        let Some(zip) = numeric_cell(row.get(layout.zip_col)).and_then(as_zip) else {
            skipped += 1;
            continue;
        };

        let record = ScoreRecord {
            centile_score: numeric_cell(row.get(layout.score_col)).unwrap_or(0.0),
            city: text_cell(row.get(layout.city_col)).unwrap_or_else(|| "Unknown".to_string()),
            state: text_cell(row.get(layout.state_col)).unwrap_or_else(|| "Unknown".to_string()),
            population: numeric_cell(row.get(layout.population_col)).unwrap_or(0.0).max(0.0)
                as u64,
            bachelors_pct: numeric_cell(row.get(layout.bachelors_col)).unwrap_or(0.0) * 100.0,
            median_income: numeric_cell(row.get(layout.income_col)).unwrap_or(0.0),
        };

        table.insert(zip, record);
    }

    if skipped > 0 {
        tracing::debug!(skipped, "rows without a numeric ZIP key were skipped");
    }

    table
}

/// Extract a numeric value from a cell, accepting numbers stored as text.
fn numeric_cell(cell: Option<&Data>) -> Option<f64> {
    match cell? {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Extract a non-empty text value from a cell.
fn text_cell(cell: Option<&Data>) -> Option<String> {
    match cell? {
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        _ => None,
    }
}

fn as_zip(value: f64) -> Option<u32> {
    (value >= 0.0 && value <= u32::MAX as f64).then(|| value.round() as u32)
}
