//! Ratio column derived from an aligned table.
use crate::core::align::AlignedRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

impl AlignedRow {
    /// `a_close / b_close`. Prices are assumed strictly positive.
    pub fn ratio(&self) -> f64 {
        self.a_close / self.b_close
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    pub date: NaiveDate,
    pub a_close: f64,
    pub b_close: f64,
    pub ratio: f64,
}

/// Aligned closes of two instruments with their ratio, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedTable {
    pub rows: Vec<RatioRow>,
}

impl AlignedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Most recent row, used for the summary view.
    pub fn latest(&self) -> Option<&RatioRow> {
        self.rows.last()
    }

    /// Rows newest first, the order the table view shows them in.
    pub fn rows_descending(&self) -> impl Iterator<Item = &RatioRow> {
        self.rows.iter().rev()
    }

    pub fn ratios(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|row| row.ratio)
    }
}

/// Appends the unrounded ratio to every aligned row.
pub fn with_ratio(rows: Vec<AlignedRow>) -> AlignedTable {
    AlignedTable {
        rows: rows
            .into_iter()
            .map(|row| RatioRow {
                date: row.date,
                a_close: row.a_close,
                b_close: row.b_close,
                ratio: row.ratio(),
            })
            .collect(),
    }
}
