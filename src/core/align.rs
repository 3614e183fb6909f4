//! Date-based inner join of two reconciled series.
use crate::core::bar::BarSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Closing prices of both instruments on a date they both traded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub a_close: f64,
    pub b_close: f64,
}

/// Merge-joins `a` and `b` on date, oldest first.
///
/// Dates present in only one series are dropped. Both inputs are already
/// date-ascending, so a single linear pass is enough.
pub fn align(a: &BarSeries, b: &BarSeries) -> Vec<AlignedRow> {
    let (a_bars, b_bars) = (a.bars(), b.bars());
    let mut rows = Vec::with_capacity(a_bars.len().min(b_bars.len()));
    let (mut i, mut j) = (0, 0);

    while i < a_bars.len() && j < b_bars.len() {
        match a_bars[i].date.cmp(&b_bars[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                rows.push(AlignedRow {
                    date: a_bars[i].date,
                    a_close: a_bars[i].close,
                    b_close: b_bars[j].close,
                });
                i += 1;
                j += 1;
            }
        }
    }

    rows
}
