//! Reconciliation, alignment and ratio logic plus the config, cache and
//! logging it runs with.

pub mod align;
pub mod bar;
pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod market;
pub mod pipeline;
pub mod ratio;
pub mod reconcile;

// Re-export main types for cleaner imports
pub use align::{AlignedRow, align};
pub use bar::{BarSeries, DailyBar, Quote};
pub use error::CoreError;
pub use market::MarketDataProvider;
pub use pipeline::compute_aligned_ratio;
pub use ratio::{AlignedTable, RatioRow, with_ratio};
pub use reconcile::{Outcome, reconcile, reconcile_with_outcome};
