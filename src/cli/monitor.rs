use super::ui;
use crate::core::cache::FreshnessCache;
use crate::core::config::{AppConfig, InstrumentPair};
use crate::core::{AlignedTable, CoreError, MarketDataProvider, compute_aligned_ratio};
use anyhow::{Result, bail};
use chrono::{DateTime, Duration, Utc};
use comfy_table::Cell;
use std::collections::HashMap;
use tracing::{debug, info};

const CHART_POINTS: usize = 60;

/// Display settings shared by every rendered pair.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub precision: usize,
    pub chart_points: usize,
}

impl RenderOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        RenderOptions {
            precision: config.ratio_precision,
            chart_points: CHART_POINTS,
        }
    }
}

/// Percent change of the latest ratio against the row before it.
fn latest_change(table: &AlignedTable) -> Option<f64> {
    let [.., prev, last] = table.rows.as_slice() else {
        return None;
    };
    Some((last.ratio - prev.ratio) / prev.ratio * 100.0)
}

pub fn render_summary(pair: &InstrumentPair, table: &AlignedTable, opts: &RenderOptions) -> String {
    let Some(latest) = table.latest() else {
        return ui::style_text(
            "No overlapping data: the two contracts share no trading dates.",
            ui::StyleType::Subtle,
        );
    };

    let mut summary = ui::new_styled_table();
    summary.set_header(vec![
        ui::header_cell("Latest Date"),
        ui::header_cell("Ratio"),
        ui::header_cell("Change"),
        ui::header_cell(pair.label_a()),
        ui::header_cell(pair.label_b()),
    ]);
    summary.add_row(vec![
        Cell::new(latest.date.format("%Y-%m-%d")),
        ui::number_cell(format!("{:.*}", opts.precision, latest.ratio)),
        ui::change_cell(latest_change(table)),
        ui::number_cell(format!("¥{}", ui::format_thousands(latest.a_close))),
        ui::number_cell(format!("¥{}", ui::format_thousands(latest.b_close))),
    ]);
    summary.to_string()
}

pub fn render_chart(table: &AlignedTable, opts: &RenderOptions) -> String {
    let start = table.len().saturating_sub(opts.chart_points);
    let window = &table.rows[start..];
    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        return String::new();
    };

    let ratios: Vec<f64> = window.iter().map(|row| row.ratio).collect();
    let (min, max) = ratios
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(*r), hi.max(*r))
        });

    format!(
        "{} {} {}\n{}",
        first.date.format("%Y-%m-%d"),
        ui::sparkline(&ratios),
        last.date.format("%Y-%m-%d"),
        ui::style_text(
            &format!(
                "low {:.*}  high {:.*}",
                opts.precision, min, opts.precision, max
            ),
            ui::StyleType::Subtle
        )
    )
}

/// Full table, newest row first.
pub fn render_table(pair: &InstrumentPair, table: &AlignedTable, opts: &RenderOptions) -> String {
    let mut out = ui::new_styled_table();
    out.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell(pair.label_a()),
        ui::header_cell(pair.label_b()),
        ui::header_cell("Ratio"),
    ]);
    for row in table.rows_descending() {
        out.add_row(vec![
            Cell::new(row.date.format("%Y-%m-%d")),
            ui::number_cell(format!("{:.2}", row.a_close)),
            ui::number_cell(format!("{:.2}", row.b_close)),
            ui::number_cell(format!("{:.*}", opts.precision, row.ratio)),
        ]);
    }
    out.to_string()
}

pub fn render_pair(pair: &InstrumentPair, table: &AlignedTable, opts: &RenderOptions) -> String {
    let mut output = format!(
        "Pair: {}\n\n",
        ui::style_text(&pair.name, ui::StyleType::Title)
    );
    output.push_str(&render_summary(pair, table, opts));
    if !table.is_empty() {
        output.push_str("\n\n");
        output.push_str(&ui::style_text("Ratio history", ui::StyleType::Label));
        output.push('\n');
        output.push_str(&render_chart(table, opts));
        output.push_str("\n\n");
        output.push_str(&render_table(pair, table, opts));
    }
    output
}

pub fn render_failure(pair: &InstrumentPair, err: &CoreError) -> String {
    let cause = anyhow::Chain::new(err)
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ");
    format!(
        "Pair: {}\n\n{}",
        ui::style_text(&pair.name, ui::StyleType::Title),
        ui::style_text(
            &format!("Could not refresh market data, please try again later ({cause})"),
            ui::StyleType::Error
        )
    )
}

async fn refresh(
    provider: &dyn MarketDataProvider,
    pair: &InstrumentPair,
) -> Result<AlignedTable, CoreError> {
    let spinner = ui::new_spinner(format!(
        "Fetching {} and {}...",
        pair.symbol_a, pair.symbol_b
    ));
    let result = compute_aligned_ratio(provider, &pair.symbol_a, &pair.symbol_b).await;
    spinner.finish_and_clear();
    result
}

/// Computes and prints every configured pair once.
pub async fn run(
    pairs: &[InstrumentPair],
    provider: &dyn MarketDataProvider,
    opts: &RenderOptions,
) -> Result<()> {
    let mut failures = 0;
    let num_pairs = pairs.len();

    for (i, pair) in pairs.iter().enumerate() {
        match refresh(provider, pair).await {
            Ok(table) => println!("{}", render_pair(pair, &table, opts)),
            Err(e) => {
                failures += 1;
                println!("{}", render_failure(pair, &e));
            }
        }
        if i < num_pairs - 1 {
            ui::print_separator();
        }
    }

    if failures > 0 {
        bail!("{} of {} pairs could not be refreshed", failures, num_pairs);
    }
    Ok(())
}

/// Keeps every pair on screen, recomputing a pair once its table is older
/// than the refresh interval, until interrupted.
///
/// A failed refresh replaces the pair's output with the error and is retried
/// after one full interval.
pub async fn watch(
    pairs: &[InstrumentPair],
    provider: &dyn MarketDataProvider,
    opts: &RenderOptions,
    refresh_interval_secs: u64,
) -> Result<()> {
    let ttl = Duration::seconds(i64::try_from(refresh_interval_secs)?);
    let cache: FreshnessCache<String, AlignedTable> = FreshnessCache::new(ttl);
    let mut failed: HashMap<String, (DateTime<Utc>, String)> = HashMap::new();
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
    let term = console::Term::stdout();

    info!(refresh_interval_secs, "Watching {} pairs", pairs.len());
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, stopping watch");
                return Ok(());
            }
        }

        let now = Utc::now();
        let mut changed = false;
        for pair in pairs {
            let key = pair.key();
            if !cache.is_stale(&key, now).await {
                continue;
            }
            if let Some((failed_at, _)) = failed.get(&key) {
                if now - *failed_at < cache.ttl() {
                    continue;
                }
            }

            changed = true;
            match refresh(provider, pair).await {
                Ok(table) => {
                    failed.remove(&key);
                    cache.put(key, table, now).await;
                }
                Err(e) => {
                    debug!(pair = %pair.name, "Refresh failed, retrying after the interval");
                    failed.insert(key, (now, render_failure(pair, &e)));
                }
            }
        }
        if !changed {
            continue;
        }

        let mut screen = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let key = pair.key();
            if let Some((_, message)) = failed.get(&key) {
                screen.push(message.clone());
            } else if let Some(table) = cache.get(&key, now).await {
                screen.push(render_pair(pair, &table, opts));
            }
        }

        term.clear_screen()?;
        println!("{}", screen.join("\n\n"));
        println!(
            "\n{}",
            ui::style_text(
                &format!(
                    "Updated {} · refreshing every {}s · Ctrl-C to quit",
                    now.format("%Y-%m-%d %H:%M:%S UTC"),
                    refresh_interval_secs
                ),
                ui::StyleType::Subtle
            )
        );
    }
}
