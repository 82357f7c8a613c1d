//! Terminal and Markdown rendering of charts and panels.
//!
//! Tables have a period (or date) label column followed by one column per
//! series; undefined cells are left blank. Key statistics print `-` for
//! figures that cannot be computed.

use chrono::NaiveDate;
use std::fmt::{Debug, Display};
use stockdoc_metrics::{Chart, DIVIDEND_CHART, DividendView, KeyStatistics, NO_DIVIDENDS};

const RULE_WIDTH: usize = 80;
const LABEL_WIDTH: usize = 12;
const CELL_WIDTH: usize = 14;

/// Shorten large magnitudes: `1.23B`, `45.60M`, `7.10K`.
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if magnitude >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if magnitude >= 1e4 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{:.2}", value)
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(format_value).unwrap_or_default()
}

/// Render a chart as an aligned text table.
pub fn chart_to_ascii<K>(chart: &Chart<K>, key_label: &str) -> String
where
    K: Ord + Copy + Debug + Display,
{
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", chart.title));
    output.push_str(&"=".repeat(RULE_WIDTH));
    output.push('\n');

    if chart.table.columns().is_empty() {
        output.push_str("  No data available\n");
    } else {
        output.push_str(&format!("{:<LABEL_WIDTH$}", key_label));
        for column in chart.table.columns() {
            output.push_str(&format!(" {:>CELL_WIDTH$}", column));
        }
        output.push('\n');
        output.push_str(&"-".repeat(RULE_WIDTH));
        output.push('\n');

        for (key, cells) in chart.table.rows() {
            output.push_str(&format!("{:<LABEL_WIDTH$}", key.to_string()));
            for value in cells {
                output.push_str(&format!(" {:>CELL_WIDTH$}", cell(*value)));
            }
            output.push('\n');
        }
    }

    for error in &chart.unavailable {
        output.push_str(&format!("  ! {}\n", error));
    }
    output
}

/// Render a chart as a Markdown table.
pub fn chart_to_markdown<K>(chart: &Chart<K>, key_label: &str) -> String
where
    K: Ord + Copy + Debug + Display,
{
    let mut output = format!("## {}\n\n", chart.title);
    if chart.table.columns().is_empty() {
        output.push_str("_No data available_\n");
        return output;
    }

    output.push_str(&format!("| {} |", key_label));
    for column in chart.table.columns() {
        output.push_str(&format!(" {} |", column));
    }
    output.push('\n');
    output.push_str(&"|---".repeat(chart.table.columns().len() + 1));
    output.push_str("|\n");

    for (key, cells) in chart.table.rows() {
        output.push_str(&format!("| {} |", key));
        for value in cells {
            output.push_str(&format!(" {} |", cell(*value)));
        }
        output.push('\n');
    }
    output
}

/// Render the dividend panel: the per-period table, or the no-dividends banner.
pub fn dividends_to_ascii(view: &DividendView, key_label: &str) -> String {
    match view {
        DividendView::NoDividends => format!("\n{}\n", NO_DIVIDENDS),
        DividendView::Paid(totals) => {
            let mut output = format!("\n{}\n", DIVIDEND_CHART);
            output.push_str(&"=".repeat(RULE_WIDTH));
            output.push('\n');
            output.push_str(&format!("{:<LABEL_WIDTH$} {:>CELL_WIDTH$}\n", key_label, totals.name()));
            output.push_str(&"-".repeat(RULE_WIDTH));
            output.push('\n');
            for (key, amount) in totals.iter() {
                output.push_str(&format!(
                    "{:<LABEL_WIDTH$} {:>CELL_WIDTH$.4}\n",
                    key.to_string(),
                    amount
                ));
            }
            output
        }
    }
}

/// Render the key statistics block.
pub fn key_statistics_to_ascii(ticker: &str, stats: &KeyStatistics) -> String {
    let mut output = format!("\nKey Statistics: {}\n", ticker);
    output.push_str(&"=".repeat(RULE_WIDTH));
    output.push('\n');
    for (label, value) in stats.rows() {
        let shown = value.map_or_else(|| "-".to_string(), format_value);
        output.push_str(&format!("  {:<24} {:>16}\n", label, shown));
    }
    output
}

/// Render the latest ratio of each ticker in a valuation chart.
pub fn valuation_summary_to_ascii(chart: &Chart<NaiveDate>) -> String {
    let mut output = format!("\n{}: latest values\n", chart.title);
    output.push_str(&"-".repeat(RULE_WIDTH));
    output.push('\n');
    for (ticker, latest) in chart.table.latest_values() {
        match latest {
            Some((day, value)) => {
                output.push_str(&format!("  {:<10} {:>12.2}  ({})\n", ticker, value, day));
            }
            None => output.push_str(&format!("  {:<10} {:>12}\n", ticker, "-")),
        }
    }
    for error in &chart.unavailable {
        output.push_str(&format!("  ! {}\n", error));
    }
    output
}
