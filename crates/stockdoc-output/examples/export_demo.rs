//! Demonstration of the export functionality in stockdoc-output.

use chrono::NaiveDate;
use stockdoc_metrics::{Chart, DerivedSeries, PeriodKey};
use stockdoc_output::{ExportFormat, Exporter, TableExport, chart_to_ascii, chart_to_markdown};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== stockdoc Export Demo ===\n");

    // 1. A fundamentals comparison chart
    let aapl = DerivedSeries::from_points(
        "AAPL",
        [(PeriodKey::Year(2022), 43.3), (PeriodKey::Year(2023), 44.1)],
    );
    let msft = DerivedSeries::from_points(
        "MSFT",
        [
            (PeriodKey::Year(2021), 68.9),
            (PeriodKey::Year(2022), 68.4),
            (PeriodKey::Year(2023), 68.9),
        ],
    );
    let margins = Chart::new("Gross Margins %", vec![aapl, msft], Vec::new())?;

    println!("1. Terminal table");
    println!("{}", chart_to_ascii(&margins, "Year"));

    println!("2. Markdown\n");
    println!("{}", chart_to_markdown(&margins, "Year"));

    let export = TableExport::from_chart(&margins);
    println!("3. CSV\n");
    println!("{}", export.export_to_string(ExportFormat::Csv)?);
    println!("4. Pretty JSON\n");
    println!("{}", export.export_to_string(ExportFormat::PrettyJson)?);

    // 2. A daily valuation chart exported to disk
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).ok_or("invalid date")?;
    let pe = DerivedSeries::from_points(
        "AAPL",
        start
            .iter_days()
            .take(5)
            .enumerate()
            .map(|(i, day)| (day, 29.0 + i as f64 * 0.1)),
    );
    let valuation = Chart::new("Price to Earnings (P/E)", vec![pe], Vec::new())?;
    let path = std::env::temp_dir().join(format!("stockdoc_pe.{}", ExportFormat::Csv.extension()));
    TableExport::from_chart(&valuation).export_to_file(&path, ExportFormat::Csv)?;
    println!("5. Valuation table written to {}", path.display());

    Ok(())
}
