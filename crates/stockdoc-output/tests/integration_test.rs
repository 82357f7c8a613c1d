//! Integration tests for rendering and exporting derived views.

use chrono::NaiveDate;
use stockdoc_data::{
    DividendRecord, DividendSeries, FinancialField, Granularity, PeriodRecord, PeriodSeries,
    ValuationSnapshot,
};
use stockdoc_metrics::{DividendView, KeyStatistics, MetricDeriver, PeriodRange};
use stockdoc_output::{
    ExportFormat, Exporter, ReportBuilder, TableExport, chart_to_ascii, dividends_to_ascii,
    key_statistics_to_ascii,
};

fn quarter_ends() -> Vec<NaiveDate> {
    [(2023, 3, 31), (2023, 6, 30), (2023, 9, 30), (2023, 12, 31)]
        .iter()
        .map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
        .collect()
}

fn quarterly() -> PeriodSeries {
    use FinancialField as F;
    let records = quarter_ends()
        .into_iter()
        .enumerate()
        .map(|(i, end)| {
            let revenue = 90.0e9 + i as f64 * 5.0e9;
            let record = PeriodRecord::new(end)
                .with_value(F::TotalRevenue, revenue)
                .with_value(F::NetIncome, revenue * 0.25)
                .with_value(F::OperatingCashflow, revenue * 0.3)
                .with_value(F::CapitalExpenditures, 2.5e9)
                .with_value(F::OperatingIncome, revenue * 0.3)
                .with_value(F::DepreciationDepletionAndAmortization, 3.0e9)
                .with_value(F::CommonStockSharesOutstanding, 15.5e9);
            // Gross profit is only reported from the second quarter on
            if i == 0 {
                record
            } else {
                record.with_value(F::GrossProfit, revenue * 0.44)
            }
        })
        .collect();
    PeriodSeries::from_records("AAPL", Granularity::Quarterly, records)
}

#[test]
fn test_fundamentals_view_workflow() {
    let series = quarterly();
    let charts = MetricDeriver::new(&series)
        .with_range(PeriodRange::all())
        .unwrap()
        .fundamentals_charts()
        .unwrap();

    let margins = charts
        .iter()
        .find(|c| c.title == "Gross and Net Margin %")
        .unwrap();
    let ascii = chart_to_ascii(margins, "Quarter");
    let q1 = ascii.lines().find(|l| l.starts_with("Q1 2023")).unwrap();
    assert!(q1.contains("25.00"));
    assert!(!q1.contains("44.00"));

    let interest = charts
        .iter()
        .find(|c| c.title == "EBITDA, EBIT, FCF vs Interest Expense")
        .unwrap();
    assert_eq!(interest.unavailable.len(), 1);
    assert!(chart_to_ascii(interest, "Quarter").contains("Interest"));

    let exports: Vec<TableExport> = charts.iter().map(TableExport::from_chart).collect();
    let csv = exports.export_to_string(ExportFormat::Csv).unwrap();
    assert!(csv.contains("# Revenue and Net Income\nperiod,Revenue,Income\n"));
    assert!(csv.contains("Q4 2023,"));
}

#[test]
fn test_dividends_and_statistics_panels() {
    let series = quarterly();
    let dividends = DividendSeries::from_records(
        "AAPL",
        quarter_ends()
            .into_iter()
            .map(|date| DividendRecord { date, amount: 0.24 })
            .collect(),
    );

    let view = DividendView::aggregate(&dividends, Granularity::Annual);
    assert!(dividends_to_ascii(&view, "Year").contains("0.9600"));

    let stats = KeyStatistics::compute(
        &series,
        &dividends,
        200.0,
        Some(190.0),
        &ValuationSnapshot::default(),
    );
    let ascii = key_statistics_to_ascii("AAPL", &stats);
    assert!(ascii.contains("Market Cap"));
    assert!(ascii.contains("3.10T"));

    let report = ReportBuilder::new()
        .view("fundamentals")
        .ticker("AAPL")
        .contents_from(&stats)
        .unwrap()
        .build()
        .unwrap();
    let json = report.export_to_string(ExportFormat::Json).unwrap();
    assert!(json.contains("\"trailing_pe\""));
}
