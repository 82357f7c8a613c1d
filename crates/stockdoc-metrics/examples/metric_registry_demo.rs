//! Demonstration of the stockdoc metric registry
//!
//! This example shows how to:
//! - List all available metrics
//! - Query metrics by category
//! - Derive the fundamentals charts of a small synthetic company
//!
//! Run with: cargo run --example metric_registry_demo -p stockdoc-metrics

use chrono::NaiveDate;
use stockdoc_data::{FinancialField, Granularity, PeriodRecord, PeriodSeries};
use stockdoc_metrics::{
    MetricCategory, MetricDeriver, MetricInfo, available_metrics, get_metric_info,
    metrics_by_category,
    registry::{count_by_category, list_metric_names},
};

fn main() -> stockdoc_metrics::Result<()> {
    println!("stockdoc Metric Registry Demo");
    println!("=============================\n");

    let all_metrics = available_metrics();
    println!("Total metrics available: {}\n", all_metrics.len());

    println!("Metrics by Category:");
    println!("--------------------");
    let counts = count_by_category();
    for category in MetricCategory::ALL {
        let count = counts.get(&category).copied().unwrap_or(0);
        println!("  {:15} {:2} metrics", category.to_string(), count);
    }
    println!();

    for category in MetricCategory::ALL {
        print_category_metrics(category);
    }

    println!("Metric Lookup Example:");
    println!("----------------------");
    if let Some(info) = get_metric_info("free_cash_flow") {
        print_metric_details(&info);
    }
    println!();

    println!("All Metric Codes:");
    println!("-----------------");
    for (i, name) in list_metric_names().iter().enumerate() {
        if i > 0 && i % 4 == 0 {
            println!();
        }
        print!("  {:20}", name);
    }
    println!("\n");

    println!("Derived Charts (synthetic company):");
    println!("-----------------------------------");
    let series = synthetic_company();
    for chart in MetricDeriver::new(&series).fundamentals_charts()? {
        println!("{} ({} periods)", chart.title, chart.table.len());
        for error in &chart.unavailable {
            println!("  skipped: {}", error);
        }
    }

    println!("\nDemo complete!");
    Ok(())
}

fn synthetic_company() -> PeriodSeries {
    use FinancialField as F;
    let records = (2019..=2023)
        .zip([100.0, 120.0, 130.0, 150.0, 165.0])
        .filter_map(|(year, revenue)| {
            let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
            Some(
                PeriodRecord::new(end)
                    .with_value(F::TotalRevenue, revenue)
                    .with_value(F::NetIncome, revenue * 0.12)
                    .with_value(F::GrossProfit, revenue * 0.4)
                    .with_value(F::OperatingCashflow, revenue * 0.2)
                    .with_value(F::CapitalExpenditures, revenue * 0.05)
                    .with_value(F::CommonStockSharesOutstanding, 1_000.0),
            )
        })
        .collect();
    PeriodSeries::from_records("DEMO", Granularity::Annual, records)
}

fn print_category_metrics(category: MetricCategory) {
    let title = format!("{} Metrics", category);
    println!("{}", title);
    println!("{}", "-".repeat(title.len()));

    for metric in metrics_by_category(category) {
        println!("  {} - {}", metric.name, metric.description);
        println!("    Required fields: {:?}", metric.required_fields);
    }
    println!();
}

fn print_metric_details(info: &MetricInfo) {
    println!("  Name:        {}", info.name);
    println!("  Category:    {}", info.category);
    println!("  Description: {}", info.description);
    println!("  Required:    {:?}", info.required_fields);
}
