//! The three dashboard views, each built from a [`CachedDataSource`].
//!
//! [`CachedDataSource`]: stockdoc_data::CachedDataSource

pub mod compare;
pub mod fundamentals;
pub mod valuation;

pub use compare::ComparisonView;
pub use fundamentals::FundamentalsView;
pub use valuation::ValuationView;

use stockdoc_data::Granularity;

/// Header of the period column.
pub const fn key_label(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Annual => "Year",
        Granularity::Quarterly => "Quarter",
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use serde_json::{Value, json};
    use stockdoc_data::{CachedDataSource, MemoryStore, PriceSeries, StaticPriceSource};

    pub(crate) const QUARTER_ENDS: [&str; 8] = [
        "2022-03-31",
        "2022-06-30",
        "2022-09-30",
        "2022-12-31",
        "2023-03-31",
        "2023-06-30",
        "2023-09-30",
        "2023-12-31",
    ];

    fn quarter(end: &str, i: usize) -> Value {
        let revenue = 100.0 + 10.0 * i as f64;
        json!({
            "endDate": end,
            "totalRevenue": revenue.to_string(),
            "netIncome": (revenue * 0.2).to_string(),
            "grossProfit": (revenue * 0.4).to_string(),
            "operatingCashflow": (revenue * 0.3).to_string(),
            "capitalExpenditures": "5",
            "operatingIncome": (revenue * 0.25).to_string(),
            "depreciationDepletionAndAmortization": "4",
            "incomeBeforeTax": (revenue * 0.22).to_string(),
            "commonStockSharesOutstanding": if i < 2 { "200" } else { "100" },
            "totalAssets": "1000",
            "totalShareholderEquity": "400",
            "cashAndShortTermInvestments": "50",
            "longTermDebtNoncurrent": "0",
            "longTermDebt": "80",
            "dividendPayout": "6"
        })
    }

    /// Eight quarters with a 2-for-1 split after Q2 2022, and two annual periods.
    pub(crate) fn quarters(ends: &[&str]) -> Value {
        Value::Array(ends.iter().enumerate().map(|(i, end)| quarter(end, i)).collect())
    }

    fn annual() -> Value {
        json!([
            {"endDate": "2022-12-31", "totalRevenue": "460", "netIncome": "92", "grossProfit": "184"},
            {"endDate": "2023-12-31", "totalRevenue": "620", "netIncome": "124", "grossProfit": "248"}
        ])
    }

    pub(crate) fn daily_prices(from: NaiveDate, to: NaiveDate, price: f64) -> PriceSeries {
        PriceSeries::from_points(from.iter_days().take_while(|d| *d <= to).map(|d| (d, price)))
    }

    /// ACME: full history, pays dividends. SHRT: four quarters, no dividends.
    pub(crate) fn source() -> CachedDataSource<MemoryStore, StaticPriceSource> {
        let store = MemoryStore::new()
            .with_tickers(["ACME", "SHRT"])
            .with_fundamentals("ACME", annual(), quarters(&QUARTER_ENDS))
            .with_dividends(
                "ACME",
                json!([
                    {"index": "2023-02-10", "dividend": "0.5"},
                    {"index": "2023-05-12", "dividend": "0.5"},
                    {"index": "2023-08-11", "dividend": "0.5"},
                    {"index": "2023-11-10", "dividend": "0.5"}
                ]),
            )
            .with_fundamentals("SHRT", annual(), quarters(&QUARTER_ENDS[4..]));

        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let prices = StaticPriceSource::new()
            .with_history("ACME", daily_prices(start, end, 20.0))
            .with_history("SHRT", daily_prices(start, end, 10.0))
            .with_live_price("ACME", 21.0);

        CachedDataSource::new(store, prices)
    }
}
