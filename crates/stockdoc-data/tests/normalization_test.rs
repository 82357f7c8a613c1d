//! Integration tests for store payload normalization

use chrono::NaiveDate;
use serde_json::json;
use stockdoc_data::normalize::raw_table_from_value;
use stockdoc_data::{
    CachedDataSource, DataError, FinancialField, Granularity, MemoryCache, MemoryStore,
    RecordNormalizer, SqliteCache, StaticPriceSource,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_unordered_object_payload_is_sorted() {
    let payload = json!({
        "2": {"endDate": "2023-06-30", "netIncome": "100"},
        "0": {"endDate": "2023-12-31", "netIncome": "300"},
        "1": {"endDate": "2023-09-30", "netIncome": "None"}
    });
    let table = raw_table_from_value("ACME", payload).unwrap();
    let series = RecordNormalizer::default()
        .normalize_periods("ACME", Granularity::Quarterly, &table)
        .unwrap();

    assert_eq!(
        series.end_dates(),
        vec![date(2023, 6, 30), date(2023, 9, 30), date(2023, 12, 31)]
    );
    let incomes: Vec<Option<f64>> = series
        .column(FinancialField::NetIncome)
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    assert_eq!(incomes, vec![Some(100.0), Some(0.0), Some(300.0)]);
}

#[test]
fn test_strict_normalizer_rejects_unknown_fields() {
    let payload = json!([{"endDate": "2023-12-31", "madeUpField": 1}]);
    let table = raw_table_from_value("ACME", payload).unwrap();

    let lenient = RecordNormalizer::default().normalize_periods("ACME", Granularity::Annual, &table);
    assert!(lenient.is_ok());

    let strict = RecordNormalizer::strict().normalize_periods("ACME", Granularity::Annual, &table);
    assert!(matches!(strict, Err(DataError::UnknownField { .. })));
}

#[test]
fn test_dividend_sentinel_means_no_dividends() {
    let payload = json!([{"index": "empty", "dividend": 0}]);
    let table = raw_table_from_value("ACME", payload).unwrap();
    let dividends = RecordNormalizer::default()
        .normalize_dividends("ACME", &table)
        .unwrap();
    assert!(dividends.is_empty());
}

#[tokio::test]
async fn test_source_with_sqlite_cache() {
    let store = MemoryStore::new().with_fundamentals(
        "ACME",
        json!([{"endDate": "2023-12-31", "totalRevenue": 10}]),
        json!([{"endDate": "2023-12-31", "totalRevenue": 3}]),
    );
    let source = CachedDataSource::new(store, StaticPriceSource::new())
        .with_cache(SqliteCache::in_memory().unwrap());

    let first = source.get_data("ACME").await.unwrap();
    let reads = source.store().reads();
    let second = source.get_data("ACME").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(source.store().reads(), reads);
}

#[tokio::test]
async fn test_unavailable_ticker_is_not_cached() {
    let source = CachedDataSource::new(MemoryStore::new(), StaticPriceSource::new())
        .with_cache(MemoryCache::new());

    assert!(source.get_data("NOPE").await.unwrap_err().is_unavailable());
    assert!(source.get_data("NOPE").await.unwrap_err().is_unavailable());
    assert_eq!(source.store().reads(), 2);
}
