//! Single-ticker fundamentals view.

use super::key_label;
use crate::error::Result;
use stockdoc_data::{CachedDataSource, FundamentalsStore, Granularity, PriceSource};
use stockdoc_metrics::{
    Chart, DIVIDEND_CHART, DividendView, KeyStatistics, MetricDeriver, PeriodKey, PeriodRange,
};
use stockdoc_output::{
    Report, ReportBuilder, TableExport, chart_to_ascii, dividends_to_ascii,
    key_statistics_to_ascii,
};
use tracing::{info, warn};

/// Everything the single-ticker view shows.
#[derive(Debug, Clone)]
pub struct FundamentalsView {
    /// Ticker in store form
    pub ticker: String,
    /// Granularity of the charts
    pub granularity: Granularity,
    /// Key statistics; `None` when no live price could be fetched
    pub statistics: Option<KeyStatistics>,
    /// Fundamentals charts in display order
    pub charts: Vec<Chart<PeriodKey>>,
    /// Dividend panel
    pub dividends: DividendView,
}

impl FundamentalsView {
    /// Fetch and derive the view for `ticker` over `range`.
    ///
    /// A ticker missing from the store, or a range containing no period, fails
    /// the whole view. Metrics whose inputs are missing only drop their column.
    pub async fn load<S, P>(
        source: &CachedDataSource<S, P>,
        ticker: &str,
        granularity: Granularity,
        range: &PeriodRange,
    ) -> Result<Self>
    where
        S: FundamentalsStore + Sync,
        P: PriceSource + Sync,
    {
        let data = source.get_data(ticker).await?;
        let dividends = source.get_dividends(ticker).await?;

        let deriver = MetricDeriver::new(data.series(granularity)).with_range(*range)?;
        deriver.window()?;
        let charts = deriver.fundamentals_charts()?;

        let statistics = match Self::prices(source, ticker).await {
            Ok((price, previous_close)) => Some(KeyStatistics::compute(
                &data.quarterly,
                &dividends,
                price,
                previous_close,
                &data.snapshot,
            )),
            Err(e) => {
                warn!(ticker, error = %e, "no price, key statistics skipped");
                None
            }
        };

        info!(ticker, ?granularity, charts = charts.len(), "fundamentals view ready");
        Ok(Self {
            ticker: data.ticker,
            granularity,
            statistics,
            charts,
            dividends: DividendView::aggregate(&dividends, granularity),
        })
    }

    async fn prices<S, P>(
        source: &CachedDataSource<S, P>,
        ticker: &str,
    ) -> Result<(f64, Option<f64>)>
    where
        S: FundamentalsStore + Sync,
        P: PriceSource + Sync,
    {
        let price = source.live_price(ticker).await?;
        let history = source.get_prices(ticker).await?;
        Ok((price, history.previous_close()))
    }

    /// Terminal rendering of the whole view.
    pub fn render(&self) -> String {
        let label = key_label(self.granularity);
        let mut output = String::new();
        if let Some(stats) = &self.statistics {
            output.push_str(&key_statistics_to_ascii(&self.ticker, stats));
        }
        for chart in &self.charts {
            output.push_str(&chart_to_ascii(chart, label));
        }
        output.push_str(&dividends_to_ascii(&self.dividends, label));
        output
    }

    /// Charts flattened for CSV/JSON export, dividends last when paid.
    pub fn exports(&self) -> Result<Vec<TableExport>> {
        let mut tables: Vec<TableExport> = self.charts.iter().map(TableExport::from_chart).collect();
        if let DividendView::Paid(totals) = &self.dividends {
            let chart = Chart::new(DIVIDEND_CHART, vec![totals.clone()], Vec::new())?;
            tables.push(TableExport::from_chart(&chart));
        }
        Ok(tables)
    }

    /// JSON report of the view.
    pub fn report(&self) -> Result<Report> {
        let contents = serde_json::json!({
            "granularity": self.granularity.to_db_str(),
            "statistics": self.statistics,
            "tables": self.exports()?,
            "pays_dividends": self.dividends.pays_dividends(),
        });
        Ok(ReportBuilder::new()
            .view("fundamentals")
            .ticker(self.ticker.as_str())
            .contents(contents)
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures;
    use stockdoc_data::DataError;
    use stockdoc_metrics::MetricError;

    #[tokio::test]
    async fn test_annual_view() {
        let source = fixtures::source();
        let view = FundamentalsView::load(&source, "ACME", Granularity::Annual, &PeriodRange::all())
            .await
            .unwrap();

        let revenue = &view.charts[0];
        assert_eq!(revenue.title, "Revenue and Net Income");
        assert_eq!(revenue.table.get(&PeriodKey::Year(2023), "Revenue"), Some(620.0));
        assert!(view.dividends.pays_dividends());

        let stats = view.statistics.as_ref().unwrap();
        assert_eq!(stats.price, 21.0);
        assert_eq!(stats.market_cap, Some(2100.0));
        assert_eq!(stats.price_delta, Some(1.0));
    }

    #[tokio::test]
    async fn test_quarterly_view_is_range_filtered() {
        let source = fixtures::source();
        let range = PeriodRange::between(Some("Q3 2023".parse().unwrap()), None);
        let view = FundamentalsView::load(&source, "ACME", Granularity::Quarterly, &range)
            .await
            .unwrap();

        let labels: Vec<String> = view.charts[0].table.keys().map(|k| k.label()).collect();
        assert_eq!(labels, vec!["Q3 2023", "Q4 2023"]);

        let debt = view.charts.iter().find(|c| c.title == "Cash vs Long Debt").unwrap();
        assert_eq!(debt.table.column("Debt").unwrap().values(), vec![80.0, 80.0]);

        // Dividends are not windowed
        let DividendView::Paid(totals) = &view.dividends else {
            panic!("expected dividends");
        };
        assert_eq!(totals.len(), 4);
    }

    #[tokio::test]
    async fn test_no_dividends_banner() {
        let source = fixtures::source();
        let view = FundamentalsView::load(&source, "SHRT", Granularity::Quarterly, &PeriodRange::all())
            .await
            .unwrap();
        assert_eq!(view.dividends, DividendView::NoDividends);
        assert!(view.render().contains("Company pays no dividends"));
        assert_eq!(view.exports().unwrap().len(), view.charts.len());
    }

    #[tokio::test]
    async fn test_missing_ticker_is_unavailable() {
        let source = fixtures::source();
        let err = FundamentalsView::load(&source, "ZZZZ", Granularity::Annual, &PeriodRange::all())
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
        assert!(matches!(err, crate::StockdocError::Data(DataError::DataUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_empty_range_fails_view() {
        let source = fixtures::source();
        let range = PeriodRange::between(Some(PeriodKey::Year(2030)), None);
        let err = FundamentalsView::load(&source, "ACME", Granularity::Annual, &range)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::StockdocError::Metric(MetricError::EmptySeries { .. })
        ));
    }

    #[tokio::test]
    async fn test_report_contains_tables() {
        let source = fixtures::source();
        let view = FundamentalsView::load(&source, "ACME", Granularity::Annual, &PeriodRange::all())
            .await
            .unwrap();
        let json = view.report().unwrap().to_json().unwrap();
        assert!(json.contains("\"fundamentals\""));
        assert!(json.contains("Dividends per Share"));
    }
}
