//! Multi-ticker fundamentals comparison.

use super::key_label;
use crate::error::Result;
use stockdoc_data::{CachedDataSource, FundamentalsStore, Granularity, PeriodSeries, PriceSource};
use stockdoc_metrics::{Chart, PeriodKey, PeriodRange, compare_fundamentals};
use stockdoc_output::{Report, ReportBuilder, TableExport, chart_to_ascii};
use tracing::info;

/// One chart per comparison metric, a column per ticker.
#[derive(Debug, Clone)]
pub struct ComparisonView {
    /// Tickers in request order
    pub tickers: Vec<String>,
    /// Granularity of the charts
    pub granularity: Granularity,
    /// Charts in display order
    pub charts: Vec<Chart<PeriodKey>>,
}

impl ComparisonView {
    /// Fetch every ticker and compare them over `range`.
    ///
    /// Any ticker missing from the store fails the view. An unbounded range
    /// takes its window from the first ticker.
    pub async fn load<S, P>(
        source: &CachedDataSource<S, P>,
        tickers: &[String],
        granularity: Granularity,
        range: &PeriodRange,
    ) -> Result<Self>
    where
        S: FundamentalsStore + Sync,
        P: PriceSource + Sync,
    {
        let mut series: Vec<PeriodSeries> = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            series.push(source.periods(ticker, granularity).await?);
        }

        let refs: Vec<&PeriodSeries> = series.iter().collect();
        let charts = compare_fundamentals(&refs, range)?;
        info!(tickers = tickers.len(), ?granularity, "comparison ready");

        Ok(Self {
            tickers: series.iter().map(|s| s.ticker().to_string()).collect(),
            granularity,
            charts,
        })
    }

    /// Terminal rendering.
    pub fn render(&self) -> String {
        let label = key_label(self.granularity);
        self.charts.iter().map(|c| chart_to_ascii(c, label)).collect()
    }

    /// Charts flattened for export.
    pub fn exports(&self) -> Vec<TableExport> {
        self.charts.iter().map(TableExport::from_chart).collect()
    }

    /// JSON report of the view.
    pub fn report(&self) -> Result<Report> {
        Ok(ReportBuilder::new()
            .view("compare")
            .tickers(self.tickers.iter().cloned())
            .contents_from(&self.exports())?
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures;

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_shorter_ticker_leaves_gaps() {
        let source = fixtures::source();
        let view = ComparisonView::load(
            &source,
            &tickers(&["ACME", "SHRT"]),
            Granularity::Quarterly,
            &PeriodRange::all(),
        )
        .await
        .unwrap();

        let revenue = &view.charts[0];
        assert_eq!(revenue.title, "Revenue");
        assert_eq!(revenue.table.columns(), ["ACME", "SHRT"]);
        assert_eq!(revenue.table.len(), 8);

        let q1_2022 = PeriodKey::Quarter { year: 2022, quarter: 1 };
        assert_eq!(revenue.table.get(&q1_2022, "ACME"), Some(100.0));
        assert_eq!(revenue.table.get(&q1_2022, "SHRT"), None);
    }

    #[tokio::test]
    async fn test_window_follows_first_ticker() {
        let source = fixtures::source();
        let view = ComparisonView::load(
            &source,
            &tickers(&["SHRT", "ACME"]),
            Granularity::Quarterly,
            &PeriodRange::all(),
        )
        .await
        .unwrap();
        assert_eq!(view.charts[0].table.len(), 4);
        assert_eq!(view.report().unwrap().tickers, vec!["SHRT", "ACME"]);
    }

    #[tokio::test]
    async fn test_unknown_ticker_aborts() {
        let source = fixtures::source();
        let err = ComparisonView::load(
            &source,
            &tickers(&["ACME", "NOPE"]),
            Granularity::Annual,
            &PeriodRange::all(),
        )
        .await
        .unwrap_err();
        assert!(err.is_unavailable());
    }
}
