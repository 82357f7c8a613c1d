//! Daily valuation ratio comparison.

use crate::error::Result;
use chrono::NaiveDate;
use stockdoc_data::{CachedDataSource, FundamentalsStore, Granularity, PeriodSeries, PriceSeries, PriceSource};
use stockdoc_metrics::{Chart, DateRange, ValuationEngine, ValuationMetric};
use stockdoc_output::{
    Report, ReportBuilder, TableExport, chart_to_ascii, valuation_summary_to_ascii,
};
use tracing::{info, warn};

/// A valuation ratio per ticker per trading day.
#[derive(Debug, Clone)]
pub struct ValuationView {
    /// Ratio shown
    pub metric: ValuationMetric,
    /// Last day the trailing series is carried to
    pub as_of: NaiveDate,
    /// Daily chart, a column per ticker
    pub chart: Chart<NaiveDate>,
    /// Tickers whose statements or prices could not be fetched
    pub skipped: Vec<String>,
}

impl ValuationView {
    /// Fetch statements and prices and compute `metric` for every ticker.
    ///
    /// Tickers that cannot be fetched are skipped with a warning; the rest
    /// still chart.
    pub async fn load<S, P>(
        source: &CachedDataSource<S, P>,
        tickers: &[String],
        metric: ValuationMetric,
        range: &DateRange,
        as_of: NaiveDate,
    ) -> Result<Self>
    where
        S: FundamentalsStore + Sync,
        P: PriceSource + Sync,
    {
        let mut inputs: Vec<(PeriodSeries, PriceSeries)> = Vec::with_capacity(tickers.len());
        let mut skipped = Vec::new();
        for ticker in tickers {
            match Self::fetch(source, ticker).await {
                Ok(pair) => inputs.push(pair),
                Err(e) => {
                    warn!(ticker = ticker.as_str(), error = %e, "ticker skipped");
                    skipped.push(ticker.clone());
                }
            }
        }

        let pairs: Vec<(&PeriodSeries, &PriceSeries)> = inputs.iter().map(|(q, p)| (q, p)).collect();
        let chart = ValuationEngine::new(as_of).compare(metric, &pairs, range)?;
        info!(metric = metric.code(), columns = chart.table.columns().len(), "valuation ready");

        Ok(Self {
            metric,
            as_of,
            chart,
            skipped,
        })
    }

    async fn fetch<S, P>(
        source: &CachedDataSource<S, P>,
        ticker: &str,
    ) -> Result<(PeriodSeries, PriceSeries)>
    where
        S: FundamentalsStore + Sync,
        P: PriceSource + Sync,
    {
        let quarterly = source.periods(ticker, Granularity::Quarterly).await?;
        let prices = source.get_prices(ticker).await?;
        Ok((quarterly, prices))
    }

    /// Latest ratio per ticker.
    pub fn render(&self) -> String {
        let mut output = valuation_summary_to_ascii(&self.chart);
        for ticker in &self.skipped {
            output.push_str(&format!("  ! {}: no data\n", ticker));
        }
        output
    }

    /// Full daily table.
    pub fn render_table(&self) -> String {
        chart_to_ascii(&self.chart, "Date")
    }

    /// Daily table flattened for export.
    pub fn exports(&self) -> Vec<TableExport> {
        vec![TableExport::from_chart(&self.chart)]
    }

    /// JSON report of the view.
    pub fn report(&self) -> Result<Report> {
        let tickers: Vec<String> = self.chart.table.columns().to_vec();
        let builder = if tickers.is_empty() {
            ReportBuilder::new().tickers(self.skipped.iter().cloned())
        } else {
            ReportBuilder::new().tickers(tickers)
        };
        Ok(builder
            .view("valuation")
            .contents_from(&self.exports())?
            .build()?)
    }
}
