//! Key statistics panel of the single-ticker view.

use crate::ttm::TTM_WINDOW;
use serde::{Deserialize, Serialize};
use stockdoc_data::{DividendSeries, FinancialField, PeriodSeries, ValuationSnapshot};

/// Headline figures for one ticker. Each is `None` when its inputs are
/// undefined: fewer than four quarters, a missing field or a zero denominator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyStatistics {
    /// Live price
    pub price: f64,
    /// Live price minus previous close
    pub price_delta: Option<f64>,
    /// Price delta in percent of previous close
    pub price_delta_pct: Option<f64>,
    /// Live price times latest share count
    pub market_cap: Option<f64>,
    /// Trailing operating cash flow minus trailing capex
    pub fcf_ttm: Option<f64>,
    /// Trailing net income
    pub earnings_ttm: Option<f64>,
    /// Market cap over trailing FCF
    pub price_to_fcf: Option<f64>,
    /// Market cap over trailing earnings
    pub trailing_pe: Option<f64>,
    /// Return on assets, percent
    pub roa: Option<f64>,
    /// Return on equity, percent
    pub roe: Option<f64>,
    /// Trailing FCF over market cap, percent
    pub cash_flow_yield: Option<f64>,
    /// Trailing dividends over price, percent
    pub dividend_yield: Option<f64>,
    /// Trailing dividend payout over trailing earnings, percent
    pub payout_ratio: Option<f64>,
    /// Vendor market cap
    pub vendor_market_cap: Option<f64>,
    /// Vendor forward P/E
    pub forward_pe: Option<f64>,
    /// Vendor PEG ratio
    pub peg_ratio: Option<f64>,
}

impl KeyStatistics {
    /// Compute the panel from quarterly statements, dividends and prices.
    pub fn compute(
        quarterly: &PeriodSeries,
        dividends: &DividendSeries,
        price: f64,
        previous_close: Option<f64>,
        snapshot: &ValuationSnapshot,
    ) -> Self {
        use FinancialField as F;

        let latest = |field| {
            quarterly
                .records()
                .iter()
                .rev()
                .find_map(|r| r.value(field))
        };
        let trailing = |field| trailing_sum(quarterly, field);

        let market_cap = latest(F::CommonStockSharesOutstanding).map(|shares| price * shares);
        let fcf_ttm = trailing(F::OperatingCashflow)
            .zip(trailing(F::CapitalExpenditures))
            .map(|(ocf, capex)| ocf - capex);
        let earnings_ttm = trailing(F::NetIncome);

        let dividend_yield = (dividends.records().len() >= TTM_WINDOW)
            .then(|| dividends.trailing_sum(TTM_WINDOW))
            .flatten()
            .and_then(|paid| percent(Some(paid), Some(price)));

        let price_delta = previous_close.map(|close| price - close);

        Self {
            price,
            price_delta,
            price_delta_pct: percent(price_delta, previous_close),
            market_cap,
            fcf_ttm,
            earnings_ttm,
            price_to_fcf: ratio(market_cap, fcf_ttm),
            trailing_pe: ratio(market_cap, earnings_ttm),
            roa: percent(earnings_ttm, latest(F::TotalAssets)),
            roe: percent(earnings_ttm, latest(F::TotalShareholderEquity)),
            cash_flow_yield: percent(fcf_ttm, market_cap),
            dividend_yield,
            payout_ratio: percent(trailing(F::DividendPayout), earnings_ttm),
            vendor_market_cap: snapshot.market_cap,
            forward_pe: snapshot.forward_pe,
            peg_ratio: snapshot.peg_ratio,
        }
    }

    /// Labelled figures in display order.
    pub fn rows(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("Price", Some(self.price)),
            ("Change", self.price_delta),
            ("Change %", self.price_delta_pct),
            ("Market Cap", self.market_cap),
            ("FCF (TTM)", self.fcf_ttm),
            ("Earnings (TTM)", self.earnings_ttm),
            ("Price/FCF", self.price_to_fcf),
            ("Trailing P/E", self.trailing_pe),
            ("ROA %", self.roa),
            ("ROE %", self.roe),
            ("Cash Flow Yield %", self.cash_flow_yield),
            ("Dividend Yield %", self.dividend_yield),
            ("Payout Ratio %", self.payout_ratio),
            ("Market Cap (vendor)", self.vendor_market_cap),
            ("Forward P/E", self.forward_pe),
            ("PEG Ratio", self.peg_ratio),
        ]
    }
}

/// Sum of the last four quarters, undefined unless all four report `field`.
fn trailing_sum(quarterly: &PeriodSeries, field: FinancialField) -> Option<f64> {
    let records = quarterly.records();
    if records.len() < TTM_WINDOW {
        return None;
    }
    records[records.len() - TTM_WINDOW..]
        .iter()
        .map(|r| r.value(field))
        .sum()
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let value = numerator? / denominator?;
    value.is_finite().then_some(value)
}

fn percent(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    ratio(numerator, denominator).map(|r| r * 100.0)
}
