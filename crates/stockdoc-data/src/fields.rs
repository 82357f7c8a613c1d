//! Closed schema of financial-statement line items.
//!
//! The store delivers each period as a flat object whose keys are the
//! camelCase line-item names of the merged income statement, balance sheet and
//! cash-flow statement. Every numeric key the pipeline understands is a
//! [`FinancialField`]; anything else is either a known metadata key (see
//! [`METADATA_KEYS`]) or unknown.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-numeric keys that may appear on a period record.
pub const METADATA_KEYS: &[&str] = &[
    "endDate",
    "fiscalDateEnding",
    "reportedCurrency",
    "ticker",
    "symbol",
    "index",
];

macro_rules! financial_fields {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)+) => {
        /// A named numeric line item of a period record.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum FinancialField {
            $($(#[$doc])* #[serde(rename = $name)] $variant,)+
        }

        impl FinancialField {
            /// Every field of the schema, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Key used for this field by the remote store.
            pub const fn store_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Resolve a store key to a field.
            pub fn from_store_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

financial_fields! {
    // Income statement
    /// Total revenue
    TotalRevenue => "totalRevenue",
    /// Cost of revenue
    CostOfRevenue => "costOfRevenue",
    /// Cost of goods and services sold
    CostOfGoodsAndServicesSold => "costofGoodsAndServicesSold",
    /// Gross profit
    GrossProfit => "grossProfit",
    /// Operating income (EBIT)
    OperatingIncome => "operatingIncome",
    /// Selling, general and administrative expense
    SellingGeneralAndAdministrative => "sellingGeneralAndAdministrative",
    /// Research and development expense
    ResearchAndDevelopment => "researchAndDevelopment",
    /// Operating expenses
    OperatingExpenses => "operatingExpenses",
    /// Net investment income
    InvestmentIncomeNet => "investmentIncomeNet",
    /// Net interest income
    NetInterestIncome => "netInterestIncome",
    /// Interest income
    InterestIncome => "interestIncome",
    /// Interest expense
    InterestExpense => "interestExpense",
    /// Non-interest income
    NonInterestIncome => "nonInterestIncome",
    /// Other non-operating income
    OtherNonOperatingIncome => "otherNonOperatingIncome",
    /// Depreciation
    Depreciation => "depreciation",
    /// Depreciation and amortization (income statement)
    DepreciationAndAmortization => "depreciationAndAmortization",
    /// Income before tax
    IncomeBeforeTax => "incomeBeforeTax",
    /// Income tax expense
    IncomeTaxExpense => "incomeTaxExpense",
    /// Interest and debt expense
    InterestAndDebtExpense => "interestAndDebtExpense",
    /// Net income from continuing operations
    NetIncomeFromContinuingOperations => "netIncomeFromContinuingOperations",
    /// Comprehensive income net of tax
    ComprehensiveIncomeNetOfTax => "comprehensiveIncomeNetOfTax",
    /// Reported EBIT
    Ebit => "ebit",
    /// Reported EBITDA
    Ebitda => "ebitda",
    /// Net income
    NetIncome => "netIncome",

    // Balance sheet
    /// Total assets
    TotalAssets => "totalAssets",
    /// Total current assets
    TotalCurrentAssets => "totalCurrentAssets",
    /// Cash and cash equivalents
    CashAndCashEquivalentsAtCarryingValue => "cashAndCashEquivalentsAtCarryingValue",
    /// Cash and short-term investments
    CashAndShortTermInvestments => "cashAndShortTermInvestments",
    /// Inventory
    Inventory => "inventory",
    /// Current net receivables
    CurrentNetReceivables => "currentNetReceivables",
    /// Total non-current assets
    TotalNonCurrentAssets => "totalNonCurrentAssets",
    /// Property, plant and equipment
    PropertyPlantEquipment => "propertyPlantEquipment",
    /// Accumulated depreciation of PP&E
    AccumulatedDepreciationAmortizationPpe => "accumulatedDepreciationAmortizationPPE",
    /// Intangible assets
    IntangibleAssets => "intangibleAssets",
    /// Intangible assets excluding goodwill
    IntangibleAssetsExcludingGoodwill => "intangibleAssetsExcludingGoodwill",
    /// Goodwill
    Goodwill => "goodwill",
    /// Investments
    Investments => "investments",
    /// Long-term investments
    LongTermInvestments => "longTermInvestments",
    /// Short-term investments
    ShortTermInvestments => "shortTermInvestments",
    /// Other current assets
    OtherCurrentAssets => "otherCurrentAssets",
    /// Other non-current assets
    OtherNonCurrentAssets => "otherNonCurrentAssets",
    /// Total liabilities
    TotalLiabilities => "totalLiabilities",
    /// Total current liabilities
    TotalCurrentLiabilities => "totalCurrentLiabilities",
    /// Current accounts payable
    CurrentAccountsPayable => "currentAccountsPayable",
    /// Deferred revenue
    DeferredRevenue => "deferredRevenue",
    /// Current debt
    CurrentDebt => "currentDebt",
    /// Short-term debt
    ShortTermDebt => "shortTermDebt",
    /// Total non-current liabilities
    TotalNonCurrentLiabilities => "totalNonCurrentLiabilities",
    /// Capital lease obligations
    CapitalLeaseObligations => "capitalLeaseObligations",
    /// Long-term debt (all maturities)
    LongTermDebt => "longTermDebt",
    /// Current portion of long-term debt
    CurrentLongTermDebt => "currentLongTermDebt",
    /// Long-term debt, non-current portion
    LongTermDebtNoncurrent => "longTermDebtNoncurrent",
    /// Short and long-term debt total
    ShortLongTermDebtTotal => "shortLongTermDebtTotal",
    /// Other current liabilities
    OtherCurrentLiabilities => "otherCurrentLiabilities",
    /// Other non-current liabilities
    OtherNonCurrentLiabilities => "otherNonCurrentLiabilities",
    /// Total shareholder equity
    TotalShareholderEquity => "totalShareholderEquity",
    /// Treasury stock
    TreasuryStock => "treasuryStock",
    /// Retained earnings
    RetainedEarnings => "retainedEarnings",
    /// Common stock
    CommonStock => "commonStock",
    /// Common shares outstanding
    CommonStockSharesOutstanding => "commonStockSharesOutstanding",

    // Cash-flow statement
    /// Operating cash flow
    OperatingCashflow => "operatingCashflow",
    /// Payments for operating activities
    PaymentsForOperatingActivities => "paymentsForOperatingActivities",
    /// Proceeds from operating activities
    ProceedsFromOperatingActivities => "proceedsFromOperatingActivities",
    /// Change in operating liabilities
    ChangeInOperatingLiabilities => "changeInOperatingLiabilities",
    /// Change in operating assets
    ChangeInOperatingAssets => "changeInOperatingAssets",
    /// Depreciation, depletion and amortization (cash-flow statement)
    DepreciationDepletionAndAmortization => "depreciationDepletionAndAmortization",
    /// Capital expenditures
    CapitalExpenditures => "capitalExpenditures",
    /// Change in receivables
    ChangeInReceivables => "changeInReceivables",
    /// Change in inventory
    ChangeInInventory => "changeInInventory",
    /// Profit or loss
    ProfitLoss => "profitLoss",
    /// Cash flow from investment
    CashflowFromInvestment => "cashflowFromInvestment",
    /// Cash flow from financing
    CashflowFromFinancing => "cashflowFromFinancing",
    /// Proceeds from repayments of short-term debt
    ProceedsFromRepaymentsOfShortTermDebt => "proceedsFromRepaymentsOfShortTermDebt",
    /// Payments for repurchase of common stock
    PaymentsForRepurchaseOfCommonStock => "paymentsForRepurchaseOfCommonStock",
    /// Payments for repurchase of equity
    PaymentsForRepurchaseOfEquity => "paymentsForRepurchaseOfEquity",
    /// Payments for repurchase of preferred stock
    PaymentsForRepurchaseOfPreferredStock => "paymentsForRepurchaseOfPreferredStock",
    /// Dividend payout
    DividendPayout => "dividendPayout",
    /// Dividend payout, common stock
    DividendPayoutCommonStock => "dividendPayoutCommonStock",
    /// Dividend payout, preferred stock
    DividendPayoutPreferredStock => "dividendPayoutPreferredStock",
    /// Proceeds from issuance of common stock
    ProceedsFromIssuanceOfCommonStock => "proceedsFromIssuanceOfCommonStock",
    /// Proceeds from issuance of long-term debt and capital securities
    ProceedsFromIssuanceOfLongTermDebtAndCapitalSecuritiesNet => "proceedsFromIssuanceOfLongTermDebtAndCapitalSecuritiesNet",
    /// Proceeds from issuance of preferred stock
    ProceedsFromIssuanceOfPreferredStock => "proceedsFromIssuanceOfPreferredStock",
    /// Proceeds from repurchase of equity
    ProceedsFromRepurchaseOfEquity => "proceedsFromRepurchaseOfEquity",
    /// Proceeds from sale of treasury stock
    ProceedsFromSaleOfTreasuryStock => "proceedsFromSaleOfTreasuryStock",
    /// Change in cash and cash equivalents
    ChangeInCashAndCashEquivalents => "changeInCashAndCashEquivalents",
    /// Change in exchange rate
    ChangeInExchangeRate => "changeInExchangeRate",
}

impl FinancialField {
    /// Whether `key` is a known non-numeric record key.
    pub fn is_metadata_key(key: &str) -> bool {
        METADATA_KEYS.contains(&key)
    }
}

impl fmt::Display for FinancialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.store_name())
    }
}
