//! Per-run state, the year trace record, run results, and the aggregate
//! result shape produced by the aggregator (§3, §4.7, §4.8).

use serde::{Deserialize, Serialize};

use super::ids::{AccountId, ExpenseId, IncomeId};
use super::plan::Account;

/// The initial-regime directive a run configuration may carry (§3, §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketRegime {
    Bear,
    Bull,
    None,
}

impl MarketRegime {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "bear" => Some(MarketRegime::Bear),
            "bull" => Some(MarketRegime::Bull),
            "none" => Some(MarketRegime::None),
            _ => None,
        }
    }
}

/// Parameters for a Monte Carlo batch (§3 "Run configuration").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub num_runs: usize,
    pub lower_pct: i32,
    pub upper_pct: i32,
    pub initial_regime: MarketRegime,
    pub seed: u64,
}

impl RunConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(10..=10_000).contains(&self.num_runs) {
            return Err(crate::error::EngineError::InvalidRunCount(self.num_runs));
        }
        if !(1 <= self.lower_pct && self.lower_pct < self.upper_pct && self.upper_pct <= 99) {
            return Err(crate::error::EngineError::InvalidPercentiles {
                lower: self.lower_pct,
                upper: self.upper_pct,
            });
        }
        Ok(())
    }
}

/// The run lifecycle state machine (§4.8). `Depleted` is reached only via
/// `Stepping`, and is as terminal as `Finalized` for the purposes of
/// resuming stepping — only the aggregator/caller moves a depleted run to
/// `Finalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Initializing,
    Stepping,
    Depleted,
    Finalized,
}

/// Per-account detail for a single simulated year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountYearRecord {
    pub account_id: AccountId,
    pub start_balance: f64,
    pub end_balance: f64,
    pub growth_rate: f64,
    pub withdrawn_for_expense: f64,
    pub withdrawn_for_tax: f64,
    pub required_distribution: f64,
}

/// Gross amount drawn from one income source in a single year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IncomeYearRecord {
    pub income_id: IncomeId,
    pub gross_amount: f64,
}

/// Inflation-adjusted amount for one expense in a single year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExpenseYearRecord {
    pub expense_id: ExpenseId,
    pub adjusted_amount: f64,
}

/// Federal/state tax breakdown for a single year (§3, §4.2).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub federal_ordinary: f64,
    pub federal_ltcg: f64,
    pub state: f64,
    pub total: f64,
    pub effective_rate: f64,
}

/// The full per-age trace record (§3 "Year trace record").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRecord {
    pub age: u32,
    pub accounts: Vec<AccountYearRecord>,
    pub incomes: Vec<IncomeYearRecord>,
    pub taxable_social_security: f64,
    pub provisional_income: f64,
    pub total_required_distributions: f64,
    pub expenses: Vec<ExpenseYearRecord>,
    pub net_cash_need: f64,
    pub ordinary_income: f64,
    pub ltcg_income: f64,
    pub tax: TaxBreakdown,
    pub shortfall: f64,
    pub failed: bool,
}

/// The outcome of one Monte Carlo run: its full trace plus a final total and
/// success flag, as returned by the run engine (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub trace: Vec<YearRecord>,
    pub final_total: f64,
    pub success: bool,
}

impl RunResult {
    /// Total portfolio value at `age`, or 0.0 if the run had already failed
    /// or the age falls outside the trace (§4.7 "failed runs contribute zero
    /// from failure age onward").
    pub fn total_at_age(&self, age: u32) -> f64 {
        self.trace
            .iter()
            .find(|r| r.age == age)
            .map(|r| {
                if r.failed {
                    0.0
                } else {
                    r.accounts.iter().map(|a| a.end_balance).sum()
                }
            })
            .unwrap_or(0.0)
    }
}

/// One of the three labeled representative-run slots (§4.7, Glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    Lower,
    Median,
    Upper,
}

/// Cross-sectional percentiles of total portfolio value at one age.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PortfolioPercentile {
    pub age: u32,
    pub p_lower: f64,
    pub p50: f64,
    pub p_upper: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalancePoint {
    pub account_id: AccountId,
    pub age: u32,
    pub start_balance: f64,
    pub end_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandAccountTimeline {
    pub band: Band,
    pub run_index: usize,
    pub points: Vec<AccountBalancePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualDetailPoint {
    pub age: u32,
    pub total_required_distributions: f64,
    pub net_cash_need: f64,
    pub tax: TaxBreakdown,
    pub shortfall: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandAnnualDetail {
    pub band: Band,
    pub run_index: usize,
    pub points: Vec<AnnualDetailPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandIncomeDetail {
    pub band: Band,
    pub run_index: usize,
    pub points: Vec<(u32, Vec<IncomeYearRecord>)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandExpenseDetail {
    pub band: Band,
    pub run_index: usize,
    pub points: Vec<(u32, Vec<ExpenseYearRecord>)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnDetailPoint {
    pub account_id: AccountId,
    pub age: u32,
    pub growth_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandReturnDetail {
    pub band: Band,
    pub run_index: usize,
    pub points: Vec<ReturnDetailPoint>,
}

/// The full result of a Monte Carlo batch (§6 entry point).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub success_rate: f64,
    pub portfolio_timeline: Vec<PortfolioPercentile>,
    pub account_timeline_by_band: Vec<BandAccountTimeline>,
    pub annual_detail_by_band: Vec<BandAnnualDetail>,
    pub income_detail_by_band: Vec<BandIncomeDetail>,
    pub expense_detail_by_band: Vec<BandExpenseDetail>,
    pub return_detail_by_band: Vec<BandReturnDetail>,
}

/// Mutable per-account state carried through a single run (§3 "Run state").
#[derive(Debug, Clone)]
pub struct AccountState {
    pub id: AccountId,
    pub balance: f64,
    pub tax_treatment: super::plan::TaxTreatment,
    pub asset_class: super::plan::AssetClass,
    pub annual_return_rate: Option<f64>,
    pub gains_fraction: f64,
}

impl AccountState {
    pub fn from_account(account: &Account) -> Self {
        AccountState {
            id: account.id,
            balance: account.starting_balance,
            tax_treatment: account.tax_treatment,
            asset_class: account.asset_class,
            annual_return_rate: account.annual_return_rate,
            gains_fraction: account.effective_gains_fraction(),
        }
    }
}
