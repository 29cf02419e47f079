//! The plan value the engine simulates: accounts, income streams, expenses,
//! and the tax/filing context they live under. Immutable for the duration of
//! a simulation (§3, §9 "no cyclic graphs" — a plan owns its accounts,
//! income, and expenses by value).

use serde::{Deserialize, Serialize};

use super::ids::{AccountId, ExpenseId, IncomeId};

/// IRS filing status. Drives the standard deduction and bracket tables used
/// by the tax module (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilingStatus {
    Single,
    MarriedJointly,
}

/// The three state-tax regimes supported by §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StateTaxRegime {
    None,
    Flat { rate: f64 },
    California,
}

/// How an account's withdrawals are taxed; fixes its slot in the withdrawal
/// sequencer's priority order (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxTreatment {
    Traditional,
    TaxableBrokerage,
    CashSavings,
}

/// Whether an account's growth is drawn from the historical-return service
/// (stocks) or applied as a deterministic rate (bonds, savings) (§4.5 phase 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetClass {
    Stocks,
    Bonds,
    Savings,
}

/// A single investment account in the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub tax_treatment: TaxTreatment,
    pub asset_class: AssetClass,
    /// Non-negative starting balance.
    pub starting_balance: f64,
    /// Deterministic annual return. Required for non-stock accounts; ignored
    /// for stocks, which draw from the historical-return service instead.
    pub annual_return_rate: Option<f64>,
    /// Portion of a withdrawal treated as realized long-term capital gain.
    /// Only meaningful for `TaxableBrokerage` accounts; `Stocks` accounts use
    /// the configured value, non-stock taxable-brokerage accounts default to
    /// 1.0 per §4.4 rule 3.
    pub gains_fraction: Option<f64>,
}

impl Account {
    /// The gains fraction used by the withdrawal sequencer for this account,
    /// applying the §4.4 default for non-stock taxable-brokerage accounts.
    pub fn effective_gains_fraction(&self) -> f64 {
        self.gains_fraction.unwrap_or(1.0)
    }
}

/// The semantic kind of an income source; fixes its tax treatment except for
/// `Other`, which carries an explicit taxability flag (§4.3 income collection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeKind {
    Employment,
    SocialSecurity,
    Pension,
    Rental,
    TraditionalDistribution,
    Other { taxable: bool },
}

/// A time-bounded income stream, active for every simulated age in
/// `[start_age, end_age]` inclusive. The face `annual_amount` is not
/// inflated by the engine (§9 open question — preserved as-is).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: IncomeId,
    pub name: String,
    pub kind: IncomeKind,
    pub annual_amount: f64,
    pub start_age: u32,
    pub end_age: u32,
}

impl IncomeSource {
    pub fn active_at(&self, age: u32) -> bool {
        self.start_age <= age && age <= self.end_age
    }
}

/// A time-bounded, inflating expense stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub name: String,
    /// Today's-dollars annual amount, before inflation.
    pub annual_amount: f64,
    pub start_age: u32,
    pub end_age: u32,
    /// Annual inflation rate, compounded from `current_age`.
    pub inflation_rate: f64,
}

impl Expense {
    pub fn active_at(&self, age: u32) -> bool {
        self.start_age <= age && age <= self.end_age
    }

    /// Inflation-adjusted amount at `age`, per §4.5 phase 7:
    /// `base * (1 + inflation)^(age - current_age)`.
    pub fn adjusted_amount(&self, age: u32, current_age: u32) -> f64 {
        let years = age.saturating_sub(current_age) as i32;
        self.annual_amount * (1.0 + self.inflation_rate).powi(years)
    }
}

/// The full input to a simulation: age context, filing/tax context, and the
/// set of accounts, income sources, and expenses (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub current_age: u32,
    /// Positive integer; the last simulated age is
    /// `current_age + planning_horizon_years - 1`.
    pub planning_horizon_years: u32,
    pub filing_status: FilingStatus,
    pub state_tax: StateTaxRegime,
    pub accounts: Vec<Account>,
    pub income_sources: Vec<IncomeSource>,
    pub expenses: Vec<Expense>,
}

impl Plan {
    pub fn last_age(&self) -> u32 {
        self.current_age + self.planning_horizon_years - 1
    }

    pub fn ages(&self) -> impl Iterator<Item = u32> {
        let start = self.current_age;
        let horizon = self.planning_horizon_years;
        (0..horizon).map(move |y| start + y)
    }
}
