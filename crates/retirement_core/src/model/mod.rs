mod ids;
mod plan;
mod rmd;
mod run_state;
mod tax_config;

pub use ids::{AccountId, ExpenseId, IncomeId};
pub use plan::{
    Account, AssetClass, Expense, FilingStatus, IncomeKind, IncomeSource, Plan, StateTaxRegime,
    TaxTreatment,
};
pub use rmd::{RMD_START_AGE, RmdTable, RmdTableEntry};
pub use run_state::{
    AccountBalancePoint, AccountState, AccountYearRecord, AggregateResult, AnnualDetailPoint,
    Band, BandAccountTimeline, BandAnnualDetail, BandExpenseDetail, BandIncomeDetail,
    BandReturnDetail, ExpenseYearRecord, IncomeYearRecord, MarketRegime, PortfolioPercentile,
    ReturnDetailPoint, RunConfig, RunPhase, RunResult, TaxBreakdown, YearRecord,
};
pub use tax_config::{FilingStatusTable, LtcgBracket, SocialSecurityThresholds, TaxBracket, TaxTables};
