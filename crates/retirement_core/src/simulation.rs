//! Top-level batch entry point (§5, §6): drives `num_runs` independent
//! scenarios — in parallel via rayon when the `parallel` feature is on,
//! sequentially otherwise — and folds them through the aggregator.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::aggregator::aggregate;
use crate::error::{EngineError, Result};
use crate::historical_returns::HistoricalReturnService;
use crate::model::{AggregateResult, Plan, RmdTable, RunConfig, RunResult, TaxTables};
use crate::run_engine::run_single;

/// Shared progress/cancellation handle for a batch (§5). Cheap to clone and
/// share across threads; `cancel()` is checked between runs, not mid-run, so
/// cancellation latency is at most one run's wall-clock cost.
#[derive(Debug, Default)]
pub struct SimulationProgress {
    completed: AtomicUsize,
    cancelled: AtomicBool,
}

impl SimulationProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.completed.store(0, Ordering::Relaxed);
        self.cancelled.store(false, Ordering::Relaxed);
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Validate the parts of a plan the engine itself must check before running
/// (structural well-formedness of ages and balances — everything else is
/// the caller's responsibility per §1's "fully-materialized plan" contract).
fn validate_plan(plan: &Plan) -> Result<()> {
    if plan.planning_horizon_years == 0 {
        return Err(EngineError::NonPositiveHorizon(plan.planning_horizon_years));
    }
    for account in &plan.accounts {
        if account.starting_balance < 0.0 {
            return Err(EngineError::NegativeBalance { account: account.id, balance: account.starting_balance });
        }
    }
    for income in &plan.income_sources {
        if income.start_age > income.end_age {
            return Err(EngineError::InvalidAgeRange { start_age: income.start_age, end_age: income.end_age });
        }
    }
    for expense in &plan.expenses {
        if expense.start_age > expense.end_age {
            return Err(EngineError::InvalidAgeRange { start_age: expense.start_age, end_age: expense.end_age });
        }
    }
    Ok(())
}

/// Run the batch and aggregate, using the bundled default historical-return
/// series and reference 2024 tax/RMD tables.
pub fn simulate(plan: &Plan, config: &RunConfig) -> Result<AggregateResult> {
    let historical = HistoricalReturnService::from_default()?;
    let rmd_table = RmdTable::irs_uniform_lifetime_2024();
    let tax_tables = TaxTables::reference_2024();
    simulate_with_resources(plan, config, &historical, &rmd_table, &tax_tables, None)
}

/// As [`simulate`], but reporting progress and honoring cancellation
/// through `progress`.
pub fn simulate_with_progress(
    plan: &Plan,
    config: &RunConfig,
    progress: &SimulationProgress,
) -> Result<AggregateResult> {
    let historical = HistoricalReturnService::from_default()?;
    let rmd_table = RmdTable::irs_uniform_lifetime_2024();
    let tax_tables = TaxTables::reference_2024();
    simulate_with_resources(plan, config, &historical, &rmd_table, &tax_tables, Some(progress))
}

/// Full entry point accepting externally-supplied resources (a custom
/// historical-return series, bracket tables), so a caller can update tax
/// data without touching engine code.
pub fn simulate_with_resources(
    plan: &Plan,
    config: &RunConfig,
    historical: &HistoricalReturnService,
    rmd_table: &RmdTable,
    tax_tables: &TaxTables,
    progress: Option<&SimulationProgress>,
) -> Result<AggregateResult> {
    config.validate()?;
    validate_plan(plan)?;

    if let Some(p) = progress {
        p.reset();
        if p.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
    }

    let (runs, was_cancelled) = run_batch(plan, config, historical, rmd_table, tax_tables, progress);

    if was_cancelled {
        return Err(EngineError::Cancelled);
    }

    Ok(aggregate(plan, config, &runs))
}

#[cfg(feature = "parallel")]
fn run_batch(
    plan: &Plan,
    config: &RunConfig,
    historical: &HistoricalReturnService,
    rmd_table: &RmdTable,
    tax_tables: &TaxTables,
    progress: Option<&SimulationProgress>,
) -> (Vec<RunResult>, bool) {
    let cancelled = AtomicBool::new(false);
    let runs: Vec<RunResult> = (0..config.num_runs)
        .into_par_iter()
        .filter_map(|run_index| {
            if cancelled.load(Ordering::Relaxed) || progress.is_some_and(|p| p.is_cancelled()) {
                cancelled.store(true, Ordering::Relaxed);
                return None;
            }
            let result =
                run_single(plan, historical, rmd_table, tax_tables, config.initial_regime, config.seed, run_index)
                    .ok()?;
            if let Some(p) = progress {
                p.increment();
            }
            Some(result)
        })
        .collect();

    let was_cancelled = cancelled.load(Ordering::Relaxed) || progress.is_some_and(|p| p.is_cancelled());
    (runs, was_cancelled)
}

#[cfg(not(feature = "parallel"))]
fn run_batch(
    plan: &Plan,
    config: &RunConfig,
    historical: &HistoricalReturnService,
    rmd_table: &RmdTable,
    tax_tables: &TaxTables,
    progress: Option<&SimulationProgress>,
) -> (Vec<RunResult>, bool) {
    let mut runs = Vec::with_capacity(config.num_runs);
    let mut was_cancelled = false;

    for run_index in 0..config.num_runs {
        if progress.is_some_and(|p| p.is_cancelled()) {
            was_cancelled = true;
            break;
        }
        if let Ok(result) =
            run_single(plan, historical, rmd_table, tax_tables, config.initial_regime, config.seed, run_index)
        {
            runs.push(result);
        }
        if let Some(p) = progress {
            p.increment();
        }
    }

    (runs, was_cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, AccountId, AssetClass, Expense, ExpenseId, FilingStatus, MarketRegime, StateTaxRegime, TaxTreatment};

    fn plan() -> Plan {
        Plan {
            current_age: 65,
            planning_horizon_years: 20,
            filing_status: FilingStatus::Single,
            state_tax: StateTaxRegime::None,
            accounts: vec![Account {
                id: AccountId(1),
                name: "brokerage".into(),
                tax_treatment: TaxTreatment::TaxableBrokerage,
                asset_class: AssetClass::Stocks,
                starting_balance: 800_000.0,
                annual_return_rate: None,
                gains_fraction: Some(0.7),
            }],
            income_sources: vec![],
            expenses: vec![Expense {
                id: ExpenseId(1),
                name: "living".into(),
                annual_amount: 40_000.0,
                start_age: 65,
                end_age: 95,
                inflation_rate: 0.025,
            }],
        }
    }

    fn config() -> RunConfig {
        RunConfig { num_runs: 50, lower_pct: 10, upper_pct: 90, initial_regime: MarketRegime::None, seed: 7 }
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let mut bad_plan = plan();
        bad_plan.planning_horizon_years = 0;
        let result = simulate(&bad_plan, &config());
        assert!(matches!(result, Err(EngineError::NonPositiveHorizon(0))));
    }

    #[test]
    fn negative_starting_balance_is_rejected() {
        let mut bad_plan = plan();
        bad_plan.accounts[0].starting_balance = -1.0;
        let result = simulate(&bad_plan, &config());
        assert!(matches!(result, Err(EngineError::NegativeBalance { .. })));
    }

    #[test]
    fn invalid_run_count_is_rejected() {
        let mut bad_config = config();
        bad_config.num_runs = 3;
        let result = simulate(&plan(), &bad_config);
        assert!(matches!(result, Err(EngineError::InvalidRunCount(3))));
    }

    #[test]
    fn produces_one_portfolio_timeline_point_per_age() {
        let result = simulate(&plan(), &config()).unwrap();
        assert_eq!(result.portfolio_timeline.len(), 20);
        assert!(result.success_rate >= 0.0 && result.success_rate <= 1.0);
    }

    #[test]
    fn already_cancelled_progress_stops_immediately() {
        let progress = SimulationProgress::new();
        progress.cancel();
        let result = simulate_with_progress(&plan(), &config(), &progress);
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }

    #[test]
    fn determinism_same_seed_same_aggregate() {
        let result_a = simulate(&plan(), &config()).unwrap();
        let result_b = simulate(&plan(), &config()).unwrap();
        assert_eq!(result_a.success_rate, result_b.success_rate);
        for (a, b) in result_a.portfolio_timeline.iter().zip(result_b.portfolio_timeline.iter()) {
            assert_eq!(a.p50, b.p50);
        }
    }
}
