//! Run engine (§4.6): drives a single Monte Carlo scenario from the current
//! age to the planning horizon (or until depletion), producing one
//! [`RunResult`].

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::error::Result;
use crate::historical_returns::HistoricalReturnService;
use crate::model::{
    AccountState, AssetClass, Plan, RmdTable, RunPhase, RunResult, TaxTables, YearRecord,
};
use crate::year_engine::simulate_year;

/// Advance the §4.8 run lifecycle by one year. `Stepping -> Depleted` is the
/// only transition the year loop can trigger, and it is one-way: once
/// `Depleted`, the run never returns to `Stepping` even though the loop
/// breaks immediately afterward anyway.
fn advance_phase(phase: RunPhase, year_failed: bool) -> RunPhase {
    match (phase, year_failed) {
        (RunPhase::Stepping, true) => RunPhase::Depleted,
        (RunPhase::Stepping, false) => RunPhase::Stepping,
        (RunPhase::Depleted, _) => RunPhase::Depleted,
        (other, _) => other,
    }
}

/// Deterministically derive a per-run seed from the batch master seed and
/// run index, so re-running the same `(seed, run_index)` pair reproduces an
/// identical trace (§5, §8 determinism property).
fn derive_run_seed(master_seed: u64, run_index: usize) -> u64 {
    // SplitMix64-style mix; cheap, well distributed, no external crate needed
    // for this single-purpose derivation.
    let mut z = master_seed.wrapping_add(run_index as u64).wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Drive one full run. `initial_regime` carries the run configuration's
/// regime directive (§3 "Run configuration").
pub fn run_single(
    plan: &Plan,
    historical: &HistoricalReturnService,
    rmd_table: &RmdTable,
    tax_tables: &TaxTables,
    initial_regime: crate::model::MarketRegime,
    master_seed: u64,
    run_index: usize,
) -> Result<RunResult> {
    let mut rng = SmallRng::seed_from_u64(derive_run_seed(master_seed, run_index));
    let mut accounts: Vec<AccountState> = plan.accounts.iter().map(AccountState::from_account).collect();

    let horizon = plan.planning_horizon_years as usize;
    // One independent annual-multiplier trajectory per stock account, drawn
    // upfront so the Markov regime chain carries across years per account.
    let stock_trajectories: Vec<Vec<f64>> = accounts
        .iter()
        .map(|account| match account.asset_class {
            AssetClass::Stocks => historical.sample_annual_returns(horizon, &mut rng, initial_regime),
            _ => Vec::new(),
        })
        .collect();

    let mut trace: Vec<YearRecord> = Vec::with_capacity(horizon);
    let mut failed = false;
    let mut phase = RunPhase::Stepping;

    for year in 0..horizon {
        let age = plan.current_age + year as u32;
        let stock_multipliers: Vec<f64> = stock_trajectories
            .iter()
            .map(|trajectory| trajectory.get(year).copied().unwrap_or(1.0))
            .collect();

        let record = simulate_year(plan, tax_tables, rmd_table, &mut accounts, &stock_multipliers, age)?;
        failed = record.failed;
        phase = advance_phase(phase, failed);
        trace.push(record);
        if failed {
            break;
        }
    }

    // §4.8: both `Stepping` and `Depleted` resolve to the terminal
    // `Finalized` state once the batch is done driving this run; `Depleted`
    // never steps back to `Stepping`.
    debug_assert!(matches!(phase, RunPhase::Stepping | RunPhase::Depleted));
    debug_assert!(phase == RunPhase::Depleted || !failed);

    let final_total = trace.last().map(|r| r.accounts.iter().map(|a| a.end_balance).sum()).unwrap_or_else(|| {
        plan.accounts.iter().map(|a| a.starting_balance).sum()
    });

    Ok(RunResult { trace, final_total, success: !failed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::historical_returns::HistoricalReturnService;
    use crate::model::{
        Account, AccountId, AssetClass, Expense, ExpenseId, FilingStatus, MarketRegime, StateTaxRegime,
        TaxTreatment,
    };

    fn simple_plan() -> Plan {
        Plan {
            current_age: 65,
            planning_horizon_years: 10,
            filing_status: FilingStatus::Single,
            state_tax: StateTaxRegime::None,
            accounts: vec![
                Account {
                    id: AccountId(1),
                    name: "stocks".into(),
                    tax_treatment: TaxTreatment::TaxableBrokerage,
                    asset_class: AssetClass::Stocks,
                    starting_balance: 500_000.0,
                    annual_return_rate: None,
                    gains_fraction: Some(0.6),
                },
                Account {
                    id: AccountId(2),
                    name: "cash".into(),
                    tax_treatment: TaxTreatment::CashSavings,
                    asset_class: AssetClass::Savings,
                    starting_balance: 50_000.0,
                    annual_return_rate: Some(0.01),
                    gains_fraction: None,
                },
            ],
            income_sources: vec![],
            expenses: vec![Expense {
                id: ExpenseId(1),
                name: "living".into(),
                annual_amount: 40_000.0,
                start_age: 65,
                end_age: 100,
                inflation_rate: 0.03,
            }],
        }
    }

    #[test]
    fn same_seed_and_index_reproduce_identical_runs() {
        let plan = simple_plan();
        let historical = HistoricalReturnService::from_default().unwrap();
        let rmd_table = RmdTable::irs_uniform_lifetime_2024();
        let tax_tables = TaxTables::reference_2024();

        let run_a =
            run_single(&plan, &historical, &rmd_table, &tax_tables, MarketRegime::None, 42, 7).unwrap();
        let run_b =
            run_single(&plan, &historical, &rmd_table, &tax_tables, MarketRegime::None, 42, 7).unwrap();

        assert_eq!(run_a.final_total, run_b.final_total);
        assert_eq!(run_a.trace.len(), run_b.trace.len());
        for (a, b) in run_a.trace.iter().zip(run_b.trace.iter()) {
            assert_eq!(a.age, b.age);
            assert!((a.accounts[0].end_balance - b.accounts[0].end_balance).abs() < 1e-9);
        }
    }

    #[test]
    fn depleted_phase_is_one_way() {
        let depleted = advance_phase(RunPhase::Stepping, true);
        assert_eq!(depleted, RunPhase::Depleted);
        // Even a subsequent "successful" year can't walk it back to Stepping.
        assert_eq!(advance_phase(depleted, false), RunPhase::Depleted);
    }

    #[test]
    fn surviving_year_keeps_stepping() {
        assert_eq!(advance_phase(RunPhase::Stepping, false), RunPhase::Stepping);
    }

    #[test]
    fn different_run_index_diverges() {
        let plan = simple_plan();
        let historical = HistoricalReturnService::from_default().unwrap();
        let rmd_table = RmdTable::irs_uniform_lifetime_2024();
        let tax_tables = TaxTables::reference_2024();

        let run_a =
            run_single(&plan, &historical, &rmd_table, &tax_tables, MarketRegime::None, 42, 1).unwrap();
        let run_b =
            run_single(&plan, &historical, &rmd_table, &tax_tables, MarketRegime::None, 42, 2).unwrap();

        assert_ne!(run_a.final_total, run_b.final_total);
    }

    #[test]
    fn trace_never_exceeds_horizon() {
        let plan = simple_plan();
        let historical = HistoricalReturnService::from_default().unwrap();
        let rmd_table = RmdTable::irs_uniform_lifetime_2024();
        let tax_tables = TaxTables::reference_2024();

        let run =
            run_single(&plan, &historical, &rmd_table, &tax_tables, MarketRegime::None, 1, 0).unwrap();
        assert!(run.trace.len() <= plan.planning_horizon_years as usize);
    }

    #[test]
    fn bear_regime_tends_to_reduce_final_outcome() {
        let plan = simple_plan();
        let historical = HistoricalReturnService::from_default().unwrap();
        let rmd_table = RmdTable::irs_uniform_lifetime_2024();
        let tax_tables = TaxTables::reference_2024();

        let mut bear_total = 0.0;
        let mut bull_total = 0.0;
        for run_index in 0..30 {
            let bear =
                run_single(&plan, &historical, &rmd_table, &tax_tables, MarketRegime::Bear, 99, run_index)
                    .unwrap();
            let bull =
                run_single(&plan, &historical, &rmd_table, &tax_tables, MarketRegime::Bull, 99, run_index)
                    .unwrap();
            bear_total += bear.final_total;
            bull_total += bull.final_total;
        }
        assert!(bear_total < bull_total);
    }
}
