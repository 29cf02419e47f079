//! Aggregator (§4.7): folds a batch of independent [`RunResult`]s into a
//! success rate, cross-sectional percentile series, and three
//! representative-run detail bundles (lower/median/upper).

use crate::model::{
    AccountBalancePoint, AggregateResult, AnnualDetailPoint, Band, BandAccountTimeline,
    BandAnnualDetail, BandExpenseDetail, BandIncomeDetail, BandReturnDetail, Plan, PortfolioPercentile,
    ReturnDetailPoint, RunConfig, RunResult,
};

/// Value of the `pct`-th percentile (0..100) over `sorted`, a sorted
/// ascending slice, via linear interpolation between order statistics.
fn interpolated_percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let position = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Rank-order index for a percentile `pct` over `n` ranked items, per §4.7's
/// representative-run selection: `round(pct/100 * (n-1))`.
fn rank_index(pct: f64, n: usize) -> usize {
    ((pct / 100.0) * (n.saturating_sub(1)) as f64).round() as usize
}

/// Runs ordered by final portfolio total ascending, ties broken by smaller
/// original run index (§4.7).
fn rank_runs_by_final_total(runs: &[RunResult]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..runs.len()).collect();
    indices.sort_by(|&a, &b| {
        runs[a]
            .final_total
            .partial_cmp(&runs[b].final_total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    indices
}

/// Fold `runs` into the full aggregate result (§6 entry point's return
/// shape).
pub fn aggregate(plan: &Plan, config: &RunConfig, runs: &[RunResult]) -> AggregateResult {
    let success_rate = if runs.is_empty() {
        0.0
    } else {
        runs.iter().filter(|r| r.success).count() as f64 / runs.len() as f64
    };

    let portfolio_timeline = plan
        .ages()
        .map(|age| {
            let mut totals: Vec<f64> = runs.iter().map(|r| r.total_at_age(age)).collect();
            totals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            PortfolioPercentile {
                age,
                p_lower: interpolated_percentile(&totals, config.lower_pct as f64),
                p50: interpolated_percentile(&totals, 50.0),
                p_upper: interpolated_percentile(&totals, config.upper_pct as f64),
            }
        })
        .collect();

    let ranked = rank_runs_by_final_total(runs);
    let n = runs.len();
    let bands = if n == 0 {
        Vec::new()
    } else {
        vec![
            (Band::Lower, ranked[rank_index(config.lower_pct as f64, n)]),
            (Band::Median, ranked[rank_index(50.0, n)]),
            (Band::Upper, ranked[rank_index(config.upper_pct as f64, n)]),
        ]
    };

    let mut account_timeline_by_band = Vec::new();
    let mut annual_detail_by_band = Vec::new();
    let mut income_detail_by_band = Vec::new();
    let mut expense_detail_by_band = Vec::new();
    let mut return_detail_by_band = Vec::new();

    for (band, run_index) in bands {
        let run = &runs[run_index];

        let account_points = run
            .trace
            .iter()
            .flat_map(|record| {
                record.accounts.iter().map(move |account| AccountBalancePoint {
                    account_id: account.account_id,
                    age: record.age,
                    start_balance: account.start_balance,
                    end_balance: account.end_balance,
                })
            })
            .collect();
        account_timeline_by_band.push(BandAccountTimeline { band, run_index, points: account_points });

        let annual_points = run
            .trace
            .iter()
            .map(|record| AnnualDetailPoint {
                age: record.age,
                total_required_distributions: record.total_required_distributions,
                net_cash_need: record.net_cash_need,
                tax: record.tax,
                shortfall: record.shortfall,
            })
            .collect();
        annual_detail_by_band.push(BandAnnualDetail { band, run_index, points: annual_points });

        let income_points = run.trace.iter().map(|record| (record.age, record.incomes.clone())).collect();
        income_detail_by_band.push(BandIncomeDetail { band, run_index, points: income_points });

        let expense_points = run.trace.iter().map(|record| (record.age, record.expenses.clone())).collect();
        expense_detail_by_band.push(BandExpenseDetail { band, run_index, points: expense_points });

        let return_points = run
            .trace
            .iter()
            .flat_map(|record| {
                record.accounts.iter().map(move |account| ReturnDetailPoint {
                    account_id: account.account_id,
                    age: record.age,
                    growth_rate: account.growth_rate,
                })
            })
            .collect();
        return_detail_by_band.push(BandReturnDetail { band, run_index, points: return_points });
    }

    AggregateResult {
        success_rate,
        portfolio_timeline,
        account_timeline_by_band,
        annual_detail_by_band,
        income_detail_by_band,
        expense_detail_by_band,
        return_detail_by_band,
    }
}
