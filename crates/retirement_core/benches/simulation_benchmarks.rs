//! Criterion benchmarks for the retirement simulation kernel.
//!
//! Run with: cargo bench -p retirement_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use retirement_core::config::PlanBuilder;
use retirement_core::model::{MarketRegime, Plan, RunConfig};
use retirement_core::simulation::simulate;

fn single_account_plan(horizon: u32) -> Plan {
    PlanBuilder::new(65, horizon)
        .taxable_stocks("Brokerage", 800_000.0, 0.65)
        .social_security("SS", 28_000.0, 67, 95)
        .expense("Living", 50_000.0, 65, 95, 0.025)
        .build()
}

fn multi_account_plan(horizon: u32) -> Plan {
    PlanBuilder::new(62, horizon)
        .taxable_stocks("Brokerage stocks", 500_000.0, 0.6)
        .taxable_bonds("Brokerage bonds", 150_000.0, 0.035)
        .traditional("401k", 400_000.0, 0.04)
        .traditional_stocks("IRA", 200_000.0)
        .cash_savings("Emergency fund", 30_000.0, 0.01)
        .social_security("SS", 32_000.0, 67, 95)
        .pension("Pension", 14_000.0, 62, 95)
        .expense("Living", 70_000.0, 62, 95, 0.03)
        .expense("Travel", 10_000.0, 62, 80, 0.02)
        .build()
}

fn bench_single_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_run_batch");
    for runs in [100usize, 1_000] {
        let plan = single_account_plan(30);
        let config = RunConfig { num_runs: runs, lower_pct: 10, upper_pct: 90, initial_regime: MarketRegime::None, seed: 42 };
        group.bench_with_input(BenchmarkId::new("single_account", runs), &runs, |b, _| {
            b.iter(|| black_box(simulate(&plan, &config).unwrap()));
        });
    }
    group.finish();
}

fn bench_multi_account_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_account_batch");
    for runs in [100usize, 1_000] {
        let plan = multi_account_plan(33);
        let config = RunConfig { num_runs: runs, lower_pct: 10, upper_pct: 90, initial_regime: MarketRegime::None, seed: 99 };
        group.bench_with_input(BenchmarkId::new("multi_account", runs), &runs, |b, _| {
            b.iter(|| black_box(simulate(&plan, &config).unwrap()));
        });
    }
    group.finish();
}

fn bench_regime_conditioned(c: &mut Criterion) {
    let mut group = c.benchmark_group("regime_conditioned");
    let plan = multi_account_plan(33);
    for regime in [MarketRegime::None, MarketRegime::Bear, MarketRegime::Bull] {
        let config = RunConfig { num_runs: 500, lower_pct: 10, upper_pct: 90, initial_regime: regime, seed: 7 };
        group.bench_with_input(BenchmarkId::new("regime", format!("{regime:?}")), &regime, |b, _| {
            b.iter(|| black_box(simulate(&plan, &config).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_run, bench_multi_account_batch, bench_regime_conditioned);
criterion_main!(benches);
