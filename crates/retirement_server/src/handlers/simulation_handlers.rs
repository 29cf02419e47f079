use axum::{
    Json,
    extract::{Path, Query, State},
};
use retirement_core::model::{AggregateResult, Band, MarketRegime, RunConfig};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::handlers::plan_handlers::{DbConn, load_plan};
use crate::models::{CompareRequest, DebugQuery, SimulateQuery};
use crate::validation;

fn build_config(num_runs: usize, lower: i32, upper: i32, regime: MarketRegime, seed: u64) -> RunConfig {
    RunConfig { num_runs, lower_pct: lower, upper_pct: upper, initial_regime: regime, seed }
}

async fn run_and_persist(db: &DbConn, plan_id: &str, config: RunConfig) -> ApiResult<AggregateResult> {
    let plan = {
        let conn = db.lock()?;
        load_plan(&conn, plan_id)?.plan
    };

    let plan_id_owned = plan_id.to_string();
    let config_owned = config.clone();
    let result = tokio::task::spawn_blocking(move || retirement_core::simulate(&plan, &config_owned))
        .await
        .map_err(|_| ApiError::Engine(retirement_core::EngineError::Cancelled))??;

    tracing::info!(
        plan_id = %plan_id_owned,
        num_runs = config.num_runs,
        success_rate = result.success_rate,
        "simulation batch completed"
    );

    let now = chrono::Utc::now().to_rfc3339();
    let aggregate_json = serde_json::to_string(&result)?;
    let conn = db.lock()?;
    conn.execute(
        "INSERT INTO simulation_results (plan_id, num_runs, lower_pct, upper_pct, success_rate, aggregate_json, ran_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(plan_id) DO UPDATE SET
            num_runs = excluded.num_runs,
            lower_pct = excluded.lower_pct,
            upper_pct = excluded.upper_pct,
            success_rate = excluded.success_rate,
            aggregate_json = excluded.aggregate_json,
            ran_at = excluded.ran_at",
        rusqlite::params![plan_id_owned, config.num_runs as i64, config.lower_pct, config.upper_pct, result.success_rate, aggregate_json, now],
    )?;

    Ok(result)
}

pub async fn simulate_plan(
    State(db): State<DbConn>,
    Path(plan_id): Path<String>,
    Query(query): Query<SimulateQuery>,
) -> ApiResult<Json<AggregateResult>> {
    let regime = validation::parse_regime(&query.initial_market_regime)?;
    let config = build_config(
        query.num_runs,
        query.lower_percentile,
        query.upper_percentile,
        regime,
        query.seed.unwrap_or_else(|| uuid::Uuid::new_v4().as_u128() as u64),
    );

    let result = run_and_persist(&db, &plan_id, config).await?;
    Ok(Json(result))
}

pub async fn get_last_result(
    State(db): State<DbConn>,
    Path(plan_id): Path<String>,
) -> ApiResult<Json<AggregateResult>> {
    let conn = db.lock()?;
    let mut stmt = conn.prepare("SELECT aggregate_json FROM simulation_results WHERE plan_id = ?1")?;
    let aggregate_json: String = stmt
        .query_row([&plan_id], |row| row.get(0))
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => ApiError::ResultNotFound(plan_id.clone()),
            _ => ApiError::from(e),
        })?;

    let result: AggregateResult = serde_json::from_str(&aggregate_json)?;
    Ok(Json(result))
}

/// Per-age trace of one band's representative run, assembled from the
/// persisted per-band detail vectors (§6 "debug" — no raw run trace is
/// stored, only what's already in the persisted aggregate shape).
#[derive(Debug, Serialize)]
pub struct BandDebugView {
    pub band: Band,
    pub run_index: usize,
    pub account_timeline: Vec<retirement_core::model::AccountBalancePoint>,
    pub annual_detail: Vec<retirement_core::model::AnnualDetailPoint>,
    pub income_detail: Vec<(u32, Vec<retirement_core::model::IncomeYearRecord>)>,
    pub expense_detail: Vec<(u32, Vec<retirement_core::model::ExpenseYearRecord>)>,
    pub return_detail: Vec<retirement_core::model::ReturnDetailPoint>,
}

pub async fn get_band_debug(
    State(db): State<DbConn>,
    Path(plan_id): Path<String>,
    Query(query): Query<DebugQuery>,
) -> ApiResult<Json<BandDebugView>> {
    let band = validation::parse_band(&query.band)?;

    let conn = db.lock()?;
    let mut stmt = conn.prepare("SELECT aggregate_json FROM simulation_results WHERE plan_id = ?1")?;
    let aggregate_json: String = stmt
        .query_row([&plan_id], |row| row.get(0))
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => ApiError::ResultNotFound(plan_id.clone()),
            _ => ApiError::from(e),
        })?;
    let result: AggregateResult = serde_json::from_str(&aggregate_json)?;

    let missing = || ApiError::ResultNotFound(plan_id.clone());
    let account_timeline =
        result.account_timeline_by_band.into_iter().find(|b| b.band == band).ok_or_else(missing)?;
    let annual_detail =
        result.annual_detail_by_band.into_iter().find(|b| b.band == band).ok_or_else(missing)?;
    let income_detail =
        result.income_detail_by_band.into_iter().find(|b| b.band == band).ok_or_else(missing)?;
    let expense_detail =
        result.expense_detail_by_band.into_iter().find(|b| b.band == band).ok_or_else(missing)?;
    let return_detail =
        result.return_detail_by_band.into_iter().find(|b| b.band == band).ok_or_else(missing)?;

    Ok(Json(BandDebugView {
        band,
        run_index: account_timeline.run_index,
        account_timeline: account_timeline.points,
        annual_detail: annual_detail.points,
        income_detail: income_detail.points,
        expense_detail: expense_detail.points,
        return_detail: return_detail.points,
    }))
}

#[derive(Debug, Serialize)]
pub struct ComparePlanResult {
    pub plan_id: String,
    pub result: AggregateResult,
}

pub async fn compare_plans(
    State(db): State<DbConn>,
    Json(req): Json<CompareRequest>,
) -> ApiResult<Json<Vec<ComparePlanResult>>> {
    validation::validate_compare_plan_ids(&req.plan_ids)?;
    let regime = validation::parse_regime(&req.initial_market_regime)?;

    let mut results = Vec::with_capacity(req.plan_ids.len());
    for plan_id in &req.plan_ids {
        let config = build_config(
            req.num_runs,
            req.lower_percentile,
            req.upper_percentile,
            regime,
            uuid::Uuid::new_v4().as_u128() as u64,
        );
        let result = run_and_persist(&db, plan_id, config).await?;
        results.push(ComparePlanResult { plan_id: plan_id.clone(), result });
    }

    Ok(Json(results))
}
