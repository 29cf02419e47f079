use retirement_core::Plan;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedPlan {
    pub id: String,
    pub name: String,
    pub plan: Plan,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanListItem {
    pub id: String,
    pub name: String,
    pub current_age: u32,
    pub planning_horizon_years: u32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub name: String,
    pub plan: Plan,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    pub plan: Option<Plan>,
}

/// Query parameters accepted by `POST /api/simulate/{plan_id}` (§6).
/// Regime is a label (`bear`/`bull`/`none`) rather than the engine's enum
/// directly, since query strings are untyped at the HTTP boundary.
#[derive(Debug, Deserialize)]
pub struct SimulateQuery {
    #[serde(default = "default_num_runs")]
    pub num_runs: usize,
    #[serde(default = "default_lower_percentile")]
    pub lower_percentile: i32,
    #[serde(default = "default_upper_percentile")]
    pub upper_percentile: i32,
    #[serde(default = "default_regime")]
    pub initial_market_regime: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_num_runs() -> usize {
    1_000
}
fn default_lower_percentile() -> i32 {
    10
}
fn default_upper_percentile() -> i32 {
    90
}
fn default_regime() -> String {
    "none".to_string()
}

#[derive(Debug, Deserialize)]
pub struct DebugQuery {
    pub band: String,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub plan_ids: Vec<String>,
    #[serde(default = "default_num_runs")]
    pub num_runs: usize,
    #[serde(default = "default_lower_percentile")]
    pub lower_percentile: i32,
    #[serde(default = "default_upper_percentile")]
    pub upper_percentile: i32,
    #[serde(default = "default_regime")]
    pub initial_market_regime: String,
}
