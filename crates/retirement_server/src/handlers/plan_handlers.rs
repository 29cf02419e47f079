use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::validation;

pub type DbConn = std::sync::Arc<std::sync::Mutex<rusqlite::Connection>>;

pub async fn list_plans(State(db): State<DbConn>) -> ApiResult<Json<Vec<PlanListItem>>> {
    let conn = db.lock()?;
    let mut stmt = conn
        .prepare("SELECT id, name, plan_json, created_at, updated_at FROM plans ORDER BY updated_at DESC")?;

    let plans = stmt
        .query_map([], |row| {
            let plan_json: String = row.get(2)?;
            let plan: retirement_core::Plan =
                serde_json::from_str(&plan_json).unwrap_or_else(|_| empty_plan());
            Ok(PlanListItem {
                id: row.get(0)?,
                name: row.get(1)?,
                current_age: plan.current_age,
                planning_horizon_years: plan.planning_horizon_years,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(Json(plans))
}

fn empty_plan() -> retirement_core::Plan {
    retirement_core::PlanBuilder::new(0, 1).build()
}

pub async fn create_plan(
    State(db): State<DbConn>,
    Json(req): Json<CreatePlanRequest>,
) -> ApiResult<Json<SavedPlan>> {
    validation::validate_plan_name(&req.name)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let plan_json = serde_json::to_string(&req.plan)?;

    let conn = db.lock()?;
    conn.execute(
        "INSERT INTO plans (id, name, plan_json, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id, req.name, plan_json, now, now],
    )?;

    Ok(Json(SavedPlan { id, name: req.name, plan: req.plan, created_at: now.clone(), updated_at: now }))
}

pub async fn get_plan(State(db): State<DbConn>, Path(id): Path<String>) -> ApiResult<Json<SavedPlan>> {
    let conn = db.lock()?;
    Ok(Json(load_plan(&conn, &id)?))
}

pub async fn update_plan(
    State(db): State<DbConn>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePlanRequest>,
) -> ApiResult<Json<SavedPlan>> {
    let conn = db.lock()?;

    if let Some(ref name) = req.name {
        validation::validate_plan_name(name)?;
    }

    let existing = load_plan(&conn, &id)?;
    let name = req.name.unwrap_or(existing.name);
    let plan = req.plan.unwrap_or(existing.plan);
    let plan_json = serde_json::to_string(&plan)?;
    let now = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "UPDATE plans SET name = ?1, plan_json = ?2, updated_at = ?3 WHERE id = ?4",
        rusqlite::params![name, plan_json, now, id],
    )?;

    Ok(Json(SavedPlan { id, name, plan, created_at: existing.created_at, updated_at: now }))
}

pub async fn delete_plan(State(db): State<DbConn>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let conn = db.lock()?;
    let affected = conn.execute("DELETE FROM plans WHERE id = ?1", [&id])?;
    if affected == 0 { Err(ApiError::PlanNotFound(id)) } else { Ok(StatusCode::NO_CONTENT) }
}

pub(crate) fn load_plan(conn: &rusqlite::Connection, id: &str) -> ApiResult<SavedPlan> {
    let mut stmt =
        conn.prepare("SELECT id, name, plan_json, created_at, updated_at FROM plans WHERE id = ?1")?;

    stmt.query_row([id], |row| {
        let plan_json: String = row.get(2)?;
        let plan: retirement_core::Plan =
            serde_json::from_str(&plan_json).map_err(|_| rusqlite::Error::InvalidQuery)?;
        Ok(SavedPlan {
            id: row.get(0)?,
            name: row.get(1)?,
            plan,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    })
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => ApiError::PlanNotFound(id.to_string()),
        _ => ApiError::from(e),
    })
}
