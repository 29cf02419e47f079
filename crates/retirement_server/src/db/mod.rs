use rusqlite::Connection;

pub fn init_db(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS plans (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            plan_json TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // One row per plan: the last persisted aggregate result. Re-running a
    // plan overwrites its row rather than accumulating history (§6 "last
    // persisted result").
    conn.execute(
        "CREATE TABLE IF NOT EXISTS simulation_results (
            plan_id TEXT PRIMARY KEY,
            num_runs INTEGER NOT NULL,
            lower_pct INTEGER NOT NULL,
            upper_pct INTEGER NOT NULL,
            success_rate REAL NOT NULL,
            aggregate_json TEXT NOT NULL,
            ran_at TEXT NOT NULL,
            FOREIGN KEY (plan_id) REFERENCES plans(id) ON DELETE CASCADE
        )",
        [],
    )?;

    Ok(())
}
