use radar_core::{RadarError, RadarResult};
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> RadarResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )
    .map_err(|e| RadarError::Store(e.to_string()))
}
