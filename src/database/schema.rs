use sqlx::SqlitePool;

const SQL_CREATE_SESSION_VALUES: &str = r#"
CREATE TABLE IF NOT EXISTS session_values (
  session_id TEXT NOT NULL,
  key TEXT NOT NULL,
  value TEXT NOT NULL,
  updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
  PRIMARY KEY (session_id, key)
)
"#;

const SQL_CREATE_DEVICE_TICKETS: &str = r#"
CREATE TABLE IF NOT EXISTS device_tickets (
  seq INTEGER PRIMARY KEY AUTOINCREMENT,
  device_id TEXT NOT NULL,
  ticket_id TEXT NOT NULL,
  record_json TEXT NOT NULL,
  saved_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)
"#;

const SQL_CREATE_DEVICE_TICKETS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_device_tickets_device
ON device_tickets (device_id, seq)
"#;

/// Creates the local tables backing session state and the per-device ticket
/// cache. Safe to run on every start.
pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    for sql in [
        SQL_CREATE_SESSION_VALUES,
        SQL_CREATE_DEVICE_TICKETS,
        SQL_CREATE_DEVICE_TICKETS_INDEX,
    ] {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}

/// Single-connection in-memory database with the schema applied. Each
/// connection to `sqlite::memory:` is its own database, so the pool must not
/// open a second one.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    ensure_schema(&pool).await.expect("schema");
    pool
}
