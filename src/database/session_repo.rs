use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

const SQL_LOAD_SESSION_VALUE: &str = r#"
SELECT value
FROM session_values
WHERE session_id = ?1 AND key = ?2
LIMIT 1
"#;

const SQL_UPSERT_SESSION_VALUE: &str = r#"
INSERT INTO session_values (session_id, key, value)
VALUES (?1, ?2, ?3)
ON CONFLICT (session_id, key) DO UPDATE SET
  value = excluded.value,
  updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
"#;

const SQL_CLAIM_SESSION_VALUE: &str = r#"
INSERT INTO session_values (session_id, key, value)
VALUES (?1, ?2, ?3)
ON CONFLICT (session_id, key) DO UPDATE SET
  value = excluded.value,
  updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
WHERE session_values.updated_at < ?4
"#;

const SQL_DELETE_STALE_SESSION_VALUES: &str = r#"
DELETE FROM session_values
WHERE updated_at < ?1
"#;

const SQL_DELETE_SESSION_VALUE: &str = r#"
DELETE FROM session_values
WHERE session_id = ?1 AND key = ?2
"#;

pub async fn load_session_value(
    pool: &SqlitePool,
    session_id: &str,
    key: &str,
) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar::<_, String>(SQL_LOAD_SESSION_VALUE)
        .bind(session_id)
        .bind(key)
        .fetch_optional(pool)
        .await
}

pub async fn upsert_session_value(
    pool: &SqlitePool,
    session_id: &str,
    key: &str,
    value: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_SESSION_VALUE)
        .bind(session_id)
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_session_value(
    pool: &SqlitePool,
    session_id: &str,
    key: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_SESSION_VALUE)
        .bind(session_id)
        .bind(key)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Writes the value only if the key is absent or was last written before
/// `stale_before`. Returns whether this caller now holds the key.
pub async fn claim_session_value(
    pool: &SqlitePool,
    session_id: &str,
    key: &str,
    value: &str,
    stale_before: DateTime<Utc>,
) -> sqlx::Result<bool> {
    let res = sqlx::query(SQL_CLAIM_SESSION_VALUE)
        .bind(session_id)
        .bind(key)
        .bind(value)
        .bind(sqlite_timestamp(stale_before))
        .execute(pool)
        .await?;
    Ok(res.rows_affected() == 1)
}

/// Drops every value, across all sessions, not written since `older_than`.
pub async fn delete_stale_session_values(
    pool: &SqlitePool,
    older_than: DateTime<Utc>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_STALE_SESSION_VALUES)
        .bind(sqlite_timestamp(older_than))
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Same text layout as the `updated_at` column default, so plain string
/// comparison orders them.
fn sqlite_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
