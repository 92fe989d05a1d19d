use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::DbError;

/// Opens (creating if needed) the sqlite database at `db_path` and applies
/// WAL tuning on first connection per path: WAL journaling, NORMAL sync,
/// a large negative (KiB-counted) page cache, and a generous busy timeout
/// so the single background writer never trips a competing reader's lock.
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool, DbError> {
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DbError::Io(e.to_string()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    apply_pragmas(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database for tests; same schema, none of the WAL tuning
/// matters for an ephemeral connection.
pub async fn setup_test_database() -> Result<SqlitePool, DbError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    create_schema(&pool).await?;
    Ok(pool)
}

async fn apply_pragmas(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::query("PRAGMA journal_mode=WAL").execute(pool).await?;
    sqlx::query("PRAGMA synchronous=NORMAL").execute(pool).await?;
    sqlx::query("PRAGMA cache_size=-64000").execute(pool).await?;
    sqlx::query("PRAGMA busy_timeout=30000").execute(pool).await?;
    Ok(())
}

async fn create_schema(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS conversation_history (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id  TEXT NOT NULL,
            role        TEXT NOT NULL,
            message     TEXT NOT NULL,
            tts_provider TEXT,
            voice       TEXT,
            created_at  TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_conversation_history_session \
         ON conversation_history(session_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS request_metrics (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id      TEXT NOT NULL,
            handshake_ms    INTEGER,
            llm_ms          INTEGER,
            tts_ms          INTEGER,
            total_ms        INTEGER,
            tool_call_count INTEGER NOT NULL DEFAULT 0,
            fallback_used   INTEGER NOT NULL DEFAULT 0,
            error           TEXT,
            created_at      TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}
