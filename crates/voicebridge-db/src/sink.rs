use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// One unit of durable work. Modeled as data rather than a closure so the
/// writer task stays a plain match, mirroring the original's
/// `_db_write_queue` of `(sql, params)` tuples.
#[derive(Debug)]
pub enum WriteJob {
    AppendHistory {
        session_id: String,
        role: String,
        message: String,
        tts_provider: Option<String>,
        voice: Option<String>,
    },
    RecordMetrics {
        session_id: String,
        handshake_ms: Option<i64>,
        llm_ms: Option<i64>,
        tts_ms: Option<i64>,
        total_ms: Option<i64>,
        tool_call_count: i64,
        fallback_used: bool,
        error: Option<String>,
    },
    /// Test-only: resolves once every job enqueued before it has been
    /// written, letting tests observe the writer without a sleep.
    #[doc(hidden)]
    Flush(oneshot::Sender<()>),
}

/// Handle producers hold to enqueue durable writes. Cloning is cheap
/// (wraps an `UnboundedSender`); `enqueue` never blocks on disk I/O.
#[derive(Clone)]
pub struct DurableSink {
    tx: mpsc::UnboundedSender<WriteJob>,
}

impl DurableSink {
    /// Spawns the background writer task and returns a handle to it. The
    /// task owns `pool` for its lifetime; producers only ever touch the
    /// channel.
    #[must_use]
    pub fn spawn(pool: SqlitePool) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(writer_loop(pool, rx));
        Self { tx }
    }

    pub fn enqueue(&self, job: WriteJob) {
        if self.tx.send(job).is_err() {
            warn!("durable sink writer task is gone; dropping write");
        }
    }

    pub fn append_history(
        &self,
        session_id: impl Into<String>,
        role: impl Into<String>,
        message: impl Into<String>,
        tts_provider: Option<String>,
        voice: Option<String>,
    ) {
        self.enqueue(WriteJob::AppendHistory {
            session_id: session_id.into(),
            role: role.into(),
            message: message.into(),
            tts_provider,
            voice,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record_metrics(
        &self,
        session_id: impl Into<String>,
        handshake_ms: Option<i64>,
        llm_ms: Option<i64>,
        tts_ms: Option<i64>,
        total_ms: Option<i64>,
        tool_call_count: i64,
        fallback_used: bool,
        error: Option<String>,
    ) {
        self.enqueue(WriteJob::RecordMetrics {
            session_id: session_id.into(),
            handshake_ms,
            llm_ms,
            tts_ms,
            total_ms,
            tool_call_count,
            fallback_used,
            error,
        });
    }

    /// Test helper: waits for the writer to have drained everything
    /// enqueued so far.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.enqueue(WriteJob::Flush(tx));
        let _ = rx.await;
    }
}

async fn writer_loop(pool: SqlitePool, mut rx: mpsc::UnboundedReceiver<WriteJob>) {
    while let Some(job) = rx.recv().await {
        if let Err(e) = handle_job(&pool, job).await {
            warn!("durable sink write failed, dropping: {e}");
        }
    }
}

async fn handle_job(pool: &SqlitePool, job: WriteJob) -> Result<(), sqlx::Error> {
    match job {
        WriteJob::AppendHistory { session_id, role, message, tts_provider, voice } => {
            sqlx::query(
                "INSERT INTO conversation_history \
                 (session_id, role, message, tts_provider, voice, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(session_id)
            .bind(role)
            .bind(message)
            .bind(tts_provider)
            .bind(voice)
            .bind(Utc::now().to_rfc3339())
            .execute(pool)
            .await?;
        }
        WriteJob::RecordMetrics {
            session_id,
            handshake_ms,
            llm_ms,
            tts_ms,
            total_ms,
            tool_call_count,
            fallback_used,
            error,
        } => {
            sqlx::query(
                "INSERT INTO request_metrics \
                 (session_id, handshake_ms, llm_ms, tts_ms, total_ms, tool_call_count, \
                  fallback_used, error, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(session_id)
            .bind(handshake_ms)
            .bind(llm_ms)
            .bind(tts_ms)
            .bind(total_ms)
            .bind(tool_call_count)
            .bind(i64::from(fallback_used))
            .bind(error)
            .bind(Utc::now().to_rfc3339())
            .execute(pool)
            .await?;
        }
        WriteJob::Flush(done) => {
            let _ = done.send(());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;

    #[tokio::test]
    async fn append_history_is_durable_after_flush() {
        let pool = setup_test_database().await.unwrap();
        let sink = DurableSink::spawn(pool.clone());

        sink.append_history("sess-1", "user", "hello", None, None);
        sink.flush().await;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversation_history")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
