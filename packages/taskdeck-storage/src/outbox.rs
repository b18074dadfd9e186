use sqlx::{Postgres, Transaction};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Result, db::Db, models::EmbeddingOutboxEntry};

const OUTBOX_COLUMNS: &str =
	"outbox_id, task_id, status, attempts, last_error, available_at, created_at, updated_at";

/// Enqueued in the same transaction as the task insert so a confirmed
/// insert always has a tracked embedding job.
pub async fn enqueue_tx(
	tx: &mut Transaction<'_, Postgres>,
	task_id: Uuid,
	now: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO embedding_outbox (outbox_id, task_id, status, available_at, created_at, updated_at)
VALUES ($1, $2, 'PENDING', $3, $4, $5)",
	)
	.bind(Uuid::new_v4())
	.bind(task_id)
	.bind(now)
	.bind(now)
	.bind(now)
	.execute(&mut **tx)
	.await?;

	Ok(())
}

/// Claims the next due entry and leases it so concurrent workers skip it.
pub async fn claim_next(
	db: &Db,
	now: OffsetDateTime,
	lease: Duration,
) -> Result<Option<EmbeddingOutboxEntry>> {
	let mut tx = db.pool.begin().await?;
	let row = sqlx::query_as::<_, EmbeddingOutboxEntry>(&format!(
		"\
SELECT {OUTBOX_COLUMNS}
FROM embedding_outbox
WHERE status IN ('PENDING', 'FAILED') AND available_at <= $1
ORDER BY available_at ASC
LIMIT 1
FOR UPDATE SKIP LOCKED",
	))
	.bind(now)
	.fetch_optional(&mut *tx)
	.await?;
	let entry = if let Some(mut entry) = row {
		let lease_until = now + lease;

		sqlx::query(
			"UPDATE embedding_outbox SET available_at = $1, updated_at = $2 WHERE outbox_id = $3",
		)
		.bind(lease_until)
		.bind(now)
		.bind(entry.outbox_id)
		.execute(&mut *tx)
		.await?;

		entry.available_at = lease_until;
		entry.updated_at = now;

		Some(entry)
	} else {
		None
	};

	tx.commit().await?;

	Ok(entry)
}

pub async fn mark_done(db: &Db, outbox_id: Uuid, now: OffsetDateTime) -> Result<()> {
	sqlx::query(
		"\
UPDATE embedding_outbox
SET status = 'DONE', last_error = NULL, updated_at = $1
WHERE outbox_id = $2",
	)
	.bind(now)
	.bind(outbox_id)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn mark_failed(
	db: &Db,
	outbox_id: Uuid,
	attempts: i32,
	error: &str,
	backoff: Duration,
	now: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
UPDATE embedding_outbox
SET status = 'FAILED', attempts = $1, last_error = $2, available_at = $3, updated_at = $4
WHERE outbox_id = $5",
	)
	.bind(attempts)
	.bind(error)
	.bind(now + backoff)
	.bind(now)
	.bind(outbox_id)
	.execute(&db.pool)
	.await?;

	Ok(())
}
