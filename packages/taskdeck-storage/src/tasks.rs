use sqlx::{Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, db::Db, models::{TaskRow, TaskSearchRow}};

const TASK_COLUMNS: &str = "task_id, owner_id, title, priority, status, created_at, updated_at";

/// Insert happens inside the caller's transaction so the embedding outbox
/// entry commits atomically with the task.
pub async fn insert_task_tx(tx: &mut Transaction<'_, Postgres>, task: &TaskRow) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO tasks (task_id, owner_id, title, priority, status, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7)",
	)
	.bind(task.task_id)
	.bind(task.owner_id)
	.bind(task.title.as_str())
	.bind(task.priority.as_str())
	.bind(task.status.as_str())
	.bind(task.created_at)
	.bind(task.updated_at)
	.execute(&mut **tx)
	.await?;

	Ok(())
}

pub async fn list_tasks(db: &Db, owner_id: Uuid) -> Result<Vec<TaskRow>> {
	let rows = sqlx::query_as::<_, TaskRow>(&format!(
		"SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1 ORDER BY created_at DESC",
	))
	.bind(owner_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn fetch_task(db: &Db, owner_id: Uuid, task_id: Uuid) -> Result<Option<TaskRow>> {
	let row = sqlx::query_as::<_, TaskRow>(&format!(
		"SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = $1 AND owner_id = $2",
	))
	.bind(task_id)
	.bind(owner_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

/// Unscoped lookup for the embedding worker, which acts on behalf of the
/// system rather than a session.
pub async fn fetch_task_any_owner(db: &Db, task_id: Uuid) -> Result<Option<TaskRow>> {
	let row = sqlx::query_as::<_, TaskRow>(&format!(
		"SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = $1",
	))
	.bind(task_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

pub async fn update_task_status(
	db: &Db,
	owner_id: Uuid,
	task_id: Uuid,
	status: &str,
	now: OffsetDateTime,
) -> Result<u64> {
	let result = sqlx::query(
		"UPDATE tasks SET status = $1, updated_at = $2 WHERE task_id = $3 AND owner_id = $4",
	)
	.bind(status)
	.bind(now)
	.bind(task_id)
	.bind(owner_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected())
}

pub async fn update_task_priority(
	db: &Db,
	owner_id: Uuid,
	task_id: Uuid,
	priority: &str,
	now: OffsetDateTime,
) -> Result<u64> {
	let result = sqlx::query(
		"UPDATE tasks SET priority = $1, updated_at = $2 WHERE task_id = $3 AND owner_id = $4",
	)
	.bind(priority)
	.bind(now)
	.bind(task_id)
	.bind(owner_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected())
}

/// Subtasks cascade in the schema; one statement removes the whole tree.
pub async fn delete_task(db: &Db, owner_id: Uuid, task_id: Uuid) -> Result<u64> {
	let result = sqlx::query("DELETE FROM tasks WHERE task_id = $1 AND owner_id = $2")
		.bind(task_id)
		.bind(owner_id)
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected())
}

/// Writes the vector produced for a task title. Leaves `updated_at` alone:
/// embedding generation is not a user-visible edit.
pub async fn write_task_embedding(db: &Db, task_id: Uuid, vector_text: &str) -> Result<u64> {
	let result = sqlx::query("UPDATE tasks SET embedding = $1::text::vector WHERE task_id = $2")
		.bind(vector_text)
		.bind(task_id)
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected())
}

/// Ranks the owner's embedded tasks against a query vector. Tasks whose
/// embedding has not been generated yet simply do not participate.
pub async fn search_tasks(
	db: &Db,
	owner_id: Uuid,
	vector_text: &str,
	top_k: u32,
) -> Result<Vec<TaskSearchRow>> {
	let rows = sqlx::query_as::<_, TaskSearchRow>(&format!(
		"\
SELECT {TASK_COLUMNS}, (1 - (embedding <=> $1::text::vector))::real AS similarity
FROM tasks
WHERE owner_id = $2 AND embedding IS NOT NULL
ORDER BY embedding <=> $1::text::vector ASC
LIMIT $3",
	))
	.bind(vector_text)
	.bind(owner_id)
	.bind(i64::from(top_k))
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}
