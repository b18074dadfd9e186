use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, db::Db, models::SubtaskRow};

const SUBTASK_COLUMNS: &str = "subtask_id, task_id, owner_id, title, created_at, updated_at";

pub async fn list_subtasks(db: &Db, owner_id: Uuid, task_id: Uuid) -> Result<Vec<SubtaskRow>> {
	let rows = sqlx::query_as::<_, SubtaskRow>(&format!(
		"\
SELECT {SUBTASK_COLUMNS}
FROM subtasks
WHERE task_id = $1 AND owner_id = $2
ORDER BY created_at ASC",
	))
	.bind(task_id)
	.bind(owner_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn fetch_subtask(db: &Db, owner_id: Uuid, subtask_id: Uuid) -> Result<Option<SubtaskRow>> {
	let row = sqlx::query_as::<_, SubtaskRow>(&format!(
		"SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE subtask_id = $1 AND owner_id = $2",
	))
	.bind(subtask_id)
	.bind(owner_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

pub async fn insert_subtask(db: &Db, subtask: &SubtaskRow) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO subtasks (subtask_id, task_id, owner_id, title, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6)",
	)
	.bind(subtask.subtask_id)
	.bind(subtask.task_id)
	.bind(subtask.owner_id)
	.bind(subtask.title.as_str())
	.bind(subtask.created_at)
	.bind(subtask.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn update_subtask_title(
	db: &Db,
	owner_id: Uuid,
	subtask_id: Uuid,
	title: &str,
	now: OffsetDateTime,
) -> Result<u64> {
	let result = sqlx::query(
		"UPDATE subtasks SET title = $1, updated_at = $2 WHERE subtask_id = $3 AND owner_id = $4",
	)
	.bind(title)
	.bind(now)
	.bind(subtask_id)
	.bind(owner_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected())
}

pub async fn delete_subtask(db: &Db, owner_id: Uuid, subtask_id: Uuid) -> Result<u64> {
	let result = sqlx::query("DELETE FROM subtasks WHERE subtask_id = $1 AND owner_id = $2")
		.bind(subtask_id)
		.bind(owner_id)
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected())
}

pub async fn count_subtasks(db: &Db, owner_id: Uuid, task_id: Uuid) -> Result<i64> {
	let count: i64 =
		sqlx::query_scalar("SELECT count(*) FROM subtasks WHERE task_id = $1 AND owner_id = $2")
			.bind(task_id)
			.bind(owner_id)
			.fetch_one(&db.pool)
			.await?;

	Ok(count)
}
