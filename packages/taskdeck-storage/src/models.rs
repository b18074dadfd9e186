use time::OffsetDateTime;
use uuid::Uuid;

/// A row of `tasks`. The `embedding` column is intentionally absent: it is
/// opaque to clients and only the worker and search queries touch it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
	pub task_id: Uuid,
	pub owner_id: Uuid,
	pub title: String,
	pub priority: String,
	pub status: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

/// Task projection produced by semantic search, carrying the raw cosine
/// similarity as computed in SQL.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskSearchRow {
	pub task_id: Uuid,
	pub owner_id: Uuid,
	pub title: String,
	pub priority: String,
	pub status: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub similarity: f32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubtaskRow {
	pub subtask_id: Uuid,
	pub task_id: Uuid,
	pub owner_id: Uuid,
	pub title: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserProfileRow {
	pub user_id: Uuid,
	pub name: String,
	pub profile_picture_url: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmbeddingOutboxEntry {
	pub outbox_id: Uuid,
	pub task_id: Uuid,
	pub status: String,
	pub attempts: i32,
	pub last_error: Option<String>,
	pub available_at: OffsetDateTime,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
