//! Task CRUD plus the embedding hook that keeps semantic search current.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use taskdeck_domain::task::{self, Priority, Status};
use taskdeck_storage::{models::TaskRow, outbox, tasks};

use crate::{Error, Result, TaskdeckService, time_serde, vector_to_pg};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskItem {
	pub id: Uuid,
	pub title: String,
	pub priority: Priority,
	pub status: Status,
	#[serde(with = "time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time_serde")]
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
	pub tasks: Vec<TaskItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
	pub title: String,
	pub priority: Priority,
	/// Defaults to `pending` when omitted.
	#[serde(default)]
	pub status: Option<Status>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
	pub status: Status,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePriorityRequest {
	pub priority: Priority,
}

#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
	pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct EmbedTaskRequest {
	#[serde(rename = "taskId")]
	pub task_id: Uuid,
	#[serde(rename = "title")]
	pub task_title: String,
}

#[derive(Debug, Serialize)]
pub struct EmbedTaskResponse {
	pub success: bool,
}

impl TaskdeckService {
	/// Newest first, matching the dashboard ordering.
	pub async fn list_tasks(&self, token: &str) -> Result<ListTasksResponse> {
		let user = self.require_user(token).await?;
		let rows = tasks::list_tasks(&self.db, user.id).await?;
		let tasks = rows.into_iter().map(task_item).collect::<Result<Vec<_>>>()?;

		Ok(ListTasksResponse { tasks })
	}

	/// Inserts the task and enqueues its embedding job in one transaction.
	/// The task is usable immediately; search picks it up once the worker
	/// has embedded the title.
	pub async fn create_task(&self, token: &str, request: &CreateTaskRequest) -> Result<TaskItem> {
		let user = self.require_user(token).await?;
		let title = task::validate_title(&request.title)?;
		let now = OffsetDateTime::now_utc();
		let row = TaskRow {
			task_id: Uuid::new_v4(),
			owner_id: user.id,
			title: title.to_string(),
			priority: request.priority.as_str().to_string(),
			status: request.status.unwrap_or(Status::Pending).as_str().to_string(),
			created_at: now,
			updated_at: now,
		};
		let mut tx = self.db.pool.begin().await.map_err(taskdeck_storage::Error::from)?;

		tasks::insert_task_tx(&mut tx, &row).await?;
		outbox::enqueue_tx(&mut tx, row.task_id, now).await?;
		tx.commit().await.map_err(taskdeck_storage::Error::from)?;
		tracing::info!(task = %row.task_id, "Task created.");

		task_item(row)
	}

	pub async fn update_task_status(
		&self,
		token: &str,
		task_id: Uuid,
		request: &UpdateStatusRequest,
	) -> Result<TaskItem> {
		let user = self.require_user(token).await?;
		let now = OffsetDateTime::now_utc();
		let affected =
			tasks::update_task_status(&self.db, user.id, task_id, request.status.as_str(), now)
				.await?;

		if affected == 0 {
			return Err(task_not_found());
		}

		self.fetch_task_item(user.id, task_id).await
	}

	pub async fn update_task_priority(
		&self,
		token: &str,
		task_id: Uuid,
		request: &UpdatePriorityRequest,
	) -> Result<TaskItem> {
		let user = self.require_user(token).await?;
		let now = OffsetDateTime::now_utc();
		let affected =
			tasks::update_task_priority(&self.db, user.id, task_id, request.priority.as_str(), now)
				.await?;

		if affected == 0 {
			return Err(task_not_found());
		}

		self.fetch_task_item(user.id, task_id).await
	}

	pub async fn delete_task(&self, token: &str, task_id: Uuid) -> Result<DeleteTaskResponse> {
		let user = self.require_user(token).await?;
		let affected = tasks::delete_task(&self.db, user.id, task_id).await?;

		if affected == 0 {
			return Err(task_not_found());
		}

		tracing::info!(task = %task_id, "Task deleted.");

		Ok(DeleteTaskResponse { deleted: true })
	}

	/// Synchronous counterpart of the outbox worker, kept for the original
	/// function-call contract. Embeds the supplied title and writes the
	/// vector directly.
	pub async fn generate_task_embedding(
		&self,
		token: &str,
		request: &EmbedTaskRequest,
	) -> Result<EmbedTaskResponse> {
		let user = self.require_user(token).await?;
		let title = task::validate_title(&request.task_title)?;

		if tasks::fetch_task(&self.db, user.id, request.task_id).await?.is_none() {
			return Err(task_not_found());
		}

		let vectors = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &[title.to_string()])
			.await
			.map_err(|err| Error::Provider { message: err.to_string() })?;
		let Some(vector) = vectors.first() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		tasks::write_task_embedding(&self.db, request.task_id, &vector_to_pg(vector)).await?;

		Ok(EmbedTaskResponse { success: true })
	}

	async fn fetch_task_item(&self, owner_id: Uuid, task_id: Uuid) -> Result<TaskItem> {
		let row = tasks::fetch_task(&self.db, owner_id, task_id).await?.ok_or_else(task_not_found)?;

		task_item(row)
	}
}

pub(crate) fn task_not_found() -> Error {
	Error::NotFound { message: "Task not found.".to_string() }
}

pub(crate) fn task_item(row: TaskRow) -> Result<TaskItem> {
	Ok(TaskItem {
		id: row.task_id,
		title: row.title,
		priority: Priority::from_str(&row.priority)?,
		status: Status::from_str(&row.status)?,
		created_at: row.created_at,
		updated_at: row.updated_at,
	})
}
