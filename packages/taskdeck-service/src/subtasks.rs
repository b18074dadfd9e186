use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use taskdeck_domain::task;
use taskdeck_storage::{models::SubtaskRow, subtasks, tasks};

use crate::{Error, Result, TaskdeckService, tasks::task_not_found, time_serde};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskItem {
	pub id: Uuid,
	pub task_id: Uuid,
	pub title: String,
	#[serde(with = "time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time_serde")]
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct ListSubtasksResponse {
	pub subtasks: Vec<SubtaskItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubtaskRequest {
	pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubtaskTitleRequest {
	pub title: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteSubtaskResponse {
	pub deleted: bool,
}

impl TaskdeckService {
	/// Oldest first, so the checklist keeps the order it was written in.
	pub async fn list_subtasks(&self, token: &str, task_id: Uuid) -> Result<ListSubtasksResponse> {
		let user = self.require_user(token).await?;

		if tasks::fetch_task(&self.db, user.id, task_id).await?.is_none() {
			return Err(task_not_found());
		}

		let rows = subtasks::list_subtasks(&self.db, user.id, task_id).await?;
		let subtasks = rows.into_iter().map(subtask_item).collect();

		Ok(ListSubtasksResponse { subtasks })
	}

	pub async fn create_subtask(
		&self,
		token: &str,
		task_id: Uuid,
		request: &CreateSubtaskRequest,
	) -> Result<SubtaskItem> {
		let user = self.require_user(token).await?;
		let title = task::validate_title(&request.title)?;

		if tasks::fetch_task(&self.db, user.id, task_id).await?.is_none() {
			return Err(task_not_found());
		}

		let now = OffsetDateTime::now_utc();
		let row = SubtaskRow {
			subtask_id: Uuid::new_v4(),
			task_id,
			owner_id: user.id,
			title: title.to_string(),
			created_at: now,
			updated_at: now,
		};

		subtasks::insert_subtask(&self.db, &row).await?;

		Ok(subtask_item(row))
	}

	pub async fn update_subtask_title(
		&self,
		token: &str,
		subtask_id: Uuid,
		request: &UpdateSubtaskTitleRequest,
	) -> Result<SubtaskItem> {
		let user = self.require_user(token).await?;
		let title = task::validate_title(&request.title)?;
		let now = OffsetDateTime::now_utc();
		let affected =
			subtasks::update_subtask_title(&self.db, user.id, subtask_id, title, now).await?;

		if affected == 0 {
			return Err(subtask_not_found());
		}

		let row = subtasks::fetch_subtask(&self.db, user.id, subtask_id).await?;

		row.map(subtask_item).ok_or_else(subtask_not_found)
	}

	pub async fn delete_subtask(
		&self,
		token: &str,
		subtask_id: Uuid,
	) -> Result<DeleteSubtaskResponse> {
		let user = self.require_user(token).await?;
		let affected = subtasks::delete_subtask(&self.db, user.id, subtask_id).await?;

		if affected == 0 {
			return Err(subtask_not_found());
		}

		Ok(DeleteSubtaskResponse { deleted: true })
	}
}

fn subtask_not_found() -> Error {
	Error::NotFound { message: "Subtask not found.".to_string() }
}

fn subtask_item(row: SubtaskRow) -> SubtaskItem {
	SubtaskItem {
		id: row.subtask_id,
		task_id: row.task_id,
		title: row.title,
		created_at: row.created_at,
		updated_at: row.updated_at,
	}
}
