//! AI-suggested subtasks for a task title.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskdeck_domain::task;
use taskdeck_storage::{subtasks, tasks};

use crate::{Error, Result, TaskdeckService, tasks::task_not_found};

#[derive(Debug, Deserialize)]
pub struct GenerateSubtasksRequest {
	#[serde(rename = "taskTitle")]
	pub task_title: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
	pub subtasks: Vec<String>,
}

impl TaskdeckService {
	/// Suggests subtasks for a stored task. Refused once the task already
	/// has subtasks; suggestions are a starting point, not a merge.
	pub async fn generate_subtasks(&self, token: &str, task_id: Uuid) -> Result<SuggestionsResponse> {
		let user = self.require_user(token).await?;
		let Some(task) = tasks::fetch_task(&self.db, user.id, task_id).await? else {
			return Err(task_not_found());
		};

		if subtasks::count_subtasks(&self.db, user.id, task_id).await? > 0 {
			return Err(Error::Conflict {
				message: "This task already has subtasks.".to_string(),
			});
		}

		self.suggest_for_title(token, &task.title).await
	}

	/// Stateless variant keyed on a raw title. Powers the same endpoint the
	/// dashboard calls while a task is still being drafted.
	pub async fn suggest_for_title(&self, token: &str, task_title: &str) -> Result<SuggestionsResponse> {
		self.require_user(token).await?;

		let title = task::validate_title(task_title)?;
		let suggestions = self
			.providers
			.suggestions
			.suggest(&self.cfg.providers.suggestions, title)
			.await
			.map_err(|err| Error::Provider { message: err.to_string() })?;

		tracing::debug!(count = suggestions.len(), "Subtask suggestions generated.");

		Ok(SuggestionsResponse { subtasks: suggestions })
	}
}
