//! Semantic task search over pgvector embeddings.

use serde::{Deserialize, Serialize};

use taskdeck_storage::tasks;

use crate::{Error, Result, TaskdeckService, clamp_unit, tasks::TaskItem, vector_to_pg};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
	pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResultItem {
	#[serde(flatten)]
	pub task: TaskItem,
	pub similarity: f32,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
	pub tasks: Vec<SearchResultItem>,
}

impl TaskdeckService {
	/// Embeds the query and ranks the caller's tasks by cosine similarity.
	/// Blank queries are rejected here; clients are expected to treat them
	/// as "clear the search" without calling in.
	pub async fn search_tasks(&self, token: &str, request: &SearchRequest) -> Result<SearchResponse> {
		let user = self.require_user(token).await?;
		let query = request.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Search query must not be empty.".to_string(),
			});
		}

		let vectors = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &[query.to_string()])
			.await
			.map_err(|err| Error::Provider { message: err.to_string() })?;
		let Some(vector) = vectors.first() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};
		let rows =
			tasks::search_tasks(&self.db, user.id, &vector_to_pg(vector), self.cfg.search.top_k)
				.await?;
		let results = rows
			.into_iter()
			.map(|row| {
				let similarity = clamp_unit(row.similarity);
				let task = crate::tasks::task_item(taskdeck_storage::models::TaskRow {
					task_id: row.task_id,
					owner_id: row.owner_id,
					title: row.title,
					priority: row.priority,
					status: row.status,
					created_at: row.created_at,
					updated_at: row.updated_at,
				})?;

				Ok(SearchResultItem { task, similarity })
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(SearchResponse { tasks: results })
	}
}
