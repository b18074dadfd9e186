use reqwest::{Client, RequestBuilder, StatusCode, header::CONTENT_TYPE};
use serde::{Deserialize, de::DeserializeOwned};
use uuid::Uuid;

use taskdeck_domain::{
	task::{Priority, Status},
	upload::{self, UploadInput},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Transport(#[from] reqwest::Error),
	#[error("{message}")]
	Api { status: u16, error_code: String, message: String },
	/// Input refused locally; the request was never built.
	#[error("{message}")]
	Rejected { message: String },
}
impl Error {
	/// Message fit for inline display next to the interaction that failed.
	pub fn user_message(&self) -> String {
		match self {
			Self::Transport(_) => "Could not reach the server. Please try again.".to_string(),
			Self::Api { message, .. } | Self::Rejected { message } => message.clone(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
	pub id: Uuid,
	pub title: String,
	pub priority: Priority,
	pub status: Status,
	pub created_at: String,
	pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
	#[serde(flatten)]
	pub task: Task,
	pub similarity: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subtask {
	pub id: Uuid,
	pub task_id: Uuid,
	pub title: String,
	pub created_at: String,
	pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
	pub id: Uuid,
	pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
	pub access_token: String,
	pub user: SessionUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
	pub user_id: Uuid,
	pub email: String,
	pub name: String,
	pub profile_picture_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug, Deserialize)]
struct TasksBody {
	tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
	tasks: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SubtasksBody {
	subtasks: Vec<Subtask>,
}

#[derive(Debug, Deserialize)]
struct SuggestionsBody {
	subtasks: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PictureBody {
	profile_picture_url: String,
}

/// Thin client over the taskdeck HTTP API. Holds the bearer token of the
/// active session; view models never see raw HTTP.
pub struct ApiClient {
	base: String,
	http: Client,
	token: Option<String>,
}
impl ApiClient {
	pub fn new(base: impl Into<String>) -> Self {
		Self { base: base.into().trim_end_matches('/').to_string(), http: Client::new(), token: None }
	}

	pub fn token(&self) -> Option<&str> {
		self.token.as_deref()
	}

	pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<Session> {
		let session: Session = self
			.send(self.http.post(self.url("/v1/auth/signup")).json(
				&serde_json::json!({ "email": email, "password": password }),
			))
			.await?;

		self.token = Some(session.access_token.clone());

		Ok(session)
	}

	pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Session> {
		let session: Session = self
			.send(self.http.post(self.url("/v1/auth/signin")).json(
				&serde_json::json!({ "email": email, "password": password }),
			))
			.await?;

		self.token = Some(session.access_token.clone());

		Ok(session)
	}

	pub async fn sign_out(&mut self) -> Result<()> {
		let request = self.http.post(self.url("/v1/auth/signout"));
		let result = self.send_no_body(request).await;

		// Local session state drops regardless of what the server said.
		self.token = None;

		result
	}

	pub async fn list_tasks(&self) -> Result<Vec<Task>> {
		let body: TasksBody = self.send(self.http.get(self.url("/v1/tasks"))).await?;

		Ok(body.tasks)
	}

	pub async fn create_task(&self, title: &str, priority: Priority) -> Result<Task> {
		self.send(self.http.post(self.url("/v1/tasks")).json(
			&serde_json::json!({ "title": title, "priority": priority }),
		))
		.await
	}

	pub async fn update_status(&self, task_id: Uuid, status: Status) -> Result<Task> {
		self.send(
			self.http
				.patch(self.url(&format!("/v1/tasks/{task_id}/status")))
				.json(&serde_json::json!({ "status": status })),
		)
		.await
	}

	pub async fn update_priority(&self, task_id: Uuid, priority: Priority) -> Result<Task> {
		self.send(
			self.http
				.patch(self.url(&format!("/v1/tasks/{task_id}/priority")))
				.json(&serde_json::json!({ "priority": priority })),
		)
		.await
	}

	pub async fn delete_task(&self, task_id: Uuid) -> Result<()> {
		self.send_no_body(self.http.delete(self.url(&format!("/v1/tasks/{task_id}")))).await
	}

	pub async fn list_subtasks(&self, task_id: Uuid) -> Result<Vec<Subtask>> {
		let body: SubtasksBody =
			self.send(self.http.get(self.url(&format!("/v1/tasks/{task_id}/subtasks")))).await?;

		Ok(body.subtasks)
	}

	pub async fn create_subtask(&self, task_id: Uuid, title: &str) -> Result<Subtask> {
		self.send(
			self.http
				.post(self.url(&format!("/v1/tasks/{task_id}/subtasks")))
				.json(&serde_json::json!({ "title": title })),
		)
		.await
	}

	pub async fn update_subtask_title(&self, subtask_id: Uuid, title: &str) -> Result<Subtask> {
		self.send(
			self.http
				.patch(self.url(&format!("/v1/subtasks/{subtask_id}")))
				.json(&serde_json::json!({ "title": title })),
		)
		.await
	}

	pub async fn delete_subtask(&self, subtask_id: Uuid) -> Result<()> {
		self.send_no_body(self.http.delete(self.url(&format!("/v1/subtasks/{subtask_id}")))).await
	}

	/// Suggestions for a stored task. The server refuses with a conflict
	/// when the task already has subtasks.
	pub async fn suggest_subtasks(&self, task_id: Uuid) -> Result<Vec<String>> {
		let body: SuggestionsBody = self
			.send(self.http.post(self.url(&format!("/v1/tasks/{task_id}/suggestions"))))
			.await?;

		Ok(body.subtasks)
	}

	pub async fn smart_search(&self, query: &str) -> Result<Vec<SearchHit>> {
		let body: SearchBody = self
			.send(
				self.http
					.post(self.url("/v1/functions/smart-search"))
					.json(&serde_json::json!({ "query": query })),
			)
			.await?;

		Ok(body.tasks)
	}

	pub async fn fetch_profile(&self) -> Result<Profile> {
		self.send(self.http.get(self.url("/v1/profile"))).await
	}

	pub async fn update_name(&self, name: &str) -> Result<Profile> {
		self.send(
			self.http
				.put(self.url("/v1/profile/name"))
				.json(&serde_json::json!({ "name": name })),
		)
		.await
	}

	/// Non-images and files over the size cap are refused here, before any
	/// request is built.
	pub async fn upload_picture(
		&self,
		filename: &str,
		content_type: &str,
		bytes: Vec<u8>,
	) -> Result<String> {
		let input = UploadInput { content_type, size_bytes: bytes.len() as u64 };

		if let Err(code) = upload::validate_upload(&input, upload::DEFAULT_MAX_BYTES) {
			return Err(Error::Rejected { message: code.user_message().to_string() });
		}

		let body: PictureBody = self
			.send(
				self.http
					.post(self.url("/v1/profile/picture"))
					.query(&[("filename", filename)])
					.header(CONTENT_TYPE, content_type)
					.body(bytes),
			)
			.await?;

		Ok(body.profile_picture_url)
	}

	fn url(&self, path: &str) -> String {
		format!("{}{path}", self.base)
	}

	async fn send<T>(&self, request: RequestBuilder) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.dispatch(request).await?;

		Ok(response.json().await?)
	}

	async fn send_no_body(&self, request: RequestBuilder) -> Result<()> {
		self.dispatch(request).await?;

		Ok(())
	}

	async fn dispatch(&self, mut request: RequestBuilder) -> Result<reqwest::Response> {
		if let Some(token) = &self.token {
			request = request.bearer_auth(token);
		}

		let response = request.send().await?;
		let status = response.status();

		if status.is_success() {
			return Ok(response);
		}

		Err(api_error(status, response.json::<ErrorBody>().await.ok()))
	}
}

fn api_error(status: StatusCode, body: Option<ErrorBody>) -> Error {
	match body {
		Some(body) => Error::Api {
			status: status.as_u16(),
			error_code: body.error_code,
			message: body.message,
		},
		None => Error::Api {
			status: status.as_u16(),
			error_code: "unknown".to_string(),
			message: format!("The server responded with status {status}."),
		},
	}
}
