use axum::{
	Json, Router,
	body::Bytes,
	extract::{DefaultBodyLimit, Path, Query, State},
	http::{HeaderMap, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{delete, get, patch, post, put},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use taskdeck_service::{
	CreateSubtaskRequest, CreateTaskRequest, CredentialsRequest, DeleteSubtaskResponse,
	DeleteTaskResponse, EmbedTaskRequest, EmbedTaskResponse, Error as ServiceError,
	GenerateSubtasksRequest, ListSubtasksResponse, ListTasksResponse, ProfileResponse,
	SearchRequest, SearchResponse, SessionResponse, SubtaskItem, SuggestionsResponse, TaskItem,
	UpdateNameRequest, UpdatePriorityRequest, UpdateStatusRequest, UpdateSubtaskTitleRequest,
	UploadPictureRequest, UploadPictureResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	// Sized above `upload.max_bytes` so an oversized picture reaches the
	// domain gate and gets the JSON 422 instead of a bare 413.
	let picture_body_limit = state.service.cfg.upload.max_bytes as usize * 2;

	Router::new()
		.route("/health", get(health))
		.route("/v1/auth/signup", post(sign_up))
		.route("/v1/auth/signin", post(sign_in))
		.route("/v1/auth/signout", post(sign_out))
		.route("/v1/tasks", get(list_tasks).post(create_task))
		.route("/v1/tasks/{task_id}", delete(delete_task))
		.route("/v1/tasks/{task_id}/status", patch(update_status))
		.route("/v1/tasks/{task_id}/priority", patch(update_priority))
		.route("/v1/tasks/{task_id}/subtasks", get(list_subtasks).post(create_subtask))
		.route("/v1/tasks/{task_id}/suggestions", post(suggest_subtasks))
		.route("/v1/subtasks/{subtask_id}", patch(update_subtask).delete(delete_subtask))
		.route("/v1/profile", get(fetch_profile))
		.route("/v1/profile/name", put(update_name))
		.route(
			"/v1/profile/picture",
			post(upload_picture).layer(DefaultBodyLimit::max(picture_body_limit)),
		)
		.route("/v1/functions/generate-subtasks", post(fn_generate_subtasks))
		.route("/v1/functions/generate-task-embedding", post(fn_generate_embedding))
		.route("/v1/functions/smart-search", post(fn_smart_search))
		.layer(CorsLayer::permissive())
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn sign_up(
	State(state): State<AppState>,
	Json(payload): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
	let response = state.service.sign_up(&payload).await?;
	Ok(Json(response))
}

async fn sign_in(
	State(state): State<AppState>,
	Json(payload): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
	let response = state.service.sign_in(&payload).await?;
	Ok(Json(response))
}

async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
	state.service.sign_out(&bearer(&headers)).await?;
	Ok(StatusCode::NO_CONTENT)
}

async fn list_tasks(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<ListTasksResponse>, ApiError> {
	let response = state.service.list_tasks(&bearer(&headers)).await?;
	Ok(Json(response))
}

async fn create_task(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskItem>), ApiError> {
	let response = state.service.create_task(&bearer(&headers), &payload).await?;
	Ok((StatusCode::CREATED, Json(response)))
}

async fn update_status(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(task_id): Path<Uuid>,
	Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<TaskItem>, ApiError> {
	let response = state.service.update_task_status(&bearer(&headers), task_id, &payload).await?;
	Ok(Json(response))
}

async fn update_priority(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(task_id): Path<Uuid>,
	Json(payload): Json<UpdatePriorityRequest>,
) -> Result<Json<TaskItem>, ApiError> {
	let response = state.service.update_task_priority(&bearer(&headers), task_id, &payload).await?;
	Ok(Json(response))
}

async fn delete_task(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(task_id): Path<Uuid>,
) -> Result<Json<DeleteTaskResponse>, ApiError> {
	let response = state.service.delete_task(&bearer(&headers), task_id).await?;
	Ok(Json(response))
}

async fn list_subtasks(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(task_id): Path<Uuid>,
) -> Result<Json<ListSubtasksResponse>, ApiError> {
	let response = state.service.list_subtasks(&bearer(&headers), task_id).await?;
	Ok(Json(response))
}

async fn create_subtask(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(task_id): Path<Uuid>,
	Json(payload): Json<CreateSubtaskRequest>,
) -> Result<(StatusCode, Json<SubtaskItem>), ApiError> {
	let response = state.service.create_subtask(&bearer(&headers), task_id, &payload).await?;
	Ok((StatusCode::CREATED, Json(response)))
}

async fn suggest_subtasks(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(task_id): Path<Uuid>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
	let response = state.service.generate_subtasks(&bearer(&headers), task_id).await?;
	Ok(Json(response))
}

async fn update_subtask(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(subtask_id): Path<Uuid>,
	Json(payload): Json<UpdateSubtaskTitleRequest>,
) -> Result<Json<SubtaskItem>, ApiError> {
	let response =
		state.service.update_subtask_title(&bearer(&headers), subtask_id, &payload).await?;
	Ok(Json(response))
}

async fn delete_subtask(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(subtask_id): Path<Uuid>,
) -> Result<Json<DeleteSubtaskResponse>, ApiError> {
	let response = state.service.delete_subtask(&bearer(&headers), subtask_id).await?;
	Ok(Json(response))
}

async fn fetch_profile(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ApiError> {
	let response = state.service.fetch_profile(&bearer(&headers)).await?;
	Ok(Json(response))
}

async fn update_name(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<UpdateNameRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
	let response = state.service.update_profile_name(&bearer(&headers), &payload).await?;
	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct PictureQuery {
	filename: String,
}

async fn upload_picture(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<PictureQuery>,
	body: Bytes,
) -> Result<Json<UploadPictureResponse>, ApiError> {
	let content_type = headers
		.get(header::CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.unwrap_or_default()
		.to_string();
	let request = UploadPictureRequest {
		filename: query.filename,
		content_type,
		bytes: body.to_vec(),
	};
	let response = state.service.upload_profile_picture(&bearer(&headers), request).await?;
	Ok(Json(response))
}

async fn fn_generate_subtasks(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<GenerateSubtasksRequest>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
	let response =
		state.service.suggest_for_title(&bearer(&headers), &payload.task_title).await?;
	Ok(Json(response))
}

async fn fn_generate_embedding(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<EmbedTaskRequest>,
) -> Result<Json<EmbedTaskResponse>, ApiError> {
	let response = state.service.generate_task_embedding(&bearer(&headers), &payload).await?;
	Ok(Json(response))
}

async fn fn_smart_search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search_tasks(&bearer(&headers), &payload).await?;
	Ok(Json(response))
}

fn bearer(headers: &HeaderMap) -> String {
	headers
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.strip_prefix("Bearer "))
		.unwrap_or_default()
		.to_string()
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, error_code) = match &err {
			ServiceError::Unauthenticated { .. } => (StatusCode::UNAUTHORIZED, "unauthenticated"),
			ServiceError::InvalidRequest { .. } =>
				(StatusCode::UNPROCESSABLE_ENTITY, "validation"),
			ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
			ServiceError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
			ServiceError::Provider { .. } => (StatusCode::BAD_GATEWAY, "provider"),
			ServiceError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
		};

		if status.is_server_error() {
			tracing::error!("Request failed: {err}.");
		}

		Self { status, error_code, message: err.to_string() }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code.to_string(), message: self.message };

		(self.status, Json(body)).into_response()
	}
}
