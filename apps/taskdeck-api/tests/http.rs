use std::sync::Arc;

use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use tower::util::ServiceExt;
use uuid::Uuid;

use taskdeck_api::{routes, state::AppState};
use taskdeck_config::{
	AuthProviderConfig, Config, EmbeddingProviderConfig, ObjectStoreConfig, Postgres,
	SuggestionProviderConfig,
};
use taskdeck_service::{
	AuthProvider, BoxFuture, EmbeddingProvider, ObjectStore, Providers, SuggestionProvider,
};
use taskdeck_testkit::TestDatabase;

const VECTOR_DIM: u32 = 4;
const TEST_TOKEN: &str = "test-token";

struct StubProviders {
	user_id: Uuid,
}

impl EmbeddingProvider for StubProviders {
	fn embed<'a>(
		&'a self,
		_: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		let vectors = texts.iter().map(|_| vec![0.5, 0.5, 0.5, 0.5]).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

impl SuggestionProvider for StubProviders {
	fn suggest<'a>(
		&'a self,
		_: &'a SuggestionProviderConfig,
		task_title: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<String>>> {
		let suggestions = vec![format!("Outline {task_title}")];

		Box::pin(async move { Ok(suggestions) })
	}
}

impl AuthProvider for StubProviders {
	fn sign_up<'a>(
		&'a self,
		_: &'a AuthProviderConfig,
		email: &'a str,
		_: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<taskdeck_providers::auth::AuthSession>> {
		let session = taskdeck_providers::auth::AuthSession {
			access_token: TEST_TOKEN.to_string(),
			user: taskdeck_providers::auth::AuthUser {
				id: self.user_id,
				email: email.to_string(),
			},
		};

		Box::pin(async move { Ok(session) })
	}

	fn sign_in<'a>(
		&'a self,
		cfg: &'a AuthProviderConfig,
		email: &'a str,
		password: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<taskdeck_providers::auth::AuthSession>>> {
		let session = self.sign_up(cfg, email, password);

		Box::pin(async move { Ok(Some(session.await?)) })
	}

	fn sign_out<'a>(
		&'a self,
		_: &'a AuthProviderConfig,
		_: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async { Ok(()) })
	}

	fn current_user<'a>(
		&'a self,
		_: &'a AuthProviderConfig,
		token: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<taskdeck_providers::auth::AuthUser>>> {
		let user = (token == TEST_TOKEN).then(|| taskdeck_providers::auth::AuthUser {
			id: self.user_id,
			email: "tester@example.com".to_string(),
		});

		Box::pin(async move { Ok(user) })
	}
}

impl ObjectStore for StubProviders {
	fn upload<'a>(
		&'a self,
		_: &'a ObjectStoreConfig,
		_: &'a str,
		_: &'a str,
		_: &'a [u8],
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async { Ok(()) })
	}

	fn remove<'a>(
		&'a self,
		_: &'a ObjectStoreConfig,
		_: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async { Ok(()) })
	}
}

fn test_config(dsn: String) -> Config {
	let raw = include_str!("../../../packages/taskdeck-config/tests/fixtures/sample_config.toml");
	let mut config: Config = toml::from_str::<toml::Value>(raw)
		.expect("Failed to parse sample config.")
		.try_into()
		.expect("Failed to deserialize sample config.");

	config.storage.postgres = Postgres { dsn, pool_max_conns: 1 };
	config.storage.vector_dim = VECTOR_DIM;
	config.providers.embedding.dimensions = VECTOR_DIM;

	config
}

async fn test_state(test_db: &TestDatabase) -> AppState {
	let config = test_config(test_db.dsn().to_string());
	let stub = Arc::new(StubProviders { user_id: Uuid::new_v4() });
	let providers = Providers::new(stub.clone(), stub.clone(), stub.clone(), stub);

	AppState::with_providers(config, providers)
		.await
		.expect("Failed to initialize app state.")
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Failed to parse response.")
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TASKDECK_PG_DSN to run."]
async fn health_ok() {
	let Some(base_dsn) = taskdeck_testkit::env_dsn() else {
		eprintln!("Skipping HTTP tests; set TASKDECK_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let app = routes::router(test_state(&test_db).await);
	let response = app
		.oneshot(
			Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TASKDECK_PG_DSN to run."]
async fn missing_bearer_token_is_401_with_json_body() {
	let Some(base_dsn) = taskdeck_testkit::env_dsn() else {
		eprintln!("Skipping HTTP tests; set TASKDECK_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let app = routes::router(test_state(&test_db).await);
	let response = app
		.oneshot(
			Request::builder()
				.uri("/v1/tasks")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /v1/tasks.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let json = read_json(response).await;

	assert_eq!(json["error_code"], "unauthenticated");
	assert!(json["message"].is_string());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TASKDECK_PG_DSN to run."]
async fn create_list_and_search_over_http() {
	let Some(base_dsn) = taskdeck_testkit::env_dsn() else {
		eprintln!("Skipping HTTP tests; set TASKDECK_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let state = test_state(&test_db).await;

	let response = routes::router(state.clone())
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/tasks")
				.header("authorization", format!("Bearer {TEST_TOKEN}"))
				.header("content-type", "application/json")
				.body(Body::from(r#"{"title":"Write report","priority":"high"}"#))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to create task.");

	assert_eq!(response.status(), StatusCode::CREATED);

	let created = read_json(response).await;

	assert_eq!(created["title"], "Write report");
	assert_eq!(created["status"], "pending");

	let task_id = created["id"].as_str().expect("task id").to_string();
	let embed_payload = serde_json::json!({ "taskId": task_id, "title": "Write report" });
	let response = routes::router(state.clone())
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/functions/generate-task-embedding")
				.header("authorization", format!("Bearer {TEST_TOKEN}"))
				.header("content-type", "application/json")
				.body(Body::from(embed_payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to embed task.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(read_json(response).await["success"], true);

	let response = routes::router(state.clone())
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/functions/smart-search")
				.header("authorization", format!("Bearer {TEST_TOKEN}"))
				.header("content-type", "application/json")
				.body(Body::from(r#"{"query":"report"}"#))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to search.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response.headers().get("access-control-allow-origin").map(|v| v.to_str().unwrap_or("")),
		Some("*"),
	);

	let json = read_json(response).await;

	assert_eq!(json["tasks"][0]["title"], "Write report");

	let similarity = json["tasks"][0]["similarity"].as_f64().expect("similarity");

	assert!((0.0..=1.0).contains(&similarity));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TASKDECK_PG_DSN to run."]
async fn picture_uploads_accept_large_images_up_to_the_cap() {
	let Some(base_dsn) = taskdeck_testkit::env_dsn() else {
		eprintln!("Skipping HTTP tests; set TASKDECK_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let state = test_state(&test_db).await;

	// A 3 MB image sits above axum's stock body limit but under the cap.
	let response = routes::router(state.clone())
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/profile/picture?filename=avatar.png")
				.header("authorization", format!("Bearer {TEST_TOKEN}"))
				.header("content-type", "image/png")
				.body(Body::from(vec![0_u8; 3 * 1024 * 1024]))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to upload picture.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;

	assert!(json["profile_picture_url"].as_str().expect("url").ends_with(".png"));

	// Over the cap: the domain verdict, as JSON, not a bare 413.
	let response = routes::router(state)
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/profile/picture?filename=huge.png")
				.header("authorization", format!("Bearer {TEST_TOKEN}"))
				.header("content-type", "image/png")
				.body(Body::from(vec![0_u8; 6 * 1024 * 1024]))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to upload picture.");

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

	let json = read_json(response).await;

	assert_eq!(json["error_code"], "validation");
	assert!(json["message"].is_string());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TASKDECK_PG_DSN to run."]
async fn suggestions_conflict_once_subtasks_exist() {
	let Some(base_dsn) = taskdeck_testkit::env_dsn() else {
		eprintln!("Skipping HTTP tests; set TASKDECK_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let state = test_state(&test_db).await;
	let response = routes::router(state.clone())
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/tasks")
				.header("authorization", format!("Bearer {TEST_TOKEN}"))
				.header("content-type", "application/json")
				.body(Body::from(r#"{"title":"Plan launch","priority":"medium"}"#))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to create task.");
	let task_id = read_json(response).await["id"].as_str().expect("task id").to_string();

	let response = routes::router(state.clone())
		.oneshot(
			Request::builder()
				.method("POST")
				.uri(format!("/v1/tasks/{task_id}/subtasks"))
				.header("authorization", format!("Bearer {TEST_TOKEN}"))
				.header("content-type", "application/json")
				.body(Body::from(r#"{"title":"Book venue"}"#))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to create subtask.");

	assert_eq!(response.status(), StatusCode::CREATED);

	let response = routes::router(state)
		.oneshot(
			Request::builder()
				.method("POST")
				.uri(format!("/v1/tasks/{task_id}/suggestions"))
				.header("authorization", format!("Bearer {TEST_TOKEN}"))
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call suggestions.");

	assert_eq!(response.status(), StatusCode::CONFLICT);
	assert_eq!(read_json(response).await["error_code"], "conflict");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
