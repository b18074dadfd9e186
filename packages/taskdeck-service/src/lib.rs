pub mod profile;
pub mod search;
pub mod session;
pub mod subtasks;
pub mod suggest;
pub mod tasks;
pub mod time_serde;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

pub use error::{Error, Result};
pub use profile::{ProfileResponse, UpdateNameRequest, UploadPictureRequest, UploadPictureResponse};
pub use search::{SearchRequest, SearchResponse, SearchResultItem};
pub use session::{CredentialsRequest, SessionResponse, SessionUser};
pub use subtasks::{
	CreateSubtaskRequest, DeleteSubtaskResponse, ListSubtasksResponse, SubtaskItem,
	UpdateSubtaskTitleRequest,
};
pub use suggest::{GenerateSubtasksRequest, SuggestionsResponse};
pub use tasks::{
	CreateTaskRequest, DeleteTaskResponse, EmbedTaskRequest, EmbedTaskResponse, ListTasksResponse,
	TaskItem, UpdatePriorityRequest, UpdateStatusRequest,
};

use taskdeck_config::{
	AuthProviderConfig, Config, EmbeddingProviderConfig, ObjectStoreConfig,
	SuggestionProviderConfig,
};
use taskdeck_providers::{
	auth::{self, AuthSession, AuthUser},
	embedding, objects, suggest as suggest_provider,
};
use taskdeck_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait SuggestionProvider
where
	Self: Send + Sync,
{
	fn suggest<'a>(
		&'a self,
		cfg: &'a SuggestionProviderConfig,
		task_title: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<String>>>;
}

pub trait AuthProvider
where
	Self: Send + Sync,
{
	fn sign_up<'a>(
		&'a self,
		cfg: &'a AuthProviderConfig,
		email: &'a str,
		password: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<AuthSession>>;

	/// `Ok(None)` means the provider rejected the credentials.
	fn sign_in<'a>(
		&'a self,
		cfg: &'a AuthProviderConfig,
		email: &'a str,
		password: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<AuthSession>>>;

	fn sign_out<'a>(
		&'a self,
		cfg: &'a AuthProviderConfig,
		token: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn current_user<'a>(
		&'a self,
		cfg: &'a AuthProviderConfig,
		token: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<AuthUser>>>;
}

pub trait ObjectStore
where
	Self: Send + Sync,
{
	fn upload<'a>(
		&'a self,
		cfg: &'a ObjectStoreConfig,
		key: &'a str,
		content_type: &'a str,
		bytes: &'a [u8],
	) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn remove<'a>(
		&'a self,
		cfg: &'a ObjectStoreConfig,
		key: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub suggestions: Arc<dyn SuggestionProvider>,
	pub auth: Arc<dyn AuthProvider>,
	pub objects: Arc<dyn ObjectStore>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl SuggestionProvider for DefaultProviders {
	fn suggest<'a>(
		&'a self,
		cfg: &'a SuggestionProviderConfig,
		task_title: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<String>>> {
		Box::pin(suggest_provider::suggest_subtasks(cfg, task_title))
	}
}

impl AuthProvider for DefaultProviders {
	fn sign_up<'a>(
		&'a self,
		cfg: &'a AuthProviderConfig,
		email: &'a str,
		password: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<AuthSession>> {
		Box::pin(auth::sign_up(cfg, email, password))
	}

	fn sign_in<'a>(
		&'a self,
		cfg: &'a AuthProviderConfig,
		email: &'a str,
		password: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<AuthSession>>> {
		Box::pin(auth::sign_in(cfg, email, password))
	}

	fn sign_out<'a>(
		&'a self,
		cfg: &'a AuthProviderConfig,
		token: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(auth::sign_out(cfg, token))
	}

	fn current_user<'a>(
		&'a self,
		cfg: &'a AuthProviderConfig,
		token: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<AuthUser>>> {
		Box::pin(auth::current_user(cfg, token))
	}
}

impl ObjectStore for DefaultProviders {
	fn upload<'a>(
		&'a self,
		cfg: &'a ObjectStoreConfig,
		key: &'a str,
		content_type: &'a str,
		bytes: &'a [u8],
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(objects::upload(cfg, key, content_type, bytes.to_vec()))
	}

	fn remove<'a>(
		&'a self,
		cfg: &'a ObjectStoreConfig,
		key: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(objects::remove(cfg, key))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		suggestions: Arc<dyn SuggestionProvider>,
		auth: Arc<dyn AuthProvider>,
		objects: Arc<dyn ObjectStore>,
	) -> Self {
		Self { embedding, suggestions, auth, objects }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self {
			embedding: provider.clone(),
			suggestions: provider.clone(),
			auth: provider.clone(),
			objects: provider,
		}
	}
}

pub struct TaskdeckService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}
impl TaskdeckService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}

	/// Resolves the caller's bearer token into a user. Every operation goes
	/// through here; a missing or rejected token surfaces as
	/// `Error::Unauthenticated`, never a fault.
	pub(crate) async fn require_user(&self, token: &str) -> Result<AuthUser> {
		if token.trim().is_empty() {
			return Err(Error::Unauthenticated {
				message: "Please log in to continue.".to_string(),
			});
		}

		let user = self
			.providers
			.auth
			.current_user(&self.cfg.auth, token)
			.await
			.map_err(|err| Error::Provider { message: err.to_string() })?;

		user.ok_or_else(|| Error::Unauthenticated {
			message: "Your session has expired. Please log in again.".to_string(),
		})
	}
}

pub(crate) fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

/// Cosine similarity of arbitrary vectors lands in [-1, 1]; the UI promises
/// [0, 1], so scores are clamped rather than rescaled.
pub(crate) fn clamp_unit(score: f32) -> f32 {
	if !score.is_finite() {
		return 0.0;
	}

	score.clamp(0.0, 1.0)
}
