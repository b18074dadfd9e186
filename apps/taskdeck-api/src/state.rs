use std::sync::Arc;

use taskdeck_service::{Providers, TaskdeckService};
use taskdeck_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<TaskdeckService>,
}
impl AppState {
	pub async fn new(config: taskdeck_config::Config) -> color_eyre::Result<Self> {
		Self::with_providers(config, Providers::default()).await
	}

	/// Same wiring with the external providers swapped out; router tests
	/// stub them here.
	pub async fn with_providers(
		config: taskdeck_config::Config,
		providers: Providers,
	) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.storage.vector_dim).await?;

		let service = TaskdeckService::with_providers(config, db, providers);

		Ok(Self { service: Arc::new(service) })
	}
}
