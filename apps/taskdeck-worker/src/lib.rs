pub mod worker;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = taskdeck_config::load(&args.config)?;
	let filter = EnvFilter::try_new(&config.service.log_level)
		.unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = taskdeck_storage::db::Db::connect(&config.storage.postgres).await?;
	db.ensure_schema(config.storage.vector_dim).await?;

	let state = worker::WorkerState {
		db,
		embedding: config.providers.embedding,
		vector_dim: config.storage.vector_dim,
	};

	worker::run_worker(state).await
}
