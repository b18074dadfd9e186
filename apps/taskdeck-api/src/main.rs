use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = taskdeck_api::Args::parse();
	taskdeck_api::run(args).await
}
