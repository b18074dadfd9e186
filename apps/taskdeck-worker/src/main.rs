use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = taskdeck_worker::Args::parse();
	taskdeck_worker::run(args).await
}
