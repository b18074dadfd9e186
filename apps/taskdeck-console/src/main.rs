use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = taskdeck_console::Args::parse();
	taskdeck_console::run(args).await
}
