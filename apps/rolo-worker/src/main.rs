use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = rolo_worker::Args::parse();

	rolo_worker::run(args).await
}
