use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod worker;

#[derive(Debug, Parser)]
#[command(
	version = rolo_cli::VERSION,
	rename_all = "kebab",
	styles = rolo_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = rolo_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = rolo_storage::db::Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.storage.qdrant.vector_dim).await?;

	let index = rolo_storage::qdrant::ContactIndex::new(&config.storage.qdrant)?;

	index.ensure_collection().await?;
	tracing::info!("Embedding worker started.");

	let state = worker::WorkerState { db, index, embedding: config.providers.embedding };

	worker::run_worker(state).await
}
