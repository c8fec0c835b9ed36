use std::sync::Arc;

use rolo_service::RoloService;
use rolo_storage::{db::Db, qdrant::ContactIndex};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RoloService>,
}
impl AppState {
	pub async fn new(config: rolo_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.storage.qdrant.vector_dim).await?;

		let index = ContactIndex::new(&config.storage.qdrant)?;

		index.ensure_collection().await?;

		let service = RoloService::new(config, db, index);

		Ok(Self { service: Arc::new(service) })
	}
}
