use qdrant_client::qdrant::{
	CreateCollectionBuilder, Distance, VectorParamsBuilder, VectorsConfigBuilder,
};

use crate::Result;

pub const DENSE_VECTOR_NAME: &str = "dense";

pub struct ContactIndex {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl ContactIndex {
	pub fn new(cfg: &rolo_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Creates the contact collection when it is missing. Existing collections
	/// are left as they are, whatever their parameters.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(());
		}

		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DENSE_VECTOR_NAME,
			VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
		);

		let builder =
			CreateCollectionBuilder::new(self.collection.clone()).vectors_config(vectors_config);

		self.client.create_collection(builder).await?;

		Ok(())
	}
}
