use std::sync::Arc;

use repi_service::RepiService;
use repi_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RepiService>,
}
impl AppState {
	pub async fn new(config: repi_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.providers.embedding.dimensions).await?;

		let service = RepiService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}
}
