pub mod app;
pub mod asaas_client;
pub mod config;
pub mod db;
pub mod error;
pub mod http_client;
pub mod setup;

use std::sync::Arc;

use crate::adapters::persistence::PostgresPersistence;

pub async fn postgres_persistence(database_url: &str) -> anyhow::Result<Arc<PostgresPersistence>> {
    let pool = db::init_db(database_url).await?;
    Ok(Arc::new(PostgresPersistence::new(pool)))
}
