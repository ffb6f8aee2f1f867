mod api;
mod app;
mod config;
mod dashboard;
mod data;
mod db;
mod gemini;
mod generator;
mod models;
mod progress;
mod quiz;

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::Mutex;

use api::{app_router, ApiState};
use app::App;
use config::Config;
use db::{Db, MemoryStore, RecordStore, Repository};
use gemini::GeminiClient;
use generator::ContentGenerator;
use progress::ProgressStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let records: Arc<dyn RecordStore> = if config.database_url == "memory" {
        warn!("Using in-memory storage, progress will not survive a restart");
        Arc::new(MemoryStore::default())
    } else {
        Arc::new(Db::connect(&config.database_url).await?)
    };
    let store = ProgressStore::restore(Repository::new(records)).await?;

    let generator = ContentGenerator::new(
        config.api_key.clone(),
        config.model.clone(),
        Arc::new(GeminiClient::new(config.gemini_url.clone())),
    );
    if !generator.has_credential() {
        warn!("GEMINI_API_KEY is not set; lessons will show a placeholder");
    }

    let state = ApiState {
        app: Arc::new(Mutex::new(App::new(generator, store))),
    };

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("OmniLearn listening on http://{}", config.bind);
    axum::serve(listener, app_router(state)).await?;

    Ok(())
}
