use std::sync::Arc;

use chrono::Duration;
use log::{info, warn};
use recipe_api::{
    config::Config, context::Context, memory::MemoryStore, server, store::ResourceStore, PgStore,
};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load()?;

    let store: Arc<dyn ResourceStore> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await?;
            info!("Connected to database");
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, data is kept in memory and lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let context = Context::new(
        store,
        &config.jwt_secret,
        Duration::minutes(config.session_lifetime_minutes),
    );

    let (address, serving) = warp::serve(server::routes(context)).bind_with_graceful_shutdown(
        config.bind_address,
        async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        },
    );

    info!("Recipe API listening on {address}");
    serving.await;

    Ok(())
}
