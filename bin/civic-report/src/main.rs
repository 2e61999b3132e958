//! # civic-report Binary
//!
//! The entry point that assembles the application based on compile-time features.

mod settings;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use cr_api::handlers::AppState;
use cr_api::middleware::{cors_policy, standard_middleware};
use cr_core::{KeyValueStore, ReportStore};
use settings::Settings;

// Feature-gated imports: the backend is chosen at compile time
#[cfg(feature = "store-sqlite")]
use cr_store_sqlite::SqliteKvStore;

#[cfg(all(feature = "store-local", not(feature = "store-sqlite")))]
use cr_store_local::LocalFileStore;

#[cfg(not(any(feature = "store-local", feature = "store-sqlite")))]
compile_error!("enable one storage backend: `store-local` or `store-sqlite`");

/// SQLite wins when both backends are compiled in.
#[cfg(feature = "store-sqlite")]
async fn open_backend(settings: &Settings) -> anyhow::Result<Box<dyn KeyValueStore>> {
    let store = SqliteKvStore::new(&settings.storage.database_url)
        .await
        .with_context(|| format!("opening {}", settings.storage.database_url))?;
    Ok(Box::new(store))
}

#[cfg(all(feature = "store-local", not(feature = "store-sqlite")))]
async fn open_backend(settings: &Settings) -> anyhow::Result<Box<dyn KeyValueStore>> {
    log::info!("file store at {}", settings.storage.data_dir.display());
    Ok(Box::new(LocalFileStore::new(settings.storage.data_dir.clone())))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load().context("loading settings")?;

    // 1. Initialize the storage backend
    let backend = open_backend(&settings).await?;

    // 2. Wrap it in the store that serializes every change
    let store = ReportStore::new(backend, settings.aggregator.clone())
        .context("invalid aggregator settings")?;
    log::info!(
        "merging same-tag reports within {} m",
        store.config().merge_radius_m
    );

    // 3. Shared state for the handlers
    let state = web::Data::new(AppState { store });
    let origins = settings.server.allowed_origins.clone();

    log::info!(
        "civic-report starting on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(standard_middleware())
            .wrap(cors_policy(&origins))
            .configure(cr_api::configure_routes)
    })
    .bind((settings.server.host.as_str(), settings.server.port))?
    .run()
    .await?;

    Ok(())
}
