use std::sync::Arc;

use clinic_controls::{
    auth::hash_access_token,
    config::{Config, StoreBackend},
    db,
    models::AppState,
    routes,
    store::{ClinicStore, MemoryStore, PgStore},
    tenant::Role,
};

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use anyhow::Context;
use axum::http::header;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

async fn open_store(cfg: &Config) -> anyhow::Result<Arc<dyn ClinicStore>> {
    match cfg.backend {
        StoreBackend::Postgres => {
            let url = cfg
                .database_url
                .as_deref()
                .context("DATABASE_URL is not set")?;
            let pool = db::connect_pg(url, cfg.database_max_connections).await?;
            db::run_migrations(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            match cfg.dev_access_token.as_deref() {
                Some(token) => {
                    let user_id = Uuid::new_v4();
                    store.seed_session(
                        &hash_access_token(token),
                        user_id,
                        Role::SuperAdmin,
                        "dev@localhost",
                    );
                    tracing::info!(%user_id, "memory store seeded with DEV_ACCESS_TOKEN session");
                }
                None => tracing::warn!("memory store has no sessions; set DEV_ACCESS_TOKEN"),
            }
            Ok(Arc::new(store))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = Config::from_env()?;
    let store = open_store(&cfg).await?;

    let state = AppState {
        store,
        calendar: cfg.calendar_settings(),
        calendar_max_window_days: cfg.calendar_max_window_days,
    };

    // DEV ONLY: allow browser clients on other origins to call the API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!(backend = ?cfg.backend, "Listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
