//! `psgc serve` — run the read-only REST API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use psgc_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::settings::AppConfig;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
  let store = SqliteStore::open(&config.database)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", config.database)
    })?;

  let app = psgc_api::api_router(Arc::new(store), config.rate_limit)
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", config.host, config.port);
  tracing::info!("listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  // ConnectInfo feeds the per-address rate limiter.
  axum::serve(
    listener,
    app.into_make_service_with_connect_info::<SocketAddr>(),
  )
  .await
  .context("server error")?;

  Ok(())
}
