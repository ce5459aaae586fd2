//! Read-only JSON REST API for the PSGC gazetteer.
//!
//! Exposes an axum [`Router`] backed by any [`psgc_core::store::GeoStore`].
//! TLS and transport concerns are the caller's responsibility; there is no
//! write path here — entities enter the store only through the import
//! pipeline.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = psgc_api::api_router(store.clone(), RateLimitConfig::default());
//! ```

pub mod barangays;
pub mod cities;
pub mod error;
pub mod municipalities;
pub mod provinces;
pub mod ratelimit;
pub mod regions;
pub mod response;
pub mod search;

mod levels;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
  Router,
  extract::{ConnectInfo, Request},
  middleware::{self, Next},
  response::IntoResponse,
  routing::get,
};
use psgc_core::store::GeoStore;

pub use error::ApiError;
pub use ratelimit::{RateLimitConfig, RateLimiter};

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type. The rate limiter sits in front of
/// every route; client addresses come from [`ConnectInfo`] when the
/// server is bound with `into_make_service_with_connect_info`.
pub fn api_router<S>(store: Arc<S>, limits: RateLimitConfig) -> Router<()>
where
  S: GeoStore + 'static,
{
  let limiter = Arc::new(RateLimiter::new(limits));
  let rate_limit = middleware::from_fn(move |req: Request, next: Next| {
    let limiter = limiter.clone();
    async move {
      let addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
      if limiter.allow(addr) {
        next.run(req).await
      } else {
        ApiError::RateLimited.into_response()
      }
    }
  });

  Router::new()
    // Regions
    .route("/regions", get(regions::list::<S>))
    .route("/regions/{code}", get(regions::get_one::<S>))
    .route("/regions/{code}/provinces", get(regions::provinces::<S>))
    .route("/regions/{code}/cities", get(regions::cities::<S>))
    .route(
      "/regions/{code}/municipalities",
      get(regions::municipalities::<S>),
    )
    .route("/regions/{code}/barangays", get(regions::barangays::<S>))
    // Provinces
    .route("/provinces", get(provinces::list::<S>))
    .route("/provinces/{code}", get(provinces::get_one::<S>))
    .route("/provinces/{code}/cities", get(provinces::cities::<S>))
    .route(
      "/provinces/{code}/municipalities",
      get(provinces::municipalities::<S>),
    )
    .route("/provinces/{code}/barangays", get(provinces::barangays::<S>))
    // Cities
    .route("/cities", get(cities::list::<S>))
    .route("/cities/{code}", get(cities::get_one::<S>))
    .route("/cities/{code}/barangays", get(cities::barangays::<S>))
    // Municipalities
    .route("/municipalities", get(municipalities::list::<S>))
    .route("/municipalities/{code}", get(municipalities::get_one::<S>))
    .route(
      "/municipalities/{code}/barangays",
      get(municipalities::barangays::<S>),
    )
    // Barangays
    .route("/barangays", get(barangays::list::<S>))
    .route("/barangays/{code}", get(barangays::get_one::<S>))
    // Search
    .route("/search", get(search::handler::<S>))
    .layer(rate_limit)
    .with_state(store)
}

// ─── Integration tests ───────────────────────────────────────────────────────
