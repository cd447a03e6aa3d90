//! Personal dashboard backend.
//!
//! Serves the location ping endpoints plus two read-only proxies:
//!
//! - `POST /api/location` — ingest a position report (bearer token)
//! - `GET /api/location` — latest position with a staleness label
//! - `GET /api/github` — public repository list, cached
//! - `GET /api/crons` — scheduled job list from the gateway

mod auth;
mod config;
mod handlers;
mod models;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::{middleware, Router, Server};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, USER_AGENT};
use crate::handlers::geocode::{DynGeocoder, Nominatim};
use crate::handlers::github::RepoCache;
use crate::handlers::tracker::LocationTracker;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tracker: Arc<LocationTracker>,
    pub geocoder: DynGeocoder,
    pub repo_cache: Arc<RepoCache>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let http = http_client();
        let geocoder = Arc::new(Nominatim::new(http.clone(), config.nominatim_url.clone()));
        Self::build(config, geocoder, http)
    }

    #[cfg(test)]
    pub fn with_geocoder(config: Config, geocoder: DynGeocoder) -> Self {
        Self::build(config, geocoder, http_client())
    }

    fn build(config: Config, geocoder: DynGeocoder, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            tracker: Arc::new(LocationTracker::default()),
            geocoder,
            repo_cache: Arc::new(RepoCache::default()),
            http,
        }
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(10))
        .build()
        .expect("failed to build http client")
}

fn app(state: AppState) -> Router {
    let location = Router::new()
        .route(
            "/api/location",
            get(handlers::location::snapshot).post(handlers::location::report),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    Router::new()
        .merge(location)
        .route("/api/github", get(handlers::github::list_repos))
        .route("/api/crons", get(handlers::crons::list_jobs))
        // logging so we can see whats going on
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hq_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::new(Config::from_env());
    let app = app(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("invalid HOST/PORT");
    info!("listening on {}", addr);

    Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
