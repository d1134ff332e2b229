//! HTTP server for city and region searches.
//!
//! Accepts JSON requests on `/v1/cities` and `/v1/regions` and answers with
//! place records.

use std::sync::Arc;

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, routing::post, Router};
use clap::Parser;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use locus::config::Config;
use locus::service::{CitiesRequest, GeoService, RegionsRequest, ValidationError};
use locus::Place;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Geocoding server for cities and regions")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "locus.toml")]
    config: String,

    /// Listen address, overrides the [server] table
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Locus Server");
    info!("Loading configuration from {}", args.config);

    let config = Config::load_from_file(&args.config)?;
    let listen = args.listen.unwrap_or_else(|| config.server.listen.clone());

    // Loading a boundary file may take a while
    let service = tokio::task::spawn_blocking(move || GeoService::from_config(&config)).await??;
    let state = Arc::new(service);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/cities", post(cities_handler))
        .route("/v1/regions", post(regions_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct CitiesResponse {
    cities: Vec<Place>,
}

#[derive(Serialize)]
struct RegionsResponse {
    regions: Vec<Place>,
}

/// Run a blocking search on the blocking pool, mapping failures to HTTP errors
async fn run_blocking<F>(name: &'static str, search: F) -> Result<Vec<Place>, (StatusCode, String)>
where
    F: FnOnce() -> std::result::Result<Vec<Place>, ValidationError> + Send + 'static,
{
    match tokio::task::spawn_blocking(search).await {
        Ok(Ok(places)) => Ok(places),
        Ok(Err(e)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => {
            error!("{} search failed: {}", name, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// City search by position or name
async fn cities_handler(
    State(service): State<Arc<GeoService>>,
    Json(request): Json<CitiesRequest>,
) -> Result<Json<CitiesResponse>, (StatusCode, String)> {
    let cities = run_blocking("Cities", move || service.get_cities(&request)).await?;
    Ok(Json(CitiesResponse { cities }))
}

/// Region search around a position
async fn regions_handler(
    State(service): State<Arc<GeoService>>,
    Json(request): Json<RegionsRequest>,
) -> Result<Json<RegionsResponse>, (StatusCode, String)> {
    let regions = run_blocking("Regions", move || service.get_regions(&request)).await?;
    Ok(Json(RegionsResponse { regions }))
}
