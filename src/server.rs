use crate::cards::{cards_for_ranked, cards_for_venues, VenueCard};
use crate::catalog::Catalog;
use crate::config::SearchConfig;
use crate::enrich::DescriptionEnricher;
use crate::error::FinderError;
use crate::geocode::Geocoder;
use crate::metrics;
use crate::neighborhoods;
use crate::pipeline::SearchSession;
use crate::types::{Coordinates, PriceRange, SearchCriteria};
use axum::{
    extract::Query,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared, read-only state behind every handler.
pub struct AppState {
    pub catalog: Catalog,
    pub geocoder: Arc<dyn Geocoder>,
    pub enricher: Arc<dyn DescriptionEnricher>,
    pub search: SearchConfig,
    /// Set when the catalog could not be loaded and the service runs empty.
    pub catalog_warning: Option<String>,
}

/// JSON error body with a status derived from the error kind.
pub struct ApiError(pub FinderError);

impl From<FinderError> for ApiError {
    fn from(e: FinderError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            FinderError::LocationNotFound { .. } => StatusCode::NOT_FOUND,
            FinderError::LookupFailed(_) | FinderError::Http(_) => StatusCode::BAD_GATEWAY,
            FinderError::InvalidCriteria(_) => StatusCode::BAD_REQUEST,
            FinderError::DataUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
            "retryable": self.0.is_retryable(),
        }));
        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub neighborhood: String,
    pub borough: String,
    pub radius: Option<f64>,
    /// Comma separated symbols, e.g. `$,$$`.
    pub prices: Option<String>,
    pub min_rating: Option<f64>,
    pub limit: Option<usize>,
}

impl SearchParams {
    fn criteria(&self, defaults: &SearchConfig) -> Result<SearchCriteria, FinderError> {
        let (neighborhood, borough) = neighborhoods::require(&self.neighborhood, &self.borough)?;
        let mut criteria = SearchCriteria::new(neighborhood, borough)
            .with_max_distance(self.radius.unwrap_or(defaults.default_radius_miles))
            .with_min_rating(self.min_rating.unwrap_or(defaults.default_min_rating));
        if let Some(prices) = &self.prices {
            criteria = criteria.with_prices(PriceRange::parse_list(prices)?);
        }
        criteria.validate()?;
        Ok(criteria)
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub location: String,
    pub origin: Coordinates,
    pub total: usize,
    pub venues: Vec<VenueCard>,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct BoroughEntry {
    borough: &'static str,
    neighborhoods: &'static [&'static str],
}

/// Requested page size, never above the configured one. Every displayed
/// venue costs one enrichment call.
fn capped(requested: Option<usize>, configured: usize) -> usize {
    requested.map_or(configured, |n| n.min(configured))
}

async fn health(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "rooftop-finder",
        "version": env!("CARGO_PKG_VERSION"),
        "venues": state.catalog.len(),
        "catalog_warning": state.catalog_warning,
    }))
}

async fn list_neighborhoods() -> impl IntoResponse {
    let entries: Vec<BoroughEntry> = neighborhoods::DIRECTORY
        .iter()
        .map(|(borough, hoods)| BoroughEntry {
            borough: *borough,
            neighborhoods: *hoods,
        })
        .collect();
    Json(entries)
}

async fn featured(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<FeaturedParams>,
) -> Json<Vec<VenueCard>> {
    let limit = capped(params.limit, state.search.featured_limit);
    let venues = state.catalog.featured(limit);
    Json(cards_for_venues(state.enricher.clone(), &venues).await)
}

async fn search(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let criteria = params.criteria(&state.search)?;
    let session = SearchSession::run(criteria, &state.catalog, state.geocoder.as_ref()).await?;
    let limit = capped(params.limit, state.search.display_limit);
    let venues = cards_for_ranked(state.enricher.clone(), session.top(limit)).await;

    Ok(Json(SearchResponse {
        location: session.location_label.clone(),
        origin: session.origin(),
        total: session.result.len(),
        venues,
    }))
}

async fn render_metrics() -> Response {
    match metrics::render() {
        Some(body) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// Build the router with all routes.
pub fn create_server(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/neighborhoods", get(list_neighborhoods))
        .route("/featured", get(featured))
        .route("/search", get(search))
        .route("/metrics", get(render_metrics))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Serve the API until the process receives Ctrl-C.
pub async fn start_server(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_server(state);

    info!("HTTP server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
