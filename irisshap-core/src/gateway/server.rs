//! Dashboard HTTP server built on axum.

use super::error::ApiError;
use super::page::INDEX_HTML;
use super::GatewayConfig;
use crate::canvas::{self, ChartSpec};
use crate::query;
use crate::schema::{class_options, ClassLabel};
use crate::snapshot::SharedSnapshot;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared dashboard reference for axum handlers.
pub type SharedDashboard = Arc<DashboardServer>;

/// Everything the handlers read. Immutable after construction.
#[derive(Debug)]
pub struct DashboardServer {
    config: GatewayConfig,
    snapshot: SharedSnapshot,
    started_at: Instant,
}

impl DashboardServer {
    pub fn new(config: GatewayConfig, snapshot: SharedSnapshot) -> Self {
        Self {
            config,
            snapshot,
            started_at: Instant::now(),
        }
    }

    pub fn into_shared(self) -> SharedDashboard {
        Arc::new(self)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &SharedSnapshot {
        &self.snapshot
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[derive(Debug, Deserialize)]
struct ClassParams {
    class: i64,
    #[serde(default)]
    format: ChartFormat,
}

#[derive(Debug, Deserialize)]
struct RowParams {
    row: i64,
    #[serde(default)]
    format: ChartFormat,
}

#[derive(Debug, Deserialize)]
struct FormatParams {
    #[serde(default)]
    format: ChartFormat,
}

/// Response shape of the chart endpoints: a ready-to-draw Plotly figure, or
/// the underlying chart specification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ChartFormat {
    #[default]
    Figure,
    Spec,
}

fn chart_response(spec: ChartSpec, format: ChartFormat) -> Result<Json<serde_json::Value>, ApiError> {
    spec.validate().map_err(|e| ApiError::Chart(e.to_string()))?;
    let body = match format {
        ChartFormat::Figure => canvas::render_figure(&spec),
        ChartFormat::Spec => serde_json::to_value(&spec).map_err(|e| ApiError::Chart(e.to_string()))?,
    };
    Ok(Json(body))
}

/// Build the axum Router for the dashboard page and its JSON API.
pub fn router(shared: SharedDashboard) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/classes", get(classes_handler))
        .route("/api/records", get(records_handler))
        .route("/api/records/{row}/class", get(record_class_handler))
        .route("/api/charts/box", get(box_handler))
        .route("/api/charts/bubble", get(bubble_handler))
        .route("/api/charts/polar", get(polar_handler))
        .route("/api/charts/gauge", get(gauge_handler))
        .route("/api/charts/pairwise", get(pairwise_handler))
        .route("/api/query/class/{class}", get(class_query_handler))
        .route("/api/query/record/{row}", get(record_query_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint.
async fn health_handler(State(dash): State<SharedDashboard>) -> impl IntoResponse {
    let snapshot = dash.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "records": snapshot.len(),
        "normalization": snapshot.normalization().mode,
        "loaded_at": snapshot.loaded_at().to_rfc3339(),
        "uptime_secs": dash.uptime_secs(),
    }))
}

async fn classes_handler() -> impl IntoResponse {
    Json(class_options())
}

async fn records_handler(State(dash): State<SharedDashboard>) -> impl IntoResponse {
    let count = dash.snapshot().len();
    Json(serde_json::json!({
        "count": count,
        "max_index": count.checked_sub(1),
    }))
}

async fn record_class_handler(
    State(dash): State<SharedDashboard>,
    Path(row): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let cmp = query::record_comparison(dash.snapshot(), row)?;
    Ok(Json(serde_json::json!({
        "row": cmp.row,
        "class": cmp.class,
        "class_name": cmp.class_name,
        "text": canvas::class_display(&cmp),
    })))
}

async fn box_handler(
    State(dash): State<SharedDashboard>,
    Query(params): Query<ClassParams>,
) -> Result<impl IntoResponse, ApiError> {
    let class = ClassLabel::try_from(params.class)?;
    let dist = query::class_distribution(dash.snapshot(), class);
    chart_response(canvas::box_plot(&dist), params.format)
}

async fn bubble_handler(
    State(dash): State<SharedDashboard>,
    Query(params): Query<ClassParams>,
) -> Result<impl IntoResponse, ApiError> {
    let class = ClassLabel::try_from(params.class)?;
    let dist = query::class_distribution(dash.snapshot(), class);
    chart_response(canvas::bubble_chart(&dist), params.format)
}

async fn polar_handler(
    State(dash): State<SharedDashboard>,
    Query(params): Query<RowParams>,
) -> Result<impl IntoResponse, ApiError> {
    let cmp = query::record_comparison(dash.snapshot(), params.row)?;
    chart_response(canvas::polar_comparison(&cmp), params.format)
}

async fn gauge_handler(
    State(dash): State<SharedDashboard>,
    Query(params): Query<RowParams>,
) -> Result<impl IntoResponse, ApiError> {
    let cmp = query::record_comparison(dash.snapshot(), params.row)?;
    chart_response(canvas::gauge_comparison(&cmp), params.format)
}

async fn pairwise_handler(
    State(dash): State<SharedDashboard>,
    Query(params): Query<FormatParams>,
) -> Result<impl IntoResponse, ApiError> {
    let data = query::pairwise_dimensions(dash.snapshot());
    chart_response(canvas::pairwise_matrix(&data), params.format)
}

async fn class_query_handler(
    State(dash): State<SharedDashboard>,
    Path(class): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let class = ClassLabel::try_from(class)?;
    Ok(Json(query::class_distribution(dash.snapshot(), class)))
}

async fn record_query_handler(
    State(dash): State<SharedDashboard>,
    Path(row): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(query::record_comparison(dash.snapshot(), row)?))
}

/// Start the dashboard server on the configured address.
///
/// Runs until the process receives Ctrl-C.
pub async fn run(dash: SharedDashboard) -> Result<(), std::io::Error> {
    let addr = dash.config().addr();
    let records = dash.snapshot().len();
    let app = router(dash);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, records, "Dashboard listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down dashboard");
        })
        .await?;
    Ok(())
}
