//! Axum JSON API for the favorites dashboard.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use trader_core::{
    AssetSummary, DashboardRow, EnrichmentRecord, MarketNews, Quote, RemoveOutcome, Ticker,
};
use trader_storage::{EnrichmentStore, MarketFeedStore, PgStore, Store, StoreError};
use trader_sync::{AppConfig, DashboardViewBuilder, SyncError, Synchronizer};

pub const CRATE_NAME: &str = "trader-web";

const NEWS_LIMIT: usize = 10;
const QUOTES_LIMIT: usize = 30;

#[derive(Clone)]
pub struct AppState {
    sync: Synchronizer,
    dashboard: DashboardViewBuilder,
    enrichment: Arc<dyn EnrichmentStore>,
    market: Arc<dyn MarketFeedStore>,
}

impl AppState {
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: Store + 'static,
    {
        Self {
            sync: Synchronizer::new(store.clone()),
            dashboard: DashboardViewBuilder::new(store.clone()),
            enrichment: store.clone(),
            market: store,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(error: SyncError) -> Self {
        let status = match &error {
            SyncError::InvalidTicker { .. } => StatusCode::BAD_REQUEST,
            SyncError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        SyncError::from(error).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddResponse {
    status: &'static str,
    ticker: Ticker,
    created: bool,
    placeholder_seeded: bool,
}

#[derive(Debug, Serialize)]
struct RemoveResponse {
    status: &'static str,
    ticker: Ticker,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/favorites", get(list_favorites_handler))
        .route(
            "/favorites/{ticker}",
            axum::routing::post(add_favorite_handler).delete(remove_favorite_handler),
        )
        .route("/api/assets", get(list_assets_handler))
        .route("/api/assets/{ticker}", get(asset_handler))
        .route("/api/news/{ticker}", get(news_handler))
        .route("/api/quotes/{ticker}", get(quotes_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Any origin when `origins` is empty, otherwise exactly the listed ones.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }
    let allowed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();
    base.allow_origin(AllowOrigin::list(allowed))
}

pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let store = PgStore::connect(&config.pool_config())
        .await
        .context("connecting to database")?;
    if config.run_migrations {
        store.migrate().await.context("applying migrations")?;
        info!("database migrations applied");
    }

    let router = app(AppState::new(Arc::new(store))).layer(cors_layer(&config.cors_origins));
    let listener = TcpListener::bind((config.bind_addr.as_str(), config.port))
        .await
        .with_context(|| format!("binding {}:{}", config.bind_addr, config.port))?;
    info!(addr = %listener.local_addr()?, "trader api listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub async fn serve_from_env() -> anyhow::Result<()> {
    serve(&AppConfig::from_env()).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn health_handler() -> &'static str {
    "Smart Trader API: online"
}

async fn list_favorites_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DashboardRow>>, ApiError> {
    Ok(Json(state.dashboard.list_favorites_with_enrichment().await?))
}

async fn add_favorite_handler(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<AddResponse>, ApiError> {
    let outcome = state.sync.add_favorite(&ticker).await?;
    Ok(Json(AddResponse {
        status: "added",
        ticker: outcome.ticker,
        created: outcome.favorite_created,
        placeholder_seeded: outcome.placeholder_created,
    }))
}

async fn remove_favorite_handler(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Response, ApiError> {
    let (ticker, outcome) = state.sync.remove_favorite(&ticker).await?;
    let status = match outcome {
        RemoveOutcome::Removed => StatusCode::OK,
        RemoveOutcome::NotFound => StatusCode::NOT_FOUND,
    };
    Ok((
        status,
        Json(RemoveResponse {
            status: outcome.as_str(),
            ticker,
        }),
    )
        .into_response())
}

fn parse_ticker(raw: &str) -> Result<Ticker, ApiError> {
    Ticker::parse(raw).map_err(|source| {
        SyncError::InvalidTicker {
            raw: raw.to_string(),
            source,
        }
        .into()
    })
}

async fn list_assets_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AssetSummary>>, ApiError> {
    Ok(Json(state.enrichment.active_assets().await?))
}

async fn asset_handler(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<EnrichmentRecord>, ApiError> {
    let ticker = parse_ticker(&ticker)?;
    match state.enrichment.enrichment(&ticker).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::not_found(format!("no enrichment record for {ticker}"))),
    }
}

async fn news_handler(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<Vec<MarketNews>>, ApiError> {
    let ticker = parse_ticker(&ticker)?;
    let news = state.market.news_matching(&ticker, NEWS_LIMIT).await?;
    if news.is_empty() {
        return Err(ApiError::not_found(format!("no analyzed news found for {ticker}")));
    }
    Ok(Json(news))
}

async fn quotes_handler(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    let ticker = parse_ticker(&ticker)?;
    let quotes = state.market.recent_quotes(&ticker, QUOTES_LIMIT).await?;
    if quotes.is_empty() {
        return Err(ApiError::not_found(format!("no quotes found for {ticker}")));
    }
    Ok(Json(quotes))
}
