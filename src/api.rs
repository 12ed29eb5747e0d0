//! REST API for MediLedger
//!
//! Exposes the ledger to transaction sources (hand-off events) and to
//! presentation layers (chain export, audit, per-item tracking).

use axum::{
    extract::{Path, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::blockchain::{Block, ChainFault, TrackingEntry};
use crate::config::ApiConfig;
use crate::error::LedgerError;
use crate::node::LedgerNode;
use crate::transaction::Transaction;

/// Ledger node plus request bookkeeping, shared by every handler.
#[derive(Clone)]
pub struct ApiState {
    pub node: LedgerNode,
    api_stats: Arc<RwLock<ApiStats>>,
}

#[derive(Debug, Default)]
struct ApiStats {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    transactions_submitted: u64,
    start_time: Option<Instant>,
}

impl ApiStats {
    fn new() -> Self {
        ApiStats {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    fn record_request(&mut self, success: bool) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }
}

impl ApiState {
    pub fn new(node: LedgerNode) -> Self {
        Self {
            node,
            api_stats: Arc::new(RwLock::new(ApiStats::new())),
        }
    }

    pub async fn get_stats(&self) -> ApiStatsResponse {
        let stats = self.api_stats.read().await;
        let uptime = stats.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0);

        ApiStatsResponse {
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            failed_requests: stats.failed_requests,
            transactions_submitted: stats.transactions_submitted,
            uptime_seconds: uptime,
            blocks_mined: self.node.blocks_mined(),
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Ledger(LedgerError),
    ShuttingDown,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Ledger(LedgerError::InvalidTransaction(_))
            | ApiError::Ledger(LedgerError::InvalidProofSupplied { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::ProofSearchExhausted { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Ledger(LedgerError::ProofSearchCancelled) | ApiError::ShuttingDown => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match self {
            ApiError::Ledger(e) => e.to_string(),
            ApiError::ShuttingDown => "Node is shutting down".to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitTransactionRequest {
    pub sender: String,
    pub recipient: String,
    pub subject_id: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct SubmitTransactionResponse {
    /// Index of the block the transaction is expected to land in.
    pub index: u64,
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub chain: Vec<Block>,
}

#[derive(Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub fault: Option<ChainFault>,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub count: usize,
    pub transactions: Vec<Transaction>,
}

#[derive(Serialize)]
pub struct TrackingResponse {
    pub subject_id: String,
    pub current_status: Option<String>,
    pub count: usize,
    pub history: Vec<TrackingEntry>,
}

#[derive(Serialize)]
pub struct ApiStatsResponse {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub transactions_submitted: u64,
    pub uptime_seconds: u64,
    pub blocks_mined: u64,
}

// ============================================================================
// Middleware
// ============================================================================

async fn stats_middleware(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let success = response.status().is_success();
    let mut stats = state.api_stats.write().await;
    stats.record_request(success);

    response
}

async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints
pub fn build_api_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE])
        .allow_credentials(true);

    let api_routes = Router::new()
        // Chain endpoints
        .route("/chain", get(get_chain))
        .route("/chain/validate", get(validate_chain))
        // Transaction endpoints
        .route("/transactions", post(submit_transaction))
        .route("/transactions/pending", get(get_pending))
        .route("/track/:subject_id", get(track_subject))
        // Mining
        .route("/mine", post(mine_block))
        // System endpoints
        .route("/health", get(health_check))
        .route("/stats", get(get_api_stats))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), stats_middleware))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

/// Serve the API until `shutdown` resolves; in-flight proof searches are
/// cancelled when it does.
pub async fn run_api_server<F>(
    state: ApiState,
    config: &ApiConfig,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let node = state.node.clone();
    let app = build_api_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            node.shutdown();
        })
        .await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    let (status, label) = if state.node.is_shut_down() {
        (StatusCode::SERVICE_UNAVAILABLE, "shutting_down")
    } else {
        (StatusCode::OK, "healthy")
    };
    (
        status,
        Json(serde_json::json!({
            "status": label,
            "length": state.node.len().await,
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}

async fn get_chain(State(state): State<ApiState>) -> Json<ChainResponse> {
    let chain = state.node.export().await;
    Json(ChainResponse {
        length: chain.len(),
        chain,
    })
}

async fn validate_chain(State(state): State<ApiState>) -> Json<ValidationResponse> {
    let fault = state.node.audit().await.err();
    Json(ValidationResponse {
        valid: fault.is_none(),
        fault,
    })
}

async fn submit_transaction(
    State(state): State<ApiState>,
    Json(req): Json<SubmitTransactionRequest>,
) -> Result<(StatusCode, Json<SubmitTransactionResponse>), ApiError> {
    let index = state
        .node
        .queue_transaction(&req.sender, &req.recipient, &req.subject_id, &req.status)
        .await?;

    state.api_stats.write().await.transactions_submitted += 1;

    Ok((StatusCode::CREATED, Json(SubmitTransactionResponse { index })))
}

async fn get_pending(State(state): State<ApiState>) -> Json<PendingResponse> {
    let transactions = state.node.pending().await;
    Json(PendingResponse {
        count: transactions.len(),
        transactions,
    })
}

async fn track_subject(
    State(state): State<ApiState>,
    Path(subject_id): Path<String>,
) -> Json<TrackingResponse> {
    let history = state.node.history(&subject_id).await;
    Json(TrackingResponse {
        current_status: history.last().map(|e| e.transaction.status.clone()),
        count: history.len(),
        subject_id,
        history,
    })
}

async fn mine_block(State(state): State<ApiState>) -> Result<Json<Block>, ApiError> {
    if state.node.is_shut_down() {
        return Err(ApiError::ShuttingDown);
    }
    let block = state.node.mine().await?;
    Ok(Json(block))
}

async fn get_api_stats(State(state): State<ApiState>) -> Json<ApiStatsResponse> {
    Json(state.get_stats().await)
}
