//! Trigger Surface
//!
//! HTTP boundary that turns an inbound call into one assemble-and-dispatch
//! cycle. `/send` runs the cycle and maps the outcome to a status code;
//! `/echo` probes the upstream serving backend.

use crate::assembler::RequestAssembler;
use crate::client::FeatureClient;
use crate::dispatch::Dispatcher;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tracing::{error, info};

/// Everything one trigger needs, shared across handlers. Pools live inside
/// the assembler's registry and are reused for the process lifetime.
pub struct AppState {
    pub assembler: RequestAssembler,
    pub dispatcher: Dispatcher,
    pub client: Arc<dyn FeatureClient>,
}

/// Build the trigger router over the given application state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/send", get(send_handler).post(send_handler))
        .route("/echo", get(echo_handler))
        .with_state(state)
}

async fn send_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    let requests = match state.assembler.assemble() {
        Ok(requests) => requests,
        Err(e) => {
            error!(error = %e, "Request assembly failed");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    let batch_size = requests.len();
    let outcome = state.dispatcher.dispatch(requests).await;
    if outcome.success {
        info!(batch_size, "Dispatch succeeded");
        StatusCode::OK
    } else {
        error!(
            batch_size,
            error = %outcome
                .first_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            "Dispatch failed"
        );
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn echo_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.client.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            error!(error = %e, "Upstream serving ping failed");
            StatusCode::BAD_GATEWAY
        }
    }
}
