//! HTTP trigger: storage notifications are POSTed to `/events`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use partsclean_core::event::S3Event;
use partsclean_core::handler::{handle_event, HandlerContext};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::info;

pub fn router(context: Arc<HandlerContext>) -> Router {
    Router::new()
        .route("/events", post(receive_event))
        .route("/health", get(health))
        .with_state(context)
}

/// Replies with the handler's own status code and body.
async fn receive_event(
    State(context): State<Arc<HandlerContext>>,
    Json(event): Json<S3Event>,
) -> (StatusCode, Json<Value>) {
    let response = handle_event(&event, &context).await;
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn serve(context: Arc<HandlerContext>, bind: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(context).into_make_service()).await?;
    Ok(())
}
