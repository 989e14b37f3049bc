//! JSON HTTP API
//!
//! Thin presentation layer over the orchestrator. It performs no
//! authentication; put it behind whatever gate the deployment needs.
//! Unknown pods and VMs are rejected from the inventory before any
//! control-plane call is made.

pub mod handlers;
pub mod messages;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use podctl_core::traits::ControlPlane;
use podctl_core::PodError;

use crate::state::ControllerState;
use handlers::ActionResponse;

/// Build the API router over shared controller state
pub fn router<C: ControlPlane + 'static>(state: Arc<ControllerState<C>>) -> Router {
    Router::new()
        .route("/pods", get(handlers::list_pods::<C>))
        .route("/pods/:pod", get(handlers::pod_detail::<C>))
        .route("/pods/:pod/vms/:vm/power-on", post(handlers::power_on::<C>))
        .route("/pods/:pod/vms/:vm/power-off", post(handlers::power_off::<C>))
        .route("/pods/:pod/vms/:vm/nic/connect", post(handlers::nic_connect::<C>))
        .route(
            "/pods/:pod/vms/:vm/nic/disconnect",
            post(handlers::nic_disconnect::<C>),
        )
        .route(
            "/pods/:pod/vms/:vm/portgroup/:portgroup",
            post(handlers::move_port_group::<C>),
        )
        .fallback(handlers::fallback)
        .with_state(state)
}

/// HTTP status for an orchestration error
pub fn status_for(error: &PodError) -> StatusCode {
    match error {
        PodError::NotFound { .. } => StatusCode::NOT_FOUND,
        PodError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        PodError::RemoteTask { .. } => StatusCode::BAD_GATEWAY,
        PodError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        PodError::Cancelled { .. }
        | PodError::Connection(_)
        | PodError::ControlPlane(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Error response.
///
/// Failed mutations answer with the same body shape as successful ones;
/// everything else answers `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    error: PodError,
    action: Option<ActionResponse>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn action(error: PodError, response: ActionResponse) -> Self {
        Self {
            error,
            action: Some(response),
        }
    }
}

impl From<PodError> for ApiError {
    fn from(error: PodError) -> Self {
        Self {
            error,
            action: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.error);
        match self.action {
            Some(body) => (status, Json(body)).into_response(),
            None => (
                status,
                Json(ErrorBody {
                    error: self.error.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
