use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::error;

use super::payload::{AllocationReport, SaveRequest, SaveResponse, ViewerReport};
use super::service::RosterService;
use super::store::RosterStore;
use crate::allocation::RosterSnapshot;
use crate::error::AppError;

/// Router exposing the roster data, save, and allocation endpoints.
pub fn roster_router<S>(service: Arc<RosterService<S>>) -> Router
where
    S: RosterStore + 'static,
{
    Router::new()
        .route("/api/data", get(data_handler::<S>))
        .route("/api/save", post(save_handler::<S>))
        .route("/api/allocation", get(allocation_handler::<S>))
        .route("/api/allocation/{name}", get(viewer_handler::<S>))
        .with_state(service)
}

pub(crate) async fn data_handler<S>(
    State(service): State<Arc<RosterService<S>>>,
) -> Result<Json<RosterSnapshot>, AppError>
where
    S: RosterStore + 'static,
{
    Ok(Json(service.data()?))
}

pub(crate) async fn save_handler<S>(
    State(service): State<Arc<RosterService<S>>>,
    Json(request): Json<SaveRequest>,
) -> Response
where
    S: RosterStore + 'static,
{
    match service.save(request) {
        Ok(_) => (StatusCode::OK, Json(SaveResponse::saved())).into_response(),
        Err(err) => {
            let err = AppError::from(err);
            let status = err.status_code();
            if status.is_server_error() {
                error!(error = %err, "preference save failed");
            }
            (status, Json(SaveResponse::failed(err.to_string()))).into_response()
        }
    }
}

pub(crate) async fn allocation_handler<S>(
    State(service): State<Arc<RosterService<S>>>,
) -> Result<Json<AllocationReport>, AppError>
where
    S: RosterStore + 'static,
{
    Ok(Json(service.allocation()?))
}

pub(crate) async fn viewer_handler<S>(
    State(service): State<Arc<RosterService<S>>>,
    Path(name): Path<String>,
) -> Result<Json<ViewerReport>, AppError>
where
    S: RosterStore + 'static,
{
    Ok(Json(service.viewer(&name)?))
}
