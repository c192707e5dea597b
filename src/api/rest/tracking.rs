use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::get;
use uuid::Uuid;

use crate::engine::tracking::{TrackingView, tracking_view};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/track/:order_id", get(track_order))
}

async fn track_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<TrackingView>, AppError> {
    let view = tracking_view(&state, order_id)?;
    Ok(Json(view))
}
