use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::dispatch::{self, AssignmentPolicy, ItemRequest};
use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders/place", post(place_order))
        .route("/orders", get(list_orders))
        .route("/orders/user/:user_id", get(list_orders_for_user))
        .route("/orders/:id", get(get_order).delete(delete_order))
        .route("/orders/:id/assign/:partner_id", put(assign_partner))
        .route("/orders/:id/cancel", put(cancel_order))
        .route("/orders/:id/status", put(override_status))
}

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub items: Vec<PlaceOrderItem>,
}

#[derive(Deserialize)]
pub struct PlaceOrderItem {
    pub menu_item_id: Uuid,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

async fn place_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let items: Vec<ItemRequest> = payload
        .items
        .iter()
        .map(|item| ItemRequest {
            menu_item: item.menu_item_id,
            quantity: item.quantity,
        })
        .collect();

    let order = dispatch::place_order(&state, payload.user_id, payload.restaurant_id, &items)?;
    Ok(Json(order))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    let mut orders: Vec<Order> = state.orders.iter().map(|entry| entry.value().clone()).collect();
    orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
    Json(orders)
}

async fn list_orders_for_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Json<Vec<Order>> {
    let mut orders: Vec<Order> = state
        .orders
        .iter()
        .filter(|entry| entry.value().customer == user_id)
        .map(|entry| entry.value().clone())
        .collect();
    orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
    Json(orders)
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .orders
        .get(&id)
        .ok_or_else(|| AppError::not_found("order", id))?;

    Ok(Json(order.value().clone()))
}

/// Administrative, unconditional delete. The order's line items go with it.
async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let (_, order) = state
        .orders
        .remove(&id)
        .ok_or_else(|| AppError::not_found("order", id))?;

    Ok(Json(order))
}

async fn assign_partner(
    State(state): State<Arc<AppState>>,
    Path((id, partner_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Order>, AppError> {
    let order = dispatch::assign(&state, id, partner_id, AssignmentPolicy::Admin)?;
    Ok(Json(order))
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = dispatch::cancel_order(&state, id)?;
    Ok(Json(order))
}

/// Free-form status override. The raw string is mapped onto the closed enum
/// here at the boundary; the engine then refuses OUT_FOR_DELIVERY through
/// this path.
async fn override_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<Order>, AppError> {
    let status: OrderStatus = payload.status.parse().map_err(AppError::Validation)?;

    let order = dispatch::override_status(&state, id, status)?;
    Ok(Json(order))
}
