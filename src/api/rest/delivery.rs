use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::dispatch::{self, AssignmentPolicy};
use crate::error::AppError;
use crate::geo::haversine_km;
use crate::models::order::{Order, OrderStatus};
use crate::models::partner::{DeliveryPartner, GeoPoint, PartnerSummary};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/delivery/register", post(register_partner))
        .route("/delivery/available", get(list_available_partners))
        .route("/delivery/available-orders", get(list_available_orders))
        .route("/delivery/me/:user_id", get(get_partner_by_user))
        .route("/delivery/my-orders/:partner_id", get(list_partner_orders))
        .route("/delivery/accept/:order_id", post(accept_order))
        .route("/delivery/pickup/:order_id", put(pick_up))
        .route("/delivery/start/:order_id", post(start_delivery))
        .route("/delivery/complete/:order_id", post(complete_delivery))
        .route("/delivery/location/:partner_id", put(report_location))
        .route("/delivery/availability/:partner_id", put(set_availability))
}

#[derive(Deserialize)]
pub struct RegisterPartnerRequest {
    pub user_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct AcceptOrderRequest {
    pub delivery_partner_id: Uuid,
}

#[derive(Deserialize)]
pub struct LocationReport {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

#[derive(Deserialize)]
pub struct NearQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Creates a partner profile, off-duty at the origin until the first
/// heartbeat arrives. Linking a user account is optional.
async fn register_partner(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPartnerRequest>,
) -> Result<Json<DeliveryPartner>, AppError> {
    if let Some(user_id) = payload.user_id {
        if !state.users.contains_key(&user_id) {
            return Err(AppError::not_found("user", user_id));
        }
    }

    let partner = DeliveryPartner {
        id: Uuid::new_v4(),
        user: payload.user_id,
        location: GeoPoint::ORIGIN,
        available: false,
    };

    state.partners.insert(partner.id, partner.clone());
    Ok(Json(partner))
}

/// Available partners as display summaries, optionally sorted by distance to
/// a point (the restaurant an admin is staffing, typically).
async fn list_available_partners(
    State(state): State<Arc<AppState>>,
    Query(near): Query<NearQuery>,
) -> Json<Vec<PartnerSummary>> {
    let mut partners: Vec<DeliveryPartner> = state
        .partners
        .iter()
        .filter(|entry| entry.value().available)
        .map(|entry| entry.value().clone())
        .collect();

    if let (Some(lat), Some(lng)) = (near.lat, near.lng) {
        let target = GeoPoint { lat, lng };
        partners.sort_by(|a, b| {
            haversine_km(&a.location, &target).total_cmp(&haversine_km(&b.location, &target))
        });
    }

    let summaries = partners
        .into_iter()
        .map(|partner| summarize(&state, &partner))
        .collect();

    Json(summaries)
}

fn summarize(state: &AppState, partner: &DeliveryPartner) -> PartnerSummary {
    let user = partner.user.and_then(|user_id| {
        state
            .users
            .get(&user_id)
            .map(|user| (user.full_name.clone(), user.username.clone()))
    });

    match user {
        Some((full_name, username)) => PartnerSummary {
            id: partner.id,
            full_name,
            username,
        },
        None => PartnerSummary {
            id: partner.id,
            full_name: format!("Partner {}", partner.id),
            username: format!("partner-{}", partner.id),
        },
    }
}

/// Orders ready for a partner to claim: PREPARING and unassigned, falling
/// back to CONFIRMED and unassigned when the kitchen queue is empty.
async fn list_available_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    let unassigned_with = |status: OrderStatus| -> Vec<Order> {
        state
            .orders
            .iter()
            .filter(|entry| {
                let order = entry.value();
                order.status == status && order.delivery_partner.is_none()
            })
            .map(|entry| entry.value().clone())
            .collect()
    };

    let mut orders = unassigned_with(OrderStatus::Preparing);
    if orders.is_empty() {
        orders = unassigned_with(OrderStatus::Confirmed);
    }

    Json(orders)
}

async fn get_partner_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<DeliveryPartner>, AppError> {
    let partner = state
        .partners
        .iter()
        .find(|entry| entry.value().user == Some(user_id))
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::not_found("delivery partner profile for user", user_id))?;

    Ok(Json(partner))
}

async fn list_partner_orders(
    State(state): State<Arc<AppState>>,
    Path(partner_id): Path<Uuid>,
) -> Json<Vec<Order>> {
    let mut orders: Vec<Order> = state
        .orders
        .iter()
        .filter(|entry| entry.value().delivery_partner == Some(partner_id))
        .map(|entry| entry.value().clone())
        .collect();
    orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));

    Json(orders)
}

async fn accept_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AcceptOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let order = dispatch::assign(
        &state,
        order_id,
        payload.delivery_partner_id,
        AssignmentPolicy::PartnerAccept,
    )?;
    Ok(Json(order))
}

async fn pick_up(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = dispatch::pick_up(&state, order_id)?;
    Ok(Json(order))
}

async fn start_delivery(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = dispatch::start_delivery(&state, order_id)?;
    Ok(Json(order))
}

async fn complete_delivery(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = dispatch::complete_delivery(&state, order_id)?;
    Ok(Json(order))
}

async fn report_location(
    State(state): State<Arc<AppState>>,
    Path(partner_id): Path<Uuid>,
    Json(payload): Json<LocationReport>,
) -> Result<Json<DeliveryPartner>, AppError> {
    let partner = dispatch::report_location(
        &state,
        partner_id,
        GeoPoint {
            lat: payload.latitude,
            lng: payload.longitude,
        },
    )?;
    Ok(Json(partner))
}

async fn set_availability(
    State(state): State<Arc<AppState>>,
    Path(partner_id): Path<Uuid>,
    Json(payload): Json<AvailabilityRequest>,
) -> Result<Json<DeliveryPartner>, AppError> {
    let partner = dispatch::set_availability(&state, partner_id, payload.available)?;
    Ok(Json(partner))
}
