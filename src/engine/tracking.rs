use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::haversine_km;
use crate::models::order::OrderStatus;
use crate::models::partner::GeoPoint;
use crate::state::AppState;

/// Customer-facing tracking projection. `partner_location` carries a live
/// position only while the order is PICKED_UP; in every other status it is
/// the literal (0, 0) default rather than an absence marker, so clients can
/// rely on the field always being present.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingView {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub restaurant_location: GeoPoint,
    pub partner_name: Option<String>,
    pub partner_location: GeoPoint,
    pub partner_distance_km: Option<f64>,
}

/// Pure derivation over the order, partner and catalog stores; never mutates
/// and is callable at any order status.
pub fn tracking_view(state: &AppState, order_id: Uuid) -> Result<TrackingView, AppError> {
    let order = state
        .orders
        .get(&order_id)
        .ok_or_else(|| AppError::not_found("order", order_id))?;

    let restaurant_location = state
        .restaurants
        .get(&order.restaurant)
        .map(|restaurant| restaurant.location)
        .unwrap_or(GeoPoint::ORIGIN);

    let mut view = TrackingView {
        order_id: order.id,
        status: order.status,
        restaurant_location,
        partner_name: None,
        partner_location: GeoPoint::ORIGIN,
        partner_distance_km: None,
    };

    let Some(partner_id) = order.delivery_partner else {
        return Ok(view);
    };
    let Some(partner) = state.partners.get(&partner_id) else {
        return Ok(view);
    };

    if let Some(user_id) = partner.user {
        if let Some(user) = state.users.get(&user_id) {
            view.partner_name = Some(user.full_name.clone());
        }
    }

    if order.status == OrderStatus::PickedUp {
        view.partner_location = partner.location;
        view.partner_distance_km = Some(haversine_km(&partner.location, &restaurant_location));
    }

    Ok(view)
}
