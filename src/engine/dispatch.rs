use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::event::{DispatchEvent, DispatchOp};
use crate::models::order::{Order, OrderItem, OrderStatus};
use crate::models::partner::{DeliveryPartner, GeoPoint};
use crate::state::AppState;

/// Who is performing an assignment. The two flows share the mechanics but
/// keep their own preconditions and resulting status:
///
/// | policy          | precondition        | resulting status  |
/// |-----------------|---------------------|-------------------|
/// | `Admin`         | status == PREPARING | OUT_FOR_DELIVERY  |
/// | `PartnerAccept` | none                | CONFIRMED         |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentPolicy {
    Admin,
    PartnerAccept,
}

/// One requested line of an order, before prices are captured.
#[derive(Debug, Clone)]
pub struct ItemRequest {
    pub menu_item: Uuid,
    pub quantity: u32,
}

/// Creates the order with line-item prices snapshotted from the menu as it
/// stands right now. The stored total is never recomputed afterwards.
pub fn place_order(
    state: &AppState,
    customer: Uuid,
    restaurant: Uuid,
    items: &[ItemRequest],
) -> Result<Order, AppError> {
    tracked(state, DispatchOp::Place, || {
        if !state.users.contains_key(&customer) {
            return Err(AppError::not_found("user", customer));
        }
        if !state.restaurants.contains_key(&restaurant) {
            return Err(AppError::not_found("restaurant", restaurant));
        }

        let mut order_items = Vec::with_capacity(items.len());
        let mut total_price = 0.0;

        for item in items {
            if item.quantity == 0 {
                return Err(AppError::Validation(format!(
                    "quantity for menu item {} must be at least 1",
                    item.menu_item
                )));
            }

            let menu_item = state
                .menu_items
                .get(&item.menu_item)
                .ok_or_else(|| AppError::not_found("menu item", item.menu_item))?;

            total_price += menu_item.price * f64::from(item.quantity);
            order_items.push(OrderItem {
                menu_item: item.menu_item,
                quantity: item.quantity,
                unit_price: menu_item.price,
            });
        }

        let order = Order {
            id: Uuid::new_v4(),
            customer,
            restaurant,
            items: order_items,
            total_price,
            placed_at: Utc::now(),
            status: OrderStatus::Placed,
            delivery_partner: None,
        };

        state.orders.insert(order.id, order.clone());
        emit(state, &order, DispatchOp::Place);

        info!(order_id = %order.id, total_price, "order placed");
        Ok(order)
    })
}

/// Matches a partner to an order and flips the partner off-duty. Neither
/// policy checks `partner.available` first; a busy partner can be assigned
/// again and the earlier order keeps its reference. Callers that care pick
/// from the available-partners listing.
pub fn assign(
    state: &AppState,
    order_id: Uuid,
    partner_id: Uuid,
    policy: AssignmentPolicy,
) -> Result<Order, AppError> {
    let op = match policy {
        AssignmentPolicy::Admin => DispatchOp::Assign,
        AssignmentPolicy::PartnerAccept => DispatchOp::Accept,
    };

    tracked(state, op, || {
        let mut order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::not_found("order", order_id))?;
        let mut partner = state
            .partners
            .get_mut(&partner_id)
            .ok_or_else(|| AppError::not_found("delivery partner", partner_id))?;

        if policy == AssignmentPolicy::Admin && order.status != OrderStatus::Preparing {
            return Err(AppError::InvalidTransition {
                operation: op,
                status: order.status,
            });
        }

        let first_assignment = order.delivery_partner.is_none();
        order.delivery_partner = Some(partner_id);
        order.status = match policy {
            AssignmentPolicy::Admin => OrderStatus::OutForDelivery,
            AssignmentPolicy::PartnerAccept => OrderStatus::Confirmed,
        };
        partner.available = false;

        if first_assignment {
            state.metrics.active_deliveries.inc();
        }
        emit(state, &order, op);

        info!(order_id = %order.id, partner_id = %partner_id, status = %order.status, "partner assigned");
        Ok(order.clone())
    })
}

pub fn pick_up(state: &AppState, order_id: Uuid) -> Result<Order, AppError> {
    set_status_unchecked(state, order_id, OrderStatus::PickedUp, DispatchOp::PickUp)
}

pub fn start_delivery(state: &AppState, order_id: Uuid) -> Result<Order, AppError> {
    set_status_unchecked(
        state,
        order_id,
        OrderStatus::OutForDelivery,
        DispatchOp::StartDelivery,
    )
}

/// Marks the order delivered and releases the assigned partner, if any.
pub fn complete_delivery(state: &AppState, order_id: Uuid) -> Result<Order, AppError> {
    tracked(state, DispatchOp::CompleteDelivery, || {
        let mut order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::not_found("order", order_id))?;

        let was_settled = order.status.is_terminal();
        order.status = OrderStatus::Delivered;
        release_partner(state, &order, was_settled);
        emit(state, &order, DispatchOp::CompleteDelivery);

        info!(order_id = %order.id, "delivery completed");
        Ok(order.clone())
    })
}

/// Customers can back out only before dispatch: PLACED and PREPARING cancel
/// cleanly; anything later is refused with the current status in the error.
pub fn cancel_order(state: &AppState, order_id: Uuid) -> Result<Order, AppError> {
    tracked(state, DispatchOp::Cancel, || {
        let mut order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::not_found("order", order_id))?;

        if !order.status.is_cancellable() {
            return Err(AppError::InvalidTransition {
                operation: DispatchOp::Cancel,
                status: order.status,
            });
        }

        order.status = OrderStatus::Cancelled;
        release_partner(state, &order, false);
        emit(state, &order, DispatchOp::Cancel);

        info!(order_id = %order.id, "order cancelled");
        Ok(order.clone())
    })
}

/// Administrative escape hatch: writes any status without consulting the
/// transition graph, except OUT_FOR_DELIVERY, which only the assignment path
/// may set. Availability is not reconciled here.
pub fn override_status(
    state: &AppState,
    order_id: Uuid,
    status: OrderStatus,
) -> Result<Order, AppError> {
    tracked(state, DispatchOp::OverrideStatus, || {
        if status == OrderStatus::OutForDelivery {
            return Err(AppError::Validation(
                "OUT_FOR_DELIVERY must be set by assigning a delivery partner".to_string(),
            ));
        }

        let mut order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::not_found("order", order_id))?;

        warn!(order_id = %order.id, from = %order.status, to = %status, "status overridden");
        order.status = status;
        emit(state, &order, DispatchOp::OverrideStatus);

        Ok(order.clone())
    })
}

/// Location heartbeat from the partner's client. Under the default policy a
/// heartbeat also flips the partner available, even mid-delivery (see
/// DESIGN.md).
pub fn report_location(
    state: &AppState,
    partner_id: Uuid,
    location: GeoPoint,
) -> Result<DeliveryPartner, AppError> {
    let mut partner = state
        .partners
        .get_mut(&partner_id)
        .ok_or_else(|| AppError::not_found("delivery partner", partner_id))?;

    partner.location = location;
    if state.policy.heartbeat_marks_available {
        partner.available = true;
    }

    Ok(partner.clone())
}

/// Explicit on/off-duty toggle, independent of the heartbeat policy.
pub fn set_availability(
    state: &AppState,
    partner_id: Uuid,
    available: bool,
) -> Result<DeliveryPartner, AppError> {
    let mut partner = state
        .partners
        .get_mut(&partner_id)
        .ok_or_else(|| AppError::not_found("delivery partner", partner_id))?;

    partner.available = available;
    info!(partner_id = %partner_id, available, "partner availability set");

    Ok(partner.clone())
}

fn set_status_unchecked(
    state: &AppState,
    order_id: Uuid,
    status: OrderStatus,
    op: DispatchOp,
) -> Result<Order, AppError> {
    tracked(state, op, || {
        let mut order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::not_found("order", order_id))?;

        order.status = status;
        emit(state, &order, op);

        info!(order_id = %order.id, status = %status, "status updated");
        Ok(order.clone())
    })
}

fn release_partner(state: &AppState, order: &Order, was_settled: bool) {
    let Some(partner_id) = order.delivery_partner else {
        return;
    };

    if let Some(mut partner) = state.partners.get_mut(&partner_id) {
        partner.available = true;
    }
    if !was_settled {
        state.metrics.active_deliveries.dec();
    }
}

fn emit(state: &AppState, order: &Order, operation: DispatchOp) {
    // Nobody listening is fine; send only fails with zero receivers.
    let _ = state.events_tx.send(DispatchEvent {
        order_id: order.id,
        status: order.status,
        delivery_partner: order.delivery_partner,
        operation,
        at: Utc::now(),
    });
}

fn tracked<T>(
    state: &AppState,
    op: DispatchOp,
    f: impl FnOnce() -> Result<T, AppError>,
) -> Result<T, AppError> {
    let start = Instant::now();
    let result = f();

    let elapsed = start.elapsed().as_secs_f64();
    state
        .metrics
        .dispatch_latency_seconds
        .with_label_values(&[op.as_str()])
        .observe(elapsed);

    let outcome = match &result {
        Ok(_) => "success",
        Err(err) => err.outcome(),
    };
    state
        .metrics
        .dispatch_operations_total
        .with_label_values(&[op.as_str(), outcome])
        .inc();

    result
}
