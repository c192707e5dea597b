use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed order lifecycle. The HTTP boundary maps every literal spelling the
/// clients send (including `"OUT FOR DELIVERY"` and `"PICKED UP"` with
/// spaces) onto these variants; nothing past the boundary works with raw
/// status strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Preparing,
    Confirmed,
    OutForDelivery,
    PickedUp,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// No designed transition leaves these states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Placed | OrderStatus::Preparing)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase().replace(' ', "_");
        match normalized.as_str() {
            "PLACED" => Ok(OrderStatus::Placed),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "OUT_FOR_DELIVERY" => Ok(OrderStatus::OutForDelivery),
            "PICKED_UP" => Ok(OrderStatus::PickedUp),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("unknown order status: {raw}")),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::PickedUp => "PICKED_UP",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

/// Line item with the unit price captured at placement time. Menu edits after
/// placement never flow back into these records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item: Uuid,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer: Uuid,
    pub restaurant: Uuid,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub delivery_partner: Option<Uuid>,
}
