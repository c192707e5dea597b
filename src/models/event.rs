use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::OrderStatus;

/// Dispatch engine operations, as reported in events and metric labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOp {
    Place,
    Assign,
    Accept,
    PickUp,
    StartDelivery,
    CompleteDelivery,
    Cancel,
    OverrideStatus,
}

impl DispatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOp::Place => "place",
            DispatchOp::Assign => "assign",
            DispatchOp::Accept => "accept",
            DispatchOp::PickUp => "pick_up",
            DispatchOp::StartDelivery => "start_delivery",
            DispatchOp::CompleteDelivery => "complete_delivery",
            DispatchOp::Cancel => "cancel",
            DispatchOp::OverrideStatus => "override_status",
        }
    }
}

/// Broadcast after every committed dispatch mutation; `/ws` subscribers see
/// one of these per transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchEvent {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub delivery_partner: Option<Uuid>,
    pub operation: DispatchOp,
    pub at: DateTime<Utc>,
}
