use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::catalog::{MenuItem, Restaurant, User};
use crate::models::event::DispatchEvent;
use crate::models::order::Order;
use crate::models::partner::DeliveryPartner;
use crate::observability::metrics::Metrics;

/// Runtime policy knobs for the dispatch engine.
#[derive(Debug, Clone, Copy)]
pub struct DispatchPolicy {
    pub heartbeat_marks_available: bool,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            heartbeat_marks_available: true,
        }
    }
}

pub struct AppState {
    pub users: DashMap<Uuid, User>,
    pub restaurants: DashMap<Uuid, Restaurant>,
    pub menu_items: DashMap<Uuid, MenuItem>,
    pub orders: DashMap<Uuid, Order>,
    pub partners: DashMap<Uuid, DeliveryPartner>,
    pub events_tx: broadcast::Sender<DispatchEvent>,
    pub policy: DispatchPolicy,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize, policy: DispatchPolicy) -> Self {
        let (events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            users: DashMap::new(),
            restaurants: DashMap::new(),
            menu_items: DashMap::new(),
            orders: DashMap::new(),
            partners: DashMap::new(),
            events_tx,
            policy,
            metrics: Metrics::new(),
        }
    }
}
