use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const ORIGIN: GeoPoint = GeoPoint { lat: 0.0, lng: 0.0 };
}

/// A delivery partner profile. `user` is optional: the profile can exist
/// before an account is linked (admin-created partners). `location` is the
/// last reported position, (0, 0) until the first heartbeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPartner {
    pub id: Uuid,
    pub user: Option<Uuid>,
    pub location: GeoPoint,
    pub available: bool,
}

/// What the assignment UI needs to show for an available partner. Partners
/// without a linked user get a synthetic display name.
#[derive(Debug, Clone, Serialize)]
pub struct PartnerSummary {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
}
