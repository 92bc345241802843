use crate::drivers::DriverId;
use crate::geo::GeoPoint;
use crate::payments::PaymentStatus;
use crate::qr::QrCode;
use crate::users::UserId;
use crate::vehicles::VehicleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_kernel::uuid_key;

uuid_key!(RideId);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RideStop {
    pub name: String,
    pub point: GeoPoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideType {
    #[serde(rename = "on-demand")]
    OnDemand,
    #[serde(rename = "scheduled")]
    Scheduled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ride {
    pub id: RideId,
    pub user_id: UserId,
    pub driver_id: DriverId,
    pub vehicle_id: VehicleId,
    pub pickup: RideStop,
    pub dropoff: RideStop,
    pub ride_type: RideType,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub distance_km: f64,
    pub fare: u64,
    pub seats_booked: u8,
    pub is_shared: bool,
    pub status: RideStatus,
    pub payment_status: PaymentStatus,
    pub qr_code: QrCode,
    /// `None` for the ride that owns the vehicle trip; children pooled onto
    /// it reference the parent here.
    pub parent_ride_id: Option<RideId>,
    pub created_at: DateTime<Utc>,
}

impl Ride {
    pub fn is_open(&self) -> bool {
        matches!(self.status, RideStatus::Pending | RideStatus::Active)
    }

    /// Whether this ride governs driver availability: a private ride, or the
    /// parent of a pooled trip.
    pub fn governs_vehicle_trip(&self) -> bool {
        !self.is_shared || self.parent_ride_id.is_none()
    }
}
