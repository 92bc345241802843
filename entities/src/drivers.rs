use crate::geo::GeoPoint;
use crate::vehicles::VehicleId;
use serde::{Deserialize, Serialize};
use shared_kernel::{non_empty_string, string_key, uuid_key};

uuid_key!(DriverId);
non_empty_string!(DriverName);
string_key!(LicenseNumber);
string_key!(PhoneNumber);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Available,
    OnRide,
    Offline,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: DriverName,
    pub phone_number: PhoneNumber,
    pub license_number: LicenseNumber,
    /// 1.0 to 5.0.
    pub rating: f32,
    pub status: DriverStatus,
    /// Exclusive assignment: one driver per vehicle at a time.
    pub vehicle_id: VehicleId,
    pub current_location: Option<GeoPoint>,
}
