use crate::stations::StationId;
use serde::{Deserialize, Serialize};
use shared_kernel::{string_key, uuid_key};

uuid_key!(VehicleId);
string_key!(RegistrationNumber);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(rename = "e-rickshaw")]
    ERickshaw,
    #[serde(rename = "cab")]
    Cab,
    #[serde(rename = "shuttle")]
    Shuttle,
}

impl VehicleType {
    pub fn capacity(&self) -> u8 {
        match self {
            VehicleType::ERickshaw => 3,
            VehicleType::Cab => 4,
            VehicleType::Shuttle => 8,
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            VehicleType::ERickshaw => "e-rickshaw",
            VehicleType::Cab => "cab",
            VehicleType::Shuttle => "shuttle",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Active,
    Maintenance,
    Inactive,
}

/// The driver assignment is owned by `Driver::vehicle_id`; a vehicle carries
/// no back-reference of its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub registration_number: RegistrationNumber,
    pub model: String,
    pub capacity: u8,
    pub status: VehicleStatus,
    pub base_station_id: StationId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_fixed_per_type() {
        assert_eq!(VehicleType::ERickshaw.capacity(), 3);
        assert_eq!(VehicleType::Cab.capacity(), 4);
        assert_eq!(VehicleType::Shuttle.capacity(), 8);
    }

    #[test]
    fn test_vehicle_type_serializes_with_hyphenated_name() {
        let serialized = serde_json::to_string(&VehicleType::ERickshaw).unwrap();
        assert_eq!(serialized, "\"e-rickshaw\"");
    }
}
