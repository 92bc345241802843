use crate::geo::GeoPoint;
use crate::stations::StationId;
use serde::{Deserialize, Serialize};
use shared_kernel::{non_empty_string, string_key, uuid_key, TimeWindow};

uuid_key!(LotId);
uuid_key!(SlotId);
non_empty_string!(LotName);
string_key!(ZoneName);
string_key!(SlotNumber);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParkingLot {
    pub id: LotId,
    pub name: LotName,
    pub location: GeoPoint,
    pub total_slots: u32,
    /// Cached counter, kept `<= total_slots` by the slot allocator.
    pub occupied_slots: u32,
    pub slot_ids: Vec<SlotId>,
    pub metro_station_id: StationId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Occupied,
    Maintenance,
}

/// Admin-imposed blackout on a slot, independent of reservations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimeRestriction {
    pub window: TimeWindow,
    pub reason: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParkingSlot {
    pub id: SlotId,
    pub lot_id: LotId,
    pub slot_number: SlotNumber,
    pub zone: ZoneName,
    pub status: SlotStatus,
    pub time_restrictions: Vec<TimeRestriction>,
}
