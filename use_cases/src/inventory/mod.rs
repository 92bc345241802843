//! Administration of the bookable inventory: stations, lots, slots, drivers
//! and vehicles. Mutations require the manage-inventory permission; the
//! check-then-act guards (uniqueness, occupancy, assignment exclusivity,
//! active-booking protection) run atomically inside the store.

pub mod drivers;
pub mod lots;
pub mod slots;
pub mod stations;
pub mod vehicles;

use async_trait::async_trait;
use entities::drivers::{Driver, DriverId};
use entities::parking::{LotId, ParkingLot, ParkingSlot, SlotId, TimeRestriction};
use entities::stations::{MetroStation, StationId};
use entities::vehicles::{Vehicle, VehicleId};
#[cfg(test)]
use mockall::automock;

use crate::inventory::drivers::{DriverAdminError, DriverPatch};
use crate::inventory::lots::{LotAdminError, LotPatch};
use crate::inventory::slots::{SlotAdminError, SlotPatch};
use crate::inventory::stations::{StationAdminError, StationPatch};
use crate::inventory::vehicles::{VehicleAdminError, VehiclePatch};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait InventoryRepo: Send + Sync {
    // Stations
    async fn find_station(&self, id: StationId) -> anyhow::Result<Option<MetroStation>>;

    async fn list_stations(&self) -> anyhow::Result<Vec<MetroStation>>;

    async fn insert_station(&self, station: MetroStation) -> anyhow::Result<MetroStation>;

    async fn update_station(
        &self,
        id: StationId,
        patch: StationPatch,
    ) -> Result<MetroStation, StationAdminError>;

    /// Refuses while any parking lot references the station.
    async fn delete_station(&self, id: StationId) -> Result<(), StationAdminError>;

    // Lots
    async fn list_lots(&self) -> anyhow::Result<Vec<ParkingLot>>;

    async fn lots_for_station(&self, station: StationId) -> anyhow::Result<Vec<ParkingLot>>;

    async fn insert_lot(&self, lot: ParkingLot) -> anyhow::Result<ParkingLot>;

    /// Guards `total_slots >= occupied_slots` under the lot's lock.
    async fn update_lot(&self, id: LotId, patch: LotPatch) -> Result<ParkingLot, LotAdminError>;

    /// Refuses while the lot has active reservations; otherwise cascades to
    /// its slots.
    async fn delete_lot(&self, id: LotId) -> Result<(), LotAdminError>;

    // Slots
    async fn insert_slot(&self, slot: ParkingSlot) -> Result<ParkingSlot, SlotAdminError>;

    /// All-or-nothing batch insert; duplicate numbers fail the whole batch.
    async fn insert_slots(&self, slots: Vec<ParkingSlot>)
        -> Result<Vec<ParkingSlot>, SlotAdminError>;

    /// Status moves to maintenance/occupied are refused while the slot has
    /// active reservations.
    async fn update_slot(&self, id: SlotId, patch: SlotPatch)
        -> Result<ParkingSlot, SlotAdminError>;

    async fn delete_slot(&self, id: SlotId) -> Result<(), SlotAdminError>;

    /// Refused when the restriction overlaps an active reservation's window.
    async fn add_time_restriction(
        &self,
        id: SlotId,
        restriction: TimeRestriction,
    ) -> Result<ParkingSlot, SlotAdminError>;

    async fn remove_time_restriction(
        &self,
        id: SlotId,
        index: usize,
    ) -> Result<ParkingSlot, SlotAdminError>;

    // Drivers
    async fn find_driver(&self, id: DriverId) -> anyhow::Result<Option<Driver>>;

    async fn list_drivers(&self) -> anyhow::Result<Vec<Driver>>;

    /// Enforces license uniqueness and exclusive vehicle assignment.
    async fn insert_driver(&self, driver: Driver) -> Result<Driver, DriverAdminError>;

    async fn update_driver(
        &self,
        id: DriverId,
        patch: DriverPatch,
    ) -> Result<Driver, DriverAdminError>;

    /// Refuses while the driver has pending or active rides.
    async fn delete_driver(&self, id: DriverId) -> Result<(), DriverAdminError>;

    // Vehicles
    async fn find_vehicle(&self, id: VehicleId) -> anyhow::Result<Option<Vehicle>>;

    async fn list_vehicles(&self) -> anyhow::Result<Vec<Vehicle>>;

    async fn vehicles_for_station(&self, station: StationId) -> anyhow::Result<Vec<Vehicle>>;

    /// Derived lookup for the owning relation on `Driver::vehicle_id`.
    async fn assigned_driver(&self, vehicle: VehicleId) -> anyhow::Result<Option<Driver>>;

    async fn insert_vehicle(&self, vehicle: Vehicle) -> Result<Vehicle, VehicleAdminError>;

    async fn update_vehicle(
        &self,
        id: VehicleId,
        patch: VehiclePatch,
    ) -> Result<Vehicle, VehicleAdminError>;

    async fn delete_vehicle(&self, id: VehicleId) -> Result<(), VehicleAdminError>;
}
