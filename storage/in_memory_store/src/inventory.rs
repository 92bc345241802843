use async_trait::async_trait;
use entities::drivers::{Driver, DriverId, DriverStatus};
use entities::parking::{LotId, ParkingLot, ParkingSlot, SlotId, SlotStatus, TimeRestriction};
use entities::stations::{MetroStation, StationId};
use entities::vehicles::{Vehicle, VehicleId, VehicleStatus};

use crate::repository::Repository;
use use_cases::inventory::drivers::{DriverAdminError, DriverPatch};
use use_cases::inventory::lots::{LotAdminError, LotPatch};
use use_cases::inventory::slots::{SlotAdminError, SlotPatch};
use use_cases::inventory::stations::{StationAdminError, StationPatch};
use use_cases::inventory::vehicles::{VehicleAdminError, VehiclePatch};
use use_cases::inventory::InventoryRepo;

#[async_trait]
impl InventoryRepo for Repository {
    async fn find_station(&self, id: StationId) -> anyhow::Result<Option<MetroStation>> {
        Ok(self.read().await.stations.get(&id).cloned())
    }

    async fn list_stations(&self) -> anyhow::Result<Vec<MetroStation>> {
        Ok(self.read().await.stations.values().cloned().collect())
    }

    async fn insert_station(&self, station: MetroStation) -> anyhow::Result<MetroStation> {
        self.write()
            .await
            .stations
            .insert(station.id, station.clone());
        Ok(station)
    }

    async fn update_station(
        &self,
        id: StationId,
        patch: StationPatch,
    ) -> Result<MetroStation, StationAdminError> {
        let mut state = self.write().await;
        let station = state
            .stations
            .get_mut(&id)
            .ok_or(StationAdminError::NotFound)?;

        if let Some(name) = patch.name {
            station.name = name;
        }
        if let Some(location) = patch.location {
            station.location = location;
        }

        Ok(station.clone())
    }

    async fn delete_station(&self, id: StationId) -> Result<(), StationAdminError> {
        let mut state = self.write().await;
        if !state.stations.contains_key(&id) {
            return Err(StationAdminError::NotFound);
        }

        let count = state
            .lots
            .values()
            .filter(|lot| lot.metro_station_id == id)
            .count();
        if count > 0 {
            return Err(StationAdminError::HasParkingLots { count });
        }

        state.stations.remove(&id);
        Ok(())
    }

    async fn list_lots(&self) -> anyhow::Result<Vec<ParkingLot>> {
        Ok(self.read().await.lots.values().cloned().collect())
    }

    async fn lots_for_station(&self, station: StationId) -> anyhow::Result<Vec<ParkingLot>> {
        Ok(self
            .read()
            .await
            .lots
            .values()
            .filter(|lot| lot.metro_station_id == station)
            .cloned()
            .collect())
    }

    async fn insert_lot(&self, lot: ParkingLot) -> anyhow::Result<ParkingLot> {
        self.write().await.lots.insert(lot.id, lot.clone());
        Ok(lot)
    }

    async fn update_lot(&self, id: LotId, patch: LotPatch) -> Result<ParkingLot, LotAdminError> {
        let mut state = self.write().await;

        if let Some(station) = patch.metro_station_id {
            if !state.stations.contains_key(&station) {
                return Err(LotAdminError::StationNotFound);
            }
        }

        let lot = state.lots.get_mut(&id).ok_or(LotAdminError::NotFound)?;

        if let Some(total_slots) = patch.total_slots {
            if total_slots < lot.occupied_slots {
                return Err(LotAdminError::TotalBelowOccupied {
                    occupied: lot.occupied_slots,
                });
            }
            lot.total_slots = total_slots;
        }
        if let Some(name) = patch.name {
            lot.name = name;
        }
        if let Some(location) = patch.location {
            lot.location = location;
        }
        if let Some(station) = patch.metro_station_id {
            lot.metro_station_id = station;
        }

        Ok(lot.clone())
    }

    async fn delete_lot(&self, id: LotId) -> Result<(), LotAdminError> {
        let mut state = self.write().await;
        if !state.lots.contains_key(&id) {
            return Err(LotAdminError::NotFound);
        }

        let count = state
            .reservations
            .values()
            .filter(|reservation| reservation.parking_lot_id == id && reservation.is_active())
            .count();
        if count > 0 {
            return Err(LotAdminError::HasActiveReservations { count });
        }

        state.slots.retain(|_, slot| slot.lot_id != id);
        state.lots.remove(&id);
        Ok(())
    }

    async fn insert_slot(&self, slot: ParkingSlot) -> Result<ParkingSlot, SlotAdminError> {
        let mut state = self.write().await;

        if !state.lots.contains_key(&slot.lot_id) {
            return Err(SlotAdminError::LotNotFound);
        }
        let duplicate = state
            .slots
            .values()
            .any(|existing| existing.lot_id == slot.lot_id && existing.slot_number == slot.slot_number);
        if duplicate {
            return Err(SlotAdminError::DuplicateSlotNumber);
        }

        state.slots.insert(slot.id, slot.clone());
        let lot = state
            .lots
            .get_mut(&slot.lot_id)
            .expect("lot present under the same guard");
        lot.slot_ids.push(slot.id);

        Ok(slot)
    }

    async fn insert_slots(
        &self,
        slots: Vec<ParkingSlot>,
    ) -> Result<Vec<ParkingSlot>, SlotAdminError> {
        let mut state = self.write().await;

        for slot in &slots {
            if !state.lots.contains_key(&slot.lot_id) {
                return Err(SlotAdminError::LotNotFound);
            }
            let duplicate = state.slots.values().any(|existing| {
                existing.lot_id == slot.lot_id && existing.slot_number == slot.slot_number
            });
            if duplicate {
                return Err(SlotAdminError::DuplicateSlotNumber);
            }
        }

        for slot in &slots {
            state.slots.insert(slot.id, slot.clone());
            let lot = state
                .lots
                .get_mut(&slot.lot_id)
                .expect("checked under the same guard");
            lot.slot_ids.push(slot.id);
        }

        Ok(slots)
    }

    async fn update_slot(
        &self,
        id: SlotId,
        patch: SlotPatch,
    ) -> Result<ParkingSlot, SlotAdminError> {
        let mut state = self.write().await;

        let slot = state.slots.get(&id).ok_or(SlotAdminError::NotFound)?.clone();

        if let Some(number) = &patch.slot_number {
            let duplicate = state.slots.values().any(|existing| {
                existing.lot_id == slot.lot_id
                    && existing.slot_number == *number
                    && existing.id != id
            });
            if duplicate {
                return Err(SlotAdminError::DuplicateSlotNumber);
            }
        }

        if let Some(status) = patch.status {
            let occupying = status == SlotStatus::Maintenance || status == SlotStatus::Occupied;
            if occupying && status != slot.status {
                let count = state.active_reservation_count_for_slot(id);
                if count > 0 {
                    return Err(SlotAdminError::HasActiveReservations { count });
                }
            }
        }

        let slot = state
            .slots
            .get_mut(&id)
            .expect("slot present under the same guard");
        if let Some(number) = patch.slot_number {
            slot.slot_number = number;
        }
        if let Some(zone) = patch.zone {
            slot.zone = zone;
        }
        if let Some(status) = patch.status {
            slot.status = status;
        }

        Ok(slot.clone())
    }

    async fn delete_slot(&self, id: SlotId) -> Result<(), SlotAdminError> {
        let mut state = self.write().await;

        let slot = state.slots.get(&id).ok_or(SlotAdminError::NotFound)?.clone();

        let count = state.active_reservation_count_for_slot(id);
        if count > 0 {
            return Err(SlotAdminError::HasActiveReservations { count });
        }

        if let Some(lot) = state.lots.get_mut(&slot.lot_id) {
            lot.slot_ids.retain(|slot_id| *slot_id != id);
        }
        state.slots.remove(&id);
        Ok(())
    }

    async fn add_time_restriction(
        &self,
        id: SlotId,
        restriction: TimeRestriction,
    ) -> Result<ParkingSlot, SlotAdminError> {
        let mut state = self.write().await;

        if !state.slots.contains_key(&id) {
            return Err(SlotAdminError::NotFound);
        }

        let overlapping = state
            .active_windows_for_slot(id, None)
            .iter()
            .filter(|window| restriction.window.overlaps(window))
            .count();
        if overlapping > 0 {
            return Err(SlotAdminError::RestrictionOverlapsReservations { count: overlapping });
        }

        let slot = state
            .slots
            .get_mut(&id)
            .expect("slot present under the same guard");
        slot.time_restrictions.push(restriction);
        Ok(slot.clone())
    }

    async fn remove_time_restriction(
        &self,
        id: SlotId,
        index: usize,
    ) -> Result<ParkingSlot, SlotAdminError> {
        let mut state = self.write().await;

        let slot = state.slots.get_mut(&id).ok_or(SlotAdminError::NotFound)?;
        if index >= slot.time_restrictions.len() {
            return Err(SlotAdminError::InvalidRestrictionIndex);
        }

        slot.time_restrictions.remove(index);
        Ok(slot.clone())
    }

    async fn find_driver(&self, id: DriverId) -> anyhow::Result<Option<Driver>> {
        Ok(self.read().await.drivers.get(&id).cloned())
    }

    async fn list_drivers(&self) -> anyhow::Result<Vec<Driver>> {
        Ok(self.read().await.drivers.values().cloned().collect())
    }

    async fn insert_driver(&self, driver: Driver) -> Result<Driver, DriverAdminError> {
        let mut state = self.write().await;

        let duplicate = state
            .drivers
            .values()
            .any(|existing| existing.license_number == driver.license_number);
        if duplicate {
            return Err(DriverAdminError::DuplicateLicense);
        }
        if !state.vehicles.contains_key(&driver.vehicle_id) {
            return Err(DriverAdminError::VehicleNotFound);
        }
        if let Some(existing) = state
            .drivers
            .values()
            .find(|existing| existing.vehicle_id == driver.vehicle_id)
        {
            return Err(DriverAdminError::VehicleAlreadyAssigned {
                driver: existing.id,
            });
        }

        state.driver_order.push(driver.id);
        state.drivers.insert(driver.id, driver.clone());
        Ok(driver)
    }

    async fn update_driver(
        &self,
        id: DriverId,
        patch: DriverPatch,
    ) -> Result<Driver, DriverAdminError> {
        let mut state = self.write().await;

        let driver = state
            .drivers
            .get(&id)
            .ok_or(DriverAdminError::NotFound)?
            .clone();

        if let Some(license) = &patch.license_number {
            let duplicate = state
                .drivers
                .values()
                .any(|existing| existing.license_number == *license && existing.id != id);
            if duplicate {
                return Err(DriverAdminError::DuplicateLicense);
            }
        }

        if let Some(vehicle_id) = patch.vehicle_id {
            if vehicle_id != driver.vehicle_id {
                if !state.vehicles.contains_key(&vehicle_id) {
                    return Err(DriverAdminError::VehicleNotFound);
                }
                if let Some(existing) = state
                    .drivers
                    .values()
                    .find(|existing| existing.vehicle_id == vehicle_id && existing.id != id)
                {
                    return Err(DriverAdminError::VehicleAlreadyAssigned {
                        driver: existing.id,
                    });
                }
            }
        }

        if let Some(DriverStatus::Offline) = patch.status {
            if driver.status == DriverStatus::OnRide
                && state.open_rides_for_driver(id, None) > 0
            {
                return Err(DriverAdminError::OnActiveRide);
            }
        }

        let driver = state
            .drivers
            .get_mut(&id)
            .expect("driver present under the same guard");
        if let Some(name) = patch.name {
            driver.name = name;
        }
        if let Some(phone) = patch.phone_number {
            driver.phone_number = phone;
        }
        if let Some(license) = patch.license_number {
            driver.license_number = license;
        }
        if let Some(vehicle_id) = patch.vehicle_id {
            driver.vehicle_id = vehicle_id;
        }
        if let Some(status) = patch.status {
            driver.status = status;
        }

        Ok(driver.clone())
    }

    async fn delete_driver(&self, id: DriverId) -> Result<(), DriverAdminError> {
        let mut state = self.write().await;

        if !state.drivers.contains_key(&id) {
            return Err(DriverAdminError::NotFound);
        }

        let count = state.open_rides_for_driver(id, None);
        if count > 0 {
            return Err(DriverAdminError::HasOpenRides { count });
        }

        state.drivers.remove(&id);
        state.driver_order.retain(|driver_id| *driver_id != id);
        Ok(())
    }

    async fn find_vehicle(&self, id: VehicleId) -> anyhow::Result<Option<Vehicle>> {
        Ok(self.read().await.vehicles.get(&id).cloned())
    }

    async fn list_vehicles(&self) -> anyhow::Result<Vec<Vehicle>> {
        Ok(self.read().await.vehicles.values().cloned().collect())
    }

    async fn vehicles_for_station(&self, station: StationId) -> anyhow::Result<Vec<Vehicle>> {
        Ok(self
            .read()
            .await
            .vehicles
            .values()
            .filter(|vehicle| vehicle.base_station_id == station)
            .cloned()
            .collect())
    }

    async fn assigned_driver(&self, vehicle: VehicleId) -> anyhow::Result<Option<Driver>> {
        Ok(self
            .read()
            .await
            .drivers
            .values()
            .find(|driver| driver.vehicle_id == vehicle)
            .cloned())
    }

    async fn insert_vehicle(&self, vehicle: Vehicle) -> Result<Vehicle, VehicleAdminError> {
        let mut state = self.write().await;

        let duplicate = state
            .vehicles
            .values()
            .any(|existing| existing.registration_number == vehicle.registration_number);
        if duplicate {
            return Err(VehicleAdminError::DuplicateRegistration);
        }
        if !state.stations.contains_key(&vehicle.base_station_id) {
            return Err(VehicleAdminError::StationNotFound);
        }

        state.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn update_vehicle(
        &self,
        id: VehicleId,
        patch: VehiclePatch,
    ) -> Result<Vehicle, VehicleAdminError> {
        let mut state = self.write().await;

        let vehicle = state
            .vehicles
            .get(&id)
            .ok_or(VehicleAdminError::NotFound)?
            .clone();

        if let Some(registration) = &patch.registration_number {
            let duplicate = state.vehicles.values().any(|existing| {
                existing.registration_number == *registration && existing.id != id
            });
            if duplicate {
                return Err(VehicleAdminError::DuplicateRegistration);
            }
        }

        if let Some(station) = patch.base_station_id {
            if !state.stations.contains_key(&station) {
                return Err(VehicleAdminError::StationNotFound);
            }
        }

        if let Some(status) = patch.status {
            let leaving_active = vehicle.status == VehicleStatus::Active
                && status != VehicleStatus::Active;
            if leaving_active {
                let driver_on_ride = state
                    .drivers
                    .values()
                    .any(|driver| driver.vehicle_id == id && driver.status == DriverStatus::OnRide);
                if driver_on_ride || state.open_rides_for_vehicle(id) > 0 {
                    return Err(VehicleAdminError::InUse);
                }
            }
        }

        let vehicle = state
            .vehicles
            .get_mut(&id)
            .expect("vehicle present under the same guard");
        if let Some(vehicle_type) = patch.vehicle_type {
            vehicle.vehicle_type = vehicle_type;
        }
        if let Some(registration) = patch.registration_number {
            vehicle.registration_number = registration;
        }
        if let Some(model) = patch.model {
            vehicle.model = model;
        }
        if let Some(capacity) = patch.capacity {
            vehicle.capacity = capacity;
        }
        if let Some(status) = patch.status {
            vehicle.status = status;
        }
        if let Some(station) = patch.base_station_id {
            vehicle.base_station_id = station;
        }

        Ok(vehicle.clone())
    }

    async fn delete_vehicle(&self, id: VehicleId) -> Result<(), VehicleAdminError> {
        let mut state = self.write().await;

        if !state.vehicles.contains_key(&id) {
            return Err(VehicleAdminError::NotFound);
        }

        if let Some(driver) = state
            .drivers
            .values()
            .find(|driver| driver.vehicle_id == id)
        {
            return Err(VehicleAdminError::Assigned { driver: driver.id });
        }

        let count = state.open_rides_for_vehicle(id);
        if count > 0 {
            return Err(VehicleAdminError::HasOpenRides { count });
        }

        state.vehicles.remove(&id);
        Ok(())
    }
}
