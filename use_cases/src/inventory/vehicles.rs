use entities::drivers::DriverId;
use entities::stations::StationId;
use entities::vehicles::{RegistrationNumber, Vehicle, VehicleId, VehicleStatus, VehicleType};
use std::sync::Arc;
use thiserror::Error;

use crate::actor::{Actor, Permission, PermissionDenied};
use crate::inventory::InventoryRepo;

#[derive(Error, Debug)]
pub enum VehicleAdminError {
    #[error(transparent)]
    Forbidden(#[from] PermissionDenied),
    #[error("vehicle not found")]
    NotFound,
    #[error("base station not found")]
    StationNotFound,
    #[error("vehicle with this registration number already exists")]
    DuplicateRegistration,
    #[error("cannot change vehicle status while it is in use")]
    InUse,
    #[error("cannot delete vehicle assigned to a driver")]
    Assigned { driver: DriverId },
    #[error("cannot delete vehicle with active rides")]
    HasOpenRides { count: usize },
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub vehicle_type: VehicleType,
    pub registration_number: RegistrationNumber,
    pub model: String,
    /// Defaults to the capacity fixed by the vehicle type.
    pub capacity: Option<u8>,
    pub status: Option<VehicleStatus>,
    pub base_station_id: StationId,
}

#[derive(Debug, Clone, Default)]
pub struct VehiclePatch {
    pub vehicle_type: Option<VehicleType>,
    pub registration_number: Option<RegistrationNumber>,
    pub model: Option<String>,
    pub capacity: Option<u8>,
    pub status: Option<VehicleStatus>,
    pub base_station_id: Option<StationId>,
}

pub struct VehicleAdminInteractor {
    repo: Arc<dyn InventoryRepo>,
}

impl VehicleAdminInteractor {
    pub fn new(repo: Arc<dyn InventoryRepo>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn create(
        &self,
        actor: &dyn Actor,
        vehicle: NewVehicle,
    ) -> Result<Vehicle, VehicleAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;

        self.repo
            .find_station(vehicle.base_station_id)
            .await?
            .ok_or(VehicleAdminError::StationNotFound)?;

        let capacity = vehicle
            .capacity
            .unwrap_or_else(|| vehicle.vehicle_type.capacity());
        let vehicle = Vehicle {
            id: VehicleId::new(),
            vehicle_type: vehicle.vehicle_type,
            registration_number: vehicle.registration_number,
            model: vehicle.model,
            capacity,
            status: vehicle.status.unwrap_or(VehicleStatus::Active),
            base_station_id: vehicle.base_station_id,
        };

        self.repo.insert_vehicle(vehicle).await
    }

    /// Status changes away from active are refused while the assigned driver
    /// is on a ride or the vehicle still has open rides; the store checks
    /// both under its guard.
    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn update(
        &self,
        actor: &dyn Actor,
        id: VehicleId,
        patch: VehiclePatch,
    ) -> Result<Vehicle, VehicleAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo.update_vehicle(id, patch).await
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn delete(&self, actor: &dyn Actor, id: VehicleId) -> Result<(), VehicleAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo.delete_vehicle(id).await
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn list(&self, actor: &dyn Actor) -> Result<Vec<Vehicle>, VehicleAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        let mut vehicles = self.repo.list_vehicles().await?;
        vehicles.sort_by(|a, b| {
            a.vehicle_type
                .to_string()
                .cmp(&b.vehicle_type.to_string())
                .then_with(|| a.registration_number.cmp(&b.registration_number))
        });
        Ok(vehicles)
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn get(
        &self,
        actor: &dyn Actor,
        id: VehicleId,
    ) -> Result<(Vehicle, Option<DriverId>), VehicleAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;

        let vehicle = self
            .repo
            .find_vehicle(id)
            .await?
            .ok_or(VehicleAdminError::NotFound)?;
        let assigned = self.repo.assigned_driver(id).await?;

        Ok((vehicle, assigned.map(|driver| driver.id)))
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn for_station(
        &self,
        actor: &dyn Actor,
        station: StationId,
    ) -> Result<Vec<Vehicle>, VehicleAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;

        self.repo
            .find_station(station)
            .await?
            .ok_or(VehicleAdminError::StationNotFound)?;
        self.repo
            .vehicles_for_station(station)
            .await
            .map_err(Into::into)
    }
}
