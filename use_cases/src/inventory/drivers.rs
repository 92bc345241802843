use entities::drivers::{Driver, DriverId, DriverName, DriverStatus, LicenseNumber, PhoneNumber};
use entities::vehicles::VehicleId;
use std::sync::Arc;
use thiserror::Error;

use crate::actor::{Actor, Permission, PermissionDenied};
use crate::inventory::InventoryRepo;

pub const DEFAULT_DRIVER_RATING: f32 = 5.0;

#[derive(Error, Debug)]
pub enum DriverAdminError {
    #[error(transparent)]
    Forbidden(#[from] PermissionDenied),
    #[error("driver not found")]
    NotFound,
    #[error("vehicle not found")]
    VehicleNotFound,
    #[error("driver with this license number already exists")]
    DuplicateLicense,
    #[error("vehicle is already assigned to another driver")]
    VehicleAlreadyAssigned { driver: DriverId },
    #[error("cannot change driver status to offline while on active ride")]
    OnActiveRide,
    #[error("cannot delete driver with active rides")]
    HasOpenRides { count: usize },
    #[error("{0}")]
    InvalidName(String),
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub name: String,
    pub phone_number: PhoneNumber,
    pub license_number: LicenseNumber,
    pub vehicle_id: VehicleId,
    pub status: Option<DriverStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct DriverPatch {
    pub name: Option<DriverName>,
    pub phone_number: Option<PhoneNumber>,
    pub license_number: Option<LicenseNumber>,
    pub vehicle_id: Option<VehicleId>,
    pub status: Option<DriverStatus>,
}

pub struct DriverAdminInteractor {
    repo: Arc<dyn InventoryRepo>,
}

impl DriverAdminInteractor {
    pub fn new(repo: Arc<dyn InventoryRepo>) -> Self {
        Self { repo }
    }

    /// License uniqueness and exclusive vehicle assignment are enforced by
    /// the store in the same unit as the insert.
    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn create(
        &self,
        actor: &dyn Actor,
        driver: NewDriver,
    ) -> Result<Driver, DriverAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;

        let name = DriverName::try_from(driver.name).map_err(DriverAdminError::InvalidName)?;
        let driver = Driver {
            id: DriverId::new(),
            name,
            phone_number: driver.phone_number,
            license_number: driver.license_number,
            rating: DEFAULT_DRIVER_RATING,
            status: driver.status.unwrap_or(DriverStatus::Available),
            vehicle_id: driver.vehicle_id,
            current_location: None,
        };

        self.repo.insert_driver(driver).await
    }

    /// Vehicle reassignment releases the old assignment and claims the new
    /// vehicle atomically; moving a driver offline is refused while an open
    /// ride still references them.
    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn update(
        &self,
        actor: &dyn Actor,
        id: DriverId,
        patch: DriverPatch,
    ) -> Result<Driver, DriverAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo.update_driver(id, patch).await
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn delete(&self, actor: &dyn Actor, id: DriverId) -> Result<(), DriverAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo.delete_driver(id).await
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn list(&self, actor: &dyn Actor) -> Result<Vec<Driver>, DriverAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        let mut drivers = self.repo.list_drivers().await?;
        drivers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(drivers)
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn get(&self, actor: &dyn Actor, id: DriverId) -> Result<Driver, DriverAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo
            .find_driver(id)
            .await?
            .ok_or(DriverAdminError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::MockActor;
    use crate::inventory::MockInventoryRepo;
    use entities::users::UserId;

    fn admin() -> MockActor {
        let mut actor = MockActor::new();
        actor.expect_user_id().returning(UserId::new);
        actor.expect_check_for_permission().returning(|_| Ok(()));
        actor
    }

    #[tokio::test]
    async fn test_new_drivers_default_to_available_with_top_rating() {
        let mut repo = MockInventoryRepo::new();
        repo.expect_insert_driver().returning(|driver| Ok(driver));

        let interactor = DriverAdminInteractor::new(Arc::new(repo));
        let driver = interactor
            .create(
                &admin(),
                NewDriver {
                    name: "Ravi".to_string(),
                    phone_number: PhoneNumber::from("9999999999"),
                    license_number: LicenseNumber::from("DL-0420110012345"),
                    vehicle_id: VehicleId::new(),
                    status: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(driver.status, DriverStatus::Available);
        assert_eq!(driver.rating, DEFAULT_DRIVER_RATING);
    }

    #[tokio::test]
    async fn test_duplicate_license_is_surfaced() {
        let mut repo = MockInventoryRepo::new();
        repo.expect_insert_driver()
            .returning(|_| Err(DriverAdminError::DuplicateLicense));

        let interactor = DriverAdminInteractor::new(Arc::new(repo));
        let result = interactor
            .create(
                &admin(),
                NewDriver {
                    name: "Ravi".to_string(),
                    phone_number: PhoneNumber::from("9999999999"),
                    license_number: LicenseNumber::from("DL-0420110012345"),
                    vehicle_id: VehicleId::new(),
                    status: None,
                },
            )
            .await;

        assert!(matches!(result, Err(DriverAdminError::DuplicateLicense)));
    }
}
