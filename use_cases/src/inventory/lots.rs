use entities::geo::GeoPoint;
use entities::parking::{LotId, LotName, ParkingLot};
use entities::stations::StationId;
use std::sync::Arc;
use thiserror::Error;

use crate::actor::{Actor, Permission, PermissionDenied};
use crate::inventory::InventoryRepo;

#[derive(Error, Debug)]
pub enum LotAdminError {
    #[error(transparent)]
    Forbidden(#[from] PermissionDenied),
    #[error("parking lot not found")]
    NotFound,
    #[error("metro station not found")]
    StationNotFound,
    #[error("cannot reduce total slots below current occupied slots count")]
    TotalBelowOccupied { occupied: u32 },
    #[error("cannot delete parking lot with active reservations")]
    HasActiveReservations { count: usize },
    #[error("{0}")]
    InvalidName(String),
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct NewLot {
    pub name: String,
    pub location: GeoPoint,
    pub total_slots: u32,
    pub metro_station_id: StationId,
}

#[derive(Debug, Clone, Default)]
pub struct LotPatch {
    pub name: Option<LotName>,
    pub location: Option<GeoPoint>,
    pub total_slots: Option<u32>,
    pub metro_station_id: Option<StationId>,
}

pub struct LotAdminInteractor {
    repo: Arc<dyn InventoryRepo>,
}

impl LotAdminInteractor {
    pub fn new(repo: Arc<dyn InventoryRepo>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn create(
        &self,
        actor: &dyn Actor,
        lot: NewLot,
    ) -> Result<ParkingLot, LotAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;

        self.repo
            .find_station(lot.metro_station_id)
            .await?
            .ok_or(LotAdminError::StationNotFound)?;

        let name = LotName::try_from(lot.name).map_err(LotAdminError::InvalidName)?;
        let lot = ParkingLot {
            id: LotId::new(),
            name,
            location: lot.location,
            total_slots: lot.total_slots,
            occupied_slots: 0,
            slot_ids: vec![],
            metro_station_id: lot.metro_station_id,
        };

        self.repo.insert_lot(lot).await.map_err(Into::into)
    }

    /// The occupancy guard (`total_slots >= occupied_slots`) and the station
    /// reference check run inside the store.
    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn update(
        &self,
        actor: &dyn Actor,
        id: LotId,
        patch: LotPatch,
    ) -> Result<ParkingLot, LotAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo.update_lot(id, patch).await
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn delete(&self, actor: &dyn Actor, id: LotId) -> Result<(), LotAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo.delete_lot(id).await
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn list(&self) -> anyhow::Result<Vec<ParkingLot>> {
        let mut lots = self.repo.list_lots().await?;
        lots.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(lots)
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn for_station(&self, station: StationId) -> anyhow::Result<Vec<ParkingLot>> {
        self.repo.lots_for_station(station).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::MockActor;
    use crate::inventory::MockInventoryRepo;
    use entities::stations::{MetroStation, StationName};
    use entities::users::UserId;

    fn admin() -> MockActor {
        let mut actor = MockActor::new();
        actor.expect_user_id().returning(UserId::new);
        actor.expect_check_for_permission().returning(|_| Ok(()));
        actor
    }

    #[tokio::test]
    async fn test_lot_creation_requires_an_existing_station() {
        let mut repo = MockInventoryRepo::new();
        repo.expect_find_station().returning(|_| Ok(None));
        repo.expect_insert_lot().never();

        let interactor = LotAdminInteractor::new(Arc::new(repo));
        let result = interactor
            .create(
                &admin(),
                NewLot {
                    name: "Central".to_string(),
                    location: GeoPoint::new(77.2167, 28.6328),
                    total_slots: 40,
                    metro_station_id: StationId::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(LotAdminError::StationNotFound)));
    }

    #[tokio::test]
    async fn test_new_lots_start_unoccupied() {
        let station = MetroStation {
            id: StationId::new(),
            name: StationName::try_from("Rajiv Chowk".to_string()).unwrap(),
            location: GeoPoint::new(77.2167, 28.6328),
        };

        let mut repo = MockInventoryRepo::new();
        {
            let station = station.clone();
            repo.expect_find_station()
                .returning(move |_| Ok(Some(station.clone())));
        }
        repo.expect_insert_lot().returning(|lot| Ok(lot));

        let interactor = LotAdminInteractor::new(Arc::new(repo));
        let lot = interactor
            .create(
                &admin(),
                NewLot {
                    name: "Central".to_string(),
                    location: GeoPoint::new(77.2167, 28.6328),
                    total_slots: 40,
                    metro_station_id: station.id,
                },
            )
            .await
            .unwrap();

        assert_eq!(lot.occupied_slots, 0);
        assert_eq!(lot.total_slots, 40);
        assert!(lot.slot_ids.is_empty());
    }
}
