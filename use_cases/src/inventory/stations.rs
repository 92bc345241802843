use entities::geo::GeoPoint;
use entities::stations::{MetroStation, StationId, StationName};
use itertools::Itertools;
use std::sync::Arc;
use thiserror::Error;

use crate::actor::{Actor, Permission, PermissionDenied};
use crate::inventory::InventoryRepo;

/// Discovery queries cap their result size the way the transport expects.
pub const DISCOVERY_LIMIT: usize = 10;

pub const DEFAULT_NEARBY_RADIUS_METERS: f64 = 10_000.0;

#[derive(Error, Debug)]
pub enum StationAdminError {
    #[error(transparent)]
    Forbidden(#[from] PermissionDenied),
    #[error("metro station not found")]
    NotFound,
    #[error("cannot delete station with associated parking lots")]
    HasParkingLots { count: usize },
    #[error("{0}")]
    InvalidName(String),
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct NewStation {
    pub name: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Default)]
pub struct StationPatch {
    pub name: Option<StationName>,
    pub location: Option<GeoPoint>,
}

pub struct StationAdminInteractor {
    repo: Arc<dyn InventoryRepo>,
}

impl StationAdminInteractor {
    pub fn new(repo: Arc<dyn InventoryRepo>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn create(
        &self,
        actor: &dyn Actor,
        station: NewStation,
    ) -> Result<MetroStation, StationAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;

        let name = StationName::try_from(station.name).map_err(StationAdminError::InvalidName)?;
        let station = MetroStation {
            id: StationId::new(),
            name,
            location: station.location,
        };

        self.repo.insert_station(station).await.map_err(Into::into)
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn update(
        &self,
        actor: &dyn Actor,
        id: StationId,
        patch: StationPatch,
    ) -> Result<MetroStation, StationAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo.update_station(id, patch).await
    }

    #[tracing::instrument(err, skip(self, actor), level = "info")]
    pub async fn delete(&self, actor: &dyn Actor, id: StationId) -> Result<(), StationAdminError> {
        actor.check_for_permission(Permission::ManageInventory)?;
        self.repo.delete_station(id).await
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn list(&self) -> anyhow::Result<Vec<MetroStation>> {
        let mut stations = self.repo.list_stations().await?;
        stations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stations)
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn get(&self, id: StationId) -> Result<MetroStation, StationAdminError> {
        self.repo
            .find_station(id)
            .await?
            .ok_or(StationAdminError::NotFound)
    }

    /// Case-insensitive name search, capped at the discovery limit.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn search(&self, query: String) -> anyhow::Result<Vec<MetroStation>> {
        let needle = query.to_lowercase();
        let stations = self.repo.list_stations().await?;
        Ok(stations
            .into_iter()
            .filter(|station| station.name.as_ref().to_lowercase().contains(&needle))
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .take(DISCOVERY_LIMIT)
            .collect())
    }

    /// Plain radius scan over the station list, nearest first.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn nearby(
        &self,
        point: GeoPoint,
        max_distance_meters: Option<f64>,
    ) -> anyhow::Result<Vec<MetroStation>> {
        let radius = max_distance_meters.unwrap_or(DEFAULT_NEARBY_RADIUS_METERS);
        let stations = self.repo.list_stations().await?;
        Ok(stations
            .into_iter()
            .map(|station| {
                let distance = station.location.distance_meters(&point);
                (station, distance)
            })
            .filter(|(_, distance)| *distance <= radius)
            .sorted_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(station, _)| station)
            .take(DISCOVERY_LIMIT)
            .collect())
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
        actor
            .expect_check_for_permission()
            .returning(|_| Ok(()));
        actor
    }

    fn rider() -> MockActor {
        let mut actor = MockActor::new();
        actor.expect_user_id().returning(UserId::new);
        actor
            .expect_check_for_permission()
            .returning(|permission| Err(PermissionDenied(permission)));
        actor
    }

    fn station(name: &str, longitude: f64, latitude: f64) -> MetroStation {
        MetroStation {
            id: StationId::new(),
            name: StationName::try_from(name.to_string()).unwrap(),
            location: GeoPoint::new(longitude, latitude),
        }
    }

    #[tokio::test]
    async fn test_creation_requires_the_inventory_permission() {
        let mut repo = MockInventoryRepo::new();
        repo.expect_insert_station().never();

        let interactor = StationAdminInteractor::new(Arc::new(repo));
        let result = interactor
            .create(
                &rider(),
                NewStation {
                    name: "Rajiv Chowk".to_string(),
                    location: GeoPoint::new(77.2167, 28.6328),
                },
            )
            .await;

        assert!(matches!(result, Err(StationAdminError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_blank_station_names_are_rejected() {
        let interactor = StationAdminInteractor::new(Arc::new(MockInventoryRepo::new()));
        let result = interactor
            .create(
                &admin(),
                NewStation {
                    name: "   ".to_string(),
                    location: GeoPoint::new(77.2167, 28.6328),
                },
            )
            .await;

        assert!(matches!(result, Err(StationAdminError::InvalidName(_))));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_capped() {
        let mut stations: Vec<_> = (0..15)
            .map(|i| station(&format!("Rajiv Chowk {i}"), 77.0, 28.0))
            .collect();
        stations.push(station("Hauz Khas", 77.2, 28.5));

        let mut repo = MockInventoryRepo::new();
        repo.expect_list_stations()
            .returning(move || Ok(stations.clone()));

        let interactor = StationAdminInteractor::new(Arc::new(repo));
        let matches = interactor.search("rajiv".to_string()).await.unwrap();

        assert_eq!(matches.len(), DISCOVERY_LIMIT);
        assert!(matches
            .iter()
            .all(|station| station.name.as_ref().contains("Rajiv")));
    }

    #[tokio::test]
    async fn test_nearby_filters_by_radius_and_sorts_by_distance() {
        let here = GeoPoint::new(77.2167, 28.6328);
        let close = station("Patel Chowk", 77.2134, 28.6222);
        let far = station("Huda City Centre", 77.0724, 28.4594);

        let mut repo = MockInventoryRepo::new();
        let all = vec![far.clone(), close.clone()];
        repo.expect_list_stations().returning(move || Ok(all.clone()));

        let interactor = StationAdminInteractor::new(Arc::new(repo));
        let nearby = interactor.nearby(here, Some(5_000.0)).await.unwrap();

        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].name, close.name);
    }
}
