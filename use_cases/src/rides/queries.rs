use entities::rides::{Ride, RideId};
use entities::users::UserId;
use std::sync::Arc;
use thiserror::Error;

use crate::rides::RideHailingRepo;

#[derive(Error, Debug)]
pub enum RideQueryError {
    #[error("ride not found")]
    NotFound,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub struct RideQueriesInteractor {
    repo: Arc<dyn RideHailingRepo>,
}

impl RideQueriesInteractor {
    pub fn new(repo: Arc<dyn RideHailingRepo>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Ride>, RideQueryError> {
        let mut rides = self.repo.rides_for_user(user_id).await?;
        rides.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rides)
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn get(&self, user_id: UserId, ride_id: RideId) -> Result<Ride, RideQueryError> {
        self.repo
            .find_ride(ride_id)
            .await?
            .filter(|ride| ride.user_id == user_id)
            .ok_or(RideQueryError::NotFound)
    }
}
