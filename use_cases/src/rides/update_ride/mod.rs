use entities::rides::{Ride, RideId};
use entities::users::UserId;
use std::sync::Arc;
use thiserror::Error;

use crate::rides::RideHailingRepo;

#[derive(Error, Debug)]
pub enum UpdateRideError {
    #[error("ride not found")]
    NotFound,
    #[error("only active rides can be updated")]
    NotActive,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub struct UpdateRideInteractor {
    repo: Arc<dyn RideHailingRepo>,
}

impl UpdateRideInteractor {
    pub fn new(repo: Arc<dyn RideHailingRepo>) -> Self {
        Self { repo }
    }

    /// Flips the sharing flag pre-completion. The fare is recomputed by the
    /// store from the stored distance, capacity and seats; a caller-supplied
    /// fare is never trusted.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn set_sharing(
        &self,
        user_id: UserId,
        ride_id: RideId,
        is_shared: bool,
    ) -> Result<Ride, UpdateRideError> {
        self.repo.set_ride_sharing(ride_id, user_id, is_shared).await
    }
}
