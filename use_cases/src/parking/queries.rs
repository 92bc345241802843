use entities::reservations::{Reservation, ReservationId};
use entities::users::UserId;
use std::sync::Arc;
use thiserror::Error;

use crate::parking::ParkingRepo;

#[derive(Error, Debug)]
pub enum ReservationQueryError {
    #[error("reservation not found")]
    NotFound,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub struct ReservationQueriesInteractor {
    repo: Arc<dyn ParkingRepo>,
}

impl ReservationQueriesInteractor {
    pub fn new(repo: Arc<dyn ParkingRepo>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Reservation>, ReservationQueryError> {
        let mut reservations = self.repo.reservations_for_user(user_id).await?;
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reservations)
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn get(
        &self,
        user_id: UserId,
        reservation_id: ReservationId,
    ) -> Result<Reservation, ReservationQueryError> {
        self.repo
            .find_reservation(reservation_id)
            .await?
            .filter(|reservation| reservation.user_id == user_id)
            .ok_or(ReservationQueryError::NotFound)
    }
}
