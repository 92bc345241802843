use chrono::{DateTime, Utc};
use entities::parking::LotId;
use shared_kernel::{InvalidTimeWindow, TimeWindow};
use std::sync::Arc;
use thiserror::Error;

use crate::parking::availability::{evaluate_lot, LotAvailability};
use crate::parking::ParkingRepo;

#[derive(Error, Debug)]
pub enum CheckAvailabilityError {
    #[error("parking lot not found")]
    LotNotFound,
    #[error(transparent)]
    InvalidWindow(#[from] InvalidTimeWindow),
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub struct CheckAvailabilityInteractor {
    repo: Arc<dyn ParkingRepo>,
}

impl CheckAvailabilityInteractor {
    pub fn new(repo: Arc<dyn ParkingRepo>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn check(
        &self,
        lot_id: LotId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<LotAvailability, CheckAvailabilityError> {
        let window = TimeWindow::new(start, end)?;

        let lot = self
            .repo
            .find_lot(lot_id)
            .await?
            .ok_or(CheckAvailabilityError::LotNotFound)?;

        let slots = self.repo.slots_for_lot(lot.id).await?;
        let reservations = self.repo.active_reservations_for_lot(lot.id).await?;

        Ok(evaluate_lot(slots, &reservations, &window))
    }
}
