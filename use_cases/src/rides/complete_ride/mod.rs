use entities::payments::{PaymentMethod, PaymentStatus};
use entities::rides::{RideId, RideStatus};
use entities::users::UserId;
use std::sync::Arc;
use thiserror::Error;

use crate::clock::Clock;
use crate::parking::pay_reservation::{LOYALTY_BONUS_MAX_PERCENT, LOYALTY_BONUS_MIN_PERCENT};
use crate::payments::{ChargeOutcome, PaymentGateway};
use crate::randomness::Randomness;
use crate::rides::{RideCompletionOutcome, RideHailingRepo};

#[derive(Error, Debug)]
pub enum CompleteRideError {
    #[error("ride not found")]
    NotFound,
    #[error("only active rides can be completed")]
    NotActive,
    #[error("payment has already been processed for this ride")]
    AlreadyPaid,
    #[error("insufficient wallet balance")]
    InsufficientBalance,
    #[error("payment was declined by the gateway")]
    PaymentDeclined,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub struct CompleteRideInteractor {
    repo: Arc<dyn RideHailingRepo>,
    clock: Arc<dyn Clock>,
    randomness: Arc<dyn Randomness>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CompleteRideInteractor {
    pub fn new(
        repo: Arc<dyn RideHailingRepo>,
        clock: Arc<dyn Clock>,
        randomness: Arc<dyn Randomness>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            repo,
            clock,
            randomness,
            gateway,
        }
    }

    /// Settles payment, stamps the end time and awards the loyalty bonus in
    /// one store unit, then frees the driver when this ride governed the
    /// vehicle trip.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn complete(
        &self,
        user_id: UserId,
        ride_id: RideId,
        method: PaymentMethod,
    ) -> Result<RideCompletionOutcome, CompleteRideError> {
        if method == PaymentMethod::Gateway {
            let ride = self
                .repo
                .find_ride(ride_id)
                .await?
                .filter(|ride| ride.user_id == user_id)
                .ok_or(CompleteRideError::NotFound)?;
            if ride.status != RideStatus::Active {
                return Err(CompleteRideError::NotActive);
            }
            if ride.payment_status == PaymentStatus::Paid {
                return Err(CompleteRideError::AlreadyPaid);
            }

            match self.gateway.charge(ride.fare).await? {
                ChargeOutcome::Approved => {}
                ChargeOutcome::Declined => return Err(CompleteRideError::PaymentDeclined),
            }
        }

        let loyalty_percent = self
            .randomness
            .percent_between(LOYALTY_BONUS_MIN_PERCENT, LOYALTY_BONUS_MAX_PERCENT);

        let outcome = self
            .repo
            .complete_ride(ride_id, user_id, method, loyalty_percent, self.clock.now())
            .await?;

        if outcome.ride.governs_vehicle_trip() {
            self.repo
                .release_driver_if_idle(outcome.ride.driver_id, outcome.ride.id)
                .await?;
        }

        Ok(outcome)
    }
}
