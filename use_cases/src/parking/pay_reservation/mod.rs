use entities::payments::{PaymentMethod, PaymentStatus};
use entities::reservations::ReservationId;
use entities::users::UserId;
use std::sync::Arc;
use thiserror::Error;

use crate::clock::Clock;
use crate::parking::{ParkingRepo, SettlementOutcome};
use crate::payments::{ChargeOutcome, PaymentGateway};
use crate::randomness::Randomness;

pub const LOYALTY_BONUS_MIN_PERCENT: u8 = 5;
pub const LOYALTY_BONUS_MAX_PERCENT: u8 = 15;

#[derive(Error, Debug)]
pub enum PayReservationError {
    #[error("reservation not found")]
    NotFound,
    #[error("only active reservations can be paid for")]
    NotActive,
    #[error("payment has already been completed for this reservation")]
    AlreadyPaid,
    #[error("insufficient wallet balance")]
    InsufficientBalance,
    #[error("payment was declined by the gateway")]
    PaymentDeclined,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub struct PayReservationInteractor {
    repo: Arc<dyn ParkingRepo>,
    clock: Arc<dyn Clock>,
    randomness: Arc<dyn Randomness>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PayReservationInteractor {
    pub fn new(
        repo: Arc<dyn ParkingRepo>,
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

    /// Wallet payments debit atomically with the paid transition; gateway
    /// payments charge first and then settle. Either way the settlement
    /// draws a 5-15% loyalty bonus on the price.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn pay(
        &self,
        user_id: UserId,
        reservation_id: ReservationId,
        method: PaymentMethod,
    ) -> Result<SettlementOutcome, PayReservationError> {
        if method == PaymentMethod::Gateway {
            let reservation = self
                .repo
                .find_reservation(reservation_id)
                .await?
                .filter(|reservation| reservation.user_id == user_id)
                .ok_or(PayReservationError::NotFound)?;
            if reservation.payment_status == PaymentStatus::Paid {
                return Err(PayReservationError::AlreadyPaid);
            }

            match self.gateway.charge(reservation.price).await? {
                ChargeOutcome::Approved => {}
                ChargeOutcome::Declined => return Err(PayReservationError::PaymentDeclined),
            }
        }

        let loyalty_percent = self
            .randomness
            .percent_between(LOYALTY_BONUS_MIN_PERCENT, LOYALTY_BONUS_MAX_PERCENT);

        self.repo
            .settle_reservation(
                reservation_id,
                user_id,
                method,
                loyalty_percent,
                self.clock.now(),
            )
            .await
    }
}
