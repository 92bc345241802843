use chrono::{DateTime, Utc};
use entities::reservations::ReservationId;
use entities::users::UserId;
use std::sync::Arc;
use thiserror::Error;

use crate::clock::Clock;
use crate::parking::{CancellationOutcome, ParkingRepo};

pub const FULL_REFUND_CUTOFF_MINUTES: i64 = 30;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefundDecision {
    pub amount: u64,
    pub description: &'static str,
}

/// Tiered by how far ahead of the start the cancellation lands: ≥ 30 minutes
/// refunds everything, inside the last half hour refunds half, after the
/// start nothing.
pub fn cancellation_refund(price: u64, start: DateTime<Utc>, now: DateTime<Utc>) -> RefundDecision {
    let minutes_to_start = (start - now).num_minutes();

    if minutes_to_start >= FULL_REFUND_CUTOFF_MINUTES {
        RefundDecision {
            amount: price,
            description: "Full refund - cancelled more than 30 minutes before arrival",
        }
    } else if minutes_to_start >= 0 {
        RefundDecision {
            amount: (price as f64 * 0.5).round() as u64,
            description: "Partial refund (50%) - cancelled less than 30 minutes before arrival",
        }
    } else {
        RefundDecision {
            amount: 0,
            description: "No refund - cancelled after arrival time",
        }
    }
}

#[derive(Error, Debug)]
pub enum CancelReservationError {
    #[error("reservation not found")]
    NotFound,
    #[error("only active reservations can be cancelled")]
    NotActive,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub struct CancelReservationInteractor {
    repo: Arc<dyn ParkingRepo>,
    clock: Arc<dyn Clock>,
}

impl CancelReservationInteractor {
    pub fn new(repo: Arc<dyn ParkingRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// The store applies the refund tier for the injected "now" and credits
    /// the wallet atomically with the cancelled transition.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn cancel(
        &self,
        user_id: UserId,
        reservation_id: ReservationId,
    ) -> Result<CancellationOutcome, CancelReservationError> {
        self.repo
            .cancel_reservation(reservation_id, user_id, self.clock.now())
            .await
    }
}
