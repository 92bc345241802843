use chrono::{DateTime, Utc};
use entities::reservations::ReservationId;
use entities::users::UserId;
use shared_kernel::{InvalidTimeWindow, TimeWindow};
use std::sync::Arc;
use thiserror::Error;

use crate::clock::Clock;
use crate::parking::{AmendmentOutcome, ParkingRepo};

/// Why a proposed window is not a valid shrink of the original.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmendmentRule {
    StartBeforeOriginal,
    EndAfterOriginal,
    NotShorter,
}

impl std::fmt::Display for AmendmentRule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let message = match self {
            AmendmentRule::StartBeforeOriginal => {
                "new start time cannot be earlier than the original start time"
            }
            AmendmentRule::EndAfterOriginal => {
                "new end time cannot be later than the original end time"
            }
            AmendmentRule::NotShorter => "new duration must be shorter than the original duration",
        };
        f.write_str(message)
    }
}

/// A window may only shrink: stay inside the original and get strictly
/// shorter. Extension and relocation are both rejected.
pub fn amendment_violation(original: &TimeWindow, proposed: &TimeWindow) -> Option<AmendmentRule> {
    if proposed.start() < original.start() {
        return Some(AmendmentRule::StartBeforeOriginal);
    }
    if proposed.end() > original.end() {
        return Some(AmendmentRule::EndAfterOriginal);
    }
    if proposed.duration() >= original.duration() {
        return Some(AmendmentRule::NotShorter);
    }
    None
}

/// Half of the pro-rated price of the hours given back.
pub fn amendment_refund(price: u64, original_hours: f64, new_hours: f64) -> u64 {
    let price_per_hour = price as f64 / original_hours;
    (0.5 * price_per_hour * (original_hours - new_hours)).round() as u64
}

#[derive(Error, Debug)]
pub enum AmendReservationError {
    #[error("reservation not found")]
    NotFound,
    #[error("only active reservations can be updated")]
    NotActive,
    #[error("only paid reservations can be updated")]
    NotPaid,
    #[error("invalid amendment: {0}")]
    InvalidAmendment(AmendmentRule),
    #[error("the new time conflicts with another reservation")]
    Conflict,
    #[error(transparent)]
    InvalidWindow(#[from] InvalidTimeWindow),
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub struct AmendReservationInteractor {
    repo: Arc<dyn ParkingRepo>,
    clock: Arc<dyn Clock>,
}

impl AmendReservationInteractor {
    pub fn new(repo: Arc<dyn ParkingRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// The store validates the shrink rules and re-runs the overlap check
    /// against the slot's other active reservations under the slot guard,
    /// crediting the refund in the same unit.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn amend(
        &self,
        user_id: UserId,
        reservation_id: ReservationId,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<AmendmentOutcome, AmendReservationError> {
        let window = TimeWindow::new(new_start, new_end)?;
        self.repo
            .amend_reservation(reservation_id, user_id, window, self.clock.now())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 14, hour, min, 0).unwrap()
    }

    fn window(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
        TimeWindow::new(at(start.0, start.1), at(end.0, end.1)).unwrap()
    }

    #[test]
    fn test_contained_strictly_shorter_window_is_accepted() {
        let original = window((10, 0), (12, 0));
        assert_eq!(amendment_violation(&original, &window((10, 30), (12, 0))), None);
        assert_eq!(amendment_violation(&original, &window((10, 0), (11, 0))), None);
    }

    #[rstest]
    #[case((9, 30), (11, 0), AmendmentRule::StartBeforeOriginal)]
    #[case((10, 30), (12, 30), AmendmentRule::EndAfterOriginal)]
    #[case((10, 0), (12, 0), AmendmentRule::NotShorter)]
    fn test_extension_and_relocation_are_rejected(
        #[case] start: (u32, u32),
        #[case] end: (u32, u32),
        #[case] expected: AmendmentRule,
    ) {
        let original = window((10, 0), (12, 0));
        assert_eq!(
            amendment_violation(&original, &window(start, end)),
            Some(expected)
        );
    }

    #[test]
    fn test_refund_is_half_the_prorated_difference() {
        // 200 over 4 hours = 50/hour; giving back 2 hours refunds half of 100.
        assert_eq!(amendment_refund(200, 4.0, 2.0), 50);
        // 100 over 2 hours = 50/hour; giving back 30 minutes refunds 12.5 → 13.
        assert_eq!(amendment_refund(100, 2.0, 1.5), 13);
    }
}
