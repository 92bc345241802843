use chrono::{DateTime, Utc};
use entities::parking::{LotId, SlotId};
use entities::payments::PaymentStatus;
use entities::qr::QrCode;
use entities::reservations::{Reservation, ReservationId, ReservationStatus};
use entities::users::UserId;
use shared_kernel::{InvalidTimeWindow, TimeWindow};
use std::sync::Arc;
use thiserror::Error;

use crate::clock::Clock;
use crate::parking::availability::{evaluate_lot, UnavailableReason};
use crate::parking::ParkingRepo;
use crate::pricing::{parking_price, PricingConfig};

#[derive(Debug, Clone)]
pub struct ReserveSlotRequest {
    pub lot_id: LotId,
    pub slot_id: SlotId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Produced by the store when the atomic re-validation loses a race or the
/// slot vanished between lookup and commit.
#[derive(Error, Debug)]
pub enum CommitReservationError {
    #[error("parking slot not found")]
    SlotNotFound,
    #[error("parking slot is unavailable: {0}")]
    SlotUnavailable(UnavailableReason),
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ReserveSlotError {
    #[error("parking lot not found")]
    LotNotFound,
    #[error("parking slot not found")]
    SlotNotFound,
    #[error("parking slot does not belong to the specified parking lot")]
    SlotLotMismatch,
    #[error("parking slot is unavailable: {0}")]
    SlotUnavailable(UnavailableReason),
    #[error(transparent)]
    InvalidWindow(#[from] InvalidTimeWindow),
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<CommitReservationError> for ReserveSlotError {
    fn from(value: CommitReservationError) -> Self {
        match value {
            CommitReservationError::SlotNotFound => ReserveSlotError::SlotNotFound,
            CommitReservationError::SlotUnavailable(reason) => {
                ReserveSlotError::SlotUnavailable(reason)
            }
            CommitReservationError::Internal(err) => ReserveSlotError::Internal(err),
        }
    }
}

pub struct ReserveSlotInteractor {
    repo: Arc<dyn ParkingRepo>,
    clock: Arc<dyn Clock>,
    pricing: PricingConfig,
}

impl ReserveSlotInteractor {
    pub fn new(repo: Arc<dyn ParkingRepo>, clock: Arc<dyn Clock>, pricing: PricingConfig) -> Self {
        Self {
            repo,
            clock,
            pricing,
        }
    }

    /// Prices the window against the lot's live contention and commits the
    /// reservation. The store re-runs the availability checks atomically with
    /// the insert, so a lost race surfaces as `SlotUnavailable`.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn reserve(
        &self,
        user_id: UserId,
        request: ReserveSlotRequest,
    ) -> Result<Reservation, ReserveSlotError> {
        let window = TimeWindow::new(request.start, request.end)?;

        let slot = self
            .repo
            .find_slot(request.slot_id)
            .await?
            .ok_or(ReserveSlotError::SlotNotFound)?;
        let lot = self
            .repo
            .find_lot(request.lot_id)
            .await?
            .ok_or(ReserveSlotError::LotNotFound)?;
        if slot.lot_id != lot.id {
            return Err(ReserveSlotError::SlotLotMismatch);
        }

        let slots = self.repo.slots_for_lot(lot.id).await?;
        let reservations = self.repo.active_reservations_for_lot(lot.id).await?;
        let availability = evaluate_lot(slots, &reservations, &window);

        if let Some(evaluated) = availability.slot(slot.id) {
            if let Some(reason) = &evaluated.unavailable_reason {
                return Err(ReserveSlotError::SlotUnavailable(reason.clone()));
            }
        }

        let price = parking_price(
            self.pricing.base_price_per_hour,
            availability.price_multiplier,
            window.duration_hours(),
        );

        let reservation = Reservation {
            id: ReservationId::new(),
            user_id,
            parking_lot_id: lot.id,
            parking_slot_id: slot.id,
            qr_code: QrCode::generate(),
            window,
            status: ReservationStatus::Active,
            payment_status: PaymentStatus::Pending,
            price,
            created_at: self.clock.now(),
        };

        self.repo
            .commit_reservation(reservation)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::parking::MockParkingRepo;
    use chrono::TimeZone;
    use entities::geo::GeoPoint;
    use entities::parking::{LotName, ParkingLot, ParkingSlot, SlotNumber, SlotStatus, ZoneName};
    use entities::stations::StationId;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 14, hour, 0, 0).unwrap()
    }

    fn fixed_clock() -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock.expect_now().returning(|| at(8));
        Arc::new(clock)
    }

    fn lot_with_slot() -> (ParkingLot, ParkingSlot) {
        let lot = ParkingLot {
            id: LotId::new(),
            name: LotName::try_from("Central".to_string()).unwrap(),
            location: GeoPoint::new(77.2167, 28.6328),
            total_slots: 1,
            occupied_slots: 0,
            slot_ids: vec![],
            metro_station_id: StationId::new(),
        };
        let slot = ParkingSlot {
            id: SlotId::new(),
            lot_id: lot.id,
            slot_number: SlotNumber::from("A1"),
            zone: ZoneName::from("A"),
            status: SlotStatus::Available,
            time_restrictions: vec![],
        };
        (lot, slot)
    }

    #[tokio::test]
    async fn test_happy_path_prices_a_two_hour_window_at_base_rate() {
        let (lot, slot) = lot_with_slot();
        let request = ReserveSlotRequest {
            lot_id: lot.id,
            slot_id: slot.id,
            start: at(10),
            end: at(12),
        };

        let mut repo = MockParkingRepo::new();
        {
            let slot = slot.clone();
            repo.expect_find_slot().returning(move |_| Ok(Some(slot.clone())));
        }
        {
            let lot = lot.clone();
            repo.expect_find_lot().returning(move |_| Ok(Some(lot.clone())));
        }
        {
            let slot = slot.clone();
            repo.expect_slots_for_lot()
                .returning(move |_| Ok(vec![slot.clone()]));
        }
        repo.expect_active_reservations_for_lot()
            .returning(|_| Ok(vec![]));
        repo.expect_commit_reservation()
            .returning(|reservation| Ok(reservation));

        let interactor =
            ReserveSlotInteractor::new(Arc::new(repo), fixed_clock(), PricingConfig::default());
        let reservation = interactor.reserve(UserId::new(), request).await.unwrap();

        assert_eq!(reservation.price, 100);
        assert_eq!(reservation.status, ReservationStatus::Active);
        assert_eq!(reservation.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_slot_from_another_lot_is_rejected() {
        let (lot, mut slot) = lot_with_slot();
        slot.lot_id = LotId::new();
        let request = ReserveSlotRequest {
            lot_id: lot.id,
            slot_id: slot.id,
            start: at(10),
            end: at(12),
        };

        let mut repo = MockParkingRepo::new();
        repo.expect_find_slot().returning(move |_| Ok(Some(slot.clone())));
        repo.expect_find_lot().returning(move |_| Ok(Some(lot.clone())));

        let interactor =
            ReserveSlotInteractor::new(Arc::new(repo), fixed_clock(), PricingConfig::default());
        let result = interactor.reserve(UserId::new(), request).await;

        assert!(matches!(result, Err(ReserveSlotError::SlotLotMismatch)));
    }

    #[tokio::test]
    async fn test_overlapping_active_reservation_blocks_the_slot() {
        let (lot, slot) = lot_with_slot();
        let existing = Reservation {
            id: ReservationId::new(),
            user_id: UserId::new(),
            parking_lot_id: lot.id,
            parking_slot_id: slot.id,
            qr_code: QrCode::generate(),
            window: TimeWindow::new(at(11), at(13)).unwrap(),
            status: ReservationStatus::Active,
            payment_status: PaymentStatus::Paid,
            price: 100,
            created_at: at(7),
        };
        let request = ReserveSlotRequest {
            lot_id: lot.id,
            slot_id: slot.id,
            start: at(10),
            end: at(12),
        };

        let mut repo = MockParkingRepo::new();
        {
            let slot = slot.clone();
            repo.expect_find_slot().returning(move |_| Ok(Some(slot.clone())));
        }
        repo.expect_find_lot().returning(move |_| Ok(Some(lot.clone())));
        repo.expect_slots_for_lot()
            .returning(move |_| Ok(vec![slot.clone()]));
        repo.expect_active_reservations_for_lot()
            .returning(move |_| Ok(vec![existing.clone()]));

        let interactor =
            ReserveSlotInteractor::new(Arc::new(repo), fixed_clock(), PricingConfig::default());
        let result = interactor.reserve(UserId::new(), request).await;

        assert!(matches!(
            result,
            Err(ReserveSlotError::SlotUnavailable(UnavailableReason::Reserved))
        ));
    }

    #[tokio::test]
    async fn test_lost_commit_race_surfaces_as_unavailable() {
        let (lot, slot) = lot_with_slot();
        let request = ReserveSlotRequest {
            lot_id: lot.id,
            slot_id: slot.id,
            start: at(10),
            end: at(12),
        };

        let mut repo = MockParkingRepo::new();
        {
            let slot = slot.clone();
            repo.expect_find_slot().returning(move |_| Ok(Some(slot.clone())));
        }
        repo.expect_find_lot().returning(move |_| Ok(Some(lot.clone())));
        repo.expect_slots_for_lot()
            .returning(move |_| Ok(vec![slot.clone()]));
        repo.expect_active_reservations_for_lot()
            .returning(|_| Ok(vec![]));
        repo.expect_commit_reservation().returning(|_| {
            Err(CommitReservationError::SlotUnavailable(
                UnavailableReason::Reserved,
            ))
        });

        let interactor =
            ReserveSlotInteractor::new(Arc::new(repo), fixed_clock(), PricingConfig::default());
        let result = interactor.reserve(UserId::new(), request).await;

        assert!(matches!(
            result,
            Err(ReserveSlotError::SlotUnavailable(UnavailableReason::Reserved))
        ));
    }
}
