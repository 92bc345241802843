use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::parking::{LotId, ParkingLot, ParkingSlot, SlotId};
use entities::payments::{PaymentMethod, PaymentStatus};
use entities::reservations::{Reservation, ReservationId, ReservationStatus};
use entities::users::UserId;
use entities::wallet::{BookingRef, TransactionKind};
use itertools::Itertools;
use shared_kernel::TimeWindow;

use crate::repository::Repository;
use use_cases::parking::amend_reservation::{
    amendment_refund, amendment_violation, AmendReservationError,
};
use use_cases::parking::availability::slot_unavailability;
use use_cases::parking::cancel_reservation::{cancellation_refund, CancelReservationError};
use use_cases::parking::pay_reservation::PayReservationError;
use use_cases::parking::reserve_slot::CommitReservationError;
use use_cases::parking::{
    AmendmentOutcome, CancellationOutcome, ParkingRepo, SettlementOutcome,
};
use use_cases::pricing::loyalty_points;

#[async_trait]
impl ParkingRepo for Repository {
    async fn find_lot(&self, id: LotId) -> anyhow::Result<Option<ParkingLot>> {
        Ok(self.read().await.lots.get(&id).cloned())
    }

    async fn find_slot(&self, id: SlotId) -> anyhow::Result<Option<ParkingSlot>> {
        Ok(self.read().await.slots.get(&id).cloned())
    }

    async fn slots_for_lot(&self, lot: LotId) -> anyhow::Result<Vec<ParkingSlot>> {
        let state = self.read().await;
        Ok(state
            .slots
            .values()
            .filter(|slot| slot.lot_id == lot)
            .cloned()
            .sorted_by(|a, b| {
                a.zone
                    .cmp(&b.zone)
                    .then_with(|| a.slot_number.cmp(&b.slot_number))
            })
            .collect())
    }

    async fn active_reservations_for_lot(&self, lot: LotId) -> anyhow::Result<Vec<Reservation>> {
        let state = self.read().await;
        Ok(state
            .reservations
            .values()
            .filter(|reservation| reservation.parking_lot_id == lot && reservation.is_active())
            .cloned()
            .collect())
    }

    async fn find_reservation(&self, id: ReservationId) -> anyhow::Result<Option<Reservation>> {
        Ok(self.read().await.reservations.get(&id).cloned())
    }

    async fn reservations_for_user(&self, user: UserId) -> anyhow::Result<Vec<Reservation>> {
        let state = self.read().await;
        Ok(state
            .reservations
            .values()
            .filter(|reservation| reservation.user_id == user)
            .cloned()
            .collect())
    }

    async fn commit_reservation(
        &self,
        reservation: Reservation,
    ) -> Result<Reservation, CommitReservationError> {
        let mut state = self.write().await;

        let slot = state
            .slots
            .get(&reservation.parking_slot_id)
            .ok_or(CommitReservationError::SlotNotFound)?;

        let reserved_windows =
            state.active_windows_for_slot(reservation.parking_slot_id, None);
        if let Some(reason) = slot_unavailability(slot, &reserved_windows, &reservation.window) {
            return Err(CommitReservationError::SlotUnavailable(reason));
        }

        let station = state
            .lots
            .get(&reservation.parking_lot_id)
            .map(|lot| lot.metro_station_id);

        state
            .reservations
            .insert(reservation.id, reservation.clone());
        if let Some(station) = station {
            state.record_station_visit(reservation.user_id, station);
        }

        Ok(reservation)
    }

    async fn cancel_reservation(
        &self,
        id: ReservationId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<CancellationOutcome, CancelReservationError> {
        let mut state = self.write().await;

        let reservation = state
            .reservations
            .get(&id)
            .filter(|reservation| reservation.user_id == user)
            .cloned()
            .ok_or(CancelReservationError::NotFound)?;
        if reservation.status != ReservationStatus::Active {
            return Err(CancelReservationError::NotActive);
        }

        let was_paid = reservation.payment_status == PaymentStatus::Paid;
        let decision = cancellation_refund(reservation.price, reservation.window.start(), now);
        let refund_amount = if was_paid { decision.amount } else { 0 };

        if refund_amount > 0 {
            state.credit(
                user,
                refund_amount,
                TransactionKind::Refund,
                decision.description.to_string(),
                Some(BookingRef::Reservation(id)),
                now,
            );
        }

        let reservation = state
            .reservations
            .get_mut(&id)
            .expect("reservation present under the same guard");
        reservation.status = ReservationStatus::Cancelled;
        if refund_amount > 0 {
            reservation.payment_status = PaymentStatus::Refunded;
        }
        let reservation = reservation.clone();

        Ok(CancellationOutcome {
            reservation,
            refund_amount,
            refund_description: was_paid.then(|| decision.description.to_string()),
        })
    }

    async fn amend_reservation(
        &self,
        id: ReservationId,
        user: UserId,
        new_window: TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<AmendmentOutcome, AmendReservationError> {
        let mut state = self.write().await;

        let reservation = state
            .reservations
            .get(&id)
            .filter(|reservation| reservation.user_id == user)
            .cloned()
            .ok_or(AmendReservationError::NotFound)?;
        if reservation.status != ReservationStatus::Active {
            return Err(AmendReservationError::NotActive);
        }
        if reservation.payment_status != PaymentStatus::Paid {
            return Err(AmendReservationError::NotPaid);
        }

        if let Some(rule) = amendment_violation(&reservation.window, &new_window) {
            return Err(AmendReservationError::InvalidAmendment(rule));
        }

        let other_windows =
            state.active_windows_for_slot(reservation.parking_slot_id, Some(id));
        if new_window.conflicts_with_any(other_windows.iter()) {
            return Err(AmendReservationError::Conflict);
        }

        let refund_amount = amendment_refund(
            reservation.price,
            reservation.window.duration_hours(),
            new_window.duration_hours(),
        );

        if refund_amount > 0 {
            state.credit(
                user,
                refund_amount,
                TransactionKind::Refund,
                "Partial refund for reservation time update".to_string(),
                Some(BookingRef::Reservation(id)),
                now,
            );
        }

        let reservation = state
            .reservations
            .get_mut(&id)
            .expect("reservation present under the same guard");
        reservation.window = new_window;
        let reservation = reservation.clone();

        Ok(AmendmentOutcome {
            reservation,
            refund_amount,
        })
    }

    async fn settle_reservation(
        &self,
        id: ReservationId,
        user: UserId,
        method: PaymentMethod,
        loyalty_percent: u8,
        now: DateTime<Utc>,
    ) -> Result<SettlementOutcome, PayReservationError> {
        let mut state = self.write().await;

        let reservation = state
            .reservations
            .get(&id)
            .filter(|reservation| reservation.user_id == user)
            .cloned()
            .ok_or(PayReservationError::NotFound)?;
        if reservation.status != ReservationStatus::Active {
            return Err(PayReservationError::NotActive);
        }
        if reservation.payment_status == PaymentStatus::Paid {
            return Err(PayReservationError::AlreadyPaid);
        }

        if method == PaymentMethod::Wallet {
            let lot_name = state
                .lots
                .get(&reservation.parking_lot_id)
                .map(|lot| lot.name.inner())
                .unwrap_or_else(|| reservation.parking_lot_id.to_string());
            let settled = state.debit(
                user,
                reservation.price,
                format!("Payment for reservation at {lot_name}"),
                Some(BookingRef::Reservation(id)),
                now,
            );
            if !settled {
                return Err(PayReservationError::InsufficientBalance);
            }
        }

        let points = loyalty_points(reservation.price, loyalty_percent);
        if points > 0 {
            state.wallet_mut(user).loyalty_points += points;
        }

        let reservation = state
            .reservations
            .get_mut(&id)
            .expect("reservation present under the same guard");
        reservation.payment_status = PaymentStatus::Paid;
        let reservation = reservation.clone();

        Ok(SettlementOutcome {
            reservation,
            loyalty_points_awarded: points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use chrono::{Duration, TimeZone};
    use entities::qr::QrCode;
    use std::sync::Arc;
    use use_cases::parking::availability::UnavailableReason;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 14, hour, min, 0).unwrap()
    }

    fn reservation_for(
        user: UserId,
        lot: &ParkingLot,
        slot: &ParkingSlot,
        window: TimeWindow,
    ) -> Reservation {
        Reservation {
            id: ReservationId::new(),
            user_id: user,
            parking_lot_id: lot.id,
            parking_slot_id: slot.id,
            qr_code: QrCode::generate(),
            window,
            status: ReservationStatus::Active,
            payment_status: PaymentStatus::Pending,
            price: 100,
            created_at: at(8, 0),
        }
    }

    #[tokio::test]
    async fn test_overlapping_commits_cannot_both_land() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let slot = &slots[0];
        let user = UserId::new();

        let first = reservation_for(
            user,
            &lot,
            slot,
            TimeWindow::new(at(10, 0), at(12, 0)).unwrap(),
        );
        let second = reservation_for(
            user,
            &lot,
            slot,
            TimeWindow::new(at(11, 0), at(13, 0)).unwrap(),
        );

        repo.commit_reservation(first).await.unwrap();
        let result = repo.commit_reservation(second).await;

        assert!(matches!(
            result,
            Err(CommitReservationError::SlotUnavailable(
                UnavailableReason::Reserved
            ))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_overlapping_reserves_admit_exactly_one() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let slot = slots[0].clone();
        let lot = Arc::new(lot);

        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            let lot = lot.clone();
            let slot = slot.clone();
            handles.push(tokio::spawn(async move {
                let window = TimeWindow::new(at(10, i), at(12, 0)).unwrap();
                let reservation =
                    reservation_for(UserId::new(), &lot, &slot, window);
                repo.commit_reservation(reservation).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_commit_records_the_station_visit() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let user = UserId::new();

        let reservation = reservation_for(
            user,
            &lot,
            &slots[0],
            TimeWindow::new(at(10, 0), at(12, 0)).unwrap(),
        );
        repo.commit_reservation(reservation).await.unwrap();

        let visits = repo.frequent_stations(user).await;
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].station_id, lot.metro_station_id);
        assert_eq!(visits[0].visit_count, 1);

        let second = reservation_for(
            user,
            &lot,
            &slots[0],
            TimeWindow::new(at(13, 0), at(14, 0)).unwrap(),
        );
        repo.commit_reservation(second).await.unwrap();

        let visits = repo.frequent_stations(user).await;
        assert_eq!(visits[0].visit_count, 2);
    }

    #[tokio::test]
    async fn test_paid_cancellation_ahead_of_time_refunds_in_full() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let user = UserId::new();

        let mut reservation = reservation_for(
            user,
            &lot,
            &slots[0],
            TimeWindow::new(at(10, 0), at(12, 0)).unwrap(),
        );
        reservation.payment_status = PaymentStatus::Paid;
        let id = reservation.id;
        repo.commit_reservation(reservation).await.unwrap();

        let outcome = repo
            .cancel_reservation(id, user, at(10, 0) - Duration::minutes(45))
            .await
            .unwrap();

        assert_eq!(outcome.refund_amount, 100);
        assert_eq!(
            outcome.reservation.payment_status,
            PaymentStatus::Refunded
        );
        let wallet = repo.read().await.wallets.get(&user).cloned().unwrap();
        assert_eq!(wallet.balance, 100);
        assert_eq!(wallet.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_unpaid_cancellation_moves_no_money() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let user = UserId::new();

        let reservation = reservation_for(
            user,
            &lot,
            &slots[0],
            TimeWindow::new(at(10, 0), at(12, 0)).unwrap(),
        );
        let id = reservation.id;
        repo.commit_reservation(reservation).await.unwrap();

        let outcome = repo
            .cancel_reservation(id, user, at(9, 0))
            .await
            .unwrap();

        assert_eq!(outcome.refund_amount, 0);
        assert_eq!(outcome.reservation.status, ReservationStatus::Cancelled);
        assert!(repo.read().await.wallets.get(&user).is_none());
    }

    #[tokio::test]
    async fn test_cancelling_twice_is_a_state_error() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let user = UserId::new();

        let reservation = reservation_for(
            user,
            &lot,
            &slots[0],
            TimeWindow::new(at(10, 0), at(12, 0)).unwrap(),
        );
        let id = reservation.id;
        repo.commit_reservation(reservation).await.unwrap();

        repo.cancel_reservation(id, user, at(9, 0)).await.unwrap();
        let result = repo.cancel_reservation(id, user, at(9, 5)).await;
        assert!(matches!(result, Err(CancelReservationError::NotActive)));
    }

    #[tokio::test]
    async fn test_amendment_shrinks_the_window_and_refunds_half_the_difference() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let user = UserId::new();

        let mut reservation = reservation_for(
            user,
            &lot,
            &slots[0],
            TimeWindow::new(at(10, 0), at(14, 0)).unwrap(),
        );
        reservation.price = 200;
        reservation.payment_status = PaymentStatus::Paid;
        let id = reservation.id;
        repo.commit_reservation(reservation).await.unwrap();

        let outcome = repo
            .amend_reservation(
                id,
                user,
                TimeWindow::new(at(10, 0), at(12, 0)).unwrap(),
                at(9, 0),
            )
            .await
            .unwrap();

        // 200 over 4h = 50/hour; two hours back refunds half of 100.
        assert_eq!(outcome.refund_amount, 50);
        assert_eq!(outcome.reservation.window.end(), at(12, 0));
    }

    #[tokio::test]
    async fn test_amendment_cannot_extend_the_window() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let user = UserId::new();

        let mut reservation = reservation_for(
            user,
            &lot,
            &slots[0],
            TimeWindow::new(at(10, 0), at(12, 0)).unwrap(),
        );
        reservation.payment_status = PaymentStatus::Paid;
        let id = reservation.id;
        repo.commit_reservation(reservation).await.unwrap();

        let result = repo
            .amend_reservation(
                id,
                user,
                TimeWindow::new(at(10, 0), at(13, 0)).unwrap(),
                at(9, 0),
            )
            .await;

        assert!(matches!(
            result,
            Err(AmendReservationError::InvalidAmendment(_))
        ));
    }

    #[tokio::test]
    async fn test_unpaid_reservations_cannot_be_amended() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let user = UserId::new();

        let reservation = reservation_for(
            user,
            &lot,
            &slots[0],
            TimeWindow::new(at(10, 0), at(12, 0)).unwrap(),
        );
        let id = reservation.id;
        repo.commit_reservation(reservation).await.unwrap();

        let result = repo
            .amend_reservation(
                id,
                user,
                TimeWindow::new(at(10, 0), at(11, 0)).unwrap(),
                at(9, 0),
            )
            .await;

        assert!(matches!(result, Err(AmendReservationError::NotPaid)));
    }

    #[tokio::test]
    async fn test_wallet_settlement_debits_and_awards_points() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let user = UserId::new();
        fixtures::seed_wallet(&repo, user, 500).await;

        let reservation = reservation_for(
            user,
            &lot,
            &slots[0],
            TimeWindow::new(at(10, 0), at(12, 0)).unwrap(),
        );
        let id = reservation.id;
        repo.commit_reservation(reservation).await.unwrap();

        let outcome = repo
            .settle_reservation(id, user, PaymentMethod::Wallet, 10, at(9, 0))
            .await
            .unwrap();

        assert_eq!(outcome.reservation.payment_status, PaymentStatus::Paid);
        assert_eq!(outcome.loyalty_points_awarded, 10);
        let wallet = repo.read().await.wallets.get(&user).cloned().unwrap();
        assert_eq!(wallet.balance, 400);
        assert_eq!(wallet.loyalty_points, 10);
    }

    #[tokio::test]
    async fn test_short_wallet_balance_aborts_the_settlement() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let user = UserId::new();
        fixtures::seed_wallet(&repo, user, 40).await;

        let reservation = reservation_for(
            user,
            &lot,
            &slots[0],
            TimeWindow::new(at(10, 0), at(12, 0)).unwrap(),
        );
        let id = reservation.id;
        repo.commit_reservation(reservation).await.unwrap();

        let result = repo
            .settle_reservation(id, user, PaymentMethod::Wallet, 10, at(9, 0))
            .await;

        assert!(matches!(result, Err(PayReservationError::InsufficientBalance)));
        let state = repo.read().await;
        let wallet = state.wallets.get(&user).unwrap();
        assert_eq!(wallet.balance, 40);
        assert_eq!(
            state.reservations.get(&id).unwrap().payment_status,
            PaymentStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_settling_twice_reports_already_paid() {
        let repo = Repository::new();
        let (lot, slots) = fixtures::seed_lot(&repo, 1).await;
        let user = UserId::new();
        fixtures::seed_wallet(&repo, user, 500).await;

        let reservation = reservation_for(
            user,
            &lot,
            &slots[0],
            TimeWindow::new(at(10, 0), at(12, 0)).unwrap(),
        );
        let id = reservation.id;
        repo.commit_reservation(reservation).await.unwrap();

        repo.settle_reservation(id, user, PaymentMethod::Wallet, 10, at(9, 0))
            .await
            .unwrap();
        let result = repo
            .settle_reservation(id, user, PaymentMethod::Wallet, 10, at(9, 1))
            .await;

        assert!(matches!(result, Err(PayReservationError::AlreadyPaid)));
    }
}
