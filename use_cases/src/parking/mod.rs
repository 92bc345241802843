pub mod amend_reservation;
pub mod availability;
pub mod cancel_reservation;
pub mod check_availability;
pub mod pay_reservation;
pub mod queries;
pub mod reserve_slot;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::parking::{LotId, ParkingLot, ParkingSlot, SlotId};
use entities::payments::PaymentMethod;
use entities::reservations::{Reservation, ReservationId};
use entities::users::UserId;
#[cfg(test)]
use mockall::automock;
use shared_kernel::TimeWindow;

use crate::parking::amend_reservation::AmendReservationError;
use crate::parking::cancel_reservation::CancelReservationError;
use crate::parking::pay_reservation::PayReservationError;
use crate::parking::reserve_slot::CommitReservationError;

#[derive(Clone, Debug)]
pub struct CancellationOutcome {
    pub reservation: Reservation,
    pub refund_amount: u64,
    pub refund_description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AmendmentOutcome {
    pub reservation: Reservation,
    pub refund_amount: u64,
}

#[derive(Clone, Debug)]
pub struct SettlementOutcome {
    pub reservation: Reservation,
    pub loyalty_points_awarded: u64,
}

/// Store contract for the parking path. Every mutating operation is atomic:
/// its checks and its writes happen under one guard scoped to the slot (or
/// reservation), and wallet movements land in the same unit as the status
/// transition they accompany.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ParkingRepo: Send + Sync {
    async fn find_lot(&self, id: LotId) -> anyhow::Result<Option<ParkingLot>>;

    async fn find_slot(&self, id: SlotId) -> anyhow::Result<Option<ParkingSlot>>;

    async fn slots_for_lot(&self, lot: LotId) -> anyhow::Result<Vec<ParkingSlot>>;

    async fn active_reservations_for_lot(&self, lot: LotId) -> anyhow::Result<Vec<Reservation>>;

    async fn find_reservation(&self, id: ReservationId) -> anyhow::Result<Option<Reservation>>;

    async fn reservations_for_user(&self, user: UserId) -> anyhow::Result<Vec<Reservation>>;

    /// Re-runs the three availability checks for the reservation's window and
    /// either inserts it (also recording the station visit against the user)
    /// or reports what made the slot unavailable.
    async fn commit_reservation(
        &self,
        reservation: Reservation,
    ) -> Result<Reservation, CommitReservationError>;

    /// Transitions the reservation to cancelled, applying the refund tier for
    /// `now` and crediting the wallet in the same unit.
    async fn cancel_reservation(
        &self,
        id: ReservationId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<CancellationOutcome, CancelReservationError>;

    /// Shrinks the window after re-checking overlap against the slot's other
    /// active reservations, crediting the amendment refund in the same unit.
    async fn amend_reservation(
        &self,
        id: ReservationId,
        user: UserId,
        new_window: TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<AmendmentOutcome, AmendReservationError>;

    /// Marks the reservation paid, debiting the wallet when the method is
    /// `Wallet` and crediting `loyalty_percent` of the price as points.
    async fn settle_reservation(
        &self,
        id: ReservationId,
        user: UserId,
        method: PaymentMethod,
        loyalty_percent: u8,
        now: DateTime<Utc>,
    ) -> Result<SettlementOutcome, PayReservationError>;
}
