use crate::parking::{LotId, SlotId};
use crate::payments::PaymentStatus;
use crate::qr::QrCode;
use crate::users::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_kernel::{uuid_key, TimeWindow};

uuid_key!(ReservationId);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Active,
    Cancelled,
    Completed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub user_id: UserId,
    pub parking_lot_id: LotId,
    pub parking_slot_id: SlotId,
    pub qr_code: QrCode,
    pub window: TimeWindow,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    pub price: u64,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }
}
