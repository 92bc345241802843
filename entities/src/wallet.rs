use crate::reservations::ReservationId;
use crate::rides::RideId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Payment,
    Refund,
    LoyaltyRedemption,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingRef {
    Reservation(ReservationId),
    Ride(RideId),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub kind: TransactionKind,
    /// Signed: debits are negative, credits positive.
    pub amount: i64,
    pub description: String,
    pub reference: Option<BookingRef>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Wallet {
    pub balance: u64,
    pub loyalty_points: u64,
    pub transactions: Vec<WalletTransaction>,
}
