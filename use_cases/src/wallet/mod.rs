use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::users::UserId;
use entities::wallet::{Wallet, WalletTransaction};
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use thiserror::Error;

use crate::clock::Clock;

/// Points convert to wallet balance at 20%.
pub const LOYALTY_REDEMPTION_RATE: f64 = 0.2;

pub fn redemption_amount(points: u64) -> u64 {
    (points as f64 * LOYALTY_REDEMPTION_RATE).round() as u64
}

#[derive(Clone, Debug)]
pub struct LoyaltyRedemption {
    pub points_redeemed: u64,
    pub amount_credited: u64,
    pub wallet_balance: u64,
}

#[derive(Error, Debug)]
pub enum AddFundsError {
    #[error("invalid amount")]
    InvalidAmount,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum RedeemPointsError {
    #[error("no loyalty points to redeem")]
    NoPoints,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

/// Simple debit/credit ledger. Each mutation appends its transaction in the
/// same unit as the balance change.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WalletRepo: Send + Sync {
    async fn wallet(&self, user: UserId) -> anyhow::Result<Wallet>;

    async fn deposit(
        &self,
        user: UserId,
        amount: u64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Wallet>;

    /// Converts the full points balance at the redemption rate and resets it.
    async fn redeem_loyalty_points(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<LoyaltyRedemption, RedeemPointsError>;
}

pub struct WalletInteractor {
    repo: Arc<dyn WalletRepo>,
    clock: Arc<dyn Clock>,
}

impl WalletInteractor {
    pub fn new(repo: Arc<dyn WalletRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn wallet(&self, user_id: UserId) -> anyhow::Result<Wallet> {
        self.repo.wallet(user_id).await
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn add_funds(&self, user_id: UserId, amount: u64) -> Result<Wallet, AddFundsError> {
        if amount == 0 {
            return Err(AddFundsError::InvalidAmount);
        }
        self.repo
            .deposit(user_id, amount, self.clock.now())
            .await
            .map_err(Into::into)
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn redeem_points(
        &self,
        user_id: UserId,
    ) -> Result<LoyaltyRedemption, RedeemPointsError> {
        self.repo
            .redeem_loyalty_points(user_id, self.clock.now())
            .await
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn transactions(&self, user_id: UserId) -> anyhow::Result<Vec<WalletTransaction>> {
        let wallet = self.repo.wallet(user_id).await?;
        let mut transactions = wallet.transactions;
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(transactions)
    }
}
