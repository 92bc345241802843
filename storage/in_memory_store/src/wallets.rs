use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::users::UserId;
use entities::wallet::{TransactionKind, Wallet, WalletTransaction};

use crate::repository::Repository;
use use_cases::wallet::{redemption_amount, LoyaltyRedemption, RedeemPointsError, WalletRepo};

#[async_trait]
impl WalletRepo for Repository {
    async fn wallet(&self, user: UserId) -> anyhow::Result<Wallet> {
        Ok(self
            .read()
            .await
            .wallets
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }

    async fn deposit(
        &self,
        user: UserId,
        amount: u64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Wallet> {
        let mut state = self.write().await;
        state.credit(
            user,
            amount,
            TransactionKind::Deposit,
            "Added money to wallet".to_string(),
            None,
            now,
        );
        Ok(state.wallets.get(&user).cloned().unwrap_or_default())
    }

    async fn redeem_loyalty_points(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<LoyaltyRedemption, RedeemPointsError> {
        let mut state = self.write().await;

        let points = state
            .wallets
            .get(&user)
            .map(|wallet| wallet.loyalty_points)
            .unwrap_or(0);
        if points == 0 {
            return Err(RedeemPointsError::NoPoints);
        }

        let amount = redemption_amount(points);
        let wallet = state.wallet_mut(user);
        wallet.balance += amount;
        wallet.loyalty_points = 0;
        wallet.transactions.push(WalletTransaction {
            kind: TransactionKind::LoyaltyRedemption,
            amount: amount as i64,
            description: format!("Redeemed {points} loyalty points"),
            reference: None,
            timestamp: now,
        });

        Ok(LoyaltyRedemption {
            points_redeemed: points,
            amount_credited: amount,
            wallet_balance: wallet.balance,
        })
    }
}
