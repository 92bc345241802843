use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargeOutcome {
    Approved,
    Declined,
}

/// External payment gateway for non-wallet methods. The charge is treated as
/// atomic: once approved, the booking proceeds exactly as if a wallet debit
/// had succeeded.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, amount: u64) -> anyhow::Result<ChargeOutcome>;
}
