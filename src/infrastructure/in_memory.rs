use crate::domain::payout::{PayoutRecord, TxStatus};
use crate::domain::ports::PayoutLedger;
use crate::error::{PayoutError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory payout ledger.
///
/// Uses `Arc<RwLock<Vec<PayoutRecord>>>` so clones share the same history.
/// Stands in for the backend ledger during dry runs and tests.
#[derive(Default, Clone)]
pub struct InMemoryPayoutLedger {
    records: Arc<RwLock<Vec<PayoutRecord>>>,
}

impl InMemoryPayoutLedger {
    /// Creates a new, empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PayoutLedger for InMemoryPayoutLedger {
    async fn record(&self, record: PayoutRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.push(record);
        Ok(())
    }

    async fn records(&self) -> Result<Vec<PayoutRecord>> {
        let records = self.records.read().await;
        Ok(records.clone())
    }

    async fn total_paid(&self, recipient: &str) -> Result<Decimal> {
        let records = self.records.read().await;
        records
            .iter()
            .filter(|r| r.recipient == recipient && r.status == TxStatus::Submitted)
            .try_fold(Decimal::ZERO, |total, r| {
                let amount = Decimal::from_str(r.amount.trim()).map_err(|e| {
                    PayoutError::InvalidAmount(format!("{} cannot be totalled: {e}", r.amount))
                })?;
                Ok(total + amount)
            })
    }
}
