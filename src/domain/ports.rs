use super::connection::WalletConnection;
use super::payout::{ChainFamily, PayoutRecord};
use crate::error::{PayoutError, Result};
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// EIP-1193 code for a prompt the user declined.
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-1193 code for a `wallet_switchEthereumChain` target the wallet does not know.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// A failure reported by a wallet provider, shaped after EIP-1193 errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderFault {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderFault {
    pub fn new(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected(message: impl Into<String>) -> Self {
        Self::new(Some(USER_REJECTED_CODE), message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    /// TRON wallets report declines as plain strings without a code.
    pub fn is_user_rejection(&self) -> bool {
        if self.code == Some(USER_REJECTED_CODE) {
            return true;
        }
        let message = self.message.to_ascii_lowercase();
        ["declined", "rejected", "denied", "cancelled"]
            .iter()
            .any(|marker| message.contains(marker))
    }

    /// Classification for account authorization and transfer submission.
    pub fn into_transfer_error(self) -> PayoutError {
        if self.is_user_rejection() {
            PayoutError::UserRejected(self.message)
        } else {
            PayoutError::ProviderError(self.message)
        }
    }

    /// Classification for a network switch request.
    pub fn into_switch_error(self, required: &str) -> PayoutError {
        let reason = if self.code == Some(UNRECOGNIZED_CHAIN_CODE) {
            format!("network is unknown to the wallet: {}", self.message)
        } else if self.is_user_rejection() {
            format!("switch declined: {}", self.message)
        } else {
            return PayoutError::ProviderError(self.message);
        };
        PayoutError::NetworkMismatch {
            required: required.to_string(),
            reason,
        }
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderFault>;

/// Parameters of an `eth_sendTransaction` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvmTransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

/// Events an EVM provider pushes on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvmEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(String),
}

/// An injected EVM wallet (EIP-1193).
#[async_trait]
pub trait EvmProvider: Send + Sync {
    /// Capability probe; must not prompt the user.
    fn is_injected(&self) -> bool;
    /// `eth_requestAccounts`
    async fn request_accounts(&self) -> ProviderResult<Vec<String>>;
    /// `eth_chainId`
    async fn chain_id(&self) -> ProviderResult<String>;
    /// `wallet_switchEthereumChain`
    async fn switch_chain(&self, chain_id: &str) -> ProviderResult<()>;
    /// `eth_sendTransaction`, returning the transaction hash.
    async fn send_transaction(&self, request: EvmTransactionRequest) -> ProviderResult<String>;
    fn events(&self) -> broadcast::Receiver<EvmEvent>;
}

/// Options attached to a TRON contract call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TronCallOptions {
    /// Maximum energy fee in sun the call may burn.
    pub fee_limit: u64,
    pub call_value: u64,
}

/// A bound TRC-20 contract.
#[async_trait]
pub trait Trc20Contract: Send + Sync {
    async fn transfer(
        &self,
        to: &str,
        amount: U256,
        options: TronCallOptions,
    ) -> ProviderResult<String>;
}

/// An injected TRON wallet. There is no event channel; state is read by
/// polling `is_ready` and `default_address`.
#[async_trait]
pub trait TronProvider: Send + Sync {
    fn is_injected(&self) -> bool;
    /// `tron_requestAccounts`
    async fn request_accounts(&self) -> ProviderResult<()>;
    fn is_ready(&self) -> bool;
    fn default_address(&self) -> Option<String>;
    async fn send_trx(&self, to: &str, amount_sun: U256, from: &str) -> ProviderResult<String>;
    async fn contract(&self, address: &str) -> ProviderResult<Box<dyn Trc20Contract>>;
}

pub type EvmProviderHandle = Arc<dyn EvmProvider>;
pub type TronProviderHandle = Arc<dyn TronProvider>;

/// Builds and submits transfers for one chain family.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    fn chain_family(&self) -> ChainFamily;

    async fn transfer_native(
        &self,
        connection: &WalletConnection,
        to: &str,
        amount: U256,
    ) -> Result<String>;

    async fn transfer_token(
        &self,
        connection: &WalletConnection,
        token_contract: &str,
        to: &str,
        amount: U256,
    ) -> Result<String>;
}

pub type ChainAdapterBox = Box<dyn ChainAdapter>;

/// Persistence of dispatched payouts, owned by the caller of the dispatcher.
#[async_trait]
pub trait PayoutLedger: Send + Sync {
    async fn record(&self, record: PayoutRecord) -> Result<()>;
    async fn records(&self) -> Result<Vec<PayoutRecord>>;
    /// Sum of submitted amounts paid to `recipient`.
    async fn total_paid(&self, recipient: &str) -> Result<Decimal>;
}

pub type PayoutLedgerBox = Box<dyn PayoutLedger>;
