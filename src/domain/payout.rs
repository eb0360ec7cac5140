use crate::domain::address::validate_address;
use crate::domain::units::{DecimalAmount, MAX_DECIMALS, from_base_units};
use crate::error::{PayoutError, Result};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChainFamily {
    #[serde(alias = "evm")]
    Evm,
    #[serde(alias = "tron")]
    Tron,
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFamily::Evm => write!(f, "EVM"),
            ChainFamily::Tron => write!(f, "TRON"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    #[serde(alias = "native")]
    Native,
    #[serde(alias = "erc20")]
    Erc20,
    #[serde(alias = "trc20")]
    Trc20,
}

impl TokenKind {
    /// Decimals assumed when a payout does not state them: 18 for ether-like
    /// natives, 6 for TRX (sun) and for USDT-style stablecoins on both chains.
    pub fn default_decimals(self, family: ChainFamily) -> u8 {
        match (self, family) {
            (TokenKind::Native, ChainFamily::Evm) => 18,
            _ => 6,
        }
    }

    fn supported_on(self, family: ChainFamily) -> bool {
        matches!(
            (self, family),
            (TokenKind::Native, _)
                | (TokenKind::Erc20, ChainFamily::Evm)
                | (TokenKind::Trc20, ChainFamily::Tron)
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Native => write!(f, "NATIVE"),
            TokenKind::Erc20 => write!(f, "ERC20"),
            TokenKind::Trc20 => write!(f, "TRC20"),
        }
    }
}

/// A logical payout intent as supplied by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub recipient: String,
    pub amount: String,
    pub chain_family: ChainFamily,
    pub token_kind: TokenKind,
    pub token_contract: Option<String>,
    pub decimals: u8,
    pub required_network_id: Option<String>,
}

impl PayoutRequest {
    pub fn native(
        chain_family: ChainFamily,
        recipient: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
            chain_family,
            token_kind: TokenKind::Native,
            token_contract: None,
            decimals: TokenKind::Native.default_decimals(chain_family),
            required_network_id: None,
        }
    }

    /// A stablecoin payout: ERC-20 on EVM, TRC-20 on TRON.
    pub fn token(
        chain_family: ChainFamily,
        token_contract: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        let token_kind = match chain_family {
            ChainFamily::Evm => TokenKind::Erc20,
            ChainFamily::Tron => TokenKind::Trc20,
        };
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
            chain_family,
            token_kind,
            token_contract: Some(token_contract.into()),
            decimals: token_kind.default_decimals(chain_family),
            required_network_id: None,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_required_network(mut self, network_id: impl Into<String>) -> Self {
        self.required_network_id = Some(network_id.into());
        self
    }

    /// Checks every request invariant without touching a provider.
    pub fn validate(self) -> Result<ValidatedPayout> {
        if self.decimals > MAX_DECIMALS {
            return Err(PayoutError::InvalidRequest(format!(
                "decimals must be between 0 and {MAX_DECIMALS}, got {}",
                self.decimals
            )));
        }
        if !self.token_kind.supported_on(self.chain_family) {
            return Err(PayoutError::InvalidRequest(format!(
                "{} tokens cannot be paid out on {}",
                self.token_kind, self.chain_family
            )));
        }
        match (self.token_kind, &self.token_contract) {
            (TokenKind::Native, Some(_)) => {
                return Err(PayoutError::InvalidRequest(
                    "native payouts must not name a token contract".to_string(),
                ));
            }
            (TokenKind::Erc20 | TokenKind::Trc20, None) => {
                return Err(PayoutError::InvalidRequest(format!(
                    "{} payouts require a token contract",
                    self.token_kind
                )));
            }
            (_, Some(contract)) => validate_address(self.chain_family, contract)?,
            (TokenKind::Native, None) => {}
        }

        let amount = DecimalAmount::parse(&self.amount)?;
        if amount.is_zero() {
            return Err(PayoutError::InvalidAmount(format!(
                "amount must be greater than zero, got {}",
                self.amount
            )));
        }

        let units = amount.to_base_units(self.decimals)?;
        if units.is_zero() {
            return Err(PayoutError::InvalidAmount(format!(
                "{} is below the smallest unit at {} decimals",
                self.amount, self.decimals
            )));
        }

        validate_address(self.chain_family, &self.recipient)?;

        Ok(ValidatedPayout {
            request: self,
            units,
        })
    }
}

/// A request that passed validation and can be routed to an adapter.
///
/// Conversion happens during validation, so an amount that overflows or
/// truncates to zero units never reaches a wallet.
#[derive(Debug, Clone)]
pub struct ValidatedPayout {
    request: PayoutRequest,
    units: U256,
}

impl ValidatedPayout {
    pub fn request(&self) -> &PayoutRequest {
        &self.request
    }

    pub fn base_units(&self) -> U256 {
        self.units
    }

    /// The amount the transfer actually moves, after truncation to the
    /// request's decimals.
    pub fn amount_sent(&self) -> String {
        from_base_units(self.units, self.request.decimals)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxStatus {
    Submitted,
    Rejected,
    Failed,
}

impl From<&PayoutError> for TxStatus {
    fn from(error: &PayoutError) -> Self {
        if error.is_terminal() {
            TxStatus::Rejected
        } else {
            TxStatus::Failed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionResult {
    tx_ref: String,
    status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount_sent: Option<String>,
}

impl TransactionResult {
    pub fn submitted(tx_ref: impl Into<String>, amount_sent: impl Into<String>) -> Self {
        Self {
            tx_ref: tx_ref.into(),
            status: TxStatus::Submitted,
            amount_sent: Some(amount_sent.into()),
        }
    }

    /// The result a caller records for a dispatch that ended in `error`.
    pub fn from_error(error: &PayoutError) -> Self {
        Self {
            tx_ref: String::new(),
            status: error.into(),
            amount_sent: None,
        }
    }

    /// Canonical decimal amount transferred; `None` unless submitted.
    pub fn amount_sent(&self) -> Option<&str> {
        self.amount_sent.as_deref()
    }

    pub fn tx_ref(&self) -> &str {
        &self.tx_ref
    }

    pub fn status(&self) -> TxStatus {
        self.status
    }
}

/// What the ledger collaborator persists for every dispatched payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub recipient: String,
    pub amount: String,
    pub chain_family: ChainFamily,
    pub token_kind: TokenKind,
    pub tx_ref: String,
    pub status: TxStatus,
}

impl PayoutRecord {
    /// Submitted payouts record the amount actually transferred; anything
    /// else keeps the operator's amount for review.
    pub fn new(request: &PayoutRequest, result: &TransactionResult) -> Self {
        let amount = result.amount_sent().unwrap_or(request.amount.as_str());
        Self {
            recipient: request.recipient.clone(),
            amount: amount.to_string(),
            chain_family: request.chain_family,
            token_kind: request.token_kind,
            tx_ref: result.tx_ref.clone(),
            status: result.status,
        }
    }
}
