use crate::domain::address::validate_evm_address;
use crate::domain::connection::WalletConnection;
use crate::domain::payout::ChainFamily;
use crate::domain::ports::{ChainAdapter, EvmProviderHandle, EvmTransactionRequest, ProviderFault};
use crate::error::{PayoutError, Result};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};
use async_trait::async_trait;
use tracing::info;

sol! {
    /// The part of the ERC-20 interface payouts need.
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// ABI call data for `transfer(address,uint256)`: the 4-byte selector
/// `0xa9059cbb` followed by the recipient and amount, each left-padded to
/// 32 bytes.
pub fn transfer_call_data(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

/// Submits transfers through an injected EIP-1193 wallet.
pub struct EvmAdapter {
    provider: EvmProviderHandle,
}

impl EvmAdapter {
    pub fn new(provider: EvmProviderHandle) -> Self {
        Self { provider }
    }

    async fn submit(&self, request: EvmTransactionRequest) -> Result<String> {
        let tx_ref = self
            .provider
            .send_transaction(request)
            .await
            .map_err(ProviderFault::into_transfer_error)?;
        info!(%tx_ref, "EVM transaction submitted");
        Ok(tx_ref)
    }
}

fn parse_address(address: &str) -> Result<Address> {
    validate_evm_address(address)?;
    address
        .parse()
        .map_err(|e| PayoutError::InvalidAddress(format!("{address}: {e}")))
}

fn sender(connection: &WalletConnection) -> Result<Address> {
    let account = connection
        .account()
        .filter(|_| connection.chain_family() == ChainFamily::Evm)
        .ok_or(PayoutError::ProviderUnavailable(ChainFamily::Evm))?;
    account.parse().map_err(|e| {
        PayoutError::ProviderError(format!("wallet reported a malformed account {account}: {e}"))
    })
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    fn chain_family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    async fn transfer_native(
        &self,
        connection: &WalletConnection,
        to: &str,
        amount: U256,
    ) -> Result<String> {
        let request = EvmTransactionRequest {
            from: sender(connection)?,
            to: parse_address(to)?,
            value: amount,
            data: None,
        };
        self.submit(request).await
    }

    async fn transfer_token(
        &self,
        connection: &WalletConnection,
        token_contract: &str,
        to: &str,
        amount: U256,
    ) -> Result<String> {
        let request = EvmTransactionRequest {
            from: sender(connection)?,
            to: parse_address(token_contract)?,
            value: U256::ZERO,
            data: Some(transfer_call_data(parse_address(to)?, amount)),
        };
        self.submit(request).await
    }
}
