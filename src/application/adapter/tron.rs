use crate::domain::address::validate_tron_address;
use crate::domain::connection::WalletConnection;
use crate::domain::payout::ChainFamily;
use crate::domain::ports::{ChainAdapter, ProviderFault, TronCallOptions, TronProviderHandle};
use crate::error::{PayoutError, Result};
use alloy_primitives::U256;
use async_trait::async_trait;
use tracing::info;

/// Submits transfers through an injected TronWeb-style wallet.
pub struct TronAdapter {
    provider: TronProviderHandle,
    fee_limit_sun: u64,
}

impl TronAdapter {
    pub fn new(provider: TronProviderHandle, fee_limit_sun: u64) -> Self {
        Self {
            provider,
            fee_limit_sun,
        }
    }
}

fn sender(connection: &WalletConnection) -> Result<&str> {
    connection
        .account()
        .filter(|_| connection.chain_family() == ChainFamily::Tron)
        .ok_or(PayoutError::ProviderUnavailable(ChainFamily::Tron))
}

#[async_trait]
impl ChainAdapter for TronAdapter {
    fn chain_family(&self) -> ChainFamily {
        ChainFamily::Tron
    }

    async fn transfer_native(
        &self,
        connection: &WalletConnection,
        to: &str,
        amount: U256,
    ) -> Result<String> {
        let from = sender(connection)?;
        validate_tron_address(to)?;

        let tx_ref = self
            .provider
            .send_trx(to, amount, from)
            .await
            .map_err(ProviderFault::into_transfer_error)?;
        info!(%tx_ref, "TRX transfer submitted");
        Ok(tx_ref)
    }

    async fn transfer_token(
        &self,
        connection: &WalletConnection,
        token_contract: &str,
        to: &str,
        amount: U256,
    ) -> Result<String> {
        sender(connection)?;
        validate_tron_address(token_contract)?;
        validate_tron_address(to)?;

        let contract = self
            .provider
            .contract(token_contract)
            .await
            .map_err(ProviderFault::into_transfer_error)?;
        let options = TronCallOptions {
            fee_limit: self.fee_limit_sun,
            call_value: 0,
        };
        let tx_ref = contract
            .transfer(to, amount, options)
            .await
            .map_err(ProviderFault::into_transfer_error)?;
        info!(%tx_ref, fee_limit = self.fee_limit_sun, "TRC-20 transfer submitted");
        Ok(tx_ref)
    }
}
