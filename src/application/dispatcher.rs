use crate::application::adapter::{EvmAdapter, TronAdapter};
use crate::application::gateway::WalletProviderGateway;
use crate::domain::payout::{ChainFamily, PayoutRequest, TokenKind, TransactionResult};
use crate::domain::ports::ChainAdapterBox;
use crate::error::{PayoutError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Turns payout requests into submitted transfers.
///
/// A dispatch runs validate and convert → resolve adapter → connect → enforce
/// network → submit, and stops at the first failure. Nothing is retried: a
/// signed transfer cannot be replayed safely, so every failure goes back to
/// the caller.
///
/// Wallets show one confirmation prompt at a time, so the provider-facing
/// part of a dispatch holds a per-chain-family lane. Concurrent dispatches on
/// the same family queue in arrival order; different families run in parallel.
pub struct PayoutDispatcher {
    gateway: Arc<WalletProviderGateway>,
    adapters: HashMap<ChainFamily, ChainAdapterBox>,
    evm_lane: Mutex<()>,
    tron_lane: Mutex<()>,
}

impl PayoutDispatcher {
    /// Creates a dispatcher with an adapter for every provider the gateway holds.
    pub fn new(gateway: Arc<WalletProviderGateway>) -> Self {
        let mut adapters: HashMap<ChainFamily, ChainAdapterBox> = HashMap::new();
        if let Some(provider) = gateway.evm_handle() {
            adapters.insert(ChainFamily::Evm, Box::new(EvmAdapter::new(provider)));
        }
        if let Some(provider) = gateway.tron_handle() {
            let fee_limit = gateway.config().tron_fee_limit_sun;
            adapters.insert(
                ChainFamily::Tron,
                Box::new(TronAdapter::new(provider, fee_limit)),
            );
        }

        Self {
            gateway,
            adapters,
            evm_lane: Mutex::new(()),
            tron_lane: Mutex::new(()),
        }
    }

    /// Replaces the adapter registered for the adapter's chain family.
    pub fn with_adapter(mut self, adapter: ChainAdapterBox) -> Self {
        self.adapters.insert(adapter.chain_family(), adapter);
        self
    }

    pub fn gateway(&self) -> &Arc<WalletProviderGateway> {
        &self.gateway
    }

    #[instrument(skip_all, fields(chain = %request.chain_family, token = %request.token_kind))]
    pub async fn dispatch(&self, request: PayoutRequest) -> Result<TransactionResult> {
        let family = request.chain_family;
        let payout = request.validate().inspect_err(|e| warn!(error = %e, "payout rejected"))?;

        let adapter = self
            .adapters
            .get(&family)
            .filter(|_| self.gateway.is_available(family))
            .ok_or(PayoutError::ProviderUnavailable(family))?;

        let _lane = self.lane(family).lock().await;

        let mut connection = self.gateway.connection(family).await;
        if !connection.is_connected() {
            connection = self.gateway.connect(family).await?;
        }

        let request = payout.request();
        let required_network = request
            .required_network_id
            .as_deref()
            .or(self.gateway.config().default_evm_network.as_deref());
        if family == ChainFamily::Evm
            && let Some(required) = required_network
        {
            self.gateway
                .ensure_network(family, required)
                .await
                .inspect_err(|e| warn!(error = %e, "network check failed"))?;
            connection = self.gateway.connection(family).await;
        }

        let amount = payout.base_units();

        let submitted = match (request.token_kind, request.token_contract.as_deref()) {
            (TokenKind::Native, _) => {
                adapter
                    .transfer_native(&connection, &request.recipient, amount)
                    .await
            }
            (_, Some(contract)) => {
                adapter
                    .transfer_token(&connection, contract, &request.recipient, amount)
                    .await
            }
            (_, None) => Err(PayoutError::InvalidRequest(
                "token payout without a token contract".to_string(),
            )),
        };

        match submitted {
            Ok(tx_ref) => {
                info!(%tx_ref, recipient = %request.recipient, amount = %payout.amount_sent(), "payout submitted");
                Ok(TransactionResult::submitted(tx_ref, payout.amount_sent()))
            }
            Err(e) => {
                warn!(error = %e, terminal = e.is_terminal(), "payout not submitted");
                Err(e)
            }
        }
    }

    fn lane(&self, family: ChainFamily) -> &Mutex<()> {
        match family {
            ChainFamily::Evm => &self.evm_lane,
            ChainFamily::Tron => &self.tron_lane,
        }
    }
}
