use crate::config::DispatcherConfig;
use crate::domain::connection::{WalletConnection, network_number, same_network};
use crate::domain::payout::ChainFamily;
use crate::domain::ports::{
    EvmEvent, EvmProviderHandle, ProviderFault, TronProvider, TronProviderHandle,
};
use crate::error::{PayoutError, Result};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Owns the wallet providers and the one mutable connection per chain family.
///
/// Everything else reads connection state through [`connection`](Self::connection),
/// which hands out snapshots. State changes come from explicit `connect` and
/// `ensure_network` calls or from events observed by a [`Subscription`].
pub struct WalletProviderGateway {
    evm: Option<EvmProviderHandle>,
    tron: Option<TronProviderHandle>,
    evm_state: Arc<RwLock<WalletConnection>>,
    tron_state: Arc<RwLock<WalletConnection>>,
    focus: watch::Sender<()>,
    config: DispatcherConfig,
}

impl WalletProviderGateway {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            evm: None,
            tron: None,
            evm_state: Arc::new(RwLock::new(WalletConnection::disconnected(ChainFamily::Evm))),
            tron_state: Arc::new(RwLock::new(WalletConnection::disconnected(
                ChainFamily::Tron,
            ))),
            focus: watch::Sender::new(()),
            config,
        }
    }

    pub fn with_evm_provider(mut self, provider: EvmProviderHandle) -> Self {
        self.evm = Some(provider);
        self
    }

    pub fn with_tron_provider(mut self, provider: TronProviderHandle) -> Self {
        self.tron = Some(provider);
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Whether a wallet for `family` is injected. Never prompts.
    pub fn is_available(&self, family: ChainFamily) -> bool {
        match family {
            ChainFamily::Evm => self.evm.as_ref().is_some_and(|p| p.is_injected()),
            ChainFamily::Tron => self.tron.as_ref().is_some_and(|p| p.is_injected()),
        }
    }

    pub async fn connection(&self, family: ChainFamily) -> WalletConnection {
        self.state(family).read().await.clone()
    }

    /// Asks the wallet for account authorization and records the session.
    pub async fn connect(&self, family: ChainFamily) -> Result<WalletConnection> {
        match family {
            ChainFamily::Evm => self.connect_evm().await,
            ChainFamily::Tron => self.connect_tron().await,
        }
    }

    async fn connect_evm(&self) -> Result<WalletConnection> {
        let provider = self.evm_provider()?;
        let accounts = provider
            .request_accounts()
            .await
            .map_err(ProviderFault::into_transfer_error)?;
        let account = accounts
            .into_iter()
            .find(|account| !account.is_empty())
            .ok_or_else(|| {
                PayoutError::ProviderError("wallet authorized no accounts".to_string())
            })?;
        let network_id = provider
            .chain_id()
            .await
            .map_err(ProviderFault::into_transfer_error)?;

        let mut state = self.evm_state.write().await;
        state.set_account(Some(account));
        state.set_network(network_id);
        info!(account = ?state.account(), network = ?state.network_id(), "EVM wallet connected");
        Ok(state.clone())
    }

    async fn connect_tron(&self) -> Result<WalletConnection> {
        let provider = self.tron_provider()?;
        provider
            .request_accounts()
            .await
            .map_err(ProviderFault::into_transfer_error)?;
        let account = self.wait_for_tron_ready(provider.as_ref()).await?;

        let mut state = self.tron_state.write().await;
        state.set_account(Some(account));
        info!(account = ?state.account(), "TRON wallet connected");
        Ok(state.clone())
    }

    /// TRON wallets inject themselves asynchronously, so authorization can
    /// succeed before the wallet exposes an address.
    async fn wait_for_tron_ready(&self, provider: &dyn TronProvider) -> Result<String> {
        let timeout = self.config.tron_readiness_timeout();
        let mut ticker = tokio::time::interval(self.config.tron_readiness_interval());
        let poll = async {
            loop {
                ticker.tick().await;
                if provider.is_ready()
                    && let Some(address) = provider.default_address().filter(|a| !a.is_empty())
                {
                    return address;
                }
                debug!("TRON wallet not ready yet");
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| PayoutError::Timeout {
                waited_ms: self.config.tron_readiness_timeout_ms,
            })
    }

    /// Makes sure the EVM wallet is on `required`, asking it to switch if not.
    /// TRON has a single network and always passes.
    pub async fn ensure_network(&self, family: ChainFamily, required: &str) -> Result<()> {
        if family == ChainFamily::Tron {
            return Ok(());
        }
        let provider = self.evm_provider()?;

        let current = provider
            .chain_id()
            .await
            .map_err(ProviderFault::into_transfer_error)?;
        if same_network(&current, required) {
            self.evm_state.write().await.set_network(current);
            return Ok(());
        }

        warn!(%current, %required, "EVM wallet on the wrong network, requesting a switch");
        provider
            .switch_chain(&switch_chain_param(required))
            .await
            .map_err(|fault| fault.into_switch_error(required))?;

        let switched = provider
            .chain_id()
            .await
            .map_err(ProviderFault::into_transfer_error)?;
        self.evm_state.write().await.set_network(switched.clone());
        if !same_network(&switched, required) {
            return Err(PayoutError::NetworkMismatch {
                required: required.to_string(),
                reason: format!("wallet is still on {switched}"),
            });
        }
        info!(network = %switched, "EVM wallet switched network");
        Ok(())
    }

    /// Delivers account and network changes for every injected wallet.
    ///
    /// EVM wallets push events; TRON wallets are polled on
    /// `tron_poll_interval_ms` and on every [`notify_focus`](Self::notify_focus),
    /// with an event synthesized whenever the observed account differs from
    /// the recorded one. Must be called inside a tokio runtime.
    pub fn subscribe<A, N>(&self, on_account_changed: A, on_network_changed: N) -> Subscription
    where
        A: Fn(ChainFamily, Option<String>) + Send + Sync + 'static,
        N: Fn(String) + Send + Sync + 'static,
    {
        let on_account_changed = Arc::new(on_account_changed);
        let on_network_changed = Arc::new(on_network_changed);
        let mut tasks = Vec::new();

        if let Ok(provider) = self.evm_provider() {
            let mut events = provider.events();
            let state = Arc::clone(&self.evm_state);
            let on_account_changed = Arc::clone(&on_account_changed);
            tasks.push(tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(EvmEvent::AccountsChanged(accounts)) => {
                            let account = accounts.into_iter().find(|a| !a.is_empty());
                            state.write().await.set_account(account.clone());
                            on_account_changed(ChainFamily::Evm, account);
                        }
                        Ok(EvmEvent::ChainChanged(network_id)) => {
                            state.write().await.set_network(network_id.clone());
                            on_network_changed(network_id);
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "EVM wallet events dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }));
        }

        if let Ok(provider) = self.tron_provider() {
            let provider = Arc::clone(provider);
            let state = Arc::clone(&self.tron_state);
            let mut focus = self.focus.subscribe();
            let mut ticker = tokio::time::interval(self.config.tron_poll_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tasks.push(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {}
                        changed = focus.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                    }
                    if !provider.is_ready() {
                        continue;
                    }
                    let observed = provider.default_address().filter(|a| !a.is_empty());
                    let changed = {
                        let mut state = state.write().await;
                        if state.account() == observed.as_deref() {
                            false
                        } else {
                            state.set_account(observed.clone());
                            true
                        }
                    };
                    if changed {
                        debug!(account = ?observed, "TRON account change observed");
                        on_account_changed(ChainFamily::Tron, observed);
                    }
                }
            }));
        }

        Subscription { tasks }
    }

    /// Signals that the host regained focus or visibility, triggering an
    /// immediate TRON poll.
    pub fn notify_focus(&self) {
        self.focus.send_replace(());
    }

    fn state(&self, family: ChainFamily) -> &Arc<RwLock<WalletConnection>> {
        match family {
            ChainFamily::Evm => &self.evm_state,
            ChainFamily::Tron => &self.tron_state,
        }
    }

    pub(crate) fn evm_handle(&self) -> Option<EvmProviderHandle> {
        self.evm.clone()
    }

    pub(crate) fn tron_handle(&self) -> Option<TronProviderHandle> {
        self.tron.clone()
    }

    pub(crate) fn evm_provider(&self) -> Result<&EvmProviderHandle> {
        self.evm
            .as_ref()
            .filter(|p| p.is_injected())
            .ok_or(PayoutError::ProviderUnavailable(ChainFamily::Evm))
    }

    pub(crate) fn tron_provider(&self) -> Result<&TronProviderHandle> {
        self.tron
            .as_ref()
            .filter(|p| p.is_injected())
            .ok_or(PayoutError::ProviderUnavailable(ChainFamily::Tron))
    }
}

/// Handle returned by [`WalletProviderGateway::subscribe`]. Dropping it stops
/// event delivery.
pub struct Subscription {
    tasks: Vec<JoinHandle<()>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// `wallet_switchEthereumChain` only takes hex chain ids.
fn switch_chain_param(required: &str) -> String {
    match network_number(required) {
        Some(id) => format!("0x{id:x}"),
        None => required.to_string(),
    }
}
