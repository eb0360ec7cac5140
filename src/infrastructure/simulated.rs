//! Scripted stand-ins for injected browser wallets.
//!
//! They implement the provider ports with configurable prompt outcomes so the
//! dispatcher can be exercised end to end without a browser: the batch CLI uses
//! them for dry runs and the test suites use them to observe provider traffic.

use crate::domain::connection::same_network;
use crate::domain::ports::{
    EvmEvent, EvmProvider, EvmTransactionRequest, ProviderFault, ProviderResult,
    Trc20Contract, TronCallOptions, TronProvider, UNRECOGNIZED_CHAIN_CODE,
};
use alloy_primitives::{U256, hex, keccak256};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// How a simulated wallet answers a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PromptBehavior {
    #[default]
    Approve,
    /// The human clicks "reject".
    Reject,
    /// The wallet fails with the given message.
    Fail(String),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tracks prompts that are open at the same time.
#[derive(Default)]
struct PromptTracker {
    open: AtomicUsize,
    max_open: AtomicUsize,
    calls: AtomicUsize,
    delay: Mutex<Duration>,
}

impl PromptTracker {
    async fn prompt(&self, behavior: &PromptBehavior, rejection: &str) -> ProviderResult<()> {
        let open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open.fetch_max(open, Ordering::SeqCst);
        let delay = *lock(&self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.open.fetch_sub(1, Ordering::SeqCst);

        match behavior {
            PromptBehavior::Approve => Ok(()),
            PromptBehavior::Reject => Err(ProviderFault::user_rejected(rejection)),
            PromptBehavior::Fail(message) => Err(ProviderFault::other(message.clone())),
        }
    }

    fn call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

struct EvmWalletState {
    injected: AtomicBool,
    accounts: Mutex<Vec<String>>,
    chain_id: Mutex<String>,
    known_chains: Mutex<Vec<String>>,
    authorization: Mutex<PromptBehavior>,
    signing: Mutex<PromptBehavior>,
    switch: Mutex<PromptBehavior>,
    switch_requests: Mutex<Vec<String>>,
    sent: Mutex<Vec<EvmTransactionRequest>>,
    events: broadcast::Sender<EvmEvent>,
    prompts: PromptTracker,
}

/// A simulated EIP-1193 wallet.
#[derive(Clone)]
pub struct SimulatedEvmWallet {
    inner: Arc<EvmWalletState>,
}

impl SimulatedEvmWallet {
    pub fn new(account: impl Into<String>, chain_id: impl Into<String>) -> Self {
        let chain_id = chain_id.into();
        let (events, _) = broadcast::channel(32);
        Self {
            inner: Arc::new(EvmWalletState {
                injected: AtomicBool::new(true),
                accounts: Mutex::new(vec![account.into()]),
                known_chains: Mutex::new(vec![chain_id.clone()]),
                chain_id: Mutex::new(chain_id),
                authorization: Mutex::default(),
                signing: Mutex::default(),
                switch: Mutex::default(),
                switch_requests: Mutex::default(),
                sent: Mutex::default(),
                events,
                prompts: PromptTracker::default(),
            }),
        }
    }

    /// A wallet whose provider object is absent from the page.
    pub fn not_injected(self) -> Self {
        self.inner.injected.store(false, Ordering::SeqCst);
        self
    }

    pub fn with_known_chains<I, S>(self, chains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *lock(&self.inner.known_chains) = chains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_authorization(self, behavior: PromptBehavior) -> Self {
        *lock(&self.inner.authorization) = behavior;
        self
    }

    pub fn with_signing(self, behavior: PromptBehavior) -> Self {
        *lock(&self.inner.signing) = behavior;
        self
    }

    pub fn with_switch(self, behavior: PromptBehavior) -> Self {
        *lock(&self.inner.switch) = behavior;
        self
    }

    /// Keeps every prompt open for `delay` before it resolves.
    pub fn with_prompt_delay(self, delay: Duration) -> Self {
        *lock(&self.inner.prompts.delay) = delay;
        self
    }

    /// Pushes a provider event, applying it to the wallet's own state first.
    pub fn emit(&self, event: EvmEvent) {
        match &event {
            EvmEvent::AccountsChanged(accounts) => *lock(&self.inner.accounts) = accounts.clone(),
            EvmEvent::ChainChanged(chain_id) => *lock(&self.inner.chain_id) = chain_id.clone(),
        }
        // No subscriber is not an error for a wallet.
        let _ = self.inner.events.send(event);
    }

    /// Number of provider requests made (probes excluded).
    pub fn provider_calls(&self) -> usize {
        self.inner.prompts.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent_prompts(&self) -> usize {
        self.inner.prompts.max_open.load(Ordering::SeqCst)
    }

    pub fn switch_requests(&self) -> Vec<String> {
        lock(&self.inner.switch_requests).clone()
    }

    pub fn sent_transactions(&self) -> Vec<EvmTransactionRequest> {
        lock(&self.inner.sent).clone()
    }
}

#[async_trait]
impl EvmProvider for SimulatedEvmWallet {
    fn is_injected(&self) -> bool {
        self.inner.injected.load(Ordering::SeqCst)
    }

    async fn request_accounts(&self) -> ProviderResult<Vec<String>> {
        self.inner.prompts.call();
        let behavior = lock(&self.inner.authorization).clone();
        self.inner
            .prompts
            .prompt(&behavior, "User rejected the request.")
            .await?;
        Ok(lock(&self.inner.accounts).clone())
    }

    async fn chain_id(&self) -> ProviderResult<String> {
        self.inner.prompts.call();
        Ok(lock(&self.inner.chain_id).clone())
    }

    async fn switch_chain(&self, chain_id: &str) -> ProviderResult<()> {
        self.inner.prompts.call();
        lock(&self.inner.switch_requests).push(chain_id.to_string());

        let known = lock(&self.inner.known_chains)
            .iter()
            .any(|c| same_network(c, chain_id));
        if !known {
            return Err(ProviderFault::new(
                Some(UNRECOGNIZED_CHAIN_CODE),
                format!("Unrecognized chain ID \"{chain_id}\"."),
            ));
        }

        let behavior = lock(&self.inner.switch).clone();
        self.inner
            .prompts
            .prompt(&behavior, "User rejected the request.")
            .await?;
        self.emit(EvmEvent::ChainChanged(chain_id.to_string()));
        Ok(())
    }

    async fn send_transaction(&self, request: EvmTransactionRequest) -> ProviderResult<String> {
        self.inner.prompts.call();
        let behavior = lock(&self.inner.signing).clone();
        self.inner
            .prompts
            .prompt(&behavior, "MetaMask Tx Signature: User denied transaction signature.")
            .await?;

        let mut sent = lock(&self.inner.sent);
        let mut preimage = serde_json::to_vec(&request)
            .map_err(|e| ProviderFault::other(format!("malformed transaction: {e}")))?;
        preimage.extend_from_slice(&sent.len().to_be_bytes());
        sent.push(request);
        Ok(keccak256(&preimage).to_string())
    }

    fn events(&self) -> broadcast::Receiver<EvmEvent> {
        self.inner.events.subscribe()
    }
}

/// A native TRX transfer seen by a simulated TRON wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrxTransfer {
    pub from: String,
    pub to: String,
    pub amount_sun: U256,
}

/// A TRC-20 `transfer` call seen by a simulated TRON wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trc20Call {
    pub contract: String,
    pub to: String,
    pub amount: U256,
    pub options: TronCallOptions,
}

struct TronWalletState {
    injected: AtomicBool,
    ready_at: Mutex<Option<Instant>>,
    default_address: Mutex<Option<String>>,
    deployed: Mutex<Option<Vec<String>>>,
    authorization: Mutex<PromptBehavior>,
    signing: Mutex<PromptBehavior>,
    trx_transfers: Mutex<Vec<TrxTransfer>>,
    contract_calls: Mutex<Vec<Trc20Call>>,
    prompts: PromptTracker,
}

/// A simulated TronLink-style wallet.
#[derive(Clone)]
pub struct SimulatedTronWallet {
    inner: Arc<TronWalletState>,
}

impl SimulatedTronWallet {
    /// A wallet that is injected and ready with `address` selected.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TronWalletState {
                injected: AtomicBool::new(true),
                ready_at: Mutex::new(Some(Instant::now())),
                default_address: Mutex::new(Some(address.into())),
                deployed: Mutex::default(),
                authorization: Mutex::default(),
                signing: Mutex::default(),
                trx_transfers: Mutex::default(),
                contract_calls: Mutex::default(),
                prompts: PromptTracker::default(),
            }),
        }
    }

    pub fn not_injected(self) -> Self {
        self.inner.injected.store(false, Ordering::SeqCst);
        *lock(&self.inner.ready_at) = None;
        self
    }

    /// The wallet finishes injecting itself `delay` from now.
    pub fn ready_after(self, delay: Duration) -> Self {
        *lock(&self.inner.ready_at) = Some(Instant::now() + delay);
        self
    }

    /// Restricts contract resolution to `contracts`; any other address fails.
    pub fn with_deployed_contracts<I, S>(self, contracts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *lock(&self.inner.deployed) = Some(contracts.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_authorization(self, behavior: PromptBehavior) -> Self {
        *lock(&self.inner.authorization) = behavior;
        self
    }

    pub fn with_signing(self, behavior: PromptBehavior) -> Self {
        *lock(&self.inner.signing) = behavior;
        self
    }

    pub fn with_prompt_delay(self, delay: Duration) -> Self {
        *lock(&self.inner.prompts.delay) = delay;
        self
    }

    /// Changes the account the wallet exposes, as a user switching accounts would.
    pub fn set_default_address(&self, address: Option<&str>) {
        *lock(&self.inner.default_address) = address.map(str::to_string);
    }

    pub fn provider_calls(&self) -> usize {
        self.inner.prompts.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent_prompts(&self) -> usize {
        self.inner.prompts.max_open.load(Ordering::SeqCst)
    }

    pub fn trx_transfers(&self) -> Vec<TrxTransfer> {
        lock(&self.inner.trx_transfers).clone()
    }

    pub fn contract_calls(&self) -> Vec<Trc20Call> {
        lock(&self.inner.contract_calls).clone()
    }

    async fn sign(&self, preimage: String) -> ProviderResult<String> {
        let behavior = lock(&self.inner.signing).clone();
        self.inner
            .prompts
            .prompt(&behavior, "Confirmation declined by user")
            .await?;
        Ok(hex::encode(keccak256(preimage.as_bytes())))
    }
}

#[async_trait]
impl TronProvider for SimulatedTronWallet {
    fn is_injected(&self) -> bool {
        self.inner.injected.load(Ordering::SeqCst)
    }

    async fn request_accounts(&self) -> ProviderResult<()> {
        self.inner.prompts.call();
        let behavior = lock(&self.inner.authorization).clone();
        self.inner
            .prompts
            .prompt(&behavior, "User rejected the request.")
            .await
    }

    fn is_ready(&self) -> bool {
        lock(&self.inner.ready_at).is_some_and(|at| Instant::now() >= at)
    }

    fn default_address(&self) -> Option<String> {
        lock(&self.inner.default_address).clone()
    }

    async fn send_trx(&self, to: &str, amount_sun: U256, from: &str) -> ProviderResult<String> {
        self.inner.prompts.call();
        let nonce = lock(&self.inner.trx_transfers).len();
        let tx_id = self
            .sign(format!("trx:{from}:{to}:{amount_sun}:{nonce}"))
            .await?;
        lock(&self.inner.trx_transfers).push(TrxTransfer {
            from: from.to_string(),
            to: to.to_string(),
            amount_sun,
        });
        Ok(tx_id)
    }

    async fn contract(&self, address: &str) -> ProviderResult<Box<dyn Trc20Contract>> {
        self.inner.prompts.call();
        if let Some(deployed) = lock(&self.inner.deployed).as_ref()
            && !deployed.iter().any(|c| c == address)
        {
            return Err(ProviderFault::other(format!(
                "contract validate error : No contract or not a valid smart contract: {address}"
            )));
        }
        Ok(Box::new(SimulatedTrc20 {
            wallet: self.clone(),
            address: address.to_string(),
        }))
    }
}

struct SimulatedTrc20 {
    wallet: SimulatedTronWallet,
    address: String,
}

#[async_trait]
impl Trc20Contract for SimulatedTrc20 {
    async fn transfer(
        &self,
        to: &str,
        amount: U256,
        options: TronCallOptions,
    ) -> ProviderResult<String> {
        self.wallet.inner.prompts.call();
        let nonce = lock(&self.wallet.inner.contract_calls).len();
        let tx_id = self
            .wallet
            .sign(format!("trc20:{}:{to}:{amount}:{nonce}", self.address))
            .await?;
        lock(&self.wallet.inner.contract_calls).push(Trc20Call {
            contract: self.address.clone(),
            to: to.to_string(),
            amount,
            options,
        });
        Ok(tx_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_evm_switch_to_unknown_chain() {
        let wallet = SimulatedEvmWallet::new("0xabc", "0x1");
        let fault = wallet.switch_chain("0x89").await.unwrap_err();
        assert_eq!(fault.code, Some(UNRECOGNIZED_CHAIN_CODE));
        assert_eq!(wallet.switch_requests(), vec!["0x89".to_string()]);
    }

    #[tokio::test]
    async fn test_evm_known_chains_match_in_any_notation() {
        let wallet = SimulatedEvmWallet::new("0xabc", "0x1").with_known_chains(["0x1", "56"]);
        wallet.switch_chain("0x38").await.unwrap();
        assert_eq!(wallet.chain_id().await.unwrap(), "0x38");
    }

    #[tokio::test]
    async fn test_evm_tx_hashes_are_unique() {
        let wallet = SimulatedEvmWallet::new("0xabc", "0x1");
        let request = EvmTransactionRequest {
            from: alloy_primitives::Address::ZERO,
            to: alloy_primitives::Address::ZERO,
            value: U256::from(1u8),
            data: None,
        };
        let first = wallet.send_transaction(request.clone()).await.unwrap();
        let second = wallet.send_transaction(request).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(first.len(), 66);
        assert_eq!(wallet.sent_transactions().len(), 2);
    }

    #[tokio::test]
    async fn test_tron_rejection_message() {
        let wallet = SimulatedTronWallet::new("TEkxiTehnzSmSe2XqrBj4w32RUN966rdz8")
            .with_signing(PromptBehavior::Reject);
        let fault = wallet
            .send_trx("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t", U256::from(1u8), "T")
            .await
            .unwrap_err();
        assert!(fault.is_user_rejection());
        assert!(wallet.trx_transfers().is_empty());
    }

    #[tokio::test]
    async fn test_tron_undeployed_contract() {
        let wallet = SimulatedTronWallet::new("TEkxiTehnzSmSe2XqrBj4w32RUN966rdz8")
            .with_deployed_contracts(["TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"]);
        assert!(wallet.contract("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").await.is_ok());
        assert!(wallet.contract("TEkxiTehnzSmSe2XqrBj4w32RUN966rdz8").await.is_err());
    }
}
