use crate::domain::payout::ChainFamily;
use serde::Serialize;

/// Wallet session state for one chain family.
///
/// Only the gateway mutates it; everyone else works on cloned snapshots.
/// The account is never empty while `connected` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletConnection {
    chain_family: ChainFamily,
    connected: bool,
    account: String,
    network_id: Option<String>,
}

impl WalletConnection {
    pub fn disconnected(chain_family: ChainFamily) -> Self {
        Self {
            chain_family,
            connected: false,
            account: String::new(),
            network_id: None,
        }
    }

    pub fn chain_family(&self) -> ChainFamily {
        self.chain_family
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The active account, or `None` while disconnected.
    pub fn account(&self) -> Option<&str> {
        self.connected.then_some(self.account.as_str())
    }

    pub fn network_id(&self) -> Option<&str> {
        self.network_id.as_deref()
    }

    /// Marks the connection as established for `account`. An empty account
    /// resets the connection instead, so the invariant cannot be broken.
    pub(crate) fn set_account(&mut self, account: Option<String>) {
        match account.filter(|a| !a.is_empty()) {
            Some(account) => {
                self.connected = true;
                self.account = account;
            }
            None => self.reset(),
        }
    }

    pub(crate) fn set_network(&mut self, network_id: String) {
        if self.chain_family == ChainFamily::Evm {
            self.network_id = Some(network_id);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.connected = false;
        self.account.clear();
    }
}

/// Numeric value of a hex (`0x38`) or decimal (`56`) network id.
pub(crate) fn network_number(id: &str) -> Option<u64> {
    let id = id.trim();
    match id.strip_prefix("0x").or_else(|| id.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => id.parse().ok(),
    }
}

/// Network ids compare numerically when both parse (`0x38` == `56`),
/// otherwise as case-insensitive strings.
pub fn same_network(a: &str, b: &str) -> bool {
    match (network_number(a), network_number(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a.trim().eq_ignore_ascii_case(b.trim()),
    }
}
