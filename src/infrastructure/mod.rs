//! Adapters behind the domain ports: the in-memory payout ledger and the
//! simulated wallets.

pub mod in_memory;
pub mod simulated;
