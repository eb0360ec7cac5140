//! Application layer orchestrating payouts.
//!
//! The `WalletProviderGateway` owns wallet sessions, the chain adapters frame
//! and submit transfers, and the `PayoutDispatcher` ties them together behind
//! one `dispatch` call per payout.

pub mod adapter;
pub mod dispatcher;
pub mod gateway;
