//! Domain types, invariants and the ports the application layer talks through.

pub mod address;
pub mod connection;
pub mod payout;
pub mod ports;
pub mod units;
