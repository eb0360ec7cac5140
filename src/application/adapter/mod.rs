//! `ChainAdapter` implementations, one per chain family.

pub mod evm;
pub mod tron;

pub use evm::EvmAdapter;
pub use tron::TronAdapter;
