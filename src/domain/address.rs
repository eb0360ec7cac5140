//! Per-chain-family address format checks.
//!
//! These are format checks only: EVM checksums and TRON base58check
//! checksums are not verified, and nothing is normalized beyond the
//! case-insensitivity of EVM hex digits.

use crate::domain::payout::ChainFamily;
use crate::error::{PayoutError, Result};

const EVM_HEX_LEN: usize = 40;
const TRON_BODY_LEN: usize = 33;
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Accepts `0x` followed by exactly 40 hex digits, in any case.
pub fn validate_evm_address(address: &str) -> Result<()> {
    let body = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| invalid(ChainFamily::Evm, address, "must start with 0x"))?;

    if body.len() != EVM_HEX_LEN {
        return Err(invalid(
            ChainFamily::Evm,
            address,
            "must have exactly 40 hex digits after 0x",
        ));
    }
    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid(ChainFamily::Evm, address, "contains non-hex characters"));
    }
    Ok(())
}

/// Accepts `T` followed by exactly 33 base58 characters.
pub fn validate_tron_address(address: &str) -> Result<()> {
    let body = address
        .strip_prefix('T')
        .ok_or_else(|| invalid(ChainFamily::Tron, address, "must start with T"))?;

    if body.chars().count() != TRON_BODY_LEN {
        return Err(invalid(
            ChainFamily::Tron,
            address,
            "must be 34 characters long",
        ));
    }
    if !body.chars().all(|c| BASE58_ALPHABET.contains(c)) {
        return Err(invalid(
            ChainFamily::Tron,
            address,
            "contains characters outside the base58 alphabet",
        ));
    }
    Ok(())
}

pub fn validate_address(family: ChainFamily, address: &str) -> Result<()> {
    match family {
        ChainFamily::Evm => validate_evm_address(address),
        ChainFamily::Tron => validate_tron_address(address),
    }
}

fn invalid(family: ChainFamily, address: &str, reason: &str) -> PayoutError {
    PayoutError::InvalidAddress(format!("{family} address {address:?} {reason}"))
}
