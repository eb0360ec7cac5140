use crate::error::{PayoutError, Result};
use alloy_primitives::U256;

/// Upper bound for token decimals accepted anywhere in the crate.
pub const MAX_DECIMALS: u8 = 18;

/// A non-negative decimal amount split into its digit strings.
///
/// Parsing never goes through floating point: the digits are kept verbatim
/// and only combined into an integer once the token's decimals are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalAmount {
    whole: String,
    fraction: String,
}

impl DecimalAmount {
    /// Parses a plain decimal string such as `"25"`, `"0.1"` or `".5"`.
    ///
    /// Signs, exponents, separators other than a single `.` and empty input
    /// are rejected with `InvalidAmount`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PayoutError::InvalidAmount("amount is empty".to_string()));
        }
        if trimmed.starts_with('-') {
            return Err(PayoutError::InvalidAmount(format!(
                "amount must not be negative: {trimmed}"
            )));
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(PayoutError::InvalidAmount(format!(
                "not a decimal number: {trimmed}"
            )));
        }

        Ok(Self {
            whole: whole.to_string(),
            fraction: fraction.to_string(),
        })
    }

    pub fn is_zero(&self) -> bool {
        self.whole.bytes().chain(self.fraction.bytes()).all(|b| b == b'0')
    }

    /// Scales the amount to `decimals` places, truncating excess fractional
    /// digits.
    pub fn to_base_units(&self, decimals: u8) -> Result<U256> {
        if decimals > MAX_DECIMALS {
            return Err(PayoutError::InvalidRequest(format!(
                "decimals must be between 0 and {MAX_DECIMALS}, got {decimals}"
            )));
        }
        let places = usize::from(decimals);

        let mut fraction: String = self.fraction.chars().take(places).collect();
        while fraction.len() < places {
            fraction.push('0');
        }

        let overflow = || PayoutError::InvalidAmount(format!("{self} does not fit in 256 bits"));
        let whole = parse_digits(&self.whole).ok_or_else(overflow)?;
        let fraction = parse_digits(&fraction).ok_or_else(overflow)?;
        let scale = U256::from(10u8).pow(U256::from(decimals));

        whole
            .checked_mul(scale)
            .and_then(|scaled| scaled.checked_add(fraction))
            .ok_or_else(overflow)
    }
}

impl std::fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = if self.whole.is_empty() { "0" } else { &self.whole };
        if self.fraction.is_empty() {
            write!(f, "{whole}")
        } else {
            write!(f, "{whole}.{}", self.fraction)
        }
    }
}

fn parse_digits(digits: &str) -> Option<U256> {
    if digits.is_empty() {
        return Some(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).ok()
}

/// Converts a decimal amount string into its integer base-unit string.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<String> {
    DecimalAmount::parse(amount)?
        .to_base_units(decimals)
        .map(|units| units.to_string())
}

/// Inverse of [`to_base_units`], rendering the canonical decimal form
/// (no trailing fractional zeros).
pub fn from_base_units(units: U256, decimals: u8) -> String {
    let digits = units.to_string();
    let places = usize::from(decimals);
    if places == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = places + 1);
    let (whole, fraction) = padded.split_at(padded.len() - places);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}
