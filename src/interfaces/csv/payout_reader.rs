use crate::domain::payout::{ChainFamily, PayoutRequest, TokenKind};
use crate::error::{PayoutError, Result};
use serde::Deserialize;
use std::io::Read;

/// One line of a payout batch file.
///
/// Columns: `recipient, amount, chain, token, token_contract, decimals, network`.
/// The last three may be empty or missing.
#[derive(Debug, Deserialize)]
struct PayoutRow {
    recipient: String,
    amount: String,
    chain: ChainFamily,
    token: TokenKind,
    token_contract: Option<String>,
    decimals: Option<u8>,
    network: Option<String>,
}

impl From<PayoutRow> for PayoutRequest {
    fn from(row: PayoutRow) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        Self {
            recipient: row.recipient,
            amount: row.amount,
            chain_family: row.chain,
            token_kind: row.token,
            token_contract: non_empty(row.token_contract),
            decimals: row
                .decimals
                .unwrap_or_else(|| row.token.default_decimals(row.chain)),
            required_network_id: non_empty(row.network),
        }
    }
}

/// Reads payout requests from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// yielding one `Result<PayoutRequest>` per row.
pub struct PayoutReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PayoutReader<R> {
    /// Creates a new `PayoutReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes payout rows.
    pub fn payouts(self) -> impl Iterator<Item = Result<PayoutRequest>> {
        self.reader
            .into_deserialize::<PayoutRow>()
            .map(|result| result.map(PayoutRequest::from).map_err(PayoutError::from))
    }
}
