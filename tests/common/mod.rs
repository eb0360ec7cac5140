#![allow(dead_code)]

use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const EVM_ACCOUNT: &str = "0x52908400098527886E0F7030069857D2E4169EE7";
pub const EVM_RECIPIENT: &str = "0xDE709F2102306220921060314715629080E2FB77";
pub const USDT_ERC20: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
pub const TRON_ACCOUNT: &str = "TEkxiTehnzSmSe2XqrBj4w32RUN966rdz8";
pub const TRON_RECIPIENT: &str = "TJRabPrwbZy45sbavfcjinPJC18kjpRTv8";
pub const USDT_TRC20: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";

pub const HEADER: [&str; 7] = [
    "recipient",
    "amount",
    "chain",
    "token",
    "token_contract",
    "decimals",
    "network",
];

/// Writes a payout batch with the given rows under the standard header.
pub fn write_batch(path: &Path, rows: &[[&str; 7]]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// `rows` USDT payouts on TRON, one unit each.
pub fn generate_trc20_batch(path: &Path, rows: usize) -> Result<(), Error> {
    let batch: Vec<[&str; 7]> = (0..rows)
        .map(|_| [TRON_RECIPIENT, "1", "TRON", "TRC20", USDT_TRC20, "", ""])
        .collect();
    write_batch(path, &batch)
}
