use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::NamedTempFile;

mod common;

#[test]
fn test_malformed_csv_handling() {
    let file = NamedTempFile::new().unwrap();
    let mut wtr = csv::Writer::from_path(file.path()).unwrap();
    wtr.write_record(common::HEADER).unwrap();

    // Valid payout
    wtr.write_record([common::TRON_RECIPIENT, "1", "TRON", "NATIVE", "", "", ""])
        .unwrap();
    // Unknown chain
    wtr.write_record([common::TRON_RECIPIENT, "1", "SOLANA", "NATIVE", "", "", ""])
        .unwrap();
    // Decimals that do not fit a u8
    wtr.write_record([common::TRON_RECIPIENT, "1", "TRON", "NATIVE", "", "300", ""])
        .unwrap();
    // Valid payout again
    wtr.write_record([common::TRON_RECIPIENT, "2", "TRON", "NATIVE", "", "", ""])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("payout-dispatcher"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading payout"))
        .stdout(predicate::str::contains(",SUBMITTED").count(2));
}

#[test]
fn test_invalid_payouts_are_recorded_as_failed() {
    let file = NamedTempFile::new().unwrap();
    common::write_batch(
        file.path(),
        &[
            // Zero amount
            [common::TRON_RECIPIENT, "0", "TRON", "NATIVE", "", "", ""],
            // 41 hex digits
            [
                "0xDE709F2102306220921060314715629080E2FB771",
                "1",
                "EVM",
                "NATIVE",
                "",
                "",
                "",
            ],
            // TRC-20 without a contract
            [common::TRON_RECIPIENT, "1", "TRON", "TRC20", "", "", ""],
            // Decimals out of range
            [common::TRON_RECIPIENT, "1", "TRON", "NATIVE", "", "19", ""],
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("payout-dispatcher"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Invalid amount"))
        .stderr(predicate::str::contains("Invalid address"))
        .stderr(predicate::str::contains("Invalid request"))
        .stdout(predicate::str::contains(",FAILED").count(4));
}

#[test]
fn test_large_batch() {
    let file = NamedTempFile::new().unwrap();
    common::generate_trc20_batch(file.path(), 200).unwrap();

    let mut cmd = Command::new(cargo_bin!("payout-dispatcher"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",SUBMITTED").count(200));
}

#[test]
fn test_excess_precision_is_recorded_as_sent() {
    let file = NamedTempFile::new().unwrap();
    common::write_batch(
        file.path(),
        &[[
            common::TRON_RECIPIENT,
            "1.1234567",
            "TRON",
            "TRC20",
            common::USDT_TRC20,
            "",
            "",
        ]],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("payout-dispatcher"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "TJRabPrwbZy45sbavfcjinPJC18kjpRTv8,1.123456,TRON,TRC20,",
        ))
        .stdout(predicate::str::contains("1.1234567").not());
}
