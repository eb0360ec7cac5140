use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

mod common;

#[test]
fn test_unknown_network_fails_payout() {
    let file = NamedTempFile::new().unwrap();
    common::write_batch(
        file.path(),
        &[[
            common::EVM_RECIPIENT,
            "10",
            "EVM",
            "ERC20",
            common::USDT_ERC20,
            "",
            "0x38",
        ]],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("payout-dispatcher"));
    cmd.arg(file.path());

    // The simulated wallet only knows 0x1, so the switch to BSC fails.
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Network mismatch"))
        .stdout(predicate::str::contains(
            "0xDE709F2102306220921060314715629080E2FB77,10,EVM,ERC20,,FAILED",
        ));
}

#[test]
fn test_known_network_is_switched_to() {
    let file = NamedTempFile::new().unwrap();
    common::write_batch(
        file.path(),
        &[[
            common::EVM_RECIPIENT,
            "10",
            "EVM",
            "ERC20",
            common::USDT_ERC20,
            "",
            "56",
        ]],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("payout-dispatcher"));
    cmd.arg(file.path()).arg("--evm-known-network").arg("0x38");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",SUBMITTED"));
}

#[test]
fn test_known_network_given_in_decimal() {
    let file = NamedTempFile::new().unwrap();
    common::write_batch(
        file.path(),
        &[[
            common::EVM_RECIPIENT,
            "10",
            "EVM",
            "ERC20",
            common::USDT_ERC20,
            "",
            "0x38",
        ]],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("payout-dispatcher"));
    cmd.arg(file.path()).arg("--evm-known-network").arg("56");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",SUBMITTED"));
}

#[test]
fn test_config_file_default_network() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, r#"{{ "default_evm_network": "0x89" }}"#).unwrap();

    let batch = NamedTempFile::new().unwrap();
    common::write_batch(
        batch.path(),
        &[
            [common::EVM_RECIPIENT, "1", "EVM", "NATIVE", "", "", ""],
            [common::TRON_RECIPIENT, "1", "TRON", "NATIVE", "", "", ""],
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("payout-dispatcher"));
    cmd.arg(batch.path()).arg("--config").arg(config.path());

    // Polygon is unknown to the wallet; TRON payouts are unaffected.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "0xDE709F2102306220921060314715629080E2FB77,1,EVM,NATIVE,,FAILED",
        ))
        .stdout(predicate::str::contains("TJRabPrwbZy45sbavfcjinPJC18kjpRTv8,1,TRON,NATIVE,"))
        .stdout(predicate::str::contains(",SUBMITTED").count(1));
}

#[test]
fn test_invalid_config_file() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, r#"{{ "max_retries": 3 }}"#).unwrap();

    let mut cmd = Command::new(cargo_bin!("payout-dispatcher"));
    cmd.arg("tests/fixtures/payouts.csv")
        .arg("--config")
        .arg(config.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
