use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/payouts.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "recipient,amount,chain_family,token_kind,tx_ref,status",
        ))
        .stdout(predicate::str::contains(
            "0xDE709F2102306220921060314715629080E2FB77,25,EVM,ERC20,0x",
        ))
        .stdout(predicate::str::contains("TJRabPrwbZy45sbavfcjinPJC18kjpRTv8,0.1,TRON,TRC20,"))
        .stdout(predicate::str::contains("TJRabPrwbZy45sbavfcjinPJC18kjpRTv8,12,TRON,NATIVE,"))
        .stdout(predicate::str::contains("FAILED").not())
        .stdout(predicate::str::contains(",SUBMITTED").count(3));

    Ok(())
}
