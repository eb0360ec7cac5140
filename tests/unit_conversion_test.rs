use alloy_primitives::U256;
use payout_dispatcher::domain::units::{from_base_units, to_base_units};
use rand::Rng;

#[test]
fn test_random_amounts_survive_conversion() {
    let mut rng = rand::thread_rng();

    for _ in 0..1_000 {
        let decimals: u8 = rng.gen_range(0..=18);
        let units = U256::from(rng.gen_range(1u128..=u128::MAX / 2));

        let amount = from_base_units(units, decimals);
        let back = to_base_units(&amount, decimals).unwrap();

        assert_eq!(back, units.to_string(), "{amount} at {decimals} decimals");
    }
}

#[test]
fn test_extra_fraction_digits_truncate() {
    let mut rng = rand::thread_rng();

    for _ in 0..200 {
        let decimals: u8 = rng.gen_range(0..=6);
        let whole: u64 = rng.gen_range(0..1_000_000);
        let amount = format!("{whole}.9999999");

        let expected = U256::from(whole) * U256::from(10u64).pow(U256::from(decimals))
            + if decimals == 0 {
                U256::ZERO
            } else {
                U256::from(10u64).pow(U256::from(decimals)) - U256::from(1u64)
            };
        assert_eq!(to_base_units(&amount, decimals).unwrap(), expected.to_string());
    }
}

#[test]
fn test_stablecoin_examples() {
    assert_eq!(to_base_units("25", 6).unwrap(), "25000000");
    assert_eq!(to_base_units("0.1", 6).unwrap(), "100000");
    assert_eq!(to_base_units("1.5", 18).unwrap(), "1500000000000000000");
    assert_eq!(from_base_units(U256::from(100_000u64), 6), "0.1");
}
