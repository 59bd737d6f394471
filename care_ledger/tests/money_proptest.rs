/// Property-based tests for the money math using proptest
///
/// These tests verify the fee-split invariants across a wide range of
/// randomly generated billing inputs.
use care_ledger::money::{payment_breakdown, round_to_cents, PLATFORM_FEE_RATE};
use proptest::prelude::*;
use rust_decimal::Decimal;

// Strategy to generate billed hours: 0.25..=24.00 in quarter-hour steps
fn hours_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=96).prop_map(|quarters| Decimal::new(quarters * 25, 2))
}

// Strategy to generate an hourly rate: 0.01..=500.00 EUR in cent steps
fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=50_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #[test]
    fn fee_and_net_always_reassemble_the_amount(
        hours in hours_strategy(),
        rate in rate_strategy(),
    ) {
        let split = payment_breakdown(hours, rate);
        prop_assert_eq!(split.net_amount + split.platform_fee, split.amount);
    }

    #[test]
    fn amount_is_the_rounded_product(hours in hours_strategy(), rate in rate_strategy()) {
        let split = payment_breakdown(hours, rate);
        prop_assert_eq!(split.amount, round_to_cents(hours * rate));
    }

    #[test]
    fn fee_is_ten_percent_of_the_rounded_amount(
        hours in hours_strategy(),
        rate in rate_strategy(),
    ) {
        let split = payment_breakdown(hours, rate);
        prop_assert_eq!(split.platform_fee, round_to_cents(split.amount * PLATFORM_FEE_RATE));
    }

    #[test]
    fn all_parts_have_at_most_two_decimals(hours in hours_strategy(), rate in rate_strategy()) {
        let split = payment_breakdown(hours, rate);
        for value in [split.amount, split.platform_fee, split.net_amount] {
            prop_assert_eq!(value, round_to_cents(value));
        }
    }

    #[test]
    fn breakdown_is_pure(hours in hours_strategy(), rate in rate_strategy()) {
        // Same inputs, same split, every time.
        let first = payment_breakdown(hours, rate);
        let second = payment_breakdown(hours, rate);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn fee_never_exceeds_the_amount(hours in hours_strategy(), rate in rate_strategy()) {
        let split = payment_breakdown(hours, rate);
        prop_assert!(split.platform_fee <= split.amount);
        prop_assert!(split.net_amount >= Decimal::ZERO);
    }
}
