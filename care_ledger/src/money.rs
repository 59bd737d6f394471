//! Two-decimal EUR arithmetic and the platform fee split.

use rust_decimal::{Decimal, RoundingStrategy};

/// Commission rate the platform keeps on payment amounts (10%).
pub const PLATFORM_FEE_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Round a monetary amount to whole cents, midpoints away from zero.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Gross/fee/net split of a service payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentBreakdown {
    pub amount: Decimal,
    pub platform_fee: Decimal,
    pub net_amount: Decimal,
}

/// Price a service payment from billed hours and the hourly rate.
///
/// The gross amount is `hours * hourly_rate` rounded to cents and the fee is
/// [`PLATFORM_FEE_RATE`] of the gross, rounded to cents. The net is the exact
/// remainder, so `net_amount + platform_fee == amount` always holds.
pub fn payment_breakdown(hours: Decimal, hourly_rate: Decimal) -> PaymentBreakdown {
    let amount = round_to_cents(hours * hourly_rate);
    let platform_fee = round_to_cents(amount * PLATFORM_FEE_RATE);
    let net_amount = amount - platform_fee;

    PaymentBreakdown {
        amount,
        platform_fee,
        net_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn three_hours_at_fifteen_splits_to_forty_five() {
        let split = payment_breakdown(dec!(3), dec!(15.00));
        assert_eq!(split.amount, dec!(45.00));
        assert_eq!(split.platform_fee, dec!(4.50));
        assert_eq!(split.net_amount, dec!(40.50));
    }

    #[test]
    fn midpoints_round_away_from_zero() {
        assert_eq!(round_to_cents(dec!(2.525)), dec!(2.53));
        assert_eq!(round_to_cents(dec!(0.005)), dec!(0.01));
        assert_eq!(round_to_cents(dec!(1.004)), dec!(1.00));
    }

    #[test]
    fn gross_rounds_before_the_fee_is_taken() {
        // 1.5 * 13.33 = 19.995, which rounds up to 20.00 before the split.
        let split = payment_breakdown(dec!(1.5), dec!(13.33));
        assert_eq!(split.amount, dec!(20.00));
        assert_eq!(split.platform_fee, dec!(2.00));
        assert_eq!(split.net_amount, dec!(18.00));
    }

    #[test]
    fn fee_and_net_reassemble_the_amount() {
        let split = payment_breakdown(dec!(2.5), dec!(20.20));
        assert_eq!(split.amount, dec!(50.50));
        assert_eq!(split.net_amount + split.platform_fee, split.amount);
    }
}
