//! Fixed point arithmetic over [`Decimal`] with the chain's 18 fractional
//! digits.
//!
//! Every multiplication or division is rescaled right away, either rounded
//! (midpoint to even) or truncated toward zero, so results are identical on
//! every machine that runs them.

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

pub const PRECISION: u32 = 18;

pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRECISION, RoundingStrategy::MidpointNearestEven)
}

pub fn truncate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRECISION, RoundingStrategy::ToZero)
}

pub fn from_int(value: u64) -> Decimal {
    Decimal::from(value)
}

/// `value * int`, rounded. `None` on overflow.
pub fn mul_int(value: Decimal, int: u64) -> Option<Decimal> {
    value.checked_mul(Decimal::from(int)).map(round)
}

/// `lhs * rhs`, rounded. `None` on overflow.
pub fn mul(lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
    lhs.checked_mul(rhs).map(round)
}

/// `lhs / rhs`, rounded. `None` on overflow or a zero divisor.
pub fn quo(lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
    lhs.checked_div(rhs).map(round)
}

/// `lhs / rhs`, truncated. `None` on overflow or a zero divisor.
pub fn quo_truncate(lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
    lhs.checked_div(rhs).map(truncate)
}

/// `value * int / divisor`, rounded. `None` on overflow or a zero divisor.
pub fn mul_int_quo(value: Decimal, int: u64, divisor: Decimal) -> Option<Decimal> {
    mul_int_div(value, int, divisor).map(round)
}

/// `value * int / divisor`, truncated. `None` on overflow or a zero divisor.
pub fn mul_int_quo_truncate(value: Decimal, int: u64, divisor: Decimal) -> Option<Decimal> {
    mul_int_div(value, int, divisor).map(truncate)
}

// Multiplies first while the product fits in 96 bits, so results match the
// exact product whenever it is representable. Past that it divides first,
// preferring whichever factor divides without remainder, and otherwise keeps
// the 28 significant digits of `value / divisor`.
fn mul_int_div(value: Decimal, int: u64, divisor: Decimal) -> Option<Decimal> {
    if divisor.is_zero() {
        return None;
    }
    let int = Decimal::from(int);
    if let Some(product) = value.checked_mul(int) {
        return product.checked_div(divisor);
    }
    if let Some(ratio) = exact_quotient(value, divisor) {
        return ratio.checked_mul(int);
    }
    if let Some(ratio) = exact_quotient(int, divisor) {
        return ratio.checked_mul(value);
    }
    value.checked_div(divisor)?.checked_mul(int)
}

fn exact_quotient(lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
    let quotient = lhs.checked_div(rhs)?;
    (quotient.checked_mul(rhs) == Some(lhs)).then_some(quotient)
}

/// Integer part of a non negative value. `None` if negative or too large.
pub fn truncate_int(value: Decimal) -> Option<u64> {
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    value.trunc().to_u64()
}

/// Text form with all 18 fractional digits, as shares are reported on chain.
pub fn format(value: Decimal) -> String {
    format!("{:.18}", value)
}
