//! Overflow-checked decimal arithmetic for the calculations.
//!
//! An operation that overflows yields zero and marks the tracker. The
//! calculation carries on and the caller reports one warning at the end.

use std::cell::Cell;

use rust_decimal::Decimal;

/// Checked `+ − × ÷` that fall back to zero on overflow.
#[derive(Debug, Default)]
pub struct Arith {
    overflowed: Cell<bool>,
}

impl Arith {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value of a checked operation, or zero when it overflowed.
    pub fn or_zero(&self, value: Option<Decimal>) -> Decimal {
        value.unwrap_or_else(|| {
            self.overflowed.set(true);
            Decimal::ZERO
        })
    }

    pub fn add(&self, a: Decimal, b: Decimal) -> Decimal {
        self.or_zero(a.checked_add(b))
    }

    pub fn sub(&self, a: Decimal, b: Decimal) -> Decimal {
        self.or_zero(a.checked_sub(b))
    }

    pub fn mul(&self, a: Decimal, b: Decimal) -> Decimal {
        self.or_zero(a.checked_mul(b))
    }

    /// Zero when `b` is zero; that case is not an overflow.
    pub fn div(&self, a: Decimal, b: Decimal) -> Decimal {
        if b.is_zero() {
            return Decimal::ZERO;
        }
        self.or_zero(a.checked_div(b))
    }

    pub fn sum(&self, values: impl IntoIterator<Item = Decimal>) -> Decimal {
        values
            .into_iter()
            .fold(Decimal::ZERO, |acc, v| self.add(acc, v))
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed.get()
    }

    /// Push one warning for `context` when any operation overflowed.
    pub fn warn_into(&self, warnings: &mut Vec<String>, context: &str) {
        if self.overflowed() {
            warnings.push(format!(
                "{context}: arithmetic overflowed; affected amounts set to zero"
            ));
        }
    }
}
