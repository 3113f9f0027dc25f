//! Human-readable number formatting for summary text and tables.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format with `dp` decimal places and comma thousands separators,
/// e.g. `-1234.5` at 2 dp becomes `-1,234.50`.
pub fn thousands(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);
    let text = format!("{:.*}", dp as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Currency amount at 2 dp: `₹-1,000.00`.
pub fn money(symbol: &str, value: Decimal) -> String {
    format!("{symbol}{}", thousands(value, 2))
}
