//! Rupiah formatting.
//!
//! All amounts are shown as whole rupiah with `.` as the thousands
//! separator, matching the `id-ID` locale: `Rp 1.250.000`.

use rust_decimal::{Decimal, RoundingStrategy};

pub const SYMBOL: &str = "Rp";
pub const GROUP_SEPARATOR: char = '.';

pub fn format_idr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = group_digits(&rounded.abs().trunc().to_string());
    if rounded.is_zero() || rounded.is_sign_positive() {
        format!("{} {}", SYMBOL, digits)
    } else {
        format!("-{} {}", SYMBOL, digits)
    }
}

/// Insert thousands separators into a run of ASCII digits. Leading zeros are
/// dropped so "007" reads "7"; an all-zero run reads "0".
pub fn group_digits(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return if digits.is_empty() {
            String::new()
        } else {
            "0".to_string()
        };
    }

    let len = trimmed.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in trimmed.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(c);
    }
    out
}
