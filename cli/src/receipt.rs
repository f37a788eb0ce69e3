//! Text renderings of a breakdown: the share message and the printable receipt.

use crate::currency::format_idr;
use crate::split::{Balance, Breakdown, SplitMode};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const TITLE: &str = "Patungan";
pub const RECEIPT_WIDTH: usize = 40;

/// The message handed to the share facility (or copied to the clipboard).
pub fn share_text(breakdown: &Breakdown) -> String {
    let lines: Vec<String> = breakdown
        .splits
        .iter()
        .map(|s| format!("{}: {}", s.name, format_idr(s.amount)))
        .collect();

    format!(
        "{} - Split Bill\n\nTotal: {}\n\n{}",
        TITLE,
        format_idr(breakdown.total),
        lines.join("\n")
    )
}

/// "Rp 10.000 left", "Rp 5.000 over" or "Rp 0".
pub fn remaining_label(balance: Balance) -> String {
    match balance {
        Balance::Settled => format_idr(rust_decimal::Decimal::ZERO),
        Balance::Left(amount) => format!("{} left", format_idr(amount)),
        Balance::Over(amount) => format!("{} over", format_idr(amount)),
    }
}

/// Plain-text receipt of the breakdown view, sized for a narrow printer.
pub fn printable<Tz>(breakdown: &Breakdown, printed_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let rule = "-".repeat(RECEIPT_WIDTH);
    let mut out = Vec::new();

    out.push(format!("{} - Split Bill", TITLE));
    out.push(printed_at.format("%d/%m/%Y %H:%M").to_string());
    out.push(String::new());
    out.push(columns("Total Bayar", &format_idr(breakdown.total), RECEIPT_WIDTH));
    out.push(rule.clone());

    if breakdown.is_empty() {
        out.push("Nothing to split yet.".to_string());
    } else {
        for split in &breakdown.splits {
            out.push(columns(&split.name, &format_idr(split.amount), RECEIPT_WIDTH));
        }
        out.push(rule);
        out.push(columns(
            "Setiap Orang Bayar",
            &format_idr(breakdown.average),
            RECEIPT_WIDTH,
        ));
        match breakdown.mode {
            SplitMode::Equal => out.push("(Equal split)".to_string()),
            SplitMode::Manual => out.push(columns(
                "Remaining",
                &remaining_label(breakdown.balance()),
                RECEIPT_WIDTH,
            )),
        }
    }

    out.push(String::new());
    out.join("\n")
}

/// Left text and right text on one line of `width` columns. The left side is
/// cut short when both do not fit.
pub fn columns(left: &str, right: &str, width: usize) -> String {
    let right_width = right.width();
    let room = width.saturating_sub(right_width + 1);
    let left = truncate_to_width(left, room);
    let gap = width.saturating_sub(left.width() + right_width).max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

/// Cut `text` to at most `max` terminal columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}
