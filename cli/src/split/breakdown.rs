use super::state::{BillState, Participant, ParticipantId, SplitMode};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// What one participant owes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Split {
    pub id: ParticipantId,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub mode: SplitMode,
    pub total: Decimal,
    pub splits: Vec<Split>,
    /// Total minus the manually assigned amounts. Always zero in equal mode.
    pub remaining: Decimal,
    pub valid: bool,
    /// Total divided by the participant count, shown as the per-person summary.
    pub average: Decimal,
}

/// Direction of the manual-split imbalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    Settled,
    Left(Decimal),
    Over(Decimal),
}

impl Breakdown {
    fn empty(mode: SplitMode, total: Decimal) -> Self {
        Self {
            mode,
            total,
            splits: Vec::new(),
            remaining: Decimal::ZERO,
            valid: false,
            average: Decimal::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    pub fn balance(&self) -> Balance {
        if self.remaining > Decimal::ZERO {
            Balance::Left(self.remaining)
        } else if self.remaining < Decimal::ZERO {
            Balance::Over(self.remaining.abs())
        } else {
            Balance::Settled
        }
    }
}

/// Manual amounts within one hundredth of the total count as settled.
fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Parse a manually entered amount. Anything that is not a non-negative
/// number counts as zero.
pub fn parse_amount(text: &str) -> Decimal {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
        .filter(|amount| !amount.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

fn display_name(participant: &Participant, index: usize) -> String {
    if participant.name().trim().is_empty() {
        Participant::default_label(index)
    } else {
        participant.name().to_string()
    }
}

/// Derive the breakdown for a state snapshot. Pure: the same state always
/// yields the same breakdown.
pub fn derive_breakdown(state: &BillState) -> Breakdown {
    let total = state.total();
    let count = state.participant_count();
    let mode = state.mode();

    if total <= Decimal::ZERO || count == 0 {
        return Breakdown::empty(mode, total);
    }

    let average = total / Decimal::from(count);

    match mode {
        SplitMode::Equal => Breakdown {
            mode,
            total,
            splits: state
                .participants()
                .iter()
                .enumerate()
                .map(|(i, p)| Split {
                    id: p.id(),
                    name: display_name(p, i),
                    amount: average,
                })
                .collect(),
            remaining: Decimal::ZERO,
            valid: true,
            average,
        },
        SplitMode::Manual => {
            let mut assigned = Decimal::ZERO;
            let splits: Vec<Split> = state
                .participants()
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let amount = parse_amount(p.amount());
                    assigned = assigned.saturating_add(amount);
                    Split {
                        id: p.id(),
                        name: display_name(p, i),
                        amount,
                    }
                })
                .collect();

            let remaining = total.saturating_sub(assigned);
            Breakdown {
                mode,
                total,
                splits,
                remaining,
                valid: remaining.abs() < tolerance(),
                average,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_state(total: &str, amounts: &[&str]) -> BillState {
        let mut state = BillState::new();
        state.set_bill_amount(total);
        state.set_participant_count(amounts.len());
        state.toggle_split_mode(true);
        let ids: Vec<_> = state.participants().iter().map(|p| p.id()).collect();
        for (id, amount) in ids.into_iter().zip(amounts) {
            state.set_participant_amount(id, *amount);
        }
        state
    }

    #[test]
    fn equal_split_divides_total_evenly() {
        let mut state = BillState::new();
        state.set_bill_amount("100000");
        state.set_participant_count(4);

        let breakdown = derive_breakdown(&state);
        assert_eq!(breakdown.splits.len(), 4);
        assert!(breakdown
            .splits
            .iter()
            .all(|s| s.amount == Decimal::from(25_000)));
        assert_eq!(breakdown.remaining, Decimal::ZERO);
        assert!(breakdown.valid);
        assert_eq!(breakdown.average, Decimal::from(25_000));
        assert_eq!(breakdown.balance(), Balance::Settled);
    }

    #[test]
    fn equal_split_ignores_stored_manual_amounts() {
        let mut state = manual_state("90000", &["10", "20", "30"]);
        state.toggle_split_mode(false);

        let breakdown = derive_breakdown(&state);
        assert!(breakdown
            .splits
            .iter()
            .all(|s| s.amount == Decimal::from(30_000)));
        assert!(breakdown.valid);
    }

    #[test]
    fn zero_or_empty_total_yields_empty_invalid_breakdown() {
        for total in ["", "0", "000"] {
            let mut state = BillState::new();
            state.set_bill_amount(total);
            let breakdown = derive_breakdown(&state);
            assert!(breakdown.is_empty());
            assert_eq!(breakdown.remaining, Decimal::ZERO);
            assert!(!breakdown.valid);
        }
    }

    #[test]
    fn manual_split_that_reconciles_is_valid() {
        let breakdown = derive_breakdown(&manual_state("100000", &["60000", "40000"]));
        assert_eq!(breakdown.remaining, Decimal::ZERO);
        assert!(breakdown.valid);
        assert_eq!(breakdown.splits[0].amount, Decimal::from(60_000));
        assert_eq!(breakdown.splits[1].amount, Decimal::from(40_000));
    }

    #[test]
    fn manual_split_short_of_total_reports_remaining() {
        let breakdown = derive_breakdown(&manual_state("100000", &["60000", "30000"]));
        assert_eq!(breakdown.remaining, Decimal::from(10_000));
        assert!(!breakdown.valid);
        assert_eq!(breakdown.balance(), Balance::Left(Decimal::from(10_000)));
    }

    #[test]
    fn manual_split_over_total_reports_overage() {
        let breakdown = derive_breakdown(&manual_state("100000", &["70000", "40000"]));
        assert_eq!(breakdown.remaining, Decimal::from(-10_000));
        assert_eq!(breakdown.balance(), Balance::Over(Decimal::from(10_000)));
        assert!(!breakdown.valid);
    }

    #[test]
    fn fractional_difference_within_tolerance_is_valid() {
        let breakdown = derive_breakdown(&manual_state("100", &["33.333", "33.333", "33.333"]));
        assert_eq!(breakdown.remaining, Decimal::new(1, 3));
        assert!(breakdown.valid);

        let breakdown = derive_breakdown(&manual_state("100", &["50", "49.99"]));
        assert!(!breakdown.valid);
    }

    #[test]
    fn unparseable_manual_amounts_count_as_zero() {
        let breakdown = derive_breakdown(&manual_state("50000", &["abc", "", "-20", "20000"]));
        let amounts: Vec<_> = breakdown.splits.iter().map(|s| s.amount).collect();
        assert_eq!(
            amounts,
            vec![
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::from(20_000)
            ]
        );
        assert_eq!(breakdown.remaining, Decimal::from(30_000));
    }

    #[test]
    fn parse_amount_handles_decimals_and_exponents() {
        assert_eq!(parse_amount(" 12.50 "), Decimal::new(1250, 2));
        assert_eq!(parse_amount("1e3"), Decimal::from(1000));
        assert_eq!(parse_amount("1.2.3"), Decimal::ZERO);
    }

    #[test]
    fn derivation_is_deterministic() {
        let state = manual_state("75000", &["25000", "x", "30000"]);
        assert_eq!(derive_breakdown(&state), derive_breakdown(&state));
        assert_eq!(state.compute_breakdown(), derive_breakdown(&state));
    }

    #[test]
    fn blank_names_fall_back_to_ordinal_label() {
        let mut state = BillState::new();
        state.set_bill_amount("10000");
        let id = state.participants()[1].id();
        state.set_participant_name(id, "   ");

        let breakdown = derive_breakdown(&state);
        assert_eq!(breakdown.splits[1].name, "Person 2");
    }
}
