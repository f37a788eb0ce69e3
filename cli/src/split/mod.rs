//! Split Calculator
//!
//! The bill state and the breakdown derived from it:
//!
//! - `state`: `BillState`, `Participant` and the mutation operations
//! - `breakdown`: `Breakdown`, the pure `derive_breakdown` function and
//!   the remaining-amount classification
//!
//! Every mutation leaves the state consistent (participant count is always
//! the length of the participant list, bounded to 1..=20). The breakdown is
//! never stored; callers derive it again after each change.

mod breakdown;
mod state;

pub use breakdown::{derive_breakdown, parse_amount, Balance, Breakdown, Split};
pub use state::{
    BillState, Participant, ParticipantId, SplitMode, DEFAULT_PARTICIPANTS, MAX_PARTICIPANTS,
    MIN_PARTICIPANTS,
};
