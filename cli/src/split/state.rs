use super::breakdown::{derive_breakdown, Breakdown};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const MIN_PARTICIPANTS: usize = 1;
pub const MAX_PARTICIPANTS: usize = 20;
pub const DEFAULT_PARTICIPANTS: usize = 2;

/// Stable identity of a participant within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ParticipantId(u64);

impl ParticipantId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    #[default]
    Equal,
    Manual,
}

impl SplitMode {
    pub fn from_manual(is_manual: bool) -> Self {
        if is_manual {
            SplitMode::Manual
        } else {
            SplitMode::Equal
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SplitMode::Equal => "Split equally",
            SplitMode::Manual => "Enter custom amounts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    id: ParticipantId,
    name: String,
    /// Raw text as typed; parsed only when the breakdown is derived.
    amount: String,
}

impl Participant {
    fn new(id: ParticipantId, index: usize) -> Self {
        Self {
            id,
            name: Self::default_label(index),
            amount: String::new(),
        }
    }

    /// Ordinal label for the participant at `index` (0-based): "Person 1", "Person 2", ...
    pub fn default_label(index: usize) -> String {
        format!("Person {}", index + 1)
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }
}

/// Everything the user has entered for one bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillState {
    bill_amount: String,
    mode: SplitMode,
    participants: Vec<Participant>,
    show_names: bool,
    next_id: u64,
}

impl Default for BillState {
    fn default() -> Self {
        Self::new()
    }
}

impl BillState {
    pub fn new() -> Self {
        let mut state = Self {
            bill_amount: String::new(),
            mode: SplitMode::Equal,
            participants: Vec::with_capacity(MAX_PARTICIPANTS),
            show_names: false,
            next_id: 1,
        };
        state.grow_to(DEFAULT_PARTICIPANTS);
        state
    }

    // Accessors

    pub fn bill_amount(&self) -> &str {
        &self.bill_amount
    }

    /// Bill total; an empty amount counts as zero.
    pub fn total(&self) -> Decimal {
        Decimal::from_str(&self.bill_amount).unwrap_or(Decimal::ZERO)
    }

    pub fn mode(&self) -> SplitMode {
        self.mode
    }

    pub fn is_manual(&self) -> bool {
        self.mode == SplitMode::Manual
    }

    pub fn show_names(&self) -> bool {
        self.show_names
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    // Mutations

    /// Set the bill from user text. Grouping characters (`,` and `.`) are
    /// stripped first; anything left that is not a plain run of digits is
    /// rejected and the previous amount kept.
    pub fn set_bill_amount(&mut self, raw: &str) -> bool {
        let digits: String = raw.chars().filter(|c| !matches!(c, ',' | '.')).collect();

        let acceptable = digits.is_empty()
            || (digits.bytes().all(|b| b.is_ascii_digit()) && Decimal::from_str(&digits).is_ok());
        if !acceptable {
            tracing::debug!(raw, "rejected bill amount");
            return false;
        }

        self.bill_amount = digits;
        true
    }

    /// Resize the participant list. Counts outside 1..=20 are ignored.
    pub fn set_participant_count(&mut self, n: usize) -> bool {
        if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&n) {
            tracing::debug!(requested = n, "participant count out of range");
            return false;
        }

        if n > self.participants.len() {
            self.grow_to(n);
        } else {
            self.participants.truncate(n);
        }
        true
    }

    pub fn set_participant_name(&mut self, id: ParticipantId, name: impl Into<String>) -> bool {
        match self.participants.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_participant_amount(&mut self, id: ParticipantId, text: impl Into<String>) -> bool {
        match self.participants.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.amount = text.into();
                true
            }
            None => false,
        }
    }

    /// Switch between equal and manual split. Manual amounts are kept as-is
    /// so switching back restores them.
    pub fn toggle_split_mode(&mut self, is_manual: bool) {
        self.mode = SplitMode::from_manual(is_manual);
    }

    pub fn set_show_names(&mut self, show: bool) {
        self.show_names = show;
    }

    pub fn compute_breakdown(&self) -> Breakdown {
        derive_breakdown(self)
    }

    fn grow_to(&mut self, n: usize) {
        for index in self.participants.len()..n {
            let id = ParticipantId(self.next_id);
            self.next_id += 1;
            self.participants.push(Participant::new(id, index));
        }
    }
}
