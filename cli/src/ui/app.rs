//! Application State and Logic
//!
//! This module defines the interactive session for the Patungan TUI. It manages:
//!
//! - The bill being split (`BillState`) and its cached `Breakdown`
//! - Field focus and keyboard editing of the bill, head count, names and amounts
//! - Share and print actions through the `Host` facilities
//! - Status notices shown in the status bar
//!
//! Every edit goes through `BillState` and is followed by a fresh
//! `derive_breakdown`, so the views always render a breakdown that matches
//! the inputs on screen. `run_app` is the main event loop.

use crate::host::{share_or_copy, Host};
use crate::receipt;
use crate::split::{derive_breakdown, BillState, Breakdown, Participant};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use rust_decimal::Decimal;
use std::io::Stdout;
use std::time::Duration;

pub type AppResult<T> = Result<T>;

/// An editable control on the screen, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Bill,
    People,
    ShowNames,
    Name(usize),
    SplitMode,
    Amount(usize),
}

impl Field {
    /// Fields that take free text; plain letters go to them instead of shortcuts.
    pub fn is_text(&self) -> bool {
        matches!(self, Field::Bill | Field::Name(_) | Field::Amount(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Info,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Error,
        }
    }
}

/// Host work bound to a key. It can block on an external command, so the
/// event loop draws its progress notice first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Share,
    Print,
}

impl HostAction {
    pub fn for_key(key: &KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press || !key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        match key.code {
            KeyCode::Char('s') => Some(HostAction::Share),
            KeyCode::Char('p') => Some(HostAction::Print),
            _ => None,
        }
    }

    pub fn progress(&self) -> Notice {
        match self {
            HostAction::Share => Notice::info("Sharing…"),
            HostAction::Print => Notice::info("Printing…"),
        }
    }
}

pub struct App<H> {
    pub host: H,
    pub bill: BillState,
    pub breakdown: Breakdown,
    pub focus: Field,
    pub running: bool,
    pub notice: Option<Notice>,
}

impl<H> App<H> {
    pub fn new(host: H, bill: BillState) -> Self {
        let breakdown = derive_breakdown(&bill);
        Self {
            host,
            bill,
            breakdown,
            focus: Field::Bill,
            running: true,
            notice: None,
        }
    }

    /// Focusable fields for the current state: name inputs only while names
    /// are shown, amount inputs only in manual mode once there is a bill.
    pub fn fields(&self) -> Vec<Field> {
        let count = self.bill.participant_count();
        let mut fields = vec![Field::Bill, Field::People, Field::ShowNames];
        if self.bill.show_names() {
            fields.extend((0..count).map(Field::Name));
        }
        fields.push(Field::SplitMode);
        if self.amounts_editable() {
            fields.extend((0..count).map(Field::Amount));
        }
        fields
    }

    pub fn amounts_editable(&self) -> bool {
        self.bill.is_manual() && self.bill.total() > Decimal::ZERO
    }

    fn recompute(&mut self) {
        self.breakdown = derive_breakdown(&self.bill);
        self.repair_focus();
    }

    /// Move focus somewhere sensible when its field went away
    /// (names hidden, head count shrunk, manual mode switched off).
    fn repair_focus(&mut self) {
        let fields = self.fields();
        if fields.contains(&self.focus) {
            return;
        }

        let count = self.bill.participant_count();
        self.focus = match self.focus {
            Field::Name(_) if self.bill.show_names() => Field::Name(count - 1),
            Field::Name(_) => Field::ShowNames,
            Field::Amount(_) if self.amounts_editable() => Field::Amount(count - 1),
            Field::Amount(_) => Field::SplitMode,
            _ => Field::Bill,
        };
    }

    pub fn select_next(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + 1) % fields.len()];
    }

    pub fn select_prev(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + fields.len() - 1) % fields.len()];
    }

    pub fn select_last(&mut self) {
        if let Some(last) = self.fields().last() {
            self.focus = *last;
        }
    }

    pub fn handle_char(&mut self, c: char) {
        match self.focus {
            Field::Bill => {
                let candidate = format!("{}{}", self.bill.bill_amount(), c);
                self.bill.set_bill_amount(&candidate);
            }
            Field::People => match c {
                '+' | '=' => self.adjust(1),
                '-' | '_' => self.adjust(-1),
                _ => {}
            },
            Field::ShowNames | Field::SplitMode => {
                if c == ' ' {
                    self.activate();
                }
            }
            Field::Name(index) => {
                if let Some(p) = self.bill.participants().get(index) {
                    // The default label behaves like a placeholder: typing replaces it.
                    let name = if p.name() == Participant::default_label(index) {
                        c.to_string()
                    } else {
                        format!("{}{}", p.name(), c)
                    };
                    let id = p.id();
                    self.bill.set_participant_name(id, name);
                }
            }
            Field::Amount(index) => {
                if !(c.is_ascii_digit() || c == '.') {
                    return;
                }
                if let Some(p) = self.bill.participants().get(index) {
                    let amount = format!("{}{}", p.amount(), c);
                    let id = p.id();
                    self.bill.set_participant_amount(id, amount);
                }
            }
        }
        self.recompute();
    }

    pub fn handle_backspace(&mut self) {
        match self.focus {
            Field::Bill => {
                let mut candidate = self.bill.bill_amount().to_string();
                candidate.pop();
                self.bill.set_bill_amount(&candidate);
            }
            Field::Name(index) => {
                if let Some(p) = self.bill.participants().get(index) {
                    let name = if p.name() == Participant::default_label(index) {
                        String::new()
                    } else {
                        let mut name = p.name().to_string();
                        name.pop();
                        name
                    };
                    let id = p.id();
                    self.bill.set_participant_name(id, name);
                }
            }
            Field::Amount(index) => {
                if let Some(p) = self.bill.participants().get(index) {
                    let mut amount = p.amount().to_string();
                    amount.pop();
                    let id = p.id();
                    self.bill.set_participant_amount(id, amount);
                }
            }
            _ => return,
        }
        self.recompute();
    }

    /// Left/Right: step the head count, or flip a toggle.
    pub fn adjust(&mut self, delta: isize) {
        match self.focus {
            Field::People => {
                if let Some(target) = self.bill.participant_count().checked_add_signed(delta) {
                    self.bill.set_participant_count(target);
                }
            }
            Field::ShowNames | Field::SplitMode => {
                self.activate();
                return;
            }
            _ => return,
        }
        self.recompute();
    }

    /// Space/Enter on a toggle.
    pub fn activate(&mut self) {
        match self.focus {
            Field::ShowNames => {
                let show = !self.bill.show_names();
                self.bill.set_show_names(show);
            }
            Field::SplitMode => {
                let manual = !self.bill.is_manual();
                self.bill.toggle_split_mode(manual);
            }
            _ => return,
        }
        self.recompute();
    }
}

impl<H: Host> App<H> {
    pub async fn share(&mut self) {
        let text = receipt::share_text(&self.breakdown);
        match share_or_copy(&mut self.host, receipt::TITLE, &text).await {
            Ok(report) => {
                self.notice = report.notice().map(|text| Notice::success(text));
            }
            Err(e) => {
                tracing::warn!(error = %e, "share failed");
                self.notice = Some(Notice::error(format!("Share failed: {}", e)));
            }
        }
    }

    pub async fn print(&mut self) {
        if self.breakdown.is_empty() {
            self.notice = Some(Notice::info("Enter a bill amount first"));
            return;
        }

        let document = receipt::printable(&self.breakdown, &chrono::Local::now());
        match self.host.print(&document).await {
            Ok(()) => {
                self.notice = Some(Notice::success("Sent to printer"));
            }
            Err(e) => {
                tracing::warn!(error = %e, "print failed");
                self.notice = Some(Notice::error(format!("Print failed: {}", e)));
            }
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match HostAction::for_key(&key) {
            Some(HostAction::Share) => return self.share().await,
            Some(HostAction::Print) => return self.print().await,
            None => {}
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
                self.running = false;
            }
            return;
        }

        self.notice = None;
        match key.code {
            KeyCode::Esc => {
                self.running = false;
            }
            // 'q' quits unless the focused field takes text
            KeyCode::Char('q') if !self.focus.is_text() => {
                self.running = false;
            }
            KeyCode::Tab | KeyCode::Down => self.select_next(),
            KeyCode::BackTab | KeyCode::Up => self.select_prev(),
            KeyCode::Home => self.focus = Field::Bill,
            KeyCode::End => self.select_last(),
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::Enter => {
                if self.focus.is_text() {
                    self.select_next();
                } else {
                    self.activate();
                }
            }
            KeyCode::Char(c) => self.handle_char(c),
            KeyCode::Backspace => self.handle_backspace(),
            _ => {}
        }
    }
}

pub async fn run_app<H: Host>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App<H>,
) -> AppResult<()> {
    loop {
        terminal.draw(|f| super::views::draw(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if let Some(action) = HostAction::for_key(&key) {
                    app.notice = Some(action.progress());
                    terminal.draw(|f| super::views::draw(f, &app))?;
                }
                app.handle_key(key).await;
            }
        }

        if !app.running {
            tracing::info!("session ended");
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostError, ShareOutcome};

    #[derive(Default)]
    struct RecordingHost {
        can_share: bool,
        share_broken: bool,
        clipboard_broken: bool,
        shared: Vec<String>,
        clipboard: Option<String>,
        printed: Vec<String>,
    }

    impl Host for RecordingHost {
        async fn share(&mut self, _title: &str, text: &str) -> Result<ShareOutcome, HostError> {
            if self.share_broken {
                return Err(HostError::NotConfigured("share"));
            }
            if !self.can_share {
                return Ok(ShareOutcome::Unavailable);
            }
            self.shared.push(text.to_string());
            Ok(ShareOutcome::Shared)
        }

        fn copy_to_clipboard(&mut self, text: &str) -> Result<(), HostError> {
            if self.clipboard_broken {
                return Err(arboard::Error::ClipboardNotSupported.into());
            }
            self.clipboard = Some(text.to_string());
            Ok(())
        }

        async fn print(&mut self, document: &str) -> Result<(), HostError> {
            self.printed.push(document.to_string());
            Ok(())
        }
    }

    fn app() -> App<RecordingHost> {
        App::new(RecordingHost::default(), BillState::new())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    async fn type_text(app: &mut App<RecordingHost>, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).await;
        }
    }

    #[tokio::test]
    async fn typing_a_bill_updates_the_breakdown() {
        let mut app = app();
        type_text(&mut app, "1x00000").await;

        assert_eq!(app.bill.bill_amount(), "100000");
        assert_eq!(app.breakdown.splits.len(), 2);
        assert_eq!(app.breakdown.splits[0].amount, Decimal::from(50_000));

        app.handle_key(key(KeyCode::Backspace)).await;
        assert_eq!(app.bill.bill_amount(), "10000");
        assert_eq!(app.breakdown.splits[0].amount, Decimal::from(5_000));
    }

    #[tokio::test]
    async fn head_count_steps_and_stays_in_bounds() {
        let mut app = app();
        app.handle_key(key(KeyCode::Down)).await;
        assert_eq!(app.focus, Field::People);

        app.handle_key(key(KeyCode::Char('+'))).await;
        app.handle_key(key(KeyCode::Right)).await;
        assert_eq!(app.bill.participant_count(), 4);

        for _ in 0..10 {
            app.handle_key(key(KeyCode::Left)).await;
        }
        assert_eq!(app.bill.participant_count(), 1);

        for _ in 0..30 {
            app.handle_key(key(KeyCode::Char('+'))).await;
        }
        assert_eq!(app.bill.participant_count(), 20);
    }

    #[tokio::test]
    async fn manual_amounts_are_editable_once_there_is_a_bill() {
        let mut app = app();
        app.focus = Field::SplitMode;
        app.handle_key(key(KeyCode::Char(' '))).await;
        assert!(app.bill.is_manual());
        assert!(!app.fields().contains(&Field::Amount(0)));

        app.focus = Field::Bill;
        type_text(&mut app, "100000").await;
        assert!(app.fields().contains(&Field::Amount(1)));

        app.focus = Field::Amount(0);
        type_text(&mut app, "6a0000").await;
        app.handle_key(key(KeyCode::Tab)).await;
        assert_eq!(app.focus, Field::Amount(1));
        type_text(&mut app, "30000").await;

        assert_eq!(app.bill.participants()[0].amount(), "60000");
        assert_eq!(app.breakdown.remaining, Decimal::from(10_000));
        assert!(!app.breakdown.valid);

        for _ in 0..5 {
            app.handle_key(key(KeyCode::Backspace)).await;
        }
        type_text(&mut app, "40000").await;
        assert_eq!(app.bill.participants()[1].amount(), "40000");
        assert!(app.breakdown.valid);
    }

    #[tokio::test]
    async fn names_replace_the_placeholder_label() {
        let mut app = app();
        app.focus = Field::ShowNames;
        app.handle_key(key(KeyCode::Enter)).await;
        assert!(app.bill.show_names());

        app.handle_key(key(KeyCode::Down)).await;
        assert_eq!(app.focus, Field::Name(0));
        type_text(&mut app, "Ayu").await;
        assert_eq!(app.bill.participants()[0].name(), "Ayu");

        app.handle_key(key(KeyCode::Down)).await;
        app.handle_key(key(KeyCode::Backspace)).await;
        assert_eq!(app.bill.participants()[1].name(), "");
    }

    #[tokio::test]
    async fn focus_recovers_when_its_field_disappears() {
        let mut app = app();
        app.bill.set_show_names(true);
        app.bill.set_participant_count(5);
        app.focus = Field::Name(4);

        app.bill.set_participant_count(2);
        app.recompute();
        assert_eq!(app.focus, Field::Name(1));

        app.bill.set_show_names(false);
        app.recompute();
        assert_eq!(app.focus, Field::ShowNames);
    }

    #[tokio::test]
    async fn q_quits_only_outside_text_fields() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('q'))).await;
        assert!(app.running);

        app.focus = Field::People;
        app.handle_key(key(KeyCode::Char('q'))).await;
        assert!(!app.running);

        let mut app = App::new(RecordingHost::default(), BillState::new());
        app.handle_key(key(KeyCode::Esc)).await;
        assert!(!app.running);
    }

    #[tokio::test]
    async fn share_without_facility_copies_to_clipboard() {
        let mut app = app();
        type_text(&mut app, "100000").await;
        app.handle_key(ctrl('s')).await;

        let copied = app.host.clipboard.clone().unwrap_or_default();
        assert!(copied.starts_with("Patungan - Split Bill"));
        assert!(copied.contains("Person 2: Rp 50.000"));
        assert_eq!(
            app.notice,
            Some(Notice::success("Copied to clipboard!"))
        );
    }

    #[tokio::test]
    async fn share_uses_the_host_facility_when_present() {
        let host = RecordingHost {
            can_share: true,
            ..Default::default()
        };
        let mut app = App::new(host, BillState::new());
        app.share().await;
        assert_eq!(app.host.shared.len(), 1);
        assert!(app.host.clipboard.is_none());
    }

    #[tokio::test]
    async fn failed_share_shows_an_error_and_keeps_running() {
        let host = RecordingHost {
            share_broken: true,
            ..Default::default()
        };
        let mut app = App::new(host, BillState::new());
        type_text(&mut app, "100000").await;
        app.handle_key(ctrl('s')).await;

        let notice = app.notice.clone().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.text.starts_with("Share failed"));
        assert!(app.running);
    }

    #[tokio::test]
    async fn broken_clipboard_after_unavailable_share_is_reported() {
        let host = RecordingHost {
            clipboard_broken: true,
            ..Default::default()
        };
        let mut app = App::new(host, BillState::new());
        type_text(&mut app, "100000").await;
        app.handle_key(ctrl('s')).await;

        let notice = app.notice.clone().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.text.contains("clipboard unavailable"), "{}", notice.text);
        assert!(app.host.clipboard.is_none());
        assert!(app.running);

        // Editing carries on and clears the notice.
        type_text(&mut app, "0").await;
        assert_eq!(app.bill.bill_amount(), "1000000");
        assert!(app.notice.is_none());
    }

    #[test]
    fn only_ctrl_s_and_ctrl_p_are_host_actions() {
        assert_eq!(HostAction::for_key(&ctrl('s')), Some(HostAction::Share));
        assert_eq!(HostAction::for_key(&ctrl('p')), Some(HostAction::Print));
        assert_eq!(HostAction::for_key(&ctrl('c')), None);
        assert_eq!(HostAction::for_key(&key(KeyCode::Char('s'))), None);
        assert_eq!(HostAction::Share.progress(), Notice::info("Sharing…"));
    }

    #[tokio::test]
    async fn cancelled_share_clears_the_progress_notice() {
        struct DismissingHost;

        impl Host for DismissingHost {
            async fn share(&mut self, _title: &str, _text: &str) -> Result<ShareOutcome, HostError> {
                Ok(ShareOutcome::Cancelled)
            }

            fn copy_to_clipboard(&mut self, _text: &str) -> Result<(), HostError> {
                panic!("a cancelled share must not touch the clipboard");
            }

            async fn print(&mut self, _document: &str) -> Result<(), HostError> {
                Ok(())
            }
        }

        let mut app = App::new(DismissingHost, BillState::new());
        app.notice = Some(HostAction::Share.progress());
        app.handle_key(ctrl('s')).await;
        assert!(app.notice.is_none());
        assert!(app.running);
    }

    #[tokio::test]
    async fn print_sends_the_receipt() {
        let mut app = app();
        type_text(&mut app, "90000").await;
        app.handle_key(ctrl('p')).await;

        assert_eq!(app.host.printed.len(), 1);
        assert!(app.host.printed[0].contains("Rp 45.000"));
        assert_eq!(app.notice, Some(Notice::success("Sent to printer")));
    }
}
