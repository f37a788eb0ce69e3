use super::app::{App, Field, NoticeKind};
use crate::currency::{self, format_idr};
use crate::receipt::{remaining_label, truncate_to_width};
use crate::split::{Balance, Participant, SplitMode, MAX_PARTICIPANTS, MIN_PARTICIPANTS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

const LABEL_WIDTH: usize = 14;
const NAME_WIDTH: usize = 16;

pub fn draw<H>(f: &mut Frame, app: &App<H>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Inputs + breakdown
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    draw_header(f, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_inputs(f, app, body[0]);
    draw_breakdown(f, app, body[1]);
    draw_status_bar(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            "Patungan",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  Split Bill", Style::default().fg(Color::Gray)),
        Span::raw("    "),
        Span::styled("Ctrl+S", Style::default().fg(Color::Cyan)),
        Span::styled(" Share  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Ctrl+P", Style::default().fg(Color::Cyan)),
        Span::styled(" Print", Style::default().fg(Color::DarkGray)),
    ]);

    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn label_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn value_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    }
}

/// One input row: focus marker, padded label, value spans.
fn field_line<'a>(label: &str, selected: bool, value: Vec<Span<'a>>) -> Line<'a> {
    let indicator = if selected { "▶ " } else { "  " };
    let mut spans = vec![
        Span::styled(indicator, label_style(selected)),
        Span::styled(
            format!("{:<width$}", truncate_to_width(label, LABEL_WIDTH), width = LABEL_WIDTH),
            label_style(selected),
        ),
    ];
    spans.extend(value);
    Line::from(spans)
}

fn toggle_span(on: bool, selected: bool) -> Span<'static> {
    let text = if on { "[x]" } else { "[ ]" };
    let style = if on {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        value_style(selected)
    };
    Span::styled(text, style)
}

fn cursor(selected: bool) -> &'static str {
    if selected {
        "█"
    } else {
        ""
    }
}

fn draw_inputs<H>(f: &mut Frame, app: &App<H>, area: Rect) {
    let bill = &app.bill;
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut focus_line = 0;

    let mut push = |lines: &mut Vec<Line<'static>>, field: Option<Field>, line: Line<'static>| {
        if field == Some(app.focus) {
            focus_line = lines.len();
        }
        lines.push(line);
    };

    // Total Bayar
    let selected = app.focus == Field::Bill;
    let grouped = currency::group_digits(bill.bill_amount());
    let bill_value = if grouped.is_empty() && !selected {
        Span::styled("Rp 0", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            format!("{} {}{}", currency::SYMBOL, grouped, cursor(selected)),
            value_style(selected),
        )
    };
    push(
        &mut lines,
        Some(Field::Bill),
        field_line("Total Bayar", selected, vec![bill_value]),
    );

    // Jumlah Orang
    let selected = app.focus == Field::People;
    let count = bill.participant_count();
    let arrow = |enabled: bool, glyph: &'static str| {
        let color = if enabled { Color::Cyan } else { Color::DarkGray };
        Span::styled(glyph, Style::default().fg(color))
    };
    push(
        &mut lines,
        Some(Field::People),
        field_line(
            "Jumlah Orang",
            selected,
            vec![
                arrow(count > MIN_PARTICIPANTS, "◀ "),
                Span::styled(format!("{:>2}", count), value_style(selected)),
                arrow(count < MAX_PARTICIPANTS, " ▶"),
                Span::styled(" orang", Style::default().fg(Color::DarkGray)),
            ],
        ),
    );

    // Tambah Nama
    let selected = app.focus == Field::ShowNames;
    push(
        &mut lines,
        Some(Field::ShowNames),
        field_line(
            "Tambah Nama",
            selected,
            vec![toggle_span(bill.show_names(), selected)],
        ),
    );

    if bill.show_names() {
        for (i, p) in bill.participants().iter().enumerate() {
            let field = Field::Name(i);
            let selected = app.focus == field;
            let value = if p.name().is_empty() {
                Span::styled(
                    format!("{}{}", cursor(selected), Participant::default_label(i)),
                    Style::default().fg(Color::DarkGray),
                )
            } else {
                Span::styled(format!("{}{}", p.name(), cursor(selected)), value_style(selected))
            };
            push(
                &mut lines,
                Some(field),
                field_line(&format!("  Nama {}", i + 1), selected, vec![value]),
            );
        }
    }

    // Pisah Manual
    let selected = app.focus == Field::SplitMode;
    push(
        &mut lines,
        Some(Field::SplitMode),
        field_line(
            "Pisah Manual",
            selected,
            vec![
                toggle_span(bill.is_manual(), selected),
                Span::styled(
                    format!(" {}", bill.mode().title()),
                    Style::default().fg(Color::DarkGray),
                ),
            ],
        ),
    );

    if bill.is_manual() {
        if !app.amounts_editable() {
            push(
                &mut lines,
                None,
                Line::from(Span::styled(
                    "    Enter a bill amount first to set custom splits",
                    Style::default().fg(Color::DarkGray),
                )),
            );
        } else {
            for (i, (p, split)) in bill
                .participants()
                .iter()
                .zip(&app.breakdown.splits)
                .enumerate()
            {
                let field = Field::Amount(i);
                let selected = app.focus == field;
                let value = if p.amount().is_empty() && !selected {
                    Span::styled("Rp 0", Style::default().fg(Color::DarkGray))
                } else {
                    Span::styled(
                        format!("{} {}{}", currency::SYMBOL, p.amount(), cursor(selected)),
                        value_style(selected),
                    )
                };
                push(
                    &mut lines,
                    Some(field),
                    field_line(&format!("  {}", split.name), selected, vec![value]),
                );
            }

            let balance = app.breakdown.balance();
            let color = match balance {
                Balance::Settled => Color::Green,
                _ => Color::Red,
            };
            push(
                &mut lines,
                None,
                field_line(
                    "  Remaining",
                    false,
                    vec![Span::styled(
                        remaining_label(balance),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    )],
                ),
            );
        }
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = if inner_height == 0 {
        0
    } else {
        focus_line.saturating_sub(inner_height - 1)
    };

    let inputs = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Bill "),
        )
        .scroll((scroll as u16, 0));
    f.render_widget(inputs, area);
}

fn draw_breakdown<H>(f: &mut Frame, app: &App<H>, area: Rect) {
    let breakdown = &app.breakdown;

    if breakdown.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Patungan",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Masukkan total bayar untuk melihat pembagian",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Breakdown "));
        f.render_widget(empty, area);
        return;
    }

    let title = format!(" Breakdown  {} total ", format_idr(breakdown.total));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(inner);

    let rows: Vec<Row> = breakdown
        .splits
        .iter()
        .map(|s| {
            let initial = s
                .name
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_default();
            Row::new(vec![
                Cell::from(format!(" {} ", initial)).style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Cell::from(truncate_to_width(&s.name, NAME_WIDTH))
                    .style(Style::default().fg(Color::White)),
                Cell::from(Line::from(format_idr(s.amount)).alignment(Alignment::Right))
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(NAME_WIDTH as u16),
        Constraint::Length(18),
    ];
    f.render_widget(Table::new(rows, widths), chunks[0]);

    let mut summary = vec![Line::from(vec![
        Span::styled("Setiap Orang Bayar  ", Style::default().fg(Color::Gray)),
        Span::styled(
            format_idr(breakdown.average),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ])];
    match breakdown.mode {
        SplitMode::Equal => summary.push(Line::from(Span::styled(
            "(Equal split)  avg per person",
            Style::default().fg(Color::DarkGray),
        ))),
        SplitMode::Manual => {
            let (text, color) = if breakdown.valid {
                ("✓ Amounts add up".to_string(), Color::Green)
            } else {
                (
                    format!("✗ Remaining {}", remaining_label(breakdown.balance())),
                    Color::Red,
                )
            };
            summary.push(Line::from(Span::styled(text, Style::default().fg(color))));
        }
    }

    let summary = Paragraph::new(summary).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(summary, chunks[1]);
}

fn draw_status_bar<H>(f: &mut Frame, app: &App<H>, area: Rect) {
    let help_text = match app.focus {
        Field::Bill => " 0-9:Amount  Bksp:Delete  ↑/↓:Fields  Esc:Quit ",
        Field::People => " ←/→ or +/-:People  ↑/↓:Fields  q:Quit ",
        Field::ShowNames | Field::SplitMode => " Space/Enter:Toggle  ↑/↓:Fields  q:Quit ",
        Field::Name(_) => " Type:Name  Bksp:Delete  ↑/↓:Fields  Esc:Quit ",
        Field::Amount(_) => " 0-9 .:Amount  Bksp:Delete  ↑/↓:Fields  Esc:Quit ",
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let help = Paragraph::new(Line::from(Span::styled(
        help_text,
        Style::default().fg(Color::Cyan),
    )))
    .block(Block::default().borders(Borders::ALL).title(" Keys "));

    let info = match &app.notice {
        Some(notice) => {
            let (prefix, color) = match notice.kind {
                NoticeKind::Info => ("", Color::Yellow),
                NoticeKind::Success => ("✓ ", Color::Green),
                NoticeKind::Error => ("✗ ", Color::Red),
            };
            Line::from(Span::styled(
                format!(" {}{} ", prefix, notice.text),
                Style::default().fg(color),
            ))
        }
        None => Line::from(Span::styled(
            format!(
                " {} orang | {} ",
                app.bill.participant_count(),
                app.bill.mode().title()
            ),
            Style::default().fg(Color::DarkGray),
        )),
    };
    let info_widget = Paragraph::new(info).block(Block::default().borders(Borders::ALL).title(" Info "));

    f.render_widget(help, chunks[0]);
    f.render_widget(info_widget, chunks[1]);
}
