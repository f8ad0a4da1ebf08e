use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::session::{Phase, RoundOutcome};
use crate::summary::SessionSummary;
use crate::{App, SetupField};

const HORIZONTAL_MARGIN: u16 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.session.phase() {
            Phase::Setup => render_setup(self, area, buf),
            Phase::Countdown => render_countdown(self, area, buf),
            Phase::ShowingNumber => render_number(self, area, buf),
            Phase::RecallDelay => render_recall_delay(area, buf),
            Phase::AwaitingInput => render_input(self, area, buf),
            Phase::ShowingResult => render_result(self, area, buf),
            Phase::GameOver => render_game_over(self, area, buf),
        }

        if self.session.phase() != Phase::Setup {
            render_status_line(self, area, buf);
        }
    }
}

/// Horizontal band of `height` rows, vertically centered in `area`.
fn centered_band(area: Rect, height: u16) -> Rect {
    let top = area.height.saturating_sub(height) / 2;
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(top),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area)[1]
}

fn render_setup(app: &App, area: Rect, buf: &mut Buffer) {
    let title_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let selected_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(Span::styled("Number Recall", title_style)).alignment(Alignment::Center),
        Line::from(Span::styled(
            "Train your short-term memory.",
            dim_style,
        ))
        .alignment(Alignment::Center),
        Line::default(),
    ];

    for (idx, field) in SetupField::ALL.iter().enumerate() {
        let value = match field {
            SetupField::Digits => format!("{}", app.draft.digits),
            SetupField::DisplayTime => format!("{:.1}s", app.draft.display_secs),
            SetupField::Rounds => format!("{}", app.draft.rounds),
            SetupField::RecallDelay => format!("{:.1}s", app.draft.recall_delay_secs),
        };
        let (marker, style) = if idx == app.setup_cursor {
            ("› ", selected_style)
        } else {
            ("  ", Style::default())
        };
        lines.push(
            Line::from(vec![
                Span::styled(marker, style),
                Span::styled(format!("{:<20}", field.label()), style),
                Span::styled(format!("‹ {} ›", value), style),
            ])
            .alignment(Alignment::Center),
        );
    }

    lines.push(Line::default());
    lines.push(
        Line::from(Span::styled(
            "(↑/↓) select  (←/→) adjust  (enter) start  (m)ute  (esc) quit",
            dim_style.add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
    );

    let height = lines.len() as u16;
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(centered_band(area, height), buf);
}

fn render_countdown(app: &App, area: Rect, buf: &mut Buffer) {
    let digit = Paragraph::new(Span::styled(
        format!("{}", app.session.countdown()),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);

    digit.render(centered_band(area, 1), buf);
}

fn render_number(app: &App, area: Rect, buf: &mut Buffer) {
    // wide tracking makes the digits easier to chunk
    let spaced = app.session.target().chars().join("  ");
    let number = Paragraph::new(Span::styled(
        spaced,
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    number.render(centered_band(area, 1), buf);
}

fn render_recall_delay(area: Rect, buf: &mut Buffer) {
    let dot = Paragraph::new(Span::styled(
        "·",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);

    dot.render(centered_band(area, 1), buf);
}

fn render_input(app: &App, area: Rect, buf: &mut Buffer) {
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let mut typed = app.input.chars().join(" ");
    if !typed.is_empty() {
        typed.push(' ');
    }

    let mut lines = vec![
        Line::from("What was the number?").alignment(Alignment::Center),
        Line::default(),
        Line::from(vec![
            Span::styled(
                typed,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("▁", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])
        .alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(
            "(enter) submit  (backspace) delete",
            dim_style.add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
    ];

    if app.transcriber_supported {
        lines.push(
            Line::from(Span::styled("Listening...", dim_style)).alignment(Alignment::Center),
        );
    }

    let height = lines.len() as u16;
    Paragraph::new(lines).render(centered_band(area, height), buf);
}

fn render_result(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(outcome) = app.session.last_outcome() else {
        return;
    };

    if outcome.correct {
        let banner = Paragraph::new(Span::styled(
            "✓ Correct!",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        banner.render(centered_band(area, 1), buf);
        return;
    }

    let label_style = Style::default().add_modifier(Modifier::DIM);
    let mut submitted_spans = vec![Span::styled("Your input:  ", label_style)];
    for (char, matches) in padded_submission(outcome) {
        let style = if matches {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::CROSSED_OUT)
        };
        submitted_spans.push(Span::styled(format!("{} ", char), style));
    }

    let lines = vec![
        Line::from(Span::styled(
            "✗ Incorrect",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::default(),
        Line::from(vec![
            Span::styled("Number:      ", label_style),
            Span::from(outcome.target.chars().join(" ")),
        ])
        .alignment(Alignment::Center),
        Line::from(submitted_spans).alignment(Alignment::Center),
    ];

    let height = lines.len() as u16;
    Paragraph::new(lines).render(centered_band(area, height), buf);
}

fn render_game_over(app: &App, area: Rect, buf: &mut Buffer) {
    let summary = SessionSummary::from_outcomes(app.session.outcomes());

    let band = centered_band(area, 9);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1),
            Constraint::Length(5), // stat cards
            Constraint::Length(1),
            Constraint::Length(1), // hint
        ])
        .split(band);

    Paragraph::new(Span::styled(
        "Session Complete",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let cards = [
        ("Total Rounds", summary.total_rounds.to_string()),
        ("Correct", summary.correct.to_string()),
        ("Accuracy", format!("{}%", summary.accuracy_percent)),
        ("Best Streak", summary.longest_streak.to_string()),
    ];
    let card_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(chunks[2]);

    for ((label, value), card_area) in cards.iter().zip(card_areas.iter()) {
        let card = Paragraph::new(vec![
            Line::from(Span::styled(
                *label,
                Style::default().add_modifier(Modifier::DIM),
            )),
            Line::from(Span::styled(
                value.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        card.render(*card_area, buf);
    }

    Paragraph::new(Span::styled(
        "(r)eplay  (esc) quit",
        Style::default()
            .add_modifier(Modifier::DIM)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

fn render_status_line(app: &App, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }
    let sound = if app.session.is_sound_enabled() {
        "sound on"
    } else {
        "muted"
    };
    let status = format!(
        "round {}/{}  ·  {}  ·  {}",
        app.session.round(),
        app.session.settings().rounds,
        app.session.phase(),
        sound
    );

    let bottom = Rect {
        x: area.x,
        y: area.y + area.height - 1,
        width: area.width,
        height: 1,
    };
    // right-aligned so it stays clear of centered content
    let pad = (bottom.width as usize).saturating_sub(status.width() + 1);
    Paragraph::new(Span::styled(
        format!("{}{} ", " ".repeat(pad), status),
        Style::default().add_modifier(Modifier::DIM),
    ))
    .render(bottom, buf);
}

/// Pairs each submitted character (padded with ␣ to the target's length)
/// with whether it matches the target at that position.
fn padded_submission(outcome: &RoundOutcome) -> Vec<(char, bool)> {
    let target: Vec<char> = outcome.target.chars().collect();
    let mut submitted: Vec<char> = outcome.submitted.chars().collect();
    while submitted.len() < target.len() {
        submitted.push('␣');
    }

    submitted
        .into_iter()
        .enumerate()
        .map(|(idx, char)| (char, target.get(idx) == Some(&char)))
        .collect()
}
