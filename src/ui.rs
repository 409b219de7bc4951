pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppState};
use crate::reducer::TypingState;
use crate::time_series::SamplePoint;
use crate::ui::charting::{chart_bounds, format_label};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn glyph(c: char) -> String {
    match c {
        '\t' => "    ".to_string(),
        '\n' => "↵".to_string(),
        c => c.to_string(),
    }
}

/// Color-coded view of the target with the typed buffer laid over it.
///
/// Positions are compared index by index, the same alignment the sampler
/// uses, so a soft-wrap newline shows up as a miss from that point on.
pub fn styled_lines(
    target: &[char],
    state: &TypingState,
    show_errors: bool,
    caret_visible: bool,
) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let correct = bold.fg(Color::Green);
    let incorrect = bold.fg(Color::Red);
    let pending = bold.add_modifier(Modifier::DIM);

    let mut lines = Vec::new();
    let mut spans = Vec::new();

    let len = target.len().max(state.buffer.len());
    for i in 0..len {
        let typed = state.buffer.get(i).copied();
        let expected = target.get(i).copied();
        let (ch, text, mut style) = match (typed, expected) {
            (Some(t), Some(e)) if t == e => (t, glyph(t), correct),
            (Some(' '), _) if show_errors => (' ', "·".to_string(), incorrect),
            (Some(t), _) if show_errors => (t, glyph(t), incorrect),
            (Some(t), _) => (t, glyph(t), bold),
            (None, Some(e)) => (e, glyph(e), pending),
            (None, None) => break,
        };

        let has_caret = i == state.cursor && caret_visible;
        if has_caret {
            style = style.add_modifier(Modifier::REVERSED);
        }

        if ch == '\n' {
            if has_caret {
                spans.push(Span::styled(text, style));
            }
            lines.push(Line::from(std::mem::take(&mut spans)));
        } else {
            spans.push(Span::styled(text, style));
        }
    }

    if state.cursor >= len && caret_visible {
        spans.push(Span::styled(
            " ",
            Style::default().add_modifier(Modifier::REVERSED),
        ));
    }
    lines.push(Line::from(spans));
    lines
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let dim_bold_style = Style::default()
        .add_modifier(Modifier::BOLD)
        .add_modifier(Modifier::DIM);
    let session = &app.session;
    let target = session.target();

    let lines = styled_lines(
        target.chars(),
        session.state(),
        app.show_errors(),
        app.caret_visible(),
    );
    let text_height = lines.len() as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height.saturating_sub(text_height + 2) / 2),
            Constraint::Length(1),
            Constraint::Length(text_height),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let clock = match session.time_left() {
        Some(left) => format!("{:.1}", left.as_secs_f64()),
        None => format!("{:.1}s", session.seconds_elapsed()),
    };
    Paragraph::new(Span::styled(clock, dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    // short one-liners are centered, code keeps its indentation
    let single_line = !target.as_str().contains('\n')
        && target.as_str().width() < chunks[2].width as usize;
    Paragraph::new(lines)
        .alignment(if single_line {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .render(chunks[2], buf);

    let live = match session.latest() {
        Some(snap) => format!(
            "{} wpm   {:.0}% acc   {} errors",
            snap.wpm,
            snap.accuracy,
            session.state().errors
        ),
        None => String::from("start typing"),
    };
    Paragraph::new(Span::styled(live, dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let session = &app.session;
    let store = session.store();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // speed
            Constraint::Length(1), // character counts
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let samples = store.samples();
    let (duration, top_speed) = chart_bounds(samples, session.seconds_elapsed());
    let wpm_coords: Vec<(f64, f64)> = samples.iter().map(SamplePoint::wpm_coord).collect();
    let raw_coords: Vec<(f64, f64)> = samples.iter().map(SamplePoint::raw_coord).collect();

    let datasets = vec![
        Dataset::default()
            .name("raw")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::DarkGray))
            .graph_type(GraphType::Line)
            .data(&raw_coords),
        Dataset::default()
            .name("wpm")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::Magenta))
            .graph_type(GraphType::Line)
            .data(&wpm_coords),
    ];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(format_label(duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, top_speed])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(format_label(top_speed), bold_style),
                ]),
        )
        .render(chunks[0], buf);

    let (wpm, raw) = session
        .latest()
        .map_or((0, 0), |snap| (snap.wpm, snap.raw_wpm));
    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {} raw   {:.1}% acc   {:.2} sd",
            wpm,
            raw,
            store.accuracy(),
            store.consistency()
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let counts = store.counts();
    Paragraph::new(Span::styled(
        format!(
            "{} correct / {} incorrect / {} extra / {} missed   {:.1}s",
            counts.correct,
            counts.incorrect,
            counts.extra,
            counts.missed,
            store.completed_after().unwrap_or_default()
        ),
        Style::default().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled("(r)etry / (n)ew / (esc)ape", italic_style))
        .render(chunks[4], buf);
}
