//! Dashboard rendering.
//!
//! Pure: reads `DashboardState` and draws a frame. Widgets the page does not
//! have (absent anchors) are simply not drawn.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap};
use relay_core::controller::{Notice, NoticeLevel};
use relay_core::page::{AgentSlot, Badge, Button, Page, ProgressPanel, SlotStatus};
use relay_core::session::Mode;
use unicode_width::UnicodeWidthStr;

use crate::state::DashboardState;

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;
/// Summary and report buttons per row of the summary panel.
const SUMMARY_COLUMNS: usize = 3;

pub fn render(state: &DashboardState, frame: &mut Frame) {
    let area = frame.area();
    let page = state.controller.page();

    let mut constraints = vec![Constraint::Length(1)];
    if page.has_mode_controls() {
        constraints.push(Constraint::Length(4));
    }
    if page.slot(AgentSlot::A).is_some() {
        constraints.push(Constraint::Length(5));
    }
    if page.progress_visible() {
        constraints.push(Constraint::Length(7));
    }
    if page.summary_visible() {
        constraints.push(Constraint::Length(summary_panel_height(page)));
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(3));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::vertical(constraints).split(area);
    let mut next = chunks.iter().copied();
    let mut take = || next.next().unwrap_or_default();

    render_header(state, frame, take());
    if page.has_mode_controls() {
        render_modes(state, frame, take());
    }
    if page.slot(AgentSlot::A).is_some() {
        render_slots(page, frame, take());
    }
    if let Some(progress) = page.progress().filter(|p| p.visible) {
        render_progress(state, progress, frame, take());
    }
    if page.summary_visible() {
        render_summary_panel(state, frame, take());
    }
    let _spacer = take();
    render_prompt(state, frame, take());
    render_hints(state, frame, take());

    if let Some(modal) = page.top_modal() {
        let height = area.height.saturating_sub(4);
        let popup = calculate_overlay_area(area, 80, height);
        render_overlay_container(frame, popup, &modal.title, ACCENT);
        let [body, footer] = inner_areas(popup);
        frame.render_widget(
            Paragraph::new(modal.body.as_str())
                .wrap(Wrap { trim: false })
                .scroll((state.modal_scroll, 0)),
            body,
        );
        frame.render_widget(
            Paragraph::new(Line::from(hint_spans(&[
                ("Esc", "close"),
                ("c", "copy"),
                ("↑/↓", "scroll"),
            ]))),
            footer,
        );
    }

    if let Some(notice) = state.notice() {
        render_notice(notice, frame, area);
    }
}

fn render_header(state: &DashboardState, frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            " Relay ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("[{}] ", state.controller.phase().label()),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(state.backend_url.as_str(), Style::default().fg(MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn button_span(state: &DashboardState, button: Button) -> Span<'static> {
    let style = if state.focus == Some(button) {
        Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(ACCENT)
    };
    Span::styled(format!("[ {} ]", button.label()), style)
}

fn button_row(state: &DashboardState, buttons: &[Button]) -> Line<'static> {
    let mut spans = Vec::new();
    for button in buttons {
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        spans.push(button_span(state, *button));
    }
    Line::from(spans)
}

fn render_modes(state: &DashboardState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(" Relay Mode ");
    let columns = Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(block.inner(area));
    frame.render_widget(block, area);

    for (mode, column) in Mode::all().iter().zip(columns.iter()) {
        let shortcut = match mode {
            Mode::ExpertPanel => "F1",
            Mode::ConferenceChain => "F2",
        };
        let lines = vec![
            Line::from(vec![
                button_span(state, Button::StartMode(*mode)),
                Span::styled(format!(" {shortcut}"), Style::default().fg(MUTED)),
            ]),
            Line::styled(mode.description(), Style::default().fg(MUTED)),
        ];
        frame.render_widget(Paragraph::new(lines), *column);
    }
}

fn badge_color(badge: Badge) -> Color {
    match badge {
        Badge::Ready => Color::Gray,
        Badge::Initializing => Color::Yellow,
        Badge::Processing => Color::Blue,
        Badge::Completed => Color::Green,
        Badge::Stopped => Color::Red,
    }
}

fn render_slots(page: &Page, frame: &mut Frame, area: Rect) {
    let columns =
        Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]).split(area);
    for (slot, column) in AgentSlot::all().iter().zip(columns.iter()) {
        if let Some(status) = page.slot(*slot) {
            render_slot(*slot, status, frame, *column);
        }
    }
}

fn render_slot(slot: AgentSlot, status: &SlotStatus, frame: &mut Frame, area: Rect) {
    let color = badge_color(status.badge);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" Agent {} ", slot.label()));
    let lines = vec![
        Line::from(Span::styled(
            format!(" {} ", status.badge.label()),
            Style::default().fg(Color::Black).bg(color),
        )),
        Line::styled(
            status.agent.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(status.specialty.as_str(), Style::default().fg(MUTED)),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_progress(
    state: &DashboardState,
    progress: &ProgressPanel,
    frame: &mut Frame,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(format!(" {} ", progress.title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(inner);

    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(ACCENT))
            .ratio((progress.percent / 100.0).clamp(0.0, 1.0))
            .label(format!("{:.0}%", progress.percent)),
        rows[0],
    );
    frame.render_widget(Paragraph::new(progress.counter()), rows[1]);
    frame.render_widget(
        Paragraph::new(format!("Current: {}", progress.processing)),
        rows[2],
    );
    frame.render_widget(
        Paragraph::new(format!("Est. Time: {}", progress.estimated)),
        rows[3],
    );
    frame.render_widget(
        Paragraph::new(button_row(state, &[Button::Pause, Button::Stop])),
        rows[4],
    );
}

fn summary_buttons(page: &Page) -> Vec<Button> {
    page.buttons()
        .into_iter()
        .filter(|b| matches!(b, Button::Summary(_) | Button::HtmlReport))
        .collect()
}

/// Borders plus one row per `SUMMARY_COLUMNS` buttons.
fn summary_panel_height(page: &Page) -> u16 {
    let rows = summary_buttons(page).len().div_ceil(SUMMARY_COLUMNS);
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(2)
}

fn render_summary_panel(state: &DashboardState, frame: &mut Frame, area: Rect) {
    let buttons = summary_buttons(state.controller.page());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Summaries ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let row_count = buttons.len().div_ceil(SUMMARY_COLUMNS);
    let rows = Layout::vertical(vec![Constraint::Length(1); row_count]).split(inner);
    for (row_buttons, row) in buttons.chunks(SUMMARY_COLUMNS).zip(rows.iter()) {
        let cells = Layout::horizontal(vec![
            Constraint::Ratio(1, SUMMARY_COLUMNS as u32);
            SUMMARY_COLUMNS
        ])
        .split(*row);
        for (button, cell) in row_buttons.iter().zip(cells.iter()) {
            frame.render_widget(Paragraph::new(button_span(state, *button)), *cell);
        }
    }
}

fn render_prompt(state: &DashboardState, frame: &mut Frame, area: Rect) {
    let Some(prompt) = state.controller.page().prompt() else {
        return;
    };
    let focused = state.prompt_focused();
    let border = if focused { ACCENT } else { MUTED };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Prompt ");
    let inner = block.inner(area);

    let width = usize::from(inner.width.saturating_sub(1));
    let visible = tail_to_width(prompt, width);
    let line = if prompt.is_empty() && !focused {
        Line::styled("Describe the problem for the relay...", Style::default().fg(MUTED))
    } else if focused {
        Line::from(vec![Span::raw(visible), Span::styled("█", Style::default().fg(ACCENT))])
    } else {
        Line::from(visible)
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Longest suffix of `text` that fits in `width` columns.
fn tail_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut used = 0;
    let mut start = text.len();
    for (idx, ch) in text.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    text[start..].to_string()
}

fn hint_spans(hints: &[(&'static str, &'static str)]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (key, action) in hints {
        if !spans.is_empty() {
            spans.push(Span::styled(" · ", Style::default().fg(MUTED)));
        }
        spans.push(Span::styled(*key, Style::default().fg(ACCENT)));
        spans.push(Span::styled(format!(" {action}"), Style::default().fg(MUTED)));
    }
    spans
}

fn render_hints(state: &DashboardState, frame: &mut Frame, area: Rect) {
    let hints: &[(&str, &str)] = if state.prompt_focused() {
        &[
            ("Tab", "focus"),
            ("F1", "expert panel"),
            ("F2", "conference chain"),
            ("Ctrl+C", "quit"),
        ]
    } else {
        &[
            ("Tab", "focus"),
            ("Enter", "activate"),
            ("F1/F2", "start"),
            ("Ctrl+C", "quit"),
        ]
    };
    frame.render_widget(Paragraph::new(Line::from(hint_spans(hints))), area);
}

fn render_notice(notice: &Notice, frame: &mut Frame, area: Rect) {
    let (title, color) = match notice.level {
        NoticeLevel::Error => ("Error", Color::Red),
        NoticeLevel::Success => ("Success", Color::Green),
    };
    let message_width = u16::try_from(notice.message.width()).unwrap_or(u16::MAX);
    let width = message_width.saturating_add(6).clamp(30, 70);
    let text_width = width.saturating_sub(2).max(1);
    let lines = message_width.div_ceil(text_width).max(1);
    let popup = calculate_overlay_area(area, width, lines + 3);
    render_overlay_container(frame, popup, title, color);

    let [body, footer] = inner_areas(popup);
    frame.render_widget(
        Paragraph::new(notice.message.as_str())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        body,
    );
    frame.render_widget(
        Paragraph::new(Line::from(hint_spans(&[("Enter", "dismiss")])))
            .alignment(Alignment::Center),
        footer,
    );
}

/// Centers a `width` x `height` overlay in `area`.
fn calculate_overlay_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// Clears the background and draws the bordered, titled container.
fn render_overlay_container(frame: &mut Frame, area: Rect, title: &str, border_color: Color) {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {title} "))
        .title_style(
            Style::default()
                .fg(border_color)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(block, area);
}

/// Body and one-line footer inside an overlay's border.
fn inner_areas(popup: Rect) -> [Rect; 2] {
    let inner = Rect::new(
        popup.x + 1,
        popup.y + 1,
        popup.width.saturating_sub(2),
        popup.height.saturating_sub(2),
    );
    let body_height = inner.height.saturating_sub(1);
    [
        Rect::new(inner.x, inner.y, inner.width, body_height),
        Rect::new(inner.x, inner.y + body_height, inner.width, inner.height.min(1)),
    ]
}
