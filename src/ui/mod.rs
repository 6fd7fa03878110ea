mod components;

use std::sync::OnceLock;
use std::time::Instant;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Popup, BOARD_COLUMNS};
use crate::game::{Event, Phase, CASE_COUNT};
use crate::media::{Outcome, Presenter, ResultContent};
use crate::theme::Theme;
use components::CaseCard;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme before the first frame; later calls are ignored
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

fn accent() -> Color { theme().accent }
fn case_color() -> Color { theme().case }
fn win() -> Color { theme().win }
fn miss() -> Color { theme().miss }
fn countdown() -> Color { theme().countdown }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn inactive() -> Color { theme().inactive }
fn header() -> Color { theme().header }

const CARD_WIDTH: u16 = 22;
const CARD_HEIGHT: u16 = 7;
const CARD_GAP: u16 = 4;

pub fn draw<P: Presenter>(f: &mut Frame, app: &App<P>) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Length(3), // Title
            Constraint::Min(6),    // Board
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_title(f, app, chunks[1]);
    draw_board(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    if app.session.is_dialog_visible() {
        draw_result_popup(f, app);
    }
    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_info_line<P: Presenter>(f: &mut Frame, app: &App<P>, area: Rect) {
    // Priority: countdown > status message > phase hint
    let line = if let Some((event, secs)) = app.countdown(Instant::now()) {
        let picked = app.session.selected().map(|i| i + 1).unwrap_or_default();
        let action = match event {
            Event::SuspenseElapsed => "Opening the other cases".to_string(),
            Event::RevealElapsed => format!("Opening case {}", picked),
            Event::DialogElapsed => "Showing the result".to_string(),
            Event::Pick(_) | Event::Dismiss => String::new(),
        };
        let color = if secs <= 1 { miss() } else { countdown() };

        Line::from(vec![
            Span::styled("󰔟 ", Style::default().fg(color)),
            Span::styled(format!("{}", secs), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(" │ ", Style::default().fg(text_dim())),
            Span::styled(action, Style::default().fg(text())),
        ])
    } else if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.as_str(), Style::default().fg(countdown())))
    } else {
        let hint = match app.session.phase() {
            Phase::Idle => format!("Pick one of {} cases", CASE_COUNT),
            Phase::DialogShown | Phase::Resolved => app
                .session
                .outcome()
                .map(|o| o.headline().to_string())
                .unwrap_or_default(),
            Phase::Committed | Phase::PartialReveal => String::new(),
        };
        Line::from(Span::styled(hint, Style::default().fg(text_dim())))
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_title<P: Presenter>(f: &mut Frame, app: &App<P>, area: Rect) {
    let title = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Pick a Case!", Style::default().fg(header()).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  [{}]", app.style.label()), Style::default().fg(text_dim())),
        ]),
    ])
    .alignment(Alignment::Center);

    f.render_widget(title, area);
}

fn draw_board<P: Presenter>(f: &mut Frame, app: &App<P>, area: Rect) {
    let rows = CASE_COUNT.div_ceil(BOARD_COLUMNS);
    let columns = BOARD_COLUMNS as u16;
    let board = centered_fixed(
        CARD_WIDTH * columns + CARD_GAP * (columns - 1),
        CARD_HEIGHT * rows as u16,
        area,
    );

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(board);

    // Cards on even positions, gaps in between
    let mut column_constraints = Vec::with_capacity(BOARD_COLUMNS * 2);
    for col in 0..BOARD_COLUMNS {
        if col > 0 {
            column_constraints.push(Constraint::Length(CARD_GAP));
        }
        column_constraints.push(Constraint::Length(CARD_WIDTH));
    }

    let locked = app.session.is_game_over();
    for (index, reveal) in app.session.slots().iter().copied().enumerate() {
        let Some(row_area) = row_areas.get(index / BOARD_COLUMNS) else {
            continue;
        };
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(column_constraints.clone())
            .split(*row_area);
        let Some(cell) = cells.get((index % BOARD_COLUMNS) * 2) else {
            continue;
        };

        let card = CaseCard {
            index,
            reveal,
            under_cursor: app.cursor == index,
            picked: app.session.selected() == Some(index),
            locked,
        };
        f.render_widget(card.widget(cell.height), *cell);
    }
}

fn draw_footer<P: Presenter>(f: &mut Frame, app: &App<P>, area: Rect) {
    let hints: Vec<(&str, &str)> = if app.session.is_dialog_visible() {
        vec![("o", "Open"), ("Esc", "Close"), ("q", "Quit")]
    } else if app.session.is_game_over() {
        vec![("?", "Help"), ("q", "Quit")]
    } else {
        vec![
            ("1-4", "Pick"),
            ("←↑↓→", "Move"),
            ("Space", "Pick"),
            ("?", "Help"),
            ("q", "Quit"),
        ]
    };

    let hint_spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    f.render_widget(Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center), area);
}

fn draw_result_popup<P: Presenter>(f: &mut Frame, app: &App<P>) {
    let Some(outcome) = app.session.outcome() else {
        return;
    };
    let popup_area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, popup_area);

    let color = match outcome {
        Outcome::Win => win(),
        Outcome::Miss => miss(),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(outcome.headline(), Style::default().fg(color).add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];

    match app.result_content() {
        Some(ResultContent::Image(url)) => {
            lines.push(Line::from(vec![
                Span::styled("󰋩 ", Style::default().fg(accent())),
                Span::styled(url, Style::default().fg(text_dim())),
            ]));
        }
        Some(ResultContent::Video(url)) => {
            lines.push(Line::from(vec![
                Span::styled("▶ ", Style::default().fg(accent())),
                Span::styled(url, Style::default().fg(text_dim())),
            ]));
        }
        Some(ResultContent::Message(_)) | None => {}
    }

    if let Some(winner) = app.session.winning_index() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("The winning case was case {}", winner + 1),
            Style::default().fg(text()),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("o", Style::default().fg(accent())),
        Span::styled(" open  ", Style::default().fg(text_dim())),
        Span::styled("Esc", Style::default().fg(accent())),
        Span::styled(" close", Style::default().fg(text_dim())),
    ]));

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(" Result ", Style::default().fg(color).add_modifier(Modifier::BOLD)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(popup, popup_area);
}

fn draw_help_popup(f: &mut Frame) {
    let popup_area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };
    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(key, Style::default().fg(accent())),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        section("═══ Playing ═══"),
        entry("  1-4        ", "Pick that case"),
        entry("  ←↑↓→       ", "Move between cases"),
        entry("  Space/Enter", " Pick the highlighted case"),
        Line::from(""),
        Line::from(Span::styled(
            "  One pick per game. The other cases open first,",
            Style::default().fg(text_dim()),
        )),
        Line::from(Span::styled(
            "  then yours. Restart casepick to play again.",
            Style::default().fg(text_dim()),
        )),
        Line::from(""),
        section("═══ Result ═══"),
        entry("  o          ", "Open the result image/video"),
        entry("  Esc        ", "Close the result"),
        Line::from(""),
        section("═══ Scripting ═══"),
        entry("  casepick --pick 2          ", "Headless game, JSON result"),
        entry("  casepick --style video     ", "Pick a presentation style"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" casepick Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

/// Fixed-size rect centered in `r`, clamped to fit
fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
