use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::App;
use crate::chat::{ChatSession, ConversationTurn, Sender};

const HEADER_HEIGHT: u16 = 3;
const INPUT_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 1;
const ACCENT: Color = Color::Magenta;

/// Closed widget: a small launcher in the bottom-right corner.
pub fn render_launcher(f: &mut Frame) {
    let area = f.area();
    let width = 36u16.min(area.width);
    let height = 5u16.min(area.height);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width + 2).min(area.width - width),
        area.y + area.height.saturating_sub(height + 1).min(area.height - height),
        width,
        height,
    );

    let text = vec![
        Line::from(Span::styled(
            "🛍  Shop Whisper AI",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: open chat  |  q: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let launcher = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT)),
        )
        .alignment(Alignment::Center);

    f.render_widget(Clear, popup);
    f.render_widget(launcher, popup);
}

fn chat_layout(area: Rect) -> [Rect; 4] {
    let chunks = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(3),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

/// Inner area of the transcript panel (inside its borders).
pub fn transcript_viewport(area: Rect) -> Rect {
    let [_, transcript, _, _] = chat_layout(area);
    Rect {
        x: transcript.x + 1,
        y: transcript.y + 1,
        width: transcript.width.saturating_sub(2),
        height: transcript.height.saturating_sub(2),
    }
}

pub fn render_chat(f: &mut Frame, app: &App) {
    let [header, transcript, input, status] = chat_layout(f.area());

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " 🛍  Shop Whisper AI ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            if app.session.is_awaiting() {
                "searching…"
            } else {
                ""
            },
            Style::default().fg(Color::Gray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .style(Style::default().bg(ACCENT));
    f.render_widget(title, header);

    let viewport = transcript_viewport(f.area());
    let lines = transcript_lines(
        &app.session,
        app.selected_turn.as_deref(),
        app.tick,
        viewport.width,
    );
    let messages = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .scroll((app.scroll, 0));
    f.render_widget(messages, transcript);

    render_input(f, app, input);
    render_status_bar(f, app, status);
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let enabled = app.session.accepts_input();
    let (text, style) = if !enabled {
        (
            "Waiting for the assistant…".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else if app.session.input().is_empty() {
        (
            "Ask about products...".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (app.session.input().to_string(), Style::default())
    };

    let border = if enabled {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(Span::styled(text, style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border),
    );
    f.render_widget(input, area);

    if enabled && app.session.input_focused() {
        let typed = app.session.input().chars().count() as u16;
        let x = (area.x + 1 + typed).min(area.x + area.width.saturating_sub(2));
        f.set_cursor_position((x, area.y + 1));
    }
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help = if app.selected_turn.is_some() {
        " Enter: send | Tab: next product list | Ctrl-E: show more/fewer | PgUp/PgDn: scroll | Esc: close "
    } else {
        " Enter: send | Tab: select product list | PgUp/PgDn: scroll | Esc: close | Ctrl-C: quit "
    };
    let bar = Paragraph::new(help).style(Style::default().fg(Color::Black).bg(Color::DarkGray));
    f.render_widget(bar, area);
}

/// Flattened transcript, one `Line` per terminal row at the given width.
pub fn transcript_lines(
    session: &ChatSession,
    selected: Option<&str>,
    tick: usize,
    width: u16,
) -> Vec<Line<'static>> {
    let width = width.max(10) as usize;
    let bubble_width = (width * 3 / 4).max(8);
    let mut lines = Vec::new();

    for turn in session.turns() {
        let (label, align, color) = match turn.sender {
            Sender::User => ("You", Alignment::Right, ACCENT),
            Sender::Assistant => ("Assistant", Alignment::Left, Color::Cyan),
        };
        lines.push(
            Line::from(Span::styled(
                format!("{}  {}", label, turn.timestamp.format("%H:%M")),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .alignment(align),
        );

        if turn.is_loading {
            lines.push(Line::from(Span::styled(
                loading_dots(tick),
                Style::default().fg(Color::Gray),
            )));
        } else {
            for row in wrap_text(&turn.content, bubble_width) {
                lines.push(Line::from(row).alignment(align));
            }
            product_lines(session, turn, selected == Some(turn.id.as_str()), width, &mut lines);
        }

        lines.push(Line::from(""));
    }

    lines
}

fn product_lines(
    session: &ChatSession,
    turn: &ConversationTurn,
    selected: bool,
    width: usize,
    lines: &mut Vec<Line<'static>>,
) {
    let products = session.visible_products(turn);
    if products.is_empty() {
        return;
    }

    let card_width = width.saturating_sub(4).max(8);
    for product in products {
        lines.push(Line::from(vec![
            Span::styled("  ▸ ", Style::default().fg(ACCENT)),
            Span::styled(
                truncate(&product.name, card_width.saturating_sub(product.price.len() + 2)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(product.price.clone(), Style::default().fg(Color::Green)),
        ]));
        if let Some(ref description) = product.description {
            if !description.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("    {}", truncate(description, card_width)),
                    Style::default().fg(Color::Gray),
                )));
            }
        }
        if !product.link.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("    {}", truncate(&product.link, card_width)),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            )));
        }
    }

    if ChatSession::has_more_products(turn) {
        let label = if session.is_expanded(&turn.id) {
            "Show fewer products".to_string()
        } else {
            format!(
                "Show {} more products",
                session.hidden_product_count(turn)
            )
        };
        let style = if selected {
            Style::default().fg(Color::Black).bg(ACCENT)
        } else {
            Style::default().fg(ACCENT)
        };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("[{}]", label), style),
        ]));
    }
}

fn loading_dots(tick: usize) -> String {
    (0..3)
        .map(|i| if i == tick % 3 { '●' } else { '∙' })
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Greedy word wrap on character counts. Words longer than the width are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    rows.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                rows.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > width {
                rows.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }

        rows.push(current);
    }

    rows
}
