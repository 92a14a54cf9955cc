use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
};

use emd_core::{Sender, Theme, TurnPhase};
use crate::app::{App, Focus};

/// Colors for one display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub user: Color,
    pub bot: Color,
    pub bar_bg: Color,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            bg: Color::Black,
            fg: Color::White,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            user: Color::LightBlue,
            bot: Color::LightGreen,
            bar_bg: Color::DarkGray,
        },
        Theme::Light => Palette {
            bg: Color::White,
            fg: Color::Black,
            muted: Color::Gray,
            accent: Color::Blue,
            user: Color::Blue,
            bot: Color::Green,
            bar_bg: Color::Gray,
        },
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let colors = palette(app.theme);

    frame.render_widget(Block::default().style(Style::default().bg(colors.bg).fg(colors.fg)), area);

    // Main layout: header, body, input, footer
    let [header_area, body_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let [chat_area, quick_area] = Layout::horizontal([
        Constraint::Min(30),
        Constraint::Length(44),
    ])
    .areas(body_area);

    render_header(app, frame, header_area, colors);
    render_chat(app, frame, chat_area, colors);
    render_quick_replies(app, frame, quick_area, colors);
    render_input(app, frame, input_area, colors);
    render_footer(app, frame, footer_area, colors);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, colors: Palette) {
    let status = if app.controller.is_listening() {
        " [дуу сонсож байна]"
    } else if app.controller.is_loading() {
        " [хүлээж байна]"
    } else {
        ""
    };

    let title = Line::from(vec![
        Span::styled(" ЭМД туслах ", Style::default().fg(colors.accent).bold()),
        Span::styled(status, Style::default().fg(colors.fg)),
        Span::raw(" "),
        Span::styled(
            format!("{} · v{}", app.theme.attribute(), env!("CARGO_PKG_VERSION")),
            Style::default().fg(colors.muted),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(colors.bar_bg));
    frame.render_widget(header, area);
}

/// Thread as display lines: sender label, wrapped text, blank separator.
fn chat_lines(app: &App, colors: Palette) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for msg in app.controller.messages() {
        let color = match msg.sender {
            Sender::User => colors.user,
            Sender::Bot => colors.bot,
        };
        let time = msg.timestamp.with_timezone(&Local).format("%H:%M").to_string();
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}:", App::sender_label(msg.sender)),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {}", time), Style::default().fg(colors.muted)),
        ]));
        for line in msg.text.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }

    if app.controller.phase() == TurnPhase::Sending {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("{}:", App::sender_label(Sender::Bot)),
            Style::default().fg(colors.bot).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("Бичиж байна{}", dots),
            Style::default().fg(colors.muted).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

/// Unbordered thread paragraph, wrapped the same way for drawing and for
/// measuring.
fn chat_paragraph(app: &App, colors: Palette) -> Paragraph<'static> {
    Paragraph::new(chat_lines(app, colors)).wrap(Wrap { trim: false })
}

/// Rows the thread occupies when wrapped to `width` columns.
pub fn chat_line_count(app: &App, width: u16) -> u16 {
    let count = chat_paragraph(app, palette(app.theme)).line_count(width);
    u16::try_from(count).unwrap_or(u16::MAX)
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect, colors: Palette) {
    app.chat_area = Some(area);

    let block = Block::default()
        .title(" Чат ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.muted));
    let inner = block.inner(area);
    let resized = (inner.width, inner.height) != (app.chat_width, app.chat_height);
    app.chat_height = inner.height;
    app.chat_width = inner.width;
    if resized {
        app.scroll_chat_to_bottom();
    }

    let total = app.total_chat_lines();
    let chat = chat_paragraph(app, colors)
        .block(block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);

    if total > app.chat_height {
        let mut state = ScrollbarState::new(total.saturating_sub(app.chat_height) as usize)
            .position(app.chat_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }
}

fn render_quick_replies(app: &mut App, frame: &mut Frame, area: Rect, colors: Palette) {
    app.quick_area = Some(area);

    let focused = app.focus == Focus::QuickReplies;
    let category = app.controller.navigator().current();

    let items: Vec<ListItem> = app
        .controller
        .navigator()
        .questions()
        .iter()
        .map(|q| {
            let style = if q.is_back() {
                Style::default().fg(colors.muted)
            } else {
                Style::default().fg(colors.fg)
            };
            ListItem::new(Line::from(Span::styled(q.text.clone(), style)))
        })
        .collect();

    let border = if focused { colors.accent } else { colors.muted };
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" {} ", category.display_name()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
        .highlight_style(
            Style::default()
                .fg(colors.bg)
                .bg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.quick_state);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, colors: Palette) {
    let focused = app.focus == Focus::Input;
    let border = if focused { colors.accent } else { colors.muted };

    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(colors.fg))
        .block(
            Block::default()
                .title(" Асуултаа бичнэ үү ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
    frame.render_widget(input, area);

    if focused {
        // Cursor by character count; Cyrillic is single-width
        let x = area.x + 1 + app.cursor as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, colors: Palette) {
    let key_style = Style::default().bg(colors.bar_bg).fg(colors.fg);
    let label_style = Style::default().bg(colors.bg).fg(colors.fg);

    let mut hints = match app.focus {
        Focus::Input => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" илгээх ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" арилгах ", label_style),
        ],
        Focus::QuickReplies => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" сонгох ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" асуух ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" гарах ", label_style),
        ],
    };

    hints.extend(vec![
        Span::styled(" Tab ", key_style),
        Span::styled(" шилжих ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" гүйлгэх ", label_style),
        Span::styled(" ^R ", key_style),
        Span::styled(" дуу ", label_style),
        Span::styled(" ^T ", key_style),
        Span::styled(" горим ", label_style),
        Span::styled(" ^C ", key_style),
        Span::styled(" гарах ", label_style),
    ]);

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
