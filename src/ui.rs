use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::app::{App, InputMode, ServiceHealth};
use crate::chats::ChatItem;
use crate::models::SettingsRow;
use crate::types::{Chat, Role};

const SIDEBAR_WIDTH: u16 = 34;
const PREVIEW_WIDTH: usize = 18;
const TYPING_FRAMES: [&str; 4] = ["●∙∙", "∙●∙", "∙∙●", "∙●∙"];

/// Colors of one theme.
#[derive(Clone, Copy, Debug)]
struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    user: Color,
    error: Color,
}

impl Palette {
    fn new(dark: bool) -> Self {
        if dark {
            Self {
                bg: Color::Rgb(17, 24, 39),
                fg: Color::Rgb(243, 244, 246),
                muted: Color::Rgb(156, 163, 175),
                accent: Color::Rgb(129, 140, 248),
                user: Color::Rgb(192, 132, 252),
                error: Color::Rgb(248, 113, 113),
            }
        } else {
            Self {
                bg: Color::Rgb(249, 250, 251),
                fg: Color::Rgb(17, 24, 39),
                muted: Color::Rgb(107, 114, 128),
                accent: Color::Rgb(79, 70, 229),
                user: Color::Rgb(147, 51, 234),
                error: Color::Rgb(220, 38, 38),
            }
        }
    }

    fn base(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }
}

pub fn render(f: &mut Frame, app: &mut App) {
    let palette = Palette::new(app.store.is_dark());
    f.render_widget(Block::default().style(palette.base()), f.area());

    let [sidebar_area, main_area] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .areas(f.area());
    render_sidebar(f, app, &palette, sidebar_area);

    let [status_area, messages_area, input_area, help_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(main_area);
    render_status(f, app, &palette, status_area);
    render_chat_area(f, app, &palette, messages_area);
    f.render_widget(&app.input_textarea, input_area);
    render_help(f, app, help_area);

    if app.settings_open {
        render_settings(f, app, &palette);
    }
}

fn render_sidebar(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::bordered()
        .title("GIA")
        .title_alignment(Alignment::Center)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.accent));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [new_area, list_area, clear_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    f.render_widget(
        Paragraph::new(Line::from(vec!["n".bold(), " New chat".into()]))
            .alignment(Alignment::Center),
        new_area,
    );

    let active = app.store.active_chat_id();
    let selected = app.chat_list.selected_id();
    let mut items: Vec<ListItem> = Vec::new();
    let mut highlighted = None;
    let mut push_section = |title: &'static str, rows: Vec<&ChatItem>| {
        if rows.is_empty() {
            return;
        }
        items.push(ListItem::new(Line::from(
            Span::raw(title).fg(palette.muted).add_modifier(Modifier::BOLD),
        )));
        for row in rows {
            let Some(chat) = app.store.chat(row.chat_id) else {
                continue;
            };
            if Some(row.chat_id) == selected {
                highlighted = Some(items.len());
            }
            items.push(chat_row(chat, Some(chat.id) == active, palette));
        }
    };
    push_section("PINNED CHATS", app.chat_list.pinned().collect());
    push_section("CHATS", app.chat_list.unpinned().collect());

    let list = List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(highlighted);
    f.render_stateful_widget(list, list_area, &mut state);

    f.render_widget(
        Paragraph::new(Line::from(vec!["D".bold(), " Clear all chats".into()]))
            .fg(palette.error),
        clear_area,
    );
}

fn chat_row<'a>(chat: &'a Chat, active: bool, palette: &Palette) -> ListItem<'a> {
    let marker = if chat.pinned { "▲ " } else { "  " };
    let mut spans = vec![
        Span::raw(marker).fg(palette.accent),
        Span::raw(chat.title.as_str()),
    ];
    if let Some(question) = chat.first_question() {
        let preview: String = question.chars().take(PREVIEW_WIDTH).collect();
        spans.push(Span::raw(format!(" · {preview}")).fg(palette.muted));
    }
    let mut line = Line::from(spans);
    if active {
        line = line.fg(palette.accent).add_modifier(Modifier::BOLD);
    }
    ListItem::new(line)
}

fn render_status(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let settings = app.store.settings();
    let mut spans = vec![
        Span::raw(format!(
            " {} · temperature {:.1} · {} theme · ",
            settings.ai_model, settings.temperature, settings.theme
        ))
        .fg(palette.muted),
    ];
    spans.push(match &app.service_health {
        ServiceHealth::Unknown => Span::raw("checking service...").fg(palette.muted),
        ServiceHealth::Ready => Span::raw("service ready").fg(Color::Green),
        ServiceHealth::NotReady(message) => {
            Span::raw(format!("service not ready: {message}")).fg(palette.error)
        }
        ServiceHealth::Unreachable(_) => Span::raw("service unreachable").fg(palette.error),
    });
    if let Some(notice) = &app.notice {
        spans.push(Span::raw(format!(" · {notice}")).fg(palette.error));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_chat_area(f: &mut Frame, app: &mut App, palette: &Palette, area: Rect) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.muted));
    let inner = block.inner(area);
    let chat = app.store.active_chat();
    let has_chat = chat.is_some();
    let empty = chat.is_none_or(|c| c.messages.is_empty());
    if empty && !app.is_loading() {
        f.render_widget(block, area);
        render_welcome(f, has_chat, palette, inner);
        app.fit_scroll(0, inner.height as usize);
        return;
    }

    let title = chat.map_or_else(|| "Chat".to_string(), |c| c.title.clone());
    let width = inner.width.saturating_sub(2).max(10) as usize;
    let lines = message_lines(app, palette, width);
    // The paragraph does no wrapping of its own, so rows equal lines.
    app.fit_scroll(lines.len(), inner.height as usize);

    let messages = Paragraph::new(Text::from(lines))
        .block(block.title(title))
        .scroll((app.vertical_scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(messages, area);
}

/// Rows of the active chat, wrapped to `width` columns.
fn message_lines(app: &App, palette: &Palette, width: usize) -> Vec<Line<'static>> {
    let messages = app
        .store
        .active_chat()
        .map(|c| c.messages.as_slice())
        .unwrap_or_default();
    let mut lines: Vec<Line<'static>> = Vec::new();
    for message in messages {
        let (author, color, alignment) = match message.role {
            Role::User => ("You", palette.user, Alignment::Right),
            Role::Assistant => ("Assistant", palette.accent, Alignment::Left),
        };
        lines.push(
            Line::from(Span::raw(author).fg(color).add_modifier(Modifier::BOLD))
                .alignment(alignment),
        );
        for wrapped in textwrap::wrap(&message.content, width * 4 / 5) {
            lines.push(Line::from(wrapped.into_owned()).alignment(alignment));
        }
        lines.push(Line::default());
    }
    if app.is_loading() {
        let frame = TYPING_FRAMES[app.spinner_tick % TYPING_FRAMES.len()];
        lines.push(Line::from(Span::raw("Assistant").fg(palette.accent).bold()));
        lines.push(Line::from(Span::raw(frame).fg(palette.muted)));
    }
    lines
}

fn render_welcome(f: &mut Frame, has_chat: bool, palette: &Palette, area: Rect) {
    let [_, title_area, tagline_area, cards_area, hint_area, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(4),
        Constraint::Length(2),
        Constraint::Length(5),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(area);

    let title = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(Style::default().fg(palette.accent))
        .lines(vec!["G(eovane)PT".into()])
        .alignment(Alignment::Center)
        .build();
    f.render_widget(title, title_area);

    f.render_widget(
        Paragraph::new("Your intelligent AI assistant, ready to help with any task")
            .alignment(Alignment::Center)
            .fg(palette.muted),
        tagline_area,
    );

    let cards = [
        (
            "Natural Conversations",
            "Chat naturally with advanced language understanding",
        ),
        (
            "Quick Responses",
            "Get instant, accurate answers to your questions",
        ),
        (
            "Customizable",
            "Adjust settings to match your preferences",
        ),
    ];
    let card_areas: [Rect; 3] = Layout::horizontal([Constraint::Max(30); 3])
        .flex(Flex::Center)
        .spacing(1)
        .areas(cards_area);
    for ((title, description), card_area) in cards.into_iter().zip(card_areas) {
        let card = Paragraph::new(description)
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette.muted))
                    .title(Span::raw(title).bold()),
            );
        f.render_widget(card, card_area);
    }

    let hint = if has_chat {
        Line::from(vec!["Press ".into(), "i".bold(), " and ask a question.".into()])
    } else {
        Line::from(vec!["Press ".into(), "n".bold(), " to start a new chat.".into()])
    };
    f.render_widget(Paragraph::new(hint).alignment(Alignment::Center), hint_area);
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let msg: Vec<Span> = match (app.input_mode, app.is_loading()) {
        (InputMode::Editing, true) => vec![
            "Waiting for the answer, ".into(),
            "Esc".bold(),
            " to stop editing".into(),
        ],
        (InputMode::Editing, false) => vec![
            "Press ".into(),
            "Esc".bold(),
            " to stop editing, ".into(),
            "Enter".bold(),
            " to send the question".into(),
        ],
        (InputMode::Normal, _) => vec![
            "q".bold(),
            " quit  ".into(),
            "i".bold(),
            " edit  ".into(),
            "j/k".bold(),
            " move  ".into(),
            "Enter".bold(),
            " open  ".into(),
            "p".bold(),
            " pin  ".into(),
            "s".bold(),
            " settings  ".into(),
            "t".bold(),
            " theme".into(),
        ],
    };
    f.render_widget(Paragraph::new(Line::from(msg)), area);
}

fn render_settings(f: &mut Frame, app: &mut App, palette: &Palette) {
    let area = popup_area(f.area(), 48, 12);
    f.render_widget(Clear, area);
    let block = Block::bordered()
        .title("Settings")
        .title_alignment(Alignment::Center)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.accent))
        .style(palette.base());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [theme_area, _, model_label_area, model_area, _, temperature_area, hint_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

    let row_style = |row: SettingsRow| {
        if app.settings_row == row {
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };

    let theme_label = if app.store.is_dark() { "◐ dark" } else { "☀ light" };
    f.render_widget(
        Paragraph::new(format!("Theme        < {theme_label} >")).style(row_style(SettingsRow::Theme)),
        theme_area,
    );

    f.render_widget(
        Paragraph::new("AI Model").style(row_style(SettingsRow::Model)),
        model_label_area,
    );
    let models: Vec<ListItem> = app.model_list.items.iter().map(ListItem::from).collect();
    let models = List::new(models)
        .highlight_symbol("> ")
        .highlight_style(Style::default().fg(palette.accent));
    f.render_stateful_widget(models, model_area, &mut app.model_list.state);

    let temperature = app.store.settings().temperature;
    let filled = (temperature * 10.0).round().clamp(0.0, 10.0) as usize;
    f.render_widget(
        Paragraph::new(format!(
            "Temperature  [{}{}] {temperature:.1}",
            "#".repeat(filled),
            "-".repeat(10 - filled)
        ))
        .style(row_style(SettingsRow::Temperature)),
        temperature_area,
    );

    f.render_widget(
        Paragraph::new("↑/↓ choose  ←/→ change  Esc close")
            .alignment(Alignment::Center)
            .fg(palette.muted),
        hint_area,
    );
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    area
}
