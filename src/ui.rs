use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use smartdoc_core::{ConfigField, EmergencyStep, QuickAction, Sender, StatusKind, TextField};
use smartdoc_core::session::{EMERGENCY_CONFIRM_PROMPT, EMERGENCY_REASON_PROMPT};
use crate::app::App;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str, base: Style) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if end == 0 {
            // "****" is literal
            spans.push(Span::styled(rest[..start + 4].to_string(), base));
            rest = &after[2..];
            continue;
        }
        if start > 0 {
            spans.push(Span::styled(rest[..start].to_string(), base));
        }
        spans.push(Span::styled(after[..end].to_string(), base.add_modifier(Modifier::BOLD)));
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), base));
    }

    Line::from(spans)
}

fn status_color(kind: StatusKind) -> Color {
    let (r, g, b) = kind.rgb();
    Color::Rgb(r, g, b)
}

/// Build every transcript line, including the "thinking" placeholder.
fn chat_lines(app: &App) -> Vec<Line<'static>> {
    let transcript = app.session.transcript();
    let mut lines: Vec<Line> = Vec::new();

    for msg in transcript.messages() {
        let (label, color) = match msg.sender {
            Sender::User => ("Vous:", Color::Cyan),
            Sender::Assistant if msg.is_error => ("SmartDoc:", Color::Red),
            Sender::Assistant => ("SmartDoc:", Color::Yellow),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));

        let body = if msg.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        for para in msg.paragraphs() {
            lines.push(parse_markdown_line(para, body));
        }
        lines.push(Line::default());
    }

    if transcript.is_loading() {
        lines.push(Line::from(Span::styled(
            "SmartDoc:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Je réfléchis{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

/// Rows the transcript needs once wrapped to `width`.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let total: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    u16::try_from(total).unwrap_or(u16::MAX)
}

pub fn max_chat_scroll(app: &App) -> u16 {
    wrapped_height(&chat_lines(app), app.chat_width).saturating_sub(app.chat_height)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, chat_area, actions_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_quick_actions(frame, actions_area);
    render_input(app, frame, input_area);
    render_footer(frame, footer_area);

    if app.session.config_dialog.is_open() {
        render_config_dialog(app, frame, area);
    } else if app.session.emergency_dialog.is_open() {
        render_emergency_dialog(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = app.session.status().current();

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " 🏥 SmartDoc Assistant ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("● ", Style::default().fg(status_color(status.kind))),
        Span::styled(status.label.clone(), Style::default().fg(status_color(status.kind))),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", app.session.config().user_id)),
    );

    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversation ");

    let text = if app.session.transcript().is_empty() && !app.session.transcript().is_loading() {
        Text::from(Span::styled(
            "Posez votre question à SmartDoc...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(chat_lines(app))
    };

    let max_scroll = wrapped_height(&text.lines, app.chat_width).saturating_sub(app.chat_height);
    app.chat_scroll = if app.follow_tail {
        max_scroll
    } else {
        app.chat_scroll.min(max_scroll)
    };

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_quick_actions(frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    for (i, action) in QuickAction::all().iter().enumerate() {
        spans.push(Span::styled(
            format!(" F{} ", i + 1),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ));
        spans.push(Span::raw(format!(" {}  ", action.display_name())));
    }
    spans.push(Span::styled(
        " Ctrl+E ",
        Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled(" 🚨 URGENCE", Style::default().fg(Color::Red)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw `field` on a single row with horizontal scrolling and, if asked, the cursor.
fn render_text_field(frame: &mut Frame, field: &TextField, area: Rect, style: Style, show_cursor: bool) {
    let width = area.width as usize;
    let cursor = field.cursor();

    // Scroll offset that keeps the cursor visible
    let offset = if width == 0 {
        0
    } else if cursor >= width {
        cursor - width + 1
    } else {
        0
    };

    let visible: String = field.value().chars().skip(offset).take(width).collect();
    frame.render_widget(Paragraph::new(visible).style(style), area);

    if show_cursor {
        frame.set_cursor_position((area.x + (cursor - offset) as u16, area.y));
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let busy = app.session.is_pending();
    let border_color = if busy { Color::DarkGray } else { Color::Yellow };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(if busy { " Message (en attente de réponse) " } else { " Message " });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let dialog_open = app.session.config_dialog.is_open() || app.session.emergency_dialog.is_open();
    render_text_field(
        frame,
        &app.session.input,
        inner,
        Style::default().fg(Color::Cyan),
        !dialog_open,
    );
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        " Enter envoyer · Ctrl+O configuration · F5 tester la connexion · PgUp/PgDn défiler · Ctrl+Q quitter",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

/// Centered popup rectangle, clamped to the screen.
fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_config_dialog(app: &App, frame: &mut Frame, area: Rect) {
    let dialog = &app.session.config_dialog;
    let popup_area = popup_rect(area, 70, 12);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" ⚙️ Configuration (Enter sauvegarder, Tab changer de champ, Esc annuler) ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [notice_area, url_label, url_area, _, user_label, user_area, _, error_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    if let Some(notice) = &dialog.notice {
        frame.render_widget(
            Paragraph::new(notice.as_str()).style(Style::default().fg(Color::Yellow)),
            notice_area,
        );
    }

    let label_style = |field: ConfigField| {
        if dialog.focus == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    frame.render_widget(
        Paragraph::new("URL de l'API").style(label_style(ConfigField::ApiUrl)),
        url_label,
    );
    render_text_field(
        frame,
        &dialog.api_url,
        url_area,
        Style::default().fg(Color::Cyan),
        dialog.focus == ConfigField::ApiUrl,
    );

    frame.render_widget(
        Paragraph::new("ID utilisateur").style(label_style(ConfigField::UserId)),
        user_label,
    );
    render_text_field(
        frame,
        &dialog.user_id,
        user_area,
        Style::default().fg(Color::Cyan),
        dialog.focus == ConfigField::UserId,
    );

    if let Some(err) = &dialog.error {
        frame.render_widget(
            Paragraph::new(format!("⚠️ {}", err))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true }),
            error_area,
        );
    }
}

fn render_emergency_dialog(app: &App, frame: &mut Frame, area: Rect) {
    let dialog = &app.session.emergency_dialog;
    let popup_area = popup_rect(area, 64, 12);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .title(" 🚨 URGENCE ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    match dialog.step() {
        EmergencyStep::Confirming => {
            let mut lines: Vec<Line> = EMERGENCY_CONFIRM_PROMPT.lines().map(Line::from).collect();
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "[O]ui / Enter    [N]on / Esc",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        }
        EmergencyStep::EnteringReason => {
            let [prompt_area, input_area, help_area] = Layout::vertical([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .areas(inner);

            let lines: Vec<Line> = EMERGENCY_REASON_PROMPT.lines().map(Line::from).collect();
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), prompt_area);
            render_text_field(frame, &dialog.reason, input_area, Style::default().fg(Color::Cyan), true);
            frame.render_widget(
                Paragraph::new("\nEnter envoyer l'alerte · Esc annuler")
                    .style(Style::default().fg(Color::DarkGray)),
                help_area,
            );
        }
        EmergencyStep::Closed => {}
    }
}
