use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
};

use shallowseek::state::{VIDEO_LIMIT_TEXT, VIDEO_LIMIT_TITLE};
use shallowseek::{Modality, Phase, Progress, Sender};

use crate::app::{App, InputMode};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let fact_height = if app.session.fun_fact().is_some() { 4 } else { 0 };

    let [header_area, tabs_area, chat_area, fact_area, input_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(fact_height),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(frame, header_area);
    render_tabs(app, frame, tabs_area);
    render_chat(app, frame, chat_area);
    if fact_height > 0 {
        render_fun_fact(app, frame, fact_area);
    }
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.show_video_notice() {
        render_video_notice(frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" ShallowSeek ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let titles: Vec<Line> = Modality::all()
        .iter()
        .enumerate()
        .map(|(i, m)| Line::from(format!(" {} {} ", i + 1, m.display_name())))
        .collect();

    let selected = Modality::all()
        .iter()
        .position(|m| *m == app.modality())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Modality "),
        )
        .select(selected)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area and inner size for scroll calculations and mouse hit-testing
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", app.modality().display_name()));

    let transcript = app.session.transcript();
    let chat_text = if transcript.is_empty() && !app.session.is_generating() {
        Text::from(Span::styled(
            app.modality().placeholder(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in transcript {
            match msg.sender {
                Sender::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                }
                Sender::Model => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                }
            }
            for line in msg.text.lines() {
                lines.push(Line::from(line.to_string()));
            }
            if let Some(url) = &msg.image_url {
                lines.push(Line::from(Span::styled(
                    "[image]",
                    Style::default().fg(Color::Magenta),
                )));
                lines.push(Line::from(Span::styled(
                    url.clone(),
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                )));
            }
            lines.push(Line::default());
        }

        if let Phase::Generating {
            modality, progress, ..
        } = app.session.phase()
        {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!(
                    "Generating your {}{}{}",
                    modality,
                    dots,
                    progress_suffix(progress)
                ),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn progress_suffix(progress: &Progress) -> String {
    match progress {
        Progress::Submitting => String::new(),
        Progress::Polling { attempt: 0, .. } => "  (job queued)".to_string(),
        Progress::Polling {
            attempt, status, ..
        } => match status {
            Some(status) => format!("  (check {}: {})", attempt, status.as_str()),
            None => format!("  (check {})", attempt),
        },
    }
}

fn render_fun_fact(app: &App, frame: &mut Frame, area: Rect) {
    let Some(fact) = app.session.fun_fact() else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Fun Fact ");

    let paragraph = Paragraph::new(fact)
        .style(Style::default().fg(Color::LightBlue))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if app.session.is_generating() {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };

    let title = if app.session.is_generating() {
        " Generating... "
    } else if app.session.can_submit() {
        " Prompt (Enter to generate) "
    } else {
        " Prompt "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Keep the cursor visible with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.prompt_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let prompt = app.session.prompt();
    let input = if prompt.is_empty() {
        Paragraph::new(Span::styled(
            app.modality().placeholder(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let visible_text: String = prompt.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(block), area);

    if editing && !app.show_video_notice() {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if app.show_video_notice() {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" OK ", label_style),
        ]
    } else {
        match app.input_mode {
            InputMode::Normal => {
                let mut hints = vec![
                    Span::styled(" 1-4/Tab ", key_style),
                    Span::styled(" modality ", label_style),
                    Span::styled(" i ", key_style),
                    Span::styled(" type ", label_style),
                    Span::styled(" j/k ", key_style),
                    Span::styled(" scroll ", label_style),
                ];
                if app.session.is_generating() {
                    hints.extend(vec![
                        Span::styled(" x ", key_style),
                        Span::styled(" cancel ", label_style),
                    ]);
                }
                hints.extend(vec![
                    Span::styled(" q ", key_style),
                    Span::styled(" quit ", label_style),
                ]);
                hints
            }
            InputMode::Editing => vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" generate ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" stop typing ", label_style),
            ],
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_video_notice(frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = area.width.saturating_sub(4).min(56);
    let popup_height = area.height.saturating_sub(2).min(7);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} ", VIDEO_LIMIT_TITLE));

    let body = Text::from(vec![
        Line::from(VIDEO_LIMIT_TEXT),
        Line::default(),
        Line::from(Span::styled(
            "Press Enter to close",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let paragraph = Paragraph::new(body).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shallowseek::JobStatus;

    #[test]
    fn test_progress_suffix() {
        assert_eq!(progress_suffix(&Progress::Submitting), "");
        assert_eq!(
            progress_suffix(&Progress::Polling {
                job_id: "j".to_string(),
                attempt: 0,
                status: None
            }),
            "  (job queued)"
        );
        assert_eq!(
            progress_suffix(&Progress::Polling {
                job_id: "j".to_string(),
                attempt: 4,
                status: Some(JobStatus::Rendering)
            }),
            "  (check 4: rendering)"
        );
    }
}
