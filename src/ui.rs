use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::{App, Screen};
use crate::chat::ChatEntry;
use crate::render;

pub fn render(app: &mut App, frame: &mut Frame) {
    match app.screen {
        Screen::Cover => render_cover(frame, frame.area()),
        Screen::Chat => render_chat(app, frame, frame.area()),
    }
}

fn render_cover(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Text Analyzer ");

    let lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "Text Analyzer AI",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("Chat with a bot that analyzes your texts:"),
        Line::from("keywords, named entities, sentiment, and a generated image."),
        Line::default(),
        Line::from(Span::styled(
            "Press Enter to start chatting, q to quit.",
            Style::default().fg(Color::Yellow),
        )),
    ];

    let cover = Paragraph::new(Text::from(lines))
        .block(block)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(cover, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area, status_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_status(app, frame, status_area);
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let mut lines: Vec<Line> = Vec::new();

    for entry in app.transcript.entries() {
        match entry {
            ChatEntry::User(text) => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in text.lines() {
                    lines.push(Line::from(line.to_string()));
                }
                lines.push(Line::default());
            }
            ChatEntry::Bot(text) => {
                lines.push(Line::from(Span::styled(
                    "Bot:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                for line in text.lines() {
                    lines.push(Line::from(line.to_string()));
                }
                lines.push(Line::default());
            }
            ChatEntry::Analysis(result) => {
                lines.push(Line::from(Span::styled(
                    "Analysis:",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )));
                lines.push(labeled_line("Nouns", render::nouns_line(result)));
                lines.push(labeled_line("Keywords", render::keywords_line(result)));
                lines.push(labeled_line(
                    "Named entities",
                    render::entities_line(result),
                ));
                lines.push(labeled_line("Sentiment", render::sentiment_line(result)));
                if result.image_path.is_some() {
                    lines.push(Line::from(Span::styled(
                        "[generated image saved to cache]",
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                if result.audio_path.is_some() {
                    lines.push(Line::from(Span::styled(
                        "[spoken summary available]",
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                lines.push(Line::default());
            }
        }
    }

    if app.composing {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let chat_text = if lines.is_empty() {
        Text::from(Span::styled(
            "Say hello to get started...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn labeled_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ])
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.busy() {
        Color::DarkGray
    } else {
        Color::Yellow
    };
    let title = if app.busy() {
        " Waiting for the bot... "
    } else {
        " Message (Enter to send) "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible in a narrow box.
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    if !app.busy() {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let tts = if app.tts_enabled { "TTS: ON" } else { "TTS: OFF" };

    let status = Line::from(vec![
        Span::styled(
            tts,
            Style::default()
                .fg(if app.tts_enabled { Color::Green } else { Color::Red })
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  Ctrl+T toggle TTS  |  Ctrl+R reset  |  Ctrl+C quit"),
    ]);

    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
