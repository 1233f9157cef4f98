//! TUI rendering with Ratatui

use crate::app::App;
use crate::command::Mode;
use crate::help;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Height of the caption panel, borders included
const CAPTION_HEIGHT: u16 = 5;

/// Draw the complete UI
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.size();
    let show_caption = app.config.display.show_caption && app.mode != Mode::Help;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),                                         // Outline
            Constraint::Length(if show_caption { CAPTION_HEIGHT } else { 0 }), // Caption
            Constraint::Length(1),                                      // Status bar
            Constraint::Length(1),                                      // Command/input line
        ])
        .split(size);

    app.set_viewport_size(chunks[0].width.saturating_sub(1), chunks[0].height);

    if app.config.display.show_outline {
        draw_outline(frame, app, chunks[0]);
    }
    if show_caption {
        draw_caption(frame, app, chunks[1]);
    }
    draw_status_bar(frame, app, chunks[2]);
    draw_command_line(frame, app, chunks[3]);

    if app.mode == Mode::Help {
        draw_help(frame, size);
    }
}

fn draw_outline(frame: &mut Frame, app: &App, area: Rect) {
    let outline = &app.outline;

    // Split content area for scrollbar
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let current = app.current_element().and_then(|el| outline.entry_of(el));

    let lines: Vec<Line> = outline
        .visible_rows()
        .iter()
        .map(|row| {
            if Some(row.entry) == current {
                Line::from(Span::styled(
                    row.text.clone(),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                style_outline_row(&row.text)
            }
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::NONE));
    frame.render_widget(paragraph, content_chunks[0]);

    // Render scrollbar
    let scrollbar = Scrollbar::default()
        .orientation(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"));

    let mut scrollbar_state =
        ScrollbarState::new(outline.total_rows()).position(outline.scroll_offset());

    frame.render_stateful_widget(scrollbar, content_chunks[1], &mut scrollbar_state);
}

/// Dim the tag column, colour headings
fn style_outline_row(text: &str) -> Line<'static> {
    let split = text
        .char_indices()
        .find(|&(i, c)| i > 0 && c == ' ')
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let (tag, rest) = text.split_at(split);

    let rest_style = if rest.trim_start().starts_with("heading level") {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(tag.to_string(), Style::default().fg(Color::DarkGray)),
        Span::styled(rest.to_string(), rest_style),
    ])
}

fn draw_caption(frame: &mut Frame, app: &App, area: Rect) {
    let text = match &app.caption {
        Some(caption) if caption.text.is_empty() => "(no description)".to_string(),
        Some(caption) => caption.text.clone(),
        None => String::new(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Caption ")
        .border_style(Style::default().fg(Color::White));

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_style = match app.mode {
        Mode::Normal if app.is_text_editing() => Style::default().fg(Color::Magenta),
        Mode::Normal => Style::default().fg(Color::Green),
        Mode::Command => Style::default().fg(Color::Yellow),
        Mode::Help => Style::default().fg(Color::Cyan),
    };
    let indicator = if app.mode == Mode::Normal && app.is_text_editing() {
        "EDITING"
    } else {
        app.mode.indicator()
    };

    let mode_span = Span::styled(
        format!(" {} ", indicator),
        mode_style.add_modifier(Modifier::BOLD),
    );

    let url = app
        .page
        .as_ref()
        .map(|p| p.url.to_string())
        .unwrap_or_else(|| "about:blank".to_string());
    let url_span = Span::styled(format!(" {} ", url), Style::default().fg(Color::Blue));

    let position = app
        .reader
        .as_ref()
        .map(|reader| {
            let index = reader.index();
            match index.cursor() {
                Some(i) => format!(" {}/{} ", i + 1, index.len()),
                None => format!(" -/{} ", index.len()),
            }
        })
        .unwrap_or_default();
    let position_span = Span::styled(position, Style::default().fg(Color::DarkGray));

    let loading_span = if app.loading {
        Span::styled(" Loading... ", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("")
    };

    let status = Paragraph::new(Line::from(vec![mode_span, url_span, loading_span, position_span]))
        .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(status, area);
}

fn draw_command_line(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.mode {
        Mode::Command => format!(":{}", app.input),
        _ => app.status.clone().unwrap_or_default(),
    };

    let style = match app.mode {
        Mode::Command => Style::default().fg(Color::White),
        _ => Style::default().fg(Color::DarkGray),
    };

    let paragraph = Paragraph::new(content).style(style);
    frame.render_widget(paragraph, area);

    // Show cursor in command mode
    if app.mode == Mode::Command {
        let cursor_x = area.x + app.input.width() as u16 + 1; // +1 for :
        frame.set_cursor(cursor_x, area.y);
    }
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = help::lines()
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                Line::from(Span::styled(line, Style::default().add_modifier(Modifier::BOLD)))
            } else {
                Line::from(line)
            }
        })
        .collect();

    let width = lines.iter().map(|l| l.width() as u16).max().unwrap_or(0) + 4;
    let height = lines.len() as u16 + 2;
    let popup = centered(area, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help (any key to close) ")
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// A rectangle of at most `width` x `height`, centred in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
