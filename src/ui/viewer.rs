//! Full-screen photo viewer with side previews of the neighbouring photos.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::time::Instant;

use super::render_image;
use crate::app::{App, ViewerLayout};
use crate::carousel::SlideDirection;

const CLOSE_WIDTH: u16 = 5;

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let now = Instant::now();

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Color::Black)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Close button
            Constraint::Min(3),    // Photos
            Constraint::Length(1), // Position indicator
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    let close = Rect::new(
        chunks[0].right().saturating_sub(CLOSE_WIDTH),
        chunks[0].y,
        CLOSE_WIDTH.min(chunks[0].width),
        1,
    );
    frame.render_widget(
        Paragraph::new(" ✕ ")
            .alignment(Alignment::Right)
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        close,
    );

    let state = app.carousel.state();
    let Some(current) = app.carousel.selected_item().cloned() else {
        app.viewer_layout = ViewerLayout { close, ..ViewerLayout::default() };
        return;
    };

    let (previous_area, image_area, next_area) = if app.carousel.has_neighbors() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(20),
                Constraint::Percentage(60),
                Constraint::Percentage(20),
            ])
            .split(chunks[1]);
        (
            Some(side_preview_area(columns[0])),
            columns[1],
            Some(side_preview_area(columns[2])),
        )
    } else {
        (None, chunks[1], None)
    };

    if let (Some(area), Some(item)) = (previous_area, app.carousel.previous_item().cloned()) {
        render_side_preview(frame, app, " ‹ ", &item.source, area);
    }
    if let (Some(area), Some(item)) = (next_area, app.carousel.next_item().cloned()) {
        render_side_preview(frame, app, " › ", &item.source, area);
    }

    // Outgoing photo slides out while the transition runs
    let progress = app.carousel.transition_progress(now);
    let shift = (f32::from(image_area.width) * progress) as u16;
    let slid = match state.slide_direction {
        SlideDirection::None => image_area,
        SlideDirection::Left => Rect {
            width: image_area.width.saturating_sub(shift),
            ..image_area
        },
        SlideDirection::Right => Rect {
            x: image_area.x + shift.min(image_area.width),
            width: image_area.width.saturating_sub(shift),
            ..image_area
        },
    };
    let placeholder = Text::from(current.file_name());
    render_image(frame, app.images_mut(), &current.source, slid, placeholder);

    if let Some(label) = app.carousel.position_label() {
        let indicator = Paragraph::new(format!(" {} ", label))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::White));
        frame.render_widget(indicator, chunks[2]);
    }

    let hints = if app.carousel.has_neighbors() {
        "h/←:previous  l/→:next  drag:swipe  Esc/q:close"
    } else {
        "Esc/q:close"
    };
    frame.render_widget(
        Paragraph::new(hints)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );

    app.viewer_layout = ViewerLayout {
        image: image_area,
        previous: previous_area,
        next: next_area,
        close,
    };
}

/// Middle three fifths of a side column.
fn side_preview_area(column: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(column)[1]
}

fn render_side_preview(frame: &mut Frame, app: &mut App, title: &str, source: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title.to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    render_image(frame, app.images_mut(), source, inner, Text::from(""));
}
