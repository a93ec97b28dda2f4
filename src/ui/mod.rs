mod dialogs;
pub mod image_cache;
mod page;
mod status_bar;
mod viewer;

use ratatui::{
    prelude::*,
    widgets::Paragraph,
};
use ratatui_image::{Resize, StatefulImage};

use crate::app::{App, AppMode};
use image_cache::{ImageCache, ImageSlot};

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Pick up finished decodes once per frame
    app.images_mut().poll_async_loads();

    if app.mode == AppMode::Viewer {
        viewer::render(frame, app, area);
    } else {
        // Main layout: page + status bar
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        page::render(frame, app, chunks[0]);
        status_bar::render(frame, app, chunks[1]);

        if app.mode == AppMode::Help {
            dialogs::render_help(frame, area);
        }
    }

    if let Some(notice) = app.copy_notice {
        dialogs::render_copy_notice(frame, &notice, area);
    }
}

/// Draw `source` fitted into `area`, or `placeholder` when it cannot be shown.
fn render_image(frame: &mut Frame, images: &mut ImageCache, source: &str, area: Rect, placeholder: Text) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    match images.slot(source) {
        ImageSlot::Ready(protocol) => {
            let image = StatefulImage::new(None).resize(Resize::Fit(None));
            frame.render_stateful_widget(image, area, protocol);
        }
        ImageSlot::Loading => {
            let loading = Paragraph::new("Loading...")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(loading, centered_rect(area, 20, 1));
        }
        ImageSlot::Failed | ImageSlot::Unsupported => {
            let height = placeholder.height() as u16;
            let paragraph = Paragraph::new(placeholder)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, centered_rect(area, area.width, height));
        }
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
