use ratatui::{
    prelude::*,
    widgets::Paragraph,
};

use crate::app::App;
use crate::calendar::dday_label;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    // If there's a status message, show it prominently
    if let Some(ref message) = app.status_message {
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", message),
                Style::default().fg(Color::Yellow).bg(Color::DarkGray),
            ),
        ]);
        let paragraph = Paragraph::new(line);
        frame.render_widget(paragraph, area);
        return;
    }

    let mut spans = Vec::new();

    // Left: countdown and couple
    spans.push(Span::styled(
        format!(" {} ", dday_label(app.today, app.invitation.wedding_date)),
        Style::default().fg(Color::White).bg(Color::DarkGray),
    ));
    spans.push(Span::styled(
        format!(" {} ", app.invitation.couple_title()),
        Style::default().fg(Color::Gray),
    ));

    // Music indicator
    let music = if app.music.is_muted() { " ♪ off " } else { " ♪ on " };
    spans.push(Span::styled(music, Style::default().fg(Color::Cyan)));

    // Calculate remaining space and add spacing
    let content_width: usize = spans.iter().map(|s| s.width()).sum();
    let position = format!("{}/{}", app.scroll + 1, app.page_blocks().len());
    let help_text = format!(" {} | Tab:select s:share c:copy ?:help q:quit ", position);
    let help_width = help_text.len();

    let available = area.width as usize;
    if available > content_width + help_width {
        let spacing = " ".repeat(available - content_width - help_width);
        spans.push(Span::raw(spacing));
    }

    // Right: help hints
    spans.push(Span::styled(
        help_text,
        Style::default().fg(Color::White).bg(Color::DarkGray),
    ));

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line);
    frame.render_widget(paragraph, area);
}
