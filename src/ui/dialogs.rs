use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::share::clipboard::CopyNotice;

pub fn render_help(frame: &mut Frame, area: Rect) {
    // Center the help dialog
    let dialog_width = 56.min(area.width.saturating_sub(4));
    let dialog_height = 27.min(area.height.saturating_sub(4));

    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;

    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    // Clear the area behind the dialog
    frame.render_widget(Clear, dialog_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)))
    };

    let help_text = vec![
        section("Page"),
        Line::from(""),
        Line::from("  j / ↓          Scroll down"),
        Line::from("  k / ↑          Scroll up"),
        Line::from("  g / G          Top / bottom"),
        Line::from("  Tab / S-Tab    Next / previous item"),
        Line::from("  Enter / click  Open photo, press button"),
        Line::from(""),
        section("Actions"),
        Line::from(""),
        Line::from("  s              Share invitation"),
        Line::from("  c              Copy invitation link"),
        Line::from("  m              Music on / off"),
        Line::from("  1 / 2 / 3      Kakao Map / Naver Map / TMap"),
        Line::from(""),
        section("Photo viewer"),
        Line::from(""),
        Line::from("  h / ←          Previous photo"),
        Line::from("  l / →          Next photo"),
        Line::from("  drag           Swipe between photos"),
        Line::from("  Esc / q        Close"),
        Line::from(""),
        Line::from("  ?              Show this help"),
        Line::from("  q              Quit"),
        Line::from(""),
        Line::from(Span::styled("Press Esc to close", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, dialog_area);
}

/// Toast near the bottom of the screen confirming a copy.
pub fn render_copy_notice(frame: &mut Frame, notice: &CopyNotice, area: Rect) {
    let message = notice.message();
    let width = (Line::from(message).width() as u16 + 6).min(area.width);
    let height = 3.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.bottom().saturating_sub(height + 2).max(area.y);
    let toast_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, toast_area);
    let paragraph = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(paragraph, toast_area);
}
