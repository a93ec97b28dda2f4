//! The invitation page: a column of blocks scrolled one block at a time.

use chrono::Datelike;
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
};

use super::render_image;
use crate::app::{App, Focus, PageBlock, GALLERY_COLUMNS};
use crate::calendar::{dday_label, MonthGrid, WEEKDAY_LABELS};
use crate::invitation::Side;
use crate::maps::MapProvider;

/// Widest the page column gets on large terminals
const PAGE_WIDTH: u16 = 72;
const THUMBNAIL_HEIGHT: u16 = 9;
const MAP_HEIGHT: u16 = 12;
const BUTTON_HEIGHT: u16 = 3;
const ACCOUNT_ROW_HEIGHT: u16 = 3;

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
}

fn muted(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(Color::DarkGray)))
        .alignment(Alignment::Center)
}

/// Rows `lines` occupy once wrapped to `width`.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width) as u16)
        .sum()
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let width = area.width.min(PAGE_WIDTH);
    let column = Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height);

    app.hit_areas.clear();
    let blocks = app.page_blocks();
    app.scroll = app.scroll.min(blocks.len().saturating_sub(1));

    let mut y = column.y;
    let mut fully_visible = 0;
    for block in blocks.iter().skip(app.scroll) {
        if y >= column.bottom() {
            break;
        }
        let wanted = block_height(app, *block, column.width, column.height);
        let height = wanted.min(column.bottom() - y);
        let rect = Rect::new(column.x, y, column.width, height);
        if height == wanted {
            fully_visible += 1;
        }

        render_block(frame, app, *block, rect);
        y += height;
    }
    app.visible_blocks = fully_visible.max(1);
}

fn block_height(app: &App, block: PageBlock, width: u16, viewport: u16) -> u16 {
    match block {
        PageBlock::Hero => viewport.clamp(10, 24),
        PageBlock::Greeting => wrapped_height(&greeting_lines(app), width) + 1,
        PageBlock::Calendar => {
            let grid = MonthGrid::for_date(app.invitation.wedding_date);
            grid.weeks.len() as u16 + 8
        }
        PageBlock::GalleryHeader => 4,
        PageBlock::GalleryRow(_) => THUMBNAIL_HEIGHT,
        PageBlock::Location => wrapped_height(&location_lines(app), width) + MAP_HEIGHT + BUTTON_HEIGHT + 2,
        PageBlock::Directions => wrapped_height(&direction_lines(app), width.saturating_sub(4)) + 1,
        PageBlock::AccountsHeader => 4,
        PageBlock::Accounts(side) => {
            if app.active_accordion == Some(side) {
                BUTTON_HEIGHT + ACCOUNT_ROW_HEIGHT * 3 + 1
            } else {
                BUTTON_HEIGHT + 1
            }
        }
        PageBlock::Footer => BUTTON_HEIGHT + 3,
    }
}

fn render_block(frame: &mut Frame, app: &mut App, block: PageBlock, area: Rect) {
    match block {
        PageBlock::Hero => render_hero(frame, app, area),
        PageBlock::Greeting => {
            let paragraph = Paragraph::new(greeting_lines(app)).wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        PageBlock::Calendar => render_calendar(frame, app, area),
        PageBlock::GalleryHeader => {
            let lines = vec![
                Line::from(""),
                heading("GALLERY"),
                muted("사진을 선택하시면 확대해서 보실 수 있습니다"),
            ];
            frame.render_widget(Paragraph::new(lines), area);
        }
        PageBlock::GalleryRow(row) => render_gallery_row(frame, app, row, area),
        PageBlock::Location => render_location(frame, app, area),
        PageBlock::Directions => {
            let paragraph = Paragraph::new(direction_lines(app))
                .wrap(Wrap { trim: false })
                .block(Block::default().padding(Padding::horizontal(2)));
            frame.render_widget(paragraph, area);
        }
        PageBlock::AccountsHeader => {
            let lines = vec![
                Line::from(""),
                heading("마음 전하실 곳"),
                muted("참석이 어려우신 분들을 위해 계좌번호를 기재하였습니다."),
            ];
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
        }
        PageBlock::Accounts(side) => render_accounts(frame, app, side, area),
        PageBlock::Footer => render_footer(frame, app, area),
    }
}

fn render_hero(frame: &mut Frame, app: &mut App, area: Rect) {
    let invitation = &app.invitation;
    let caption = vec![
        Line::from(Span::styled(
            "W E D D I N G   I N V I T A T I O N",
            Style::default().fg(Color::Gray),
        ))
        .alignment(Alignment::Center),
        Line::from(Span::styled(
            invitation.couple_title(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(invitation.date_label.clone()).alignment(Alignment::Center),
        Line::from(format!("{} · {}", invitation.time_label, invitation.venue)).alignment(Alignment::Center),
    ];
    let caption_height = caption.len() as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(caption_height)])
        .split(area);

    let hero = app.locator.hero();
    let placeholder = Text::from(vec![
        Line::from(Span::styled("이미지 없음", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("public/images/main.jpg 파일을 넣어주세요."),
    ]);
    render_image(frame, app.images_mut(), &hero, chunks[0], placeholder);
    frame.render_widget(Paragraph::new(caption), chunks[1]);
}

fn greeting_lines(app: &App) -> Vec<Line<'static>> {
    let invitation = &app.invitation;
    let mut lines = vec![Line::from(""), heading("초대합니다"), muted("───"), Line::from("")];
    lines.extend(
        invitation
            .greeting
            .iter()
            .map(|text| Line::from(text.clone()).alignment(Alignment::Center)),
    );
    lines.push(Line::from(""));
    for side in [Side::Groom, Side::Bride] {
        lines.push(Line::from(invitation.parents_line(side)).alignment(Alignment::Center));
    }
    lines
}

fn render_calendar(frame: &mut Frame, app: &App, area: Rect) {
    let wedding = app.invitation.wedding_date;
    let grid = MonthGrid::for_date(wedding);

    let cell = |text: String, style: Style| Span::styled(format!("{:^5}", text), style);

    let mut lines = vec![
        Line::from(""),
        heading(&grid.month_title()),
        muted(&grid.english_caption()),
        Line::from(""),
    ];

    let labels: Vec<Span> = WEEKDAY_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let style = if i == 0 {
                Style::default().fg(Color::LightRed)
            } else {
                Style::default().fg(Color::Gray)
            };
            // Hangul labels are double width
            Span::styled(format!(" {:^3}", label), style)
        })
        .collect();
    lines.push(Line::from(labels).alignment(Alignment::Center));

    for week in &grid.weeks {
        let days: Vec<Span> = week
            .iter()
            .map(|day| {
                let style = if day.is_wedding_day {
                    Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD)
                } else if !day.in_month {
                    Style::default().fg(Color::DarkGray)
                } else if day.is_sunday {
                    Style::default().fg(Color::LightRed)
                } else {
                    Style::default()
                };
                cell(day.date.day().to_string(), style)
            })
            .collect();
        lines.push(Line::from(days).alignment(Alignment::Center));
    }

    lines.push(Line::from(""));
    lines.push(
        Line::from(vec![
            Span::raw("예식일이 "),
            Span::styled(
                dday_label(app.today, wedding),
                Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" 남았습니다"),
        ])
        .alignment(Alignment::Center),
    );

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_gallery_row(frame: &mut Frame, app: &mut App, row: usize, area: Rect) {
    let constraints: Vec<Constraint> = (0..GALLERY_COLUMNS)
        .map(|_| Constraint::Ratio(1, GALLERY_COLUMNS as u32))
        .collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let first = row * GALLERY_COLUMNS;
    let last = (first + GALLERY_COLUMNS).min(app.carousel.len());
    for (slot, index) in (first..last).enumerate() {
        let cell = cells[slot];
        let focused = app.focus == Some(Focus::Photo(index));
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if focused { BorderType::Thick } else { BorderType::Plain })
            .border_style(focus_style(focused));
        let inner = block.inner(cell);
        frame.render_widget(block, cell);

        let item = app.carousel.items()[index].clone();
        let placeholder = Text::from(item.file_name());
        render_image(frame, app.images_mut(), &item.source, inner, placeholder);
        app.hit_areas.push((cell, Focus::Photo(index)));
    }
}

fn location_lines(app: &App) -> Vec<Line<'static>> {
    let invitation = &app.invitation;
    vec![
        Line::from(""),
        heading("LOCATION"),
        Line::from(""),
        Line::from(Span::styled(
            invitation.venue.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        muted(&invitation.hall),
        muted(&invitation.address),
    ]
}

fn render_location(frame: &mut Frame, app: &mut App, area: Rect) {
    let lines = location_lines(app);
    let text_height = wrapped_height(&lines, area.width);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(text_height),
            Constraint::Length(1),
            Constraint::Length(MAP_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(BUTTON_HEIGHT),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[0]);

    let map = app.locator.map();
    let placeholder = Text::from("map.jpg 파일을 넣어주세요");
    let map_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" 약도 ");
    let map_area = map_block.inner(chunks[2]);
    frame.render_widget(map_block, chunks[2]);
    render_image(frame, app.images_mut(), &map, map_area, placeholder);

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[4]);

    for (i, provider) in MapProvider::ALL.iter().enumerate() {
        let focus = Focus::Map(*provider);
        let accent = match provider {
            MapProvider::Kakao => Color::Yellow,
            MapProvider::Naver => Color::Green,
            MapProvider::TMap => Color::Gray,
        };
        render_button(
            frame,
            &format!("{} {}", i + 1, provider.label()),
            accent,
            app.focus == Some(focus),
            buttons[i],
        );
        app.hit_areas.push((buttons[i], focus));
    }
}

fn direction_lines(app: &App) -> Vec<Line<'static>> {
    let directions = &app.invitation.directions;
    let bullet = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let numbered = |items: &[String]| -> Vec<Line<'static>> {
        items
            .iter()
            .enumerate()
            .map(|(i, text)| {
                Line::from(vec![
                    Span::styled(format!("{}) ", i + 1), Style::default().fg(Color::DarkGray)),
                    Span::raw(text.clone()),
                ])
            })
            .collect()
    };

    let mut lines = vec![Line::from(Span::styled("• 버스 이용시", bullet))];
    lines.extend(numbered(&directions.bus));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("• 셔틀버스 이용시", bullet)));
    lines.extend(numbered(&directions.shuttle));
    lines.extend(directions.shuttle_notes.iter().map(|note| {
        Line::from(Span::styled(note.clone(), Style::default().fg(Color::DarkGray)))
    }));
    lines
}

fn render_accounts(frame: &mut Frame, app: &mut App, side: Side, area: Rect) {
    let expanded = app.active_accordion == Some(side);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(BUTTON_HEIGHT), Constraint::Min(0)])
        .split(area);

    let header_focus = Focus::Accordion(side);
    let chevron = if expanded { "▴" } else { "▾" };
    render_button(
        frame,
        &format!("{}  {}", side.accounts_title(), chevron),
        Color::White,
        app.focus == Some(header_focus),
        chunks[0],
    );
    app.hit_areas.push((chunks[0], header_focus));

    if !expanded {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(ACCOUNT_ROW_HEIGHT),
            Constraint::Length(ACCOUNT_ROW_HEIGHT),
            Constraint::Length(ACCOUNT_ROW_HEIGHT),
        ])
        .split(chunks[1]);

    let accounts = app.invitation.accounts(side);
    let mut targets = Vec::new();
    for (i, account) in accounts.iter().enumerate() {
        let focus = Focus::Account(side, i);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(10)])
            .split(rows[i]);

        let text = vec![
            Line::from(vec![
                Span::styled(format!("{}  ", account.role), Style::default().fg(Color::DarkGray)),
                Span::styled(account.holder.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(account.bank.to_string()),
        ];
        frame.render_widget(
            Paragraph::new(text).block(Block::default().padding(Padding::left(2))),
            columns[0],
        );
        render_button(frame, "복사", Color::Gray, app.focus == Some(focus), columns[1]);
        targets.push((columns[1], focus));
    }
    app.hit_areas.extend(targets);
}

fn render_footer(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[1]);

    let music_label = if app.music.is_muted() { "♪ 음악 재생" } else { "♪ 음악 멈춤" };
    let items = [
        (Focus::Share, "s 공유하기", Color::Yellow),
        (Focus::CopyLink, "c 링크 복사", Color::White),
        (Focus::Music, music_label, Color::White),
    ];
    for (i, (focus, label, accent)) in items.into_iter().enumerate() {
        render_button(frame, label, accent, app.focus == Some(focus), buttons[i]);
        app.hit_areas.push((buttons[i], focus));
    }

    let copyright = format!(
        "Copyright {}. All rights reserved.",
        app.invitation.wedding_date.year()
    );
    frame.render_widget(Paragraph::new(muted(&copyright)), chunks[3]);
}

fn render_button(frame: &mut Frame, label: &str, accent: Color, focused: bool, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if focused { BorderType::Thick } else { BorderType::Rounded })
        .border_style(if focused { focus_style(true) } else { Style::default().fg(accent) });
    let paragraph = Paragraph::new(Line::from(label.to_string()))
        .alignment(Alignment::Center)
        .style(focus_style(focused).fg(if focused { Color::Yellow } else { accent }))
        .block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_height_counts_wrapped_rows() {
        let lines = vec![Line::from("abcdefghij"), Line::from(""), Line::from("abc")];
        assert_eq!(wrapped_height(&lines, 4), 3 + 1 + 1);
        assert_eq!(wrapped_height(&lines, 10), 3);
    }

    #[test]
    fn test_wide_characters_take_two_columns() {
        let lines = vec![Line::from("초대합니다")];
        assert_eq!(wrapped_height(&lines, 5), 2);
    }
}
