use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::*;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use crate::assets::{build_catalog, AssetLocator, BACKGROUND_MUSIC};
use crate::audio::BackgroundMusic;
use crate::carousel::gesture::InputKind;
use crate::carousel::{CarouselController, NavDirection};
use crate::config::Config;
use crate::invitation::{Invitation, Side};
use crate::launcher::{SystemLauncher, UrlLauncher};
use crate::maps::{self, MapOpened, MapProvider};
use crate::share::clipboard::{Clipboard, CopyNotice};
use crate::share::{ShareChain, ShareOutcome, SharePayload};
use crate::ui;
use crate::ui::image_cache::ImageCache;

/// Photos per gallery row
pub const GALLERY_COLUMNS: usize = 3;

const IDLE_POLL: Duration = Duration::from_millis(100);
const ANIMATION_POLL: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Page,
    Viewer,
    Help,
}

/// Scroll unit of the invitation page. The page scrolls one block at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBlock {
    Hero,
    Greeting,
    Calendar,
    GalleryHeader,
    /// One row of `GALLERY_COLUMNS` thumbnails
    GalleryRow(usize),
    Location,
    Directions,
    AccountsHeader,
    Accounts(Side),
    Footer,
}

/// Activatable element of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Photo(usize),
    Map(MapProvider),
    Accordion(Side),
    /// Copy button of one account row (0 = the party, 1 = father, 2 = mother)
    Account(Side, usize),
    Share,
    CopyLink,
    Music,
}

impl Focus {
    pub fn block(&self) -> PageBlock {
        match self {
            Focus::Photo(index) => PageBlock::GalleryRow(index / GALLERY_COLUMNS),
            Focus::Map(_) => PageBlock::Location,
            Focus::Accordion(side) | Focus::Account(side, _) => PageBlock::Accounts(*side),
            Focus::Share | Focus::CopyLink | Focus::Music => PageBlock::Footer,
        }
    }
}

/// Where the viewer drew its clickable parts on the last frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerLayout {
    pub image: Rect,
    pub previous: Option<Rect>,
    pub next: Option<Rect>,
    pub close: Rect,
}

type MapResult = (MapProvider, Result<MapOpened, String>);
type ShareResult = Result<ShareOutcome, String>;

pub struct App {
    pub config: Config,
    pub mode: AppMode,
    pub invitation: Invitation,
    pub locator: AssetLocator,
    pub carousel: CarouselController<ImageCache>,
    /// Index of the first visible page block
    pub scroll: usize,
    /// Number of blocks that fit on screen last frame
    pub visible_blocks: usize,
    pub focus: Option<Focus>,
    /// Expanded accounts accordion, at most one
    pub active_accordion: Option<Side>,
    pub copy_notice: Option<CopyNotice>,
    pub status_message: Option<String>,
    pub music: BackgroundMusic,
    pub today: NaiveDate,
    pub should_quit: bool,
    // Graphics protocols leave stale cells behind when images move
    pub clear_on_next_render: bool,
    // Clickable page regions recorded by the renderer
    pub hit_areas: Vec<(Rect, Focus)>,
    pub viewer_layout: ViewerLayout,
    share_chain: Arc<ShareChain>,
    share_results: mpsc::Receiver<ShareResult>,
    share_sender: mpsc::Sender<ShareResult>,
    /// A share is running in the background
    sharing: bool,
    clipboard: Clipboard,
    launcher: Arc<dyn UrlLauncher>,
    map_results: mpsc::Receiver<MapResult>,
    map_sender: mpsc::Sender<MapResult>,
    pointer_down: Option<(u16, u16)>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let locator = AssetLocator::new(config.assets.base_path.as_str());
        let items = build_catalog(&locator, config.gallery.photo_count);
        let images = ImageCache::new(config.preview.protocol, config.preview.max_image_size);
        let carousel = CarouselController::new(items, config.gallery.transition(), images);

        let launcher: Arc<dyn UrlLauncher> = Arc::new(SystemLauncher::new(config.opener.clone()));
        let clipboard = Clipboard::new(config.share.clipboard_command.clone());
        let share_chain = ShareChain::standard(
            config.share.share_command.clone(),
            config.share.kakao_app_key.clone(),
            Arc::clone(&launcher),
            clipboard.clone(),
        );

        let track = if locator.is_remote() {
            PathBuf::from(locator.background_music())
        } else {
            locator.local_path(BACKGROUND_MUSIC)
        };
        let music = BackgroundMusic::new(track, config.audio.player.clone());
        let (map_sender, map_results) = mpsc::channel();
        let (share_sender, share_results) = mpsc::channel();

        tracing::info!(
            photos = carousel.len(),
            assets = %locator.base(),
            share = ?share_chain.strategy_names(),
            "Invitation ready"
        );

        Self {
            invitation: config.invitation.clone(),
            config,
            mode: AppMode::Page,
            locator,
            carousel,
            scroll: 0,
            visible_blocks: 1,
            focus: None,
            active_accordion: None,
            copy_notice: None,
            status_message: None,
            music,
            today: chrono::Local::now().date_naive(),
            should_quit: false,
            clear_on_next_render: false,
            hit_areas: Vec::new(),
            viewer_layout: ViewerLayout::default(),
            share_chain: Arc::new(share_chain),
            share_results,
            share_sender,
            sharing: false,
            clipboard,
            launcher,
            map_results,
            map_sender,
            pointer_down: None,
        }
    }

    pub async fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        while !self.should_quit {
            self.tick(Instant::now());

            if self.clear_on_next_render {
                terminal.clear()?;
                self.clear_on_next_render = false;
            }
            terminal.draw(|frame| ui::render(frame, self))?;

            if event::poll(self.poll_timeout(Instant::now()))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key, Instant::now()),
                    Event::Mouse(mouse) => self.handle_mouse(mouse, Instant::now()),
                    Event::Resize(_, _) => self.clear_on_next_render = true,
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Poll faster while a slide transition is running.
    fn poll_timeout(&self, now: Instant) -> Duration {
        match self.carousel.next_deadline() {
            Some(due) => due.saturating_duration_since(now).min(ANIMATION_POLL),
            None => IDLE_POLL,
        }
    }

    /// Advance timers and collect background results.
    pub fn tick(&mut self, now: Instant) {
        if self.carousel.tick(now) {
            self.clear_on_next_render = true;
        }
        if self.copy_notice.is_some_and(|notice| !notice.is_visible(now)) {
            self.copy_notice = None;
        }
        self.music.poll();
        self.poll_map_results();
        self.poll_share_results();
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.mode {
            AppMode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.mode = AppMode::Page;
                }
            }
            AppMode::Viewer => match key.code {
                KeyCode::Char('h') | KeyCode::Left => {
                    self.carousel.navigate(NavDirection::Previous, now);
                }
                KeyCode::Char('l') | KeyCode::Right => {
                    self.carousel.navigate(NavDirection::Next, now);
                }
                KeyCode::Esc | KeyCode::Char('q') => self.close_viewer(),
                _ => {}
            },
            AppMode::Page => {
                // Any key dismisses a stale status message
                self.status_message = None;
                match key.code {
                    KeyCode::Char('q') => self.should_quit = true,
                    KeyCode::Char('?') => self.mode = AppMode::Help,
                    KeyCode::Char('j') | KeyCode::Down => self.scroll_down(),
                    KeyCode::Char('k') | KeyCode::Up => self.scroll_up(),
                    KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
                    KeyCode::Char('G') | KeyCode::End => {
                        self.scroll = self.page_blocks().len().saturating_sub(1);
                    }
                    KeyCode::Tab => self.focus_next(),
                    KeyCode::BackTab => self.focus_previous(),
                    KeyCode::Enter => {
                        if let Some(focus) = self.focus {
                            self.activate(focus);
                        }
                    }
                    KeyCode::Char('s') => self.share(),
                    KeyCode::Char('c') => {
                        let url = self.config.assets.page_url.clone();
                        self.copy_text(&url);
                    }
                    KeyCode::Char('m') => self.toggle_music(),
                    KeyCode::Char('1') => self.open_map(MapProvider::Kakao),
                    KeyCode::Char('2') => self.open_map(MapProvider::Naver),
                    KeyCode::Char('3') => self.open_map(MapProvider::TMap),
                    _ => {}
                }
            }
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        match self.mode {
            AppMode::Page => self.handle_page_mouse(mouse),
            AppMode::Viewer => self.handle_viewer_mouse(mouse, now),
            AppMode::Help => {}
        }
    }

    fn handle_page_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_down(),
            MouseEventKind::ScrollUp => self.scroll_up(),
            MouseEventKind::Down(MouseButton::Left) => {
                let position = Position::new(mouse.column, mouse.row);
                let hit = self
                    .hit_areas
                    .iter()
                    .find(|(area, _)| area.contains(position))
                    .map(|(_, focus)| *focus);
                if let Some(focus) = hit {
                    self.focus = Some(focus);
                    self.activate(focus);
                }
            }
            _ => {}
        }
    }

    fn handle_viewer_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let (x, y) = self.pointer_position(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer_down = Some((mouse.column, mouse.row));
                self.carousel.on_gesture_start(x, y, InputKind::Pointer);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let swiped = self.carousel.on_gesture_end(x, y, now);
                let clicked = self.pointer_down.take() == Some((mouse.column, mouse.row));
                if !swiped && clicked {
                    self.handle_viewer_click(Position::new(mouse.column, mouse.row), now);
                }
            }
            MouseEventKind::ScrollDown => {
                self.carousel.navigate(NavDirection::Next, now);
            }
            MouseEventKind::ScrollUp => {
                self.carousel.navigate(NavDirection::Previous, now);
            }
            _ => {}
        }
    }

    fn handle_viewer_click(&mut self, position: Position, now: Instant) {
        let layout = self.viewer_layout;
        if layout.close.contains(position) {
            self.close_viewer();
        } else if layout.previous.is_some_and(|area| area.contains(position)) {
            self.carousel.navigate(NavDirection::Previous, now);
        } else if layout.next.is_some_and(|area| area.contains(position)) {
            self.carousel.navigate(NavDirection::Next, now);
        } else if !layout.image.contains(position) {
            // Backdrop click
            self.close_viewer();
        }
    }

    /// Terminal cell to pixel coordinates, so swipe thresholds keep their
    /// on-screen size.
    fn pointer_position(&self, column: u16, row: u16) -> (f64, f64) {
        let (width, height) = self.carousel.preloader().font_size();
        (
            f64::from(column) * f64::from(width),
            f64::from(row) * f64::from(height),
        )
    }

    pub fn page_blocks(&self) -> Vec<PageBlock> {
        let rows = self.carousel.len().div_ceil(GALLERY_COLUMNS);
        let mut blocks = vec![
            PageBlock::Hero,
            PageBlock::Greeting,
            PageBlock::Calendar,
            PageBlock::GalleryHeader,
        ];
        blocks.extend((0..rows).map(PageBlock::GalleryRow));
        blocks.extend([
            PageBlock::Location,
            PageBlock::Directions,
            PageBlock::AccountsHeader,
            PageBlock::Accounts(Side::Groom),
            PageBlock::Accounts(Side::Bride),
            PageBlock::Footer,
        ]);
        blocks
    }

    /// Focusable elements in page order.
    pub fn focus_targets(&self) -> Vec<Focus> {
        let mut targets: Vec<Focus> = (0..self.carousel.len()).map(Focus::Photo).collect();
        targets.extend(MapProvider::ALL.iter().map(|provider| Focus::Map(*provider)));
        for side in [Side::Groom, Side::Bride] {
            targets.push(Focus::Accordion(side));
            if self.active_accordion == Some(side) {
                targets.extend((0..3).map(|row| Focus::Account(side, row)));
            }
        }
        targets.extend([Focus::Share, Focus::CopyLink, Focus::Music]);
        targets
    }

    pub fn scroll_down(&mut self) {
        let last = self.page_blocks().len().saturating_sub(1);
        self.scroll = (self.scroll + 1).min(last);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn focus_next(&mut self) {
        let targets = self.focus_targets();
        let next = match self.focus.and_then(|f| targets.iter().position(|t| *t == f)) {
            Some(pos) => targets[(pos + 1) % targets.len()],
            None => targets[0],
        };
        self.set_focus(next);
    }

    pub fn focus_previous(&mut self) {
        let targets = self.focus_targets();
        let previous = match self.focus.and_then(|f| targets.iter().position(|t| *t == f)) {
            Some(pos) => targets[(pos + targets.len() - 1) % targets.len()],
            None => targets[targets.len() - 1],
        };
        self.set_focus(previous);
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = Some(focus);
        self.scroll_to(focus.block());
    }

    /// Scroll so `block` is on screen.
    fn scroll_to(&mut self, block: PageBlock) {
        if let Some(index) = self.page_blocks().iter().position(|b| *b == block) {
            let visible = self.visible_blocks.max(1);
            if index < self.scroll || index >= self.scroll + visible {
                self.scroll = index;
            }
        }
    }

    pub fn activate(&mut self, focus: Focus) {
        match focus {
            Focus::Photo(index) => self.open_viewer(index),
            Focus::Map(provider) => self.open_map(provider),
            Focus::Accordion(side) => self.toggle_accordion(side),
            Focus::Account(side, row) => {
                let accounts = self.invitation.accounts(side);
                if let Some(account) = accounts.get(row) {
                    let bank = account.bank.to_string();
                    self.copy_text(&bank);
                }
            }
            Focus::Share => self.share(),
            Focus::CopyLink => {
                let url = self.config.assets.page_url.clone();
                self.copy_text(&url);
            }
            Focus::Music => self.toggle_music(),
        }
    }

    pub fn open_viewer(&mut self, index: usize) {
        if index >= self.carousel.len() {
            return;
        }
        self.carousel.open(index);
        self.mode = AppMode::Viewer;
        self.pointer_down = None;
        self.clear_on_next_render = true;
    }

    pub fn close_viewer(&mut self) {
        self.carousel.close();
        self.mode = AppMode::Page;
        self.pointer_down = None;
        self.clear_on_next_render = true;
    }

    /// Expand `side`, collapsing the other one; collapse it if already open.
    pub fn toggle_accordion(&mut self, side: Side) {
        if self.active_accordion == Some(side) {
            self.active_accordion = None;
            if matches!(self.focus, Some(Focus::Account(s, _)) if s == side) {
                self.focus = Some(Focus::Accordion(side));
            }
        } else {
            self.active_accordion = Some(side);
        }
    }

    pub fn copy_text(&mut self, text: &str) {
        match self.clipboard.copy(text) {
            Ok(method) => {
                tracing::debug!(?method, "Copied to clipboard");
                self.copy_notice = Some(CopyNotice::new(Instant::now()));
            }
            Err(e) => tracing::error!("Copy failed: {}", e),
        }
    }

    pub fn share_payload(&self) -> SharePayload {
        let title = self.invitation.share_title();
        let page = AssetLocator::new(self.config.assets.page_url.as_str());
        SharePayload {
            url: self.config.assets.page_url.clone(),
            description: title.clone(),
            title,
            image_url: page.share_preview(),
        }
    }

    /// Share the invitation on a background thread. A share sheet may stay
    /// open until the user dismisses it; the outcome is picked up by `tick`.
    pub fn share(&mut self) {
        if self.sharing {
            return;
        }
        let payload = self.share_payload();
        let chain = Arc::clone(&self.share_chain);
        let sender = self.share_sender.clone();

        self.sharing = true;
        self.status_message = Some("Sharing...".to_string());
        std::thread::spawn(move || {
            let result = chain.share(&payload).map_err(|e| e.to_string());
            let _ = sender.send(result);
        });
    }

    pub fn is_sharing(&self) -> bool {
        self.sharing
    }

    fn poll_share_results(&mut self) {
        while let Ok(result) = self.share_results.try_recv() {
            self.sharing = false;
            match result {
                Ok(ShareOutcome::Shared(via)) => {
                    self.status_message = Some(format!("Shared via {}", via));
                }
                Ok(ShareOutcome::CopiedToClipboard) => {
                    self.status_message = None;
                    self.copy_notice = Some(CopyNotice::new(Instant::now()));
                }
                Err(e) => {
                    tracing::error!("Share failed: {}", e);
                    self.status_message = Some(format!("Share failed: {}", e));
                }
            }
        }
    }

    pub fn toggle_music(&mut self) {
        match self.music.toggle() {
            Ok(true) => self.status_message = Some("Music off".to_string()),
            Ok(false) => self.status_message = Some("Music on".to_string()),
            Err(e) => {
                tracing::warn!("Background music unavailable: {:#}", e);
                self.status_message = Some(format!("Music unavailable: {}", e));
            }
        }
    }

    /// Open the venue in a map app on a background thread; the result shows
    /// up in the status bar.
    pub fn open_map(&mut self, provider: MapProvider) {
        let place = self.invitation.venue.clone();
        let app_name = self.config.maps.app_name.clone();
        let fallback_after = self.config.maps.fallback_after();
        let launcher = Arc::clone(&self.launcher);
        let sender = self.map_sender.clone();

        self.status_message = Some(format!("Opening {}...", provider.label()));
        std::thread::spawn(move || {
            let result = maps::open_in_map(provider, &place, &app_name, launcher.as_ref(), fallback_after)
                .map_err(|e| format!("{:#}", e));
            let _ = sender.send((provider, result));
        });
    }

    fn poll_map_results(&mut self) {
        while let Ok((provider, result)) = self.map_results.try_recv() {
            let message = match result {
                Ok(MapOpened::App(_)) => format!("Opened {}", provider.label()),
                Ok(MapOpened::Web(_)) => format!("Opened {} on the web", provider.label()),
                Err(e) => {
                    tracing::error!(provider = provider.label(), "Failed to open map: {}", e);
                    format!("Could not open {}: {}", provider.label(), e)
                }
            };
            self.status_message = Some(message);
        }
    }

    /// Images decoded for the page and the viewer
    pub fn images_mut(&mut self) -> &mut ImageCache {
        self.carousel.preloader_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageProtocol;
    use crate::share::{ShareError, ShareStrategy};
    use crossterm::event::KeyModifiers;

    fn test_app(photos: usize) -> App {
        let mut config = Config::default();
        config.assets.base_path = "/nonexistent/public".to_string();
        config.gallery.photo_count = photos;
        config.preview.protocol = ImageProtocol::None;
        config.audio.player = Vec::new();
        App::new(config)
    }

    fn press(app: &mut App, code: KeyCode, now: Instant) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), now);
    }

    fn mouse(app: &mut App, kind: MouseEventKind, column: u16, row: u16, now: Instant) {
        app.handle_mouse(
            MouseEvent {
                kind,
                column,
                row,
                modifiers: KeyModifiers::NONE,
            },
            now,
        );
    }

    #[test]
    fn test_page_blocks_include_gallery_rows() {
        let app = test_app(5);
        let blocks = app.page_blocks();
        assert_eq!(blocks[0], PageBlock::Hero);
        assert!(blocks.contains(&PageBlock::GalleryRow(1)));
        assert!(!blocks.contains(&PageBlock::GalleryRow(2)));
        assert_eq!(blocks.last(), Some(&PageBlock::Footer));
    }

    #[test]
    fn test_focus_cycles_and_wraps() {
        let mut app = test_app(2);
        let t0 = Instant::now();

        press(&mut app, KeyCode::Tab, t0);
        assert_eq!(app.focus, Some(Focus::Photo(0)));
        press(&mut app, KeyCode::BackTab, t0);
        assert_eq!(app.focus, Some(Focus::Music));
        press(&mut app, KeyCode::Tab, t0);
        assert_eq!(app.focus, Some(Focus::Photo(0)));
    }

    #[test]
    fn test_focus_scrolls_page() {
        let mut app = test_app(2);
        let t0 = Instant::now();
        press(&mut app, KeyCode::BackTab, t0);

        let footer = app.page_blocks().len() - 1;
        assert_eq!(app.scroll, footer);
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut app = test_app(3);
        app.scroll_up();
        assert_eq!(app.scroll, 0);

        let last = app.page_blocks().len() - 1;
        for _ in 0..100 {
            app.scroll_down();
        }
        assert_eq!(app.scroll, last);
    }

    #[test]
    fn test_accordion_exposes_account_rows() {
        let mut app = test_app(1);
        let collapsed = app.focus_targets().len();

        app.toggle_accordion(Side::Bride);
        assert_eq!(app.active_accordion, Some(Side::Bride));
        assert_eq!(app.focus_targets().len(), collapsed + 3);
        assert!(app.focus_targets().contains(&Focus::Account(Side::Bride, 2)));

        // Opening the other side collapses this one
        app.toggle_accordion(Side::Groom);
        assert_eq!(app.active_accordion, Some(Side::Groom));
        assert!(!app.focus_targets().contains(&Focus::Account(Side::Bride, 0)));

        app.focus = Some(Focus::Account(Side::Groom, 1));
        app.toggle_accordion(Side::Groom);
        assert_eq!(app.active_accordion, None);
        assert_eq!(app.focus, Some(Focus::Accordion(Side::Groom)));
    }

    #[test]
    fn test_enter_on_photo_opens_viewer_and_escape_closes() {
        let mut app = test_app(4);
        let t0 = Instant::now();
        app.focus = Some(Focus::Photo(2));

        press(&mut app, KeyCode::Enter, t0);
        assert_eq!(app.mode, AppMode::Viewer);
        assert_eq!(app.carousel.selected(), Some(2));

        press(&mut app, KeyCode::Esc, t0);
        assert_eq!(app.mode, AppMode::Page);
        assert_eq!(app.carousel.selected(), None);
    }

    #[test]
    fn test_viewer_keys_navigate_after_transition() {
        let mut app = test_app(4);
        let t0 = Instant::now();
        app.open_viewer(3);

        press(&mut app, KeyCode::Char('l'), t0);
        // Dropped while the first transition runs
        press(&mut app, KeyCode::Char('l'), t0 + Duration::from_millis(100));
        assert_eq!(app.carousel.selected(), Some(3));

        app.tick(t0 + Duration::from_millis(300));
        assert_eq!(app.carousel.selected(), Some(0));

        press(&mut app, KeyCode::Left, t0 + Duration::from_millis(400));
        app.tick(t0 + Duration::from_millis(700));
        assert_eq!(app.carousel.selected(), Some(3));
    }

    #[test]
    fn test_closing_during_transition_stays_closed() {
        let mut app = test_app(4);
        let t0 = Instant::now();
        app.open_viewer(0);
        press(&mut app, KeyCode::Right, t0);
        press(&mut app, KeyCode::Char('q'), t0 + Duration::from_millis(50));

        app.tick(t0 + Duration::from_millis(500));
        assert_eq!(app.carousel.selected(), None);
        assert_eq!(app.mode, AppMode::Page);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_mouse_drag_swipes_to_next_photo() {
        let mut app = test_app(4);
        let t0 = Instant::now();
        app.open_viewer(1);

        // 20 cells at the default 8px cell width is well past the pointer threshold
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 40, 10, t0);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 20, 10, t0);
        assert!(app.carousel.state().is_animating);

        app.tick(t0 + Duration::from_millis(300));
        assert_eq!(app.carousel.selected(), Some(2));
    }

    #[test]
    fn test_short_drag_does_not_navigate() {
        let mut app = test_app(4);
        let t0 = Instant::now();
        app.open_viewer(1);
        app.viewer_layout.image = Rect::new(0, 0, 80, 24);

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 40, 10, t0);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 36, 10, t0);
        assert!(!app.carousel.state().is_animating);
        assert_eq!(app.mode, AppMode::Viewer);
    }

    #[test]
    fn test_viewer_clicks() {
        let mut app = test_app(4);
        let t0 = Instant::now();
        app.open_viewer(0);
        app.viewer_layout = ViewerLayout {
            image: Rect::new(20, 1, 40, 20),
            previous: Some(Rect::new(0, 5, 16, 10)),
            next: Some(Rect::new(64, 5, 16, 10)),
            close: Rect::new(76, 0, 4, 1),
        };

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 70, 8, t0);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 70, 8, t0);
        app.tick(t0 + Duration::from_millis(300));
        assert_eq!(app.carousel.selected(), Some(1));

        // Clicking the photo itself does nothing
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 30, 8, t0);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 30, 8, t0);
        assert_eq!(app.mode, AppMode::Viewer);

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 77, 0, t0);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 77, 0, t0);
        assert_eq!(app.mode, AppMode::Page);
    }

    #[test]
    fn test_page_click_activates_hit_area() {
        let mut app = test_app(4);
        let t0 = Instant::now();
        app.hit_areas = vec![(Rect::new(10, 10, 20, 8), Focus::Photo(3))];

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 15, 12, t0);
        assert_eq!(app.focus, Some(Focus::Photo(3)));
        assert_eq!(app.mode, AppMode::Viewer);
        assert_eq!(app.carousel.selected(), Some(3));
    }

    #[test]
    fn test_music_without_player_reports_status() {
        let mut app = test_app(1);
        app.toggle_music();
        assert!(app.music.is_muted());
        assert!(app
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Music unavailable")));
    }

    #[test]
    fn test_share_payload() {
        let app = test_app(1);
        let payload = app.share_payload();
        assert_eq!(payload.url, "https://wedding.example.com/");
        assert_eq!(payload.title, "승환♥경희의 결혼식에 초대합니다");
        assert_eq!(payload.description, payload.title);
        assert_eq!(payload.image_url, "https://wedding.example.com/images/og-image.jpg");
    }

    struct SlowShare {
        delay: Duration,
    }

    impl ShareStrategy for SlowShare {
        fn name(&self) -> &'static str {
            "slow sheet"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn attempt_share(&self, _payload: &SharePayload) -> Result<ShareOutcome, ShareError> {
            std::thread::sleep(self.delay);
            Ok(ShareOutcome::Shared("slow sheet"))
        }
    }

    #[test]
    fn test_share_runs_in_background() {
        let mut app = test_app(3);
        let slow: Box<dyn ShareStrategy> = Box::new(SlowShare {
            delay: Duration::from_millis(500),
        });
        app.share_chain = Arc::new(ShareChain::new(vec![slow]));

        let started = Instant::now();
        app.share();
        assert!(started.elapsed() < Duration::from_millis(250));
        assert!(app.is_sharing());
        assert_eq!(app.status_message.as_deref(), Some("Sharing..."));

        // A second request while the first is running is ignored
        app.share();

        // The carousel keeps ticking while the share sheet is open
        app.open_viewer(0);
        let t0 = Instant::now();
        app.carousel.navigate(NavDirection::Next, t0);
        app.tick(t0 + Duration::from_millis(300));
        assert_eq!(app.carousel.selected(), Some(1));

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.is_sharing() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            app.tick(Instant::now());
        }
        assert!(!app.is_sharing());
        assert_eq!(app.status_message.as_deref(), Some("Shared via slow sheet"));
    }

    #[test]
    fn test_help_mode_round_trip() {
        let mut app = test_app(1);
        let t0 = Instant::now();
        press(&mut app, KeyCode::Char('?'), t0);
        assert_eq!(app.mode, AppMode::Help);
        press(&mut app, KeyCode::Char('q'), t0);
        assert_eq!(app.mode, AppMode::Page);
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('q'), t0);
        assert!(app.should_quit);
    }
}
