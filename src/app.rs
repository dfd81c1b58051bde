use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

use crate::browser::{FileBrowser, PickOutcome};
use crate::composer::{Composer, PostReceipt};
use crate::config::AppConfig;
use crate::media::MediaAttachment;
use crate::platform::PlatformTable;
use crate::toast::{ToastKind, Toaster};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Chips,
    Platforms,
    Mode,
    Caption,
    Media,
    Post,
}

impl Section {
    fn next(self) -> Self {
        match self {
            Section::Chips => Section::Platforms,
            Section::Platforms => Section::Mode,
            Section::Mode => Section::Caption,
            Section::Caption => Section::Media,
            Section::Media => Section::Post,
            Section::Post => Section::Chips,
        }
    }

    fn prev(self) -> Self {
        match self {
            Section::Chips => Section::Post,
            Section::Platforms => Section::Chips,
            Section::Mode => Section::Platforms,
            Section::Caption => Section::Mode,
            Section::Media => Section::Caption,
            Section::Post => Section::Media,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    FileBrowser,
    Help,
}

pub struct App {
    pub section: Section,
    pub popup: Popup,

    pub composer: Composer,
    pub toaster: Toaster,

    // Cursor in the platform checklist
    pub platform_cursor: usize,
    // Cursor in the selected chips row
    pub chip_cursor: usize,

    pub browser: FileBrowser,
    media_dir: PathBuf,

    notifications: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &AppConfig, platforms: PlatformTable) -> Self {
        let media_dir = config.media_start_dir();
        Self {
            section: Section::Platforms,
            popup: Popup::None,

            composer: Composer::new(platforms),
            toaster: Toaster::new(config.toast_duration()),

            platform_cursor: 0,
            chip_cursor: 0,

            browser: FileBrowser::new(media_dir.clone()),
            media_dir,

            notifications: config.notifications,
            should_quit: false,
        }
    }

    /// Show a toast (auto-clears after the configured lifetime)
    pub fn set_toast(&mut self, msg: impl Into<String>, kind: ToastKind) {
        self.toaster.show(msg, kind);
    }

    /// True when keystrokes go to the caption editor
    pub fn is_typing(&self) -> bool {
        self.popup == Popup::None && self.section == Section::Caption
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Global shortcuts
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.should_quit = true;
                    return Ok(());
                }
                KeyCode::Char('s') if self.popup == Popup::None => {
                    self.submit();
                    return Ok(());
                }
                _ => {}
            }
        }

        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }

        // Handle normal key input
        self.handle_normal_key(key)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            // Navigation between sections
            KeyCode::Tab => {
                self.section = self.section.next();
                return Ok(());
            }
            KeyCode::BackTab => {
                self.section = self.section.prev();
                return Ok(());
            }
            _ => {}
        }

        if self.section == Section::Caption {
            self.handle_caption_key(key);
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.popup = Popup::Help,
            _ => match self.section {
                Section::Chips => self.handle_chips_key(key),
                Section::Platforms => self.handle_platforms_key(key),
                Section::Mode => {
                    if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                        let mode = self.composer.toggle_mode();
                        tracing::debug!("Post mode: {:?}", mode);
                    }
                }
                Section::Media => self.handle_media_key(key),
                Section::Post => {
                    if key.code == KeyCode::Enter {
                        self.submit();
                    }
                }
                Section::Caption => {}
            },
        }
        Ok(())
    }

    /// Bracketed paste lands in the caption when it has focus
    pub fn handle_paste(&mut self, text: &str) {
        if self.is_typing() {
            // Terminals send CR for newlines inside pastes
            self.composer.push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
        }
    }

    fn handle_caption_key(&mut self, key: KeyEvent) {
        match key.code {
            // Ctrl/Alt chords are shortcuts, never text; Shift still types
            KeyCode::Char(_) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {}
            KeyCode::Char(c) => self.composer.push_char(c),
            KeyCode::Enter => self.composer.push_char('\n'),
            KeyCode::Backspace => self.composer.pop_char(),
            KeyCode::Esc => self.section = Section::Post,
            _ => {}
        }
    }

    fn handle_chips_key(&mut self, key: KeyEvent) {
        let count = self.composer.selection().len();
        match key.code {
            KeyCode::Right | KeyCode::Char('l') => {
                if count > 0 {
                    self.chip_cursor = (self.chip_cursor + 1) % count;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if count > 0 {
                    self.chip_cursor = self.chip_cursor.checked_sub(1).unwrap_or(count - 1);
                }
            }
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace | KeyCode::Enter => {
                if let Some(id) = self.composer.selection().ids().get(self.chip_cursor).cloned() {
                    self.composer.toggle_platform(&id);
                    self.clamp_chip_cursor();
                }
            }
            _ => {}
        }
    }

    fn handle_platforms_key(&mut self, key: KeyEvent) {
        let count = self.composer.platforms().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if count > 0 {
                    self.platform_cursor = (self.platform_cursor + 1) % count;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if count > 0 {
                    self.platform_cursor = self.platform_cursor.checked_sub(1).unwrap_or(count - 1);
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let id = self.composer.platforms()
                    .by_index(self.platform_cursor)
                    .map(|p| p.id.clone());
                if let Some(id) = id {
                    self.composer.toggle_platform(&id);
                    self.clamp_chip_cursor();
                }
            }
            _ => {}
        }
    }

    fn handle_media_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('o') => self.start_file_browser(),
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => {
                if self.composer.remove_attachment() {
                    tracing::info!("Media removed");
                }
            }
            _ => {}
        }
    }

    fn clamp_chip_cursor(&mut self) {
        let count = self.composer.selection().len();
        if self.chip_cursor >= count {
            self.chip_cursor = count.saturating_sub(1);
        }
    }

    fn start_file_browser(&mut self) {
        self.popup = Popup::FileBrowser;
        // Reopen where the last pick happened
        self.browser.path = self.media_dir.clone();
        self.browser.selected = 0;
        self.browser.refresh();
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::FileBrowser => self.handle_browser_key(key),
            Popup::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')) {
                    self.popup = Popup::None;
                }
            }
            Popup::None => {}
        }
        Ok(())
    }

    fn handle_browser_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.popup = Popup::None,
            KeyCode::Char('j') | KeyCode::Down => self.browser.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.browser.move_up(),
            KeyCode::Backspace => self.browser.go_parent(),
            KeyCode::Char('~') => self.browser.go_home(),
            KeyCode::Char('a') => self.browser.toggle_filter(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let PickOutcome::Picked(path) = self.browser.activate() {
                    self.media_dir = self.browser.path.clone();
                    self.attach(path);
                    self.popup = Popup::None;
                }
            }
            _ => {}
        }
    }

    /// Attach any file; replaces the current attachment
    pub fn attach(&mut self, path: PathBuf) {
        self.composer.attach(MediaAttachment::from_path(path));
    }

    /// Run the submit flow and report the outcome on the toast line
    pub fn submit(&mut self) {
        match self.composer.submit() {
            Ok(receipt) => {
                let message = receipt.message();
                self.set_toast(message.clone(), ToastKind::Success);
                self.chip_cursor = 0;
                if self.notifications {
                    notify_posted(&receipt, message);
                }
            }
            Err(e) => self.set_toast(e.to_string(), ToastKind::Warning),
        }
    }

    pub async fn tick(&mut self) -> Result<()> {
        self.toaster.poll();
        Ok(())
    }

    /// Release everything the app holds before the terminal is restored
    pub fn shutdown(&mut self) {
        self.composer.remove_attachment();
        self.toaster.cancel_timer();
        tracing::info!("Composer closed");
    }
}

/// Mirror a confirmation as a desktop notification (best effort)
fn notify_posted(receipt: &PostReceipt, message: String) {
    let summary = if receipt.mode.is_scheduled() { "Post scheduled" } else { "Post shared" };
    tokio::task::spawn_blocking(move || {
        if let Err(e) = notify_rust::Notification::new()
            .summary(summary)
            .body(&message)
            .icon("mail-send")
            .show()
        {
            tracing::warn!("Desktop notification failed: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::PostMode;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn test_app() -> App {
        let config = AppConfig {
            media_dir: Some(std::env::temp_dir()),
            ..Default::default()
        };
        App::new(&config, PlatformTable::default())
    }

    async fn press(app: &mut App, codes: &[KeyCode]) {
        for code in codes {
            app.handle_key(key(*code)).await.unwrap();
        }
    }

    fn toast(app: &App) -> Option<String> {
        app.toaster.current().map(|t| t.message.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_submit_warns_and_keeps_state() {
        let mut app = test_app();
        press(&mut app, &[KeyCode::Char(' ')]).await; // select facebook

        app.handle_key(ctrl('s')).await.unwrap();

        assert_eq!(toast(&app).as_deref(), Some("⚠️ Please add a caption or media before posting."));
        assert_eq!(app.composer.selection().ids(), ["facebook"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_via_keyboard() {
        let mut app = test_app();
        // facebook, then twitter (4th row)
        press(&mut app, &[
            KeyCode::Char(' '),
            KeyCode::Down, KeyCode::Down, KeyCode::Down,
            KeyCode::Char(' '),
        ]).await;
        // Mode -> Caption
        press(&mut app, &[KeyCode::Tab, KeyCode::Tab]).await;
        assert!(app.is_typing());
        press(&mut app, &[
            KeyCode::Char('H'), KeyCode::Char('e'), KeyCode::Char('l'),
            KeyCode::Char('l'), KeyCode::Char('o'),
        ]).await;
        // Media -> Post
        press(&mut app, &[KeyCode::Tab, KeyCode::Tab, KeyCode::Enter]).await;

        assert_eq!(toast(&app).as_deref(), Some("✅ Post shared to facebook, twitter!"));
        assert!(app.composer.caption().is_empty());
        assert!(app.composer.selection().is_empty());
        assert_eq!(app.composer.mode(), PostMode::Instant);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_media_post_and_toast_expiry() {
        let mut app = test_app();
        press(&mut app, &[KeyCode::Up, KeyCode::Char(' ')]).await; // youtube
        press(&mut app, &[KeyCode::Tab, KeyCode::Enter]).await; // scheduled
        app.attach(PathBuf::from("/nonexistent/launch.png"));

        app.submit();

        assert_eq!(toast(&app).as_deref(), Some("✅ Post scheduled to youtube!"));
        assert_eq!(app.composer.mode(), PostMode::Scheduled);

        tokio::time::sleep(Duration::from_millis(2600)).await;
        app.tick().await.unwrap();
        assert!(toast(&app).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_chip_removal() {
        let mut app = test_app();
        press(&mut app, &[
            KeyCode::Char(' '),
            KeyCode::Down,
            KeyCode::Char(' '),
        ]).await;
        app.section = Section::Chips;

        press(&mut app, &[KeyCode::Right, KeyCode::Char('x')]).await;

        assert_eq!(app.composer.selection().ids(), ["facebook"]);
        assert_eq!(app.chip_cursor, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_caption_swallows_shortcuts() {
        let mut app = test_app();
        app.section = Section::Caption;

        press(&mut app, &[KeyCode::Char('q'), KeyCode::Char('?'), KeyCode::Enter]).await;

        assert!(!app.should_quit);
        assert_eq!(app.popup, Popup::None);
        assert_eq!(app.composer.caption(), "q?\n");

        app.handle_key(ctrl('c')).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_caption_ignores_modifier_chords() {
        let mut app = test_app();
        app.section = Section::Caption;

        app.handle_key(ctrl('z')).await.unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT)).await.unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)).await.unwrap();

        assert_eq!(app.composer.caption(), "A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_any_file_from_browser() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("draft.txt"), b"hello").unwrap();

        let mut app = test_app();
        app.media_dir = dir.path().to_path_buf();
        app.section = Section::Media;
        press(&mut app, &[KeyCode::Enter]).await;
        assert_eq!(app.popup, Popup::FileBrowser);

        // Filter hides the text file until it is switched off
        press(&mut app, &[KeyCode::Char('a'), KeyCode::Down, KeyCode::Enter]).await;

        assert_eq!(app.popup, Popup::None);
        assert_eq!(app.composer.attachment().unwrap().name, "draft.txt");

        press(&mut app, &[KeyCode::Char('x')]).await;
        assert!(app.composer.attachment().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_paste_only_into_caption() {
        let mut app = test_app();
        app.handle_paste("ignored");
        assert!(app.composer.caption().is_empty());

        app.section = Section::Caption;
        app.handle_paste("line one\r\nline two\r");
        assert_eq!(app.composer.caption(), "line one\nline two\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_section_cycle() {
        let mut app = test_app();
        for _ in 0..6 {
            press(&mut app, &[KeyCode::Tab]).await;
        }
        assert_eq!(app.section, Section::Platforms);
        app.handle_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)).await.unwrap();
        assert_eq!(app.section, Section::Chips);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_releases_preview_and_timer() {
        let mut app = test_app();
        app.submit(); // empty draft raises a warning toast
        app.attach(PathBuf::from("/nonexistent/launch.png"));
        assert_eq!(app.composer.live_previews(), 1);
        let timer = app.toaster.timer_abort_handle().unwrap();

        app.shutdown();
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(app.composer.live_previews(), 0);
        assert!(app.composer.attachment().is_none());
        assert!(timer.is_finished());
        drop(app);
    }
}
