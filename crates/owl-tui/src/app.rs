//! Application state management

use crate::command::{Command, Mode};
use crate::config::Config;
use crate::outline::Outline;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use owl_core::{Announcement, Document, Fetcher, Key, KeyInput, NodeId, Page, ScreenReader};
use tracing::debug;

/// Main application state
pub struct App {
    /// Current input mode
    pub mode: Mode,
    /// Current input (for command mode)
    pub input: String,
    /// Status message
    pub status: Option<String>,
    /// Whether loading is in progress
    pub loading: bool,
    /// Configuration
    pub config: Config,
    /// The loaded page, if any
    pub page: Option<Page>,
    /// Screen reader attached to the loaded page
    pub reader: Option<ScreenReader>,
    /// Every navigable element with its caption
    pub outline: Outline,
    /// Last announcement
    pub caption: Option<Announcement>,
    fetcher: Fetcher,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        Self::with_config(Config::load()?)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        let fetcher = Fetcher::with_config(config.fetch_config())?;
        let outline = Outline::new(config.display.max_width)?;

        Ok(Self {
            mode: Mode::Normal,
            input: String::new(),
            status: Some("Welcome to Owl! Press ? for help, or :o <url> to open a page".to_string()),
            loading: false,
            config,
            page: None,
            reader: None,
            outline,
            caption: None,
            fetcher,
        })
    }

    /// Load a page from a URL or file path
    pub async fn open(&mut self, source: &str) -> Result<()> {
        self.loading = true;
        self.status = Some(format!("Loading {}...", source));

        let source = normalize_source(source);
        match self.fetcher.load(&source).await {
            Ok(page) => self.show_page(page),
            Err(e) => {
                self.status = Some(format!("Error: {}", e));
            }
        }

        self.loading = false;
        Ok(())
    }

    /// Attach a fresh screen reader to a page
    pub fn show_page(&mut self, page: Page) {
        let document = Document::parse(&page.html);
        match ScreenReader::attach(document, self.config.classifier_options()) {
            Ok(reader) => {
                self.outline.load(&reader);
                self.status = Some(format!(
                    "{}: {} elements",
                    page.title.as_deref().unwrap_or(page.url.as_str()),
                    reader.scan_report().navigable
                ));
                self.reader = Some(reader);
                self.page = Some(page);
                self.caption = None;

                if self.config.general.start_on_first {
                    self.press(KeyInput::new(Key::ArrowRight));
                }
            }
            Err(e) => {
                self.status = Some(format!("Error: {}", e));
            }
        }
    }

    /// Element to highlight: the last announced one, else the cursor
    pub fn current_element(&self) -> Option<NodeId> {
        self.caption
            .as_ref()
            .map(|c| c.element)
            .or_else(|| self.reader.as_ref().and_then(|r| r.index().peek()))
    }

    /// Whether the reader is ignoring keys because a text field has focus
    pub fn is_text_editing(&self) -> bool {
        self.reader.as_ref().is_some_and(|r| r.is_text_editing())
    }

    /// Handle a key event. Returns true when the app should quit.
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Command => self.handle_command_key(key).await,
            Mode::Help => {
                self.mode = Mode::Normal;
                Ok(false)
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        if let KeyCode::Char(c) = key.code {
            if let Some((mapped, shift)) = self.config.keybindings.remap(c) {
                self.press(KeyInput::new(mapped).with_shift(shift));
                return Ok(false);
            }
        }

        match key.code {
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.input.clear();
            }
            KeyCode::Char('?') => {
                self.mode = Mode::Help;
            }
            KeyCode::Char('c') => {
                self.config.display.show_caption = !self.config.display.show_caption;
            }
            KeyCode::Char('y') => {
                if let Some(text) = self.caption.as_ref().map(|c| c.text.clone()) {
                    self.yank_to_clipboard(&text);
                }
            }
            KeyCode::Esc => {
                if let Some(reader) = self.reader.as_mut() {
                    reader.blur();
                }
                self.status = None;
            }
            _ => {
                if let Some(input) = key_input(&key) {
                    self.press(input);
                }
            }
        }
        Ok(false)
    }

    /// Forward a key to the screen reader and show what it announces
    pub fn press(&mut self, input: KeyInput) {
        let Some(reader) = self.reader.as_mut() else {
            return;
        };
        match reader.handle_key(input) {
            Some(announcement) => {
                self.outline.reveal(announcement.element);
                self.status = announcement.wrap.notice().map(String::from);
                self.caption = Some(announcement);
            }
            None if reader.is_text_editing() => {
                self.status = Some("In a text field: press Esc to leave it".to_string());
            }
            None => {}
        }
    }

    async fn handle_command_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.input.clear();
            }
            KeyCode::Enter => {
                let command = std::mem::take(&mut self.input);
                self.mode = Mode::Normal;
                return self.execute_command(&command).await;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                self.input.push(c);
            }
            _ => {}
        }
        Ok(false)
    }

    async fn execute_command(&mut self, input: &str) -> Result<bool> {
        let cmd = Command::parse(input);
        debug!("Executing command: {:?}", cmd);

        match cmd {
            Command::Quit => return Ok(true),
            Command::Open(source) => {
                self.open(&source).await?;
            }
            Command::Rescan => self.rescan(),
            Command::Set(key, value) => {
                if let Err(e) = self.config.set(&key, &value) {
                    self.status = Some(format!("Error: {}", e));
                } else {
                    self.apply_config();
                }
            }
            Command::Help => {
                self.mode = Mode::Help;
            }
            Command::Unknown(cmd) => {
                self.status = Some(format!("Unknown command: {}", cmd));
            }
            Command::Empty => {}
        }

        Ok(false)
    }

    /// Rebuild the index and outline; the cursor starts over
    pub fn rescan(&mut self) {
        let Some(reader) = self.reader.as_mut() else {
            return;
        };
        match reader.rescan() {
            Ok(report) => {
                self.outline.load(reader);
                self.caption = None;
                self.status = Some(format!(
                    "Rescanned: {} elements, {} made focusable",
                    report.navigable, report.marked_focusable
                ));
            }
            Err(e) => {
                self.status = Some(format!("Error: {}", e));
            }
        }
    }

    /// Push changed settings into the reader and outline
    pub fn apply_config(&mut self) {
        self.outline.set_max_width(self.config.display.max_width);
        if let Some(reader) = self.reader.as_mut() {
            reader.set_options(self.config.classifier_options());
            self.outline.load(reader);
            if let Some(element) = self.caption.as_ref().map(|c| c.element) {
                self.caption = Some(reader.announce(element));
            }
        }
    }

    fn yank_to_clipboard(&mut self, text: &str) {
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => {
                if clipboard.set_text(text).is_ok() {
                    self.status = Some(format!("Yanked: {}", text));
                }
            }
            Err(_) => {
                self.status = Some("Clipboard not available".to_string());
            }
        }
    }

    /// Update viewport size
    pub fn set_viewport_size(&mut self, width: u16, height: u16) {
        self.outline.set_viewport_size(width, height);
    }
}

/// Translate a terminal key into a screen reader key
fn key_input(key: &KeyEvent) -> Option<KeyInput> {
    let input = match key.code {
        KeyCode::Right => KeyInput::new(Key::ArrowRight),
        KeyCode::Left => KeyInput::new(Key::ArrowLeft),
        KeyCode::Down => KeyInput::new(Key::ArrowDown),
        KeyCode::Up => KeyInput::new(Key::ArrowUp),
        KeyCode::Tab => KeyInput::new(Key::Tab),
        KeyCode::BackTab => KeyInput::new(Key::Tab).with_shift(true),
        KeyCode::Char(c) => KeyInput::new(Key::Char(c)).with_shift(c.is_uppercase()),
        _ => return None,
    };
    Some(input)
}

/// Bare host names are fetched over https; paths that exist are files
fn normalize_source(source: &str) -> String {
    let source = source.trim();
    if source.contains("://") || std::path::Path::new(source).exists() {
        source.to_string()
    } else {
        format!("https://{}", source)
    }
}
