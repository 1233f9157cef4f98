//! Configuration management

use anyhow::{bail, Result};
use directories::ProjectDirs;
use owl_core::{ClassifierOptions, FetchConfig, Key};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Keybindings (custom overrides)
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Separator between role, name and value in captions
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Announce "n of m" for list items
    #[serde(default)]
    pub list_position: bool,

    /// Put the cursor on the first element when a page loads
    #[serde(default)]
    pub start_on_first: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            list_position: false,
            start_on_first: false,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Maximum text width for wrapping
    #[serde(default = "default_width")]
    pub max_width: usize,

    /// Show the outline of navigable elements
    #[serde(default = "default_true")]
    pub show_outline: bool,

    /// Show the caption panel
    #[serde(default = "default_true")]
    pub show_caption: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_width: default_width(),
            show_outline: default_true(),
            show_caption: default_true(),
        }
    }
}

/// Extra keys, mapped to the key they stand for.
///
/// ```toml
/// [keybindings]
/// j = "ArrowDown"
/// n = "ArrowRight"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeybindingsConfig {
    #[serde(flatten)]
    pub custom: HashMap<String, String>,
}

impl KeybindingsConfig {
    /// The key a typed character is remapped to, if any
    pub fn remap(&self, c: char) -> Option<(Key, bool)> {
        let target = self.custom.get(c.to_string().as_str())?;
        parse_key(target)
    }
}

/// Parse a key name; the flag is the Shift modifier
fn parse_key(name: &str) -> Option<(Key, bool)> {
    let key = match name.trim() {
        "ArrowRight" | "Right" => Key::ArrowRight,
        "ArrowLeft" | "Left" => Key::ArrowLeft,
        "ArrowDown" | "Down" => Key::ArrowDown,
        "ArrowUp" | "Up" => Key::ArrowUp,
        "Tab" => Key::Tab,
        "Shift+Tab" | "BackTab" => return Some((Key::Tab, true)),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return None,
            }
        }
    };
    Some((key, false))
}

// Default value functions
fn default_separator() -> String {
    ": ".to_string()
}
fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}
fn default_width() -> usize {
    80
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: Config = toml::from_str(&content)?;
                return Ok(config);
            }
        }
        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            fs::write(path, content)?;
        }
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "owl", "owl").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Options for the element classifier
    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            separator: self.general.separator.clone(),
            list_position: self.general.list_position,
        }
    }

    /// Options for page loading
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout_secs: self.general.timeout_secs,
            ..Default::default()
        }
    }

    /// Set a configuration value and save
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Set a configuration value without saving
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "separator" | "sep" => {
                self.general.separator = value.to_string();
            }
            "list_position" | "position" => {
                self.general.list_position = parse_bool(key, value)?;
            }
            "start_on_first" => {
                self.general.start_on_first = parse_bool(key, value)?;
            }
            "timeout" => {
                self.general.timeout_secs = value.parse()?;
            }
            "max_width" | "width" => {
                self.display.max_width = value.parse()?;
            }
            "show_outline" | "outline" => {
                self.display.show_outline = parse_bool(key, value)?;
            }
            "show_caption" | "caption" => {
                self.display.show_caption = parse_bool(key, value)?;
            }
            _ => {
                if key.chars().count() != 1 || parse_key(value).is_none() {
                    bail!("Unknown setting: {}", key);
                }
                self.keybindings
                    .custom
                    .insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        _ => bail!("{} expects true or false, got {:?}", key, value),
    }
}
