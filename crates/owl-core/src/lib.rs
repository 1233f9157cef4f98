//! Owl Core Library
//!
//! Core functionality for the Owl screen reader simulator including:
//! - A host document model over parsed HTML
//! - Accessible descriptions (role, name, value) for elements
//! - The navigable element index and its wrapping cursor
//! - Keyboard dispatch for arrow, tab and quick-key navigation
//! - Page loading from URLs, files and raw HTML

pub mod accessible_node;
pub mod classifier;
pub mod controller;
pub mod document;
pub mod fetch;
pub mod index;
pub mod navigability;
pub mod reader;
pub mod walker;

use thiserror::Error;

// Re-export key types
pub use ego_tree::NodeId;
pub use accessible_node::{AccessibleNode, Role};
pub use classifier::{classify, Classifier, ClassifierOptions};
pub use controller::{Key, KeyInput, NavigationController, QuickKey};
pub use document::Document;
pub use fetch::Fetcher;
pub use index::{NavigableIndex, ScanReport, WrapState};
pub use navigability::{is_navigable, Navigability};
pub use reader::{Announcement, ScreenReader};
pub use walker::{next_element, previous_element};

#[derive(Error, Debug)]
pub enum OwlError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Node {0:?} is not an element with a tag name")]
    MissingTag(NodeId),

    #[error("Invalid heading level: {0:?}")]
    InvalidHeadingLevel(String),

    #[error("Invalid selector: {0}")]
    SelectorError(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, OwlError>;

/// Represents a loaded web page
#[derive(Debug, Clone)]
pub struct Page {
    /// Where the page came from
    pub url: url::Url,
    /// The page title
    pub title: Option<String>,
    /// The raw HTML content
    pub html: String,
}

/// Configuration for page loading
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("Owl/{} (Screen Reader Simulator)", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}
