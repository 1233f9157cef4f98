//! Outline of the navigable elements on the page

use anyhow::Result;
use owl_core::{NodeId, ScreenReader};
use regex::Regex;

/// Width of the tag column, including the gap after it
const TAG_COLUMN: usize = 10;

/// One navigable element in the outline
#[derive(Debug, Clone)]
pub struct Entry {
    pub element: NodeId,
    pub tag: String,
    pub caption: String,
}

/// A display row; long captions span several rows
#[derive(Debug, Clone)]
pub struct Row {
    /// Index of the entry this row belongs to
    pub entry: usize,
    pub text: String,
}

/// Wrapped, scrollable list of every navigable element with its caption
#[derive(Debug)]
pub struct Outline {
    entries: Vec<Entry>,
    rows: Vec<Row>,
    /// Current scroll position (row number)
    scroll_offset: usize,
    /// Viewport height in rows
    pub viewport_height: usize,
    /// Viewport width in columns
    pub viewport_width: usize,
    /// Upper bound on the wrap width
    max_width: usize,
    whitespace: Regex,
}

impl Outline {
    pub fn new(max_width: usize) -> Result<Self> {
        Ok(Self {
            entries: Vec::new(),
            rows: Vec::new(),
            scroll_offset: 0,
            viewport_height: 24,
            viewport_width: 80,
            max_width,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Rebuild from the reader's current index
    pub fn load(&mut self, reader: &ScreenReader) {
        let document = reader.document();
        self.entries = reader
            .describe_all()
            .into_iter()
            .map(|announcement| Entry {
                element: announcement.element,
                tag: document.tag_name(announcement.element).unwrap_or_default(),
                caption: self.whitespace.replace_all(&announcement.text, " ").into_owned(),
            })
            .collect();
        self.scroll_offset = 0;
        self.rewrap();
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Rows currently in view
    pub fn visible_rows(&self) -> &[Row] {
        let start = self.scroll_offset.min(self.rows.len());
        let end = (start + self.viewport_height).min(self.rows.len());
        &self.rows[start..end]
    }

    /// Entry index of an element
    pub fn entry_of(&self, element: NodeId) -> Option<usize> {
        self.entries.iter().position(|e| e.element == element)
    }

    /// First row of an element
    pub fn row_of(&self, element: NodeId) -> Option<usize> {
        let entry = self.entry_of(element)?;
        self.rows.iter().position(|row| row.entry == entry)
    }

    /// Scroll just enough to bring an element into view
    pub fn reveal(&mut self, element: NodeId) {
        let Some(entry) = self.entry_of(element) else {
            return;
        };
        let first = self.rows.iter().position(|r| r.entry == entry).unwrap_or(0);
        let last = self.rows.iter().rposition(|r| r.entry == entry).unwrap_or(first);

        if first < self.scroll_offset {
            self.scroll_offset = first;
        } else if last >= self.scroll_offset + self.viewport_height {
            self.scroll_offset = (last + 1).saturating_sub(self.viewport_height.max(1));
        }
    }

    /// Update viewport size, rewrapping when the width changes
    pub fn set_viewport_size(&mut self, width: u16, height: u16) {
        self.viewport_height = height as usize;
        if self.viewport_width != width as usize {
            self.viewport_width = width as usize;
            self.rewrap();
        }
    }

    pub fn set_max_width(&mut self, max_width: usize) {
        self.max_width = max_width;
        self.rewrap();
    }

    fn wrap_width(&self) -> usize {
        self.viewport_width
            .saturating_sub(2)
            .min(self.max_width)
            .max(TAG_COLUMN + 20)
    }

    fn rewrap(&mut self) {
        let indent = " ".repeat(TAG_COLUMN);
        let width = self.wrap_width();
        self.rows = self
            .entries
            .iter()
            .enumerate()
            .flat_map(|(i, entry)| {
                let caption = if entry.caption.is_empty() {
                    "(no description)"
                } else {
                    entry.caption.as_str()
                };
                let line = format!("{:<w$}{}", entry.tag, caption, w = TAG_COLUMN);
                let options = textwrap::Options::new(width).subsequent_indent(&indent);
                textwrap::wrap(&line, options)
                    .into_iter()
                    .map(|text| Row {
                        entry: i,
                        text: text.into_owned(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        self.scroll_offset = self.scroll_offset.min(self.rows.len().saturating_sub(1));
    }
}
