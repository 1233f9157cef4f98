//! Screen reader session
//!
//! [`ScreenReader`] is the explicit context for one attached document. It
//! owns the document, the navigable index built from it, the classifier
//! and the keyboard controller; hosts create one when a page is loaded and
//! drop (or [`detach`](ScreenReader::detach)) it when the page goes away.

use crate::accessible_node::AccessibleNode;
use crate::classifier::{Classifier, ClassifierOptions};
use crate::controller::{is_text_editing, Key, KeyInput, NavigationController};
use crate::document::Document;
use crate::index::{NavigableIndex, ScanReport, WrapState};
use crate::Result;
use ego_tree::NodeId;
use tracing::{debug, info, warn};

/// What the caption should show after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub element: NodeId,
    /// Rendered description; empty when classification failed
    pub text: String,
    pub node: Option<AccessibleNode>,
    pub wrap: WrapState,
}

/// A screen reader attached to one document
#[derive(Debug)]
pub struct ScreenReader {
    document: Document,
    index: NavigableIndex,
    classifier: Classifier,
    controller: NavigationController,
    scan: ScanReport,
}

impl ScreenReader {
    /// Attach to a document and scan its body (or the document element when
    /// there is no body)
    pub fn attach(mut document: Document, options: ClassifierOptions) -> Result<Self> {
        let root = document.body().unwrap_or_else(|| document.root());
        let mut index = NavigableIndex::new();
        let scan = index.rebuild(&mut document, root)?;
        info!(
            "Attached to {:?}: {} navigable elements",
            document.title().unwrap_or("untitled page"),
            scan.navigable
        );

        Ok(Self {
            document,
            index,
            classifier: Classifier::new(options),
            controller: NavigationController::new(root),
            scan,
        })
    }

    /// Release the document, keeping any attribute writes made while attached
    pub fn detach(self) -> Document {
        debug!("Detached");
        self.document
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn index(&self) -> &NavigableIndex {
        &self.index
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Replace the classifier options; later captions use the new ones
    pub fn set_options(&mut self, options: ClassifierOptions) {
        self.classifier = Classifier::new(options);
    }

    /// Root element the index was built from
    pub fn root(&self) -> NodeId {
        self.controller.root()
    }

    /// Counts from the last scan
    pub fn scan_report(&self) -> ScanReport {
        self.scan
    }

    /// Rebuild the index from scratch. On failure the previous index stays.
    pub fn rescan(&mut self) -> Result<ScanReport> {
        let scan = self.index.rebuild(&mut self.document, self.controller.root())?;
        self.scan = scan;
        Ok(scan)
    }

    /// Process one key press and return what to announce.
    ///
    /// Tab first moves host focus through the native tab order; the
    /// controller then sees the press with the focus held at keydown.
    pub fn handle_key(&mut self, input: KeyInput) -> Option<Announcement> {
        let input = input.with_focus(self.document.focused());
        if input.key == Key::Tab {
            self.document.advance_focus(input.shift);
        }

        let (target, wrap) = self.controller.handle(
            input,
            &mut self.index,
            &mut self.document,
            &self.classifier,
        )?;
        Some(Announcement {
            wrap,
            ..self.announce(target)
        })
    }

    /// Describe an element for the caption, without a wrap notice
    pub fn announce(&self, element: NodeId) -> Announcement {
        let (text, node) = match self.classifier.classify(&self.document, element) {
            Ok(node) => (node.to_string(), Some(node)),
            Err(e) => {
                warn!("Could not describe element: {}", e);
                (String::new(), None)
            }
        };
        Announcement {
            element,
            text,
            node,
            wrap: WrapState::None,
        }
    }

    /// The announcement for the focused element, else the cursor element
    pub fn describe_current(&self) -> Option<Announcement> {
        self.document
            .focused()
            .or_else(|| self.index.peek())
            .map(|id| self.announce(id))
    }

    /// Every navigable element with its caption, in index order
    pub fn describe_all(&self) -> Vec<Announcement> {
        self.index
            .elements()
            .iter()
            .map(|&id| self.announce(id))
            .collect()
    }

    /// Whether key bindings are currently suppressed
    pub fn is_text_editing(&self) -> bool {
        is_text_editing(&self.document, self.document.focused())
    }

    /// Drop host focus (the host's Escape)
    pub fn blur(&mut self) {
        self.document.blur();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div id="content">
            <h1>This is a heading</h1>
            <p>This is a paragraph.</p>
            <div><div>This is a nested div.</div></div>
            <input type="text" />
        </div>
    "#;

    fn attach(html: &str) -> ScreenReader {
        ScreenReader::attach(Document::parse(html), ClassifierOptions::default()).unwrap()
    }

    fn press(reader: &mut ScreenReader, key: Key) -> Option<String> {
        reader.handle_key(KeyInput::new(key)).map(|a| a.text)
    }

    #[test]
    fn test_attach_scans_body() {
        let reader = attach(PAGE);
        assert_eq!(Some(reader.root()), reader.document().body());
        assert!(!reader.index().is_empty());
        assert_eq!(reader.scan_report().navigable, 4);
        assert_eq!(reader.scan_report().marked_focusable, 3);
        assert_eq!(reader.index().cursor(), None);
    }

    #[test]
    fn test_detach_returns_marked_document() {
        let reader = attach(PAGE);
        let h1 = reader.index().elements()[0];
        let doc = reader.detach();
        assert_eq!(doc.attr(h1, "tabindex"), Some("-1"));
    }

    #[test]
    fn test_arrow_navigation_announces() {
        let mut reader = attach(PAGE);
        assert_eq!(
            press(&mut reader, Key::ArrowRight).as_deref(),
            Some("heading level 1: This is a heading")
        );
        assert_eq!(
            press(&mut reader, Key::ArrowRight).as_deref(),
            Some("This is a paragraph.")
        );
        assert_eq!(
            press(&mut reader, Key::ArrowLeft).as_deref(),
            Some("heading level 1: This is a heading")
        );
    }

    #[test]
    fn test_wrap_is_reported() {
        let mut reader = attach(PAGE);
        let announcement = reader.handle_key(KeyInput::new(Key::ArrowLeft)).unwrap();
        assert_eq!(announcement.text, "textbox");
        assert_eq!(announcement.wrap, WrapState::None);

        // Focus is now on the text input: arrows are suppressed
        assert_eq!(press(&mut reader, Key::ArrowLeft), None);
        reader.blur();

        let announcement = reader.handle_key(KeyInput::new(Key::ArrowRight)).unwrap();
        assert_eq!(announcement.wrap, WrapState::WrappedToStart);
        assert_eq!(announcement.wrap.notice(), Some("wrapped to start"));
    }

    #[test]
    fn test_wrap_notice_is_not_repeated_by_other_moves() {
        let mut reader = attach("<p>One <a href='#'>link</a></p><p>Two</p>");
        press(&mut reader, Key::ArrowRight);
        press(&mut reader, Key::ArrowRight);
        let wrapped = reader.handle_key(KeyInput::new(Key::ArrowRight)).unwrap();
        assert_eq!(wrapped.wrap, WrapState::WrappedToStart);

        let explored = reader.handle_key(KeyInput::new(Key::ArrowDown)).unwrap();
        assert_eq!(explored.text, "link: link");
        assert_eq!(explored.wrap, WrapState::None);

        let resynced = reader.handle_key(KeyInput::new(Key::Tab)).unwrap();
        assert_eq!(resynced.wrap, WrapState::None);

        // The re-announced caption never carries a stale notice
        let element = explored.element;
        assert_eq!(reader.announce(element).wrap, WrapState::None);
    }

    #[test]
    fn test_tab_follows_native_order() {
        let mut reader = attach(PAGE);
        press(&mut reader, Key::ArrowRight);

        let announcement = reader.handle_key(KeyInput::new(Key::Tab)).unwrap();
        let input = reader.index().elements()[3];
        assert_eq!(announcement.element, input);
        assert_eq!(reader.document().focused(), Some(input));
        assert_eq!(reader.index().cursor(), Some(3));
        assert!(reader.is_text_editing());
    }

    #[test]
    fn test_tab_out_of_text_field_does_not_resync() {
        let mut reader = attach("<input type='text'><button>Go</button>");
        reader.handle_key(KeyInput::new(Key::Tab));
        assert!(reader.is_text_editing());

        // Native focus still moves, but the reader stays quiet
        assert_eq!(press(&mut reader, Key::Tab), None);
        let button = reader.index().elements()[1];
        assert_eq!(reader.document().focused(), Some(button));
        assert_eq!(reader.index().cursor(), Some(0));
    }

    #[test]
    fn test_failed_classification_gives_empty_caption() {
        let mut reader = attach("<div role='heading'>No level</div><p>After</p>");
        let announcement = reader.handle_key(KeyInput::new(Key::ArrowRight)).unwrap();
        assert_eq!(announcement.text, "");
        assert!(announcement.node.is_none());

        // Navigation carries on
        assert_eq!(press(&mut reader, Key::ArrowRight).as_deref(), Some("After"));
    }

    #[test]
    fn test_rescan_resets_cursor() {
        let mut reader = attach(PAGE);
        press(&mut reader, Key::ArrowRight);
        let report = reader.rescan().unwrap();
        assert_eq!(report.navigable, 4);
        assert_eq!(reader.index().cursor(), None);
    }

    #[test]
    fn test_describe_all_and_current() {
        let mut reader = attach(PAGE);
        assert!(reader.describe_current().is_none());

        let all: Vec<String> = reader.describe_all().into_iter().map(|a| a.text).collect();
        assert_eq!(
            all,
            vec![
                "heading level 1: This is a heading",
                "This is a paragraph.",
                "This is a nested div.",
                "textbox",
            ]
        );

        press(&mut reader, Key::ArrowRight);
        assert_eq!(
            reader.describe_current().map(|a| a.text).as_deref(),
            Some("heading level 1: This is a heading")
        );
    }

    #[test]
    fn test_options_change_captions() {
        let mut reader = attach("<ul><li>Alpha</li><li>Beta</li></ul>");
        reader.set_options(ClassifierOptions {
            separator: " - ".to_string(),
            list_position: true,
        });
        let texts: Vec<String> = reader.describe_all().into_iter().map(|a| a.text).collect();
        assert_eq!(texts, vec!["list", "list item 1 of 2 - Alpha", "list item 2 of 2 - Beta"]);
    }
}
