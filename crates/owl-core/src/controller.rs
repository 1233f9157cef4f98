//! Keyboard navigation
//!
//! Binds key presses to cursor movement on the [`NavigableIndex`] and asks
//! the host [`Document`] to move focus to the result.
//!
//! | Key            | Action                                          |
//! |----------------|-------------------------------------------------|
//! | ArrowRight     | next navigable element                          |
//! | ArrowLeft      | previous navigable element                      |
//! | Tab/Shift+Tab  | resync the cursor with host focus               |
//! | ArrowDown/Up   | explore the adjacent element in document order  |
//! | h k l f b      | jump to next heading/link/list/field/button     |
//! | H K L F B      | jump to the previous one                        |
//!
//! Every binding is suppressed while focus sits in a text-editable control.

use crate::classifier::Classifier;
use crate::document::Document;
use crate::index::{cycle_position, NavigableIndex, WrapState};
use crate::walker::{next_element, previous_element};
use ego_tree::NodeId;
use tracing::debug;

/// Keys the controller understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    ArrowUp,
    ArrowDown,
    Tab,
    Char(char),
    Other,
}

/// A key press as delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
    /// Element the host had focused when the key went down
    pub focused: Option<NodeId>,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            shift: false,
            focused: None,
        }
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_focus(mut self, focused: Option<NodeId>) -> Self {
        self.focused = focused;
        self
    }
}

/// Element kinds reachable with single-letter jumps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickKey {
    Heading,
    Link,
    List,
    FormField,
    Button,
}

impl QuickKey {
    /// Decode a quick key; lower case jumps forward, upper case backward
    pub fn from_char(c: char) -> Option<(QuickKey, bool)> {
        let quick = match c.to_ascii_lowercase() {
            'h' => QuickKey::Heading,
            'k' => QuickKey::Link,
            'l' => QuickKey::List,
            'f' => QuickKey::FormField,
            'b' => QuickKey::Button,
            _ => return None,
        };
        Some((quick, c.is_ascii_lowercase()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuickKey::Heading => "heading",
            QuickKey::Link => "link",
            QuickKey::List => "list",
            QuickKey::FormField => "form field",
            QuickKey::Button => "button",
        }
    }

    fn matches(&self, doc: &Document, classifier: &Classifier, id: NodeId) -> bool {
        let Ok(node) = classifier.classify(doc, id) else {
            return false;
        };
        let role = node.role().as_str().unwrap_or_default();
        match self {
            QuickKey::Heading => node.role().is_heading(),
            QuickKey::Link => role == "link",
            QuickKey::List => role == "list",
            QuickKey::FormField => {
                matches!(role, "textbox" | "checkbox" | "radio" | "combobox")
                    && !doc
                        .attr(id, "type")
                        .is_some_and(|t| t.trim().eq_ignore_ascii_case("hidden"))
            }
            QuickKey::Button => role == "button",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Previous,
    Resync,
    Explore { forward: bool },
    Jump { quick: QuickKey, forward: bool },
}

fn action_for(input: &KeyInput) -> Option<Action> {
    match input.key {
        Key::ArrowRight => Some(Action::Next),
        Key::ArrowLeft => Some(Action::Previous),
        Key::Tab => Some(Action::Resync),
        Key::ArrowDown => Some(Action::Explore { forward: true }),
        Key::ArrowUp => Some(Action::Explore { forward: false }),
        Key::Char(c) => {
            QuickKey::from_char(c).map(|(quick, forward)| Action::Jump { quick, forward })
        }
        Key::Other => None,
    }
}

/// Whether focus sits in a control that needs the keyboard for editing:
/// a plain text input, a textarea or a select.
pub fn is_text_editing(doc: &Document, focused: Option<NodeId>) -> bool {
    let Some(id) = focused else {
        return false;
    };
    match doc.tag_name(id).as_deref() {
        Some("select" | "textarea") => true,
        Some("input") => doc
            .attr(id, "type")
            .map(|t| t.trim().eq_ignore_ascii_case("text"))
            .unwrap_or(true),
        _ => false,
    }
}

/// Dispatches key presses for one scanned subtree
#[derive(Debug, Clone, Copy)]
pub struct NavigationController {
    /// Root of the scan; exploration and jumps stay below it
    root: NodeId,
}

impl NavigationController {
    pub fn new(root: NodeId) -> Self {
        Self { root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Handle one key press. Returns the element to announce, if any, with
    /// the wrap notice of the move. Only arrow steps through the index can
    /// wrap; every other action reports [`WrapState::None`].
    ///
    /// Tab only resynchronises the cursor with whatever the host focused;
    /// it never moves focus itself. All other actions focus their target.
    pub fn handle(
        &self,
        input: KeyInput,
        index: &mut NavigableIndex,
        doc: &mut Document,
        classifier: &Classifier,
    ) -> Option<(NodeId, WrapState)> {
        if is_text_editing(doc, input.focused) {
            debug!("Key {:?} ignored while editing text", input.key);
            return None;
        }
        let action = action_for(&input)?;
        debug!("Dispatching {:?}", action);

        let target = match action {
            Action::Next => index.next_node().map(|id| (id, index.wrap_state())),
            Action::Previous => index.previous_node().map(|id| (id, index.wrap_state())),
            Action::Resync => {
                let current = index.current_node(doc.focused());
                return doc.focused().or(current).map(|id| (id, WrapState::None));
            }
            Action::Explore { forward } => self
                .explore(index, doc, forward)
                .map(|id| (id, WrapState::None)),
            Action::Jump { quick, forward } => self
                .jump(index, doc, classifier, quick, forward)
                .map(|id| (id, WrapState::None)),
        };

        if let Some((id, _)) = target {
            doc.focus(id);
        }
        target
    }

    /// Step to the adjacent element in document order, navigable or not
    fn explore(&self, index: &mut NavigableIndex, doc: &Document, forward: bool) -> Option<NodeId> {
        let anchor = doc.focused().or_else(|| index.peek()).unwrap_or(self.root);
        let target = if forward {
            next_element(doc, anchor)
        } else {
            previous_element(doc, anchor)
        }?;

        if !self.contains(doc, target) {
            return None;
        }
        index.current_node(Some(target));
        Some(target)
    }

    /// Find the next (or previous) element of a kind, wrapping around
    fn jump(
        &self,
        index: &mut NavigableIndex,
        doc: &Document,
        classifier: &Classifier,
        quick: QuickKey,
        forward: bool,
    ) -> Option<NodeId> {
        let elements = doc.descendant_elements(self.root).ok()?;
        let len = elements.len();
        if len == 0 {
            return None;
        }
        let start = doc
            .focused()
            .or_else(|| index.peek())
            .and_then(|anchor| elements.iter().position(|&el| el == anchor));

        for step in 1..=len {
            let candidate = elements[cycle_position(start, len, step, !forward)];
            if quick.matches(doc, classifier, candidate) {
                index.current_node(Some(candidate));
                return Some(candidate);
            }
        }
        debug!("No {} found", quick.label());
        None
    }

    fn contains(&self, doc: &Document, id: NodeId) -> bool {
        doc.node(id)
            .is_some_and(|node| node.ancestors().any(|ancestor| ancestor.id() == self.root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        doc: Document,
        index: NavigableIndex,
        controller: NavigationController,
        classifier: Classifier,
    }

    impl Fixture {
        fn new(html: &str) -> Self {
            let mut doc = Document::parse(html);
            let root = doc.body().unwrap();
            let mut index = NavigableIndex::new();
            index.rebuild(&mut doc, root).unwrap();
            Self {
                doc,
                index,
                controller: NavigationController::new(root),
                classifier: Classifier::default(),
            }
        }

        fn press(&mut self, key: Key) -> Option<NodeId> {
            self.press_with_wrap(key).map(|(id, _)| id)
        }

        fn press_with_wrap(&mut self, key: Key) -> Option<(NodeId, WrapState)> {
            let input = KeyInput::new(key).with_focus(self.doc.focused());
            self.controller
                .handle(input, &mut self.index, &mut self.doc, &self.classifier)
        }

        fn tag(&self, id: Option<NodeId>) -> Option<String> {
            id.and_then(|id| self.doc.tag_name(id))
        }

        fn find(&self, css: &str) -> NodeId {
            self.doc.query_selector(css).unwrap().unwrap()
        }
    }

    const PAGE: &str = "<h1>Title</h1><p>Intro with <a href='#x'>a link</a></p>\
        <ul><li>One</li></ul><input type='text' name='q'><button>Go</button>";

    #[test]
    fn test_arrows_move_and_focus() {
        let mut fx = Fixture::new(PAGE);
        let first = fx.press(Key::ArrowRight);
        assert_eq!(fx.tag(first).as_deref(), Some("h1"));
        assert_eq!(fx.doc.focused(), first);

        let second = fx.press(Key::ArrowRight);
        assert_eq!(fx.tag(second).as_deref(), Some("p"));

        let back = fx.press(Key::ArrowLeft);
        assert_eq!(back, first);
    }

    #[test]
    fn test_arrows_suppressed_in_text_input() {
        let mut fx = Fixture::new(PAGE);
        let input = fx.find("input");
        fx.doc.focus(input);
        assert_eq!(fx.press(Key::ArrowRight), None);
        assert_eq!(fx.press(Key::Char('h')), None);
        assert_eq!(fx.index.cursor(), None);

        fx.doc.blur();
        assert!(fx.press(Key::ArrowRight).is_some());
    }

    #[test]
    fn test_checkbox_does_not_suppress() {
        let mut doc = Document::parse("<input type='checkbox'><select></select><input>");
        let checkbox = doc.query_selector("input").unwrap();
        let select = doc.query_selector("select").unwrap();
        let untyped = doc.query_selector("input:not([type])").unwrap();
        assert!(!is_text_editing(&doc, checkbox));
        assert!(is_text_editing(&doc, select));
        assert!(is_text_editing(&doc, untyped));
        doc.blur();
        assert!(!is_text_editing(&doc, None));
    }

    #[test]
    fn test_tab_resyncs_without_moving_focus() {
        let mut fx = Fixture::new(PAGE);
        let button = fx.find("button");
        fx.doc.focus(button);
        assert_eq!(fx.press(Key::Tab), Some(button));
        assert_eq!(fx.index.peek(), Some(button));

        // Focus on a non-navigable link: announced, cursor untouched
        let link = fx.find("a");
        fx.doc.focus(link);
        assert_eq!(fx.press(Key::Tab), Some(link));
        assert_eq!(fx.index.peek(), Some(button));
        assert_eq!(fx.doc.focused(), Some(link));
    }

    #[test]
    fn test_tab_with_nothing_focused() {
        let mut fx = Fixture::new(PAGE);
        assert_eq!(fx.press(Key::Tab), None);
    }

    #[test]
    fn test_explore_visits_non_navigable_elements() {
        let mut fx = Fixture::new(PAGE);
        fx.press(Key::ArrowRight);
        let p = fx.press(Key::ArrowRight);
        assert_eq!(fx.tag(p).as_deref(), Some("p"));

        let link = fx.press(Key::ArrowDown);
        assert_eq!(fx.tag(link).as_deref(), Some("a"));
        // The link is not navigable, so the cursor stays on the paragraph
        assert_eq!(fx.index.peek(), p);

        let ul = fx.press(Key::ArrowDown);
        assert_eq!(fx.tag(ul).as_deref(), Some("ul"));
        assert_eq!(fx.index.peek(), ul);

        let back = fx.press(Key::ArrowUp);
        assert_eq!(back, p);
    }

    #[test]
    fn test_explore_stays_inside_root() {
        let mut fx = Fixture::new("<p>Only</p>");
        let p = fx.press(Key::ArrowRight);
        assert!(p.is_some());
        assert_eq!(fx.press(Key::ArrowDown), None);
        assert_eq!(fx.press(Key::ArrowUp), None);
    }

    #[test]
    fn test_quick_keys() {
        let mut fx = Fixture::new(PAGE);
        let link = fx.press(Key::Char('k'));
        assert_eq!(fx.tag(link).as_deref(), Some("a"));

        let field = fx.press(Key::Char('f'));
        assert_eq!(fx.tag(field).as_deref(), Some("input"));
        assert_eq!(fx.index.peek(), field);

        // Focus is now in a text field: quick keys are suppressed
        assert_eq!(fx.press(Key::Char('b')), None);
        fx.doc.blur();

        let button = fx.press(Key::Char('b'));
        assert_eq!(fx.tag(button).as_deref(), Some("button"));

        let heading = fx.press(Key::Char('h'));
        assert_eq!(fx.tag(heading).as_deref(), Some("h1"));

        let list = fx.press(Key::Char('L'));
        assert_eq!(fx.tag(list).as_deref(), Some("ul"));
    }

    #[test]
    fn test_only_arrow_steps_report_wrap() {
        let mut fx = Fixture::new("<p>One <a href='#'>link</a></p><p>Two</p>");
        fx.press(Key::ArrowRight);
        fx.press(Key::ArrowRight);
        let (first, wrap) = fx.press_with_wrap(Key::ArrowRight).unwrap();
        assert_eq!(fx.tag(Some(first)).as_deref(), Some("p"));
        assert_eq!(wrap, WrapState::WrappedToStart);

        // The walk lands on the link, which is outside the index
        let (link, wrap) = fx.press_with_wrap(Key::ArrowDown).unwrap();
        assert_eq!(fx.tag(Some(link)).as_deref(), Some("a"));
        assert_eq!(wrap, WrapState::None);

        fx.doc.blur();
        let (_, wrap) = fx.press_with_wrap(Key::Char('k')).unwrap();
        assert_eq!(wrap, WrapState::None);
    }

    #[test]
    fn test_quick_key_without_match() {
        let mut fx = Fixture::new("<p>No headings here</p>");
        assert_eq!(fx.press(Key::Char('h')), None);
        assert_eq!(fx.index.cursor(), None);
    }

    #[test]
    fn test_quick_key_decoding() {
        assert_eq!(QuickKey::from_char('h'), Some((QuickKey::Heading, true)));
        assert_eq!(QuickKey::from_char('B'), Some((QuickKey::Button, false)));
        assert_eq!(QuickKey::from_char('z'), None);
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut fx = Fixture::new(PAGE);
        assert_eq!(fx.press(Key::Other), None);
        assert_eq!(fx.press(Key::Char('x')), None);
    }
}
