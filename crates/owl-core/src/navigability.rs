//! Navigability predicate
//!
//! Decides whether the simulated reader can land on an element, and whether
//! the element needs a synthetic `tabindex="-1"` to receive focus.

use crate::document::Document;
use ego_tree::NodeId;

/// Interactive tags: already in the native tab order
pub const INTERACTIVE_TAGS: &[&str] = &["button", "datalist", "input", "option", "select", "textarea"];

/// Non-interactive tags the reader always stops on
pub const STRUCTURAL_TAGS: &[&str] = &[
    "address", "area", "audio", "blockquote", "caption", "dd", "dl", "dt", "figcaption",
    "figure", "h1", "h2", "h3", "h4", "h5", "h6", "img", "label", "legend", "li", "map",
    "math", "ol", "p", "pre", "progress", "svg", "table", "td", "th", "tr", "track", "ul",
    "video",
];

/// Containers that are navigable only when they hold text of their own
pub const CONDITIONAL_TAGS: &[&str] = &["div", "span"];

/// Outcome of the predicate for one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigability {
    /// Element belongs to the navigable set
    pub navigable: bool,
    /// Element must be marked focusable before the host can focus it
    pub focusable_needed: bool,
}

impl Navigability {
    const SKIP: Self = Self {
        navigable: false,
        focusable_needed: false,
    };
    const NATIVE: Self = Self {
        navigable: true,
        focusable_needed: false,
    };
    const SYNTHETIC: Self = Self {
        navigable: true,
        focusable_needed: true,
    };
}

/// Classify an element for the navigable index. Non-elements are skipped.
pub fn is_navigable(doc: &Document, id: NodeId) -> Navigability {
    let Some(tag) = doc.tag_name(id) else {
        return Navigability::SKIP;
    };
    let tag = tag.as_str();

    if INTERACTIVE_TAGS.contains(&tag) {
        Navigability::NATIVE
    } else if STRUCTURAL_TAGS.contains(&tag) {
        Navigability::SYNTHETIC
    } else if CONDITIONAL_TAGS.contains(&tag) && doc.has_direct_text(id) {
        Navigability::SYNTHETIC
    } else {
        Navigability::SKIP
    }
}
