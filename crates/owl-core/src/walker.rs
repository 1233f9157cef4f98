//! Adjacent element walker
//!
//! Steps through the element tree in document order without regard to
//! navigability. Text and comment nodes are never returned.

use crate::document::Document;
use ego_tree::NodeId;
use scraper::ElementRef;

/// Next element in pre-order: first child, else next sibling, else the next
/// sibling of the nearest ancestor that has one.
pub fn next_element(doc: &Document, id: NodeId) -> Option<NodeId> {
    let node = doc.element(id)?;

    if let Some(child) = node.children().find_map(ElementRef::wrap) {
        return Some(child.id());
    }
    if let Some(sibling) = node.next_siblings().find_map(ElementRef::wrap) {
        return Some(sibling.id());
    }

    let mut current = node.parent().and_then(ElementRef::wrap);
    while let Some(ancestor) = current {
        if let Some(sibling) = ancestor.next_siblings().find_map(ElementRef::wrap) {
            return Some(sibling.id());
        }
        current = ancestor.parent().and_then(ElementRef::wrap);
    }
    None
}

/// Previous sibling element, else the parent element
pub fn previous_element(doc: &Document, id: NodeId) -> Option<NodeId> {
    let node = doc.element(id)?;

    node.prev_siblings()
        .find_map(ElementRef::wrap)
        .or_else(|| node.parent().and_then(ElementRef::wrap))
        .map(|el| el.id())
}
