//! Host document model
//!
//! A parsed HTML page plus the small amount of mutable host state the
//! screen reader needs: attribute writes (such as synthetic `tabindex`)
//! and the currently focused element. The parsed tree itself is never
//! mutated; attribute writes live in an overlay that shadows the markup.

use crate::index::cycle_position;
use crate::{OwlError, Result};
use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashMap;

/// A parsed document with host-side attribute and focus state
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
    title: Option<String>,
    /// Attribute writes, keyed by element
    attribute_writes: HashMap<NodeId, HashMap<String, String>>,
    focused: Option<NodeId>,
}

impl Document {
    /// Parse a full HTML document (fragments are wrapped in html/body)
    pub fn parse(html: &str) -> Self {
        let html = Html::parse_document(html);
        let title = title_of(&html);
        Self {
            html,
            title,
            attribute_writes: HashMap::new(),
            focused: None,
        }
    }

    /// The `<title>` text, if any
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The document element (`<html>`)
    pub fn root(&self) -> NodeId {
        self.html.root_element().id()
    }

    /// The `<body>` element, if the document has one
    pub fn body(&self) -> Option<NodeId> {
        self.html
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name().eq_ignore_ascii_case("body"))
            .map(|el| el.id())
    }

    /// Raw tree node, element or not
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    /// Element handle for an id, `None` for text/comment/document nodes
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.node(id).and_then(ElementRef::wrap)
    }

    /// Lower-cased tag name; `None` when the node has no tag
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        self.element(id)
            .map(|el| el.value().name().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
    }

    /// Read an attribute, preferring host writes over the parsed markup
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        if let Some(value) = self
            .attribute_writes
            .get(&id)
            .and_then(|writes| writes.get(name))
        {
            return Some(value.as_str());
        }
        self.element(id)?.value().attr(name)
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Write an attribute on an element
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        if self.element(id).is_none() {
            return Err(OwlError::MissingTag(id));
        }
        self.attribute_writes
            .entry(id)
            .or_default()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Drop every host attribute write
    pub fn clear_attribute_writes(&mut self) {
        self.attribute_writes.clear();
    }

    /// All descendant elements of `root` in document order, excluding `root`
    pub fn descendant_elements(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let root = self.element(root).ok_or(OwlError::MissingTag(root))?;
        Ok(root
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .map(|el| el.id())
            .collect())
    }

    /// Direct element children in document order
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| {
                node.children()
                    .filter_map(ElementRef::wrap)
                    .map(|el| el.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Concatenation of all descendant text
    pub fn text_content(&self, id: NodeId) -> String {
        self.element(id)
            .map(|el| el.text().collect())
            .unwrap_or_default()
    }

    /// Concatenation of the element's direct text-node children
    pub fn direct_text(&self, id: NodeId) -> String {
        direct_text_nodes(self.node(id)).collect()
    }

    /// Whether at least one direct text child has non-whitespace content
    pub fn has_direct_text(&self, id: NodeId) -> bool {
        direct_text_nodes(self.node(id)).any(|text| !text.trim().is_empty())
    }

    /// Text content skipping any descendant subtree whose tag is in `skip`
    pub fn text_excluding(&self, id: NodeId, skip: &[&str]) -> String {
        let mut out = String::new();
        if let Some(node) = self.node(id) {
            collect_text_excluding(node, skip, &mut out);
        }
        out
    }

    /// First element matching a CSS selector
    pub fn query_selector(&self, css: &str) -> Result<Option<NodeId>> {
        let selector = parse_selector(css)?;
        Ok(self.html.select(&selector).next().map(|el| el.id()))
    }

    /// Every element matching a CSS selector, in document order
    pub fn query_selector_all(&self, css: &str) -> Result<Vec<NodeId>> {
        let selector = parse_selector(css)?;
        Ok(self.html.select(&selector).map(|el| el.id()).collect())
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    /// Move host focus to an element. Returns false for non-elements.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if self.element(id).is_some() {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// The element currently holding host focus
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Whether the element takes part in native Tab order
    pub fn is_tabbable(&self, id: NodeId) -> bool {
        if self.has_attr(id, "disabled") {
            return false;
        }
        if let Some(index) = self
            .attr(id, "tabindex")
            .and_then(|t| t.trim().parse::<i32>().ok())
        {
            return index >= 0;
        }
        match self.tag_name(id).as_deref() {
            Some("button" | "select" | "textarea") => true,
            Some("input") => self
                .attr(id, "type")
                .map(|t| !t.trim().eq_ignore_ascii_case("hidden"))
                .unwrap_or(true),
            Some("a" | "area") => self.has_attr(id, "href"),
            _ => false,
        }
    }

    /// Tabbable elements in document order
    pub fn tab_order(&self) -> Vec<NodeId> {
        self.all_elements()
            .into_iter()
            .filter(|&id| self.is_tabbable(id))
            .collect()
    }

    /// Emulate a Tab (or Shift+Tab) press: move focus to the next tabbable
    /// element after (or before) the focused one, wrapping at the ends.
    pub fn advance_focus(&mut self, backwards: bool) -> Option<NodeId> {
        let all = self.all_elements();
        let len = all.len();
        if len == 0 {
            return None;
        }
        let start = self
            .focused
            .and_then(|focused| all.iter().position(|&id| id == focused));

        for step in 1..=len {
            let i = cycle_position(start, len, step, backwards);
            if self.is_tabbable(all[i]) {
                self.focused = Some(all[i]);
                return Some(all[i]);
            }
        }
        None
    }

    fn all_elements(&self) -> Vec<NodeId> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(|el| el.id())
            .collect()
    }
}

/// Extract the page title from HTML
pub fn extract_title(html: &str) -> Option<String> {
    title_of(&Html::parse_document(html))
}

fn title_of(html: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    html.select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| OwlError::SelectorError(format!("{}: {:?}", css, e)))
}

fn direct_text_nodes<'a>(node: Option<NodeRef<'a, Node>>) -> impl Iterator<Item = &'a str> {
    node.into_iter()
        .flat_map(|node| node.children())
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
}

fn collect_text_excluding(node: NodeRef<'_, Node>, skip: &[&str], out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                if !skip.iter().any(|tag| el.name().eq_ignore_ascii_case(tag)) {
                    collect_text_excluding(child, skip, out);
                }
            }
            _ => {}
        }
    }
}
