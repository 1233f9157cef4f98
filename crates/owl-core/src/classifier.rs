//! Role classification
//!
//! Converts an element into an [`AccessibleNode`]. Classification runs a
//! fixed list of rules in order and the first rule that applies wins:
//!
//! 1. an explicit ARIA `role` attribute overrides everything else
//! 2. a tag-specific strategy picked from the tag name
//! 3. a generic fallback for unrecognised tags
//!
//! Names come only from the explicit `name` attribute; label association
//! (`for`, `aria-labelledby`) is not consulted.

use crate::accessible_node::{AccessibleNode, Role, DEFAULT_SEPARATOR};
use crate::document::Document;
use crate::{OwlError, Result};
use ego_tree::NodeId;

/// Tags whose subtree is left out of a list item's own text
const NESTED_LIST_TAGS: &[&str] = &["ul", "ol", "dl"];

/// Classification rules, in precedence order
#[derive(Debug, Clone, Copy)]
enum Rule {
    RoleOverride,
    TagStrategy,
    Fallback,
}

const PRECEDENCE: [Rule; 3] = [Rule::RoleOverride, Rule::TagStrategy, Rule::Fallback];

/// How a recognised tag is described
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Heading,
    Text,
    Link,
    List,
    DefinitionList,
    ListItem,
    Image,
    Input,
    TextArea,
    Select,
    SelectOption,
    Button,
    Table,
    TableCaption,
    TableRow,
    TableHeading,
    TableCell,
}

/// Map a lower-cased tag name to its strategy
fn strategy_for(tag: &str) -> Option<Strategy> {
    let strategy = match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Strategy::Heading,
        "p" | "div" | "span" | "pre" | "blockquote" | "address" | "label" | "legend"
        | "figcaption" => Strategy::Text,
        "a" => Strategy::Link,
        "ul" | "ol" => Strategy::List,
        "dl" => Strategy::DefinitionList,
        "li" | "dt" | "dd" => Strategy::ListItem,
        "img" => Strategy::Image,
        "input" => Strategy::Input,
        "textarea" => Strategy::TextArea,
        "select" => Strategy::Select,
        "option" => Strategy::SelectOption,
        "button" => Strategy::Button,
        "table" => Strategy::Table,
        "caption" => Strategy::TableCaption,
        "tr" => Strategy::TableRow,
        "th" => Strategy::TableHeading,
        "td" => Strategy::TableCell,
        _ => return None,
    };
    Some(strategy)
}

/// Options controlling how descriptions are rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierOptions {
    /// Separator copied into every node
    pub separator: String,
    /// Annotate list items with "{position} of {count}"
    pub list_position: bool,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            list_position: false,
        }
    }
}

/// Rule-based element classifier
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    options: ClassifierOptions,
}

/// Classify an element with default options
pub fn classify(doc: &Document, id: NodeId) -> Result<AccessibleNode> {
    Classifier::default().classify(doc, id)
}

impl Classifier {
    pub fn new(options: ClassifierOptions) -> Self {
        Self { options }
    }

    /// Build the accessible description of an element.
    ///
    /// Fails with [`OwlError::MissingTag`] for nodes that are not elements
    /// and [`OwlError::InvalidHeadingLevel`] when a heading level cannot be
    /// resolved. Missing optional attributes never fail.
    pub fn classify(&self, doc: &Document, id: NodeId) -> Result<AccessibleNode> {
        let tag = doc.tag_name(id).ok_or(OwlError::MissingTag(id))?;
        let base = AccessibleNode::new(id, tag.as_str())
            .with_separator(self.options.separator.as_str())
            .with_name(explicit_name(doc, id));

        for rule in PRECEDENCE {
            let described = match rule {
                Rule::RoleOverride => self.role_override(doc, id, &base)?,
                Rule::TagStrategy => self.tag_strategy(doc, id, &tag, &base)?,
                Rule::Fallback => Some(
                    base.clone()
                        .with_role(Role::Generic)
                        .with_value(Some(trimmed_text(doc, id))),
                ),
            };
            if let Some(node) = described {
                return Ok(node);
            }
        }

        Err(OwlError::Other(format!("no classification rule matched <{}>", tag)))
    }

    fn role_override(
        &self,
        doc: &Document,
        id: NodeId,
        base: &AccessibleNode,
    ) -> Result<Option<AccessibleNode>> {
        // A role attribute may list fallbacks; the first token is the role
        let Some(role) = doc
            .attr(id, "role")
            .and_then(|r| r.split_whitespace().next())
            .map(|r| r.to_ascii_lowercase())
        else {
            return Ok(None);
        };

        let role = match role.as_str() {
            "none" | "presentation" => Role::Generic,
            "heading" => Role::Known(format!("heading level {}", heading_level(doc, id)?)),
            _ => Role::Known(role),
        };
        let value = aria_label(doc, id).unwrap_or_else(|| trimmed_text(doc, id));

        Ok(Some(base.clone().with_role(role).with_value(Some(value))))
    }

    fn tag_strategy(
        &self,
        doc: &Document,
        id: NodeId,
        tag: &str,
        base: &AccessibleNode,
    ) -> Result<Option<AccessibleNode>> {
        let Some(strategy) = strategy_for(tag) else {
            return Ok(None);
        };

        let (role, value) = match strategy {
            Strategy::Heading => (
                Role::Known(format!("heading level {}", parse_level(&tag[1..])?)),
                Some(trimmed_text(doc, id)),
            ),
            Strategy::Text => (Role::Generic, Some(trimmed_text(doc, id))),
            Strategy::Link => (Role::known("link"), Some(trimmed_text(doc, id))),
            Strategy::List => (Role::known("list"), Some(doc.direct_text(id).trim().to_string())),
            Strategy::DefinitionList => (
                Role::known("list"),
                Some(concat_children(doc, id, &["dt", "dd"])),
            ),
            Strategy::ListItem => (
                Role::known("list item"),
                Some(doc.text_excluding(id, NESTED_LIST_TAGS).trim().to_string()),
            ),
            Strategy::Image => (Role::known("img"), doc.attr(id, "alt").map(String::from)),
            Strategy::Input => (
                Role::known(input_role(doc.attr(id, "type"))),
                aria_label(doc, id).or_else(|| doc.attr(id, "value").map(String::from)),
            ),
            Strategy::TextArea => (Role::known("textbox"), control_text(doc, id)),
            Strategy::Select => (
                Role::known("combobox"),
                aria_label(doc, id).or_else(|| selected_option_text(doc, id)),
            ),
            Strategy::SelectOption => (Role::known("option"), control_text(doc, id)),
            Strategy::Button => (Role::known("button"), control_text(doc, id)),
            Strategy::Table => (
                Role::known("table"),
                Some(concat_children(doc, id, &["caption"])),
            ),
            Strategy::TableCaption => (Role::known("table caption"), Some(trimmed_text(doc, id))),
            Strategy::TableRow => (
                Role::known("table row"),
                Some(concat_children(doc, id, &["th", "td"])),
            ),
            Strategy::TableHeading => (Role::known("table heading"), Some(trimmed_text(doc, id))),
            Strategy::TableCell => (Role::known("table cell"), Some(trimmed_text(doc, id))),
        };

        let metadata = if strategy == Strategy::ListItem && self.options.list_position {
            list_position(doc, id)
        } else {
            None
        };

        Ok(Some(
            base.clone()
                .with_role(role)
                .with_value(value)
                .with_metadata(metadata),
        ))
    }
}

/// Resolve the heading level of an element: `aria-level` first, then the
/// digit of an `h1`..`h6` tag.
pub fn heading_level(doc: &Document, id: NodeId) -> Result<u32> {
    if let Some(level) = doc.attr(id, "aria-level") {
        return parse_level(level);
    }
    let tag = doc.tag_name(id).ok_or(OwlError::MissingTag(id))?;
    match strategy_for(&tag) {
        Some(Strategy::Heading) => parse_level(&tag[1..]),
        _ => Err(OwlError::InvalidHeadingLevel(format!(
            "<{}> has no aria-level",
            tag
        ))),
    }
}

fn parse_level(text: &str) -> Result<u32> {
    match text.trim().parse::<u32>() {
        Ok(level) if level > 0 => Ok(level),
        _ => Err(OwlError::InvalidHeadingLevel(text.to_string())),
    }
}

fn input_role(input_type: Option<&str>) -> &'static str {
    match input_type.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
        Some("checkbox") => "checkbox",
        Some("radio") => "radio",
        Some("reset" | "submit" | "button" | "image") => "button",
        _ => "textbox",
    }
}

fn explicit_name(doc: &Document, id: NodeId) -> Option<String> {
    doc.attr(id, "name").map(String::from)
}

fn aria_label(doc: &Document, id: NodeId) -> Option<String> {
    doc.attr(id, "aria-label").map(String::from)
}

fn trimmed_text(doc: &Document, id: NodeId) -> String {
    doc.text_content(id).trim().to_string()
}

/// `aria-label` if present, else the control's own text
fn control_text(doc: &Document, id: NodeId) -> Option<String> {
    aria_label(doc, id).or_else(|| Some(trimmed_text(doc, id)))
}

/// Trimmed text of each direct child with one of `tags`, concatenated
fn concat_children(doc: &Document, id: NodeId, tags: &[&str]) -> String {
    doc.child_elements(id)
        .into_iter()
        .filter(|&child| {
            doc.tag_name(child)
                .is_some_and(|tag| tags.contains(&tag.as_str()))
        })
        .map(|child| trimmed_text(doc, child))
        .collect()
}

fn selected_option_text(doc: &Document, id: NodeId) -> Option<String> {
    let options: Vec<NodeId> = doc
        .descendant_elements(id)
        .ok()?
        .into_iter()
        .filter(|&el| doc.tag_name(el).as_deref() == Some("option"))
        .collect();
    options
        .iter()
        .find(|&&option| doc.has_attr(option, "selected"))
        .or_else(|| options.first())
        .map(|&option| trimmed_text(doc, option))
}

fn list_position(doc: &Document, id: NodeId) -> Option<String> {
    let parent = doc.node(id)?.parent()?.id();
    let items: Vec<NodeId> = doc
        .child_elements(parent)
        .into_iter()
        .filter(|&child| matches!(doc.tag_name(child).as_deref(), Some("li" | "dt" | "dd")))
        .collect();
    let position = items.iter().position(|&item| item == id)? + 1;
    Some(format!("{} of {}", position, items.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str, css: &str) -> (Document, NodeId) {
        let doc = Document::parse(html);
        let id = doc.query_selector(css).unwrap().unwrap();
        (doc, id)
    }

    fn describe(html: &str, css: &str) -> AccessibleNode {
        let (doc, id) = parse(html, css);
        classify(&doc, id).unwrap()
    }

    #[test]
    fn test_headings_native_and_aria() {
        for level in 1..=6 {
            let tag = format!("h{}", level);
            let text = format!("Heading level {}", level);

            let (doc, id) = parse(&format!("<{0}> {1} </{0}>", tag, text), &tag);
            assert_eq!(heading_level(&doc, id).unwrap(), level);
            let node = classify(&doc, id).unwrap();
            assert_eq!(node.role(), &Role::Known(format!("heading level {}", level)));
            assert_eq!(node.name(), None);
            assert_eq!(node.value(), Some(text.as_str()));

            let (doc, id) = parse(
                &format!("<div role=\"heading\" aria-level=\"{}\">{}</div>", level, text),
                "div",
            );
            assert_eq!(heading_level(&doc, id).unwrap(), level);
            let node = classify(&doc, id).unwrap();
            assert_eq!(node.role(), &Role::Known(format!("heading level {}", level)));
            assert_eq!(node.name(), None);
            assert_eq!(node.value(), Some(text.as_str()));
        }
    }

    #[test]
    fn test_heading_role_without_level_fails() {
        let (doc, id) = parse("<div role='heading'>Title</div>", "div");
        assert!(matches!(
            classify(&doc, id),
            Err(OwlError::InvalidHeadingLevel(_))
        ));

        for bad in ["0", "-2", "two", ""] {
            let (doc, id) = parse(
                &format!("<div role='heading' aria-level='{}'>Title</div>", bad),
                "div",
            );
            assert!(matches!(
                classify(&doc, id),
                Err(OwlError::InvalidHeadingLevel(_))
            ));
        }
    }

    #[test]
    fn test_heading_role_on_native_heading_uses_tag_digit() {
        let node = describe("<h4 role='heading'>Deep</h4>", "h4");
        assert_eq!(node.role().as_str(), Some("heading level 4"));
    }

    #[test]
    fn test_paragraph() {
        let node = describe("<p>  This is a paragraph  </p>", "p");
        assert_eq!(node.role(), &Role::Generic);
        assert_eq!(node.name(), None);
        assert_eq!(node.value(), Some("This is a paragraph"));
        assert_eq!(node.to_string(), "This is a paragraph");
    }

    #[test]
    fn test_internal_whitespace_preserved() {
        let node = describe("<p>\n  two   spaces\n</p>", "p");
        assert_eq!(node.value(), Some("two   spaces"));
    }

    #[test]
    fn test_links() {
        let node = describe("<a href=\"#\" name=\"link\">This is a link</a>", "a");
        assert_eq!(node.role().as_str(), Some("link"));
        assert_eq!(node.name(), Some("link"));
        assert_eq!(node.value(), Some("This is a link"));
        assert_eq!(node.to_string(), "link: link: This is a link");

        let node = describe("<div role=\"link\" href=\"#\">This is a link</div>", "div");
        assert_eq!(node.role().as_str(), Some("link"));
        assert_eq!(node.name(), None);
        assert_eq!(node.value(), Some("This is a link"));
    }

    #[test]
    fn test_ordered_and_unordered_lists() {
        for tag in ["ol", "ul"] {
            let html = format!("<{0}><li>Item 1</li></{0}>", tag);
            let node = describe(&html, tag);
            assert_eq!(node.role().as_str(), Some("list"));
            assert_eq!(node.name(), None);
            assert_eq!(node.value(), Some(""));
            assert_eq!(node.to_string(), "list");

            let node = describe(&html, "li");
            assert_eq!(node.role().as_str(), Some("list item"));
            assert_eq!(node.name(), None);
            assert_eq!(node.value(), Some("Item 1"));
        }
    }

    #[test]
    fn test_definition_list() {
        let html = "<dl><dt>Term</dt><dd>Definition</dd></dl>";
        let node = describe(html, "dl");
        assert_eq!(node.role().as_str(), Some("list"));
        assert_eq!(node.value(), Some("TermDefinition"));

        let node = describe(html, "dt");
        assert_eq!(node.role().as_str(), Some("list item"));
        assert_eq!(node.value(), Some("Term"));

        let node = describe(html, "dd");
        assert_eq!(node.role().as_str(), Some("list item"));
        assert_eq!(node.value(), Some("Definition"));
    }

    #[test]
    fn test_list_item_skips_nested_list_text() {
        let node = describe(
            "<ul><li>Fruit <ul><li>Apple</li><li>Pear</li></ul></li></ul>",
            "li",
        );
        assert_eq!(node.value(), Some("Fruit"));
    }

    #[test]
    fn test_list_position_metadata() {
        let doc = Document::parse("<ul><li>Alpha</li><li>Beta</li><li>Gamma</li></ul>");
        let items = doc.query_selector_all("li").unwrap();
        let classifier = Classifier::new(ClassifierOptions {
            list_position: true,
            ..Default::default()
        });
        let node = classifier.classify(&doc, items[1]).unwrap();
        assert_eq!(node.metadata(), Some("2 of 3"));
        assert_eq!(node.to_string(), "list item 2 of 3: Beta");

        // Off by default
        assert_eq!(classify(&doc, items[1]).unwrap().metadata(), None);
    }

    #[test]
    fn test_images() {
        let node = describe("<img src=\"image.png\" alt=\"Sample image\" />", "img");
        assert_eq!(node.role().as_str(), Some("img"));
        assert_eq!(node.name(), None);
        assert_eq!(node.value(), Some("Sample image"));

        let node = describe("<div role=\"img\" aria-label=\"Sample image\">Test</div>", "div");
        assert_eq!(node.role().as_str(), Some("img"));
        assert_eq!(node.name(), None);
        assert_eq!(node.value(), Some("Sample image"));
    }

    #[test]
    fn test_image_without_alt_is_not_an_error() {
        let node = describe("<img src=\"image.png\">", "img");
        assert_eq!(node.value(), None);
        assert_eq!(node.to_string(), "img");
    }

    #[test]
    fn test_inputs() {
        for input_type in ["checkbox", "radio", "reset", "submit", "text"] {
            let role = match input_type {
                "reset" | "submit" => "button",
                "text" => "textbox",
                other => other,
            };
            let name = format!("test-{}", input_type);
            let value = format!("Test {}", input_type);
            let node = describe(
                &format!(
                    "<input type=\"{}\" aria-label=\"{}\" name=\"{}\" />",
                    input_type, value, name
                ),
                "input",
            );
            assert_eq!(node.role().as_str(), Some(role));
            assert_eq!(node.name(), Some(name.as_str()));
            assert_eq!(node.value(), Some(value.as_str()));
        }
    }

    #[test]
    fn test_input_defaults_to_textbox_and_value_attribute() {
        let node = describe("<input name=\"q\" value=\"owls\">", "input");
        assert_eq!(node.role().as_str(), Some("textbox"));
        assert_eq!(node.value(), Some("owls"));
    }

    #[test]
    fn test_textarea() {
        let node = describe(
            "<textarea name=\"test-textarea\" aria-label=\"Test Textarea\">Test Textarea Value</textarea>",
            "textarea",
        );
        assert_eq!(node.role().as_str(), Some("textbox"));
        assert_eq!(node.name(), Some("test-textarea"));
        assert_eq!(node.value(), Some("Test Textarea"));

        let node = describe("<textarea> Draft </textarea>", "textarea");
        assert_eq!(node.value(), Some("Draft"));
    }

    #[test]
    fn test_select_and_option() {
        let html = "<select name=\"test-select\" aria-label=\"Test Select\"><option name=\"test-option\">Test Option</option></select>";
        let node = describe(html, "select");
        assert_eq!(node.role().as_str(), Some("combobox"));
        assert_eq!(node.name(), Some("test-select"));
        assert_eq!(node.value(), Some("Test Select"));

        let node = describe(html, "option");
        assert_eq!(node.role().as_str(), Some("option"));
        assert_eq!(node.name(), Some("test-option"));
        assert_eq!(node.value(), Some("Test Option"));
    }

    #[test]
    fn test_select_without_label_uses_selected_option() {
        let node = describe(
            "<select><option>One</option><option selected>Two</option></select>",
            "select",
        );
        assert_eq!(node.value(), Some("Two"));

        let node = describe("<select><option>One</option></select>", "select");
        assert_eq!(node.value(), Some("One"));
    }

    #[test]
    fn test_button() {
        let node = describe("<button name=\"test-button\">Test Button</button>", "button");
        assert_eq!(node.role().as_str(), Some("button"));
        assert_eq!(node.name(), Some("test-button"));
        assert_eq!(node.value(), Some("Test Button"));
    }

    #[test]
    fn test_tables() {
        let html = "<table><caption>Table Caption</caption><tr><th>Table Heading</th><td>Table Cell</td></tr></table>";

        let node = describe(html, "table");
        assert_eq!(node.role().as_str(), Some("table"));
        assert_eq!(node.name(), None);
        assert_eq!(node.value(), Some("Table Caption"));

        let node = describe(html, "caption");
        assert_eq!(node.role().as_str(), Some("table caption"));
        assert_eq!(node.value(), Some("Table Caption"));

        let node = describe(html, "tr");
        assert_eq!(node.role().as_str(), Some("table row"));
        assert_eq!(node.value(), Some("Table HeadingTable Cell"));

        let node = describe(html, "th");
        assert_eq!(node.role().as_str(), Some("table heading"));
        assert_eq!(node.value(), Some("Table Heading"));

        let node = describe(html, "td");
        assert_eq!(node.role().as_str(), Some("table cell"));
        assert_eq!(node.value(), Some("Table Cell"));
    }

    #[test]
    fn test_table_without_caption() {
        let node = describe("<table><tr><td>x</td></tr></table>", "table");
        assert_eq!(node.value(), Some(""));
        assert_eq!(node.to_string(), "table");
    }

    #[test]
    fn test_fallback_for_unknown_tags() {
        let node = describe("<section name=\"intro\"> Welcome </section>", "section");
        assert_eq!(node.role(), &Role::Generic);
        assert_eq!(node.name(), Some("intro"));
        assert_eq!(node.value(), Some("Welcome"));
    }

    #[test]
    fn test_role_override_beats_tag() {
        let node = describe("<li role=\"tab\" aria-label=\"Settings\">ignored</li>", "li");
        assert_eq!(node.role().as_str(), Some("tab"));
        assert_eq!(node.value(), Some("Settings"));

        let node = describe("<ul role=\"presentation\">Plain</ul>", "ul");
        assert_eq!(node.role(), &Role::Generic);

        let node = describe("<span role=\"switch checkbox\">On</span>", "span");
        assert_eq!(node.role().as_str(), Some("switch"));
    }

    #[test]
    fn test_non_element_fails_predictably() {
        let doc = Document::parse("<p>Text</p>");
        let p = doc.query_selector("p").unwrap().unwrap();
        let text = doc.node(p).unwrap().first_child().unwrap().id();
        assert!(matches!(classify(&doc, text), Err(OwlError::MissingTag(_))));
    }

    #[test]
    fn test_custom_separator() {
        let (doc, id) = parse("<a name=\"home\">Home</a>", "a");
        let classifier = Classifier::new(ClassifierOptions {
            separator: " - ".to_string(),
            ..Default::default()
        });
        assert_eq!(
            classifier.classify(&doc, id).unwrap().to_string(),
            "link - home - Home"
        );
    }
}
