//! Accessible descriptions
//!
//! An [`AccessibleNode`] is what the simulated screen reader announces for
//! one element: a role, an optional name and an optional value. Nodes are
//! built once by the classifier and never patched afterwards; a rescan
//! produces fresh nodes.

use ego_tree::NodeId;
use std::fmt;

/// Default separator between announced fields
pub const DEFAULT_SEPARATOR: &str = ": ";

/// Accessibility role of a node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Role {
    /// Not computed yet
    #[default]
    Uncomputed,
    /// Explicitly no role (plain text containers, `role="none"`)
    Generic,
    /// A named role, possibly composite ("heading level 3", "table row")
    Known(String),
}

impl Role {
    pub fn known(role: impl Into<String>) -> Self {
        Role::Known(role.into())
    }

    /// The role text, if there is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Role::Known(role) => Some(role),
            Role::Uncomputed | Role::Generic => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.as_str().is_some_and(|r| r.starts_with("heading"))
    }
}

/// A node in the simulated accessibility view of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibleNode {
    /// Element this description was computed for (non-owning)
    source: NodeId,
    /// Lower-cased tag name of the source element
    tag_name: String,
    /// Accessible role
    role: Role,
    /// Accessible name (explicit `name` attribute only)
    name: Option<String>,
    /// Text content or control value
    value: Option<String>,
    /// Descriptive suffix for the role text, e.g. list position
    metadata: Option<String>,
    /// Separator used by the `Display` rendering
    separator: String,
}

impl AccessibleNode {
    /// A node with every field still unset
    pub fn new(source: NodeId, tag_name: impl Into<String>) -> Self {
        Self {
            source,
            tag_name: tag_name.into(),
            role: Role::Uncomputed,
            name: None,
            value: None,
            metadata: None,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_value(mut self, value: Option<String>) -> Self {
        self.value = value;
        self
    }

    pub fn with_metadata(mut self, metadata: Option<String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Role text with metadata appended
    pub fn role_text(&self) -> Option<String> {
        let role = self.role.as_str()?;
        match self.metadata.as_deref().filter(|m| !m.is_empty()) {
            Some(metadata) => Some(format!("{} {}", role, metadata)),
            None => Some(role.to_string()),
        }
    }
}

impl fmt::Display for AccessibleNode {
    /// Joins the non-empty fields [role + metadata, name, value]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = self.role_text();
        let parts = [role.as_deref(), self.name.as_deref(), self.value.as_deref()];
        let text = parts
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(&self.separator);
        f.write_str(&text)
    }
}
