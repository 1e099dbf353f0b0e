//! Render nodes for the notification menu.
//!
//! Pending messages are presented as one top-level group node with one
//! child node per message. The host attaches the nodes to its own menu.

use serde::{Deserialize, Serialize};

/// Configuration for the notification menu group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuAlertConfig {
    /// Identifier of the top-level group node. Child ids are derived from it.
    pub group_id: String,
    /// Display text of the group node.
    pub group_title: String,
    /// Link target for every node.
    pub href: String,
    /// Style class for every node.
    pub class: String,
}

impl Default for MenuAlertConfig {
    fn default() -> Self {
        Self {
            group_id: "wp_stream_alert_notify".to_string(),
            group_title: "New Stream Alert".to_string(),
            href: "#".to_string(),
            class: "opposite".to_string(),
        }
    }
}

impl MenuAlertConfig {
    /// Sets the group node identifier.
    #[must_use]
    pub fn with_group_id(mut self, id: impl Into<String>) -> Self {
        self.group_id = id.into();
        self
    }

    /// Sets the group node title.
    #[must_use]
    pub fn with_group_title(mut self, title: impl Into<String>) -> Self {
        self.group_title = title.into();
        self
    }

    /// Sets the link target.
    #[must_use]
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = href.into();
        self
    }

    /// Sets the style class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Builds the group node and one child node per message.
    ///
    /// Returns no nodes at all when there are no messages. Message text is
    /// HTML-escaped.
    #[must_use]
    pub fn render(&self, messages: &[String]) -> Vec<MenuNode> {
        if messages.is_empty() {
            return Vec::new();
        }

        let mut nodes = Vec::with_capacity(messages.len() + 1);
        nodes.push(MenuNode {
            id: self.group_id.clone(),
            parent: None,
            title: self.group_title.clone(),
            href: self.href.clone(),
            class: self.class.clone(),
        });
        nodes.extend(messages.iter().enumerate().map(|(index, message)| MenuNode {
            id: format!("{}_{index}", self.group_id),
            parent: Some(self.group_id.clone()),
            title: escape_html(message),
            href: self.href.clone(),
            class: self.class.clone(),
        }));
        nodes
    }
}

/// A single node for the host's notification menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    /// Node identifier.
    pub id: String,
    /// Identifier of the parent node; `None` for the top-level group.
    pub parent: Option<String>,
    /// Display text, already escaped.
    pub title: String,
    /// Link target.
    pub href: String,
    /// Style class.
    pub class: String,
}

impl MenuNode {
    /// Returns true if this is the top-level group node.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        self.parent.is_none()
    }
}

/// What the presentation path did for one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Presentation {
    /// Nothing was pending; nothing was shown and nothing was cleared.
    NotDisplayed,
    /// Pending messages were rendered and then cleared.
    Displayed {
        /// The group node followed by one child per message.
        nodes: Vec<MenuNode>,
    },
}

impl Presentation {
    /// Returns true if anything was displayed.
    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        matches!(self, Self::Displayed { .. })
    }

    /// Returns the rendered nodes, empty when nothing was displayed.
    #[must_use]
    pub fn nodes(&self) -> &[MenuNode] {
        match self {
            Self::NotDisplayed => &[],
            Self::Displayed { nodes } => nodes,
        }
    }

    /// Returns the child nodes, one per message.
    pub fn messages(&self) -> impl Iterator<Item = &MenuNode> {
        self.nodes().iter().filter(|node| !node.is_group())
    }
}

/// Escapes text for display inside HTML.
///
/// Entity references already present (`&amp;`, `&#39;`, `&#x27;`) are kept
/// as they are; only bare `&` is encoded.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for (index, c) in text.char_indices() {
        match c {
            '&' if is_entity(&text[index + 1..]) => escaped.push('&'),
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Returns true if `rest` (the text after an `&`) starts with a complete
/// named, decimal or hex entity reference.
fn is_entity(rest: &str) -> bool {
    let Some((body, _)) = rest.split_once(';') else {
        return false;
    };
    if let Some(numeric) = body.strip_prefix('#') {
        return match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => !numeric.is_empty() && numeric.chars().all(|c| c.is_ascii_digit()),
        };
    }
    body.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && body.chars().all(|c| c.is_ascii_alphanumeric())
}
