//! Typed block model shared by both conversion directions.

use serde::{Deserialize, Serialize};

/// Inline style flags carried by a [`RichSpan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    /// Bold text.
    pub bold: bool,
    /// Italic text.
    pub italic: bool,
    /// Inline code.
    pub code: bool,
    /// Strikethrough text.
    pub strikethrough: bool,
    /// Underlined text.
    pub underline: bool,
}

impl Annotations {
    /// Bold-only style.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    /// Whether no flag is set.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// A contiguous run of text with a uniform style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichSpan {
    /// Span text with markup stripped.
    pub text: String,
    /// Style flags.
    pub style: Annotations,
    /// Link target, if any.
    pub href: Option<String>,
}

impl RichSpan {
    /// Unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Bold span.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Annotations::bold(),
            href: None,
        }
    }

    /// Attach a link target.
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Heading depth supported by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    /// `#`
    H1,
    /// `##`
    H2,
    /// `###`
    H3,
}

impl HeadingLevel {
    /// Markdown marker for this level, without the trailing space.
    pub fn marker(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "#",
            HeadingLevel::H2 => "##",
            HeadingLevel::H3 => "###",
        }
    }
}

/// One unit of document content, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Plain paragraph.
    Paragraph(Vec<RichSpan>),
    /// Heading of the given level.
    Heading {
        /// Heading depth.
        level: HeadingLevel,
        /// Heading text.
        text: Vec<RichSpan>,
    },
    /// Bulleted list item.
    BulletedItem {
        /// Item text.
        text: Vec<RichSpan>,
        /// Nesting depth, 0 for top level.
        indent: usize,
    },
    /// Numbered list item.
    NumberedItem {
        /// Item text.
        text: Vec<RichSpan>,
        /// Nesting depth, 0 for top level.
        indent: usize,
    },
    /// Horizontal rule.
    Divider,
    /// Fenced code block.
    Code {
        /// Language tag; empty when unknown.
        language: String,
        /// Code text.
        text: Vec<RichSpan>,
    },
    /// Block quote.
    Quote(Vec<RichSpan>),
    /// Callout with an optional emoji icon.
    Callout {
        /// Icon emoji, if the store provided one.
        emoji: Option<String>,
        /// Callout text.
        text: Vec<RichSpan>,
    },
    /// Collapsible toggle.
    Toggle(Vec<RichSpan>),
    /// Checkbox item.
    Todo {
        /// Whether the box is ticked.
        checked: bool,
        /// Item text.
        text: Vec<RichSpan>,
    },
    /// A store block kind this crate does not model. Holds the kind name.
    Unsupported(String),
}

impl Block {
    /// Store-side name of this block kind.
    pub fn kind(&self) -> &str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Heading { level, .. } => match level {
                HeadingLevel::H1 => "heading_1",
                HeadingLevel::H2 => "heading_2",
                HeadingLevel::H3 => "heading_3",
            },
            Block::BulletedItem { .. } => "bulleted_list_item",
            Block::NumberedItem { .. } => "numbered_list_item",
            Block::Divider => "divider",
            Block::Code { .. } => "code",
            Block::Quote(_) => "quote",
            Block::Callout { .. } => "callout",
            Block::Toggle(_) => "toggle",
            Block::Todo { .. } => "to_do",
            Block::Unsupported(kind) => kind,
        }
    }

    /// Rich text of a text-bearing block.
    pub fn rich_text(&self) -> Option<&[RichSpan]> {
        match self {
            Block::Paragraph(text)
            | Block::Quote(text)
            | Block::Toggle(text)
            | Block::Heading { text, .. }
            | Block::BulletedItem { text, .. }
            | Block::NumberedItem { text, .. }
            | Block::Code { text, .. }
            | Block::Callout { text, .. }
            | Block::Todo { text, .. } => Some(text),
            Block::Divider | Block::Unsupported(_) => None,
        }
    }

    /// Concatenated span text, markup stripped.
    pub fn plain_text(&self) -> String {
        self.rich_text()
            .map(|spans| spans.iter().map(|s| s.text.as_str()).collect())
            .unwrap_or_default()
    }
}
