//! Typed document fragments as returned by the parsing service

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a parsed element
///
/// Unknown tags are kept verbatim in `Other` so newer service versions never
/// break deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Title,
    NarrativeText,
    EmailAddress,
    UncategorizedText,
    PageNumber,
    Image,
    Heading,
    Header,
    Table,
    Footer,
    PageBreak,
    ListItem,
    FigureCaption,
    Formula,
    CompositeElement,
    Address,
    CodeSnippet,
    Other(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Title => "Title",
            Self::NarrativeText => "NarrativeText",
            Self::EmailAddress => "EmailAddress",
            Self::UncategorizedText => "UncategorizedText",
            Self::PageNumber => "PageNumber",
            Self::Image => "Image",
            Self::Heading => "Heading",
            Self::Header => "Header",
            Self::Table => "Table",
            Self::Footer => "Footer",
            Self::PageBreak => "PageBreak",
            Self::ListItem => "ListItem",
            Self::FigureCaption => "FigureCaption",
            Self::Formula => "Formula",
            Self::CompositeElement => "CompositeElement",
            Self::Address => "Address",
            Self::CodeSnippet => "CodeSnippet",
            Self::Other(tag) => tag,
        }
    }

    /// Kinds that open a new section
    pub fn is_heading(&self) -> bool {
        matches!(self, Self::Heading | Self::Header | Self::Title)
    }

    pub fn is_page_break(&self) -> bool {
        matches!(self, Self::PageBreak)
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Title" => Self::Title,
            "NarrativeText" => Self::NarrativeText,
            "EmailAddress" => Self::EmailAddress,
            "UncategorizedText" => Self::UncategorizedText,
            "PageNumber" => Self::PageNumber,
            "Image" => Self::Image,
            "Heading" => Self::Heading,
            "Header" => Self::Header,
            "Table" => Self::Table,
            "Footer" => Self::Footer,
            "PageBreak" => Self::PageBreak,
            "ListItem" => Self::ListItem,
            "FigureCaption" => Self::FigureCaption,
            "Formula" => Self::Formula,
            "CompositeElement" => Self::CompositeElement,
            "Address" => Self::Address,
            "CodeSnippet" => Self::CodeSnippet,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for ElementKind {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to every element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementMetadata {
    pub filetype: String,
    pub languages: Vec<String>,
    pub page_number: u32,
    pub filename: String,
    /// Weak reference to a hierarchical parent; never used for grouping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Any further fields the service sends, preserved for raw output
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A single parsed fragment of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub element_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub metadata: ElementMetadata,
}

impl Element {
    pub fn new(kind: impl Into<ElementKind>, element_id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            element_id: element_id.into(),
            text: None,
            metadata: ElementMetadata::default(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_metadata(mut self, metadata: ElementMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Text with surrounding whitespace removed, `None` when blank
    pub fn text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
