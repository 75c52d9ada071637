//! Readable (Markdown-flavoured) and raw JSON renderings of parsed chunks

use serde::Serialize;

use super::chunk::Chunk;
use super::element::{Element, ElementKind};
use super::error::DomainError;

/// Output of [`render_document`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", content = "body", rename_all = "snake_case")]
pub enum RenderedDocument {
    Readable(String),
    RawJson(String),
}

impl RenderedDocument {
    pub fn body(&self) -> &str {
        match self {
            Self::Readable(body) | Self::RawJson(body) => body,
        }
    }
}

/// Render chunks either as readable text or as pretty-printed JSON
pub fn render_document(
    chunks: &[Chunk],
    show_raw_json: bool,
) -> Result<RenderedDocument, DomainError> {
    if show_raw_json {
        let json = serde_json::to_string_pretty(chunks)
            .map_err(|e| DomainError::unexpected(format!("Failed to serialize chunks: {}", e)))?;
        return Ok(RenderedDocument::RawJson(json));
    }

    Ok(RenderedDocument::Readable(render_chunks(chunks)))
}

/// Render every chunk, heading first, separated by blank lines
pub fn render_chunks(chunks: &[Chunk]) -> String {
    let mut blocks = Vec::new();

    for chunk in chunks {
        if let Some(heading) = chunk.heading.as_deref() {
            blocks.push(format!("## {}", heading.trim()));
        }

        blocks.extend(chunk.content.iter().filter_map(render_element));
    }

    blocks.join("\n\n")
}

/// Render a single element, `None` when it has nothing worth showing
pub fn render_element(element: &Element) -> Option<String> {
    let text = element.text();

    match &element.kind {
        ElementKind::PageBreak => None,
        ElementKind::Title => text.map(|t| format!("## {t}")),
        ElementKind::Heading => text.map(|t| format!("### {t}")),
        ElementKind::Header => text.map(|t| format!("**{t}**")),
        ElementKind::NarrativeText
        | ElementKind::ListItem
        | ElementKind::CompositeElement
        | ElementKind::Address => text.map(str::to_string),
        ElementKind::UncategorizedText => text
            .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string),
        ElementKind::EmailAddress => text.map(|t| format!("<mailto:{t}>")),
        ElementKind::PageNumber => Some(format!("Page {}", text.unwrap_or_default())),
        ElementKind::Footer => Some(format!("---\n{}", text.unwrap_or_default())),
        ElementKind::Image => Some(format!(
            "Image: {}",
            text.unwrap_or("No description available")
        )),
        ElementKind::Table => text.and_then(render_table),
        ElementKind::FigureCaption
        | ElementKind::Formula
        | ElementKind::CodeSnippet
        | ElementKind::Other(_) => Some(format!(
            "{}: {}",
            element.kind,
            text.unwrap_or("N/A")
        )),
    }
}

/// Tab-separated rows become a Markdown table; the first row is the header
fn render_table(text: &str) -> Option<String> {
    let rows: Vec<Vec<&str>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(str::trim).collect())
        .collect();

    let width = rows.iter().map(Vec::len).max()?;
    let mut out = Vec::with_capacity(rows.len() + 1);

    for (i, cells) in rows.iter().enumerate() {
        let padded: Vec<&str> = (0..width)
            .map(|c| cells.get(c).copied().unwrap_or(""))
            .collect();
        out.push(format!("| {} |", padded.join(" | ")));

        if i == 0 {
            out.push(format!("|{}", " --- |".repeat(width)));
        }
    }

    Some(out.join("\n"))
}
