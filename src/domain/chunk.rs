//! Groups a flat element sequence into heading-delimited chunks

use serde::{Deserialize, Serialize};

use super::element::Element;

/// A heading-delimited group of elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub heading: Option<String>,
    pub content: Vec<Element>,
}

/// Partition `elements` into chunks in a single pass.
///
/// Heading kinds close the current chunk and name the next one, page breaks
/// close the current chunk and clear the heading. Neither ever lands in a
/// chunk's content, and a chunk is only emitted when it has content.
pub fn organize(elements: impl IntoIterator<Item = Element>) -> Vec<Chunk> {
    let mut organizer = Organizer::default();

    for element in elements {
        organizer.push(element);
    }

    organizer.finish()
}

#[derive(Default)]
struct Organizer {
    chunks: Vec<Chunk>,
    heading: Option<String>,
    buffer: Vec<Element>,
}

impl Organizer {
    fn push(&mut self, element: Element) {
        if element.kind.is_heading() {
            self.flush();
            self.heading = element.text.filter(|t| !t.is_empty());
            return;
        }

        if element.kind.is_page_break() {
            self.flush();
            self.heading = None;
            return;
        }

        self.buffer.push(element);
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        self.chunks.push(Chunk {
            heading: self.heading.clone(),
            content: std::mem::take(&mut self.buffer),
        });
    }

    fn finish(mut self) -> Vec<Chunk> {
        self.flush();
        self.chunks
    }
}
