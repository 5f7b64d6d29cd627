//! Content documents produced by the acquisition strategies.

/// Metadata attached to an extracted document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// The URL the document was extracted from
    pub source: String,
    /// Page or video title, when one could be found
    pub title: Option<String>,
    /// Video author or channel name
    pub author: Option<String>,
    /// Video length in seconds
    pub length_seconds: Option<u64>,
}

/// A unit of extracted text plus optional metadata.
///
/// The text body may be empty; callers decide what an empty extraction
/// means for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub metadata: Metadata,
}

impl Document {
    /// Document with text and a source URL, no further metadata.
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Metadata {
                source: source.into(),
                ..Metadata::default()
            },
        }
    }

    /// True if the text body is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
