//! Rendered payloads.

use crate::document::ConfigDocument;

/// What a renderer hands to a device session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Ordered, non-empty configuration lines
    Commands(Vec<String>),
    /// One transactional edit document
    Document(ConfigDocument),
}

impl Payload {
    /// Builds a command payload, dropping blank lines.
    pub fn commands<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Payload::Commands(
            lines
                .into_iter()
                .map(Into::into)
                .filter(|line: &String| !line.trim().is_empty())
                .collect(),
        )
    }

    pub fn as_commands(&self) -> Option<&[String]> {
        match self {
            Payload::Commands(lines) => Some(lines),
            Payload::Document(_) => None,
        }
    }

    pub fn as_document(&self) -> Option<&ConfigDocument> {
        match self {
            Payload::Document(doc) => Some(doc),
            Payload::Commands(_) => None,
        }
    }

    /// Short kind name for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Commands(_) => "commands",
            Payload::Document(_) => "document",
        }
    }

    /// Text shown to an operator: one command per line, or the serialized
    /// document.
    pub fn to_text(&self) -> String {
        match self {
            Payload::Commands(lines) => lines.join("\n"),
            Payload::Document(doc) => doc.to_xml(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Commands(lines) => lines.is_empty(),
            Payload::Document(doc) => doc.blocks().is_empty(),
        }
    }
}
