//! Minimal document tree used for canonical serialization.

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Write as _;

use crate::error::{DiffError, DiffResult};

/// One element with its qualified name kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    /// Qualified name, prefix included
    pub name: String,
    /// Attributes in document order, namespace declarations included
    pub attributes: Vec<(String, String)>,
    /// Text content, concatenated
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    /// Name without its prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Every descendant whose local name is `name`, depth first.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a Node>) {
        for child in &self.children {
            if child.local_name() == name {
                found.push(child);
            }
            child.collect(name, found);
        }
    }

    /// First descendant with local name `name`.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.children.iter().find_map(|child| {
            if child.local_name() == name {
                Some(child)
            } else {
                child.find(name)
            }
        })
    }

    /// Trimmed text of the first descendant named `name`, if non-empty.
    pub fn find_text(&self, name: &str) -> Option<&str> {
        self.find(name)
            .map(|n| n.text.trim())
            .filter(|t| !t.is_empty())
    }

    /// Trimmed text of the direct child named `name`, if non-empty.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|c| c.local_name() == name)
            .map(|c| c.text.trim())
            .filter(|t| !t.is_empty())
    }

    /// Drops whitespace-only text, trims text of elements with children and
    /// sorts attributes by name, recursively.
    pub fn canonicalize(&mut self) {
        if self.text.trim().is_empty() {
            self.text.clear();
        } else if !self.children.is_empty() {
            self.text = self.text.trim().to_string();
        }
        self.attributes.sort();
        for child in &mut self.children {
            child.canonicalize();
        }
    }

    /// Pretty prints with two-space indentation, one element per line.
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, 0);
        out
    }

    fn write(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}<{}", self.name);
        for (key, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", key, escape(value.as_str()));
        }
        match (self.text.is_empty(), self.children.is_empty()) {
            (true, true) => out.push_str("/>\n"),
            (false, true) => {
                let _ = writeln!(out, ">{}</{}>", partial_escape(self.text.as_str()), self.name);
            }
            (_, false) => {
                out.push('>');
                out.push_str(&partial_escape(self.text.as_str()));
                out.push('\n');
                for child in &self.children {
                    child.write(out, depth + 1);
                }
                let _ = writeln!(out, "{indent}</{}>", self.name);
            }
        }
    }
}

/// Strips the namespace prefix from a qualified name.
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn start_node(start: &BytesStart<'_>) -> DiffResult<Node> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(Node {
        name,
        attributes,
        ..Node::default()
    })
}

fn attach(node: Node, stack: &mut [Node], root: &mut Option<Node>) -> DiffResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match root {
        Some(first) => Err(DiffError::MultipleRoots {
            first: first.name.clone(),
            second: node.name,
        }),
        None => {
            *root = Some(node);
            Ok(())
        }
    }
}

/// Parses a document into its single root element.
///
/// Declarations, comments and processing instructions are dropped.
pub fn parse(xml: &str) -> DiffResult<Node> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(start_node(&start)?),
            Event::Empty(start) => {
                let node = start_node(&start)?;
                attach(node, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| DiffError::parse("closing tag without opening tag"))?;
                attach(node, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                match stack.last_mut() {
                    Some(node) => node.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(DiffError::parse("text outside the root element")),
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DiffError::parse(format!("unclosed element '{}'", open.name)));
    }
    root.ok_or(DiffError::EmptyDocument)
}
