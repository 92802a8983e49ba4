//! Structured configuration documents.
//!
//! A [`ConfigDocument`] is a tree of namespaced [`Element`]s under a fixed
//! `<config>` wrapper. Namespaces are immutable [`Namespace`] values; the
//! prefixes a document declares are collected from its own tree when it is
//! serialized, so building one document never affects another.

use quick_xml::escape::{escape, partial_escape};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// XML declaration written ahead of every document
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" ?>";

/// Name of the document wrapper element
pub const CONFIG_ROOT: &str = "config";

/// Attribute marking a node for removal
pub const OPERATION_ATTR: &str = "operation";

/// A namespace prefix bound to its URI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub prefix: &'static str,
    pub uri: &'static str,
}

impl Namespace {
    pub const fn new(prefix: &'static str, uri: &'static str) -> Self {
        Self { prefix, uri }
    }
}

/// Base protocol namespace carrying the operation attribute
pub const NC: Namespace = Namespace::new("nc", "urn:ietf:params:xml:ns:netconf:base:1.0");

/// Interfaces
pub const IF: Namespace = Namespace::new("if", "http://www.ipinfusion.com/yang/ocnos/ipi-interface");

/// Sub-interface encapsulation
pub const IFEXT: Namespace = Namespace::new(
    "ifext",
    "http://www.ipinfusion.com/yang/ocnos/ipi-if-extended",
);

/// VRF definitions
pub const VRF: Namespace = Namespace::new("vrf", "http://www.ipinfusion.com/yang/ocnos/ipi-vrf");

/// BGP parameters of a VRF
pub const BGPVRF: Namespace = Namespace::new(
    "bgpvrf",
    "http://www.ipinfusion.com/yang/ocnos/ipi-bgp-vrf",
);

/// Network instances
pub const NETINST: Namespace = Namespace::new(
    "netinst",
    "http://www.ipinfusion.com/yang/ocnos/ipi-network-instance",
);

/// Link aggregation membership
pub const IFAGG: Namespace = Namespace::new(
    "ifagg",
    "http://www.ipinfusion.com/yang/ocnos/ipi-if-aggregate",
);

/// VLAN database
pub const VLAN: Namespace = Namespace::new("vlan", "http://www.ipinfusion.com/yang/ocnos/ipi-vlan");

/// VXLAN VLAN to VNI mappings
pub const VXLAN: Namespace = Namespace::new("vxlan", "http://www.ipinfusion.com/yang/ocnos/ipi-vxlan");

/// Prefix to URI bindings, ordered by prefix.
///
/// Built once and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    entries: BTreeMap<&'static str, &'static str>,
}

impl NamespaceTable {
    pub fn new(namespaces: impl IntoIterator<Item = Namespace>) -> Self {
        let mut entries = BTreeMap::new();
        for ns in namespaces {
            entries.entry(ns.prefix).or_insert(ns.uri);
        }
        Self { entries }
    }

    /// Every namespace structured-document renderers emit
    pub fn ocnos() -> Self {
        Self::new([NC, IF, IFEXT, VRF, BGPVRF, NETINST, IFAGG, VLAN, VXLAN])
    }

    /// Namespaces referenced by `root` and its descendants.
    pub fn used_by(root: &Element) -> Self {
        let mut found = Vec::new();
        root.collect_namespaces(&mut found);
        Self::new(found)
    }

    pub fn uri(&self, prefix: &str) -> Option<&'static str> {
        self.entries.get(prefix).copied()
    }

    /// Bindings in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = Namespace> + '_ {
        self.entries
            .iter()
            .map(|(&prefix, &uri)| Namespace::new(prefix, uri))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An element attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub ns: Option<Namespace>,
    pub name: String,
    pub value: String,
}

impl Attribute {
    fn qualified_name(&self) -> String {
        qualify(self.ns, &self.name)
    }
}

/// A document node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub ns: Option<Namespace>,
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

fn qualify(ns: Option<Namespace>, name: &str) -> String {
    match ns {
        Some(ns) => format!("{}:{}", ns.prefix, name),
        None => name.to_string(),
    }
}

impl Element {
    /// Creates an element without a namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            ns: None,
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Creates an element in `ns`.
    pub fn qualified(ns: Namespace, name: impl Into<String>) -> Self {
        Self {
            ns: Some(ns),
            ..Self::new(name)
        }
    }

    /// Creates `<ns:name>text</ns:name>`.
    pub fn leaf(ns: Namespace, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::qualified(ns, name).with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attribute(
        mut self,
        ns: Option<Namespace>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.push(Attribute {
            ns,
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Marks this node for removal with `nc:operation="delete"`.
    pub fn marked_delete(self) -> Self {
        self.with_attribute(Some(NC), OPERATION_ATTR, "delete")
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// `prefix:name`, or `name` without a namespace.
    pub fn qualified_name(&self) -> String {
        qualify(self.ns, &self.name)
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first direct child with the given local name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.text.as_deref())
    }

    /// Value of an attribute by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Whether this node carries the delete marker.
    pub fn is_delete(&self) -> bool {
        self.attributes
            .iter()
            .any(|a| a.ns == Some(NC) && a.name == OPERATION_ATTR && a.value == "delete")
    }

    /// All descendants with the given local name, depth first.
    pub fn descendants<'a>(&'a self, name: &'a str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }

    fn collect_namespaces(&self, found: &mut Vec<Namespace>) {
        found.extend(self.ns);
        found.extend(self.attributes.iter().filter_map(|a| a.ns));
        for child in &self.children {
            child.collect_namespaces(found);
        }
    }

    fn write_xml(&self, out: &mut String, depth: usize, declarations: &[String]) {
        let indent = "  ".repeat(depth);
        let name = self.qualified_name();
        let _ = write!(out, "{indent}<{name}");
        for decl in declarations {
            let _ = write!(out, " {decl}");
        }
        for attr in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", attr.qualified_name(), escape(attr.value.as_str()));
        }

        let text = self.text.as_deref().filter(|t| !t.is_empty());
        match (text, self.children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), true) => {
                let _ = writeln!(out, ">{}</{name}>", partial_escape(text));
            }
            (text, false) => {
                out.push('>');
                if let Some(text) = text {
                    out.push_str(&partial_escape(text));
                }
                out.push('\n');
                for child in &self.children {
                    child.write_xml(out, depth + 1, &[]);
                }
                let _ = writeln!(out, "{indent}</{name}>");
            }
        }
    }
}

/// A complete edit document rooted at `<config>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    root: Element,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self {
            root: Element::new(CONFIG_ROOT),
        }
    }

    /// Appends a top-level block.
    pub fn push(&mut self, block: Element) {
        self.root.push(block);
    }

    pub fn with_block(mut self, block: Element) -> Self {
        self.push(block);
        self
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Top-level blocks in emission order.
    pub fn blocks(&self) -> &[Element] {
        &self.root.children
    }

    /// Namespaces the document declares on its root.
    pub fn namespaces(&self) -> NamespaceTable {
        NamespaceTable::used_by(&self.root)
    }

    /// Serializes the document with two-space indentation.
    ///
    /// Used namespaces are declared on the root in prefix order, so equal
    /// trees always serialize to identical bytes.
    pub fn to_xml(&self) -> String {
        let declarations: Vec<String> = self
            .namespaces()
            .iter()
            .map(|ns| format!("xmlns:{}=\"{}\"", ns.prefix, escape(ns.uri)))
            .collect();
        let mut out = String::with_capacity(1024);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        self.root.write_xml(&mut out, 0, &declarations);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document() {
        assert_eq!(
            ConfigDocument::new().to_xml(),
            "<?xml version=\"1.0\" ?>\n<config/>\n"
        );
    }

    #[test]
    fn test_namespaces_declared_sorted_on_root() {
        let doc = ConfigDocument::new()
            .with_block(Element::qualified(VRF, "vrf"))
            .with_block(Element::qualified(IF, "interfaces").marked_delete());
        assert_eq!(
            doc.to_xml(),
            concat!(
                "<?xml version=\"1.0\" ?>\n",
                "<config xmlns:if=\"http://www.ipinfusion.com/yang/ocnos/ipi-interface\"",
                " xmlns:nc=\"urn:ietf:params:xml:ns:netconf:base:1.0\"",
                " xmlns:vrf=\"http://www.ipinfusion.com/yang/ocnos/ipi-vrf\">\n",
                "  <vrf:vrf/>\n",
                "  <if:interfaces nc:operation=\"delete\"/>\n",
                "</config>\n",
            )
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = ConfigDocument::new().with_block(Element::leaf(IF, "description", "a<b & c"));
        assert!(doc.to_xml().contains("<if:description>a&lt;b &amp; c</if:description>"));
    }

    #[test]
    fn test_empty_text_serializes_as_empty_element() {
        let doc = ConfigDocument::new().with_block(Element::leaf(IF, "enable-switchport", ""));
        assert!(doc.to_xml().contains("<if:enable-switchport/>"));
    }

    #[test]
    fn test_element_queries() {
        let intf = Element::qualified(IF, "interface")
            .marked_delete()
            .with_child(Element::leaf(IF, "name", "eth3"));
        assert!(intf.is_delete());
        assert_eq!(intf.child_text("name"), Some("eth3"));
        assert_eq!(intf.attribute("operation"), Some("delete"));
        assert_eq!(intf.qualified_name(), "if:interface");

        let doc = ConfigDocument::new().with_block(Element::qualified(IF, "interfaces").with_child(intf));
        assert_eq!(doc.root().descendants("name").len(), 1);
    }

    #[test]
    fn test_namespace_table_is_ordered() {
        let prefixes: Vec<_> = NamespaceTable::ocnos().iter().map(|ns| ns.prefix).collect();
        assert_eq!(
            prefixes,
            vec!["bgpvrf", "if", "ifagg", "ifext", "nc", "netinst", "vlan", "vrf", "vxlan"]
        );
        assert_eq!(NamespaceTable::ocnos().uri("nc"), Some(NC.uri));
    }
}
