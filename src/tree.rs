//! Generic, owned XML tree and the reader that produces it.
//!
//! Project and defaults files are parsed into [`XmlNode`]s: each node keeps
//! its attributes, its text and its child elements grouped by tag name.  A
//! tag that occurs once is stored as [`NodeValue::Single`], a repeated tag as
//! [`NodeValue::Many`].  Consumers never look at that distinction directly;
//! they go through [`as_sequence`] (or [`XmlNode::children`]) which always
//! yields a slice.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
//  Tree types
// ═══════════════════════════════════════════════════════════════════════════════

/// The children stored under one tag name.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Single(XmlNode),
    Many(Vec<XmlNode>),
}

/// One XML element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: BTreeMap<String, NodeValue>,
}

/// A parsed document.  The document node itself carries the root element
/// as its only child, so `tree.element("Project")` yields the `<Project>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTree {
    pub document: XmlNode,
}

/// View the children stored under a tag as a slice, regardless of whether
/// the tag occurred once, many times, or not at all.
pub fn as_sequence(value: Option<&NodeValue>) -> &[XmlNode] {
    match value {
        Some(NodeValue::Single(node)) => std::slice::from_ref(node),
        Some(NodeValue::Many(nodes)) => nodes,
        None => &[],
    }
}

impl XmlNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, tag: impl Into<String>, child: XmlNode) -> Self {
        self.push_child(tag, child);
        self
    }

    /// Append a child under `tag`, collapsing a lone child to
    /// [`NodeValue::Single`] and promoting to [`NodeValue::Many`] on the
    /// second occurrence.
    pub fn push_child(&mut self, tag: impl Into<String>, child: XmlNode) {
        let tag = tag.into();
        let value = match self.children.remove(&tag) {
            None => NodeValue::Single(child),
            Some(NodeValue::Single(first)) => NodeValue::Many(vec![first, child]),
            Some(NodeValue::Many(mut nodes)) => {
                nodes.push(child);
                NodeValue::Many(nodes)
            }
        };
        self.children.insert(tag, value);
    }

    /// All child elements named `tag`, in document order.
    pub fn children(&self, tag: &str) -> &[XmlNode] {
        as_sequence(self.children.get(tag))
    }

    pub fn child(&self, tag: &str) -> Option<&XmlNode> {
        self.children(tag).first()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Text of the element; an empty element reads as `""`.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Text of the first child element named `tag`, if such a child exists.
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.child(tag).map(XmlNode::text)
    }
}

impl ParsedTree {
    /// The top-level element named `tag` (e.g. `Project`).
    pub fn element(&self, tag: &str) -> Option<&XmlNode> {
        self.document.child(tag)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Parsing – roxmltree → owned tree
// ═══════════════════════════════════════════════════════════════════════════════

impl ParsedTree {
    /// Parse an XML document from its source string.
    pub fn parse(source: &str) -> std::result::Result<Self, roxmltree::Error> {
        let doc = roxmltree::Document::parse(source)?;
        let root = doc.root_element();
        let mut document = XmlNode::new();
        document.push_child(root.tag_name().name(), XmlNode::from_element(&root));
        Ok(Self { document })
    }
}

impl XmlNode {
    fn from_element(node: &roxmltree::Node) -> Self {
        let mut result = Self {
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            ..Default::default()
        };

        let mut has_elements = false;
        for child in node.children().filter(|n| n.is_element()) {
            has_elements = true;
            result.push_child(child.tag_name().name(), Self::from_element(&child));
        }

        // Comments split the text into several nodes.
        let text: String = node
            .children()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();

        // Indentation between child elements is not content.
        result.text = match text {
            t if t.is_empty() => None,
            t if has_elements && t.trim().is_empty() => None,
            t => Some(t),
        };

        result
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Reader collaborator
// ═══════════════════════════════════════════════════════════════════════════════

/// Reads a file and parses it into a [`ParsedTree`].
pub trait XmlReader {
    fn read(&self, path: &Path) -> Result<ParsedTree>;
}

/// [`XmlReader`] backed by the file system and `roxmltree`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoxmlReader;

impl XmlReader for RoxmlReader {
    fn read(&self, path: &Path) -> Result<ParsedTree> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ParsedTree::parse(&source).map_err(|source| Error::Xml {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
