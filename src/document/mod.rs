//! Read-only document tree
//!
//! A small owned tree built from XML text with `quick-xml`. The inference and
//! extraction engines only ever borrow it, so a parsed [`Document`] can be shared
//! freely between threads once built.
//!
//! ## Example
//!
//! ```rust
//! use xml_schema_inference::document::Document;
//!
//! let document = Document::parse("<root><item id=\"1\">x</item></root>").unwrap();
//! let item = document.root().child_elements().next().unwrap();
//! assert_eq!(item.attribute("id"), Some("1"));
//! assert_eq!(item.direct_text(), "x");
//! ```

mod error;
mod parser;
pub mod query;
mod serialize;
mod stats;

use std::str::FromStr;

pub use error::DocumentError;
pub use query::{PathQuery, QueryError};
pub use stats::DocumentStats;

/// Deepest element nesting accepted by the parser and the serializer
pub const MAX_NESTING_DEPTH: usize = 256;

/// An attribute on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written (`prefix:local` or `local`)
    pub name: String,
    /// Name without prefix
    pub local_name: String,
    /// Resolved namespace URI, if the attribute is prefixed and bound
    pub namespace: Option<String>,
    /// Unescaped value
    pub value: String,
}

/// A child of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
}

/// An element node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name as written
    pub name: String,
    /// Tag name without prefix
    pub local_name: String,
    /// Resolved namespace URI
    pub namespace: Option<String>,
    /// Attributes in declaration order (namespace declarations excluded)
    pub attributes: Vec<Attribute>,
    /// `xmlns` / `xmlns:prefix` declarations made on this element
    pub namespace_declarations: Vec<(String, String)>,
    /// Mixed content in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no namespace, attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let local_name = match name.split_once(':') {
            Some((_, local)) => local.to_string(),
            None => name.clone(),
        };
        Self {
            name,
            local_name,
            namespace: None,
            attributes: Vec::new(),
            namespace_declarations: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Namespace prefix of the tag, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Direct element children in document order
    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) | Node::CData(_) => None,
        })
    }

    /// Whether this element has at least one element child
    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// Text of this node excluding the text of descendant elements
    pub fn direct_text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Text(value) | Node::CData(value) => text.push_str(value),
                Node::Element(_) => {}
            }
        }
        text
    }

    /// Value of the attribute with the given qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    /// True when the element has no attributes, no element children and no
    /// non-whitespace text
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
            && !self.has_child_elements()
            && self.direct_text().trim().is_empty()
    }

    /// This element followed by all of its descendant elements, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

impl Drop for Element {
    // Flatten the subtree so arbitrarily deep trees drop without recursion
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}

/// Pre-order iterator over an element and its descendants
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.child_elements().rev());
        Some(next)
    }
}

/// A parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
    size_bytes: usize,
}

impl Document {
    /// Parse XML text into a document tree
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let root = parser::parse(text)?;
        Ok(Self {
            root,
            size_bytes: text.len(),
        })
    }

    /// Wrap an already built element as a document
    pub fn from_root(root: Element) -> Self {
        Self {
            root,
            size_bytes: 0,
        }
    }

    /// The document element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Size of the source text in bytes (0 when built with [`Document::from_root`])
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Evaluate a path expression against this document
    pub fn query(&self, expression: &str) -> Result<Vec<&Element>, QueryError> {
        let query = PathQuery::parse(expression)?;
        Ok(query.evaluate(self))
    }
}

impl FromStr for Document {
    type Err = DocumentError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}
