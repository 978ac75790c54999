//! Structural statistics for a parsed document

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Document, Element};

/// Counts describing the shape of a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    /// Number of elements, root included
    pub element_count: usize,
    /// Number of attributes (namespace declarations excluded)
    pub attribute_count: usize,
    /// Nesting depth; a lone root element has depth 1
    pub max_depth: usize,
    /// Source size in bytes
    pub size_bytes: usize,
    /// Number of distinct namespace URIs declared
    pub namespace_count: usize,
}

impl Document {
    /// Compute structural statistics for this document
    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats {
            size_bytes: self.size_bytes(),
            ..DocumentStats::default()
        };
        let mut namespaces: BTreeSet<&str> = BTreeSet::new();

        let mut pending: Vec<(&Element, usize)> = vec![(self.root(), 1)];
        while let Some((element, depth)) = pending.pop() {
            stats.element_count += 1;
            stats.attribute_count += element.attributes.len();
            stats.max_depth = stats.max_depth.max(depth);
            namespaces.extend(
                element
                    .namespace_declarations
                    .iter()
                    .map(|(_, uri)| uri.as_str()),
            );
            pending.extend(element.child_elements().map(|child| (child, depth + 1)));
        }

        stats.namespace_count = namespaces.len();
        stats
    }
}
