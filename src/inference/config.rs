//! Configuration for schema inference and extraction

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::document::{Attribute, Element};

/// Hard ceiling on introspection depth
pub const MAX_DEPTH_CEILING: i32 = 20;

/// Default maximum input size (16 MiB)
pub const DEFAULT_MAXIMUM_SIZE: usize = 16 * 1024 * 1024;

/// Column name used for all attributes of a node in [`AttributeMode::Map`]
pub const ATTRIBUTE_MAP_COLUMN: &str = "attributes";

/// How attributes become columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeMode {
    /// One column per attribute, named after the attribute
    #[default]
    Columns,
    /// One column per attribute, named with the attribute prefix
    Prefixed,
    /// A single map column holding every attribute
    Map,
    /// Attributes are ignored
    Discard,
}

/// How namespaced names are spelled in column names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamespaceMode {
    /// Local name only
    #[default]
    Strip,
    /// `{uri}local` when the name is bound to a namespace
    Expand,
    /// Qualified name as written in the document
    Keep,
}

impl NamespaceMode {
    /// Column name for an element tag
    pub fn element_name(&self, element: &Element) -> String {
        self.spell(&element.name, &element.local_name, element.namespace.as_deref())
    }

    /// Column name for an attribute, before any prefix is applied
    pub fn attribute_name(&self, attribute: &Attribute) -> String {
        self.spell(
            &attribute.name,
            &attribute.local_name,
            attribute.namespace.as_deref(),
        )
    }

    fn spell(&self, qualified: &str, local: &str, namespace: Option<&str>) -> String {
        match (self, namespace) {
            (NamespaceMode::Strip, _) => local.to_string(),
            (NamespaceMode::Expand, Some(uri)) => format!("{{{}}}{}", uri, local),
            (NamespaceMode::Expand, None) => local.to_string(),
            (NamespaceMode::Keep, _) => qualified.to_string(),
        }
    }
}

/// What an element with no attributes, children or text extracts to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyElementPolicy {
    /// A null cell
    #[default]
    Null,
    /// An empty string
    String,
    /// An empty struct
    EmptyObject,
}

/// Configuration for schema inference and data extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaOptions {
    /// Maximum introspection depth; negative means "as deep as allowed"
    pub max_depth: i32,

    /// Maximum number of text samples collected per column
    pub sample_size: usize,

    /// How attributes become columns
    pub attribute_mode: AttributeMode,

    /// Prefix for attribute columns in [`AttributeMode::Prefixed`]
    pub attribute_prefix: String,

    /// How namespaced names are spelled
    pub namespaces: NamespaceMode,

    /// Column name for an element's own text when it also has structure
    pub text_key: String,

    /// What empty elements extract to
    pub empty_elements: EmptyElementPolicy,

    /// Element names always inferred as lists
    pub force_list: BTreeSet<String>,

    /// Path expression selecting record elements
    pub record_path: Option<String>,

    /// Element whose children are the records
    pub root_element: Option<String>,

    /// Detect boolean values
    pub boolean_detection: bool,

    /// Detect integer and floating point values
    pub numeric_detection: bool,

    /// Detect dates, times and timestamps
    pub temporal_detection: bool,

    /// Minimum share of samples a scalar kind needs to win (0.0 - 1.0)
    pub homogeneity_threshold: f64,

    /// Skip failing documents and records instead of aborting
    pub ignore_errors: bool,

    /// Maximum accepted input size in bytes
    pub maximum_size: usize,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            sample_size: 50,
            attribute_mode: AttributeMode::Columns,
            attribute_prefix: "@".to_string(),
            namespaces: NamespaceMode::Strip,
            text_key: "#text".to_string(),
            empty_elements: EmptyElementPolicy::Null,
            force_list: BTreeSet::new(),
            record_path: None,
            root_element: None,
            boolean_detection: true,
            numeric_detection: true,
            temporal_detection: true,
            homogeneity_threshold: 0.8,
            ignore_errors: false,
            maximum_size: DEFAULT_MAXIMUM_SIZE,
        }
    }
}

impl SchemaOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom options
    pub fn builder() -> SchemaOptionsBuilder {
        SchemaOptionsBuilder::default()
    }

    /// Depth after clamping into `0..=MAX_DEPTH_CEILING`; negative requests
    /// get the ceiling
    pub fn effective_depth(&self) -> i32 {
        if self.max_depth < 0 {
            MAX_DEPTH_CEILING
        } else {
            self.max_depth.min(MAX_DEPTH_CEILING)
        }
    }

    /// Whether the element name is always a list
    pub fn is_forced_list(&self, name: &str) -> bool {
        self.force_list.contains(name)
    }

    /// Column name of an element under the namespace mode
    pub fn element_name(&self, element: &Element) -> String {
        self.namespaces.element_name(element)
    }

    /// Column name of an attribute, or `None` when attributes do not get
    /// columns of their own
    pub fn attribute_column_name(&self, attribute: &Attribute) -> Option<String> {
        match self.attribute_mode {
            AttributeMode::Columns => Some(self.namespaces.attribute_name(attribute)),
            AttributeMode::Prefixed => Some(format!(
                "{}{}",
                self.attribute_prefix,
                self.namespaces.attribute_name(attribute)
            )),
            AttributeMode::Map | AttributeMode::Discard => None,
        }
    }

    /// Whether attributes count toward an element's structure
    pub fn keeps_attributes(&self) -> bool {
        self.attribute_mode != AttributeMode::Discard
    }
}

/// Builder for SchemaOptions
#[derive(Debug, Default)]
pub struct SchemaOptionsBuilder {
    options: SchemaOptions,
}

impl SchemaOptionsBuilder {
    /// Set the maximum introspection depth (negative = ceiling)
    pub fn max_depth(mut self, depth: i32) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Set the per-column sample cap (at least 1)
    pub fn sample_size(mut self, size: usize) -> Self {
        self.options.sample_size = size.max(1);
        self
    }

    /// Set the attribute mode
    pub fn attribute_mode(mut self, mode: AttributeMode) -> Self {
        self.options.attribute_mode = mode;
        self
    }

    /// Set the attribute prefix used by [`AttributeMode::Prefixed`]
    pub fn attribute_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.attribute_prefix = prefix.into();
        self
    }

    /// Set the namespace mode
    pub fn namespaces(mut self, mode: NamespaceMode) -> Self {
        self.options.namespaces = mode;
        self
    }

    /// Set the text column name
    pub fn text_key(mut self, key: impl Into<String>) -> Self {
        self.options.text_key = key.into();
        self
    }

    /// Set the empty element policy
    pub fn empty_elements(mut self, policy: EmptyElementPolicy) -> Self {
        self.options.empty_elements = policy;
        self
    }

    /// Always infer this element name as a list
    pub fn force_list(mut self, name: impl Into<String>) -> Self {
        self.options.force_list.insert(name.into());
        self
    }

    /// Select records with a path expression
    pub fn record_path(mut self, path: impl Into<String>) -> Self {
        self.options.record_path = Some(path.into());
        self
    }

    /// Use the children of this element as records
    pub fn root_element(mut self, name: impl Into<String>) -> Self {
        self.options.root_element = Some(name.into());
        self
    }

    /// Enable or disable boolean detection
    pub fn boolean_detection(mut self, detect: bool) -> Self {
        self.options.boolean_detection = detect;
        self
    }

    /// Enable or disable numeric detection
    pub fn numeric_detection(mut self, detect: bool) -> Self {
        self.options.numeric_detection = detect;
        self
    }

    /// Enable or disable temporal detection
    pub fn temporal_detection(mut self, detect: bool) -> Self {
        self.options.temporal_detection = detect;
        self
    }

    /// Set the homogeneity threshold
    pub fn homogeneity_threshold(mut self, threshold: f64) -> Self {
        self.options.homogeneity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Skip failing documents and records
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.options.ignore_errors = ignore;
        self
    }

    /// Set the maximum accepted input size in bytes
    pub fn maximum_size(mut self, bytes: usize) -> Self {
        self.options.maximum_size = bytes;
        self
    }

    /// Build the options
    pub fn build(self) -> SchemaOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = SchemaOptions::default();
        assert_eq!(options.max_depth, 10);
        assert_eq!(options.sample_size, 50);
        assert_eq!(options.attribute_mode, AttributeMode::Columns);
        assert_eq!(options.homogeneity_threshold, 0.8);
        assert!(!options.ignore_errors);
    }

    #[test]
    fn test_builder() {
        let options = SchemaOptions::builder()
            .max_depth(4)
            .attribute_mode(AttributeMode::Prefixed)
            .attribute_prefix("attr_")
            .force_list("tag")
            .record_path("//item")
            .build();

        assert_eq!(options.max_depth, 4);
        assert_eq!(options.attribute_prefix, "attr_");
        assert!(options.is_forced_list("tag"));
        assert!(!options.is_forced_list("item"));
        assert_eq!(options.record_path.as_deref(), Some("//item"));
    }

    #[test]
    fn test_effective_depth_clamping() {
        let depth = |d| SchemaOptions::builder().max_depth(d).build().effective_depth();
        assert_eq!(depth(-1), MAX_DEPTH_CEILING);
        assert_eq!(depth(0), 0);
        assert_eq!(depth(7), 7);
        assert_eq!(depth(500), MAX_DEPTH_CEILING);
    }

    #[test]
    fn test_threshold_clamping() {
        let options = SchemaOptions::builder().homogeneity_threshold(1.5).build();
        assert_eq!(options.homogeneity_threshold, 1.0);
    }

    #[test]
    fn test_attribute_column_names() {
        let attribute = Attribute {
            name: "x:id".to_string(),
            local_name: "id".to_string(),
            namespace: Some("urn:x".to_string()),
            value: "1".to_string(),
        };

        let name = |options: SchemaOptions| options.attribute_column_name(&attribute);
        assert_eq!(name(SchemaOptions::default()), Some("id".to_string()));
        assert_eq!(
            name(SchemaOptions::builder().attribute_mode(AttributeMode::Prefixed).build()),
            Some("@id".to_string())
        );
        assert_eq!(
            name(SchemaOptions::builder().namespaces(NamespaceMode::Keep).build()),
            Some("x:id".to_string())
        );
        assert_eq!(
            name(SchemaOptions::builder().namespaces(NamespaceMode::Expand).build()),
            Some("{urn:x}id".to_string())
        );
        assert_eq!(
            name(SchemaOptions::builder().attribute_mode(AttributeMode::Map).build()),
            None
        );
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: SchemaOptions =
            serde_json::from_str(r#"{"maxDepth": 3, "attributeMode": "discard"}"#).unwrap();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.attribute_mode, AttributeMode::Discard);
        assert_eq!(options.text_key, "#text");
    }
}
