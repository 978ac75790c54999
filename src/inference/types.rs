//! Resolved column types and schema descriptions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar column kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarKind {
    Boolean,
    Integer,
    Double,
    Date,
    Time,
    Timestamp,
    String,
}

impl ScalarKind {
    /// Every kind, in detection order
    pub const ALL: [ScalarKind; 7] = [
        ScalarKind::Boolean,
        ScalarKind::Integer,
        ScalarKind::Double,
        ScalarKind::Date,
        ScalarKind::Timestamp,
        ScalarKind::Time,
        ScalarKind::String,
    ];

    /// SQL-style type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Boolean => "BOOLEAN",
            ScalarKind::Integer => "BIGINT",
            ScalarKind::Double => "DOUBLE",
            ScalarKind::Date => "DATE",
            ScalarKind::Time => "TIME",
            ScalarKind::Timestamp => "TIMESTAMP",
            ScalarKind::String => "VARCHAR",
        }
    }
}

/// How an opaque subtree is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpaqueMode {
    /// The element including its own tag and attributes
    FullElement,
    /// Only the element's content
    InnerContent,
}

/// Where a column's values come from in a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnSource {
    Attribute,
    Child,
    Text,
    AttributeMap,
    /// The record element itself
    Record,
}

/// A named field of a struct type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructField {
    pub name: String,
    pub field_type: ResolvedType,
    /// Known origin of the field; `None` for caller supplied types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ColumnSource>,
}

impl StructField {
    /// Create a field with no recorded origin
    pub fn new(name: impl Into<String>, field_type: ResolvedType) -> Self {
        Self {
            name: name.into(),
            field_type,
            source: None,
        }
    }

    pub(crate) fn with_source(
        name: impl Into<String>,
        field_type: ResolvedType,
        source: ColumnSource,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            source: Some(source),
        }
    }
}

/// Resolved type of a column or struct field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolvedType {
    Scalar(ScalarKind),
    List(Box<ResolvedType>),
    Struct(Vec<StructField>),
    /// Subtree kept verbatim as document text
    OpaqueDocument(OpaqueMode),
    /// All attributes of a node as an ordered string map
    AttributeMap,
}

impl ResolvedType {
    pub fn string() -> Self {
        ResolvedType::Scalar(ScalarKind::String)
    }

    pub fn list_of(inner: ResolvedType) -> Self {
        ResolvedType::List(Box::new(inner))
    }

    /// Short type family name
    pub fn type_name(&self) -> &'static str {
        match self {
            ResolvedType::Scalar(kind) => kind.type_name(),
            ResolvedType::List(_) => "LIST",
            ResolvedType::Struct(_) => "STRUCT",
            ResolvedType::OpaqueDocument(_) => "XML",
            ResolvedType::AttributeMap => "MAP",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ResolvedType::List(_))
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, ResolvedType::OpaqueDocument(_))
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Scalar(kind) => f.write_str(kind.type_name()),
            ResolvedType::List(inner) => write!(f, "{}[]", inner),
            ResolvedType::Struct(fields) => {
                f.write_str("STRUCT(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\" {}", field.name, field.field_type)?;
                }
                f.write_str(")")
            }
            ResolvedType::OpaqueDocument(_) => f.write_str("XML"),
            ResolvedType::AttributeMap => f.write_str("MAP(VARCHAR, VARCHAR)"),
        }
    }
}

/// A column of an inferred schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: ResolvedType,
    pub is_attribute: bool,
    /// Share of records that contain the column (0.0 - 1.0)
    pub confidence: f64,
    pub source: ColumnSource,
}

impl ColumnInfo {
    /// A column holding each record serialized as a whole
    pub fn whole_record(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            column_type: ResolvedType::OpaqueDocument(OpaqueMode::FullElement),
            is_attribute: false,
            confidence,
            source: ColumnSource::Record,
        }
    }
}

/// Why a schema collapsed to a single opaque column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaFallback {
    /// The depth budget did not allow looking inside records
    DepthLimit,
    /// No record elements were found
    EmptyRecordSet,
    /// Records were found but none of them has attributes, children or text
    NoColumns,
}

/// Result of schema inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredSchema {
    pub columns: Vec<ColumnInfo>,
    pub record_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<SchemaFallback>,
}

impl InferredSchema {
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn types(&self) -> Vec<ResolvedType> {
        self.columns.iter().map(|c| c.column_type.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}
