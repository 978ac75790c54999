//! Schema inference for XML documents
//!
//! This module turns a parsed document into a relational schema: one row per
//! record element, one typed column per attribute, child element or text.
//!
//! ## Features
//!
//! - **Record location** - Root children, a `root_element`, or a `record_path`
//! - **Scalar detection** - Boolean, integer, double, date, time and timestamp
//!   by majority vote over text samples
//! - **Nested types** - Repeated children become lists, structured children
//!   become structs, and anything past the depth budget is kept as XML text
//! - **Attribute handling** - Attributes as columns, prefixed columns, a single
//!   map column, or dropped
//!
//! ## Example
//!
//! ```rust
//! use xml_schema_inference::document::Document;
//! use xml_schema_inference::inference::{ResolvedType, ScalarKind, SchemaInferrer};
//!
//! let document = Document::parse(
//!     "<root><item><name>Alice</name><age>30</age></item></root>",
//! ).unwrap();
//!
//! let schema = SchemaInferrer::new().infer(&document);
//! assert_eq!(schema.names(), vec!["name", "age"]);
//! assert_eq!(schema.columns[1].column_type, ResolvedType::Scalar(ScalarKind::Integer));
//! ```

mod columns;
mod config;
mod error;
mod formats;
mod inferrer;
mod records;
mod types;

pub use columns::{ColumnAnalysis, ColumnTable, identify_columns};
pub use config::{
    ATTRIBUTE_MAP_COLUMN, AttributeMode, DEFAULT_MAXIMUM_SIZE, EmptyElementPolicy,
    MAX_DEPTH_CEILING, NamespaceMode, SchemaOptions, SchemaOptionsBuilder,
};
pub use error::SchemaError;
pub use formats::{
    classify, clean_text, detect_scalar_kind, parse_boolean, parse_date, parse_time,
    parse_timestamp,
};
pub use inferrer::{CONTENT_COLUMN, SchemaInferrer};
pub use records::locate_records;
pub use types::{
    ColumnInfo, ColumnSource, InferredSchema, OpaqueMode, ResolvedType, ScalarKind,
    SchemaFallback, StructField,
};
