//! XML Schema Inference - relational schemas and typed rows from XML documents
//!
//! Provides:
//! - A read-only document tree with a small path query language
//! - Schema inference (record location, column discovery, nested types)
//! - Typed row extraction against an inferred or caller supplied schema
//! - Size-checked loading of documents from text, bytes and files
//!
//! ## Example
//!
//! ```rust
//! use xml_schema_inference::{SchemaOptions, Value, extract_data, infer_schema};
//! use xml_schema_inference::document::Document;
//!
//! let document = Document::parse(
//!     "<root><item><name>Alice</name><age>30</age></item>\
//!      <item><name>Bob</name><age>25</age></item></root>",
//! ).unwrap();
//! let options = SchemaOptions::default();
//!
//! let columns = infer_schema(&document, &options);
//! assert_eq!(columns[1].column_type.to_string(), "BIGINT");
//!
//! let rows = extract_data(&document, &options).unwrap();
//! assert_eq!(rows[1], vec![Value::String("Bob".into()), Value::Integer(25)]);
//! ```

pub mod document;
pub mod extract;
pub mod inference;
pub mod reader;

pub use document::{Document, DocumentError, Element};
pub use extract::{DataExtractor, Row, Value, rows_to_json};
pub use inference::{
    AttributeMode, ColumnInfo, EmptyElementPolicy, InferredSchema, NamespaceMode, ResolvedType,
    ScalarKind, SchemaError, SchemaInferrer, SchemaOptions, StructField,
};

/// Infer the columns of a document
pub fn infer_schema(document: &Document, options: &SchemaOptions) -> Vec<ColumnInfo> {
    SchemaInferrer::with_options(options.clone())
        .infer(document)
        .columns
}

/// Infer a schema and extract one row per record with it
pub fn extract_data(document: &Document, options: &SchemaOptions) -> Result<Vec<Row>, SchemaError> {
    let records = inference::locate_records(document, options);
    let schema =
        SchemaInferrer::with_options(options.clone()).infer_records(document.root(), &records);
    DataExtractor::with_options(options.clone()).extract(&records, &schema.columns)
}

/// Extract one row per record using caller supplied column names and types
pub fn extract_data_with_schema(
    document: &Document,
    names: &[String],
    types: &[ResolvedType],
    options: &SchemaOptions,
) -> Result<Vec<Row>, SchemaError> {
    let records = inference::locate_records(document, options);
    DataExtractor::with_options(options.clone()).extract_with_schema(&records, names, types)
}
