//! Schema-driven row extraction

use tracing::warn;

use crate::document::Element;
use crate::inference::{
    ATTRIBUTE_MAP_COLUMN, AttributeMode, CONTENT_COLUMN, ColumnInfo, ColumnSource,
    EmptyElementPolicy, OpaqueMode, ResolvedType, ScalarKind, SchemaError, SchemaOptions,
    clean_text,
};

use super::value::{Row, Value};

/// A column to extract, with its origin when it is known
struct ColumnSpec<'s> {
    name: &'s str,
    column_type: &'s ResolvedType,
    source: Option<ColumnSource>,
    /// Sole full-element column that stands for the record when it is named after it
    whole_record: bool,
}

/// Extracts typed rows from record elements
#[derive(Debug, Clone, Default)]
pub struct DataExtractor {
    options: SchemaOptions,
}

impl DataExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SchemaOptions) -> Self {
        Self { options }
    }

    /// Extract one row per record for an inferred schema
    pub fn extract(
        &self,
        records: &[&Element],
        columns: &[ColumnInfo],
    ) -> Result<Vec<Row>, SchemaError> {
        let specs: Vec<ColumnSpec<'_>> = columns
            .iter()
            .map(|column| ColumnSpec {
                name: &column.name,
                column_type: &column.column_type,
                source: Some(column.source),
                whole_record: false,
            })
            .collect();
        self.extract_rows(records, &specs)
    }

    /// Extract one row per record for caller supplied column names and types
    pub fn extract_with_schema(
        &self,
        records: &[&Element],
        names: &[String],
        types: &[ResolvedType],
    ) -> Result<Vec<Row>, SchemaError> {
        if names.len() != types.len() {
            return Err(SchemaError::SchemaMismatch {
                names: names.len(),
                types: types.len(),
            });
        }

        // A lone full-element column is read as the fallback schema
        let whole_record = matches!(
            types,
            [ResolvedType::OpaqueDocument(OpaqueMode::FullElement)]
        );
        let specs: Vec<ColumnSpec<'_>> = names
            .iter()
            .zip(types)
            .map(|(name, column_type)| ColumnSpec {
                name,
                column_type,
                source: None,
                whole_record,
            })
            .collect();
        self.extract_rows(records, &specs)
    }

    fn extract_rows(
        &self,
        records: &[&Element],
        specs: &[ColumnSpec<'_>],
    ) -> Result<Vec<Row>, SchemaError> {
        let mut rows = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let row: Result<Row, SchemaError> = specs
                .iter()
                .map(|spec| {
                    if spec.whole_record && self.names_record(record, spec.name) {
                        self.element_value(record, spec.column_type)
                    } else {
                        self.field_value(record, spec.name, spec.column_type, spec.source)
                    }
                })
                .collect();

            match row {
                Ok(row) => rows.push(row),
                Err(e) if self.options.ignore_errors => {
                    warn!("Skipping record {} <{}>: {}", index, record.name, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(rows)
    }

    /// Value of a named column or struct field of `node`
    fn field_value(
        &self,
        node: &Element,
        name: &str,
        column_type: &ResolvedType,
        source: Option<ColumnSource>,
    ) -> Result<Value, SchemaError> {
        match source {
            Some(ColumnSource::Attribute) => Ok(self
                .find_attribute(node, name)
                .map_or(Value::Null, |value| attribute_value(value, column_type))),
            Some(ColumnSource::AttributeMap) => Ok(self.attribute_map(node)),
            Some(ColumnSource::Text) => Ok(text_value(node, column_type)),
            Some(ColumnSource::Record) => self.element_value(node, column_type),
            Some(ColumnSource::Child) => self.child_value(node, name, column_type),
            None => self.lookup(node, name, column_type),
        }
    }

    /// Resolve a column with no recorded origin
    fn lookup(
        &self,
        node: &Element,
        name: &str,
        column_type: &ResolvedType,
    ) -> Result<Value, SchemaError> {
        if let Some(value) = self.find_attribute(node, name) {
            return Ok(attribute_value(value, column_type));
        }

        if self.options.attribute_mode == AttributeMode::Map && name == ATTRIBUTE_MAP_COLUMN {
            return Ok(self.attribute_map(node));
        }

        if node
            .child_elements()
            .any(|child| self.options.element_name(child) == name)
        {
            return self.child_value(node, name, column_type);
        }

        if name == self.options.text_key && !node.direct_text().trim().is_empty() {
            return Ok(text_value(node, column_type));
        }

        if column_type.is_opaque() && self.names_record(node, name) {
            return self.element_value(node, column_type);
        }

        Ok(Value::Null)
    }

    fn names_record(&self, record: &Element, name: &str) -> bool {
        name == self.options.element_name(record) || name == CONTENT_COLUMN
    }

    fn child_value(
        &self,
        node: &Element,
        name: &str,
        column_type: &ResolvedType,
    ) -> Result<Value, SchemaError> {
        let mut children = node
            .child_elements()
            .filter(|child| self.options.element_name(child) == name)
            .peekable();

        if children.peek().is_none() {
            return Ok(Value::Null);
        }

        match column_type {
            ResolvedType::List(item_type) => Ok(Value::List(
                children
                    .map(|child| self.element_value(child, item_type))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            _ => match children.next() {
                Some(child) => self.element_value(child, column_type),
                None => Ok(Value::Null),
            },
        }
    }

    /// Convert a matched element to `column_type`
    fn element_value(
        &self,
        element: &Element,
        column_type: &ResolvedType,
    ) -> Result<Value, SchemaError> {
        if !column_type.is_opaque() && self.is_empty(element) {
            return Ok(self.empty_value(column_type));
        }

        match column_type {
            ResolvedType::Scalar(kind) => {
                Ok(Value::from_text(&clean_text(&element.direct_text()), *kind))
            }
            ResolvedType::List(item_type) => {
                Ok(Value::List(vec![self.element_value(element, item_type)?]))
            }
            ResolvedType::Struct(fields) => {
                let values = fields
                    .iter()
                    .map(|field| {
                        let value = self.field_value(
                            element,
                            &field.name,
                            &field.field_type,
                            field.source,
                        )?;
                        Ok((field.name.clone(), value))
                    })
                    .collect::<Result<Vec<_>, SchemaError>>()?;
                Ok(Value::Struct(values))
            }
            ResolvedType::OpaqueDocument(OpaqueMode::FullElement) => {
                Ok(Value::Document(element.serialize()?))
            }
            ResolvedType::OpaqueDocument(OpaqueMode::InnerContent) => {
                Ok(Value::Document(element.serialize_inner()?))
            }
            ResolvedType::AttributeMap => Ok(self.attribute_map(element)),
        }
    }

    fn find_attribute<'e>(&self, node: &'e Element, name: &str) -> Option<&'e str> {
        node.attributes
            .iter()
            .find(|attribute| {
                self.options.attribute_column_name(attribute).as_deref() == Some(name)
            })
            .map(|attribute| attribute.value.as_str())
    }

    fn attribute_map(&self, node: &Element) -> Value {
        if node.attributes.is_empty() {
            return Value::Null;
        }
        Value::Map(
            node.attributes
                .iter()
                .map(|attribute| {
                    (
                        self.options.namespaces.attribute_name(attribute),
                        attribute.value.clone(),
                    )
                })
                .collect(),
        )
    }

    fn is_empty(&self, element: &Element) -> bool {
        !element.has_child_elements()
            && element.direct_text().trim().is_empty()
            && (self.options.attribute_mode == AttributeMode::Discard
                || element.attributes.is_empty())
    }

    /// Value of an empty element; the policy only applies where it fits the type
    fn empty_value(&self, column_type: &ResolvedType) -> Value {
        match (self.options.empty_elements, column_type) {
            (EmptyElementPolicy::String, ResolvedType::Scalar(ScalarKind::String)) => {
                Value::String(String::new())
            }
            (EmptyElementPolicy::EmptyObject, ResolvedType::Struct(_)) => Value::Struct(Vec::new()),
            (EmptyElementPolicy::EmptyObject, ResolvedType::AttributeMap) => Value::Map(Vec::new()),
            (_, ResolvedType::List(item_type)) => match self.empty_value(item_type) {
                Value::Null => Value::Null,
                item => Value::List(vec![item]),
            },
            _ => Value::Null,
        }
    }
}

fn attribute_value(value: &str, column_type: &ResolvedType) -> Value {
    match column_type {
        ResolvedType::Scalar(kind) => Value::from_text(&clean_text(value), *kind),
        ResolvedType::List(item_type) => Value::List(vec![attribute_value(value, item_type)]),
        ResolvedType::Struct(_) | ResolvedType::OpaqueDocument(_) | ResolvedType::AttributeMap => {
            Value::String(value.to_string())
        }
    }
}

fn text_value(node: &Element, column_type: &ResolvedType) -> Value {
    let text = clean_text(&node.direct_text());
    if text.is_empty() {
        return Value::Null;
    }
    match column_type {
        ResolvedType::Scalar(kind) => Value::from_text(&text, *kind),
        ResolvedType::List(item_type) => Value::List(vec![text_value(node, item_type)]),
        ResolvedType::Struct(_) | ResolvedType::OpaqueDocument(_) | ResolvedType::AttributeMap => {
            Value::String(text)
        }
    }
}
