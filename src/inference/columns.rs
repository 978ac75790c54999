//! Column discovery over a set of record elements

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::document::Element;

use super::config::{ATTRIBUTE_MAP_COLUMN, AttributeMode, SchemaOptions};
use super::types::ColumnSource;

/// Per-column statistics gathered from the records
#[derive(Debug, Clone)]
pub struct ColumnAnalysis<'a> {
    pub name: String,
    pub source: ColumnSource,
    /// Child elements for child columns, owning records otherwise
    pub instances: Vec<&'a Element>,
    pub occurrences: usize,
    /// Set once the name was seen more than once within a single record
    pub repeats_in_record: bool,
}

impl<'a> ColumnAnalysis<'a> {
    pub fn new(name: impl Into<String>, source: ColumnSource) -> Self {
        Self {
            name: name.into(),
            source,
            instances: Vec::new(),
            occurrences: 0,
            repeats_in_record: false,
        }
    }
}

/// Column table keyed by name, in first-occurrence order
pub type ColumnTable<'a> = IndexMap<String, ColumnAnalysis<'a>>;

/// Build the column table from the attributes, direct children and direct
/// text of each record. Grandchildren are never inspected.
pub fn identify_columns<'a>(records: &[&'a Element], options: &SchemaOptions) -> ColumnTable<'a> {
    let mut columns = ColumnTable::new();

    for &record in records {
        let mut seen: HashSet<String> = HashSet::new();
        let mut touch = |name: String, source: ColumnSource, instance: &'a Element| {
            let repeated = !seen.insert(name.clone());
            let column = columns
                .entry(name.clone())
                .or_insert_with(|| ColumnAnalysis::new(name, source));
            column.occurrences += 1;
            column.repeats_in_record |= repeated;
            column.instances.push(instance);
        };

        match options.attribute_mode {
            AttributeMode::Discard => {}
            AttributeMode::Map => {
                if !record.attributes.is_empty() {
                    touch(
                        ATTRIBUTE_MAP_COLUMN.to_string(),
                        ColumnSource::AttributeMap,
                        record,
                    );
                }
            }
            AttributeMode::Columns | AttributeMode::Prefixed => {
                for attribute in &record.attributes {
                    if let Some(name) = options.attribute_column_name(attribute) {
                        touch(name, ColumnSource::Attribute, record);
                    }
                }
            }
        }

        for child in record.child_elements() {
            touch(options.element_name(child), ColumnSource::Child, child);
        }

        if !record.direct_text().trim().is_empty() {
            touch(options.text_key.clone(), ColumnSource::Text, record);
        }
    }

    columns
}
