//! Schema inference engine

use tracing::{debug, info};

use crate::document::{Document, Element};

use super::columns::{ColumnAnalysis, identify_columns};
use super::config::{AttributeMode, SchemaOptions};
use super::formats::{clean_text, detect_scalar_kind};
use super::records::locate_records;
use super::types::{
    ColumnInfo, ColumnSource, InferredSchema, OpaqueMode, ResolvedType, SchemaFallback,
    StructField,
};

/// Column name used when a document cannot be split into columns
pub const CONTENT_COLUMN: &str = "content";

/// Schema inference engine
///
/// Locates record elements, collects their columns and resolves a type for
/// each column, descending at most `max_depth` levels below the root.
#[derive(Debug, Clone, Default)]
pub struct SchemaInferrer {
    options: SchemaOptions,
}

impl SchemaInferrer {
    /// Create a new schema inferrer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new schema inferrer with custom options
    pub fn with_options(options: SchemaOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Infer the schema of a document
    pub fn infer(&self, document: &Document) -> InferredSchema {
        let records = locate_records(document, &self.options);
        self.infer_records(document.root(), &records)
    }

    /// Infer the schema of an already located record set
    ///
    /// `root` only names the fallback column when `records` is empty.
    pub fn infer_records(&self, root: &Element, records: &[&Element]) -> InferredSchema {
        let remaining = self.options.effective_depth() - 2;

        if remaining < 0 {
            let named = records.first().copied().unwrap_or(root);
            debug!(
                "Depth budget {} too small, keeping records whole",
                self.options.effective_depth()
            );
            return self.fallback(
                self.options.element_name(named),
                records.len(),
                SchemaFallback::DepthLimit,
            );
        }

        if records.is_empty() {
            debug!("No records found, falling back to a single content column");
            return self.fallback(CONTENT_COLUMN.to_string(), 0, SchemaFallback::EmptyRecordSet);
        }

        let table = identify_columns(records, &self.options);
        if table.is_empty() {
            debug!("Records carry no columns, falling back to a single content column");
            return self.fallback(
                CONTENT_COLUMN.to_string(),
                records.len(),
                SchemaFallback::NoColumns,
            );
        }

        let record_count = records.len();
        let columns: Vec<ColumnInfo> = table
            .values()
            .map(|column| ColumnInfo {
                name: column.name.clone(),
                column_type: self.infer_type(column, remaining),
                is_attribute: matches!(
                    column.source,
                    ColumnSource::Attribute | ColumnSource::AttributeMap
                ),
                confidence: (column.occurrences as f64 / record_count as f64).min(1.0),
                source: column.source,
            })
            .collect();

        info!(
            "Inferred {} columns from {} records",
            columns.len(),
            record_count
        );

        InferredSchema {
            columns,
            record_count,
            fallback: None,
        }
    }

    /// Resolve the type of a column with `remaining_depth` nested levels left
    pub fn infer_type(&self, column: &ColumnAnalysis<'_>, remaining_depth: i32) -> ResolvedType {
        match column.source {
            ColumnSource::Attribute => return ResolvedType::string(),
            ColumnSource::AttributeMap => return ResolvedType::AttributeMap,
            ColumnSource::Record => return ResolvedType::OpaqueDocument(OpaqueMode::FullElement),
            ColumnSource::Text => {
                return ResolvedType::Scalar(detect_scalar_kind(
                    &self.samples(&column.instances),
                    &self.options,
                ));
            }
            ColumnSource::Child => {}
        }

        let listed = column.repeats_in_record || self.options.is_forced_list(&column.name);
        let wrap = |resolved: ResolvedType| {
            if listed {
                ResolvedType::list_of(resolved)
            } else {
                resolved
            }
        };

        let all_leaf = column.instances.iter().all(|instance| self.is_leaf(instance));
        let first = match column.instances.first() {
            Some(first) if !all_leaf => *first,
            _ => {
                let kind = detect_scalar_kind(&self.samples(&column.instances), &self.options);
                return wrap(ResolvedType::Scalar(kind));
            }
        };

        let opaque = ResolvedType::OpaqueDocument(if first.attributes.is_empty() {
            OpaqueMode::InnerContent
        } else {
            OpaqueMode::FullElement
        });

        if remaining_depth <= 0 {
            return wrap(opaque);
        }

        // Only the first instance shapes the struct
        let fields = self.struct_fields(first, remaining_depth);
        if fields.is_empty() {
            wrap(opaque)
        } else {
            wrap(ResolvedType::Struct(fields))
        }
    }

    fn struct_fields(&self, instance: &Element, remaining_depth: i32) -> Vec<StructField> {
        identify_columns(&[instance], &self.options)
            .values()
            .map(|field| {
                StructField::with_source(
                    field.name.clone(),
                    self.infer_type(field, remaining_depth - 1),
                    field.source,
                )
            })
            .collect()
    }

    fn is_leaf(&self, element: &Element) -> bool {
        !element.has_child_elements()
            && (self.options.attribute_mode == AttributeMode::Discard
                || element.attributes.is_empty())
    }

    fn samples(&self, instances: &[&Element]) -> Vec<String> {
        instances
            .iter()
            .map(|instance| clean_text(&instance.direct_text()))
            .filter(|text| !text.is_empty())
            .take(self.options.sample_size)
            .collect()
    }

    fn fallback(&self, name: String, record_count: usize, reason: SchemaFallback) -> InferredSchema {
        InferredSchema {
            columns: vec![ColumnInfo::whole_record(
                name,
                if record_count > 0 { 1.0 } else { 0.0 },
            )],
            record_count,
            fallback: Some(reason),
        }
    }
}
