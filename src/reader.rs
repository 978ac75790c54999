//! Size-checked document loading
//!
//! Every entry point rejects input above `SchemaOptions::maximum_size` before
//! parsing. With `ignore_errors` set, a document that is too large or fails to
//! parse is skipped with a warning instead of failing the call.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::document::Document;
use crate::extract::Row;
use crate::inference::{CONTENT_COLUMN, ColumnInfo, SchemaError, SchemaOptions};

/// A parsed document together with the name of its source
#[derive(Debug, Clone)]
pub struct NamedDocument {
    pub name: String,
    pub document: Document,
}

fn check_size(size: usize, options: &SchemaOptions) -> Result<(), SchemaError> {
    if size > options.maximum_size {
        return Err(SchemaError::SizeLimitExceeded {
            size,
            max: options.maximum_size,
        });
    }
    Ok(())
}

fn skip_or_fail(
    result: Result<Document, SchemaError>,
    source: &str,
    options: &SchemaOptions,
) -> Result<Option<Document>, SchemaError> {
    match result {
        Ok(document) => Ok(Some(document)),
        Err(e) if options.ignore_errors => {
            warn!("Skipping {}: {}", source, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn parse_checked(text: &str, options: &SchemaOptions) -> Result<Document, SchemaError> {
    check_size(text.len(), options)?;
    let document = Document::parse(text)?;
    debug!(stats = ?document.stats(), "Parsed document");
    Ok(document)
}

/// Parse a document from text
///
/// Returns `Ok(None)` when the document was skipped under `ignore_errors`.
pub fn read_document(text: &str, options: &SchemaOptions) -> Result<Option<Document>, SchemaError> {
    skip_or_fail(parse_checked(text, options), "document", options)
}

/// Parse a document from raw bytes, which must be UTF-8
pub fn read_bytes(bytes: &[u8], options: &SchemaOptions) -> Result<Option<Document>, SchemaError> {
    let result = check_size(bytes.len(), options).and_then(|()| {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| SchemaError::DocumentInvalid(format!("invalid UTF-8: {}", e)))?;
        parse_checked(text, options)
    });
    skip_or_fail(result, "document", options)
}

/// Read and parse a document from a file
///
/// The file size is checked before its contents are read. IO errors are
/// subject to `ignore_errors` like parse errors.
pub fn read_file(
    path: impl AsRef<Path>,
    options: &SchemaOptions,
) -> Result<Option<Document>, SchemaError> {
    let path = path.as_ref();
    let result = (|| -> Result<Document, SchemaError> {
        let size = fs::metadata(path)?.len();
        check_size(usize::try_from(size).unwrap_or(usize::MAX), options)?;
        let text = fs::read_to_string(path)?;
        parse_checked(&text, options)
    })();
    skip_or_fail(result, &path.display().to_string(), options)
}

/// Parse a batch of named sources
///
/// Each source is checked and parsed on its own. Skipped sources are left out
/// of the result; otherwise the first failure is returned.
pub fn read_documents<I, N, T>(
    sources: I,
    options: &SchemaOptions,
) -> Result<Vec<NamedDocument>, SchemaError>
where
    I: IntoIterator<Item = (N, T)>,
    N: Into<String>,
    T: AsRef<str>,
{
    let mut documents = Vec::new();
    let mut skipped = 0usize;

    for (name, text) in sources {
        let name = name.into();
        match skip_or_fail(parse_checked(text.as_ref(), options), &name, options)? {
            Some(document) => documents.push(NamedDocument { name, document }),
            None => skipped += 1,
        }
    }

    info!(
        "Read {} documents ({} skipped)",
        documents.len(),
        skipped
    );
    Ok(documents)
}

/// Infer the columns of a document given as text
///
/// A skipped document yields the single `content` column.
pub fn infer_schema_from_str(
    text: &str,
    options: &SchemaOptions,
) -> Result<Vec<ColumnInfo>, SchemaError> {
    Ok(match read_document(text, options)? {
        Some(document) => crate::infer_schema(&document, options),
        None => vec![ColumnInfo::whole_record(CONTENT_COLUMN, 0.0)],
    })
}

/// Extract rows from a document given as text
///
/// A skipped document yields no rows.
pub fn extract_data_from_str(text: &str, options: &SchemaOptions) -> Result<Vec<Row>, SchemaError> {
    match read_document(text, options)? {
        Some(document) => crate::extract_data(&document, options),
        None => Ok(Vec::new()),
    }
}
