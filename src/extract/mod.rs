//! Typed row extraction
//!
//! Rows are built from the same record elements the schema was inferred from,
//! or from any record set paired with caller supplied column names and types.
//! Every row has exactly one value per column; anything a record lacks is
//! [`Value::Null`].

mod extractor;
mod value;

pub use extractor::DataExtractor;
pub use value::{Row, Value, rows_to_json};
