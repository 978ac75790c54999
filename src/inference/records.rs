//! Record node selection

use tracing::debug;

use crate::document::{Document, Element, PathQuery};

use super::config::SchemaOptions;

/// Choose the elements that become rows
///
/// Selection order: a zero depth budget makes the root the only record, then
/// `record_path`, then the children of `root_element`, then the root's children.
/// Invalid or unmatched expressions give an empty record set.
pub fn locate_records<'a>(document: &'a Document, options: &SchemaOptions) -> Vec<&'a Element> {
    if options.effective_depth() == 0 {
        return vec![document.root()];
    }

    if let Some(path) = options.record_path.as_deref() {
        return match PathQuery::locator(path) {
            Ok(query) => query.evaluate(document),
            Err(e) => {
                debug!("Record path '{}' not usable: {}", path, e);
                Vec::new()
            }
        };
    }

    if let Some(name) = options.root_element.as_deref() {
        let container = match PathQuery::locator(name) {
            Ok(query) => query.evaluate(document).into_iter().next(),
            Err(e) => {
                debug!("Root element '{}' not usable: {}", name, e);
                None
            }
        };
        return match container {
            Some(container) => container.child_elements().collect(),
            None => {
                debug!("Root element '{}' not found", name);
                Vec::new()
            }
        };
    }

    document.root().child_elements().collect()
}
