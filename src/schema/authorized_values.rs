//! Authorized-value table parser.
//!
//! Semicolon-separated rows of `category;value;label;opac_label` after one
//! header row. Rows accumulate into one [`AuthorizedValueCategory`] per
//! category, created the first time the category is seen.

use std::collections::HashMap;
use std::io::Read;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::definitions::{AuthorizedValue, AuthorizedValueCategory};

const SOURCE: &str = "authorized values";

/// Parse an authorized-value export into categories keyed by id.
///
/// Missing trailing cells read as empty strings.
///
/// # Errors
///
/// Returns a [`SchemaError`] if the table cannot be read.
pub fn parse_authorized_values<R: Read>(
    input: R,
) -> SchemaResult<HashMap<String, AuthorizedValueCategory>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let mut categories: HashMap<String, AuthorizedValueCategory> = HashMap::new();
    let mut rows = 0usize;

    for result in reader.records() {
        let row = result.map_err(|source| SchemaError::Csv {
            source_name: SOURCE.to_string(),
            source,
        })?;
        let cell = |index: usize| row.get(index).unwrap_or_default().to_string();

        let value = AuthorizedValue {
            category: cell(0),
            value: cell(1),
            label: cell(2),
            opac_label: cell(3),
        };
        categories
            .entry(value.category.clone())
            .or_insert_with(|| AuthorizedValueCategory::new(value.category.clone()))
            .add_value(value);
        rows += 1;
    }

    tracing::debug!(categories = categories.len(), rows, "authorized values parsed");
    Ok(categories)
}
