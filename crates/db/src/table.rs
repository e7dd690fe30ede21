//! Validated target table names.
//!
//! Table names come from configuration and end up spliced into DDL, so they
//! are restricted to plain or schema-qualified SQL identifiers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use promoflow_core::CoreError;

static TABLE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}(\.[A-Za-z_][A-Za-z0-9_]{0,62})?$")
        .expect("valid regex")
});

/// A `table` or `schema.table` identifier safe to interpolate into SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if TABLE_NAME_RE.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(CoreError::Validation(format!(
                "table name '{raw}' must be an identifier or schema.identifier"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
