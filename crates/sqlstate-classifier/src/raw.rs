//! Raw database error shape handed over by database clients.

use std::collections::BTreeMap;

/// Well-known keys of the [`RawDatabaseError`] field map.
///
/// Names follow the PostgreSQL error message fields; adapters translating
/// client errors should use these keys so classification can surface them.
pub mod fields {
    /// Severity, for example `ERROR` or `FATAL`.
    pub const SEVERITY: &str = "severity";
    /// Secondary message carrying more detail about the problem.
    pub const DETAIL: &str = "detail";
    /// Suggestion on what to do about the problem.
    pub const HINT: &str = "hint";
    /// Schema of the object associated with the error.
    pub const SCHEMA: &str = "schema";
    /// Table associated with the error.
    pub const TABLE: &str = "table";
    /// Column associated with the error.
    pub const COLUMN: &str = "column";
    /// Data type associated with the error.
    pub const DATATYPE: &str = "datatype";
    /// Constraint associated with the error.
    pub const CONSTRAINT: &str = "constraint";
    /// Server routine reporting the error.
    pub const ROUTINE: &str = "routine";
}

/// Immutable structured error reported by a database client.
///
/// Every part is optional: clients do not always know the SQLSTATE (closed
/// sockets, protocol errors) and some servers omit the message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDatabaseError {
    sql_state: Option<String>,
    message: Option<String>,
    fields: BTreeMap<String, String>,
}

impl RawDatabaseError {
    /// Create a raw error with no extra fields.
    #[must_use]
    pub fn new(sql_state: Option<&str>, message: Option<&str>) -> Self {
        Self {
            sql_state: sql_state.map(str::to_owned),
            message: message.map(str::to_owned),
            fields: BTreeMap::new(),
        }
    }

    /// Create a raw error from owned parts.
    #[must_use]
    pub const fn from_parts(
        sql_state: Option<String>,
        message: Option<String>,
        fields: BTreeMap<String, String>,
    ) -> Self {
        Self {
            sql_state,
            message,
            fields,
        }
    }

    /// Return a copy with `name` set to `value` in the field map.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// SQLSTATE code, if the client reported one.
    #[must_use]
    pub fn sql_state(&self) -> Option<&str> {
        self.sql_state.as_deref()
    }

    /// Primary human-readable message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// All protocol fields keyed by name.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Look up a single field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}
