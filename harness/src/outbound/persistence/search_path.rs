//! Validated schema names used to scope a transaction to one tenant.

use thiserror::Error;

/// PostgreSQL truncates identifiers beyond this many bytes.
pub const MAX_SCHEMA_NAME_LEN: usize = 63;

/// Reasons a schema name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchPathError {
    /// The schema name is empty.
    #[error("schema name must not be empty")]
    Empty,
    /// The schema name exceeds the identifier limit.
    #[error("schema name is {length} bytes; at most {MAX_SCHEMA_NAME_LEN} are allowed")]
    TooLong {
        /// Length of the rejected name in bytes.
        length: usize,
    },
    /// The schema name contains a character outside `[a-z0-9_]` or starts
    /// with a digit.
    #[error("schema name contains invalid character {character:?}")]
    InvalidCharacter {
        /// First offending character.
        character: char,
    },
}

/// Schema applied with `SET LOCAL search_path` at the start of each
/// transaction.
///
/// ## Invariants
/// - Lowercase ASCII letters, digits, and underscores only.
/// - Does not start with a digit; at most [`MAX_SCHEMA_NAME_LEN`] bytes.
///
/// # Examples
/// ```
/// use tx_harness::outbound::persistence::SearchPath;
///
/// let path = SearchPath::for_tenant("Diku", "mod_orders")?;
/// assert_eq!(path.as_str(), "diku_mod_orders");
/// # Ok::<(), tx_harness::outbound::persistence::SearchPathError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath(String);

impl SearchPath {
    /// Validate `schema` as a search path.
    pub fn new(schema: impl Into<String>) -> Result<Self, SearchPathError> {
        let schema = schema.into();
        if schema.is_empty() {
            return Err(SearchPathError::Empty);
        }
        if schema.len() > MAX_SCHEMA_NAME_LEN {
            return Err(SearchPathError::TooLong {
                length: schema.len(),
            });
        }
        let mut chars = schema.chars();
        if let Some(first) = chars.next().filter(char::is_ascii_digit) {
            return Err(SearchPathError::InvalidCharacter { character: first });
        }
        if let Some(character) = schema
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_'))
        {
            return Err(SearchPathError::InvalidCharacter { character });
        }
        Ok(Self(schema))
    }

    /// Schema for `tenant`'s copy of `module`, named `<tenant>_<module>` with
    /// the tenant lowercased.
    pub fn for_tenant(tenant: &str, module: &str) -> Result<Self, SearchPathError> {
        Self::new(format!("{}_{module}", tenant.to_lowercase()))
    }

    /// Schema name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Statement scoping the current transaction to this schema.
    pub(crate) fn set_local_statement(&self) -> String {
        format!("SET LOCAL search_path TO \"{}\"", self.0)
    }
}

impl std::fmt::Display for SearchPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("public")]
    #[case("diku_mod_orders")]
    #[case("_staging2")]
    fn accepts_plain_identifiers(#[case] schema: &str) {
        let path = SearchPath::new(schema).expect("valid schema");

        assert_eq!(path.as_str(), schema);
        assert_eq!(
            path.set_local_statement(),
            format!("SET LOCAL search_path TO \"{schema}\"")
        );
    }

    #[rstest]
    #[case("", SearchPathError::Empty)]
    #[case("9lives", SearchPathError::InvalidCharacter { character: '9' })]
    #[case("Public", SearchPathError::InvalidCharacter { character: 'P' })]
    #[case("a\"; DROP TABLE x; --", SearchPathError::InvalidCharacter { character: '"' })]
    #[case("tenant-one", SearchPathError::InvalidCharacter { character: '-' })]
    fn rejects_unsafe_identifiers(#[case] schema: &str, #[case] expected: SearchPathError) {
        assert_eq!(SearchPath::new(schema), Err(expected));
    }

    #[rstest]
    fn rejects_overlong_identifiers() {
        let schema = "s".repeat(MAX_SCHEMA_NAME_LEN + 1);

        assert_eq!(
            SearchPath::new(schema),
            Err(SearchPathError::TooLong {
                length: MAX_SCHEMA_NAME_LEN + 1
            })
        );
    }

    #[rstest]
    fn tenant_schema_is_lowercased() {
        let path = SearchPath::for_tenant("TestTenant", "mod_users").expect("valid schema");

        assert_eq!(path.to_string(), "testtenant_mod_users");
    }
}
