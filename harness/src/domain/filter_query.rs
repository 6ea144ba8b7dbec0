//! Compiled filter queries over JSON document tables.

use std::fmt;

use super::ports::{FilterQueryCompiler, FilterQueryError};

/// Projection selecting every column.
pub const ALL_FIELDS: &[&str] = &["*"];

/// Column holding the JSON document in resource tables.
pub const DOCUMENT_COLUMN: &str = "jsonb";

/// Limit and offset applied to a compiled query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Maximum number of rows returned.
    pub limit: u32,
    /// Number of rows skipped before the first returned row.
    pub offset: u32,
}

impl Page {
    /// Create a page of `limit` rows starting after `offset` rows.
    pub const fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

/// Filter compiled for one resource table, with optional paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    resource: String,
    where_clause: String,
    page: Option<Page>,
}

impl CompiledQuery {
    /// Table the filter was compiled for.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// SQL boolean expression, empty when the filter imposes no restriction.
    pub fn where_clause(&self) -> &str {
        &self.where_clause
    }

    /// Paging window, if any.
    pub const fn page(&self) -> Option<Page> {
        self.page
    }

    /// Return a copy restricted to `page`.
    #[must_use]
    pub fn with_page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }
}

/// Renders the SQL suffix: `WHERE …`, then `LIMIT n OFFSET m` when paged.
impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        if !self.where_clause.trim().is_empty() {
            write!(f, "WHERE {}", self.where_clause)?;
            separator = " ";
        }
        if let Some(page) = self.page {
            write!(f, "{separator}LIMIT {} OFFSET {}", page.limit, page.offset)?;
        }
        Ok(())
    }
}

/// Compile `filter` for `resource_name` using its JSON document column.
///
/// # Examples
/// ```
/// use tx_harness::domain::ports::{FilterQueryCompiler, FilterQueryError};
/// use tx_harness::domain::{Page, filter_query};
///
/// struct Equals;
///
/// impl FilterQueryCompiler for Equals {
///     fn compile(&self, field: &str, filter: &str) -> Result<String, FilterQueryError> {
///         let (key, value) = filter
///             .split_once('=')
///             .ok_or_else(|| FilterQueryError::malformed(filter, "expected key=value"))?;
///         Ok(format!("{field}->>'{key}' = '{value}'"))
///     }
/// }
///
/// let query = filter_query(&Equals, "items", "status=open", Some(Page::new(10, 20)))?;
/// assert_eq!(
///     query.to_string(),
///     "WHERE items.jsonb->>'status' = 'open' LIMIT 10 OFFSET 20"
/// );
/// # Ok::<(), FilterQueryError>(())
/// ```
pub fn filter_query<C>(
    compiler: &C,
    resource_name: &str,
    filter: &str,
    page: Option<Page>,
) -> Result<CompiledQuery, FilterQueryError>
where
    C: FilterQueryCompiler + ?Sized,
{
    if resource_name.trim().is_empty() {
        return Err(FilterQueryError::unknown_field(resource_name));
    }
    let field = format!("{resource_name}.{DOCUMENT_COLUMN}");
    let where_clause = compiler.compile(&field, filter)?;
    Ok(CompiledQuery {
        resource: resource_name.to_owned(),
        where_clause,
        page,
    })
}

#[cfg(test)]
mod tests {
    //! Unit tests for filter query compilation and rendering.
    use super::*;
    use crate::domain::ports::MockFilterQueryCompiler;
    use mockall::predicate::eq;
    use rstest::rstest;

    fn compiler_returning(clause: &'static str) -> MockFilterQueryCompiler {
        let mut compiler = MockFilterQueryCompiler::new();
        compiler
            .expect_compile()
            .with(eq("items.jsonb"), eq("title = rust"))
            .times(1)
            .returning(move |_, _| Ok(clause.to_owned()));
        compiler
    }

    #[rstest]
    fn compiles_against_document_column() {
        let compiler = compiler_returning("items.jsonb->>'title' = 'rust'");

        let query = filter_query(&compiler, "items", "title = rust", None).expect("compiles");

        assert_eq!(query.resource(), "items");
        assert_eq!(query.where_clause(), "items.jsonb->>'title' = 'rust'");
        assert_eq!(query.page(), None);
        assert_eq!(query.to_string(), "WHERE items.jsonb->>'title' = 'rust'");
    }

    #[rstest]
    fn renders_limit_and_offset_when_paged() {
        let compiler = compiler_returning("true");

        let query = filter_query(&compiler, "items", "title = rust", Some(Page::new(5, 15)))
            .expect("compiles");

        assert_eq!(query.to_string(), "WHERE true LIMIT 5 OFFSET 15");
    }

    #[rstest]
    fn empty_clause_renders_only_paging() {
        let compiler = compiler_returning("");

        let query = filter_query(&compiler, "items", "title = rust", None)
            .expect("compiles")
            .with_page(Page::new(1, 0));

        assert_eq!(query.to_string(), "LIMIT 1 OFFSET 0");
    }

    #[rstest]
    fn malformed_filters_propagate() {
        let mut compiler = MockFilterQueryCompiler::new();
        compiler
            .expect_compile()
            .returning(|_, filter| Err(FilterQueryError::malformed(filter, "unexpected token")));

        let error = filter_query(&compiler, "items", "title = (", None).expect_err("must fail");

        assert_eq!(
            error,
            FilterQueryError::malformed("title = (", "unexpected token")
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_resource_is_rejected_before_compiling(#[case] resource: &str) {
        let mut compiler = MockFilterQueryCompiler::new();
        compiler.expect_compile().never();

        let error = filter_query(&compiler, resource, "title = rust", None).expect_err("rejected");

        assert!(matches!(error, FilterQueryError::UnknownField { .. }));
    }

    #[rstest]
    fn all_fields_selects_everything() {
        assert_eq!(ALL_FIELDS, ["*"]);
    }
}
