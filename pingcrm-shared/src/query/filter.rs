/// Filter and search clause builder
///
/// Turns the list filters a request carries (the trashed selector and a
/// free-text search term) into a parameterized SQL predicate. Column names
/// always come from fixed lists in the model layer; user input only ever
/// reaches the database as a bound parameter.
///
/// # Example
///
/// ```
/// use pingcrm_shared::query::filter::{search_condition, PatternOperator, TrashedFilter};
///
/// let clause = TrashedFilter::Active
///     .predicate("deleted_at")
///     .and(search_condition("acme", &["name", "city"], PatternOperator::Like));
///
/// assert_eq!(
///     clause.where_sql(),
///     " WHERE deleted_at IS NULL AND (name LIKE ? OR city LIKE ?)"
/// );
/// assert_eq!(clause.params(), ["%acme%", "%acme%"]);
/// ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tri-state selector for soft-deleted rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrashedFilter {
    /// Only rows that are not soft-deleted (`""` or absent)
    #[default]
    Active,

    /// Every row, deleted or not (`"with"`)
    With,

    /// Only soft-deleted rows (`"only"`)
    Only,
}

impl TrashedFilter {
    /// Parses the raw query-string value
    ///
    /// Anything other than `"with"` or `"only"` selects active rows.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "with" => TrashedFilter::With,
            "only" => TrashedFilter::Only,
            _ => TrashedFilter::Active,
        }
    }

    /// Value echoed back to the client
    pub fn as_str(&self) -> &'static str {
        match self {
            TrashedFilter::Active => "",
            TrashedFilter::With => "with",
            TrashedFilter::Only => "only",
        }
    }

    /// Predicate on the given `deleted_at` column
    ///
    /// `column` may be table-qualified (e.g. `contacts.deleted_at`) when the
    /// query joins tables that share the column name.
    pub fn predicate(&self, column: &str) -> SqlFragment {
        match self {
            TrashedFilter::Active => SqlFragment::new(format!("{column} IS NULL"), Vec::new()),
            TrashedFilter::With => SqlFragment::empty(),
            TrashedFilter::Only => SqlFragment::new(format!("{column} IS NOT NULL"), Vec::new()),
        }
    }
}

impl Serialize for TrashedFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TrashedFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(TrashedFilter::parse).unwrap_or_default())
    }
}

/// Case-insensitive pattern-matching operator used for search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternOperator {
    /// `LIKE`: case-insensitive for ASCII on SQLite
    #[default]
    Like,

    /// `ILIKE`: PostgreSQL's case-insensitive match
    ILike,
}

impl PatternOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            PatternOperator::Like => "LIKE",
            PatternOperator::ILike => "ILIKE",
        }
    }
}

/// A boolean SQL predicate with its positional parameters
///
/// Placeholders are `?` and appear in the same order as `params`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlFragment {
    condition: String,
    params: Vec<String>,
}

impl SqlFragment {
    pub fn new(condition: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            condition: condition.into(),
            params,
        }
    }

    /// A fragment that matches everything
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.condition.is_empty()
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Joins two fragments with `AND`, keeping `self` first
    ///
    /// An empty side is dropped, so no dangling `AND` is ever produced.
    pub fn and(self, other: SqlFragment) -> SqlFragment {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }

        let mut params = self.params;
        params.extend(other.params);

        SqlFragment {
            condition: format!("{} AND {}", self.condition, other.condition),
            params,
        }
    }

    /// Renders as a WHERE clause with a leading space, or `""` when empty
    pub fn where_sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.condition)
        }
    }
}

/// Builds an OR-combined substring match of `term` over `columns`
///
/// Returns an empty fragment when the term or the column list is empty.
pub fn search_condition(term: &str, columns: &[&str], operator: PatternOperator) -> SqlFragment {
    if term.is_empty() || columns.is_empty() {
        return SqlFragment::empty();
    }

    let pattern = format!("%{term}%");
    let op = operator.as_sql();

    let condition = columns
        .iter()
        .map(|column| format!("{column} {op} ?"))
        .collect::<Vec<_>>()
        .join(" OR ");

    SqlFragment::new(format!("({condition})"), vec![pattern; columns.len()])
}

/// Filters echoed back to list pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilters {
    /// Free-text search term
    #[serde(default)]
    pub search: String,

    /// Trashed selector
    #[serde(default)]
    pub trashed: TrashedFilter,
}

impl ListFilters {
    pub fn new(search: impl Into<String>, trashed: TrashedFilter) -> Self {
        Self {
            search: search.into(),
            trashed,
        }
    }

    /// Trashed predicate first, then search, joined with `AND`
    pub fn clause(&self, deleted_at_column: &str, search_columns: &[&str]) -> SqlFragment {
        self.trashed
            .predicate(deleted_at_column)
            .and(search_condition(&self.search, search_columns, PatternOperator::Like))
    }

    /// Query-string pairs for the active filters, in a stable order
    ///
    /// Used to keep filters on pagination links.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if !self.search.is_empty() {
            pairs.push(("search", self.search.as_str()));
        }
        if self.trashed != TrashedFilter::Active {
            pairs.push(("trashed", self.trashed.as_str()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_condition_two_columns() {
        let fragment = search_condition("acme", &["name", "city"], PatternOperator::Like);
        assert_eq!(fragment.condition(), "(name LIKE ? OR city LIKE ?)");
        assert_eq!(fragment.params(), ["%acme%", "%acme%"]);
    }

    #[test]
    fn test_search_condition_keeps_column_order() {
        let fragment = search_condition(
            "bob",
            &["contacts.first_name", "contacts.last_name", "organizations.name"],
            PatternOperator::Like,
        );
        assert_eq!(
            fragment.condition(),
            "(contacts.first_name LIKE ? OR contacts.last_name LIKE ? OR organizations.name LIKE ?)"
        );
        assert_eq!(fragment.params().len(), 3);
    }

    #[test]
    fn test_search_condition_ilike() {
        let fragment = search_condition("x", &["name"], PatternOperator::ILike);
        assert_eq!(fragment.condition(), "(name ILIKE ?)");
    }

    #[test]
    fn test_search_condition_empty_inputs() {
        assert!(search_condition("", &["name"], PatternOperator::Like).is_empty());
        assert!(search_condition("acme", &[], PatternOperator::Like).is_empty());
        assert!(search_condition("", &[], PatternOperator::Like).params().is_empty());
    }

    #[test]
    fn test_search_term_is_never_interpolated() {
        let fragment = search_condition("'; DROP TABLE users; --", &["name"], PatternOperator::Like);
        assert_eq!(fragment.condition(), "(name LIKE ?)");
        assert_eq!(fragment.params(), ["%'; DROP TABLE users; --%"]);
    }

    #[test]
    fn test_trashed_predicates() {
        assert_eq!(
            TrashedFilter::Active.predicate("deleted_at").condition(),
            "deleted_at IS NULL"
        );
        assert!(TrashedFilter::With.predicate("deleted_at").is_empty());
        assert_eq!(
            TrashedFilter::Only.predicate("contacts.deleted_at").condition(),
            "contacts.deleted_at IS NOT NULL"
        );
    }

    #[test]
    fn test_trashed_parse() {
        assert_eq!(TrashedFilter::parse(""), TrashedFilter::Active);
        assert_eq!(TrashedFilter::parse("with"), TrashedFilter::With);
        assert_eq!(TrashedFilter::parse("only"), TrashedFilter::Only);
        assert_eq!(TrashedFilter::parse("everything"), TrashedFilter::Active);
    }

    #[test]
    fn test_trashed_serde() {
        let json = serde_json::to_string(&TrashedFilter::Only).unwrap();
        assert_eq!(json, "\"only\"");

        let json = serde_json::to_string(&TrashedFilter::Active).unwrap();
        assert_eq!(json, "\"\"");

        let parsed: TrashedFilter = serde_json::from_str("\"with\"").unwrap();
        assert_eq!(parsed, TrashedFilter::With);

        let parsed: TrashedFilter = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, TrashedFilter::Active);
    }

    #[test]
    fn test_and_orders_state_before_search() {
        let clause = TrashedFilter::Only
            .predicate("deleted_at")
            .and(search_condition("a", &["name"], PatternOperator::Like));
        assert_eq!(clause.condition(), "deleted_at IS NOT NULL AND (name LIKE ?)");
        assert_eq!(clause.params(), ["%a%"]);
    }

    #[test]
    fn test_and_with_empty_sides() {
        let search = search_condition("a", &["name"], PatternOperator::Like);
        let clause = TrashedFilter::With.predicate("deleted_at").and(search.clone());
        assert_eq!(clause, search);

        let clause = TrashedFilter::Active
            .predicate("deleted_at")
            .and(SqlFragment::empty());
        assert_eq!(clause.condition(), "deleted_at IS NULL");

        assert_eq!(SqlFragment::empty().and(SqlFragment::empty()).where_sql(), "");
    }

    #[test]
    fn test_list_filters_clause_and_echo() {
        let filters = ListFilters::new("acme", TrashedFilter::With);
        let clause = filters.clause("deleted_at", &["name", "city", "phone"]);
        assert_eq!(
            clause.where_sql(),
            " WHERE (name LIKE ? OR city LIKE ? OR phone LIKE ?)"
        );

        let echoed = serde_json::to_value(&filters).unwrap();
        assert_eq!(echoed, serde_json::json!({ "search": "acme", "trashed": "with" }));
    }

    #[test]
    fn test_query_pairs_skip_defaults() {
        assert!(ListFilters::default().query_pairs().is_empty());

        let filters = ListFilters::new("bob", TrashedFilter::Only);
        assert_eq!(filters.query_pairs(), vec![("search", "bob"), ("trashed", "only")]);
    }
}
