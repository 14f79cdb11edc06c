//! Fixed query shapes over the quantification store.
//!
//! # Responsibility
//! - Build the two supported SQL shapes: point lookup and scoped list.
//! - Carry every caller-provided value as a bound parameter.
//! - Model pagination and optional filters with explicit types.
//!
//! # Invariants
//! - Table and column names only come from [`Table`] and the column
//!   constants below, never from caller input.
//! - An unrestricted [`IdFilter`] adds no `IN` clause; a restricted one is
//!   never empty.
//! - A missing threshold adds no comparison clause; a present one is finite
//!   once it has passed [`check_threshold`].

use rusqlite::types::Value;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const COL_ID: &str = "id";
pub const COL_RNA_QUANTIFICATION_ID: &str = "rna_quantification_id";
pub const COL_FEATURE_ID: &str = "feature_id";
pub const COL_EXPRESSION: &str = "expression";

/// Tables of the fixed store schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    RnaQuantification,
    Expression,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RnaQuantification => "RnaQuantification",
            Self::Expression => "Expression",
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendered SQL plus the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub table: Table,
    pub sql: String,
    pub bind_values: Vec<Value>,
}

/// Page token could not be parsed as a row offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTokenError {
    pub token: String,
}

impl Display for PageTokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid page token `{}`", self.token)
    }
}

impl Error for PageTokenError {}

/// Zero-based row offset, rendered as a decimal string on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageToken(u64);

impl PageToken {
    pub const FIRST: Self = Self(0);

    pub fn new(offset: u64) -> Self {
        Self(offset)
    }

    pub fn offset(self) -> u64 {
        self.0
    }

    /// Parses the wire form. An empty string addresses the first page.
    pub fn parse(token: &str) -> Result<Self, PageTokenError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Ok(Self::FIRST);
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| PageTokenError {
                token: token.to_string(),
            })
    }

    fn advanced_by(self, rows: usize) -> Self {
        let rows = u64::try_from(rows).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(rows))
    }
}

impl Display for PageToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Threshold that cannot be compared against stored values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdError {
    pub value: f64,
}

impl Display for ThresholdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "threshold must be a finite number, got `{}`", self.value)
    }
}

impl Error for ThresholdError {}

/// Accepts a missing or finite threshold.
///
/// NaN binds as NULL in SQLite and matches no row.
pub fn check_threshold(threshold: Option<f64>) -> Result<Option<f64>, ThresholdError> {
    match threshold {
        Some(value) if !value.is_finite() => Err(ThresholdError { value }),
        other => Ok(other),
    }
}

/// Offset/limit pair for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub token: PageToken,
    /// Row cap. `None` means no limit.
    pub size: Option<u32>,
}

impl PageRequest {
    /// Builds a page request. A size of zero is the wire default for
    /// "unset" and is treated as no limit.
    pub fn new(token: PageToken, size: Option<u32>) -> Self {
        Self {
            token,
            size: size.filter(|value| *value > 0),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn first(size: u32) -> Self {
        Self::new(PageToken::FIRST, Some(size))
    }

    /// Token of the page following one that returned `returned` rows.
    ///
    /// Only a full page of a bounded request has a successor.
    pub fn next_token(&self, returned: usize) -> Option<PageToken> {
        let size = usize::try_from(self.size?).ok()?;
        if returned < size {
            return None;
        }
        Some(self.token.advanced_by(returned))
    }
}

/// Membership filter over one id column.
///
/// The unrestricted state is explicit; a restricted filter always holds at
/// least one member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdFilter {
    members: Option<Vec<String>>,
}

impl IdFilter {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Builds a filter from a plain id list.
    ///
    /// An empty list yields the unrestricted filter, matching the wire
    /// convention where an omitted repeated field arrives empty.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        if unique.is_empty() {
            return Self::unrestricted();
        }
        Self {
            members: Some(unique.into_iter().collect()),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.members.is_none()
    }

    /// Sorted, de-duplicated members, or `None` when unrestricted.
    pub fn members(&self) -> Option<&[String]> {
        self.members.as_deref()
    }

    pub fn admits(&self, id: &str) -> bool {
        match &self.members {
            Some(members) => members.iter().any(|member| member == id),
            None => true,
        }
    }
}

/// `SELECT * FROM table WHERE id_column = ?`.
pub fn point_lookup(table: Table, id_column: &'static str, id_value: &str) -> QuerySpec {
    QuerySpec {
        table,
        sql: format!("SELECT * FROM {table} WHERE {id_column} = ?"),
        bind_values: vec![Value::Text(id_value.to_string())],
    }
}

/// `SELECT * FROM table WHERE id_column = ? AND scope_column = ?`.
///
/// Point lookup for ids that are only unique within a parent.
pub fn scoped_lookup(
    table: Table,
    (id_column, id_value): (&'static str, &str),
    (scope_column, scope_value): (&'static str, &str),
) -> QuerySpec {
    QuerySpec {
        table,
        sql: format!("SELECT * FROM {table} WHERE {id_column} = ? AND {scope_column} = ?"),
        bind_values: vec![
            Value::Text(id_value.to_string()),
            Value::Text(scope_value.to_string()),
        ],
    }
}

/// Builder for the filtered, paginated list shape.
#[derive(Debug, Clone)]
pub struct ScopedList {
    table: Table,
    scope: Option<(&'static str, String)>,
    threshold: Option<(&'static str, f64)>,
    id_filter: Option<(&'static str, IdFilter)>,
    page: PageRequest,
}

impl ScopedList {
    pub fn new(table: Table, page: PageRequest) -> Self {
        Self {
            table,
            scope: None,
            threshold: None,
            id_filter: None,
            page,
        }
    }

    /// Restricts rows to `column = value`.
    pub fn scoped_by(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.scope = Some((column, value.into()));
        self
    }

    /// Restricts rows to `column >= threshold` when a threshold is given.
    pub fn at_least(mut self, column: &'static str, threshold: Option<f64>) -> Self {
        self.threshold = threshold.map(|value| (column, value));
        self
    }

    /// Restricts rows to `column IN (...)` unless the filter is unrestricted.
    pub fn member_of(mut self, column: &'static str, filter: &IdFilter) -> Self {
        self.id_filter = if filter.is_unrestricted() {
            None
        } else {
            Some((column, filter.clone()))
        };
        self
    }

    pub fn build(&self) -> QuerySpec {
        let mut sql = format!("SELECT * FROM {}", self.table);
        let mut clauses: Vec<String> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some((column, value)) = &self.scope {
            clauses.push(format!("{column} = ?"));
            bind_values.push(Value::Text(value.clone()));
        }

        if let Some((column, threshold)) = self.threshold {
            clauses.push(format!("{column} >= ?"));
            bind_values.push(Value::Real(threshold));
        }

        if let Some((column, filter)) = &self.id_filter {
            if let Some(members) = filter.members() {
                let placeholders = vec!["?"; members.len()].join(", ");
                clauses.push(format!("{column} IN ({placeholders})"));
                bind_values.extend(members.iter().cloned().map(Value::Text));
            }
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        push_page_clause(&mut sql, &mut bind_values, &self.page);

        QuerySpec {
            table: self.table,
            sql,
            bind_values,
        }
    }
}

fn push_page_clause(sql: &mut String, bind_values: &mut Vec<Value>, page: &PageRequest) {
    let offset = i64::try_from(page.token.offset()).unwrap_or(i64::MAX);
    if let Some(size) = page.size {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(size)));
        if offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(offset));
        }
    } else if offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(offset));
    }
}
