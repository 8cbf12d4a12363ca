//! Structured representation of a parsed listing query.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Comparison/membership/range operators accepted in filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
    In,
    Nin,
    Between,
}

impl FilterOp {
    /// Operator names as they appear in query strings, in grammar order.
    pub const NAMES: [&'static str; 11] = [
        "eq", "ne", "gt", "gte", "lt", "lte", "like", "ilike", "in", "nin", "between",
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Like => "like",
            FilterOp::Ilike => "ilike",
            FilterOp::In => "in",
            FilterOp::Nin => "nin",
            FilterOp::Between => "between",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for operator names outside the recognized set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator;

impl FromStr for FilterOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(FilterOp::Eq),
            "ne" => Ok(FilterOp::Ne),
            "gt" => Ok(FilterOp::Gt),
            "gte" => Ok(FilterOp::Gte),
            "lt" => Ok(FilterOp::Lt),
            "lte" => Ok(FilterOp::Lte),
            "like" => Ok(FilterOp::Like),
            "ilike" => Ok(FilterOp::Ilike),
            "in" => Ok(FilterOp::In),
            "nin" => Ok(FilterOp::Nin),
            "between" => Ok(FilterOp::Between),
            _ => Err(UnknownOperator),
        }
    }
}

/// Operand shape attached to an operator.
///
/// The parser only pairs each operator with its legal shape (`in`/`nin` →
/// `List`, `between` → `Range`, everything else → `Value`); the predicate
/// builder rejects any other pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Value(String),
    List(Vec<String>),
    Range(String, String),
}

/// One operator applied to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub op: FilterOp,
    pub operand: Operand,
}

impl FilterCondition {
    pub fn new(op: FilterOp, operand: Operand) -> Self {
        Self { op, operand }
    }

    /// Shorthand for the default equality filter.
    pub fn eq(value: impl Into<String>) -> Self {
        Self::new(FilterOp::Eq, Operand::Value(value.into()))
    }
}

/// Field name → condition. A BTreeMap keeps predicate order deterministic;
/// a field supplied twice keeps the last write.
pub type FilterMap = BTreeMap<String, FilterCondition>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

/// Free-text search over a fixed set of fields, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    pub term: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.page_size
    }
}

/// A fully parsed listing query, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub filter: FilterMap,
    pub pagination: Pagination,
    pub sort: Vec<SortSpec>,
    pub search: Option<SearchSpec>,
}
