//! Compiles parsed filters into SQL predicates against a column registry.

use thiserror::Error;

use super::filter::{FilterMap, FilterOp, Operand, SearchSpec, SortSpec};

/// A logical field exposed to clients, mapped to its SQL column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Field name as it appears in query strings
    pub field: &'static str,
    /// Column name in SQL
    pub name: &'static str,
}

/// Per-table registry of filterable/sortable columns.
///
/// Built once per table at compile time and shared across requests. Lookup
/// misses are an explicit `None`: fields unknown to the registry are
/// silently skipped so stale clients and field probing cannot distinguish
/// schema from non-schema names.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn column(&self, field: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Comma-separated column list for SELECT statements.
    pub fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredicateError {
    /// An operator was paired with an operand shape the grammar cannot
    /// produce. Only reachable by constructing a filter map by hand.
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
}

/// AND-combined predicates plus their positional binds, in emission order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WhereClause {
    predicates: Vec<String>,
    binds: Vec<String>,
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn binds(&self) -> &[String] {
        &self.binds
    }

    /// ` WHERE a AND b AND ...`, or the empty string when nothing matched.
    pub fn sql(&self) -> String {
        if self.predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.predicates.join(" AND "))
        }
    }

    fn push(&mut self, predicate: String, binds: impl IntoIterator<Item = String>) {
        self.predicates.push(predicate);
        self.binds.extend(binds);
    }
}

/// Compile a filter map (and optional search) into a WHERE clause.
///
/// Fields missing from the registry are skipped. Search predicates are
/// OR-combined across the resolved searchable fields, then ANDed with the
/// rest.
pub fn build_filter_where(
    table: &Table,
    filter: &FilterMap,
    search: Option<&SearchSpec>,
) -> Result<WhereClause, PredicateError> {
    let mut clause = WhereClause::default();

    for (field, condition) in filter {
        let Some(column) = table.column(field) else {
            continue;
        };

        match (condition.op, &condition.operand) {
            (FilterOp::Eq, Operand::Value(v)) => {
                clause.push(format!("{} = ?", column.name), [v.clone()]);
            }
            (FilterOp::Ne, Operand::Value(v)) => {
                clause.push(format!("{} != ?", column.name), [v.clone()]);
            }
            (FilterOp::Gt, Operand::Value(v)) => {
                clause.push(format!("{} > ?", column.name), [v.clone()]);
            }
            (FilterOp::Gte, Operand::Value(v)) => {
                clause.push(format!("{} >= ?", column.name), [v.clone()]);
            }
            (FilterOp::Lt, Operand::Value(v)) => {
                clause.push(format!("{} < ?", column.name), [v.clone()]);
            }
            (FilterOp::Lte, Operand::Value(v)) => {
                clause.push(format!("{} <= ?", column.name), [v.clone()]);
            }
            (FilterOp::Like, Operand::Value(v)) => {
                clause.push(format!("{} LIKE ?", column.name), [format!("%{v}%")]);
            }
            (FilterOp::Ilike, Operand::Value(v)) => {
                clause.push(
                    format!("LOWER({}) LIKE LOWER(?)", column.name),
                    [format!("%{v}%")],
                );
            }
            (FilterOp::In, Operand::List(values)) => {
                if values.is_empty() {
                    continue;
                }
                let placeholders = vec!["?"; values.len()].join(", ");
                clause.push(
                    format!("{} IN ({placeholders})", column.name),
                    values.iter().cloned(),
                );
            }
            (FilterOp::Nin, Operand::List(values)) => {
                if values.is_empty() {
                    continue;
                }
                let placeholders = vec!["?"; values.len()].join(", ");
                clause.push(
                    format!("{} NOT IN ({placeholders})", column.name),
                    values.iter().cloned(),
                );
            }
            (FilterOp::Between, Operand::Range(start, end)) => {
                clause.push(
                    format!("{} BETWEEN ? AND ?", column.name),
                    [start.clone(), end.clone()],
                );
            }
            (op, _) => return Err(PredicateError::UnsupportedOperator(op.to_string())),
        }
    }

    if let Some(search) = search {
        let resolved: Vec<&Column> = search
            .fields
            .iter()
            .filter_map(|field| table.column(field))
            .collect();

        if !resolved.is_empty() {
            let group = resolved
                .iter()
                .map(|c| format!("LOWER({}) LIKE LOWER(?)", c.name))
                .collect::<Vec<_>>()
                .join(" OR ");
            let binds = resolved.iter().map(|_| format!("%{}%", search.term));
            clause.push(format!("({group})"), binds);
        }
    }

    Ok(clause)
}

/// Compile a flat field/value list into an AND of equality predicates.
///
/// `Some(value)` emits equality, `None` emits `IS NULL`; fields absent from
/// the list are not filtered at all. Unknown fields are skipped.
pub fn build_plain_where(table: &Table, fields: &[(&str, Option<&str>)]) -> WhereClause {
    let mut clause = WhereClause::default();

    for (field, value) in fields {
        let Some(column) = table.column(field) else {
            continue;
        };

        match value {
            Some(v) => clause.push(format!("{} = ?", column.name), [(*v).to_string()]),
            None => clause.push(format!("{} IS NULL", column.name), std::iter::empty()),
        }
    }

    clause
}

/// ` ORDER BY a ASC, b DESC`, or the empty string when no field resolves.
pub fn order_by_sql(table: &Table, sort: &[SortSpec]) -> String {
    let directives: Vec<String> = sort
        .iter()
        .filter_map(|spec| {
            table
                .column(&spec.field)
                .map(|c| format!("{} {}", c.name, spec.order.as_sql()))
        })
        .collect();

    if directives.is_empty() {
        String::new()
    } else {
        format!(" ORDER BY {}", directives.join(", "))
    }
}
