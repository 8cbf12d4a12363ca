//! Query-string parsing for paginated listings.
//!
//! Turns raw `key=value` pairs into a [`ParsedQuery`] under a per-route
//! [`QueryConfig`]. Filter values follow an `operator:operand` grammar
//! (`code=eq:SAVINGS`, `id=in:1,2,3`, `created_at=between:100,200`); values
//! without a recognized operator prefix are equality filters. `page`,
//! `pageSize`, `sort` and `search` are reserved keys and never filters.
//!
//! Unknown or disallowed filter/sort fields are dropped silently so clients
//! cannot probe for schema names; malformed pagination or range operands are
//! hard errors surfaced as 400s.

use std::str::FromStr;

use thiserror::Error;

use crate::core::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::data::query::{
    FilterCondition, FilterMap, FilterOp, Operand, Pagination, ParsedQuery, SearchSpec, SortOrder,
    SortSpec,
};

/// Per-route parser configuration, built once at route registration.
///
/// `None` allow-lists permit every field; empty `searchable_fields` disables
/// search entirely.
#[derive(Debug, Clone, Copy)]
pub struct QueryConfig {
    pub allowed_filters: Option<&'static [&'static str]>,
    pub allowed_sort_fields: Option<&'static [&'static str]>,
    pub searchable_fields: &'static [&'static str],
    pub max_page_size: u64,
    pub default_page_size: u64,
    pub default_page: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            allowed_filters: None,
            allowed_sort_fields: None,
            searchable_fields: &[],
            max_page_size: MAX_PAGE_SIZE,
            default_page_size: DEFAULT_PAGE_SIZE,
            default_page: DEFAULT_PAGE,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryParseError {
    #[error("Invalid page number")]
    InvalidPage,

    #[error("Invalid limit value")]
    InvalidPageSize,

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Between operator requires two values separated by comma")]
    InvalidBetween,
}

/// Keys with reserved meaning, never treated as filters.
const RESERVED_KEYS: [&str; 4] = ["page", "pageSize", "sort", "search"];

/// A query parameter value: repeated keys accumulate into a list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RawValue {
    One(String),
    Many(Vec<String>),
}

impl RawValue {
    /// Scalar view; lists collapse into a comma-joined string.
    fn scalar(&self) -> String {
        match self {
            RawValue::One(v) => v.clone(),
            RawValue::Many(vs) => vs.join(","),
        }
    }

    fn entries(&self) -> &[String] {
        match self {
            RawValue::One(v) => std::slice::from_ref(v),
            RawValue::Many(vs) => vs,
        }
    }
}

/// Group ordered pairs by key, preserving first-seen key order.
fn group_pairs(pairs: &[(String, String)]) -> Vec<(String, RawValue)> {
    let mut grouped: Vec<(String, RawValue)> = Vec::new();

    for (key, value) in pairs {
        match grouped.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => match existing {
                RawValue::One(first) => {
                    *existing = RawValue::Many(vec![std::mem::take(first), value.clone()]);
                }
                RawValue::Many(vs) => vs.push(value.clone()),
            },
            None => grouped.push((key.clone(), RawValue::One(value.clone()))),
        }
    }

    grouped
}

/// Parse raw query pairs into a [`ParsedQuery`].
///
/// Pure function of its inputs; failures map to client errors at the route
/// boundary.
pub fn parse_query(
    pairs: &[(String, String)],
    config: &QueryConfig,
) -> Result<ParsedQuery, QueryParseError> {
    let grouped = group_pairs(pairs);
    let lookup = |key: &str| grouped.iter().find(|(k, _)| k == key).map(|(_, v)| v);

    // Pagination: empty values fall back to defaults, anything non-numeric
    // or below 1 is an error.
    let mut page = config.default_page;
    if let Some(value) = lookup("page") {
        let raw = value.scalar();
        if !raw.is_empty() {
            page = raw
                .parse::<u64>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or(QueryParseError::InvalidPage)?;
        }
    }

    let mut page_size = config.default_page_size;
    if let Some(value) = lookup("pageSize") {
        let raw = value.scalar();
        if !raw.is_empty() {
            let parsed = raw
                .parse::<u64>()
                .ok()
                .filter(|s| *s >= 1)
                .ok_or(QueryParseError::InvalidPageSize)?;
            page_size = parsed.min(config.max_page_size);
        }
    }

    // Search only exists when a term was supplied AND the route configured
    // searchable fields.
    let search = lookup("search")
        .map(|value| value.scalar())
        .filter(|term| !term.is_empty() && !config.searchable_fields.is_empty())
        .map(|term| SearchSpec {
            term,
            fields: config
                .searchable_fields
                .iter()
                .map(|f| (*f).to_string())
                .collect(),
        });

    // Sort entries: `field` or `field:desc`; empty or disallowed fields are
    // dropped, any direction other than `desc` means ascending.
    let mut sort = Vec::new();
    if let Some(value) = lookup("sort") {
        for entry in value.entries() {
            let mut parts = entry.split(':');
            let field = parts.next().unwrap_or_default();
            let order = parts.next().unwrap_or_default();

            if field.is_empty() {
                continue;
            }
            if let Some(allowed) = config.allowed_sort_fields
                && !allowed.contains(&field)
            {
                continue;
            }

            sort.push(SortSpec {
                field: field.to_string(),
                order: if order.eq_ignore_ascii_case("desc") {
                    SortOrder::Desc
                } else {
                    SortOrder::Asc
                },
            });
        }
    }

    // Filters: every non-reserved key that survives the allow-list.
    let mut filter = FilterMap::new();
    for (key, value) in &grouped {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        if let Some(allowed) = config.allowed_filters
            && !allowed.contains(&key.as_str())
        {
            continue;
        }

        filter.insert(key.clone(), parse_filter_value(&value.scalar())?);
    }

    Ok(ParsedQuery {
        filter,
        pagination: Pagination { page, page_size },
        sort,
        search,
    })
}

/// Match a filter value against the `operator:operand` grammar; anything
/// else is an equality filter on the whole value.
fn parse_filter_value(value: &str) -> Result<FilterCondition, QueryParseError> {
    if let Some((prefix, rest)) = value.split_once(':')
        && !rest.is_empty()
        && FilterOp::NAMES.contains(&prefix)
    {
        // The NAMES check already constrains the prefix; FromStr re-checks
        // so the two lists cannot silently drift apart.
        let op = FilterOp::from_str(prefix)
            .map_err(|_| QueryParseError::InvalidOperator(prefix.to_string()))?;

        let operand = match op {
            FilterOp::In | FilterOp::Nin => Operand::List(
                rest.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            FilterOp::Between => {
                let mut parts = rest.split(',');
                let start = parts.next().unwrap_or_default().trim();
                let end = parts.next().unwrap_or_default().trim();
                if start.is_empty() || end.is_empty() {
                    return Err(QueryParseError::InvalidBetween);
                }
                Operand::Range(start.to_string(), end.to_string())
            }
            _ => Operand::Value(rest.to_string()),
        };

        return Ok(FilterCondition::new(op, operand));
    }

    Ok(FilterCondition::eq(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn parse(entries: &[(&str, &str)], config: &QueryConfig) -> ParsedQuery {
        parse_query(&pairs(entries), config).unwrap()
    }

    #[test]
    fn defaults_apply_to_empty_query() {
        let parsed = parse(&[], &QueryConfig::default());
        assert_eq!(parsed.pagination.page, 1);
        assert_eq!(parsed.pagination.page_size, 10);
        assert!(parsed.filter.is_empty());
        assert!(parsed.sort.is_empty());
        assert!(parsed.search.is_none());
    }

    #[test]
    fn pagination_is_parsed_and_clamped() {
        let parsed = parse(
            &[("page", "3"), ("pageSize", "25")],
            &QueryConfig::default(),
        );
        assert_eq!(parsed.pagination.page, 3);
        assert_eq!(parsed.pagination.page_size, 25);

        let clamped = parse(&[("pageSize", "5000")], &QueryConfig::default());
        assert_eq!(clamped.pagination.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn bad_pagination_values_are_errors() {
        for value in ["abc", "0", "-2", "1.5"] {
            let err = parse_query(&pairs(&[("page", value)]), &QueryConfig::default()).unwrap_err();
            assert_eq!(err, QueryParseError::InvalidPage, "page={value}");

            let err =
                parse_query(&pairs(&[("pageSize", value)]), &QueryConfig::default()).unwrap_err();
            assert_eq!(err, QueryParseError::InvalidPageSize, "pageSize={value}");
        }
    }

    #[test]
    fn empty_pagination_values_fall_back_to_defaults() {
        let parsed = parse(&[("page", ""), ("pageSize", "")], &QueryConfig::default());
        assert_eq!(parsed.pagination.page, 1);
        assert_eq!(parsed.pagination.page_size, 10);
    }

    #[test]
    fn bare_value_becomes_equality_filter() {
        let parsed = parse(&[("code", "SAVINGS")], &QueryConfig::default());
        assert_eq!(parsed.filter["code"], FilterCondition::eq("SAVINGS"));
    }

    #[test]
    fn operator_prefixes_are_recognized() {
        let parsed = parse(
            &[("id", "gte:5"), ("name", "ilike:sav")],
            &QueryConfig::default(),
        );
        assert_eq!(
            parsed.filter["id"],
            FilterCondition::new(FilterOp::Gte, Operand::Value("5".into()))
        );
        assert_eq!(
            parsed.filter["name"],
            FilterCondition::new(FilterOp::Ilike, Operand::Value("sav".into()))
        );
    }

    #[test]
    fn unrecognized_prefix_is_equality_on_the_whole_value() {
        let parsed = parse(&[("code", "min:5"), ("name", "eq:")], &QueryConfig::default());
        assert_eq!(parsed.filter["code"], FilterCondition::eq("min:5"));
        // empty operand never matches the grammar
        assert_eq!(parsed.filter["name"], FilterCondition::eq("eq:"));
    }

    #[test]
    fn membership_lists_trim_and_drop_empty_segments() {
        let parsed = parse(&[("code", "in:a, b,,c")], &QueryConfig::default());
        assert_eq!(
            parsed.filter["code"],
            FilterCondition::new(
                FilterOp::In,
                Operand::List(vec!["a".into(), "b".into(), "c".into()])
            )
        );

        // a list that filters down to nothing is kept empty
        let parsed = parse(&[("code", "nin:, ,")], &QueryConfig::default());
        assert_eq!(
            parsed.filter["code"],
            FilterCondition::new(FilterOp::Nin, Operand::List(vec![]))
        );
    }

    #[test]
    fn between_requires_both_endpoints() {
        let parsed = parse(&[("id", "between:5,10")], &QueryConfig::default());
        assert_eq!(
            parsed.filter["id"],
            FilterCondition::new(FilterOp::Between, Operand::Range("5".into(), "10".into()))
        );

        for value in ["between:5", "between:5,", "between:,10"] {
            let err = parse_query(&pairs(&[("id", value)]), &QueryConfig::default()).unwrap_err();
            assert_eq!(err, QueryParseError::InvalidBetween, "{value}");
        }
    }

    #[test]
    fn filters_outside_the_allow_list_are_dropped() {
        let config = QueryConfig {
            allowed_filters: Some(&["code"]),
            ..QueryConfig::default()
        };
        let parsed = parse(&[("code", "A"), ("secret", "B")], &config);
        assert!(parsed.filter.contains_key("code"));
        assert!(!parsed.filter.contains_key("secret"));
    }

    #[test]
    fn reserved_keys_are_never_filters() {
        let parsed = parse(
            &[("page", "2"), ("sort", "code"), ("search", "x")],
            &QueryConfig::default(),
        );
        assert!(parsed.filter.is_empty());
    }

    #[test]
    fn sort_entries_parse_direction_case_insensitively() {
        let parsed = parse(
            &[("sort", "code:DESC"), ("sort", "name:weird"), ("sort", "id")],
            &QueryConfig::default(),
        );
        assert_eq!(
            parsed.sort,
            vec![
                SortSpec {
                    field: "code".into(),
                    order: SortOrder::Desc
                },
                SortSpec {
                    field: "name".into(),
                    order: SortOrder::Asc
                },
                SortSpec {
                    field: "id".into(),
                    order: SortOrder::Asc
                },
            ]
        );
    }

    #[test]
    fn disallowed_or_empty_sort_fields_are_dropped_silently() {
        let config = QueryConfig {
            allowed_sort_fields: Some(&["code"]),
            ..QueryConfig::default()
        };
        let parsed = parse(&[("sort", "name:desc"), ("sort", ":desc")], &config);
        assert!(parsed.sort.is_empty());
    }

    #[test]
    fn search_requires_configured_fields() {
        let without_fields = parse(&[("search", "sav")], &QueryConfig::default());
        assert!(without_fields.search.is_none());

        let config = QueryConfig {
            searchable_fields: &["code", "name"],
            ..QueryConfig::default()
        };
        let with_fields = parse(&[("search", "sav")], &config);
        assert_eq!(
            with_fields.search,
            Some(SearchSpec {
                term: "sav".into(),
                fields: vec!["code".into(), "name".into()],
            })
        );

        // empty term behaves as absent
        assert!(parse(&[("search", "")], &config).search.is_none());
    }

    #[test]
    fn parsed_query_compiles_to_sql_round_trip() {
        use crate::data::query::{Column, Table, build_filter_where, order_by_sql};

        const TABLE: Table = Table {
            name: "lk_account_purposes",
            columns: &[Column {
                field: "code",
                name: "code",
            }],
        };

        let config = QueryConfig {
            allowed_filters: Some(&["code"]),
            allowed_sort_fields: Some(&["code"]),
            ..QueryConfig::default()
        };
        let parsed = parse(
            &[
                ("code", "eq:SAVINGS"),
                ("page", "2"),
                ("pageSize", "5"),
                ("sort", "code:asc"),
            ],
            &config,
        );

        let clause =
            build_filter_where(&TABLE, &parsed.filter, parsed.search.as_ref()).unwrap();
        assert_eq!(clause.sql(), " WHERE code = ?");
        assert_eq!(clause.binds(), ["SAVINGS"]);
        assert_eq!(order_by_sql(&TABLE, &parsed.sort), " ORDER BY code ASC");
        assert_eq!(parsed.pagination.page_size, 5);
        assert_eq!(parsed.pagination.offset(), 5);
    }

    #[test]
    fn repeated_filter_keys_collapse_to_one_condition() {
        let parsed = parse(&[("code", "eq:A"), ("code", "B")], &QueryConfig::default());
        // values join with a comma before the grammar runs
        assert_eq!(
            parsed.filter["code"],
            FilterCondition::new(FilterOp::Eq, Operand::Value("A,B".into()))
        );
    }
}
