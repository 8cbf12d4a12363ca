//! Generic paginated fetch over a column registry.

use serde::Serialize;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;
use utoipa::ToSchema;

use super::filter::ParsedQuery;
use super::predicate::{Table, build_filter_where, order_by_sql};
use crate::data::error::DataError;

/// Pagination metadata in responses
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub page_size: u64,
}

impl PageMeta {
    pub fn new(total: u64, page: u64, page_size: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };
        Self {
            total,
            total_pages,
            current_page: page,
            page_size,
        }
    }
}

/// One page of rows plus metadata
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    /// Convert the row type while keeping the metadata (e.g. row → DTO).
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Run a parsed query against a table: one COUNT and one data SELECT with
/// the same WHERE clause, executed concurrently and combined into a page.
pub async fn fetch_page<T>(
    pool: &SqlitePool,
    table: &Table,
    query: &ParsedQuery,
) -> Result<Paginated<T>, DataError>
where
    T: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
{
    let clause = build_filter_where(table, &query.filter, query.search.as_ref())?;

    let count_sql = format!("SELECT COUNT(*) FROM {}{}", table.name, clause.sql());
    let data_sql = format!(
        "SELECT {} FROM {}{}{} LIMIT ? OFFSET ?",
        table.select_list(),
        table.name,
        clause.sql(),
        order_by_sql(table, &query.sort),
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in clause.binds() {
        count_query = count_query.bind(bind);
    }

    let mut data_query = sqlx::query_as::<_, T>(&data_sql);
    for bind in clause.binds() {
        data_query = data_query.bind(bind);
    }
    data_query = data_query
        .bind(query.pagination.page_size as i64)
        .bind(query.pagination.offset() as i64);

    let (total, rows) = tokio::try_join!(count_query.fetch_one(pool), data_query.fetch_all(pool))?;

    Ok(Paginated {
        data: rows,
        meta: PageMeta::new(
            total as u64,
            query.pagination.page,
            query.pagination.page_size,
        ),
    })
}
