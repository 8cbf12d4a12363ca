//! Account purpose repository.
//!
//! Plain functions over a pool; no caching, the table is tiny.

use sqlx::SqlitePool;

use crate::data::error::DataError;
use crate::data::query::{
    Column, Paginated, ParsedQuery, Table, build_plain_where, fetch_page,
};
use crate::data::types::AccountPurposeRow;

/// Column registry for `lk_account_purposes`: query-string field → column.
pub const ACCOUNT_PURPOSES: Table = Table {
    name: "lk_account_purposes",
    columns: &[
        Column {
            field: "id",
            name: "id",
        },
        Column {
            field: "code",
            name: "code",
        },
        Column {
            field: "name",
            name: "name",
        },
        Column {
            field: "description",
            name: "description",
        },
        Column {
            field: "is_active",
            name: "is_active",
        },
        Column {
            field: "created_at",
            name: "created_at",
        },
        Column {
            field: "updated_at",
            name: "updated_at",
        },
    ],
};

/// Values for a new row
#[derive(Debug, Clone)]
pub struct NewAccountPurpose<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub is_active: bool,
}

/// Field updates; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct AccountPurposeChanges<'a> {
    pub code: Option<&'a str>,
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub is_active: Option<bool>,
}

pub async fn insert(
    pool: &SqlitePool,
    values: &NewAccountPurpose<'_>,
) -> Result<AccountPurposeRow, DataError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO lk_account_purposes (code, name, description, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(values.code)
    .bind(values.name)
    .bind(values.description)
    .bind(values.is_active)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let created = find_by_id(pool, result.last_insert_rowid()).await?;
    created.ok_or_else(|| DataError::Sqlx(sqlx::Error::RowNotFound))
}

pub async fn find_by_id(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<AccountPurposeRow>, DataError> {
    let row = sqlx::query_as::<_, AccountPurposeRow>(&format!(
        "SELECT {} FROM {} WHERE id = ?",
        ACCOUNT_PURPOSES.select_list(),
        ACCOUNT_PURPOSES.name,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn find_by_code(
    pool: &SqlitePool,
    code: &str,
) -> Result<Option<AccountPurposeRow>, DataError> {
    find_one_where(pool, &[("code", Some(code))]).await
}

/// Fetch the first row matching a flat field/value list (`None` = IS NULL).
pub async fn find_one_where(
    pool: &SqlitePool,
    fields: &[(&str, Option<&str>)],
) -> Result<Option<AccountPurposeRow>, DataError> {
    let clause = build_plain_where(&ACCOUNT_PURPOSES, fields);
    let sql = format!(
        "SELECT {} FROM {}{} LIMIT 1",
        ACCOUNT_PURPOSES.select_list(),
        ACCOUNT_PURPOSES.name,
        clause.sql(),
    );

    let mut query = sqlx::query_as::<_, AccountPurposeRow>(&sql);
    for bind in clause.binds() {
        query = query.bind(bind);
    }

    Ok(query.fetch_optional(pool).await?)
}

/// Paginated listing through the query pipeline.
pub async fn list(
    pool: &SqlitePool,
    query: &ParsedQuery,
) -> Result<Paginated<AccountPurposeRow>, DataError> {
    fetch_page(pool, &ACCOUNT_PURPOSES, query).await
}

/// Unpaginated listing with a flat field/value filter.
pub async fn list_where(
    pool: &SqlitePool,
    fields: &[(&str, Option<&str>)],
) -> Result<Vec<AccountPurposeRow>, DataError> {
    let clause = build_plain_where(&ACCOUNT_PURPOSES, fields);
    let sql = format!(
        "SELECT {} FROM {}{} ORDER BY code ASC",
        ACCOUNT_PURPOSES.select_list(),
        ACCOUNT_PURPOSES.name,
        clause.sql(),
    );

    let mut query = sqlx::query_as::<_, AccountPurposeRow>(&sql);
    for bind in clause.binds() {
        query = query.bind(bind);
    }

    Ok(query.fetch_all(pool).await?)
}

/// Apply changes to a row and return the updated state, or `None` if the
/// row does not exist.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    changes: &AccountPurposeChanges<'_>,
) -> Result<Option<AccountPurposeRow>, DataError> {
    let mut sets: Vec<&str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(code) = changes.code {
        sets.push("code = ?");
        binds.push(code.to_string());
    }
    if let Some(name) = changes.name {
        sets.push("name = ?");
        binds.push(name.to_string());
    }
    if let Some(description) = changes.description {
        sets.push("description = ?");
        binds.push(description.to_string());
    }
    if let Some(is_active) = changes.is_active {
        sets.push("is_active = ?");
        binds.push(if is_active { "1" } else { "0" }.to_string());
    }

    if !sets.is_empty() {
        sets.push("updated_at = ?");
        binds.push(chrono::Utc::now().timestamp().to_string());

        let sql = format!(
            "UPDATE lk_account_purposes SET {} WHERE id = ?",
            sets.join(", "),
        );
        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        query.bind(id).execute(pool).await?;
    }

    find_by_id(pool, id).await
}

/// Delete by id; `true` when a row was removed.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, DataError> {
    let result = sqlx::query("DELETE FROM lk_account_purposes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete every row matching a flat field/value filter; returns the count.
/// An empty filter is rejected rather than deleting the whole table.
pub async fn delete_where(
    pool: &SqlitePool,
    fields: &[(&str, Option<&str>)],
) -> Result<u64, DataError> {
    let clause = build_plain_where(&ACCOUNT_PURPOSES, fields);
    if clause.is_empty() {
        return Err(DataError::EmptyWhere);
    }

    let sql = format!("DELETE FROM lk_account_purposes{}", clause.sql());
    let mut query = sqlx::query(&sql);
    for bind in clause.binds() {
        query = query.bind(bind);
    }

    Ok(query.execute(pool).await?.rows_affected())
}

/// Reset the table to its seed rows; returns the number inserted.
pub async fn seed(pool: &SqlitePool) -> Result<u64, DataError> {
    const SEED_ROWS: [(&str, &str, &str, bool); 5] = [
        (
            "SAVINGS",
            "Savings Account",
            "Personal savings account for individuals",
            true,
        ),
        ("CHECKING", "Checking Account", "Daily transaction account", true),
        (
            "INVESTMENT",
            "Investment Account",
            "Investment and portfolio management",
            true,
        ),
        ("BUSINESS", "Business Account", "Business banking account", true),
        ("LOAN", "Loan Account", "Loan and credit account", false),
    ];

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM lk_account_purposes")
        .execute(&mut *tx)
        .await?;

    let now = chrono::Utc::now().timestamp();
    for (code, name, description, is_active) in SEED_ROWS {
        sqlx::query(
            "INSERT INTO lk_account_purposes (code, name, description, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(code)
        .bind(name)
        .bind(description)
        .bind(is_active)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(SEED_ROWS.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::query::{FilterCondition, FilterOp, Operand, Pagination, SortOrder, SortSpec};
    use crate::data::sqlite::SqliteService;

    async fn seeded_pool() -> SqlitePool {
        let db = SqliteService::connect_in_memory().await.unwrap();
        seed(db.pool()).await.unwrap();
        db.pool().clone()
    }

    fn query_with(
        filter: &[(&str, FilterCondition)],
        page: u64,
        page_size: u64,
        sort: Vec<SortSpec>,
    ) -> ParsedQuery {
        ParsedQuery {
            filter: filter
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            pagination: Pagination { page, page_size },
            sort,
            search: None,
        }
    }

    #[tokio::test]
    async fn insert_then_find_round_trip() {
        let pool = seeded_pool().await;

        let created = insert(
            &pool,
            &NewAccountPurpose {
                code: "ESCROW",
                name: "Escrow Account",
                description: None,
                is_active: true,
            },
        )
        .await
        .unwrap();

        let fetched = find_by_id(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.code, "ESCROW");
        assert_eq!(fetched.description, None);
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn find_by_code_uses_equality() {
        let pool = seeded_pool().await;

        let row = find_by_code(&pool, "LOAN").await.unwrap().unwrap();
        assert_eq!(row.name, "Loan Account");
        assert!(!row.is_active);

        assert!(find_by_code(&pool, "NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_sorts_and_paginates() {
        let pool = seeded_pool().await;

        // 4 active rows, page size 3 => two pages
        let query = query_with(
            &[("is_active", FilterCondition::eq("1"))],
            2,
            3,
            vec![SortSpec {
                field: "code".into(),
                order: SortOrder::Asc,
            }],
        );
        let page = list(&pool, &query).await.unwrap();

        assert_eq!(page.meta.total, 4);
        assert_eq!(page.meta.total_pages, 2);
        assert_eq!(page.meta.current_page, 2);
        assert_eq!(page.meta.page_size, 3);
        // BUSINESS, CHECKING, INVESTMENT on page 1; SAVINGS left for page 2
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].code, "SAVINGS");
    }

    #[tokio::test]
    async fn list_supports_membership_and_search() {
        let pool = seeded_pool().await;

        let mut query = query_with(
            &[(
                "code",
                FilterCondition::new(
                    FilterOp::In,
                    Operand::List(vec!["SAVINGS".into(), "LOAN".into()]),
                ),
            )],
            1,
            10,
            vec![],
        );
        query.search = Some(crate::data::query::SearchSpec {
            term: "sav".into(),
            fields: vec!["code".into(), "name".into()],
        });

        let page = list(&pool, &query).await.unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.data[0].code, "SAVINGS");
    }

    #[tokio::test]
    async fn list_where_matches_null_description() {
        let pool = seeded_pool().await;

        insert(
            &pool,
            &NewAccountPurpose {
                code: "BARE",
                name: "No Description",
                description: None,
                is_active: true,
            },
        )
        .await
        .unwrap();

        let rows = list_where(&pool, &[("description", None)]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code, "BARE");
    }

    #[tokio::test]
    async fn update_changes_only_provided_fields() {
        let pool = seeded_pool().await;
        let loan = find_by_code(&pool, "LOAN").await.unwrap().unwrap();

        let updated = update(
            &pool,
            loan.id,
            &AccountPurposeChanges {
                is_active: Some(true),
                ..AccountPurposeChanges::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert!(updated.is_active);
        assert_eq!(updated.code, "LOAN");
        assert_eq!(updated.name, "Loan Account");

        assert!(
            update(&pool, 9999, &AccountPurposeChanges::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let pool = seeded_pool().await;
        let loan = find_by_code(&pool, "LOAN").await.unwrap().unwrap();

        assert!(delete(&pool, loan.id).await.unwrap());
        assert!(!delete(&pool, loan.id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_where_refuses_empty_filter() {
        let pool = seeded_pool().await;

        assert!(delete_where(&pool, &[]).await.is_err());
        let removed = delete_where(&pool, &[("is_active", Some("0"))])
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }
}
