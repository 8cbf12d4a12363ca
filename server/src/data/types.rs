//! Row types for the lookup tables.

use sqlx::FromRow;

/// One row of `lk_account_purposes`.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct AccountPurposeRow {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Unix seconds
    pub created_at: i64,
    /// Unix seconds
    pub updated_at: i64,
}
