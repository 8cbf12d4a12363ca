//! Account purpose rules: code uniqueness, existence checks, status toggle.

use sqlx::SqlitePool;
use thiserror::Error;

use crate::data::error::DataError;
use crate::data::query::{Paginated, ParsedQuery};
use crate::data::sqlite::repositories::account_purpose as repo;
use crate::data::sqlite::repositories::account_purpose::{
    AccountPurposeChanges, NewAccountPurpose,
};
use crate::data::types::AccountPurposeRow;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Account purpose not found")]
    NotFound,

    #[error("Account purpose with code '{0}' already exists")]
    CodeExists(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Create a purpose, rejecting duplicate codes.
pub async fn create(
    pool: &SqlitePool,
    values: &NewAccountPurpose<'_>,
) -> Result<AccountPurposeRow, DomainError> {
    if repo::find_by_code(pool, values.code).await?.is_some() {
        return Err(DomainError::CodeExists(values.code.to_string()));
    }

    Ok(repo::insert(pool, values).await?)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<AccountPurposeRow, DomainError> {
    repo::find_by_id(pool, id).await?.ok_or(DomainError::NotFound)
}

/// Paginated listing through the query pipeline.
pub async fn list(
    pool: &SqlitePool,
    query: &ParsedQuery,
) -> Result<Paginated<AccountPurposeRow>, DomainError> {
    Ok(repo::list(pool, query).await?)
}

/// All active purposes, unpaginated.
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<AccountPurposeRow>, DomainError> {
    Ok(repo::list_where(pool, &[("is_active", Some("1"))]).await?)
}

/// Update a purpose; the new code (when changed) must stay unique.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    changes: &AccountPurposeChanges<'_>,
) -> Result<AccountPurposeRow, DomainError> {
    let existing = repo::find_by_id(pool, id).await?.ok_or(DomainError::NotFound)?;

    if let Some(code) = changes.code
        && code != existing.code
        && repo::find_by_code(pool, code).await?.is_some()
    {
        return Err(DomainError::CodeExists(code.to_string()));
    }

    repo::update(pool, id, changes)
        .await?
        .ok_or(DomainError::NotFound)
}

/// Flip `is_active` and return the updated row.
pub async fn toggle_status(pool: &SqlitePool, id: i64) -> Result<AccountPurposeRow, DomainError> {
    let existing = repo::find_by_id(pool, id).await?.ok_or(DomainError::NotFound)?;

    repo::update(
        pool,
        id,
        &AccountPurposeChanges {
            is_active: Some(!existing.is_active),
            ..AccountPurposeChanges::default()
        },
    )
    .await?
    .ok_or(DomainError::NotFound)
}

/// Delete a purpose; missing rows are an error rather than a no-op.
pub async fn remove(pool: &SqlitePool, id: i64) -> Result<(), DomainError> {
    if repo::delete(pool, id).await? {
        Ok(())
    } else {
        Err(DomainError::NotFound)
    }
}
