//! Account purpose request/response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::AccountPurposeRow;

/// Body for create and full update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AccountPurposeBody {
    #[validate(length(min = 1, max = 50, message = "code must be 1-50 characters"))]
    pub code: String,

    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,

    pub description: Option<String>,

    /// Defaults to false on create, untouched on update
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountPurposeDto {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<AccountPurposeRow> for AccountPurposeDto {
    fn from(row: AccountPurposeRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
