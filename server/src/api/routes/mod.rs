//! API route handlers

pub mod account_purposes;
pub mod health;
