//! Business rules on top of the repositories.

pub mod account_purposes;

pub use account_purposes::DomainError;
