//! The module contains the errors the ledger can throw.
//!
//! Validation errors ([`InvalidAmount`], [`OverpaymentRejected`],
//! [`InsufficientStock`], [`AlreadyCancelled`]) never leave the store in a
//! mutated state: the surrounding database transaction is rolled back.
//! [`Storage`] is fatal to the current operation only.
//!
//! [`InvalidAmount`]: LedgerError::InvalidAmount
//! [`OverpaymentRejected`]: LedgerError::OverpaymentRejected
//! [`InsufficientStock`]: LedgerError::InsufficientStock
//! [`AlreadyCancelled`]: LedgerError::AlreadyCancelled
//! [`Storage`]: LedgerError::Storage
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("\"{0}\" not found")]
    NotFound(String),
    #[error("\"{0}\" already present")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),
    #[error("Overpayment rejected: {0}")]
    OverpaymentRejected(String),
    #[error("Already cancelled: {0}")]
    AlreadyCancelled(String),
    #[error(transparent)]
    Storage(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::OverpaymentRejected(a), Self::OverpaymentRejected(b)) => a == b,
            (Self::AlreadyCancelled(a), Self::AlreadyCancelled(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
