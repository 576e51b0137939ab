//! Unified error type for the invoicing and bookkeeping layer.

use crate::entities::InvoiceType;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Errors produced by configuration loading, persistence and domain rules.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Storage-layer failure, including constraint violations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Filesystem failure while storing an upload
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The invoice breaks a pre-save rule and was not persisted
    #[error("Invalid invoice: {message}")]
    InvalidInvoice {
        /// Rule that was broken
        message: String,
    },

    /// No invoice with this id
    #[error("Invoice not found: {id}")]
    InvoiceNotFound {
        /// Requested id
        id: Uuid,
    },

    /// No item with this id
    #[error("Item not found: {id}")]
    ItemNotFound {
        /// Requested id
        id: Uuid,
    },

    /// The account breaks a pre-save rule and was not persisted
    #[error("Invalid account: {message}")]
    InvalidAccount {
        /// Rule that was broken
        message: String,
    },

    /// No account matching the id or title
    #[error("Account not found: {name}")]
    AccountNotFound {
        /// Requested id or title
        name: String,
    },

    /// No transaction with this id
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Requested id
        id: Uuid,
    },

    /// A transaction cannot be linked to itself
    #[error("Transaction {id} cannot link to itself")]
    SelfLink {
        /// Offending transaction
        id: Uuid,
    },

    /// No document with this id
    #[error("Document not found: {id}")]
    DocumentNotFound {
        /// Requested id
        id: Uuid,
    },

    /// Amount or price is NaN or infinite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Offending value
        amount: f64,
    },

    /// Concurrent writers kept claiming the next number and retries ran out
    #[error("Could not claim the next {invoice_type:?} number for {year}")]
    NumberingConflict {
        /// Document type being numbered
        invoice_type: InvoiceType,
        /// Year of issue
        year: i32,
    },

    /// Upload extension is not in the allow-list
    #[error("Unsupported file type: {extension:?}")]
    UnsupportedFileType {
        /// Extension as given (lowercased), empty if none
        extension: String,
    },

    /// Upload is larger than the configured maximum
    #[error("File too large: {size} bytes exceeds the {max} byte limit")]
    FileTooLarge {
        /// Upload size in bytes
        size: u64,
        /// Configured limit in bytes
        max: u64,
    },

    /// Upload name is empty or tries to escape the storage directory
    #[error("Invalid file name: {name:?}")]
    InvalidFileName {
        /// Name as given
        name: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
