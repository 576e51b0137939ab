//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod document;
pub mod invoice;
pub mod item;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use document::{Column as DocumentColumn, Entity as Document, Model as DocumentModel};
pub use invoice::{
    Column as InvoiceColumn, Entity as Invoice, InvoiceStatus, InvoiceType, Model as InvoiceModel,
};
pub use item::{Column as ItemColumn, Entity as Item, Model as ItemModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionType,
};
