//! Core business logic - framework-agnostic operations on the stored records.
//!
//! Every function takes the database connection as a parameter; nothing here
//! holds global state.

/// Accounts and the configured default account
pub mod account;
/// Documents attached to transactions and invoices
pub mod document;
/// Invoice writes, finalization and lookups
pub mod invoice;
/// Invoice lines
pub mod item;
/// Sequential invoice numbers per year and type
pub mod numbering;
/// Upload validation and file storage
pub mod storage;
/// Derived invoice totals
pub mod totals;
/// Ledger entries
pub mod transaction;
