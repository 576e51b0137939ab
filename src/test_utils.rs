//! Shared test utilities for `faktura`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::{
        database,
        settings::{InvoiceDefaults, Settings},
    },
    core::{
        account,
        invoice::{self, NewInvoice},
        transaction::{self, NewTransaction},
    },
    entities::{self, Invoice, InvoiceStatus, InvoiceType, TransactionType},
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectOptions, DatabaseConnection, PaginatorTrait, prelude::*};
use std::path::Path;

/// Creates an in-memory `SQLite` database with all tables initialized
/// and the default "Personal" account seeded.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    database::create_tables(&db).await?;
    account::seed_default_account(&db, &test_settings().accounting).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database at `path` with a pool of several
/// connections, so concurrent writers really run side by side.
pub async fn setup_file_test_db(path: &Path) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options.max_connections(4).min_connections(4).sqlx_logging(false);

    let db = sea_orm::Database::connect(options).await?;
    database::create_tables(&db).await?;
    account::seed_default_account(&db, &test_settings().accounting).await?;
    Ok(db)
}

/// Built-in settings, as used when no config file exists.
pub fn test_settings() -> Settings {
    Settings::default()
}

/// Minimal date used by fixtures.
fn fixture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default()
}

/// An unsaved invoice model for pure computations.
///
/// # Defaults
/// * `status`: draft, `invoice_type`: invoice, no number, no parent
/// * `includes_vat`: false, `vat`: 20.0, `discount`: 0.0
pub fn invoice_fixture() -> entities::InvoiceModel {
    let now = Utc::now();
    entities::InvoiceModel {
        id: Uuid::new_v4(),
        number: None,
        date_of_issue: fixture_date(),
        due_date: fixture_date(),
        seller: "Seller".to_string(),
        seller_details: "Main Street 1".to_string(),
        buyer: "Buyer".to_string(),
        buyer_details: "Side Street 2".to_string(),
        status: InvoiceStatus::Draft,
        invoice_type: InvoiceType::Invoice,
        includes_vat: false,
        vat: 20.0,
        currency: "EUR".to_string(),
        discount: 0.0,
        note: None,
        author: "tester".to_string(),
        invoice_id: None,
        created_at: now,
        updated_at: now,
    }
}

/// An unsaved line on `invoice_id`.
pub fn item_fixture(invoice_id: Uuid, price: f64, quantity: u32) -> entities::ItemModel {
    entities::ItemModel {
        id: Uuid::new_v4(),
        invoice_id,
        title: "Service".to_string(),
        price,
        quantity,
    }
}

/// An unsaved expense of `amount` on 2024-01-15 in EUR.
pub fn transaction_fixture(account_id: Uuid, amount: f64) -> entities::TransactionModel {
    let now = Utc::now();
    entities::TransactionModel {
        id: Uuid::new_v4(),
        date: fixture_date(),
        title: None,
        description: None,
        account_id,
        transaction_type: TransactionType::Expense,
        amount,
        currency: "EUR".to_string(),
        metadata: None,
        link_id: None,
        created_at: now,
        updated_at: now,
    }
}

/// Invoice input with the required parties filled in and everything else defaulted.
pub fn new_invoice_fixture() -> NewInvoice {
    NewInvoice {
        seller: "Seller".to_string(),
        seller_details: "Main Street 1".to_string(),
        buyer: "Buyer".to_string(),
        buyer_details: "Side Street 2".to_string(),
        author: "tester".to_string(),
        ..NewInvoice::default()
    }
}

/// Creates and stores an invoice of the given type and status issued on `date_of_issue`.
pub async fn create_test_invoice(
    db: &DatabaseConnection,
    invoice_type: InvoiceType,
    status: InvoiceStatus,
    date_of_issue: NaiveDate,
) -> Result<entities::InvoiceModel> {
    let new_invoice = NewInvoice {
        invoice_type: Some(invoice_type),
        status: Some(status),
        date_of_issue: Some(date_of_issue),
        ..new_invoice_fixture()
    };
    invoice::create_invoice(db, new_invoice, &InvoiceDefaults::default()).await
}

/// Creates and stores a 10.00 EUR expense on the default account.
pub async fn create_test_transaction(db: &DatabaseConnection) -> Result<entities::TransactionModel> {
    transaction::create_transaction(db, NewTransaction::new(fixture_date(), 10.0), &test_settings())
        .await
}

/// Number of stored invoices.
pub async fn count_invoices(db: &DatabaseConnection) -> Result<u64> {
    Invoice::find().count(db).await.map_err(Into::into)
}
