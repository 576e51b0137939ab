//! Database configuration module.
//!
//! This module handles `SQLite` database connection and schema migration using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so foreign keys and their `ON DELETE` actions follow the `Relation` declarations. Every
//! statement is `IF NOT EXISTS`, which makes [`migrate`] safe to run on every start.

use crate::config::settings::Settings;
use crate::core::account;
use crate::entities::{Account, Document, Invoice, InvoiceColumn, Item, Transaction};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/faktura.sqlite?mode=rwc";

/// Unique index guarding invoice numbers within a document type.
///
/// Numbers embed the year, so `(type, number)` is unique per year as well.
/// Drafts have a `NULL` number and never collide.
pub const INVOICE_NUMBER_INDEX: &str = "idx_invoices_type_number";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to {database_url}");

    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables and indexes.
///
/// Parents are created before children so foreign keys resolve: accounts and
/// invoices first, then items and transactions, then documents.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Account).await?;
    create_table(db, &schema, Invoice).await?;
    create_table(db, &schema, Item).await?;
    create_table(db, &schema, Transaction).await?;
    create_table(db, &schema, Document).await?;

    let number_index = Index::create()
        .name(INVOICE_NUMBER_INDEX)
        .table(Invoice)
        .col(InvoiceColumn::InvoiceType)
        .col(InvoiceColumn::Number)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&number_index)).await?;

    Ok(())
}

/// Brings the schema up to date and seeds the default account.
#[instrument(skip_all)]
pub async fn migrate(db: &DatabaseConnection, settings: &Settings) -> Result<()> {
    create_tables(db).await?;
    info!("Schema is up to date");

    if let Some(default) = account::seed_default_account(db, &settings.accounting).await? {
        info!("Default account is {:?}", default.title);
    }

    Ok(())
}
