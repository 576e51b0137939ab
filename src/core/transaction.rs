//! Transaction business logic - Handles all ledger entry operations.
//!
//! This module provides functions for creating, retrieving, updating, linking and deleting
//! transactions. Every write passes the amount through [`normalize_amount`] first, so an
//! expense is never stored with a positive amount. Transactions that do not name an account
//! are booked against the configured default account.

use crate::{
    config::settings::Settings,
    core::account,
    entities::{Account, Transaction, TransactionType, transaction},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

/// Input for a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Booking date
    pub date: NaiveDate,
    /// Signed amount; expenses are made negative on save
    pub amount: f64,
    /// Ledger classification
    pub transaction_type: TransactionType,
    /// Short label
    pub title: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Account to book against; the default account when unset
    pub account_id: Option<Uuid>,
    /// ISO currency code; the configured currency when unset
    pub currency: Option<String>,
    /// Arbitrary key/value payload
    pub metadata: Option<Json>,
    /// Related transaction
    pub link_id: Option<Uuid>,
}

impl NewTransaction {
    /// An expense of `amount` on `date` with every optional field unset.
    #[must_use]
    pub const fn new(date: NaiveDate, amount: f64) -> Self {
        Self {
            date,
            amount,
            transaction_type: TransactionType::Expense,
            title: None,
            description: None,
            account_id: None,
            currency: None,
            metadata: None,
            link_id: None,
        }
    }
}

/// Sign rule applied before every save: a positive expense becomes negative.
///
/// Other types keep their amount as given, including negative income.
#[must_use]
pub fn normalize_amount(transaction_type: TransactionType, amount: f64) -> f64 {
    if transaction_type == TransactionType::Expense && amount > 0.0 {
        -amount.abs()
    } else {
        amount
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidAmount { amount })
    }
}

async fn ensure_link_exists(db: &DatabaseConnection, link_id: Option<Uuid>) -> Result<()> {
    if let Some(link_id) = link_id {
        Transaction::find_by_id(link_id)
            .one(db)
            .await?
            .ok_or(Error::TransactionNotFound { id: link_id })?;
    }
    Ok(())
}

/// Creates a new transaction.
///
/// The amount is validated and normalized, the account resolved (falling back to the
/// default account) and the linked transaction, if any, checked for existence.
#[instrument(skip(db, new_transaction, settings), fields(date = %new_transaction.date))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    new_transaction: NewTransaction,
    settings: &Settings,
) -> Result<transaction::Model> {
    validate_amount(new_transaction.amount)?;

    let account_id = match new_transaction.account_id {
        Some(account_id) => {
            Account::find_by_id(account_id)
                .one(db)
                .await?
                .ok_or_else(|| Error::AccountNotFound {
                    name: account_id.to_string(),
                })?
                .id
        }
        None => account::get_default_account(db, &settings.accounting).await?.id,
    };

    ensure_link_exists(db, new_transaction.link_id).await?;

    let now = Utc::now();
    let transaction_model = transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        date: Set(new_transaction.date),
        title: Set(new_transaction.title),
        description: Set(new_transaction.description),
        account_id: Set(account_id),
        transaction_type: Set(new_transaction.transaction_type),
        amount: Set(normalize_amount(
            new_transaction.transaction_type,
            new_transaction.amount,
        )),
        currency: Set(new_transaction
            .currency
            .unwrap_or_else(|| settings.invoice.currency.clone())),
        metadata: Set(new_transaction.metadata),
        link_id: Set(new_transaction.link_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let result = transaction_model.insert(db).await?;
    debug!("Created transaction {}", result.id);
    Ok(result)
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: Uuid,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all transactions of an account, newest booking date first.
pub async fn get_transactions_for_account(
    db: &DatabaseConnection,
    account_id: Uuid,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::AccountId.eq(account_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Saves changes to an existing transaction, re-applying the sign rule.
#[instrument(skip(db, transaction), fields(id = %transaction.id))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction: transaction::Model,
) -> Result<transaction::Model> {
    validate_amount(transaction.amount)?;

    let existing = get_transaction_by_id(db, transaction.id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction.id })?;

    if transaction.link_id == Some(transaction.id) {
        return Err(Error::SelfLink { id: transaction.id });
    }
    if transaction.account_id != existing.account_id {
        Account::find_by_id(transaction.account_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::AccountNotFound {
                name: transaction.account_id.to_string(),
            })?;
    }
    ensure_link_exists(db, transaction.link_id).await?;

    let mut active_model: transaction::ActiveModel = existing.into();
    active_model.date = Set(transaction.date);
    active_model.title = Set(transaction.title);
    active_model.description = Set(transaction.description);
    active_model.account_id = Set(transaction.account_id);
    active_model.transaction_type = Set(transaction.transaction_type);
    active_model.amount = Set(normalize_amount(
        transaction.transaction_type,
        transaction.amount,
    ));
    active_model.currency = Set(transaction.currency);
    active_model.metadata = Set(transaction.metadata);
    active_model.link_id = Set(transaction.link_id);
    active_model.updated_at = Set(Utc::now());

    active_model.update(db).await.map_err(Into::into)
}

/// Points `transaction_id` at a related transaction, or clears the link with `None`.
pub async fn link_transactions(
    db: &DatabaseConnection,
    transaction_id: Uuid,
    link_id: Option<Uuid>,
) -> Result<transaction::Model> {
    let mut transaction = get_transaction_by_id(db, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    transaction.link_id = link_id;
    update_transaction(db, transaction).await
}

/// Deletes a transaction along with its documents.
///
/// Transactions linking to it keep existing with the link cleared.
#[instrument(skip(db))]
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: Uuid) -> Result<()> {
    let transaction = get_transaction_by_id(db, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    transaction.delete(db).await?;
    info!("Deleted transaction {transaction_id}");
    Ok(())
}
