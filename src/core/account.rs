//! Account business logic - Buckets that transactions are booked against.
//!
//! Besides plain CRUD this module owns the default account: the one named in
//! settings, created at migration time and used by transactions that do not
//! name an account of their own.

use crate::{
    config::settings::AccountingSettings,
    entities::{Account, account},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidAccount {
            message: "Account title cannot be empty".to_string(),
        });
    }
    Ok(title.to_string())
}

/// Creates a new account.
pub async fn create_account<C>(
    db: &C,
    title: &str,
    description: Option<String>,
    metadata: Option<Json>,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let account = account::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(validate_title(title)?),
        description: Set(description),
        metadata: Set(metadata),
    };

    account.insert(db).await.map_err(Into::into)
}

/// Finds an account by its id.
pub async fn get_account_by_id(
    db: &DatabaseConnection,
    account_id: Uuid,
) -> Result<Option<account::Model>> {
    Account::find_by_id(account_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an account by its exact title.
pub async fn get_account_by_title<C>(db: &C, title: &str) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find()
        .filter(account::Column::Title.eq(title))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all accounts ordered alphabetically by title.
pub async fn get_all_accounts(db: &DatabaseConnection) -> Result<Vec<account::Model>> {
    Account::find()
        .order_by_asc(account::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces the title, description and metadata of an account.
pub async fn update_account(
    db: &DatabaseConnection,
    account_id: Uuid,
    title: &str,
    description: Option<String>,
    metadata: Option<Json>,
) -> Result<account::Model> {
    let title = validate_title(title)?;
    let existing = get_account_by_id(db, account_id)
        .await?
        .ok_or_else(|| Error::AccountNotFound {
            name: account_id.to_string(),
        })?;

    let mut active_model: account::ActiveModel = existing.into();
    active_model.title = Set(title);
    active_model.description = Set(description);
    active_model.metadata = Set(metadata);
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes an account together with its transactions and their documents.
#[instrument(skip(db))]
pub async fn delete_account(db: &DatabaseConnection, account_id: Uuid) -> Result<()> {
    let account = get_account_by_id(db, account_id)
        .await?
        .ok_or_else(|| Error::AccountNotFound {
            name: account_id.to_string(),
        })?;

    account.delete(db).await?;
    info!("Deleted account {account_id}");
    Ok(())
}

/// Gets or creates the configured default account.
///
/// Returns `None` when no default account is configured.
pub async fn seed_default_account<C>(
    db: &C,
    settings: &AccountingSettings,
) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    let Some(title) = settings.default_account() else {
        debug!("No default account configured, skipping seeding");
        return Ok(None);
    };

    if let Some(existing) = get_account_by_title(db, title).await? {
        debug!("Default account {title:?} already exists");
        return Ok(Some(existing));
    }

    let created = create_account(db, title, None, None).await?;
    info!("Created default account {title:?}");
    Ok(Some(created))
}

/// Looks up the configured default account.
///
/// # Errors
/// - [`Error::Config`] if no default account is configured
/// - [`Error::AccountNotFound`] if it has not been seeded
pub async fn get_default_account<C>(db: &C, settings: &AccountingSettings) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let title = settings.default_account().ok_or_else(|| Error::Config {
        message: "No default account configured".to_string(),
    })?;

    get_account_by_title(db, title)
        .await?
        .ok_or_else(|| Error::AccountNotFound {
            name: title.to_string(),
        })
}
