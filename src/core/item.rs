//! Item business logic - Lines on an invoice.

use crate::{
    config::settings::InvoiceDefaults,
    entities::{Invoice, Item, invoice, item},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::debug;

/// Input for a new invoice line.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    /// What was sold
    pub title: String,
    /// Unit price
    pub price: f64,
    /// Number of units; the configured default when unset
    pub quantity: Option<u32>,
}

impl NewItem {
    /// A line with the default quantity.
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            price,
            quantity: None,
        }
    }

    /// Sets an explicit quantity.
    #[must_use]
    pub const fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

fn validate_price(price: f64) -> Result<()> {
    if price.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidAmount { amount: price })
    }
}

/// Adds a line to an existing invoice.
pub async fn add_item(
    db: &DatabaseConnection,
    invoice_id: Uuid,
    new_item: NewItem,
    defaults: &InvoiceDefaults,
) -> Result<item::Model> {
    validate_price(new_item.price)?;

    Invoice::find_by_id(invoice_id)
        .one(db)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;

    let item = item::ActiveModel {
        id: Set(Uuid::new_v4()),
        invoice_id: Set(invoice_id),
        title: Set(new_item.title),
        price: Set(new_item.price),
        quantity: Set(new_item.quantity.unwrap_or(defaults.item_quantity)),
    };

    let created = item.insert(db).await?;
    debug!("Added item {} to invoice {invoice_id}", created.id);
    Ok(created)
}

/// Retrieves the lines of an invoice.
pub async fn get_items_for_invoice(
    db: &DatabaseConnection,
    invoice_id: Uuid,
) -> Result<Vec<item::Model>> {
    Item::find()
        .filter(item::Column::InvoiceId.eq(invoice_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces the title, price and quantity of a line.
pub async fn update_item(
    db: &DatabaseConnection,
    item_id: Uuid,
    title: String,
    price: f64,
    quantity: u32,
) -> Result<item::Model> {
    validate_price(price)?;

    let existing = Item::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or(Error::ItemNotFound { id: item_id })?;

    let mut active_model: item::ActiveModel = existing.into();
    active_model.title = Set(title);
    active_model.price = Set(price);
    active_model.quantity = Set(quantity);
    active_model.update(db).await.map_err(Into::into)
}

/// Removes a line from its invoice.
pub async fn delete_item(db: &DatabaseConnection, item_id: Uuid) -> Result<()> {
    let item = Item::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or(Error::ItemNotFound { id: item_id })?;

    item.delete(db).await?;
    Ok(())
}

/// Display string of a line, `"{invoice}: {title}"`.
#[must_use]
pub fn describe_item(invoice: &invoice::Model, item: &item::Model) -> String {
    format!("{invoice}: {}", item.title)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::{InvoiceStatus, InvoiceType};
    use crate::test_utils::*;
    use chrono::NaiveDate;

    async fn setup_with_invoice() -> Result<(DatabaseConnection, invoice::Model)> {
        let db = setup_test_db().await?;
        let invoice = create_test_invoice(
            &db,
            InvoiceType::Invoice,
            InvoiceStatus::Draft,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .await?;
        Ok((db, invoice))
    }

    #[tokio::test]
    async fn test_add_item_uses_default_quantity() -> Result<()> {
        let (db, invoice) = setup_with_invoice().await?;
        let defaults = InvoiceDefaults {
            item_quantity: 3,
            ..InvoiceDefaults::default()
        };

        let item = add_item(&db, invoice.id, NewItem::new("Hosting", 9.5), &defaults).await?;
        assert_eq!(item.quantity, 3);
        assert_eq!(item.invoice_id, invoice.id);
        assert_eq!(item.total_amount(), 28.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_to_missing_invoice() -> Result<()> {
        let db = setup_test_db().await?;
        let result = add_item(
            &db,
            Uuid::new_v4(),
            NewItem::new("Hosting", 9.5),
            &InvoiceDefaults::default(),
        )
        .await;
        assert!(matches!(result, Err(Error::InvoiceNotFound { id: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_rejects_nan_price() -> Result<()> {
        let (db, invoice) = setup_with_invoice().await?;
        let result = add_item(
            &db,
            invoice.id,
            NewItem::new("Broken", f64::NAN),
            &InvoiceDefaults::default(),
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_item() -> Result<()> {
        let (db, invoice) = setup_with_invoice().await?;
        let defaults = InvoiceDefaults::default();
        let item = add_item(&db, invoice.id, NewItem::new("Draft title", 1.0), &defaults).await?;

        let updated = update_item(&db, item.id, "Final title".to_string(), 12.0, 4).await?;
        assert_eq!(updated.title, "Final title");
        assert_eq!(updated.total_amount(), 48.0);

        delete_item(&db, item.id).await?;
        assert!(get_items_for_invoice(&db, invoice.id).await?.is_empty());

        let missing = delete_item(&db, item.id).await;
        assert!(matches!(missing, Err(Error::ItemNotFound { id: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_items_scoped_to_invoice() -> Result<()> {
        let (db, first) = setup_with_invoice().await?;
        let second = create_test_invoice(
            &db,
            InvoiceType::Invoice,
            InvoiceStatus::Draft,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        )
        .await?;
        let defaults = InvoiceDefaults::default();
        add_item(&db, first.id, NewItem::new("A", 1.0), &defaults).await?;
        add_item(&db, first.id, NewItem::new("B", 2.0), &defaults).await?;
        add_item(&db, second.id, NewItem::new("C", 3.0), &defaults).await?;

        assert_eq!(get_items_for_invoice(&db, first.id).await?.len(), 2);
        assert_eq!(get_items_for_invoice(&db, second.id).await?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_describe_item() {
        let mut invoice = invoice_fixture();
        invoice.number = Some("002/2024".to_string());
        invoice.buyer = "Jane".to_string();
        invoice.date_of_issue = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let item = item::Model {
            title: "Logo design".to_string(),
            ..item_fixture(invoice.id, 100.0, 1)
        };

        assert_eq!(describe_item(&invoice, &item), "002/2024: Jane (2024-07-01): Logo design");
    }
}
