//! Invoice business logic - Handles creation, saving, finalization and lookups.
//!
//! Every write goes through one path: [`validate_invoice`] rejects the invoice before
//! anything touches storage, and an invoice that is final but unnumbered gets its number
//! assigned on the same database transaction that writes it (see [`crate::core::numbering`]).
//! Item prefetching is opt-in through [`get_invoice_with_items`] and
//! [`get_invoices_with_items`]; plain lookups return bare invoices.

use crate::{
    config::settings::InvoiceDefaults,
    core::{numbering, totals::InvoiceTotals},
    entities::{Invoice, InvoiceStatus, InvoiceType, Item, invoice, item},
    errors::{Error, Result},
};
use chrono::{Datelike, Days, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, LoaderTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Attempts at claiming a number before giving up with [`Error::NumberingConflict`].
const NUMBERING_ATTEMPTS: usize = 3;

/// Input for a new invoice. Fields left as `None` take their configured default.
#[derive(Debug, Clone, Default)]
pub struct NewInvoice {
    /// Issuer name
    pub seller: String,
    /// Issuer details
    pub seller_details: String,
    /// Customer name
    pub buyer: String,
    /// Customer details
    pub buyer_details: String,
    /// Identity of the authoring user
    pub author: String,
    /// Defaults to today
    pub date_of_issue: Option<NaiveDate>,
    /// Defaults to the date of issue plus the configured offset
    pub due_date: Option<NaiveDate>,
    /// Initial status
    pub status: Option<InvoiceStatus>,
    /// Document type
    pub invoice_type: Option<InvoiceType>,
    /// VAT payer flag
    pub includes_vat: Option<bool>,
    /// VAT rate in percent
    pub vat: Option<f64>,
    /// ISO currency code
    pub currency: Option<String>,
    /// Discount in percent
    pub discount: Option<f64>,
    /// Free-form note
    pub note: Option<String>,
    /// Parent invoice (for pro formas and credit notes)
    pub parent_id: Option<Uuid>,
}

impl NewInvoice {
    /// Builds the model to insert, filling unset fields from `defaults`.
    ///
    /// `today` is the fallback date of issue. The number is always left unset;
    /// the write path assigns it.
    pub fn into_model(self, defaults: &InvoiceDefaults, today: NaiveDate) -> Result<invoice::Model> {
        let date_of_issue = self.date_of_issue.unwrap_or(today);
        let due_date = match self.due_date {
            Some(date) => date,
            None => offset_days(date_of_issue, defaults.due_date_days)?,
        };
        let now = Utc::now();

        Ok(invoice::Model {
            id: Uuid::new_v4(),
            number: None,
            date_of_issue,
            due_date,
            seller: self.seller,
            seller_details: self.seller_details,
            buyer: self.buyer,
            buyer_details: self.buyer_details,
            status: self.status.unwrap_or(defaults.status),
            invoice_type: self.invoice_type.unwrap_or(defaults.invoice_type),
            includes_vat: self.includes_vat.unwrap_or(defaults.includes_vat),
            vat: self.vat.unwrap_or(defaults.vat),
            currency: self.currency.unwrap_or_else(|| defaults.currency.clone()),
            discount: self.discount.unwrap_or(defaults.discount),
            note: self.note,
            author: self.author,
            invoice_id: self.parent_id,
            created_at: now,
            updated_at: now,
        })
    }
}

fn offset_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| Error::InvalidInvoice {
        message: format!("due date {days} days from {date} is out of range"),
    })
}

/// An invoice together with its items, for computing totals.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceWithItems {
    /// The invoice
    pub invoice: invoice::Model,
    /// Its items, in no particular order
    pub items: Vec<item::Model>,
}

impl InvoiceWithItems {
    /// Derived totals of this invoice.
    #[must_use]
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::compute(&self.invoice, &self.items)
    }
}

/// Checks the rules an invoice must satisfy before it may be saved.
///
/// Only pro formas and credit notes may be derived from another invoice, and
/// the rates must be finite numbers.
pub fn validate_invoice(invoice: &invoice::Model) -> Result<()> {
    if let Some(parent_id) = invoice.invoice_id {
        if invoice.invoice_type == InvoiceType::Invoice {
            return Err(Error::InvalidInvoice {
                message: "an invoice cannot be generated from another invoice; \
                          use a pro forma invoice or a credit note"
                    .to_string(),
            });
        }
        if parent_id == invoice.id {
            return Err(Error::InvalidInvoice {
                message: "an invoice cannot be derived from itself".to_string(),
            });
        }
    }

    for rate in [invoice.vat, invoice.discount] {
        if !rate.is_finite() {
            return Err(Error::InvalidAmount { amount: rate });
        }
    }

    Ok(())
}

fn to_active_model(invoice: &invoice::Model) -> invoice::ActiveModel {
    invoice::ActiveModel {
        id: Set(invoice.id),
        number: Set(invoice.number.clone()),
        date_of_issue: Set(invoice.date_of_issue),
        due_date: Set(invoice.due_date),
        seller: Set(invoice.seller.clone()),
        seller_details: Set(invoice.seller_details.clone()),
        buyer: Set(invoice.buyer.clone()),
        buyer_details: Set(invoice.buyer_details.clone()),
        status: Set(invoice.status),
        invoice_type: Set(invoice.invoice_type),
        includes_vat: Set(invoice.includes_vat),
        vat: Set(invoice.vat),
        currency: Set(invoice.currency.clone()),
        discount: Set(invoice.discount),
        note: Set(invoice.note.clone()),
        author: Set(invoice.author.clone()),
        invoice_id: Set(invoice.invoice_id),
        created_at: Set(invoice.created_at),
        updated_at: Set(invoice.updated_at),
    }
}

async fn persist<C>(db: &C, invoice: &invoice::Model, insert: bool) -> Result<invoice::Model>
where
    C: ConnectionTrait,
{
    let active_model = to_active_model(invoice);
    let saved = if insert {
        active_model.insert(db).await?
    } else {
        active_model.update(db).await?
    };
    Ok(saved)
}

async fn ensure_parent_exists<C>(db: &C, invoice: &invoice::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    if let Some(parent_id) = invoice.invoice_id {
        Invoice::find_by_id(parent_id)
            .one(db)
            .await?
            .ok_or(Error::InvoiceNotFound { id: parent_id })?;
    }
    Ok(())
}

/// Writes `invoice` and gives it the next free number, all on one transaction.
///
/// The invoice row is written before the highest number is read. On `SQLite` that first
/// write takes the database write lock, so no other numbering can commit in between.
async fn write_numbered(
    db: &DatabaseConnection,
    invoice: &invoice::Model,
    insert: bool,
) -> Result<invoice::Model> {
    let txn = db.begin().await?;
    let written = persist(&txn, invoice, insert).await?;
    let number = numbering::next_invoice_number(&txn, &written).await?;

    let mut numbered: invoice::ActiveModel = written.into();
    numbered.number = Set(Some(number));
    let saved = numbered.update(&txn).await?;

    txn.commit().await?;
    Ok(saved)
}

/// The single write path for invoices.
async fn write_invoice(
    db: &DatabaseConnection,
    mut invoice: invoice::Model,
    insert: bool,
) -> Result<invoice::Model> {
    validate_invoice(&invoice)?;
    ensure_parent_exists(db, &invoice).await?;
    invoice.updated_at = Utc::now();

    if !numbering::needs_number(&invoice) {
        return persist(db, &invoice, insert).await;
    }

    for attempt in 1..=NUMBERING_ATTEMPTS {
        match write_numbered(db, &invoice, insert).await {
            Ok(saved) => {
                info!(
                    "Assigned number {} to invoice {}",
                    saved.number.as_deref().unwrap_or_default(),
                    saved.id
                );
                return Ok(saved);
            }
            Err(Error::Database(err)) if numbering::is_retryable(&err) => {
                warn!("Numbering invoice {} failed (attempt {attempt}): {err}", invoice.id);
            }
            Err(err) => return Err(err),
        }
    }

    Err(Error::NumberingConflict {
        invoice_type: invoice.invoice_type,
        year: invoice.date_of_issue.year(),
    })
}

/// Creates a new invoice, numbering it if it starts out final.
#[instrument(skip(db, new_invoice, defaults), fields(buyer = %new_invoice.buyer))]
pub async fn create_invoice(
    db: &DatabaseConnection,
    new_invoice: NewInvoice,
    defaults: &InvoiceDefaults,
) -> Result<invoice::Model> {
    let invoice = new_invoice.into_model(defaults, Utc::now().date_naive())?;
    let created = write_invoice(db, invoice, true).await?;
    debug!("Created invoice {}", created.id);
    Ok(created)
}

/// Saves changes to an existing invoice.
///
/// Runs the same validation and numbering as creation, so setting the status
/// to final here numbers the invoice.
#[instrument(skip(db, invoice), fields(id = %invoice.id))]
pub async fn save_invoice(db: &DatabaseConnection, invoice: invoice::Model) -> Result<invoice::Model> {
    Invoice::find_by_id(invoice.id)
        .one(db)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice.id })?;

    write_invoice(db, invoice, false).await
}

/// Marks an invoice as final, assigning its number if it has none.
///
/// Finalizing an invoice that is already final is a no-op.
#[instrument(skip(db))]
pub async fn finalize_invoice(db: &DatabaseConnection, invoice_id: Uuid) -> Result<invoice::Model> {
    let mut invoice = Invoice::find_by_id(invoice_id)
        .one(db)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;

    if invoice.status == InvoiceStatus::Final && invoice.number.is_some() {
        return Ok(invoice);
    }

    invoice.status = InvoiceStatus::Final;
    write_invoice(db, invoice, false).await
}

/// Retrieves an invoice by its id.
pub async fn get_invoice_by_id(
    db: &DatabaseConnection,
    invoice_id: Uuid,
) -> Result<Option<invoice::Model>> {
    Invoice::find_by_id(invoice_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all invoices, newest date of issue first, then by number descending.
pub async fn get_all_invoices(db: &DatabaseConnection) -> Result<Vec<invoice::Model>> {
    Invoice::find()
        .order_by_desc(invoice::Column::DateOfIssue)
        .order_by_desc(invoice::Column::Number)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the pro formas and credit notes derived from `parent_id`.
pub async fn get_derived_invoices(
    db: &DatabaseConnection,
    parent_id: Uuid,
) -> Result<Vec<invoice::Model>> {
    Invoice::find()
        .filter(invoice::Column::InvoiceId.eq(parent_id))
        .order_by_desc(invoice::Column::DateOfIssue)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one invoice with its items.
pub async fn get_invoice_with_items(
    db: &DatabaseConnection,
    invoice_id: Uuid,
) -> Result<Option<InvoiceWithItems>> {
    let Some(invoice) = get_invoice_by_id(db, invoice_id).await? else {
        return Ok(None);
    };
    let items = invoice.find_related(Item).all(db).await?;
    Ok(Some(InvoiceWithItems { invoice, items }))
}

/// Retrieves all invoices with their items in two queries.
///
/// Ordering matches [`get_all_invoices`].
pub async fn get_invoices_with_items(db: &DatabaseConnection) -> Result<Vec<InvoiceWithItems>> {
    let invoices = get_all_invoices(db).await?;
    let items = invoices.load_many(Item, db).await?;

    Ok(invoices
        .into_iter()
        .zip(items)
        .map(|(invoice, items)| InvoiceWithItems { invoice, items })
        .collect())
}

/// Deletes an invoice along with its items and documents.
///
/// Invoices derived from it keep existing with their parent link cleared.
#[instrument(skip(db))]
pub async fn delete_invoice(db: &DatabaseConnection, invoice_id: Uuid) -> Result<()> {
    let invoice = Invoice::find_by_id(invoice_id)
        .one(db)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;

    invoice.delete(db).await?;
    info!("Deleted invoice {invoice_id}");
    Ok(())
}
