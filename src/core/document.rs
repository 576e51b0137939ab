//! Document business logic - Receipts and other proofs attached to transactions.
//!
//! A document always belongs to a transaction and may also point at the invoice it
//! evidences. Uploads are validated before anything is written and stored through
//! [`crate::core::storage`]; the database row only keeps the storage path.

use crate::{
    config::settings::StorageSettings,
    core::storage::{self, FileUpload},
    entities::{Document, Invoice, Transaction, document, invoice, transaction},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Input for a new document.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    /// Owning transaction
    pub transaction_id: Uuid,
    /// Invoice this document evidences
    pub invoice_id: Option<Uuid>,
    /// Explicit title; defaulted when blank
    pub title: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Arbitrary key/value payload
    pub metadata: Option<Json>,
    /// File to store alongside the row
    pub upload: Option<FileUpload>,
}

impl NewDocument {
    /// A document on `transaction_id` with nothing else set.
    #[must_use]
    pub const fn new(transaction_id: Uuid) -> Self {
        Self {
            transaction_id,
            invoice_id: None,
            title: None,
            description: None,
            metadata: None,
            upload: None,
        }
    }
}

/// Resolves the title to store.
///
/// A non-blank explicit title wins, then the uploaded file name, then the
/// display string of the linked invoice. `None` when none of them is available.
#[must_use]
pub fn default_title(
    title: Option<&str>,
    file_name: Option<&str>,
    invoice: Option<&invoice::Model>,
) -> Option<String> {
    let non_blank = |s: &&str| !s.trim().is_empty();

    title
        .filter(non_blank)
        .or(file_name.filter(non_blank))
        .map(str::to_string)
        .or_else(|| invoice.map(ToString::to_string))
}

/// Display string of a document, `"{label} attached to {transaction}"`.
///
/// The label is the title, else `Invoice` for invoice-linked documents, else
/// `Document` when a file is stored. Without any of them only the transaction
/// is shown.
#[must_use]
pub fn display_name(document: &document::Model, transaction: &transaction::Model) -> String {
    let label = document
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| document.invoice_id.map(|_| "Invoice"))
        .or_else(|| document.data.as_ref().map(|_| "Document"));

    match label {
        Some(label) => format!("{label} attached to {transaction}"),
        None => transaction.to_string(),
    }
}

/// Creates a document, storing its upload under the media root.
///
/// The upload is validated first; nothing is written when it is rejected or when the
/// transaction or invoice does not exist. A stored file is removed again if the row
/// cannot be inserted.
#[instrument(skip(db, new_document, storage_settings), fields(transaction_id = %new_document.transaction_id))]
pub async fn create_document(
    db: &DatabaseConnection,
    new_document: NewDocument,
    storage_settings: &StorageSettings,
) -> Result<document::Model> {
    if let Some(upload) = &new_document.upload {
        storage::validate_upload(upload, storage_settings.max_upload_bytes())?;
    }

    Transaction::find_by_id(new_document.transaction_id)
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound {
            id: new_document.transaction_id,
        })?;

    let invoice = match new_document.invoice_id {
        Some(invoice_id) => Some(
            Invoice::find_by_id(invoice_id)
                .one(db)
                .await?
                .ok_or(Error::InvoiceNotFound { id: invoice_id })?,
        ),
        None => None,
    };

    let title = default_title(
        new_document.title.as_deref(),
        new_document.upload.as_ref().map(|u| u.name.as_str()),
        invoice.as_ref(),
    );

    let data = match &new_document.upload {
        Some(upload) => Some(storage::store_upload(&storage_settings.media_root, upload).await?),
        None => None,
    };

    let document_model = document::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(new_document.description),
        metadata: Set(new_document.metadata),
        data: Set(data.clone()),
        invoice_id: Set(new_document.invoice_id),
        transaction_id: Set(new_document.transaction_id),
    };

    match document_model.insert(db).await {
        Ok(created) => {
            debug!("Created document {}", created.id);
            Ok(created)
        }
        Err(e) => {
            if let Some(stored) = data {
                if let Err(cleanup) = storage::remove_upload(&storage_settings.media_root, &stored).await {
                    warn!("Failed to remove orphaned upload {stored}: {cleanup}");
                }
            }
            Err(e.into())
        }
    }
}

/// Retrieves a specific document by its unique ID.
pub async fn get_document_by_id(
    db: &DatabaseConnection,
    document_id: Uuid,
) -> Result<Option<document::Model>> {
    Document::find_by_id(document_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the documents attached to a transaction.
pub async fn get_documents_for_transaction(
    db: &DatabaseConnection,
    transaction_id: Uuid,
) -> Result<Vec<document::Model>> {
    Document::find()
        .filter(document::Column::TransactionId.eq(transaction_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the documents evidencing an invoice.
pub async fn get_documents_for_invoice(
    db: &DatabaseConnection,
    invoice_id: Uuid,
) -> Result<Vec<document::Model>> {
    Document::find()
        .filter(document::Column::InvoiceId.eq(invoice_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a document row. The stored file is left in place.
#[instrument(skip(db))]
pub async fn delete_document(db: &DatabaseConnection, document_id: Uuid) -> Result<()> {
    let document = get_document_by_id(db, document_id)
        .await?
        .ok_or(Error::DocumentNotFound { id: document_id })?;

    document.delete(db).await?;
    info!("Deleted document {document_id}");
    Ok(())
}
