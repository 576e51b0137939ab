//! Invoice entity - A draft or final billing document.
//!
//! Invoices aggregate line items, carry VAT and discount rates and may point at
//! a parent invoice (a pro forma that was invoiced, or the invoice a credit note
//! corrects). Totals are never stored; see [`crate::core::totals`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an invoice
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(5))")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Editable, not numbered
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Issued; carries a sequence number
    #[sea_orm(string_value = "final")]
    Final,
}

/// Kind of billing document
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum InvoiceType {
    /// Regular invoice
    #[sea_orm(string_value = "invoice")]
    #[serde(rename = "invoice")]
    Invoice,
    /// Pro forma invoice
    #[sea_orm(string_value = "proforma invoice")]
    #[serde(rename = "proforma", alias = "proforma invoice")]
    Proforma,
    /// Credit note
    #[sea_orm(string_value = "credit note")]
    #[serde(rename = "credit", alias = "credit note")]
    Credit,
}

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Random UUID v4 identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Sequence number such as `001/2024`, assigned on finalization
    #[sea_orm(nullable)]
    pub number: Option<String>,
    /// Date the invoice was issued; its year scopes the numbering sequence
    pub date_of_issue: Date,
    /// Payment due date
    pub due_date: Date,
    /// Issuer name
    pub seller: String,
    /// Issuer address, registration numbers and so on
    #[sea_orm(column_type = "Text")]
    pub seller_details: String,
    /// Customer name
    pub buyer: String,
    /// Customer address, registration numbers and so on
    #[sea_orm(column_type = "Text")]
    pub buyer_details: String,
    /// Draft or final
    pub status: InvoiceStatus,
    /// Invoice, pro forma or credit note
    #[sea_orm(column_name = "type")]
    pub invoice_type: InvoiceType,
    /// Whether the seller is a VAT payer; when false `vat` is ignored
    pub includes_vat: bool,
    /// VAT rate in percent
    pub vat: f64,
    /// ISO currency code
    pub currency: String,
    /// Discount in percent, applied after VAT
    pub discount: f64,
    /// Free-form note printed on the invoice
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    /// Identity of the user who authored the invoice
    pub author: String,
    /// Parent invoice this one was derived from
    #[sea_orm(nullable)]
    pub invoice_id: Option<Uuid>,
    /// When the invoice was created
    pub created_at: DateTimeUtc,
    /// When the invoice was last saved
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One invoice owns many items
    #[sea_orm(has_many = "super::item::Entity")]
    Items,
    /// One invoice may be referenced by many documents
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
    /// Weak link to the parent invoice; cleared when the parent is deleted
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::InvoiceId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Parent,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.number.as_deref().unwrap_or("draft"),
            self.buyer,
            self.date_of_issue
        )
    }
}
