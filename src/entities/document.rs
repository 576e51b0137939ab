//! Document entity - Proof of work (receipt, scan, contract) attached to a
//! transaction and optionally to an invoice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Random UUID v4 identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Display title; defaulted from the file name or invoice when blank
    #[sea_orm(nullable)]
    pub title: Option<String>,
    /// Optional free-form description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Arbitrary key/value payload about the document
    #[sea_orm(nullable)]
    pub metadata: Option<Json>,
    /// Storage path of the uploaded file, relative to the media root
    #[sea_orm(nullable)]
    pub data: Option<String>,
    /// Invoice this document evidences, if any
    #[sea_orm(nullable)]
    pub invoice_id: Option<Uuid>,
    /// Transaction that owns this document
    pub transaction_id: Uuid,
}

/// Defines relationships between Document and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Optional invoice; the document is deleted with it
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id",
        on_delete = "Cascade"
    )]
    Invoice,
    /// Owning transaction; the document is deleted with it
    #[sea_orm(
        belongs_to = "super::transaction::Entity",
        from = "Column::TransactionId",
        to = "super::transaction::Column::Id",
        on_delete = "Cascade"
    )]
    Transaction,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
