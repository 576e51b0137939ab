//! Item entity - A single line on an invoice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Random UUID v4 identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Invoice that owns this line
    pub invoice_id: Uuid,
    /// What was sold
    #[sea_orm(column_type = "Text")]
    pub title: String,
    /// Unit price
    pub price: f64,
    /// Number of units
    pub quantity: u32,
}

/// Defines relationships between Item and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one invoice and is deleted with it
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id",
        on_delete = "Cascade"
    )]
    Invoice,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Line total, `price × quantity`.
    #[must_use]
    pub fn total_amount(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}
