//! Transaction entity - A ledger entry booked against an account.
//!
//! Amounts are signed. Expenses are always stored as non-positive values; the
//! write path in [`crate::core::transaction`] enforces that before saving.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger classification of a transaction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(12))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Something owned
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Something owed
    #[sea_orm(string_value = "liability")]
    Liability,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Asset => "asset",
            Self::Liability => "liability",
        })
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Random UUID v4 identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Booking date
    pub date: Date,
    /// Optional short label
    #[sea_orm(nullable)]
    pub title: Option<String>,
    /// Optional free-form description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Account the transaction is booked against
    pub account_id: Uuid,
    /// Income, expense, asset or liability
    #[sea_orm(column_name = "type")]
    pub transaction_type: TransactionType,
    /// Signed amount
    pub amount: f64,
    /// ISO currency code
    pub currency: String,
    /// Arbitrary key/value payload about the transaction
    #[sea_orm(nullable)]
    pub metadata: Option<Json>,
    /// Weak link to a related transaction; cleared when that one is deleted
    #[sea_orm(nullable)]
    pub link_id: Option<Uuid>,
    /// When the transaction was created
    pub created_at: DateTimeUtc,
    /// When the transaction was last saved
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    /// One transaction owns many documents
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
    /// Related transaction
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::LinkId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Link,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
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
            "{}: {} {} ({})",
            self.date, self.amount, self.currency, self.transaction_type
        )
    }
}
