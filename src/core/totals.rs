//! Invoice total computation.
//!
//! Totals are derived from an invoice and its items every time they are read and
//! never stored. The chain is: items total, VAT on it (only for VAT payers), total
//! with VAT, discount on that, and the final amount rounded to cents.

use crate::entities::{invoice, item};
use serde::Serialize;

/// Derived amounts for one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvoiceTotals {
    /// Sum of `price × quantity` over all items
    pub items_total: f64,
    /// VAT on `items_total`; zero when the invoice does not include VAT
    pub items_vat: f64,
    /// `items_total + items_vat`
    pub items_total_with_vat: f64,
    /// Discount taken from `items_total_with_vat`
    pub items_discount: f64,
    /// Amount due, rounded to two decimal places
    pub total_amount: f64,
}

impl InvoiceTotals {
    /// Computes the totals of `invoice` over `items`.
    ///
    /// Item order does not matter. The stored VAT rate is left untouched when
    /// `includes_vat` is false; it is simply not applied.
    #[must_use]
    pub fn compute(invoice: &invoice::Model, items: &[item::Model]) -> Self {
        let items_total: f64 = items.iter().map(item::Model::total_amount).sum();
        let items_vat = if invoice.includes_vat {
            items_total * invoice.vat / 100.0
        } else {
            0.0
        };
        let items_total_with_vat = items_total + items_vat;
        let items_discount = items_total_with_vat * invoice.discount / 100.0;

        Self {
            items_total,
            items_vat,
            items_total_with_vat,
            items_discount,
            total_amount: round_cents(items_total_with_vat - items_discount),
        }
    }
}

/// Rounds half away from zero to two decimal places.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
