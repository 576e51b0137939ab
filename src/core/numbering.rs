//! Sequential invoice numbering.
//!
//! A final invoice gets the next number in the sequence of its document type and
//! year of issue: `001/2024` for invoices, `P001/2024` for pro formas and
//! `C001/2024` for credit notes. The next sequence value is one past the highest
//! number already taken in that (year, type), so numbers freed by deleted or
//! reverted invoices are never handed out twice.
//!
//! Reading the highest number and writing the new one happen inside one database
//! transaction, and the `(type, number)` unique index rejects a number that a
//! concurrent writer claimed in the meantime. Callers retry on [`is_retryable`].

use crate::{
    entities::{Invoice, InvoiceStatus, InvoiceType, invoice},
    errors::Result,
};
use chrono::Datelike;
use sea_orm::{ConnectionTrait, QuerySelect, RuntimeErr, SqlErr, prelude::*};

/// Primary `SQLite` result codes for a database held by another connection.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Formats sequence value `seq` of `year` for the given document type.
#[must_use]
pub fn format_invoice_number(invoice_type: InvoiceType, seq: u64, year: i32) -> String {
    match invoice_type {
        InvoiceType::Proforma => format!("P{seq:03}/{year}"),
        InvoiceType::Credit => format!("C{seq:03}/{year}"),
        InvoiceType::Invoice => format!("{seq:03}/{year}"),
    }
}

/// Reads the sequence value back out of a number of `invoice_type` in `year`.
///
/// Returns `None` for numbers of another type or year, or that are not numeric.
#[must_use]
pub fn parse_sequence(invoice_type: InvoiceType, number: &str, year: i32) -> Option<u64> {
    let seq = number.strip_suffix(&format!("/{year}"))?;
    let seq = match invoice_type {
        InvoiceType::Proforma => seq.strip_prefix('P')?,
        InvoiceType::Credit => seq.strip_prefix('C')?,
        InvoiceType::Invoice => seq,
    };
    if seq.is_empty() || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    seq.parse().ok()
}

/// Whether saving `invoice` must assign a number first.
#[must_use]
pub fn needs_number(invoice: &invoice::Model) -> bool {
    invoice.status == InvoiceStatus::Final && invoice.number.is_none()
}

/// Highest sequence value already taken by any numbered invoice of
/// `invoice_type` in `year`, or 0 when there is none.
///
/// Drafts that kept their number still count.
pub async fn last_sequence<C>(db: &C, invoice_type: InvoiceType, year: i32) -> Result<u64>
where
    C: ConnectionTrait,
{
    let numbers: Vec<Option<String>> = Invoice::find()
        .select_only()
        .column(invoice::Column::Number)
        .filter(invoice::Column::InvoiceType.eq(invoice_type))
        .filter(invoice::Column::Number.ends_with(format!("/{year}")))
        .into_tuple()
        .all(db)
        .await?;

    Ok(numbers
        .iter()
        .flatten()
        .filter_map(|number| parse_sequence(invoice_type, number, year))
        .max()
        .unwrap_or(0))
}

/// Computes the number `invoice` would receive if finalized now.
///
/// Run this on the same database transaction that writes the invoice.
pub async fn next_invoice_number<C>(db: &C, invoice: &invoice::Model) -> Result<String>
where
    C: ConnectionTrait,
{
    let year = invoice.date_of_issue.year();
    let last = last_sequence(db, invoice.invoice_type, year).await?;
    Ok(format_invoice_number(invoice.invoice_type, last + 1, year))
}

/// Whether `err` is a unique-constraint violation, i.e. the number was taken.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Whether `err` means another connection held the database (`SQLITE_BUSY`
/// or `SQLITE_LOCKED`, including their extended codes).
#[must_use]
pub fn is_busy(err: &DbErr) -> bool {
    let (DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))
    | DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
    | DbErr::Conn(RuntimeErr::SqlxError(sqlx_err))) = err
    else {
        return false;
    };

    sqlx_err
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

/// Whether a failed numbering attempt may succeed when run again.
#[must_use]
pub fn is_retryable(err: &DbErr) -> bool {
    is_unique_violation(err) || is_busy(err)
}
