//! Column conversions shared by the SQLite repositories.
//!
//! Money is stored as decimal TEXT to avoid float drift, collections as JSON
//! TEXT, timestamps as RFC 3339 and dates as `%Y-%m-%d`. Statuses are stored
//! as snake_case strings so rows stay greppable in the sqlite3 shell.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use banquet_core::domain::documents::{DocumentStatus, InvoiceStatus};
use banquet_core::domain::quote::QuoteStatus;

use super::RepositoryError;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn parse_decimal(raw: &str, column: &str) -> Result<Decimal, RepositoryError> {
    raw.parse::<Decimal>()
        .map_err(|err| RepositoryError::Decode(format!("{column}: invalid decimal {raw:?}: {err}")))
}

pub(crate) fn parse_datetime(raw: &str, column: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)).map_err(|err| {
        RepositoryError::Decode(format!("{column}: invalid timestamp {raw:?}: {err}"))
    })
}

pub(crate) fn parse_date(raw: &str, column: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| RepositoryError::Decode(format!("{column}: invalid date {raw:?}: {err}")))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_json<T: DeserializeOwned>(raw: &str, column: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(raw)
        .map_err(|err| RepositoryError::Decode(format!("{column}: invalid JSON: {err}")))
}

pub(crate) fn to_json<T: Serialize>(value: &T, column: &str) -> Result<String, RepositoryError> {
    serde_json::to_string(value)
        .map_err(|err| RepositoryError::Decode(format!("{column}: encode failed: {err}")))
}

pub(crate) fn quote_status_as_str(status: &QuoteStatus) -> &'static str {
    match status {
        QuoteStatus::Draft => "draft",
        QuoteStatus::Sent => "sent",
        QuoteStatus::Accepted => "accepted",
        QuoteStatus::Rejected => "rejected",
    }
}

pub(crate) fn quote_status_from_str(raw: &str) -> Result<QuoteStatus, RepositoryError> {
    match raw {
        "draft" => Ok(QuoteStatus::Draft),
        "sent" => Ok(QuoteStatus::Sent),
        "accepted" => Ok(QuoteStatus::Accepted),
        "rejected" => Ok(QuoteStatus::Rejected),
        other => Err(RepositoryError::Decode(format!("unknown quote status {other:?}"))),
    }
}

pub(crate) fn invoice_status_as_str(status: &InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Pending => "pending",
        InvoiceStatus::Paid => "paid",
        InvoiceStatus::Cancelled => "cancelled",
    }
}

pub(crate) fn invoice_status_from_str(raw: &str) -> Result<InvoiceStatus, RepositoryError> {
    match raw {
        "pending" => Ok(InvoiceStatus::Pending),
        "paid" => Ok(InvoiceStatus::Paid),
        "cancelled" => Ok(InvoiceStatus::Cancelled),
        other => Err(RepositoryError::Decode(format!("unknown invoice status {other:?}"))),
    }
}

pub(crate) fn document_status_as_str(status: &DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Draft => "draft",
        DocumentStatus::Sent => "sent",
        DocumentStatus::Signed => "signed",
    }
}

pub(crate) fn document_status_from_str(raw: &str) -> Result<DocumentStatus, RepositoryError> {
    match raw {
        "draft" => Ok(DocumentStatus::Draft),
        "sent" => Ok(DocumentStatus::Sent),
        "signed" => Ok(DocumentStatus::Signed),
        other => Err(RepositoryError::Decode(format!("unknown document status {other:?}"))),
    }
}
