use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::event::EventId;
use crate::domain::party::ClientId;
use crate::domain::quote::QuoteId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionnaireId(pub String);

/// HTML content with `{{token}}` placeholders, authored in the back office.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub id: TemplateId,
    pub name: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Sent,
    Signed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub amount: Decimal,
}

/// Generated payment artifact, one row per resolved milestone. Invoices are
/// never auto-regenerated once any exist for a quote; some may already be
/// paid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub quote_id: QuoteId,
    pub client_id: ClientId,
    pub event_id: EventId,
    pub invoice_number: String,
    pub items: Vec<InvoiceItem>,
    pub total_amount: Decimal,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub quote_id: QuoteId,
    pub client_id: ClientId,
    pub event_id: EventId,
    pub template_id: TemplateId,
    /// Fully hydrated HTML.
    pub content: String,
    pub status: DocumentStatus,
    pub document_version: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    pub id: QuestionnaireId,
    pub quote_id: QuoteId,
    pub client_id: ClientId,
    pub event_id: EventId,
    pub template_id: TemplateId,
    pub title: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
}
