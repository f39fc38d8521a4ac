use async_trait::async_trait;
use thiserror::Error;

use banquet_core::domain::documents::{
    Contract, DocumentTemplate, Invoice, Questionnaire, TemplateId,
};
use banquet_core::domain::event::{Event, EventId, Venue, VenueId};
use banquet_core::domain::party::{Client, ClientId, Planner, PlannerId};
use banquet_core::domain::quote::{Quote, QuoteId};
use banquet_core::domain::schedule::{PaymentSchedule, ScheduleId};

pub(crate) mod codec;
pub mod documents;
pub mod entities;
pub mod memory;
pub mod quote;
pub mod templates;

pub use documents::{SqlContractRepository, SqlInvoiceRepository, SqlQuestionnaireRepository};
pub use entities::{
    SqlClientRepository, SqlEventRepository, SqlPlannerRepository, SqlVenueRepository,
};
pub use memory::{
    InMemoryClientRepository, InMemoryContractRepository, InMemoryEventRepository,
    InMemoryInvoiceRepository, InMemoryPlannerRepository, InMemoryQuestionnaireRepository,
    InMemoryQuoteRepository, InMemoryScheduleRepository, InMemoryTemplateRepository,
    InMemoryVenueRepository,
};
pub use quote::SqlQuoteRepository;
pub use templates::{SqlScheduleRepository, SqlTemplateRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError>;
    async fn save(&self, quote: Quote) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn find_by_id(&self, id: &ClientId) -> Result<Option<Client>, RepositoryError>;
    async fn save(&self, client: Client) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, RepositoryError>;
    async fn save(&self, event: Event) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn find_by_id(&self, id: &VenueId) -> Result<Option<Venue>, RepositoryError>;
    async fn save(&self, venue: Venue) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait PlannerRepository: Send + Sync {
    async fn find_by_id(&self, id: &PlannerId) -> Result<Option<Planner>, RepositoryError>;
    async fn save(&self, planner: Planner) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn find_by_id(&self, id: &TemplateId)
        -> Result<Option<DocumentTemplate>, RepositoryError>;
    async fn save(&self, template: DocumentTemplate) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn find_by_id(&self, id: &ScheduleId)
        -> Result<Option<PaymentSchedule>, RepositoryError>;
    async fn save(&self, schedule: PaymentSchedule) -> Result<(), RepositoryError>;
}

/// Invoices are append-only per quote: there is deliberately no replace
/// operation, since existing invoices may already be paid.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn insert(&self, invoice: Invoice) -> Result<(), RepositoryError>;
    async fn list_for_quote(&self, quote_id: &QuoteId) -> Result<Vec<Invoice>, RepositoryError>;
    async fn exists_for_quote(&self, quote_id: &QuoteId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait ContractRepository: Send + Sync {
    async fn insert(&self, contract: Contract) -> Result<(), RepositoryError>;
    /// Removes any contract rows for the quote and inserts the replacement.
    async fn replace_for_quote(&self, contract: Contract) -> Result<(), RepositoryError>;
    async fn find_by_quote(&self, quote_id: &QuoteId)
        -> Result<Option<Contract>, RepositoryError>;
    async fn exists_for_quote(&self, quote_id: &QuoteId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait QuestionnaireRepository: Send + Sync {
    async fn insert(&self, questionnaire: Questionnaire) -> Result<(), RepositoryError>;
    async fn replace_for_quote(&self, questionnaire: Questionnaire)
        -> Result<(), RepositoryError>;
    async fn find_by_quote(&self, quote_id: &QuoteId)
        -> Result<Option<Questionnaire>, RepositoryError>;
    async fn exists_for_quote(&self, quote_id: &QuoteId) -> Result<bool, RepositoryError>;
}
