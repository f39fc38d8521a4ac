pub mod config;
pub mod contract;
pub mod domain;
pub mod errors;
pub mod finance;

pub use contract::{
    hydrate, parse_blocks, ContentBlock, ContextTokenReplacer, HydrationContext, TextRun,
    TokenReplacer,
};
pub use domain::documents::{
    Contract, ContractId, DocumentStatus, DocumentTemplate, Invoice, InvoiceId, InvoiceItem,
    InvoiceStatus, Questionnaire, QuestionnaireId, TemplateId,
};
pub use domain::event::{Event, EventId, Venue, VenueId};
pub use domain::party::{Client, ClientId, Planner, PlannerId};
pub use domain::quote::{LineItem, Quote, QuoteId, QuoteStatus, TaxLine};
pub use domain::schedule::{DueRule, PaymentMilestone, PaymentSchedule, ScheduleId};
pub use errors::{ApplicationError, DomainError};
pub use finance::calculator::{
    compute_summary, effective_items, DiscountKind, DiscountSpec, FinancialSummary, TaxRule,
};
pub use finance::currency::BASE_CURRENCY;
pub use finance::schedule::{resolve_schedule, InvoiceDraft};
