//! In-memory repositories used as test doubles by the booking pipeline and
//! the colocated unit tests.

use std::collections::HashMap;

use tokio::sync::RwLock;

use banquet_core::domain::documents::{
    Contract, DocumentTemplate, Invoice, Questionnaire, TemplateId,
};
use banquet_core::domain::event::{Event, EventId, Venue, VenueId};
use banquet_core::domain::party::{Client, ClientId, Planner, PlannerId};
use banquet_core::domain::quote::{Quote, QuoteId};
use banquet_core::domain::schedule::{PaymentSchedule, ScheduleId};

use super::{
    ClientRepository, ContractRepository, EventRepository, InvoiceRepository, PlannerRepository,
    QuestionnaireRepository, QuoteRepository, RepositoryError, ScheduleRepository,
    TemplateRepository, VenueRepository,
};

#[derive(Default)]
pub struct InMemoryQuoteRepository {
    quotes: RwLock<HashMap<String, Quote>>,
}

#[async_trait::async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.get(&id.0).cloned())
    }

    async fn save(&self, quote: Quote) -> Result<(), RepositoryError> {
        let mut quotes = self.quotes.write().await;
        quotes.insert(quote.id.0.clone(), quote);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryClientRepository {
    clients: RwLock<HashMap<String, Client>>,
}

#[async_trait::async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn find_by_id(&self, id: &ClientId) -> Result<Option<Client>, RepositoryError> {
        let clients = self.clients.read().await;
        Ok(clients.get(&id.0).cloned())
    }

    async fn save(&self, client: Client) -> Result<(), RepositoryError> {
        let mut clients = self.clients.write().await;
        clients.insert(client.id.0.clone(), client);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryEventRepository {
    events: RwLock<HashMap<String, Event>>,
}

#[async_trait::async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        let events = self.events.read().await;
        Ok(events.get(&id.0).cloned())
    }

    async fn save(&self, event: Event) -> Result<(), RepositoryError> {
        let mut events = self.events.write().await;
        events.insert(event.id.0.clone(), event);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryVenueRepository {
    venues: RwLock<HashMap<String, Venue>>,
}

#[async_trait::async_trait]
impl VenueRepository for InMemoryVenueRepository {
    async fn find_by_id(&self, id: &VenueId) -> Result<Option<Venue>, RepositoryError> {
        let venues = self.venues.read().await;
        Ok(venues.get(&id.0).cloned())
    }

    async fn save(&self, venue: Venue) -> Result<(), RepositoryError> {
        let mut venues = self.venues.write().await;
        venues.insert(venue.id.0.clone(), venue);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPlannerRepository {
    planners: RwLock<HashMap<String, Planner>>,
}

#[async_trait::async_trait]
impl PlannerRepository for InMemoryPlannerRepository {
    async fn find_by_id(&self, id: &PlannerId) -> Result<Option<Planner>, RepositoryError> {
        let planners = self.planners.read().await;
        Ok(planners.get(&id.0).cloned())
    }

    async fn save(&self, planner: Planner) -> Result<(), RepositoryError> {
        let mut planners = self.planners.write().await;
        planners.insert(planner.id.0.clone(), planner);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryTemplateRepository {
    templates: RwLock<HashMap<String, DocumentTemplate>>,
}

#[async_trait::async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn find_by_id(
        &self,
        id: &TemplateId,
    ) -> Result<Option<DocumentTemplate>, RepositoryError> {
        let templates = self.templates.read().await;
        Ok(templates.get(&id.0).cloned())
    }

    async fn save(&self, template: DocumentTemplate) -> Result<(), RepositoryError> {
        let mut templates = self.templates.write().await;
        templates.insert(template.id.0.clone(), template);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryScheduleRepository {
    schedules: RwLock<HashMap<String, PaymentSchedule>>,
}

#[async_trait::async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn find_by_id(
        &self,
        id: &ScheduleId,
    ) -> Result<Option<PaymentSchedule>, RepositoryError> {
        let schedules = self.schedules.read().await;
        Ok(schedules.get(&id.0).cloned())
    }

    async fn save(&self, schedule: PaymentSchedule) -> Result<(), RepositoryError> {
        let mut schedules = self.schedules.write().await;
        schedules.insert(schedule.id.0.clone(), schedule);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryInvoiceRepository {
    invoices: RwLock<Vec<Invoice>>,
}

#[async_trait::async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn insert(&self, invoice: Invoice) -> Result<(), RepositoryError> {
        let mut invoices = self.invoices.write().await;
        invoices.push(invoice);
        Ok(())
    }

    async fn list_for_quote(&self, quote_id: &QuoteId) -> Result<Vec<Invoice>, RepositoryError> {
        let invoices = self.invoices.read().await;
        Ok(invoices.iter().filter(|invoice| &invoice.quote_id == quote_id).cloned().collect())
    }

    async fn exists_for_quote(&self, quote_id: &QuoteId) -> Result<bool, RepositoryError> {
        let invoices = self.invoices.read().await;
        Ok(invoices.iter().any(|invoice| &invoice.quote_id == quote_id))
    }
}

#[derive(Default)]
pub struct InMemoryContractRepository {
    contracts: RwLock<Vec<Contract>>,
}

#[async_trait::async_trait]
impl ContractRepository for InMemoryContractRepository {
    async fn insert(&self, contract: Contract) -> Result<(), RepositoryError> {
        let mut contracts = self.contracts.write().await;
        contracts.push(contract);
        Ok(())
    }

    async fn replace_for_quote(&self, contract: Contract) -> Result<(), RepositoryError> {
        let mut contracts = self.contracts.write().await;
        contracts.retain(|existing| existing.quote_id != contract.quote_id);
        contracts.push(contract);
        Ok(())
    }

    async fn find_by_quote(
        &self,
        quote_id: &QuoteId,
    ) -> Result<Option<Contract>, RepositoryError> {
        let contracts = self.contracts.read().await;
        Ok(contracts.iter().find(|contract| &contract.quote_id == quote_id).cloned())
    }

    async fn exists_for_quote(&self, quote_id: &QuoteId) -> Result<bool, RepositoryError> {
        let contracts = self.contracts.read().await;
        Ok(contracts.iter().any(|contract| &contract.quote_id == quote_id))
    }
}

#[derive(Default)]
pub struct InMemoryQuestionnaireRepository {
    questionnaires: RwLock<Vec<Questionnaire>>,
}

#[async_trait::async_trait]
impl QuestionnaireRepository for InMemoryQuestionnaireRepository {
    async fn insert(&self, questionnaire: Questionnaire) -> Result<(), RepositoryError> {
        let mut questionnaires = self.questionnaires.write().await;
        questionnaires.push(questionnaire);
        Ok(())
    }

    async fn replace_for_quote(
        &self,
        questionnaire: Questionnaire,
    ) -> Result<(), RepositoryError> {
        let mut questionnaires = self.questionnaires.write().await;
        questionnaires.retain(|existing| existing.quote_id != questionnaire.quote_id);
        questionnaires.push(questionnaire);
        Ok(())
    }

    async fn find_by_quote(
        &self,
        quote_id: &QuoteId,
    ) -> Result<Option<Questionnaire>, RepositoryError> {
        let questionnaires = self.questionnaires.read().await;
        Ok(questionnaires.iter().find(|q| &q.quote_id == quote_id).cloned())
    }

    async fn exists_for_quote(&self, quote_id: &QuoteId) -> Result<bool, RepositoryError> {
        let questionnaires = self.questionnaires.read().await;
        Ok(questionnaires.iter().any(|q| &q.quote_id == quote_id))
    }
}
