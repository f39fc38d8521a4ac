//! Booking document generation.
//!
//! When a quote is accepted, one call fans out into the three booking
//! artifacts: payment invoices from the quote's schedule template, the
//! hydrated contract, and the event questionnaire. Each artifact is gated on
//! its own existence check so re-running a booking never duplicates
//! documents.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use banquet_core::contract::hydrate::PAYMENT_SCHEDULE_TOKEN;
use banquet_core::{
    hydrate, resolve_schedule, ApplicationError, Contract, ContractId, ContextTokenReplacer,
    DocumentStatus, DomainError, Event, HydrationContext, Invoice, InvoiceId, InvoiceItem,
    InvoiceStatus, Questionnaire, QuestionnaireId, Quote,
};
use banquet_db::repositories::{
    ClientRepository, ContractRepository, EventRepository, InvoiceRepository, PlannerRepository,
    QuestionnaireRepository, RepositoryError, ScheduleRepository, TemplateRepository,
    VenueRepository,
};

use crate::schedule_table::render_schedule_table;

#[derive(Clone, Copy, Debug, Default)]
pub struct GenerateOptions {
    /// Regenerate the contract even if one exists, bumping its version.
    pub force_contract: bool,
    /// Regenerate the questionnaire even if one exists.
    pub force_questionnaire: bool,
    // Invoices have no force flag: existing invoices may already be paid, so
    // they are never regenerated through this pipeline.
}

/// Per-artifact result. A skip is a normal outcome, not an error; only
/// repository failures abort the whole call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactOutcome {
    Created { count: usize },
    SkippedExists,
    SkippedMissingTemplate,
    Failed { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationReport {
    pub invoices: ArtifactOutcome,
    pub contract: ArtifactOutcome,
    pub questionnaire: ArtifactOutcome,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure during document generation: {0}")]
    Persistence(#[from] RepositoryError),
}

impl From<GenerateError> for ApplicationError {
    fn from(error: GenerateError) -> Self {
        match error {
            GenerateError::Domain(inner) => ApplicationError::Domain(inner),
            GenerateError::Persistence(inner) => ApplicationError::Persistence(inner.to_string()),
        }
    }
}

pub struct BookingDocumentGenerator {
    pub clients: Arc<dyn ClientRepository>,
    pub events: Arc<dyn EventRepository>,
    pub venues: Arc<dyn VenueRepository>,
    pub planners: Arc<dyn PlannerRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub contracts: Arc<dyn ContractRepository>,
    pub questionnaires: Arc<dyn QuestionnaireRepository>,
}

impl BookingDocumentGenerator {
    /// Generates the booking artifacts for an accepted quote, in order:
    /// invoices, contract, questionnaire. The contract consumes the invoices
    /// created in the same call, so the order is load-bearing.
    ///
    /// Artifacts already inserted stay inserted if a later step fails; there
    /// is no cross-artifact rollback. The existence gate is read-then-insert,
    /// so two concurrent calls for the same quote can double-insert.
    pub async fn generate(
        &self,
        quote: &Quote,
        options: GenerateOptions,
    ) -> Result<GenerationReport, GenerateError> {
        quote.ensure_accepted()?;

        let client = self.clients.find_by_id(&quote.client_id).await?;
        let event = self.events.find_by_id(&quote.event_id).await?;
        let venue = match event.as_ref().and_then(|event| event.venue_id.as_ref()) {
            Some(venue_id) => self.venues.find_by_id(venue_id).await?,
            None => None,
        };
        let planner = match event.as_ref().and_then(|event| event.planner_id.as_ref()) {
            Some(planner_id) => self.planners.find_by_id(planner_id).await?,
            None => None,
        };

        let invoices = self.generate_invoices(quote, event.as_ref()).await?;

        let context = HydrationContext {
            client,
            event,
            venue,
            planner,
            quote: Some(quote.clone()),
            invoices: Vec::new(),
            extra: Map::new(),
        };

        let contract = self.generate_contract(quote, &context, options.force_contract).await?;
        let questionnaire =
            self.generate_questionnaire(quote, options.force_questionnaire).await?;

        info!(
            event_name = "booking.generate.completed",
            quote_id = %quote.id.0,
            invoices = ?invoices,
            contract = ?contract,
            questionnaire = ?questionnaire,
            "booking document generation completed"
        );

        Ok(GenerationReport { invoices, contract, questionnaire })
    }

    async fn generate_invoices(
        &self,
        quote: &Quote,
        event: Option<&Event>,
    ) -> Result<ArtifactOutcome, GenerateError> {
        if self.invoices.exists_for_quote(&quote.id).await? {
            warn!(
                event_name = "booking.invoices.skipped_exists",
                quote_id = %quote.id.0,
                "invoices already exist, never regenerated"
            );
            return Ok(ArtifactOutcome::SkippedExists);
        }

        let Some(schedule_id) = &quote.payment_plan_template_id else {
            warn!(
                event_name = "booking.invoices.skipped_missing_template",
                quote_id = %quote.id.0,
                "quote references no payment schedule template"
            );
            return Ok(ArtifactOutcome::SkippedMissingTemplate);
        };

        let Some(schedule) = self.schedules.find_by_id(schedule_id).await? else {
            warn!(
                event_name = "booking.invoices.skipped_missing_template",
                quote_id = %quote.id.0,
                schedule_id = %schedule_id.0,
                "payment schedule template not found"
            );
            return Ok(ArtifactOutcome::SkippedMissingTemplate);
        };

        let Some(event) = event else {
            let reason = format!("event {} not found, cannot resolve due dates", quote.event_id.0);
            warn!(
                event_name = "booking.invoices.failed",
                quote_id = %quote.id.0,
                reason = %reason,
            );
            return Ok(ArtifactOutcome::Failed { reason });
        };

        let booked_on = Utc::now().date_naive();
        let drafts = resolve_schedule(&schedule, quote.total_amount, event.date, booked_on);
        let count = drafts.len();

        for (index, draft) in drafts.into_iter().enumerate() {
            let invoice = Invoice {
                id: InvoiceId(Uuid::new_v4().to_string()),
                quote_id: quote.id.clone(),
                client_id: quote.client_id.clone(),
                event_id: quote.event_id.clone(),
                invoice_number: format!("INV-{}-{}", quote.id.0, index + 1),
                items: vec![InvoiceItem {
                    description: draft.milestone_name.clone(),
                    amount: draft.amount,
                }],
                total_amount: draft.amount,
                due_date: draft.due_date,
                status: InvoiceStatus::Pending,
                created_at: Utc::now(),
            };
            self.invoices.insert(invoice).await?;
        }

        info!(
            event_name = "booking.invoices.created",
            quote_id = %quote.id.0,
            count = count,
            schedule = %schedule.name,
        );
        Ok(ArtifactOutcome::Created { count })
    }

    async fn generate_contract(
        &self,
        quote: &Quote,
        base_context: &HydrationContext,
        force: bool,
    ) -> Result<ArtifactOutcome, GenerateError> {
        let existing = self.contracts.find_by_quote(&quote.id).await?;
        if existing.is_some() && !force {
            warn!(
                event_name = "booking.contract.skipped_exists",
                quote_id = %quote.id.0,
                "contract already exists, pass force_contract to regenerate"
            );
            return Ok(ArtifactOutcome::SkippedExists);
        }

        let Some(template_id) = &quote.contract_template_id else {
            warn!(
                event_name = "booking.contract.skipped_missing_template",
                quote_id = %quote.id.0,
                "quote references no contract template"
            );
            return Ok(ArtifactOutcome::SkippedMissingTemplate);
        };

        let Some(template) = self.templates.find_by_id(template_id).await? else {
            warn!(
                event_name = "booking.contract.skipped_missing_template",
                quote_id = %quote.id.0,
                template_id = %template_id.0,
                "contract template not found"
            );
            return Ok(ArtifactOutcome::SkippedMissingTemplate);
        };

        // The table consumes the invoices generated earlier in this call.
        let invoices = self.invoices.list_for_quote(&quote.id).await?;
        let table = match render_schedule_table(&invoices) {
            Ok(table) => table,
            Err(error) => {
                let reason = format!("payment schedule table render failed: {error}");
                warn!(
                    event_name = "booking.contract.failed",
                    quote_id = %quote.id.0,
                    reason = %reason,
                );
                return Ok(ArtifactOutcome::Failed { reason });
            }
        };

        let mut context = base_context.clone();
        context.invoices = invoices;
        context.extra.insert(
            PAYMENT_SCHEDULE_TOKEN.trim_matches(['{', '}']).to_string(),
            Value::String(table),
        );

        let content = hydrate(&template.content, &context, &ContextTokenReplacer);
        let document_version =
            existing.as_ref().map(|contract| contract.document_version + 1).unwrap_or(1);

        let contract = Contract {
            id: ContractId(Uuid::new_v4().to_string()),
            quote_id: quote.id.clone(),
            client_id: quote.client_id.clone(),
            event_id: quote.event_id.clone(),
            template_id: template.id.clone(),
            content,
            status: DocumentStatus::Draft,
            document_version,
            created_at: Utc::now(),
        };

        if existing.is_some() {
            self.contracts.replace_for_quote(contract).await?;
        } else {
            self.contracts.insert(contract).await?;
        }

        info!(
            event_name = "booking.contract.created",
            quote_id = %quote.id.0,
            version = document_version,
        );
        Ok(ArtifactOutcome::Created { count: 1 })
    }

    async fn generate_questionnaire(
        &self,
        quote: &Quote,
        force: bool,
    ) -> Result<ArtifactOutcome, GenerateError> {
        let exists = self.questionnaires.exists_for_quote(&quote.id).await?;
        if exists && !force {
            warn!(
                event_name = "booking.questionnaire.skipped_exists",
                quote_id = %quote.id.0,
                "questionnaire already exists, pass force_questionnaire to regenerate"
            );
            return Ok(ArtifactOutcome::SkippedExists);
        }

        let Some(template_id) = &quote.questionnaire_template_id else {
            warn!(
                event_name = "booking.questionnaire.skipped_missing_template",
                quote_id = %quote.id.0,
                "quote references no questionnaire template"
            );
            return Ok(ArtifactOutcome::SkippedMissingTemplate);
        };

        let Some(template) = self.templates.find_by_id(template_id).await? else {
            warn!(
                event_name = "booking.questionnaire.skipped_missing_template",
                quote_id = %quote.id.0,
                template_id = %template_id.0,
                "questionnaire template not found"
            );
            return Ok(ArtifactOutcome::SkippedMissingTemplate);
        };

        let questionnaire = Questionnaire {
            id: QuestionnaireId(Uuid::new_v4().to_string()),
            quote_id: quote.id.clone(),
            client_id: quote.client_id.clone(),
            event_id: quote.event_id.clone(),
            template_id: template.id.clone(),
            title: template.name.clone(),
            status: DocumentStatus::Draft,
            created_at: Utc::now(),
        };

        if exists {
            self.questionnaires.replace_for_quote(questionnaire).await?;
        } else {
            self.questionnaires.insert(questionnaire).await?;
        }

        info!(event_name = "booking.questionnaire.created", quote_id = %quote.id.0);
        Ok(ArtifactOutcome::Created { count: 1 })
    }
}
