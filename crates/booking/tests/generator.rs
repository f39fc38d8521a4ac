//! End-to-end generation flow against the in-memory repositories.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use banquet_booking::{ArtifactOutcome, BookingDocumentGenerator, GenerateOptions};
use banquet_core::{
    ApplicationError, Client, ClientId, DocumentTemplate, DueRule, Event, EventId,
    PaymentMilestone, PaymentSchedule, Quote, QuoteId, QuoteStatus, ScheduleId, TemplateId, Venue,
    VenueId,
};
use banquet_db::repositories::{
    ClientRepository, ContractRepository, EventRepository, InMemoryClientRepository,
    InMemoryContractRepository, InMemoryEventRepository, InMemoryInvoiceRepository,
    InMemoryPlannerRepository, InMemoryQuestionnaireRepository, InMemoryQuoteRepository,
    InMemoryScheduleRepository, InMemoryTemplateRepository, InMemoryVenueRepository,
    InvoiceRepository, QuestionnaireRepository, QuoteRepository, ScheduleRepository,
    TemplateRepository, VenueRepository,
};

const CONTRACT_TEMPLATE: &str = "<h1>Contrato de Servicio</h1>\
     <p>Cliente: {{client.name}}</p>\
     <p>Evento: {{event.name}}</p>\
     <p>El calendario de pagos se detallará a continuación.</p>";

struct Harness {
    generator: BookingDocumentGenerator,
    invoices: Arc<InMemoryInvoiceRepository>,
    contracts: Arc<InMemoryContractRepository>,
    questionnaires: Arc<InMemoryQuestionnaireRepository>,
    quotes: Arc<InMemoryQuoteRepository>,
}

async fn harness() -> Harness {
    let clients = Arc::new(InMemoryClientRepository::default());
    let events = Arc::new(InMemoryEventRepository::default());
    let venues = Arc::new(InMemoryVenueRepository::default());
    let planners = Arc::new(InMemoryPlannerRepository::default());
    let templates = Arc::new(InMemoryTemplateRepository::default());
    let schedules = Arc::new(InMemoryScheduleRepository::default());
    let invoices = Arc::new(InMemoryInvoiceRepository::default());
    let contracts = Arc::new(InMemoryContractRepository::default());
    let questionnaires = Arc::new(InMemoryQuestionnaireRepository::default());
    let quotes = Arc::new(InMemoryQuoteRepository::default());

    clients
        .save(Client {
            id: ClientId("C-1".to_string()),
            name: "María Torres".to_string(),
            email: Some("maria@example.com".to_string()),
            phone: None,
            address: None,
        })
        .await
        .expect("seed client");

    venues
        .save(Venue {
            id: VenueId("V-1".to_string()),
            name: "Hacienda San Gabriel".to_string(),
            address: Some("Camino Real 12".to_string()),
        })
        .await
        .expect("seed venue");

    events
        .save(Event {
            id: EventId("E-1".to_string()),
            name: "Boda Torres".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 6, 20).expect("valid date"),
            guest_count: Some(150),
            venue_id: Some(VenueId("V-1".to_string())),
            planner_id: None,
        })
        .await
        .expect("seed event");

    templates
        .save(DocumentTemplate {
            id: TemplateId("tpl-contract".to_string()),
            name: "Contrato estándar".to_string(),
            content: CONTRACT_TEMPLATE.to_string(),
        })
        .await
        .expect("seed contract template");

    templates
        .save(DocumentTemplate {
            id: TemplateId("tpl-quest".to_string()),
            name: "Cuestionario del Evento".to_string(),
            content: "<p>{{event.name}}</p>".to_string(),
        })
        .await
        .expect("seed questionnaire template");

    schedules
        .save(PaymentSchedule {
            id: ScheduleId("PS-1".to_string()),
            name: "35/35/30".to_string(),
            milestones: vec![
                PaymentMilestone {
                    name: "Apartado".to_string(),
                    percentage: Some(Decimal::from(35)),
                    fixed_amount: None,
                    due: DueRule::OnBooking,
                },
                PaymentMilestone {
                    name: "Anticipo".to_string(),
                    percentage: Some(Decimal::from(35)),
                    fixed_amount: None,
                    due: DueRule::BeforeEvent { days: 60 },
                },
                PaymentMilestone {
                    name: "Liquidación".to_string(),
                    percentage: Some(Decimal::from(30)),
                    fixed_amount: None,
                    due: DueRule::BeforeEvent { days: 15 },
                },
            ],
        })
        .await
        .expect("seed schedule");

    let generator = BookingDocumentGenerator {
        clients,
        events,
        venues,
        planners,
        templates,
        schedules,
        invoices: invoices.clone(),
        contracts: contracts.clone(),
        questionnaires: questionnaires.clone(),
    };

    Harness { generator, invoices, contracts, questionnaires, quotes }
}

fn accepted_quote() -> Quote {
    Quote {
        id: QuoteId("Q-1".to_string()),
        client_id: ClientId("C-1".to_string()),
        event_id: EventId("E-1".to_string()),
        items: vec![],
        taxes: vec![],
        currency: "MXN".to_string(),
        exchange_rate: Decimal::ONE,
        total_amount: Decimal::from(10_000),
        questionnaire_template_id: Some(TemplateId("tpl-quest".to_string())),
        contract_template_id: Some(TemplateId("tpl-contract".to_string())),
        payment_plan_template_id: Some(ScheduleId("PS-1".to_string())),
        status: QuoteStatus::Accepted,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn first_generation_creates_all_three_artifacts() {
    let harness = harness().await;
    let quote = accepted_quote();

    let report = harness
        .generator
        .generate(&quote, GenerateOptions::default())
        .await
        .expect("generate");

    assert_eq!(report.invoices, ArtifactOutcome::Created { count: 3 });
    assert_eq!(report.contract, ArtifactOutcome::Created { count: 1 });
    assert_eq!(report.questionnaire, ArtifactOutcome::Created { count: 1 });

    let invoices = harness.invoices.list_for_quote(&quote.id).await.expect("list invoices");
    assert_eq!(invoices.len(), 3);
    assert_eq!(invoices[0].invoice_number, "INV-Q-1-1");
    assert_eq!(invoices[0].total_amount, Decimal::from(3_500));
    assert_eq!(invoices[1].total_amount, Decimal::from(3_500));
    assert_eq!(invoices[2].total_amount, Decimal::from(3_000));
    assert_eq!(
        invoices[2].due_date,
        NaiveDate::from_ymd_opt(2026, 6, 5).expect("valid date"),
        "Liquidación is due 15 days before the event",
    );
}

#[tokio::test]
async fn contract_is_hydrated_with_entities_and_schedule_table() {
    let harness = harness().await;
    let quote = accepted_quote();

    harness.generator.generate(&quote, GenerateOptions::default()).await.expect("generate");

    let contract = harness
        .contracts
        .find_by_quote(&quote.id)
        .await
        .expect("find contract")
        .expect("contract exists");

    assert!(contract.content.contains("Cliente: María Torres"));
    assert!(contract.content.contains("Evento: Boda Torres"));
    assert!(contract.content.contains("<table class=\"payment-schedule\""));
    assert!(contract.content.contains("Apartado"));
    assert!(!contract.content.contains("{{payment_schedule_table}}"));
    assert!(!contract.content.contains("El calendario de pagos se detallará"));
    assert_eq!(contract.document_version, 1);
}

#[tokio::test]
async fn rerunning_generation_skips_every_artifact() {
    let harness = harness().await;

    // Round-trip the quote through storage, as the booking flow does.
    harness.quotes.save(accepted_quote()).await.expect("save quote");
    let quote = harness
        .quotes
        .find_by_id(&QuoteId("Q-1".to_string()))
        .await
        .expect("find quote")
        .expect("quote exists");

    harness.generator.generate(&quote, GenerateOptions::default()).await.expect("first run");
    let report = harness
        .generator
        .generate(&quote, GenerateOptions::default())
        .await
        .expect("second run");

    assert_eq!(report.invoices, ArtifactOutcome::SkippedExists);
    assert_eq!(report.contract, ArtifactOutcome::SkippedExists);
    assert_eq!(report.questionnaire, ArtifactOutcome::SkippedExists);

    let invoices = harness.invoices.list_for_quote(&quote.id).await.expect("list invoices");
    assert_eq!(invoices.len(), 3, "no duplicate invoices after a rerun");
}

#[tokio::test]
async fn force_contract_regenerates_and_bumps_the_version_but_never_invoices() {
    let harness = harness().await;
    let quote = accepted_quote();

    harness.generator.generate(&quote, GenerateOptions::default()).await.expect("first run");
    let report = harness
        .generator
        .generate(&quote, GenerateOptions { force_contract: true, force_questionnaire: false })
        .await
        .expect("forced run");

    assert_eq!(report.invoices, ArtifactOutcome::SkippedExists);
    assert_eq!(report.contract, ArtifactOutcome::Created { count: 1 });
    assert_eq!(report.questionnaire, ArtifactOutcome::SkippedExists);

    let contract = harness
        .contracts
        .find_by_quote(&quote.id)
        .await
        .expect("find contract")
        .expect("contract exists");
    assert_eq!(contract.document_version, 2);

    let invoices = harness.invoices.list_for_quote(&quote.id).await.expect("list invoices");
    assert_eq!(invoices.len(), 3);
}

#[tokio::test]
async fn force_questionnaire_replaces_it_but_never_invoices() {
    let harness = harness().await;
    let quote = accepted_quote();

    harness.generator.generate(&quote, GenerateOptions::default()).await.expect("first run");
    let original = harness
        .questionnaires
        .find_by_quote(&quote.id)
        .await
        .expect("find questionnaire")
        .expect("questionnaire exists");

    let report = harness
        .generator
        .generate(&quote, GenerateOptions { force_contract: false, force_questionnaire: true })
        .await
        .expect("forced run");

    assert_eq!(report.invoices, ArtifactOutcome::SkippedExists);
    assert_eq!(report.contract, ArtifactOutcome::SkippedExists);
    assert_eq!(report.questionnaire, ArtifactOutcome::Created { count: 1 });

    let replaced = harness
        .questionnaires
        .find_by_quote(&quote.id)
        .await
        .expect("find questionnaire")
        .expect("questionnaire exists");
    assert_ne!(replaced.id, original.id, "forced regeneration replaces the row");
    assert_eq!(replaced.title, "Cuestionario del Evento");

    let invoices = harness.invoices.list_for_quote(&quote.id).await.expect("list invoices");
    assert_eq!(invoices.len(), 3);
}

#[tokio::test]
async fn generation_refuses_quotes_that_are_not_accepted() {
    let harness = harness().await;
    let mut quote = accepted_quote();
    quote.status = QuoteStatus::Draft;

    let error = harness
        .generator
        .generate(&quote, GenerateOptions::default())
        .await
        .expect_err("draft quote must be refused");

    let app_error = ApplicationError::from(error);
    assert_eq!(
        app_error.user_message(),
        "The quote could not be processed. Check inputs and try again."
    );

    let invoices = harness.invoices.list_for_quote(&quote.id).await.expect("list invoices");
    assert!(invoices.is_empty(), "no artifacts for a refused quote");
}

#[tokio::test]
async fn missing_templates_skip_their_artifact_and_the_rest_proceed() {
    let harness = harness().await;
    let mut quote = accepted_quote();
    quote.contract_template_id = None;
    quote.questionnaire_template_id = Some(TemplateId("tpl-desconocido".to_string()));

    let report = harness
        .generator
        .generate(&quote, GenerateOptions::default())
        .await
        .expect("generate");

    assert_eq!(report.invoices, ArtifactOutcome::Created { count: 3 });
    assert_eq!(report.contract, ArtifactOutcome::SkippedMissingTemplate);
    assert_eq!(report.questionnaire, ArtifactOutcome::SkippedMissingTemplate);
}

#[tokio::test]
async fn missing_event_fails_invoices_but_still_generates_the_contract() {
    let harness = harness().await;
    let mut quote = accepted_quote();
    quote.event_id = EventId("E-desconocido".to_string());

    let report = harness
        .generator
        .generate(&quote, GenerateOptions::default())
        .await
        .expect("generate");

    assert!(matches!(report.invoices, ArtifactOutcome::Failed { .. }));
    assert_eq!(report.contract, ArtifactOutcome::Created { count: 1 });

    let contract = harness
        .contracts
        .find_by_quote(&quote.id)
        .await
        .expect("find contract")
        .expect("contract exists");
    // Unknown entity tokens degrade to their bracketed path.
    assert!(contract.content.contains("Evento: [event.name]"));
}
