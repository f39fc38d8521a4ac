use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::contract::contains_terms_phrase;
use crate::contract::tokens::TokenReplacer;
use crate::domain::documents::Invoice;
use crate::domain::event::{Event, Venue};
use crate::domain::party::{Client, Planner};
use crate::domain::quote::Quote;

/// Token the payment-schedule table is injected through. The caller renders
/// the table and supplies it via [`HydrationContext::extra`].
pub const PAYMENT_SCHEDULE_TOKEN: &str = "{{payment_schedule_table}}";

/// Literal sentence legacy templates used where the schedule belongs.
/// Replaced with [`PAYMENT_SCHEDULE_TOKEN`] so the generated table lands
/// there instead of static prose.
const LEGACY_SCHEDULE_SENTENCE: &str = "El calendario de pagos se detallará a continuación.";

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<h[1-6][^>]*>(.*?)</h[1-6]\s*>")
            .expect("heading pattern is a valid literal regex")
    })
}

fn logo_placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)<(div|p)[^>]*class="[^"]*logo-placeholder[^"]*"[^>]*>.*?</(?:div|p)\s*>"#)
            .expect("logo pattern is a valid literal regex")
    })
}

/// Context bundle for contract hydration. Every entity is optional: a
/// missing reference means the field is omitted from the token context,
/// never an error.
#[derive(Clone, Debug, Default)]
pub struct HydrationContext {
    pub client: Option<Client>,
    pub event: Option<Event>,
    pub venue: Option<Venue>,
    pub planner: Option<Planner>,
    pub quote: Option<Quote>,
    pub invoices: Vec<Invoice>,
    /// Caller-supplied tokens merged at the context root, e.g.
    /// `payment_schedule_table`.
    pub extra: Map<String, Value>,
}

impl HydrationContext {
    pub fn to_token_context(&self) -> Value {
        let mut root = Map::new();

        if let Some(client) = &self.client {
            root.insert(
                "client".to_string(),
                serde_json::json!({
                    "name": client.name,
                    "email": client.email,
                    "phone": client.phone,
                    "address": client.address,
                }),
            );
        }

        if let Some(event) = &self.event {
            root.insert(
                "event".to_string(),
                serde_json::json!({
                    "name": event.name,
                    "date": event.date.format("%d/%m/%Y").to_string(),
                    "guest_count": event.guest_count,
                }),
            );
        }

        if let Some(venue) = &self.venue {
            root.insert(
                "venue".to_string(),
                serde_json::json!({ "name": venue.name, "address": venue.address }),
            );
        }

        if let Some(planner) = &self.planner {
            root.insert(
                "planner".to_string(),
                serde_json::json!({
                    "name": planner.name,
                    "email": planner.email,
                    "phone": planner.phone,
                }),
            );
        }

        if let Some(quote) = &self.quote {
            let service_summary = quote
                .items
                .iter()
                .filter(|item| !item.is_discount())
                .map(|item| item.description.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            root.insert(
                "quote".to_string(),
                serde_json::json!({
                    "folio": quote.id.0,
                    "currency": quote.currency,
                    // Display rounding only; stored amounts keep full precision.
                    "total": quote.total_amount.round_dp(2).to_string(),
                    "service_summary": service_summary,
                }),
            );
        }

        if !self.invoices.is_empty() {
            root.insert(
                "invoice_count".to_string(),
                Value::from(self.invoices.len() as u64),
            );
        }

        for (key, value) in &self.extra {
            root.insert(key.clone(), value.clone());
        }

        Value::Object(root)
    }
}

/// Hydrates a contract template into final HTML.
///
/// Steps, in order: swap the legacy schedule sentence for the schedule
/// token, repair legacy flattened layouts, substitute `{{token}}`
/// placeholders, strip the logo placeholder block.
pub fn hydrate(
    template_html: &str,
    context: &HydrationContext,
    tokens: &dyn TokenReplacer,
) -> String {
    let with_schedule_token =
        template_html.replace(LEGACY_SCHEDULE_SENTENCE, PAYMENT_SCHEDULE_TOKEN);
    let repaired = repair_legacy_layout(&with_schedule_token);
    let substituted = tokens.replace_tokens(&repaired, &context.to_token_context());
    logo_placeholder_pattern().replace_all(&substituted, "").into_owned()
}

/// Compatibility shim for legacy flattened templates.
///
/// Templates authored before section markers existed carry replaceable
/// boilerplate ahead of their terms-and-conditions heading. Everything
/// before that heading is swapped for the canonical
/// header/services/payment-schedule layout; the heading and the legal text
/// after it are preserved verbatim. Positional and heading-text based, so a
/// template that renames the heading keeps its original layout.
fn repair_legacy_layout(html: &str) -> String {
    let Some(terms_start) = find_terms_heading_start(html) else {
        return html.to_string();
    };

    let preserved_terms = &html[terms_start..];
    format!(
        "<h1>Contrato de Prestación de Servicios</h1>\n\
         <p>Cliente: {{{{client.name}}}}</p>\n\
         <p>Evento: {{{{event.name}}}}, {{{{event.date}}}}</p>\n\
         <p>Sede: {{{{venue.name}}}}</p>\n\
         <h2>Servicios Contratados</h2>\n\
         <p>{{{{quote.service_summary}}}}</p>\n\
         <p>Total: {{{{quote.total}}}} {{{{quote.currency}}}}</p>\n\
         <h2>Calendario de Pagos</h2>\n\
         {PAYMENT_SCHEDULE_TOKEN}\n\
         {preserved_terms}"
    )
}

fn find_terms_heading_start(html: &str) -> Option<usize> {
    heading_pattern()
        .captures_iter(html)
        .find(|caps| contains_terms_phrase(&caps[1]))
        .and_then(|caps| caps.get(0))
        .map(|m| m.start())
}
