use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::documents::TemplateId;
use crate::domain::event::EventId;
use crate::domain::party::ClientId;
use crate::domain::schedule::ScheduleId;
use crate::errors::DomainError;

/// Reserved line-item id for the synthetic discount row. Derived by the
/// financial calculator, never authored by the quote builder.
pub const DISCOUNT_ITEM_ID: &str = "discount";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Internal cost for profit tracking. Never contributes to totals.
    pub cost: Decimal,
    pub total: Decimal,
    pub is_taxable: bool,
}

impl LineItem {
    /// Builds a regular line item with `total` derived from quantity and
    /// unit price. The only item that breaks this invariant is the synthetic
    /// discount row, which the calculator constructs itself.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        is_taxable: bool,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            quantity,
            unit_price,
            cost: Decimal::ZERO,
            total: quantity * unit_price,
            is_taxable,
        }
    }

    pub fn is_discount(&self) -> bool {
        self.id == DISCOUNT_ITEM_ID
    }
}

/// Persisted tax snapshot on a saved quote. This is the resolved amount,
/// not the selection; selections live in the quote builder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    pub name: String,
    pub rate_percent: Decimal,
    pub amount: Decimal,
    pub is_retention: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub client_id: ClientId,
    pub event_id: EventId,
    pub items: Vec<LineItem>,
    pub taxes: Vec<TaxLine>,
    pub currency: String,
    pub exchange_rate: Decimal,
    pub total_amount: Decimal,
    pub questionnaire_template_id: Option<TemplateId>,
    pub contract_template_id: Option<TemplateId>,
    pub payment_plan_template_id: Option<ScheduleId>,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        matches!(
            (&self.status, next),
            (QuoteStatus::Draft, QuoteStatus::Sent)
                | (QuoteStatus::Sent, QuoteStatus::Accepted)
                | (QuoteStatus::Sent, QuoteStatus::Rejected)
                | (QuoteStatus::Sent, QuoteStatus::Draft)
        )
    }

    pub fn transition_to(&mut self, next: QuoteStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next.clone()) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidQuoteTransition { from: self.status.clone(), to: next })
    }

    /// Booking documents are only derived from accepted quotes.
    pub fn ensure_accepted(&self) -> Result<(), DomainError> {
        if self.status == QuoteStatus::Accepted {
            return Ok(());
        }

        Err(DomainError::InvariantViolation(format!(
            "booking documents require an accepted quote, status is {:?}",
            self.status
        )))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::domain::documents::TemplateId;
    use crate::domain::event::EventId;
    use crate::domain::party::ClientId;

    use super::{LineItem, Quote, QuoteId, QuoteStatus};

    fn quote(status: QuoteStatus) -> Quote {
        Quote {
            id: QuoteId("Q-1".to_string()),
            client_id: ClientId("C-1".to_string()),
            event_id: EventId("E-1".to_string()),
            items: vec![LineItem::new(
                "li-1",
                "Banquete 50 personas",
                Decimal::from(50),
                Decimal::new(35_000, 2),
                true,
            )],
            taxes: vec![],
            currency: "MXN".to_string(),
            exchange_rate: Decimal::ONE,
            total_amount: Decimal::new(1_750_000, 2),
            questionnaire_template_id: None,
            contract_template_id: Some(TemplateId("tpl-contract".to_string())),
            payment_plan_template_id: None,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn line_item_total_derives_from_quantity_and_unit_price() {
        let item =
            LineItem::new("li-1", "Flete", Decimal::from(3), Decimal::new(2_500_00, 2), true);
        assert_eq!(item.total, Decimal::new(7_500_00, 2));
    }

    #[test]
    fn allows_valid_lifecycle_transition() {
        let mut quote = quote(QuoteStatus::Draft);
        quote.transition_to(QuoteStatus::Sent).expect("draft->sent");
        quote.transition_to(QuoteStatus::Accepted).expect("sent->accepted");
        assert_eq!(quote.status, QuoteStatus::Accepted);
    }

    #[test]
    fn blocks_invalid_lifecycle_transition() {
        let mut quote = quote(QuoteStatus::Draft);
        let error =
            quote.transition_to(QuoteStatus::Accepted).expect_err("draft->accepted should fail");
        assert!(matches!(error, crate::errors::DomainError::InvalidQuoteTransition { .. }));
    }

    #[test]
    fn sent_quotes_can_reenter_draft() {
        let mut quote = quote(QuoteStatus::Sent);
        quote.transition_to(QuoteStatus::Draft).expect("sent -> draft");
        assert_eq!(quote.status, QuoteStatus::Draft);
    }

    #[test]
    fn accepted_is_terminal() {
        let mut quote = quote(QuoteStatus::Accepted);
        assert!(quote.transition_to(QuoteStatus::Draft).is_err());
    }

    #[test]
    fn only_accepted_quotes_can_be_booked() {
        assert!(quote(QuoteStatus::Accepted).ensure_accepted().is_ok());

        let error = quote(QuoteStatus::Draft).ensure_accepted().expect_err("draft must fail");
        assert!(matches!(error, crate::errors::DomainError::InvariantViolation(_)));
    }
}
