//! Payment schedule resolution.
//!
//! Expands an organization-level schedule template against a concrete quote
//! total and event date into dated invoice drafts. Always operates on the
//! base-currency total; invoices are issued in the organization's home
//! currency regardless of the quote's display currency.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::schedule::{DueRule, PaymentMilestone, PaymentSchedule};

/// One resolved milestone, ready to become an invoice row. Output order is
/// the template's milestone order; presentation surfaces re-sort by due date
/// themselves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub milestone_name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

pub fn resolve_schedule(
    schedule: &PaymentSchedule,
    quote_total: Decimal,
    event_date: NaiveDate,
    booked_on: NaiveDate,
) -> Vec<InvoiceDraft> {
    schedule
        .milestones
        .iter()
        .map(|milestone| InvoiceDraft {
            milestone_name: milestone.name.clone(),
            amount: milestone_amount(&schedule.name, milestone, quote_total),
            due_date: due_date_for(&milestone.due, event_date, booked_on),
        })
        .collect()
}

fn milestone_amount(
    schedule_name: &str,
    milestone: &PaymentMilestone,
    quote_total: Decimal,
) -> Decimal {
    let raw = if let Some(percentage) = milestone.percentage {
        quote_total * percentage / Decimal::ONE_HUNDRED
    } else if let Some(fixed) = milestone.fixed_amount {
        fixed
    } else {
        warn!(
            event_name = "finance.schedule.milestone_missing_value",
            schedule = %schedule_name,
            milestone = %milestone.name,
            "milestone has neither percentage nor fixed amount, coercing to 0"
        );
        Decimal::ZERO
    };

    if raw < Decimal::ZERO {
        warn!(
            event_name = "finance.schedule.milestone_negative_amount",
            schedule = %schedule_name,
            milestone = %milestone.name,
            amount = %raw,
            "negative milestone amount, coercing to 0"
        );
        return Decimal::ZERO;
    }

    raw
}

fn due_date_for(rule: &DueRule, event_date: NaiveDate, booked_on: NaiveDate) -> NaiveDate {
    match rule {
        DueRule::OnBooking => booked_on,
        DueRule::BeforeEvent { days } => event_date - Duration::days(*days),
        DueRule::AfterEvent { days } => event_date + Duration::days(*days),
    }
}
