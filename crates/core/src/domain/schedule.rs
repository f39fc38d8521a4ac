use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleId(pub String);

/// Due-date rule for a payment milestone, relative to booking or event date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DueRule {
    OnBooking,
    BeforeEvent { days: i64 },
    AfterEvent { days: i64 },
}

/// One named partial-payment rule inside an organization-level schedule
/// template (e.g. "Retainer 35%"). Either `percentage` or `fixed_amount`
/// should be set; legacy rows sometimes carry neither, which resolves to a
/// zero invoice with a data-quality warning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentMilestone {
    pub name: String,
    pub percentage: Option<Decimal>,
    pub fixed_amount: Option<Decimal>,
    pub due: DueRule,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub id: ScheduleId,
    pub name: String,
    pub milestones: Vec<PaymentMilestone>,
}
