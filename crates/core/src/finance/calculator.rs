//! Quote financial computation.
//!
//! Pure functions over line items, a discount spec, and selected taxes.
//! All intermediate values stay at full decimal precision; rounding happens
//! only at presentation time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quote::{LineItem, TaxLine, DISCOUNT_ITEM_ID};
use crate::finance::currency::convert_from_base;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percent,
    Amount,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountSpec {
    pub kind: DiscountKind,
    pub value: Decimal,
}

impl DiscountSpec {
    pub fn percent(value: Decimal) -> Self {
        Self { kind: DiscountKind::Percent, value }
    }

    pub fn amount(value: Decimal) -> Self {
        Self { kind: DiscountKind::Amount, value }
    }

    /// Resolved discount against a subtotal. Deliberately unclamped: a
    /// discount larger than the subtotal drives the grand total negative,
    /// matching legacy behavior.
    pub fn amount_for(&self, subtotal: Decimal) -> Decimal {
        match self.kind {
            DiscountKind::Amount => self.value,
            DiscountKind::Percent => subtotal * self.value / Decimal::ONE_HUNDRED,
        }
    }
}

/// A selectable tax with a configurable rate. Retention taxes (withholding)
/// subtract from the payable total instead of adding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaxRule {
    pub name: String,
    pub rate_percent: Decimal,
    pub is_retention: bool,
}

/// Fully resolved quote financials. Recomputed on every relevant input
/// change; only `total` and the tax lines are persisted on the quote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub taxable_base: Decimal,
    pub tax_amounts: Vec<TaxLine>,
    /// Grand total in the base currency.
    pub total: Decimal,
    /// Display-currency equivalent, `None` when the quote is in the base
    /// currency.
    pub total_foreign: Option<Decimal>,
    pub currency: String,
    pub exchange_rate: Decimal,
}

/// Computes the financial summary for a quote's line items.
///
/// A global discount is prorated onto the taxable portion of the cart
/// (`taxable_ratio`), so mixed taxable/non-taxable item sets neither over-
/// nor under-tax. The taxable base floors at zero; nothing else is clamped.
pub fn compute_summary(
    items: &[LineItem],
    discount: Option<&DiscountSpec>,
    taxes: &[TaxRule],
    currency: &str,
    exchange_rate: Decimal,
) -> FinancialSummary {
    let subtotal: Decimal =
        items.iter().filter(|item| !item.is_discount()).map(|item| item.total).sum();
    let taxable_subtotal: Decimal = items
        .iter()
        .filter(|item| !item.is_discount() && item.is_taxable)
        .map(|item| item.total)
        .sum();

    let discount_amount =
        discount.map(|spec| spec.amount_for(subtotal)).unwrap_or(Decimal::ZERO);

    let taxable_ratio =
        if subtotal.is_zero() { Decimal::ZERO } else { taxable_subtotal / subtotal };
    let taxable_discount = discount_amount * taxable_ratio;
    let taxable_base = (taxable_subtotal - taxable_discount).max(Decimal::ZERO);

    let mut tax_amounts = Vec::with_capacity(taxes.len());
    let mut additive = Decimal::ZERO;
    let mut retained = Decimal::ZERO;
    for tax in taxes {
        let amount = taxable_base * tax.rate_percent / Decimal::ONE_HUNDRED;
        if tax.is_retention {
            retained += amount;
        } else {
            additive += amount;
        }
        tax_amounts.push(TaxLine {
            name: tax.name.clone(),
            rate_percent: tax.rate_percent,
            amount,
            is_retention: tax.is_retention,
        });
    }

    let total = subtotal - discount_amount + additive - retained;
    let total_foreign = convert_from_base(total, currency, exchange_rate);

    FinancialSummary {
        subtotal,
        discount_amount,
        taxable_base,
        tax_amounts,
        total,
        total_foreign,
        currency: currency.to_string(),
        exchange_rate,
    }
}

/// Derived view of the item list with the discount materialized as a
/// synthetic negative row, for display and persistence of saved quotes.
///
/// Any stale synthetic row in the input is dropped first; when the resolved
/// discount is positive, exactly one discount item is appended last. The
/// authoritative item list is never mutated.
pub fn effective_items(items: &[LineItem], discount: Option<&DiscountSpec>) -> Vec<LineItem> {
    let mut effective: Vec<LineItem> =
        items.iter().filter(|item| !item.is_discount()).cloned().collect();

    let subtotal: Decimal = effective.iter().map(|item| item.total).sum();
    let discount_amount =
        discount.map(|spec| spec.amount_for(subtotal)).unwrap_or(Decimal::ZERO);

    if discount_amount > Decimal::ZERO {
        effective.push(LineItem {
            id: DISCOUNT_ITEM_ID.to_string(),
            description: "Descuento".to_string(),
            quantity: Decimal::ONE,
            unit_price: -discount_amount,
            cost: Decimal::ZERO,
            total: -discount_amount,
            is_taxable: true,
        });
    }

    effective
}
