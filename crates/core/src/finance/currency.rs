use rust_decimal::Decimal;
use tracing::warn;

/// Invoices and schedule math always run in the organization's home
/// currency; other currencies are display-only conversions on the quote.
pub const BASE_CURRENCY: &str = "MXN";

pub fn is_base_currency(currency: &str) -> bool {
    currency.eq_ignore_ascii_case(BASE_CURRENCY)
}

/// Converts a base-currency total into the quote's display currency using
/// the rate expressed as base units per foreign unit. Returns `None` for the
/// base currency (rate 1, never converted) and for unusable rates, which are
/// a data-quality problem, not an error.
pub fn convert_from_base(total: Decimal, currency: &str, exchange_rate: Decimal) -> Option<Decimal> {
    if is_base_currency(currency) {
        return None;
    }

    if exchange_rate <= Decimal::ZERO {
        warn!(
            event_name = "finance.currency.unusable_rate",
            currency = %currency,
            rate = %exchange_rate,
            "non-positive exchange rate, skipping conversion"
        );
        return None;
    }

    Some(total / exchange_rate)
}
