//! Renders resolved invoices into the HTML table injected through the
//! `{{payment_schedule_table}}` contract token.
//!
//! This is the only place display rounding happens; stored amounts keep full
//! precision. Rows are sorted by due date here as a presentation concern,
//! upstream the resolver preserves template order.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use tera::{Context, Tera};

use banquet_core::Invoice;

const TABLE_TEMPLATE_NAME: &str = "payment_schedule_table";

const TABLE_TEMPLATE: &str = r#"<table class="payment-schedule">
  <thead>
    <tr><th>Concepto</th><th>Fecha límite</th><th>Monto</th></tr>
  </thead>
  <tbody>
  {%- for row in rows %}
    <tr><td>{{ row.concept }}</td><td>{{ row.due_date }}</td><td>{{ row.amount | money }}</td></tr>
  {%- endfor %}
  </tbody>
</table>"#;

/// 2-decimal money display filter, e.g. `amount | money`.
fn tera_money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let num = match value {
        tera::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        tera::Value::Null => 0.0,
        _ => 0.0,
    };
    Ok(tera::Value::String(format!("{:.2}", num)))
}

pub fn render_schedule_table(invoices: &[Invoice]) -> Result<String, tera::Error> {
    let mut tera = Tera::default();
    tera.register_filter("money", tera_money_filter);
    tera.add_raw_template(TABLE_TEMPLATE_NAME, TABLE_TEMPLATE)?;

    let mut sorted: Vec<&Invoice> = invoices.iter().collect();
    sorted.sort_by_key(|invoice| invoice.due_date);

    let rows: Vec<serde_json::Value> = sorted
        .iter()
        .map(|invoice| {
            let concept = invoice
                .items
                .first()
                .map(|item| item.description.clone())
                .unwrap_or_else(|| invoice.invoice_number.clone());
            serde_json::json!({
                "concept": concept,
                "due_date": invoice.due_date.format("%d/%m/%Y").to_string(),
                "amount": invoice.total_amount.to_f64().unwrap_or(0.0),
            })
        })
        .collect();

    let mut context = Context::new();
    context.insert("rows", &rows);
    tera.render(TABLE_TEMPLATE_NAME, &context)
}
