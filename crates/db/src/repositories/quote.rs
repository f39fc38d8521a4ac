use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use banquet_core::domain::documents::TemplateId;
use banquet_core::domain::event::EventId;
use banquet_core::domain::party::ClientId;
use banquet_core::domain::quote::{LineItem, Quote, QuoteId, TaxLine};
use banquet_core::domain::schedule::ScheduleId;

use super::codec;
use super::{QuoteRepository, RepositoryError};
use crate::DbPool;

pub struct SqlQuoteRepository {
    pool: DbPool,
}

impl SqlQuoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl QuoteRepository for SqlQuoteRepository {
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, client_id, event_id, items, taxes, currency, exchange_rate,
                    total_amount, questionnaire_template_id, contract_template_id,
                    payment_plan_template_id, status, created_at
             FROM quotes WHERE id = ?1",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(decode_quote).transpose()
    }

    async fn save(&self, quote: Quote) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO quotes (
                 id, client_id, event_id, items, taxes, currency, exchange_rate,
                 total_amount, questionnaire_template_id, contract_template_id,
                 payment_plan_template_id, status, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(&quote.id.0)
        .bind(&quote.client_id.0)
        .bind(&quote.event_id.0)
        .bind(codec::to_json(&quote.items, "items")?)
        .bind(codec::to_json(&quote.taxes, "taxes")?)
        .bind(&quote.currency)
        .bind(quote.exchange_rate.to_string())
        .bind(quote.total_amount.to_string())
        .bind(quote.questionnaire_template_id.as_ref().map(|id| id.0.clone()))
        .bind(quote.contract_template_id.as_ref().map(|id| id.0.clone()))
        .bind(quote.payment_plan_template_id.as_ref().map(|id| id.0.clone()))
        .bind(codec::quote_status_as_str(&quote.status))
        .bind(quote.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn decode_quote(row: SqliteRow) -> Result<Quote, RepositoryError> {
    let items: Vec<LineItem> = codec::parse_json(&row.try_get::<String, _>("items")?, "items")?;
    let taxes: Vec<TaxLine> = codec::parse_json(&row.try_get::<String, _>("taxes")?, "taxes")?;

    Ok(Quote {
        id: QuoteId(row.try_get("id")?),
        client_id: ClientId(row.try_get("client_id")?),
        event_id: EventId(row.try_get("event_id")?),
        items,
        taxes,
        currency: row.try_get("currency")?,
        exchange_rate: codec::parse_decimal(
            &row.try_get::<String, _>("exchange_rate")?,
            "exchange_rate",
        )?,
        total_amount: codec::parse_decimal(
            &row.try_get::<String, _>("total_amount")?,
            "total_amount",
        )?,
        questionnaire_template_id: row
            .try_get::<Option<String>, _>("questionnaire_template_id")?
            .map(TemplateId),
        contract_template_id: row
            .try_get::<Option<String>, _>("contract_template_id")?
            .map(TemplateId),
        payment_plan_template_id: row
            .try_get::<Option<String>, _>("payment_plan_template_id")?
            .map(ScheduleId),
        status: codec::quote_status_from_str(&row.try_get::<String, _>("status")?)?,
        created_at: codec::parse_datetime(&row.try_get::<String, _>("created_at")?, "created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use banquet_core::domain::documents::TemplateId;
    use banquet_core::domain::event::EventId;
    use banquet_core::domain::party::ClientId;
    use banquet_core::domain::quote::{LineItem, Quote, QuoteId, QuoteStatus, TaxLine};

    use crate::migrations::run_pending;
    use crate::repositories::{QuoteRepository, SqlQuoteRepository};
    use crate::connect_with_settings;

    async fn repo() -> SqlQuoteRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        // Foreign keys are enforced, so quotes need their parent rows.
        sqlx::query("INSERT INTO clients (id, name) VALUES ('C-1', 'Mariana Soto')")
            .execute(&pool)
            .await
            .expect("seed client");
        sqlx::query("INSERT INTO events (id, name, date) VALUES ('E-1', 'Boda', '2026-06-20')")
            .execute(&pool)
            .await
            .expect("seed event");

        SqlQuoteRepository::new(pool)
    }

    fn sample_quote() -> Quote {
        Quote {
            id: QuoteId("Q-100".to_string()),
            client_id: ClientId("C-1".to_string()),
            event_id: EventId("E-1".to_string()),
            items: vec![LineItem::new(
                "li-1",
                "Banquete 80 personas",
                Decimal::from(80),
                Decimal::new(45_000, 2),
                true,
            )],
            taxes: vec![TaxLine {
                name: "IVA".to_string(),
                rate_percent: Decimal::from(16),
                amount: Decimal::new(5_760_00, 2),
                is_retention: false,
            }],
            currency: "MXN".to_string(),
            exchange_rate: Decimal::ONE,
            total_amount: Decimal::new(41_760_00, 2),
            questionnaire_template_id: None,
            contract_template_id: Some(TemplateId("tpl-contract".to_string())),
            payment_plan_template_id: None,
            status: QuoteStatus::Accepted,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn quote_round_trips_with_nested_collections() {
        let repo = repo().await;
        let quote = sample_quote();
        repo.save(quote.clone()).await.expect("save");

        let loaded =
            repo.find_by_id(&quote.id).await.expect("find").expect("quote should exist");
        assert_eq!(loaded.items, quote.items);
        assert_eq!(loaded.taxes, quote.taxes);
        assert_eq!(loaded.total_amount, quote.total_amount);
        assert_eq!(loaded.status, QuoteStatus::Accepted);
        assert_eq!(loaded.contract_template_id, quote.contract_template_id);
        assert_eq!(loaded.payment_plan_template_id, None);
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let repo = repo().await;
        let mut quote = sample_quote();
        repo.save(quote.clone()).await.expect("save");

        quote.total_amount = Decimal::new(50_000_00, 2);
        repo.save(quote.clone()).await.expect("resave");

        let loaded =
            repo.find_by_id(&quote.id).await.expect("find").expect("quote should exist");
        assert_eq!(loaded.total_amount, Decimal::new(50_000_00, 2));
    }

    #[tokio::test]
    async fn missing_quote_is_none() {
        let repo = repo().await;
        let found = repo.find_by_id(&QuoteId("Q-404".to_string())).await.expect("find");
        assert!(found.is_none());
    }
}
