//! SQLite repositories for the generated booking artifacts.
//!
//! Invoices are append-only per quote. Contracts and questionnaires support
//! replacement for forced regeneration, done as delete-then-insert inside a
//! transaction so a failed regeneration never leaves a quote without its
//! artifact row.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use banquet_core::domain::documents::{
    Contract, ContractId, Invoice, InvoiceId, InvoiceItem, Questionnaire, QuestionnaireId,
    TemplateId,
};
use banquet_core::domain::event::EventId;
use banquet_core::domain::party::ClientId;
use banquet_core::domain::quote::QuoteId;

use super::codec;
use super::{ContractRepository, InvoiceRepository, QuestionnaireRepository, RepositoryError};
use crate::DbPool;

pub struct SqlInvoiceRepository {
    pool: DbPool,
}

impl SqlInvoiceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InvoiceRepository for SqlInvoiceRepository {
    async fn insert(&self, invoice: Invoice) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO invoices (
                 id, quote_id, client_id, event_id, invoice_number, items,
                 total_amount, due_date, status, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&invoice.id.0)
        .bind(&invoice.quote_id.0)
        .bind(&invoice.client_id.0)
        .bind(&invoice.event_id.0)
        .bind(&invoice.invoice_number)
        .bind(codec::to_json(&invoice.items, "items")?)
        .bind(invoice.total_amount.to_string())
        .bind(codec::format_date(invoice.due_date))
        .bind(codec::invoice_status_as_str(&invoice.status))
        .bind(invoice.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_quote(&self, quote_id: &QuoteId) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, quote_id, client_id, event_id, invoice_number, items,
                    total_amount, due_date, status, created_at
             FROM invoices WHERE quote_id = ?1 ORDER BY created_at, id",
        )
        .bind(&quote_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(decode_invoice).collect()
    }

    async fn exists_for_quote(&self, quote_id: &QuoteId) -> Result<bool, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE quote_id = ?1")
                .bind(&quote_id.0)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }
}

fn decode_invoice(row: SqliteRow) -> Result<Invoice, RepositoryError> {
    let items: Vec<InvoiceItem> = codec::parse_json(&row.try_get::<String, _>("items")?, "items")?;

    Ok(Invoice {
        id: InvoiceId(row.try_get("id")?),
        quote_id: QuoteId(row.try_get("quote_id")?),
        client_id: ClientId(row.try_get("client_id")?),
        event_id: EventId(row.try_get("event_id")?),
        invoice_number: row.try_get("invoice_number")?,
        items,
        total_amount: codec::parse_decimal(
            &row.try_get::<String, _>("total_amount")?,
            "total_amount",
        )?,
        due_date: codec::parse_date(&row.try_get::<String, _>("due_date")?, "due_date")?,
        status: codec::invoice_status_from_str(&row.try_get::<String, _>("status")?)?,
        created_at: codec::parse_datetime(&row.try_get::<String, _>("created_at")?, "created_at")?,
    })
}

pub struct SqlContractRepository {
    pool: DbPool,
}

impl SqlContractRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn insert_row<'e, E>(executor: E, contract: &Contract) -> Result<(), RepositoryError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT INTO contracts (
                 id, quote_id, client_id, event_id, template_id, content,
                 status, document_version, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&contract.id.0)
        .bind(&contract.quote_id.0)
        .bind(&contract.client_id.0)
        .bind(&contract.event_id.0)
        .bind(&contract.template_id.0)
        .bind(&contract.content)
        .bind(codec::document_status_as_str(&contract.status))
        .bind(contract.document_version as i64)
        .bind(contract.created_at.to_rfc3339())
        .execute(executor)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ContractRepository for SqlContractRepository {
    async fn insert(&self, contract: Contract) -> Result<(), RepositoryError> {
        Self::insert_row(&self.pool, &contract).await
    }

    async fn replace_for_quote(&self, contract: Contract) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM contracts WHERE quote_id = ?1")
            .bind(&contract.quote_id.0)
            .execute(&mut *tx)
            .await?;
        Self::insert_row(&mut *tx, &contract).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_by_quote(
        &self,
        quote_id: &QuoteId,
    ) -> Result<Option<Contract>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, quote_id, client_id, event_id, template_id, content,
                    status, document_version, created_at
             FROM contracts WHERE quote_id = ?1",
        )
        .bind(&quote_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(decode_contract).transpose()
    }

    async fn exists_for_quote(&self, quote_id: &QuoteId) -> Result<bool, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM contracts WHERE quote_id = ?1")
                .bind(&quote_id.0)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }
}

fn decode_contract(row: SqliteRow) -> Result<Contract, RepositoryError> {
    Ok(Contract {
        id: ContractId(row.try_get("id")?),
        quote_id: QuoteId(row.try_get("quote_id")?),
        client_id: ClientId(row.try_get("client_id")?),
        event_id: EventId(row.try_get("event_id")?),
        template_id: TemplateId(row.try_get("template_id")?),
        content: row.try_get("content")?,
        status: codec::document_status_from_str(&row.try_get::<String, _>("status")?)?,
        document_version: row.try_get::<i64, _>("document_version")? as u32,
        created_at: codec::parse_datetime(&row.try_get::<String, _>("created_at")?, "created_at")?,
    })
}

pub struct SqlQuestionnaireRepository {
    pool: DbPool,
}

impl SqlQuestionnaireRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn insert_row<'e, E>(
        executor: E,
        questionnaire: &Questionnaire,
    ) -> Result<(), RepositoryError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT INTO questionnaires (
                 id, quote_id, client_id, event_id, template_id, title, status, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&questionnaire.id.0)
        .bind(&questionnaire.quote_id.0)
        .bind(&questionnaire.client_id.0)
        .bind(&questionnaire.event_id.0)
        .bind(&questionnaire.template_id.0)
        .bind(&questionnaire.title)
        .bind(codec::document_status_as_str(&questionnaire.status))
        .bind(questionnaire.created_at.to_rfc3339())
        .execute(executor)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl QuestionnaireRepository for SqlQuestionnaireRepository {
    async fn insert(&self, questionnaire: Questionnaire) -> Result<(), RepositoryError> {
        Self::insert_row(&self.pool, &questionnaire).await
    }

    async fn replace_for_quote(
        &self,
        questionnaire: Questionnaire,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM questionnaires WHERE quote_id = ?1")
            .bind(&questionnaire.quote_id.0)
            .execute(&mut *tx)
            .await?;
        Self::insert_row(&mut *tx, &questionnaire).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_by_quote(
        &self,
        quote_id: &QuoteId,
    ) -> Result<Option<Questionnaire>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, quote_id, client_id, event_id, template_id, title, status, created_at
             FROM questionnaires WHERE quote_id = ?1",
        )
        .bind(&quote_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(Questionnaire {
                id: QuestionnaireId(row.try_get("id")?),
                quote_id: QuoteId(row.try_get("quote_id")?),
                client_id: ClientId(row.try_get("client_id")?),
                event_id: EventId(row.try_get("event_id")?),
                template_id: TemplateId(row.try_get("template_id")?),
                title: row.try_get("title")?,
                status: codec::document_status_from_str(&row.try_get::<String, _>("status")?)?,
                created_at: codec::parse_datetime(
                    &row.try_get::<String, _>("created_at")?,
                    "created_at",
                )?,
            })
        })
        .transpose()
    }

    async fn exists_for_quote(&self, quote_id: &QuoteId) -> Result<bool, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM questionnaires WHERE quote_id = ?1")
                .bind(&quote_id.0)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use banquet_core::domain::documents::{
        Contract, ContractId, DocumentStatus, Invoice, InvoiceId, InvoiceItem, InvoiceStatus,
        TemplateId,
    };
    use banquet_core::domain::event::EventId;
    use banquet_core::domain::party::ClientId;
    use banquet_core::domain::quote::QuoteId;

    use crate::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::repositories::{
        ContractRepository, InvoiceRepository, SqlContractRepository, SqlInvoiceRepository,
    };
    use crate::DbPool;

    async fn pool_with_quote() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        sqlx::query("INSERT INTO clients (id, name) VALUES ('C-1', 'Mariana Soto')")
            .execute(&pool)
            .await
            .expect("seed client");
        sqlx::query("INSERT INTO events (id, name, date) VALUES ('E-1', 'Boda', '2026-06-20')")
            .execute(&pool)
            .await
            .expect("seed event");
        sqlx::query(
            "INSERT INTO quotes (id, client_id, event_id, items, taxes, currency,
                                 exchange_rate, total_amount, status, created_at)
             VALUES ('Q-1', 'C-1', 'E-1', '[]', '[]', 'MXN', '1', '10000', 'accepted',
                     '2026-01-15T12:00:00+00:00')",
        )
        .execute(&pool)
        .await
        .expect("seed quote");

        pool
    }

    fn invoice(id: &str, number: &str) -> Invoice {
        Invoice {
            id: InvoiceId(id.to_string()),
            quote_id: QuoteId("Q-1".to_string()),
            client_id: ClientId("C-1".to_string()),
            event_id: EventId("E-1".to_string()),
            invoice_number: number.to_string(),
            items: vec![InvoiceItem {
                description: "Apartado".to_string(),
                amount: Decimal::new(3_500_00, 2),
            }],
            total_amount: Decimal::new(3_500_00, 2),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"),
            status: InvoiceStatus::Pending,
            created_at: Utc::now(),
        }
    }

    fn contract(id: &str, version: u32) -> Contract {
        Contract {
            id: ContractId(id.to_string()),
            quote_id: QuoteId("Q-1".to_string()),
            client_id: ClientId("C-1".to_string()),
            event_id: EventId("E-1".to_string()),
            template_id: TemplateId("tpl-contract".to_string()),
            content: "<h1>Contrato de servicio</h1>".to_string(),
            status: DocumentStatus::Draft,
            document_version: version,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn invoices_append_and_list_in_insertion_order() {
        let repo = SqlInvoiceRepository::new(pool_with_quote().await);
        repo.insert(invoice("I-1", "INV-Q-1-1")).await.expect("insert first");
        repo.insert(invoice("I-2", "INV-Q-1-2")).await.expect("insert second");

        assert!(repo.exists_for_quote(&QuoteId("Q-1".to_string())).await.expect("exists"));

        let listed = repo.list_for_quote(&QuoteId("Q-1".to_string())).await.expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].invoice_number, "INV-Q-1-1");
        assert_eq!(listed[0].total_amount, Decimal::new(3_500_00, 2));
        assert_eq!(listed[0].status, InvoiceStatus::Pending);
    }

    #[tokio::test]
    async fn contract_replace_swaps_the_row_for_the_quote() {
        let repo = SqlContractRepository::new(pool_with_quote().await);
        repo.insert(contract("CT-1", 1)).await.expect("insert v1");
        repo.replace_for_quote(contract("CT-2", 2)).await.expect("replace with v2");

        let loaded = repo
            .find_by_quote(&QuoteId("Q-1".to_string()))
            .await
            .expect("find")
            .expect("contract");
        assert_eq!(loaded.id, ContractId("CT-2".to_string()));
        assert_eq!(loaded.document_version, 2);
    }

    #[tokio::test]
    async fn missing_artifacts_report_absent() {
        let repo = SqlContractRepository::new(pool_with_quote().await);
        assert!(!repo.exists_for_quote(&QuoteId("Q-1".to_string())).await.expect("exists"));
        assert!(repo
            .find_by_quote(&QuoteId("Q-1".to_string()))
            .await
            .expect("find")
            .is_none());
    }
}
