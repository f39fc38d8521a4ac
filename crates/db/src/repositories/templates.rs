//! SQLite repositories for document templates and payment-schedule templates.

use sqlx::Row;

use banquet_core::domain::documents::{DocumentTemplate, TemplateId};
use banquet_core::domain::schedule::{PaymentMilestone, PaymentSchedule, ScheduleId};

use super::codec;
use super::{RepositoryError, ScheduleRepository, TemplateRepository};
use crate::DbPool;

pub struct SqlTemplateRepository {
    pool: DbPool,
}

impl SqlTemplateRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TemplateRepository for SqlTemplateRepository {
    async fn find_by_id(
        &self,
        id: &TemplateId,
    ) -> Result<Option<DocumentTemplate>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, content FROM document_templates WHERE id = ?1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(DocumentTemplate {
                id: TemplateId(row.try_get("id")?),
                name: row.try_get("name")?,
                content: row.try_get("content")?,
            })
        })
        .transpose()
    }

    async fn save(&self, template: DocumentTemplate) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO document_templates (id, name, content) VALUES (?1, ?2, ?3)",
        )
        .bind(&template.id.0)
        .bind(&template.name)
        .bind(&template.content)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

pub struct SqlScheduleRepository {
    pool: DbPool,
}

impl SqlScheduleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ScheduleRepository for SqlScheduleRepository {
    async fn find_by_id(
        &self,
        id: &ScheduleId,
    ) -> Result<Option<PaymentSchedule>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, milestones FROM payment_schedules WHERE id = ?1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            let milestones: Vec<PaymentMilestone> =
                codec::parse_json(&row.try_get::<String, _>("milestones")?, "milestones")?;
            Ok(PaymentSchedule {
                id: ScheduleId(row.try_get("id")?),
                name: row.try_get("name")?,
                milestones,
            })
        })
        .transpose()
    }

    async fn save(&self, schedule: PaymentSchedule) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO payment_schedules (id, name, milestones) VALUES (?1, ?2, ?3)",
        )
        .bind(&schedule.id.0)
        .bind(&schedule.name)
        .bind(codec::to_json(&schedule.milestones, "milestones")?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
