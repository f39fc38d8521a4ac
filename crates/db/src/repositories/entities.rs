//! SQLite repositories for the parties and venues a booking references.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use banquet_core::domain::event::{Event, EventId, Venue, VenueId};
use banquet_core::domain::party::{Client, ClientId, Planner, PlannerId};

use super::codec;
use super::{ClientRepository, EventRepository, PlannerRepository, RepositoryError, VenueRepository};
use crate::DbPool;

pub struct SqlClientRepository {
    pool: DbPool,
}

impl SqlClientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ClientRepository for SqlClientRepository {
    async fn find_by_id(&self, id: &ClientId) -> Result<Option<Client>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, email, phone, address FROM clients WHERE id = ?1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Client {
                id: ClientId(row.try_get("id")?),
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                phone: row.try_get("phone")?,
                address: row.try_get("address")?,
            })
        })
        .transpose()
    }

    async fn save(&self, client: Client) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO clients (id, name, email, phone, address)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&client.id.0)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

pub struct SqlPlannerRepository {
    pool: DbPool,
}

impl SqlPlannerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PlannerRepository for SqlPlannerRepository {
    async fn find_by_id(&self, id: &PlannerId) -> Result<Option<Planner>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, email, phone FROM planners WHERE id = ?1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Planner {
                id: PlannerId(row.try_get("id")?),
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                phone: row.try_get("phone")?,
            })
        })
        .transpose()
    }

    async fn save(&self, planner: Planner) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO planners (id, name, email, phone) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&planner.id.0)
        .bind(&planner.name)
        .bind(&planner.email)
        .bind(&planner.phone)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

pub struct SqlVenueRepository {
    pool: DbPool,
}

impl SqlVenueRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VenueRepository for SqlVenueRepository {
    async fn find_by_id(&self, id: &VenueId) -> Result<Option<Venue>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, address FROM venues WHERE id = ?1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Venue {
                id: VenueId(row.try_get("id")?),
                name: row.try_get("name")?,
                address: row.try_get("address")?,
            })
        })
        .transpose()
    }

    async fn save(&self, venue: Venue) -> Result<(), RepositoryError> {
        sqlx::query("INSERT OR REPLACE INTO venues (id, name, address) VALUES (?1, ?2, ?3)")
            .bind(&venue.id.0)
            .bind(&venue.name)
            .bind(&venue.address)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

pub struct SqlEventRepository {
    pool: DbPool,
}

impl SqlEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EventRepository for SqlEventRepository {
    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, date, guest_count, venue_id, planner_id FROM events WHERE id = ?1",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(decode_event).transpose()
    }

    async fn save(&self, event: Event) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO events (id, name, date, guest_count, venue_id, planner_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&event.id.0)
        .bind(&event.name)
        .bind(codec::format_date(event.date))
        .bind(event.guest_count.map(|count| count as i64))
        .bind(event.venue_id.as_ref().map(|id| id.0.clone()))
        .bind(event.planner_id.as_ref().map(|id| id.0.clone()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn decode_event(row: SqliteRow) -> Result<Event, RepositoryError> {
    Ok(Event {
        id: EventId(row.try_get("id")?),
        name: row.try_get("name")?,
        date: codec::parse_date(&row.try_get::<String, _>("date")?, "date")?,
        guest_count: row.try_get::<Option<i64>, _>("guest_count")?.map(|count| count as u32),
        venue_id: row.try_get::<Option<String>, _>("venue_id")?.map(VenueId),
        planner_id: row.try_get::<Option<String>, _>("planner_id")?.map(PlannerId),
    })
}
