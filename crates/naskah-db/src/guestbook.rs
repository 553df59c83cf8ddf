//! Guestbook repository implementation.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use naskah_core::{
    CreateGuestbookEntryRequest, Error, GuestbookEntry, GuestbookRepository, Page, PageRequest,
    Result,
};

const ENTRY_COLUMNS: &str = "id, name, message, created_at_utc";

/// PostgreSQL implementation of GuestbookRepository.
pub struct PgGuestbookRepository {
    pool: Pool<Postgres>,
}

impl PgGuestbookRepository {
    /// Create a new PgGuestbookRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row(row: PgRow) -> GuestbookEntry {
    GuestbookEntry {
        id: row.get("id"),
        name: row.get("name"),
        message: row.get("message"),
        created_at_utc: row.get("created_at_utc"),
    }
}

#[async_trait]
impl GuestbookRepository for PgGuestbookRepository {
    async fn list(&self, page: i64, per_page: i64) -> Result<Page<GuestbookEntry>> {
        let req = PageRequest::new(page, per_page);
        req.validate()?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM guestbook_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM guestbook_entries ORDER BY created_at_utc DESC, id LIMIT $1 OFFSET $2",
            ENTRY_COLUMNS
        ))
        .bind(per_page)
        .bind(req.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(page, per_page, total, returned = rows.len(), "Listed guestbook entries");

        Ok(Page {
            items: rows.into_iter().map(map_row).collect(),
            total,
        })
    }

    async fn create(&self, req: CreateGuestbookEntryRequest) -> Result<GuestbookEntry> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO guestbook_entries (name, message)
            VALUES ($1, $2)
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(&req.name)
        .bind(&req.message)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_row(row))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM guestbook_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
