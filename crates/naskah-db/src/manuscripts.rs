//! Manuscript repository implementation.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use naskah_core::{
    CreateManuscriptRequest, Error, Manuscript, ManuscriptRepository, Page, PageRequest, Result,
    UpdateManuscriptRequest,
};

use crate::paging::{search_clause, search_pattern};

/// Columns selected for every manuscript read, in struct order.
const MANUSCRIPT_COLUMNS: &str = "id, title, author, inventory_code, digital_code, status, \
     copyist, copy_year, page_count, ink, category, language, script, size, description, \
     condition, readability, colophon, cover_image_url, external_folder_url, created_at_utc";

/// Searchable columns for the list filter.
const SEARCH_COLUMNS: &[&str] = &["title", "description", "author"];

/// PostgreSQL implementation of ManuscriptRepository.
pub struct PgManuscriptRepository {
    pool: Pool<Postgres>,
}

impl PgManuscriptRepository {
    /// Create a new PgManuscriptRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row(row: PgRow) -> Result<Manuscript> {
    let status: String = row.get("status");
    Ok(Manuscript {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        inventory_code: row.get("inventory_code"),
        digital_code: row.get("digital_code"),
        status: status.parse()?,
        copyist: row.get("copyist"),
        copy_year: row.get("copy_year"),
        page_count: row.get("page_count"),
        ink: row.get("ink"),
        category: row.get("category"),
        language: row.get("language"),
        script: row.get("script"),
        size: row.get("size"),
        description: row.get("description"),
        condition: row.get("condition"),
        readability: row.get("readability"),
        colophon: row.get("colophon"),
        cover_image_url: row.get("cover_image_url"),
        external_folder_url: row.get("external_folder_url"),
        created_at_utc: row.get("created_at_utc"),
    })
}

fn validate_page_count(page_count: i32) -> Result<()> {
    if page_count < 0 {
        return Err(Error::InvalidInput(format!(
            "page_count must be non-negative, got {}",
            page_count
        )));
    }
    Ok(())
}

#[async_trait]
impl ManuscriptRepository for PgManuscriptRepository {
    async fn list(&self, req: PageRequest) -> Result<Page<Manuscript>> {
        req.validate()?;
        let pattern = search_pattern(req.search.as_deref());

        let (total, rows) = match &pattern {
            Some(pattern) => {
                let filter = search_clause(SEARCH_COLUMNS, 1);
                let total: i64 =
                    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM manuscripts WHERE {}", filter))
                        .bind(pattern)
                        .fetch_one(&self.pool)
                        .await
                        .map_err(Error::Database)?;
                let rows = sqlx::query(&format!(
                    "SELECT {} FROM manuscripts WHERE {} ORDER BY created_at_utc DESC, id LIMIT $2 OFFSET $3",
                    MANUSCRIPT_COLUMNS, filter
                ))
                .bind(pattern)
                .bind(req.per_page)
                .bind(req.offset())
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;
                (total, rows)
            }
            None => {
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM manuscripts")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(Error::Database)?;
                let rows = sqlx::query(&format!(
                    "SELECT {} FROM manuscripts ORDER BY created_at_utc DESC, id LIMIT $1 OFFSET $2",
                    MANUSCRIPT_COLUMNS
                ))
                .bind(req.per_page)
                .bind(req.offset())
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;
                (total, rows)
            }
        };

        debug!(
            page = req.page,
            per_page = req.per_page,
            filtered = pattern.is_some(),
            total,
            returned = rows.len(),
            "Listed manuscripts"
        );

        let items = rows.into_iter().map(map_row).collect::<Result<Vec<_>>>()?;
        Ok(Page { items, total })
    }

    async fn get(&self, id: Uuid) -> Result<Option<Manuscript>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM manuscripts WHERE id = $1",
            MANUSCRIPT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(map_row).transpose()
    }

    async fn create(&self, req: CreateManuscriptRequest) -> Result<Manuscript> {
        validate_page_count(req.page_count)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO manuscripts
                (title, author, inventory_code, digital_code, status, copyist, copy_year,
                 page_count, ink, category, language, script, size, description, condition,
                 readability, colophon, cover_image_url, external_folder_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING {}
            "#,
            MANUSCRIPT_COLUMNS
        ))
        .bind(&req.title)
        .bind(&req.author)
        .bind(&req.inventory_code)
        .bind(&req.digital_code)
        .bind(req.status.as_str())
        .bind(&req.copyist)
        .bind(req.copy_year)
        .bind(req.page_count)
        .bind(&req.ink)
        .bind(&req.category)
        .bind(&req.language)
        .bind(&req.script)
        .bind(&req.size)
        .bind(&req.description)
        .bind(&req.condition)
        .bind(&req.readability)
        .bind(&req.colophon)
        .bind(&req.cover_image_url)
        .bind(&req.external_folder_url)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        map_row(row)
    }

    async fn update(&self, id: Uuid, req: UpdateManuscriptRequest) -> Result<Manuscript> {
        if let Some(page_count) = req.page_count {
            validate_page_count(page_count)?;
        }

        // Build dynamic update query
        let mut updates = Vec::new();
        let mut param_count = 1;

        let mut push_update = |field: &str| {
            updates.push(format!("{} = ${}", field, param_count));
            param_count += 1;
        };

        if req.title.is_some() {
            push_update("title");
        }
        if req.author.is_some() {
            push_update("author");
        }
        if req.inventory_code.is_some() {
            push_update("inventory_code");
        }
        if req.digital_code.is_some() {
            push_update("digital_code");
        }
        if req.status.is_some() {
            push_update("status");
        }
        if req.copyist.is_some() {
            push_update("copyist");
        }
        if req.copy_year.is_some() {
            push_update("copy_year");
        }
        if req.page_count.is_some() {
            push_update("page_count");
        }
        if req.ink.is_some() {
            push_update("ink");
        }
        if req.category.is_some() {
            push_update("category");
        }
        if req.language.is_some() {
            push_update("language");
        }
        if req.script.is_some() {
            push_update("script");
        }
        if req.size.is_some() {
            push_update("size");
        }
        if req.description.is_some() {
            push_update("description");
        }
        if req.condition.is_some() {
            push_update("condition");
        }
        if req.readability.is_some() {
            push_update("readability");
        }
        if req.colophon.is_some() {
            push_update("colophon");
        }
        if req.cover_image_url.is_some() {
            push_update("cover_image_url");
        }
        if req.external_folder_url.is_some() {
            push_update("external_folder_url");
        }

        if updates.is_empty() {
            // Nothing to change; return the current row
            return self
                .get(id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Manuscript {} not found", id)));
        }

        let query = format!(
            "UPDATE manuscripts SET {} WHERE id = ${} RETURNING {}",
            updates.join(", "),
            param_count,
            MANUSCRIPT_COLUMNS
        );

        let mut q = sqlx::query(&query);

        if let Some(title) = &req.title {
            q = q.bind(title);
        }
        if let Some(author) = &req.author {
            q = q.bind(author);
        }
        if let Some(inventory_code) = &req.inventory_code {
            q = q.bind(inventory_code);
        }
        if let Some(digital_code) = &req.digital_code {
            q = q.bind(digital_code);
        }
        if let Some(status) = req.status {
            q = q.bind(status.as_str());
        }
        if let Some(copyist) = &req.copyist {
            q = q.bind(copyist);
        }
        if let Some(copy_year) = req.copy_year {
            q = q.bind(copy_year);
        }
        if let Some(page_count) = req.page_count {
            q = q.bind(page_count);
        }
        if let Some(ink) = &req.ink {
            q = q.bind(ink);
        }
        if let Some(category) = &req.category {
            q = q.bind(category);
        }
        if let Some(language) = &req.language {
            q = q.bind(language);
        }
        if let Some(script) = &req.script {
            q = q.bind(script);
        }
        if let Some(size) = &req.size {
            q = q.bind(size);
        }
        if let Some(description) = &req.description {
            q = q.bind(description);
        }
        if let Some(condition) = &req.condition {
            q = q.bind(condition);
        }
        if let Some(readability) = &req.readability {
            q = q.bind(readability);
        }
        if let Some(colophon) = &req.colophon {
            q = q.bind(colophon);
        }
        if let Some(cover_image_url) = &req.cover_image_url {
            q = q.bind(cover_image_url);
        }
        if let Some(external_folder_url) = &req.external_folder_url {
            q = q.bind(external_folder_url);
        }

        let row = q
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("Manuscript {} not found", id)))?;

        map_row(row)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM manuscripts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_page_count() {
        assert!(validate_page_count(0).is_ok());
        assert!(validate_page_count(340).is_ok());
        assert!(matches!(
            validate_page_count(-1),
            Err(Error::InvalidInput(_))
        ));
    }
}
