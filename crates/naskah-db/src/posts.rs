//! Journal post repository implementation.
//!
//! Posts carry their comments inlined. The comments collection is
//! append-only through `add_comment`; post create/update never touch it.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use naskah_core::{
    Comment, CreateCommentRequest, CreatePostRequest, Error, Page, PageRequest, Post,
    PostRepository, Result, UpdatePostRequest,
};

use crate::paging::{search_clause, search_pattern};

const POST_COLUMNS: &str = "id, title, author, summary, content, image_url, created_at_utc";

const COMMENT_COLUMNS: &str = "id, post_id, author, text, created_at_utc";

/// Searchable columns for the list filter.
const SEARCH_COLUMNS: &[&str] = &["title", "summary", "author"];

/// PostgreSQL implementation of PostRepository.
pub struct PgPostRepository {
    pool: Pool<Postgres>,
}

impl PgPostRepository {
    /// Create a new PgPostRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Check whether a post exists.
    async fn exists(&self, id: Uuid) -> Result<bool> {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM blog_posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(found.is_some())
    }

    /// Fetch the comments for a set of posts, oldest first, grouped by
    /// owning post.
    async fn comments_for(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Comment>>> {
        let mut grouped: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(grouped);
        }

        let rows = sqlx::query(&format!(
            "SELECT {} FROM comments WHERE post_id = ANY($1) ORDER BY created_at_utc ASC, id",
            COMMENT_COLUMNS
        ))
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        for row in rows {
            let comment = map_comment_row(row);
            grouped.entry(comment.post_id).or_default().push(comment);
        }
        Ok(grouped)
    }
}

fn map_post_row(row: PgRow) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        summary: row.get("summary"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        created_at_utc: row.get("created_at_utc"),
        comments: Vec::new(),
    }
}

fn map_comment_row(row: PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author: row.get("author"),
        text: row.get("text"),
        created_at_utc: row.get("created_at_utc"),
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn list(&self, req: PageRequest) -> Result<Page<Post>> {
        req.validate()?;
        let pattern = search_pattern(req.search.as_deref());

        let (total, rows) = match &pattern {
            Some(pattern) => {
                let filter = search_clause(SEARCH_COLUMNS, 1);
                let total: i64 =
                    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM blog_posts WHERE {}", filter))
                        .bind(pattern)
                        .fetch_one(&self.pool)
                        .await
                        .map_err(Error::Database)?;
                let rows = sqlx::query(&format!(
                    "SELECT {} FROM blog_posts WHERE {} ORDER BY created_at_utc DESC, id LIMIT $2 OFFSET $3",
                    POST_COLUMNS, filter
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
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_posts")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(Error::Database)?;
                let rows = sqlx::query(&format!(
                    "SELECT {} FROM blog_posts ORDER BY created_at_utc DESC, id LIMIT $1 OFFSET $2",
                    POST_COLUMNS
                ))
                .bind(req.per_page)
                .bind(req.offset())
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;
                (total, rows)
            }
        };

        let mut posts: Vec<Post> = rows.into_iter().map(map_post_row).collect();
        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let mut grouped = self.comments_for(&post_ids).await?;
        for post in &mut posts {
            if let Some(comments) = grouped.remove(&post.id) {
                post.comments = comments;
            }
        }

        debug!(
            page = req.page,
            per_page = req.per_page,
            filtered = pattern.is_some(),
            total,
            returned = posts.len(),
            "Listed posts"
        );

        Ok(Page {
            items: posts,
            total,
        })
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM blog_posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut post = map_post_row(row);
        let mut grouped = self.comments_for(&[post.id]).await?;
        if let Some(comments) = grouped.remove(&post.id) {
            post.comments = comments;
        }
        Ok(Some(post))
    }

    async fn create(&self, req: CreatePostRequest) -> Result<Post> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO blog_posts (title, author, summary, content, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(&req.title)
        .bind(&req.author)
        .bind(&req.summary)
        .bind(&req.content)
        .bind(&req.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_post_row(row))
    }

    async fn update(&self, id: Uuid, req: UpdatePostRequest) -> Result<Post> {
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
        if req.summary.is_some() {
            push_update("summary");
        }
        if req.content.is_some() {
            push_update("content");
        }
        if req.image_url.is_some() {
            push_update("image_url");
        }

        if updates.is_empty() {
            // Nothing to change; return the current row
            return self
                .get(id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Post {} not found", id)));
        }

        let query = format!(
            "UPDATE blog_posts SET {} WHERE id = ${} RETURNING {}",
            updates.join(", "),
            param_count,
            POST_COLUMNS
        );

        let mut q = sqlx::query(&query);

        if let Some(title) = &req.title {
            q = q.bind(title);
        }
        if let Some(author) = &req.author {
            q = q.bind(author);
        }
        if let Some(summary) = &req.summary {
            q = q.bind(summary);
        }
        if let Some(content) = &req.content {
            q = q.bind(content);
        }
        if let Some(image_url) = &req.image_url {
            q = q.bind(image_url);
        }

        let row = q
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("Post {} not found", id)))?;

        let mut post = map_post_row(row);

        let mut grouped = self.comments_for(&[post.id]).await?;
        if let Some(comments) = grouped.remove(&post.id) {
            post.comments = comments;
        }
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn add_comment(&self, post_id: Uuid, req: CreateCommentRequest) -> Result<Comment> {
        // A comment must never exist without its parent post
        if !self.exists(post_id).await? {
            return Err(Error::NotFound(format!("Post {} not found", post_id)));
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO comments (post_id, author, text)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(post_id)
        .bind(&req.author)
        .bind(&req.text)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(%post_id, "Appended comment");
        Ok(map_comment_row(row))
    }
}
