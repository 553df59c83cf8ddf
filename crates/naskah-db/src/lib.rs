//! # naskah-db
//!
//! PostgreSQL database layer for the naskah content layer.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for manuscripts, journal posts (with
//!   comments), and guestbook entries
//! - Offset pagination with total counts and case-insensitive substring
//!   search filters
//!
//! ## Example
//!
//! ```rust,ignore
//! use naskah_db::{Database, ManuscriptRepository, PageRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/naskah").await?;
//!
//!     let page = db
//!         .manuscripts
//!         .list(PageRequest::new(1, 20).with_search("babad"))
//!         .await?;
//!
//!     println!("{} of {} manuscripts", page.items.len(), page.total);
//!     Ok(())
//! }
//! ```

pub mod guestbook;
pub mod manuscripts;
pub mod paging;
pub mod pool;
pub mod posts;

// Re-export core types
pub use naskah_core::*;

// Re-export repository implementations
pub use guestbook::PgGuestbookRepository;
pub use manuscripts::PgManuscriptRepository;
pub use paging::{escape_like, search_pattern};
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use posts::PgPostRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Manuscript repository.
    pub manuscripts: PgManuscriptRepository,
    /// Journal post repository (comments included).
    pub posts: PgPostRepository,
    /// Guestbook repository.
    pub guestbook: PgGuestbookRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            manuscripts: PgManuscriptRepository::new(pool.clone()),
            posts: PgPostRepository::new(pool.clone()),
            guestbook: PgGuestbookRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
