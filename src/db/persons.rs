//! Person persistence. The resource is read-only: a single lookup of the
//! default row.

use async_trait::async_trait;

use super::models::Person;
use super::DbPool;

#[async_trait]
pub trait PersonRepository: Send + Sync {
    async fn get_default(&self) -> Result<Option<Person>, sqlx::Error>;
}

pub struct SqlitePersonRepository {
    pool: DbPool,
}

impl SqlitePersonRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonRepository for SqlitePersonRepository {
    async fn get_default(&self) -> Result<Option<Person>, sqlx::Error> {
        sqlx::query_as("SELECT name FROM persons LIMIT 1")
            .fetch_optional(&self.pool)
            .await
    }
}
