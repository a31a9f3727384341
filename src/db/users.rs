//! User persistence: the repository contract and its SQLite implementation.
//!
//! Lookups return `Option<User>` so absence is explicit at the type level;
//! callers that care about the difference between "not found" and a storage
//! failure handle each arm themselves.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::models::User;
use super::DbPool;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Assigns an id and creation timestamps when the
    /// caller left them empty.
    async fn create(&self, user: &mut User) -> Result<(), sqlx::Error>;
    async fn get_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    /// Update an existing user, refreshing `updated_at`.
    async fn update(&self, user: &mut User) -> Result<(), sqlx::Error>;
    async fn delete(&self, id: &str) -> Result<(), sqlx::Error>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error>;
}

pub struct SqliteUserRepository {
    pool: DbPool,
}

impl SqliteUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, full_name, username, email, phone, password_hash, avatar_url, \
     role, status, last_login, email_verified, phone_verified, created_at, updated_at";

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &mut User) -> Result<(), sqlx::Error> {
        if user.id.is_empty() {
            user.id = Uuid::new_v4().to_string();
        }
        let now = Utc::now().to_rfc3339();
        if user.created_at.is_empty() {
            user.created_at = now.clone();
        }
        if user.updated_at.is_empty() {
            user.updated_at = now;
        }

        sqlx::query(
            "INSERT INTO users (id, full_name, username, email, phone, password_hash, avatar_url, \
             role, status, email_verified, phone_verified, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(&user.avatar_url)
        .bind(&user.role)
        .bind(&user.status)
        .bind(user.email_verified)
        .bind(user.phone_verified)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update(&self, user: &mut User) -> Result<(), sqlx::Error> {
        user.updated_at = Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE users SET full_name = ?, username = ?, email = ?, phone = ?, avatar_url = ?, \
             role = ?, status = ?, email_verified = ?, phone_verified = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.avatar_url)
        .bind(&user.role)
        .bind(&user.status)
        .bind(user.email_verified)
        .bind(user.phone_verified)
        .bind(&user.updated_at)
        .bind(&user.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn sample_user(email: &str) -> User {
        User {
            full_name: "Jane Doe".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: "user".to_string(),
            status: "active".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let repo = SqliteUserRepository::new(db::connect_test().await);

        let mut user = sample_user("jane@example.com");
        repo.create(&mut user).await.unwrap();

        assert!(!user.id.is_empty());
        assert!(!user.created_at.is_empty());
        assert_eq!(user.created_at, user.updated_at);

        let stored = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "jane@example.com");
        assert_eq!(stored.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_get_by_email_absent_is_none() {
        let repo = SqliteUserRepository::new(db::connect_test().await);
        let found = repo.get_by_email("nobody@example.com").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = SqliteUserRepository::new(db::connect_test().await);

        let mut first = sample_user("dup@example.com");
        repo.create(&mut first).await.unwrap();

        let mut second = sample_user("dup@example.com");
        assert!(repo.create(&mut second).await.is_err());
    }

    #[tokio::test]
    async fn test_update_refreshes_updated_at() {
        let repo = SqliteUserRepository::new(db::connect_test().await);

        let mut user = sample_user("jane@example.com");
        repo.create(&mut user).await.unwrap();
        let created_at = user.created_at.clone();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        user.full_name = "Jane Q. Doe".to_string();
        repo.update(&mut user).await.unwrap();

        let stored = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.full_name, "Jane Q. Doe");
        assert_eq!(stored.created_at, created_at);
        assert_ne!(stored.updated_at, created_at);
    }

    #[tokio::test]
    async fn test_delete_and_list_pagination() {
        let repo = SqliteUserRepository::new(db::connect_test().await);

        for i in 0..3 {
            let mut user = sample_user(&format!("user{i}@example.com"));
            repo.create(&mut user).await.unwrap();
        }

        let page = repo.list(2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        let rest = repo.list(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);

        let victim = repo.get_by_email("user0@example.com").await.unwrap().unwrap();
        repo.delete(&victim.id).await.unwrap();
        assert!(repo.get_by_id(&victim.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_username() {
        let repo = SqliteUserRepository::new(db::connect_test().await);

        let mut user = sample_user("jane@example.com");
        user.username = Some("janed".to_string());
        repo.create(&mut user).await.unwrap();

        let found = repo.get_by_username("janed").await.unwrap().unwrap();
        assert_eq!(found.email, "jane@example.com");
        assert!(repo.get_by_username("ghost").await.unwrap().is_none());
    }
}
