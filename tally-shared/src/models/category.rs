/// Category model and database operations
///
/// A category is either global (`owner_id` is NULL, usable by everyone) or
/// private to a single user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     owner_id UUID REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Expense category
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Owning user; None for global categories
    pub owner_id: Option<Uuid>,

    /// When the category was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a private category
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategory {
    /// Category name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

impl Category {
    /// Builds a category value without touching the database
    pub fn new(name: impl Into<String>, owner_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner_id,
            created_at: Utc::now(),
        }
    }

    /// Checks whether the category is shared by all users
    pub fn is_global(&self) -> bool {
        self.owner_id.is_none()
    }

    /// Checks whether `user_id` may see and use this category
    pub fn is_usable_by(&self, user_id: Uuid) -> bool {
        match self.owner_id {
            None => true,
            Some(owner) => owner == user_id,
        }
    }

    /// Creates a category
    pub async fn create(
        pool: &PgPool,
        owner_id: Option<Uuid>,
        data: &CreateCategory,
    ) -> Result<Self, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(&data.name)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    /// Finds a category by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, owner_id, created_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Lists the global categories plus the user's private ones
    pub async fn list_usable_by(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, owner_id, created_at
            FROM categories
            WHERE owner_id IS NULL OR owner_id = $1
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }
}
