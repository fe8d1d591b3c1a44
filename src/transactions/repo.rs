use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Transaction record in the database. `category_id` points at a category
/// owned by the same user; the link is validated at write time and may
/// dangle after that category is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: f64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub description: String,
    pub date: Date,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Transaction row joined with its (possibly deleted) category.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionWithCategory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: f64,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub description: String,
    pub date: Date,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub category_name: Option<String>,
    pub category_kind: Option<String>,
}

impl Transaction {
    pub async fn list_expanded_by_user(
        db: &PgPool,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<TransactionWithCategory>> {
        let rows = sqlx::query_as::<_, TransactionWithCategory>(
            r#"
            SELECT t.id, t.user_id, t.category_id, t.amount, t.type, t.description,
                   t.date, t.created_at, t.updated_at,
                   c.name AS category_name, c.type AS category_kind
            FROM transactions t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = $1
            ORDER BY t.date DESC, t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_expanded(
        db: &PgPool,
        id: Uuid,
    ) -> anyhow::Result<Option<TransactionWithCategory>> {
        let row = sqlx::query_as::<_, TransactionWithCategory>(
            r#"
            SELECT t.id, t.user_id, t.category_id, t.amount, t.type, t.description,
                   t.date, t.created_at, t.updated_at,
                   c.name AS category_name, c.type AS category_kind
            FROM transactions t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, category_id, amount, type, description, date,
                   created_at, updated_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        category_id: Uuid,
        amount: f64,
        kind: &str,
        description: &str,
        date: Date,
    ) -> anyhow::Result<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, category_id, amount, type, description, date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, category_id, amount, type, description, date,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .bind(amount)
        .bind(kind)
        .bind(description)
        .bind(date)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        category_id: Uuid,
        amount: f64,
        kind: &str,
        description: &str,
        date: Date,
    ) -> anyhow::Result<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET category_id = $2, amount = $3, type = $4, description = $5,
                date = $6, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, category_id, amount, type, description, date,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(category_id)
        .bind(amount)
        .bind(kind)
        .bind(description)
        .bind(date)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
