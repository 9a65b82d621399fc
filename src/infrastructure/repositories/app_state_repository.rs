use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use std::sync::Arc;

pub const SCENES_KEY: &str = "scenes";
pub const LANGUAGE_KEY: &str = "language";
pub const THEME_KEY: &str = "theme";

/// Key/value persistence for application state. Each key is loaded
/// independently so one corrupt value never takes the others down.
pub struct AppStateRepository {
    pool: Arc<DbPool>,
}

impl AppStateRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Get the stored value for a key
    pub async fn load(&self, key: &str) -> AppResult<Option<String>> {
        let pool = self.pool.as_ref();
        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT value
            FROM app_state
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await?;

        Ok(value)
    }

    /// Store a value, replacing whatever was there
    pub async fn save(&self, key: &str, value: &str) -> AppResult<()> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO app_state (key, value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE
            SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Store several values in one transaction; either all are written or none
    pub async fn save_all(&self, entries: &[(&str, &str)]) -> AppResult<()> {
        let now = chrono::Utc::now();
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO app_state (key, value, updated_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (key) DO UPDATE
                SET value = excluded.value, updated_at = excluded.updated_at
                "#,
            )
            .bind(*key)
            .bind(*value)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
