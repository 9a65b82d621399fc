use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/webm";

#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlob {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Blob store for recorded audio, keyed by opaque strings.
///
/// Writes are last-write-wins per key; no transactional guarantees beyond that.
#[async_trait]
pub trait AudioRepository: Send + Sync {
    async fn save(&self, key: &str, blob: &AudioBlob) -> Result<(), String>;

    async fn get(&self, key: &str) -> Result<Option<AudioBlob>, String>;

    /// Deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), String>;
}

/// SQLite-backed audio store
pub struct SqliteAudioRepository {
    pool: Arc<DbPool>,
}

impl SqliteAudioRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AudioRepository for SqliteAudioRepository {
    async fn save(&self, key: &str, blob: &AudioBlob) -> Result<(), String> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO audio_blobs (key, content_type, data, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key) DO UPDATE
            SET content_type = excluded.content_type,
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&blob.content_type)
        .bind(&blob.data)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, key = key, "Failed to save audio blob");
            format!("audio store error: {}", e)
        })?;

        tracing::debug!(key = key, size = blob.data.len(), "Audio blob saved");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<AudioBlob>, String> {
        let pool = self.pool.as_ref();
        let row = sqlx::query_as::<_, (String, Vec<u8>)>(
            r#"
            SELECT content_type, data
            FROM audio_blobs
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| format!("audio store error: {}", e))?;

        Ok(row.map(|(content_type, data)| AudioBlob { content_type, data }))
    }

    async fn delete(&self, key: &str) -> Result<(), String> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            DELETE FROM audio_blobs
            WHERE key = $1
            "#,
        )
        .bind(key)
        .execute(pool)
        .await
        .map_err(|e| format!("audio store error: {}", e))?;

        Ok(())
    }
}
