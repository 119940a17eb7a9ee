//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `StorageService` port from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.
//!
//! The adapter performs no authorization: ownership filtering is the web
//! layer's responsibility.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use studylens_core::domain::{
    AiSession, NewAiSession, NewQa, NewSource, Qa, SessionUpdate, Source, SourceType, SourceUpdate,
    SummaryResult, ThemePreference, UpsertUser, User,
};
use studylens_core::ports::{PortError, PortResult, StorageService};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StorageService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found(e: sqlx::Error, what: String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => unexpected(e),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    profile_image_url: Option<String>,
    auth_method: String,
    theme_preference: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            // An unknown stored value falls back to the schema default.
            theme_preference: ThemePreference::parse(&self.theme_preference)
                .unwrap_or(ThemePreference::System),
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            profile_image_url: self.profile_image_url,
            auth_method: self.auth_method,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct SourceRecord {
    id: Uuid,
    user_id: String,
    source_type: String,
    title: String,
    original_link: Option<String>,
    content: Option<String>,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl SourceRecord {
    fn to_domain(self) -> PortResult<Source> {
        let source_type = SourceType::parse(&self.source_type).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown source type tag '{}'", self.source_type))
        })?;
        Ok(Source {
            id: self.id,
            user_id: self.user_id,
            source_type,
            title: self.title,
            original_link: self.original_link,
            content: self.content,
            metadata: self.metadata,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    user_id: String,
    source_id: Uuid,
    summary: serde_json::Value,
    embeddings: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl SessionRecord {
    fn to_domain(self) -> PortResult<AiSession> {
        let summary: SummaryResult = serde_json::from_value(self.summary)
            .map_err(|e| PortError::Unexpected(format!("Malformed stored summary: {}", e)))?;
        Ok(AiSession {
            id: self.id,
            user_id: self.user_id,
            source_id: self.source_id,
            summary,
            embeddings: self.embeddings,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct QaRecord {
    id: Uuid,
    session_id: Uuid,
    question: String,
    answer: String,
    source_chunks: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl QaRecord {
    fn to_domain(self) -> PortResult<Qa> {
        let source_chunks: Vec<String> = serde_json::from_value(self.source_chunks)
            .map_err(|e| PortError::Unexpected(format!("Malformed stored chunks: {}", e)))?;
        Ok(Qa {
            id: self.id,
            session_id: self.session_id,
            question: self.question,
            answer: self.answer,
            source_chunks,
            created_at: self.created_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, profile_image_url, auth_method, theme_preference, \
     created_at, updated_at";
const SOURCE_COLUMNS: &str =
    "id, user_id, source_type, title, original_link, content, metadata, created_at";
const SESSION_COLUMNS: &str = "id, user_id, source_id, summary, embeddings, created_at";
const QA_COLUMNS: &str = "id, session_id, question, answer, source_chunks, created_at";

//=========================================================================================
// `StorageService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StorageService for DbAdapter {
    async fn get_user(&self, id: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, format!("User {} not found", id)))?;

        Ok(record.to_domain())
    }

    async fn upsert_user(&self, user: UpsertUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, email, first_name, last_name, profile_image_url, theme_preference) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'system')) \
             ON CONFLICT (id) DO UPDATE SET \
                 email = COALESCE(EXCLUDED.email, users.email), \
                 first_name = COALESCE(EXCLUDED.first_name, users.first_name), \
                 last_name = COALESCE(EXCLUDED.last_name, users.last_name), \
                 profile_image_url = COALESCE(EXCLUDED.profile_image_url, users.profile_image_url), \
                 theme_preference = COALESCE($6, users.theme_preference), \
                 updated_at = now() \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.profile_image_url)
        .bind(user.theme_preference.map(|t| t.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn create_source(&self, source: NewSource) -> PortResult<Source> {
        let record = sqlx::query_as::<_, SourceRecord>(&format!(
            "INSERT INTO sources (user_id, source_type, title, original_link, content, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {SOURCE_COLUMNS}"
        ))
        .bind(&source.user_id)
        .bind(source.source_type.as_str())
        .bind(&source.title)
        .bind(&source.original_link)
        .bind(&source.content)
        .bind(&source.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        record.to_domain()
    }

    async fn get_source(&self, id: Uuid) -> PortResult<Source> {
        let record = sqlx::query_as::<_, SourceRecord>(&format!(
            "SELECT {SOURCE_COLUMNS} FROM sources WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, format!("Source {} not found", id)))?;

        record.to_domain()
    }

    async fn update_source(&self, id: Uuid, update: SourceUpdate) -> PortResult<Source> {
        let record = sqlx::query_as::<_, SourceRecord>(&format!(
            "UPDATE sources SET \
                 title = COALESCE($2, title), \
                 content = COALESCE($3, content), \
                 metadata = COALESCE($4, metadata) \
             WHERE id = $1 \
             RETURNING {SOURCE_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.content)
        .bind(&update.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, format!("Source {} not found", id)))?;

        record.to_domain()
    }

    async fn delete_source(&self, id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM sources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_session(&self, session: NewAiSession) -> PortResult<AiSession> {
        let summary = serde_json::to_value(&session.summary)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "INSERT INTO ai_sessions (user_id, source_id, summary) \
             VALUES ($1, $2, $3) \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(&session.user_id)
        .bind(session.source_id)
        .bind(summary)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        record.to_domain()
    }

    async fn get_user_sessions(&self, user_id: &str) -> PortResult<Vec<AiSession>> {
        let records = sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {SESSION_COLUMNS} FROM ai_sessions \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_session_with_qas(&self, id: Uuid) -> PortResult<(AiSession, Vec<Qa>)> {
        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {SESSION_COLUMNS} FROM ai_sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, format!("Session {} not found", id)))?;

        let session = record.to_domain()?;
        let qas = self.get_session_qas(id).await?;
        Ok((session, qas))
    }

    async fn update_session(&self, id: Uuid, update: SessionUpdate) -> PortResult<AiSession> {
        let summary = update
            .summary
            .map(|s| serde_json::to_value(&s))
            .transpose()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "UPDATE ai_sessions SET \
                 summary = COALESCE($2, summary), \
                 embeddings = COALESCE($3, embeddings) \
             WHERE id = $1 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id)
        .bind(summary)
        .bind(&update.embeddings)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, format!("Session {} not found", id)))?;

        record.to_domain()
    }

    async fn delete_session(&self, id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM ai_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_qa(&self, qa: NewQa) -> PortResult<Qa> {
        let chunks = serde_json::to_value(&qa.source_chunks)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record = sqlx::query_as::<_, QaRecord>(&format!(
            "INSERT INTO qas (session_id, question, answer, source_chunks) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {QA_COLUMNS}"
        ))
        .bind(qa.session_id)
        .bind(&qa.question)
        .bind(&qa.answer)
        .bind(chunks)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        record.to_domain()
    }

    async fn get_session_qas(&self, session_id: Uuid) -> PortResult<Vec<Qa>> {
        let records = sqlx::query_as::<_, QaRecord>(&format!(
            "SELECT {QA_COLUMNS} FROM qas \
             WHERE session_id = $1 ORDER BY created_at DESC"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
