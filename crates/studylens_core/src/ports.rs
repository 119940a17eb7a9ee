//! crates/studylens_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or language-model APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AiSession, NewAiSession, NewQa, NewSource, Qa, QaResult, SessionUpdate, Source, SourceUpdate,
    SummaryResult, UpsertUser, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error taxonomy shared by all port operations.
///
/// The web layer maps these onto HTTP statuses: `Validation` and
/// `UnsupportedFormat` become 400, `NotFound` 404, everything else 500.
/// `ExternalService` messages stay generic so provider details never leak
/// to clients.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Bad input shape, size, or type; user-correctable.
    #[error("{0}")]
    Validation(String),
    /// Missing resource, or one the requester is not allowed to see.
    #[error("{0}")]
    NotFound(String),
    /// A file type the extractor cannot handle.
    #[error("{0}")]
    UnsupportedFormat(String),
    /// Language-model or extraction failure; message is generic by design.
    #[error("{0}")]
    ExternalService(String),
    /// Anything else: database failures, codec failures, bugs.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The session store contract: CRUD plus cascade operations over `Source`,
/// `AiSession`, and `Qa`, and user upserts.
///
/// Ownership checks are deliberately the caller's responsibility; the store
/// performs no authorization of its own.
#[async_trait]
pub trait StorageService: Send + Sync {
    // --- User operations ---
    async fn get_user(&self, id: &str) -> PortResult<User>;

    /// Insert-or-update keyed by id. Used for login provisioning and for
    /// theme-preference updates.
    async fn upsert_user(&self, user: UpsertUser) -> PortResult<User>;

    // --- Source operations ---
    async fn create_source(&self, source: NewSource) -> PortResult<Source>;

    async fn get_source(&self, id: Uuid) -> PortResult<Source>;

    async fn update_source(&self, id: Uuid, update: SourceUpdate) -> PortResult<Source>;

    /// Deletes the source and, by cascade, its dependent sessions and Qas.
    async fn delete_source(&self, id: Uuid) -> PortResult<()>;

    // --- AI session operations ---
    async fn create_session(&self, session: NewAiSession) -> PortResult<AiSession>;

    /// All sessions belonging to a user, newest first.
    async fn get_user_sessions(&self, user_id: &str) -> PortResult<Vec<AiSession>>;

    /// A session joined with its Qa exchanges, newest first.
    async fn get_session_with_qas(&self, id: Uuid) -> PortResult<(AiSession, Vec<Qa>)>;

    async fn update_session(&self, id: Uuid, update: SessionUpdate) -> PortResult<AiSession>;

    /// Deletes the session and, by cascade, its Qa rows.
    async fn delete_session(&self, id: Uuid) -> PortResult<()>;

    // --- Q&A operations ---
    async fn create_qa(&self, qa: NewQa) -> PortResult<Qa>;

    async fn get_session_qas(&self, session_id: Uuid) -> PortResult<Vec<Qa>>;
}

/// Summarizes extracted text into an overview plus ordered key points.
#[async_trait]
pub trait SummarizationService: Send + Sync {
    async fn summarize(&self, content: &str, title: &str) -> PortResult<SummaryResult>;
}

/// Answers a question strictly from a stored source's content.
#[async_trait]
pub trait QuestionAnsweringService: Send + Sync {
    async fn answer(&self, question: &str, content: &str, title: &str) -> PortResult<QaResult>;
}
