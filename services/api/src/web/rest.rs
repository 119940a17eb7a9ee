//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Each handler runs one sequential pipeline (extract -> summarize ->
//! persist, or fetch -> answer -> persist). There is no retry and no
//! compensation: if a late step fails the client sees the mapped error and
//! earlier writes stand.

use crate::web::authz::authorize;
use crate::web::middleware::AuthClaims;
use crate::web::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studylens_core::domain::{
    AiSession, NewAiSession, NewQa, NewSource, Qa, Source, SummaryResult, ThemePreference,
    UpsertUser, User,
};
use studylens_core::extract::UploadedFile;
use studylens_core::ports::{PortError, PortResult, StorageService};
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_current_user_handler,
        upload_handler,
        youtube_handler,
        ask_handler,
        list_sessions_handler,
        get_session_handler,
        delete_session_handler,
        update_theme_handler,
    ),
    components(schemas(YoutubeRequest, AskRequest, ThemeRequest)),
    tags(
        (name = "StudyLens API", description = "Content ingestion, summarization, and Q&A endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Wraps a `PortError` so it can be rendered as an HTTP response.
///
/// Every failure becomes a JSON `{"message": ...}` body; 5xx causes are
/// logged server-side and `Unexpected` details are never sent to clients.
#[derive(Debug)]
pub struct WebError(pub PortError);

impl From<PortError> for WebError {
    fn from(err: PortError) -> Self {
        WebError(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            PortError::Validation(message) | PortError::UnsupportedFormat(message) => {
                (StatusCode::BAD_REQUEST, message)
            }
            PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            PortError::ExternalService(message) => {
                error!("External service failure: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            PortError::Unexpected(detail) => {
                error!("Unexpected failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

//=========================================================================================
// API Request and Response Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct YoutubeRequest {
    pub url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub session_id: Option<String>,
    pub question: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ThemeRequest {
    pub theme: Option<String>,
}

/// Returned by both ingestion endpoints once the pipeline completes.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub source: Source,
    pub ai_session: AiSession,
    pub summary: SummaryResult,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub qa: Qa,
    pub answer: String,
    pub source_chunks: Vec<String>,
    pub confidence: f64,
}

#[derive(Serialize)]
pub struct SessionWithSource {
    #[serde(flatten)]
    pub session: AiSession,
    pub source: Option<Source>,
}

#[derive(Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: AiSession,
    pub qas: Vec<Qa>,
    pub source: Option<Source>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct ThemeResponse {
    pub theme: ThemePreference,
}

//=========================================================================================
// Shared Handler Helpers
//=========================================================================================

/// Upserts the authenticated user from their claims. Doubles as first-login
/// provisioning, so rows exist before any source references them.
async fn provision_user(
    state: &AppState,
    claims: &AuthClaims,
    theme: Option<ThemePreference>,
) -> PortResult<User> {
    state
        .storage
        .upsert_user(UpsertUser {
            id: claims.user_id.clone(),
            email: claims.email.clone(),
            first_name: claims.first_name.clone(),
            last_name: claims.last_name.clone(),
            profile_image_url: claims.profile_image_url.clone(),
            theme_preference: theme,
        })
        .await
}

/// Fetches the source behind a session, tolerating a missing row the way
/// the listing endpoints expect (the session is still shown).
async fn source_for(storage: &dyn StorageService, source_id: Uuid) -> PortResult<Option<Source>> {
    match storage.get_source(source_id).await {
        Ok(source) => Ok(Some(source)),
        Err(PortError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn parse_session_id(raw: &str) -> Result<Uuid, WebError> {
    Uuid::parse_str(raw)
        .map_err(|_| WebError(PortError::NotFound("Session not found".to_string())))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Returns the authenticated user's profile, provisioning it on first call.
#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = "StudyLens API",
    responses(
        (status = 200, description = "The authenticated user"),
        (status = 401, description = "Missing identity headers"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_current_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<User>, WebError> {
    let user = provision_user(&state, &claims, None).await?;
    Ok(Json(user))
}

/// Ingests an uploaded document: validate, extract text, summarize, persist.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "StudyLens API",
    request_body(content_type = "multipart/form-data", description = "A `file` part holding the document."),
    responses(
        (status = 200, description = "Source and session created with the generated summary"),
        (status = 400, description = "Missing file, oversized upload, or unsupported type"),
        (status = 500, description = "Extraction or summarization failure")
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, WebError> {
    let mut file: Option<UploadedFile> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        WebError(PortError::Validation(format!(
            "Failed to read multipart data: {}",
            e
        )))
    })? {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or("untitled.txt").to_string();
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| WebError(PortError::Unexpected(e.to_string())))?;
            file = Some(UploadedFile {
                name,
                mime_type,
                bytes,
            });
            break;
        }
    }
    let file = file.ok_or_else(|| WebError(PortError::Validation("No file provided".to_string())))?;

    state.extractor.validate(&file)?;
    let extracted = state.extractor.extract(&file)?;

    provision_user(&state, &claims, None).await?;
    let metadata = serde_json::to_value(&extracted.metadata)
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
    let source = state
        .storage
        .create_source(NewSource {
            user_id: claims.user_id.clone(),
            source_type: state.extractor.source_type(&file),
            title: file.name.clone(),
            original_link: None,
            content: Some(extracted.text.clone()),
            metadata: Some(metadata),
        })
        .await?;

    let summary = state.summarizer.summarize(&extracted.text, &file.name).await?;
    let ai_session = state
        .storage
        .create_session(NewAiSession {
            user_id: claims.user_id.clone(),
            source_id: source.id,
            summary: summary.clone(),
        })
        .await?;

    Ok(Json(IngestResponse {
        source,
        ai_session,
        summary,
    }))
}

/// Ingests a YouTube link: validate the URL shape, resolve the placeholder
/// transcript, summarize, persist.
#[utoipa::path(
    post,
    path = "/api/youtube",
    tag = "StudyLens API",
    request_body = YoutubeRequest,
    responses(
        (status = 200, description = "Source and session created with the generated summary"),
        (status = 400, description = "Missing or invalid YouTube URL"),
        (status = 500, description = "Summarization failure")
    )
)]
pub async fn youtube_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Json(req): Json<YoutubeRequest>,
) -> Result<Json<IngestResponse>, WebError> {
    let url = req
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| WebError(PortError::Validation("YouTube URL is required".to_string())))?;

    let resolved = state.resolver.placeholder_transcript(&url)?;
    let title = resolved.metadata.title.clone();

    provision_user(&state, &claims, None).await?;
    let metadata = serde_json::to_value(&resolved.metadata)
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
    let source = state
        .storage
        .create_source(NewSource {
            user_id: claims.user_id.clone(),
            source_type: studylens_core::domain::SourceType::Youtube,
            title: title.clone(),
            original_link: Some(url),
            content: Some(resolved.transcript.clone()),
            metadata: Some(metadata),
        })
        .await?;

    let summary = state
        .summarizer
        .summarize(&resolved.transcript, &title)
        .await?;
    let ai_session = state
        .storage
        .create_session(NewAiSession {
            user_id: claims.user_id.clone(),
            source_id: source.id,
            summary: summary.clone(),
        })
        .await?;

    Ok(Json(IngestResponse {
        source,
        ai_session,
        summary,
    }))
}

/// Answers a question from a stored session's source content and appends
/// the exchange to the session.
#[utoipa::path(
    post,
    path = "/api/ask",
    tag = "StudyLens API",
    request_body = AskRequest,
    responses(
        (status = 200, description = "The answer with supporting excerpts and confidence"),
        (status = 400, description = "Missing session id or question"),
        (status = 404, description = "Session or source not found, or not owned by the caller"),
        (status = 500, description = "Answering failure")
    )
)]
pub async fn ask_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, WebError> {
    let (session_id, question) = match (req.session_id, req.question) {
        (Some(id), Some(q)) if !q.trim().is_empty() => (id, q),
        _ => {
            return Err(WebError(PortError::Validation(
                "Session ID and question are required".to_string(),
            )))
        }
    };
    let session_id = parse_session_id(&session_id)?;

    let (session, _qas) = state.storage.get_session_with_qas(session_id).await?;
    authorize(&claims.user_id, &session)?;

    let source = state.storage.get_source(session.source_id).await?;

    let qa_result = state
        .answerer
        .answer(&question, source.content.as_deref().unwrap_or(""), &source.title)
        .await?;

    let qa = state
        .storage
        .create_qa(NewQa {
            session_id,
            question,
            answer: qa_result.answer.clone(),
            source_chunks: qa_result.source_chunks.clone(),
        })
        .await?;

    Ok(Json(AskResponse {
        qa,
        answer: qa_result.answer,
        source_chunks: qa_result.source_chunks,
        confidence: qa_result.confidence,
    }))
}

/// Lists the caller's sessions, newest first, each joined with its source.
#[utoipa::path(
    get,
    path = "/api/sessions",
    tag = "StudyLens API",
    responses(
        (status = 200, description = "The caller's sessions, newest first"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<Vec<SessionWithSource>>, WebError> {
    let sessions = state.storage.get_user_sessions(&claims.user_id).await?;

    let mut joined = Vec::with_capacity(sessions.len());
    for session in sessions {
        let source = source_for(state.storage.as_ref(), session.source_id).await?;
        joined.push(SessionWithSource { session, source });
    }

    Ok(Json(joined))
}

/// Returns one owned session with its source and Q&A history.
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    tag = "StudyLens API",
    params(("id" = String, Path, description = "The session id")),
    responses(
        (status = 200, description = "The session with its source and Q&A exchanges"),
        (status = 404, description = "Session not found or not owned by the caller"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<String>,
) -> Result<Json<SessionDetail>, WebError> {
    let session_id = parse_session_id(&id)?;

    let (session, qas) = state.storage.get_session_with_qas(session_id).await?;
    authorize(&claims.user_id, &session)?;

    let source = source_for(state.storage.as_ref(), session.source_id).await?;

    Ok(Json(SessionDetail {
        session,
        qas,
        source,
    }))
}

/// Deletes one owned session; its Qa rows go with it by cascade.
#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    tag = "StudyLens API",
    params(("id" = String, Path, description = "The session id")),
    responses(
        (status = 200, description = "Session deleted"),
        (status = 404, description = "Session not found or not owned by the caller"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, WebError> {
    let session_id = parse_session_id(&id)?;

    let (session, _qas) = state.storage.get_session_with_qas(session_id).await?;
    authorize(&claims.user_id, &session)?;

    state.storage.delete_session(session_id).await?;

    Ok(Json(MessageResponse {
        message: "Session deleted successfully".to_string(),
    }))
}

/// Stores the caller's theme preference via the user upsert.
#[utoipa::path(
    patch,
    path = "/api/user/theme",
    tag = "StudyLens API",
    request_body = ThemeRequest,
    responses(
        (status = 200, description = "The stored theme preference"),
        (status = 400, description = "Value outside light|dark|system"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_theme_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Json(req): Json<ThemeRequest>,
) -> Result<Json<ThemeResponse>, WebError> {
    let theme = req
        .theme
        .as_deref()
        .and_then(ThemePreference::parse)
        .ok_or_else(|| WebError(PortError::Validation("Invalid theme preference".to_string())))?;

    let user = provision_user(&state, &claims, Some(theme)).await?;

    Ok(Json(ThemeResponse {
        theme: user.theme_preference,
    }))
}
