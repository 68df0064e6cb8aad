use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::flows::validation::to_data_uri;
use crate::flows::{
    extract_text, generate_vocabulary, translate, transliterate, ExtractionRequest,
    ExtractionResult, FlowError, TranslationRequest, TranslationResult, TransliterationRequest,
    TransliterationResult, VocabularyRequest, VocabularyResult,
};
use crate::state::AppState;

/// Failure body shared by every action: `{"error": "..."}`.
#[derive(Debug)]
pub struct ActionError {
    pub status: StatusCode,
    pub message: String,
}

impl ActionError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn from_flow(action: &str, err: FlowError) -> Self {
        if err.is_validation() {
            warn!("{} rejected: {}", action, err);
            return Self::bad_request(err.to_string());
        }

        error!("{} error: {}", action, err);
        let status = match &err {
            FlowError::Prompt(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ActionError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ActionError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for ActionError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(err.body_text())
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationResult>, ActionError> {
    let Json(request) = payload?;
    translate(&state.flows, request)
        .await
        .map(Json)
        .map_err(|e| ActionError::from_flow("Translation", e))
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_transliterate(
    State(state): State<AppState>,
    payload: Result<Json<TransliterationRequest>, JsonRejection>,
) -> Result<Json<TransliterationResult>, ActionError> {
    let Json(request) = payload?;
    transliterate(&state.flows, request)
        .await
        .map(Json)
        .map_err(|e| ActionError::from_flow("Transliteration", e))
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_vocabulary(
    State(state): State<AppState>,
    payload: Result<Json<VocabularyRequest>, JsonRejection>,
) -> Result<Json<VocabularyResult>, ActionError> {
    let Json(request) = payload?;
    let result = generate_vocabulary(&state.flows, request)
        .await
        .map_err(|e| ActionError::from_flow("Daily vocabulary", e))?;
    if result.is_sentinel() {
        warn!("Serving fallback vocabulary entry");
    }
    Ok(Json(result))
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_extract_text(
    State(state): State<AppState>,
    payload: Result<Json<ExtractionRequest>, JsonRejection>,
) -> Result<Json<ExtractionResult>, ActionError> {
    let Json(request) = payload?;
    extract_text(&state.flows, request)
        .await
        .map(Json)
        .map_err(|e| ActionError::from_flow("Text extraction", e))
}

/// Multipart variant: the `file` field is turned into a data URI server-side.
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_extract_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractionResult>, ActionError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;
        let request = ExtractionRequest {
            image_data: to_data_uri(&mime_type, &bytes),
        };
        return extract_text(&state.flows, request)
            .await
            .map(Json)
            .map_err(|e| ActionError::from_flow("Text extraction", e));
    }

    Err(ActionError::bad_request("No image file provided"))
}
