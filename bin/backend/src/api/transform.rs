use std::collections::BTreeMap;

use axum::{
    Router,
    extract::{Json, Multipart, State},
    routing::{get, post},
};
use tonelift_core::{Situation, TransformOptions, TransformRequest, TransformResponse};
use tracing::instrument;
use validator::Validate;

use crate::api::{errors::Error, state::AppState};
use crate::model::{LegacyContext, LegacyForm, RootStatus, SituationInfo, TransformBody};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/situations", get(situations_handler))
        .route("/transform", post(transform_handler))
        // legacy form endpoint
        .route("/process/", post(process_handler))
}

async fn root_handler(State(state): State<AppState>) -> Json<RootStatus> {
    let endpoints = BTreeMap::from([
        ("transform", "/transform (POST, JSON)"),
        ("process", "/process/ (POST, multipart)"),
        ("situations", "/situations (GET)"),
        ("speech", "/speech/ws (WebSocket)"),
    ]);
    Json(RootStatus {
        status: "online",
        ai_ready: state.transformer.is_ready(),
        endpoints,
    })
}

async fn situations_handler() -> Json<Vec<SituationInfo>> {
    Json(
        enum_iterator::all::<Situation>()
            .map(SituationInfo::from)
            .collect(),
    )
}

async fn run_transform(state: &AppState, request: TransformRequest) -> Result<Json<TransformResponse>, Error> {
    request.validate()?;
    let response = state
        .transformer
        .transform_text(&request.text, &request.options)
        .await?;
    Ok(Json(response))
}

/// Rewrite a message for the requested audience and tone.
#[instrument(skip(state, body))]
pub async fn transform_handler(
    State(state): State<AppState>,
    Json(body): Json<TransformBody>,
) -> Result<Json<TransformResponse>, Error> {
    body.validate()?;
    let options = body.options();
    run_transform(&state, TransformRequest::new(body.text, options)).await
}

/// Multipart variant kept for older clients: fields `text` and `context`,
/// the latter a JSON object.
#[instrument(skip(state, multipart))]
pub async fn process_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TransformResponse>, Error> {
    let mut text = None;
    let mut context = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("text") => text = Some(field.text().await?),
            Some("context") => context = Some(field.text().await?),
            other => tracing::debug!(field = ?other, "ignoring unknown form field"),
        }
    }

    let text = text.ok_or_else(|| Error::InvalidInput("Text is required".into()))?;
    let context = match context.as_deref() {
        Some(raw) => serde_json::from_str::<LegacyContext>(raw)
            .map_err(|_| Error::InvalidInput("Invalid context format".into()))?,
        None => LegacyContext::default(),
    };

    let form = LegacyForm { text, context };
    form.validate()?;
    run_transform(
        &state,
        TransformRequest::new(form.text, TransformOptions::from(form.context)),
    )
    .await
}
