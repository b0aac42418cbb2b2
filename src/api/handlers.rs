use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{self, is_affirmative, Step};
use crate::models::{Message, ProjectAnalysis, RequirementsSnapshot};
use crate::store::SessionState;

use super::AppState;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side; clients only see a generic message.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn session_not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Session not found".to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Sessions
// ============================================================

pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionState>), (StatusCode, String)> {
    state
        .store
        .create()
        .map(|session| (StatusCode::CREATED, Json(session)))
        .map_err(internal_error)
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionState>, (StatusCode, String)> {
    state
        .store
        .get(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(session_not_found)
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.store.delete(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found())
    }
}

// ============================================================
// Wizard Turns
// ============================================================

#[derive(Debug, Deserialize)]
pub struct SendMessageInput {
    pub content: String,
}

/// Response for one wizard turn.
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub messages: Vec<Message>,
    pub requirements: RequirementsSnapshot,
    pub proposal_offered: bool,
    pub next_step: Step,
    /// Set when the user accepted the proposal offer: no model turn happened
    /// and the front end should hand off to the contact form instead.
    pub contact_requested: bool,
}

/// One full wizard turn: append the user message, pick the step, call the
/// model, fold the reply into the snapshot, persist, and report back.
///
/// If the proposal was already offered and the user replies affirmatively,
/// the turn short-circuits into the contact hand-off without a model call.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SendMessageInput>,
) -> Result<Json<TurnResponse>, (StatusCode, String)> {
    let mut session = state
        .store
        .get(id)
        .map_err(internal_error)?
        .ok_or_else(session_not_found)?;

    session.messages.push(Message::user(input.content));

    if session.proposal_offered {
        let accepted = session
            .messages
            .last()
            .is_some_and(|m| is_affirmative(&m.content));
        if accepted {
            let session = state.store.save(session).map_err(internal_error)?;
            return Ok(Json(TurnResponse {
                messages: session.messages,
                requirements: session.snapshot,
                proposal_offered: true,
                next_step: Step::ProposeNextSteps,
                contact_requested: true,
            }));
        }
    }

    // A refusal only counts against the email question while that question is
    // the one pending; once latched it stays declined.
    if !session.email_declined {
        session.email_declined =
            engine::email_declined(&session.snapshot, &session.messages, &state.policy);
    }

    let (step, instruction) = engine::plan_turn(
        &session.snapshot,
        &session.messages,
        session.email_declined,
        &state.policy,
    );
    if step == Step::ProposeNextSteps {
        session.proposal_offered = true;
    }

    // The model only ever sees a bounded trailing window of the history.
    let window_start = session
        .messages
        .len()
        .saturating_sub(state.policy.history_window);
    let reply = state
        .model
        .complete(&instruction, &session.messages[window_start..])
        .await
        .map_err(internal_error)?;

    let outcome = engine::apply_reply(
        &session.snapshot,
        &session.messages,
        &reply,
        session.email_declined,
        &state.policy,
    );
    session.snapshot = outcome.snapshot;
    session.proposal_offered = session.proposal_offered || outcome.proposal_offered;
    session.messages.push(Message::assistant(reply));

    let session = state.store.save(session).map_err(internal_error)?;

    Ok(Json(TurnResponse {
        proposal_offered: session.proposal_offered,
        messages: session.messages,
        requirements: session.snapshot,
        next_step: outcome.step,
        contact_requested: false,
    }))
}

// ============================================================
// Feature Selection
// ============================================================

#[derive(Debug, Deserialize)]
pub struct SetCheckedInput {
    pub checked: bool,
}

/// Flip one feature's checkbox. The only snapshot mutation a consumer may
/// make outside the merge path.
pub async fn set_feature_checked(
    State(state): State<AppState>,
    Path((id, feature_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<SetCheckedInput>,
) -> Result<Json<RequirementsSnapshot>, (StatusCode, String)> {
    let mut session = state
        .store
        .get(id)
        .map_err(internal_error)?
        .ok_or_else(session_not_found)?;

    let Some(feature) = session
        .snapshot
        .features
        .iter_mut()
        .find(|f| f.id == feature_id)
    else {
        return Err((StatusCode::NOT_FOUND, "Feature not found".to_string()));
    };
    feature.checked = input.checked;

    let session = state.store.save(session).map_err(internal_error)?;
    Ok(Json(session.snapshot))
}

pub async fn set_all_features_checked(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SetCheckedInput>,
) -> Result<Json<RequirementsSnapshot>, (StatusCode, String)> {
    let mut session = state
        .store
        .get(id)
        .map_err(internal_error)?
        .ok_or_else(session_not_found)?;

    for feature in &mut session.snapshot.features {
        feature.checked = input.checked;
    }

    let session = state.store.save(session).map_err(internal_error)?;
    Ok(Json(session.snapshot))
}

// ============================================================
// Summary
// ============================================================

pub async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<crate::models::FinalSummary>, (StatusCode, String)> {
    state
        .store
        .get(id)
        .map_err(internal_error)?
        .map(|session| Json(session.snapshot.summary()))
        .ok_or_else(session_not_found)
}

// ============================================================
// Analysis
// ============================================================

/// One-shot persona and market analysis of the gathered requirements.
///
/// Sends the finalized summary to the model as JSON and parses the structured
/// reply. Nothing is persisted; callers re-run it after changing the feature
/// selection.
pub async fn generate_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectAnalysis>, (StatusCode, String)> {
    let session = state
        .store
        .get(id)
        .map_err(internal_error)?
        .ok_or_else(session_not_found)?;

    let summary = session.snapshot.summary();
    let payload = serde_json::to_string(&summary).map_err(internal_error)?;

    let reply = state
        .model
        .complete(engine::analysis_instruction(), &[Message::user(payload)])
        .await
        .map_err(internal_error)?;

    let analysis = ProjectAnalysis::from_reply(&reply).map_err(internal_error)?;
    Ok(Json(analysis))
}
