//! Session command endpoints
//!
//! Every handler is one synchronous engine command wrapped in the session
//! lock; mutating commands hold the write guard for their whole critical
//! section.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::engine::{Combatant, ExpiredEffect, GameTime, SessionError};
use crate::store::{SnapshotStore, StoreError};

/// Build session router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(export_state).put(import_state))
        .route("/session/reset", post(reset_session))
        .route("/session/save", post(save_snapshot))
        .route("/session/load", post(load_snapshot))
        .route("/session/combatants", get(list_combatants).post(add_combatant))
        .route(
            "/session/combatants/{name}",
            get(get_combatant).delete(remove_combatant),
        )
        .route("/session/combatants/{name}/damage", post(deal_damage))
        .route("/session/combatants/{name}/heal", post(heal))
        .route("/session/combatants/{name}/hp", put(set_hp))
        .route("/session/combatants/{name}/max-hp", put(set_max_hp))
        .route("/session/combatants/{name}/effects", post(apply_effect))
        .route(
            "/session/combatants/{name}/effects/{effect}",
            delete(clear_effect),
        )
        .route("/session/turn", get(current_turn))
        .route("/session/turn/next", post(next_turn))
        .route("/session/time", get(get_time).post(advance_time))
}

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn session_error(err: SessionError) -> axum::response::Response {
    let status = match err {
        SessionError::DuplicateName(_) => StatusCode::CONFLICT,
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::InvalidName(_) | SessionError::InvalidSnapshotShape(_) => {
            StatusCode::BAD_REQUEST
        }
    };
    (status, Json(ErrorResponse { error: err.to_string() })).into_response()
}

fn store_error(err: StoreError) -> axum::response::Response {
    let status = match err {
        StoreError::InvalidKey(_) => StatusCode::BAD_REQUEST,
        StoreError::Serialize(_) | StoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: err.to_string() })).into_response()
}

// ---- snapshot export/import ----

/// GET /session
async fn export_state(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(session.export())
}

/// PUT /session
///
/// Restores the whole session from a snapshot blob. A structurally invalid
/// blob resets the session to the fresh default and reports failure.
async fn import_state(
    State(state): State<AppState>,
    Json(blob): Json<serde_json::Value>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    match session.import(blob) {
        Ok(()) => Json(session.export()).into_response(),
        Err(e) => session_error(e),
    }
}

/// POST /session/reset
async fn reset_session(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.write().await;
    session.reset();
    Json(session.export())
}

// ---- keyed persistence ----

#[derive(Debug, Deserialize)]
struct SnapshotKeyRequest {
    key: String,
}

#[derive(Debug, Serialize)]
struct SaveResponse {
    key: String,
    saved: bool,
}

/// POST /session/save
async fn save_snapshot(
    State(state): State<AppState>,
    Json(req): Json<SnapshotKeyRequest>,
) -> impl IntoResponse {
    let snapshot = state.session.read().await.export();
    match state.store.save(&req.key, &snapshot) {
        Ok(()) => Json(SaveResponse { key: req.key, saved: true }).into_response(),
        Err(e) => store_error(e),
    }
}

/// POST /session/load
async fn load_snapshot(
    State(state): State<AppState>,
    Json(req): Json<SnapshotKeyRequest>,
) -> impl IntoResponse {
    match state.store.load(&req.key) {
        Ok(Some(snapshot)) => {
            let mut session = state.session.write().await;
            session.restore(snapshot);
            Json(session.export()).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse { error: format!("no snapshot named '{}'", req.key) }),
        )
            .into_response(),
        // A corrupt snapshot file is a failed import: reset, report failure
        Err(StoreError::Serialize(e)) => {
            state.session.write().await.reset();
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("snapshot '{}' is corrupt, session reset: {}", req.key, e),
                }),
            )
                .into_response()
        }
        Err(e) => store_error(e),
    }
}

// ---- combatants ----

#[derive(Debug, Deserialize)]
struct AddCombatantRequest {
    name: String,
    initiative: i32,
    max_hp: i32,
    /// Defaults to max_hp
    current_hp: Option<i32>,
    #[serde(default)]
    npc: bool,
    #[serde(default)]
    player_controlled: bool,
}

/// GET /session/combatants
async fn list_combatants(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(session.initiative.combatants().to_vec())
}

/// POST /session/combatants
async fn add_combatant(
    State(state): State<AppState>,
    Json(req): Json<AddCombatantRequest>,
) -> impl IntoResponse {
    let mut combatant = Combatant::new(req.name, req.initiative, req.max_hp);
    if let Some(hp) = req.current_hp {
        combatant = combatant.with_current_hp(hp);
    }
    combatant.npc = req.npc;
    combatant.player_controlled = req.player_controlled;
    let name = combatant.name.clone();

    let mut session = state.session.write().await;
    match session.initiative.add(combatant) {
        Ok(()) => {
            let added = session.initiative.combatant(&name).cloned();
            (StatusCode::CREATED, Json(added)).into_response()
        }
        Err(e) => session_error(e),
    }
}

/// GET /session/combatants/{name}
async fn get_combatant(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let session = state.session.read().await;
    match session.initiative.combatant(&name) {
        Some(combatant) => Json(combatant.clone()).into_response(),
        None => session_error(SessionError::NotFound(name)),
    }
}

/// DELETE /session/combatants/{name}
async fn remove_combatant(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    match session.initiative.remove(&name) {
        Ok(removed) => Json(removed).into_response(),
        Err(e) => session_error(e),
    }
}

// ---- hit points ----

#[derive(Debug, Deserialize)]
struct HpDeltaRequest {
    amount: i32,
}

#[derive(Debug, Deserialize)]
struct SetHpRequest {
    hp: i32,
    /// Also raise max HP to this value first
    #[serde(default)]
    set_max_too: bool,
}

#[derive(Debug, Deserialize)]
struct SetMaxHpRequest {
    max_hp: i32,
    /// Re-clamp current HP under the new cap
    #[serde(default = "default_true")]
    adjust_current: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct HpResponse {
    name: String,
    current_hp: i32,
    max_hp: i32,
}

impl From<&Combatant> for HpResponse {
    fn from(c: &Combatant) -> Self {
        Self {
            name: c.name.clone(),
            current_hp: c.current_hp,
            max_hp: c.max_hp,
        }
    }
}

/// POST /session/combatants/{name}/damage
async fn deal_damage(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<HpDeltaRequest>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    match session.initiative.deal_damage(&name, req.amount) {
        Ok(combatant) => Json(HpResponse::from(combatant)).into_response(),
        Err(e) => session_error(e),
    }
}

/// POST /session/combatants/{name}/heal
async fn heal(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<HpDeltaRequest>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    match session.initiative.heal(&name, req.amount) {
        Ok(combatant) => Json(HpResponse::from(combatant)).into_response(),
        Err(e) => session_error(e),
    }
}

/// PUT /session/combatants/{name}/hp
async fn set_hp(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<SetHpRequest>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    match session.initiative.set_hp(&name, req.hp, req.set_max_too) {
        Ok(combatant) => Json(HpResponse::from(combatant)).into_response(),
        Err(e) => session_error(e),
    }
}

/// PUT /session/combatants/{name}/max-hp
async fn set_max_hp(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<SetMaxHpRequest>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    match session.initiative.set_max_hp(&name, req.max_hp, req.adjust_current) {
        Ok(combatant) => Json(HpResponse::from(combatant)).into_response(),
        Err(e) => session_error(e),
    }
}

// ---- status effects ----

#[derive(Debug, Deserialize)]
struct ApplyEffectRequest {
    name: String,
    duration_rounds: Option<u32>,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Serialize)]
struct EffectResponse {
    combatant: String,
    effect: String,
    /// False when the effect name was already present (no-op)
    added: bool,
}

#[derive(Debug, Serialize)]
struct ClearEffectResponse {
    combatant: String,
    effect: String,
    removed: bool,
}

/// POST /session/combatants/{name}/effects
async fn apply_effect(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<ApplyEffectRequest>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    match session
        .initiative
        .apply_effect(&name, &req.name, req.duration_rounds, &req.notes)
    {
        Ok(added) => {
            let status = if added { StatusCode::CREATED } else { StatusCode::OK };
            (
                status,
                Json(EffectResponse { combatant: name, effect: req.name, added }),
            )
                .into_response()
        }
        Err(e) => session_error(e),
    }
}

/// DELETE /session/combatants/{name}/effects/{effect}
async fn clear_effect(
    State(state): State<AppState>,
    Path((name, effect)): Path<(String, String)>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    match session.initiative.clear_effect(&name, &effect) {
        Ok(removed) => Json(ClearEffectResponse { combatant: name, effect, removed }).into_response(),
        Err(e) => session_error(e),
    }
}

// ---- turns ----

#[derive(Debug, Serialize)]
struct TurnStatusResponse {
    combatant: Option<Combatant>,
    turn_idx: usize,
    round: u32,
}

#[derive(Debug, Serialize)]
struct TurnAdvanceResponse {
    /// Name of the new current combatant, or null when the order is empty
    combatant: Option<String>,
    new_round: bool,
    round: u32,
    expired_effects: Vec<ExpiredEffect>,
}

/// GET /session/turn
async fn current_turn(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(TurnStatusResponse {
        combatant: session.initiative.current_combatant().cloned(),
        turn_idx: session.initiative.turn_index(),
        round: session.initiative.round(),
    })
}

/// POST /session/turn/next
async fn next_turn(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.write().await;
    let response = match session.initiative.advance_turn() {
        Some(advance) => TurnAdvanceResponse {
            combatant: Some(advance.combatant),
            new_round: advance.new_round,
            round: advance.round,
            expired_effects: advance.expired_effects,
        },
        None => TurnAdvanceResponse {
            combatant: None,
            new_round: false,
            round: session.initiative.round(),
            expired_effects: vec![],
        },
    };
    Json(response)
}

// ---- in-game time ----

#[derive(Debug, Deserialize)]
struct AdvanceTimeRequest {
    #[serde(default)]
    years: i64,
    #[serde(default)]
    days: i64,
    #[serde(default)]
    hours: i64,
    #[serde(default)]
    minutes: i64,
}

#[derive(Debug, Serialize)]
struct TimeResponse {
    game_time: GameTime,
    display: String,
}

/// GET /session/time
async fn get_time(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(TimeResponse {
        display: session.clock.to_string(),
        game_time: session.clock.clone(),
    })
}

/// POST /session/time
async fn advance_time(
    State(state): State<AppState>,
    Json(req): Json<AdvanceTimeRequest>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    session.clock.advance(req.years, req.days, req.hours, req.minutes);
    Json(TimeResponse {
        display: session.clock.to_string(),
        game_time: session.clock.clone(),
    })
}
