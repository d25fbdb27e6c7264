//! Axum route handlers for the stack API.
//!
//! Parameters arrive as raw query strings rather than typed extractors:
//! the wire contract distinguishes "not an integer", "too large", and
//! "missing", which a typed extractor would collapse into one rejection.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use stackd_core::{StackId, StackStore, StoreError, StoreSummary};

use crate::error::GatewayError;

// ── Shared state ─────────────────────────────────────────────────────────────

type Store = Arc<StackStore>;

// ── Wire texts for parameter errors ──────────────────────────────────────────

const MSG_ID: &str = "Stack ID must be an integer";
const MSG_VALUE: &str = "Value must be an integer";
const MSG_VALUES: &str = "All values must be integers";
const MSG_COUNT: &str = "Count must be an integer";

// ── Query parameter types ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IdParams {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PushParams {
    id: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PushBulkParams {
    id: Option<String>,
    values: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PopBulkParams {
    id: Option<String>,
    count: Option<String>,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router with the given stack store.
pub fn create_router(store: Store) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/create", post(create_stack))
        .route("/api/push", post(push_value))
        .route("/api/push_bulk", post(push_bulk))
        .route("/api/pop", post(pop_value))
        .route("/api/pop_bulk", post(pop_bulk))
        .route("/api/size", get(stack_size))
        .route("/api/peek", get(peek_stack))
        .route("/api/destroy", delete(destroy_stack))
        .route("/api/list", get(list_stacks))
        .with_state(store)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /` — liveness probe.
pub async fn home() -> &'static str {
    "API is working"
}

/// `POST /api/create` — allocate a stack and return its id.
///
/// # Errors
/// 400 if the store is at its stack-count ceiling.
pub async fn create_stack(State(store): State<Store>) -> Result<impl IntoResponse, GatewayError> {
    let id = store.create()?;
    Ok((StatusCode::CREATED, id.to_string()))
}

/// `POST /api/push?id=&value=` — push one value.
///
/// # Errors
/// 404 for an unknown stack; 400 for a malformed or oversized value or a
/// full stack.
pub async fn push_value(
    State(store): State<Store>,
    Query(params): Query<PushParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = require_stack(&store, params.id.as_deref())?;
    let raw = params.value.as_deref().ok_or(GatewayError::BadParam(MSG_VALUE))?;
    let value = parse_value(raw, MSG_VALUE)?;
    store.push(id, value)?;
    Ok("Ok")
}

/// `POST /api/push_bulk?id=&values=` — push a comma-separated batch.
///
/// The whole batch is validated before any element is pushed; a batch that
/// overflows mid-way stays partially applied (committed prefix), exactly as
/// the store documents.
///
/// # Errors
/// 404 for an unknown stack; 400 for a missing/malformed batch or overflow.
pub async fn push_bulk(
    State(store): State<Store>,
    Query(params): Query<PushBulkParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = require_stack(&store, params.id.as_deref())?;
    let raw = params
        .values
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(GatewayError::Store(StoreError::MissingValues))?;
    let mut values = Vec::new();
    for piece in raw.split(',') {
        values.push(parse_value(piece, MSG_VALUES)?);
    }
    store.push_bulk(id, &values)?;
    Ok("Ok")
}

/// `POST /api/pop?id=` — pop the top value.
///
/// # Errors
/// 404 for an unknown stack; 400 on underflow.
pub async fn pop_value(
    State(store): State<Store>,
    Query(params): Query<IdParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = require_stack(&store, params.id.as_deref())?;
    Ok(store.pop(id)?.to_string())
}

/// `POST /api/pop_bulk?id=&count=` — pop `count` values, top first,
/// comma-joined.
///
/// # Errors
/// 404 for an unknown stack; 400 for a malformed count or underflow.
pub async fn pop_bulk(
    State(store): State<Store>,
    Query(params): Query<PopBulkParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = require_stack(&store, params.id.as_deref())?;
    let count = params
        .count
        .as_deref()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .ok_or(GatewayError::BadParam(MSG_COUNT))?;
    let popped = store.pop_bulk(id, count)?;
    let rendered: Vec<String> = popped.iter().map(ToString::to_string).collect();
    Ok(rendered.join(","))
}

/// `GET /api/size?id=` — element count.
///
/// # Errors
/// 404 for an unknown stack.
pub async fn stack_size(
    State(store): State<Store>,
    Query(params): Query<IdParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = require_stack(&store, params.id.as_deref())?;
    Ok(store.size(id)?.to_string())
}

/// `GET /api/peek?id=` — top value without popping.
///
/// # Errors
/// 404 for an unknown stack; 400 if the stack is empty.
pub async fn peek_stack(
    State(store): State<Store>,
    Query(params): Query<IdParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = require_stack(&store, params.id.as_deref())?;
    Ok(store.peek(id)?.to_string())
}

/// `DELETE /api/destroy?id=` — remove the stack.
///
/// # Errors
/// 404 for an unknown stack, including a repeated destroy.
pub async fn destroy_stack(
    State(store): State<Store>,
    Query(params): Query<IdParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = require_stack(&store, params.id.as_deref())?;
    store.destroy(id)?;
    Ok("Ok")
}

/// `GET /api/list` — per-stack utilization summary.
pub async fn list_stacks(State(store): State<Store>) -> impl IntoResponse {
    render_summary(&store.list())
}

// ── Parameter parsing ─────────────────────────────────────────────────────────

/// Parses the `id` parameter and verifies the stack exists, refreshing its
/// TTL — the lookup itself counts as activity, before the operation's own
/// parameters are even parsed.
fn require_stack(store: &StackStore, raw: Option<&str>) -> Result<StackId, GatewayError> {
    let id = parse_id(raw)?;
    store.size(id)?;
    Ok(id)
}

fn parse_id(raw: Option<&str>) -> Result<StackId, GatewayError> {
    let raw = raw.ok_or(GatewayError::BadParam(MSG_ID))?.trim();
    match raw.parse::<u64>() {
        Ok(v) => Ok(StackId::from(v)),
        // An integral id outside the u64 space can never be in the store:
        // report a miss, not a malformed request.
        Err(_) if is_integral(raw) => Err(StoreError::NotFound.into()),
        Err(_) => Err(GatewayError::BadParam(MSG_ID)),
    }
}

fn parse_value(raw: &str, msg: &'static str) -> Result<i64, GatewayError> {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(v) => Ok(v),
        Err(_) if is_integral(raw) => Err(StoreError::ValueOutOfRange.into()),
        Err(_) => Err(GatewayError::BadParam(msg)),
    }
}

/// Optional sign followed by one or more ASCII digits.
fn is_integral(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn render_summary(summary: &StoreSummary) -> String {
    let mut out = format!("{}/{} stacks\n\nStack list:\n", summary.used, summary.capacity);
    let lines: Vec<String> = summary
        .stacks
        .iter()
        .enumerate()
        .map(|(i, stack)| {
            format!("{i}: {}/{} ({}%)", stack.size, stack.capacity, stack.percent_full)
        })
        .collect();
    out.push_str(&lines.join("\n"));
    out
}
