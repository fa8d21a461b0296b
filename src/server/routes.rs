//! Ledger API route handlers.
//!
//! All endpoints return JSON. The store is shared via `Arc<ServerState>`.
//! Writes accept raw key/value records and run them through the record
//! model once, so legacy labels and locale-formatted numbers are
//! normalized at the door; reads hand back typed records and figures
//! computed by the metrics core.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::metrics::ranking::{
    best_and_worst_by_profit, book_key, extremes, overall_stats, source_key,
    stats_by_dimension, top_losses, top_profits, weekday_key, DimensionStats,
    Extremes, OverallStats, RankedBet,
};
use crate::importer::SlipReader;
use crate::metrics::{bankroll, LedgerSummary};
use crate::model::{self, normalize};
use crate::storage::{Profile, Store};
use crate::types::{Bet, BetDraft, CashMovement};

/// How many entries the top-profit/top-loss lists carry.
const TOP_LIST_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServerState {
    pub store: Store,
    /// Present only when the import helper is configured.
    pub slip_reader: Option<Box<dyn SlipReader>>,
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Error plumbing
// ---------------------------------------------------------------------------

/// Wrapper so handlers can use `?` on storage errors.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RankingsResponse {
    pub overall: OverallStats,
    pub by_book: Vec<DimensionStats>,
    pub by_source: Vec<DimensionStats>,
    pub by_weekday: Vec<DimensionStats>,
    /// Book keys with the highest / lowest total profit.
    pub best_book: Option<String>,
    pub worst_book: Option<String>,
    pub top_profits: Vec<RankedBet>,
    pub top_losses: Vec<RankedBet>,
    pub extremes: Extremes,
}

#[derive(Debug, Clone, Serialize)]
pub struct BankrollResponse {
    pub base: Option<f64>,
    pub effective: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    /// Calendar anchor for the period buckets; defaults to the server's
    /// current UTC date.
    pub today: Option<NaiveDate>,
}

/// The user-entered bankroll figure; `null` clears the base.
#[derive(Debug, Deserialize)]
pub struct RebaseRequest {
    pub value: Option<f64>,
}

/// A screenshotted bet slip to pre-fill the entry form from.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipRequest {
    pub image_base64: String,
    pub mime_type: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /api/profiles
pub async fn list_profiles(State(state): State<AppState>) -> ApiResult<Json<Vec<Profile>>> {
    Ok(Json(state.store.profiles().await?))
}

/// GET /api/profiles/{profile}/bets
pub async fn list_bets(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> ApiResult<Json<Vec<Bet>>> {
    Ok(Json(state.store.bets(&profile).await?))
}

/// POST /api/profiles/{profile}/bets
///
/// Accepts a raw record (legacy labels welcome), normalizes it, mints an
/// id when none is given, and upserts. Returns the stored form.
pub async fn upsert_bet(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Json(raw): Json<Value>,
) -> ApiResult<(StatusCode, Json<Bet>)> {
    let Some(mut bet) = normalize::normalize_bet(&raw) else {
        return Err(anyhow::anyhow!("bet record must be a JSON object").into());
    };
    if bet.id.is_empty() {
        bet.id = model::mint_id();
    }
    // Submitted dates land in display form; unparseable ones stay as
    // given (they are excluded from date-based figures, not rejected).
    let rendered = model::date::display_date(&bet.date);
    if !rendered.is_empty() {
        bet.date = rendered;
    }
    state.store.upsert_bet(&profile, &bet).await?;
    Ok((StatusCode::CREATED, Json(bet)))
}

/// DELETE /api/bets/{id}
pub async fn delete_bet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.store.delete_bet(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

/// GET /api/profiles/{profile}/flows
pub async fn list_flows(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> ApiResult<Json<Vec<CashMovement>>> {
    Ok(Json(state.store.flows(&profile).await?))
}

/// POST /api/profiles/{profile}/flows
pub async fn upsert_flow(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Json(raw): Json<Value>,
) -> ApiResult<(StatusCode, Json<CashMovement>)> {
    let Some(mut flow) = normalize::normalize_flow(&raw) else {
        return Err(anyhow::anyhow!("cash movement must be a JSON object with a known kind").into());
    };
    if flow.id.is_empty() {
        flow.id = model::mint_id();
    }
    let rendered = model::date::display_date(&flow.date);
    if !rendered.is_empty() {
        flow.date = rendered;
    }
    state.store.upsert_flow(&profile, &flow).await?;
    Ok((StatusCode::CREATED, Json(flow)))
}

/// DELETE /api/flows/{id}
pub async fn delete_flow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.store.delete_flow(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

/// GET /api/profiles/{profile}/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Query(params): Query<SummaryParams>,
) -> ApiResult<Json<LedgerSummary>> {
    let bets = state.store.bets(&profile).await?;
    let flows = state.store.flows(&profile).await?;
    let base = state.store.bankroll_base(&profile).await?;
    let today = params
        .today
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    Ok(Json(LedgerSummary::compute(&bets, &flows, base, today)))
}

/// GET /api/profiles/{profile}/rankings
pub async fn get_rankings(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> ApiResult<Json<RankingsResponse>> {
    let bets = state.store.bets(&profile).await?;

    let by_book = stats_by_dimension(&bets, book_key);
    let (best_book, worst_book) = match best_and_worst_by_profit(&by_book) {
        Some((best, worst)) => (best.key.clone(), worst.key.clone()),
        None => (None, None),
    };

    Ok(Json(RankingsResponse {
        overall: overall_stats(&bets),
        by_source: stats_by_dimension(&bets, source_key),
        by_weekday: stats_by_dimension(&bets, weekday_key),
        best_book,
        worst_book,
        top_profits: top_profits(&bets, TOP_LIST_LEN),
        top_losses: top_losses(&bets, TOP_LIST_LEN),
        extremes: extremes(&bets),
        by_book,
    }))
}

/// GET /api/profiles/{profile}/bankroll
pub async fn get_bankroll(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> ApiResult<Json<BankrollResponse>> {
    let bets = state.store.bets(&profile).await?;
    let flows = state.store.flows(&profile).await?;
    let base = state.store.bankroll_base(&profile).await?;
    Ok(Json(BankrollResponse {
        base,
        effective: bankroll::effective_bankroll(base, &bets, &flows),
    }))
}

/// PUT /api/profiles/{profile}/bankroll
///
/// The one mutation path for the bankroll base: back-solve it from the
/// displayed figure the user typed, persist, and echo the result. A null
/// (or non-finite) value clears the base.
pub async fn rebase_bankroll(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    Json(request): Json<RebaseRequest>,
) -> ApiResult<Json<BankrollResponse>> {
    let bets = state.store.bets(&profile).await?;
    let flows = state.store.flows(&profile).await?;

    let base = request
        .value
        .and_then(|entered| bankroll::rebase_from_displayed_value(entered, &bets, &flows));
    state.store.set_bankroll_base(&profile, base).await?;

    Ok(Json(BankrollResponse {
        base,
        effective: bankroll::effective_bankroll(base, &bets, &flows),
    }))
}

/// POST /api/import/slip
///
/// Runs the slip reader and returns its draft *suggestion*. The caller
/// reviews it and submits a real bet through the normal upsert route;
/// drafts never reach the ledger directly.
pub async fn import_slip(
    State(state): State<AppState>,
    Json(request): Json<SlipRequest>,
) -> ApiResult<Json<BetDraft>> {
    let Some(reader) = state.slip_reader.as_ref() else {
        return Err(anyhow::anyhow!("slip importer is not configured").into());
    };
    let draft = reader
        .read_slip(&request.image_base64, &request.mime_type)
        .await?;
    Ok(Json(draft))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
