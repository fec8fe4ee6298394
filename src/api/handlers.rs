//! Request handlers.
//!
//! Identity arrives via the `x-user-id` header from the fronting auth proxy;
//! the service itself performs no authentication. Bodies for the two money
//! endpoints are parsed by hand from raw JSON so malformed input maps to the
//! same 400 shape as domain validation failures.

use crate::api::errors::{ApiError, ApiResult};
use crate::api::middleware::USER_ID_HEADER;
use crate::api::models::{
    AdjustAction, AdjustBalanceRequest, BalanceResponse, BetsResponse, CreateUserRequest,
    CreateUserResponse, GamesResponse, HealthResponse, HistoryQuery, PlayRequest, PlayResponse,
    TransactionRequest, TransactionResponse, TransactionsResponse,
};
use crate::errors::CasinoError;
use crate::ledger::types::{Role, TxType};
use crate::ledger::{CasinoStore, Ledger};
use crate::money::Money;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

const DEFAULT_HISTORY_LIMIT: usize = 50;
const MAX_HISTORY_LIMIT: usize = 500;

pub struct AppState {
    pub store: Arc<CasinoStore>,
    pub ledger: Ledger,
    pub default_starting_balance: Money,
}

fn user_id(headers: &HeaderMap) -> ApiResult<String> {
    let id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::Unauthorized)?;
    Ok(id.to_string())
}

fn require_admin(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let caller = user_id(headers)?;
    let account = state.store.account(&caller).map_err(|e| match e {
        CasinoError::UserNotFound(_) => ApiError::Unauthorized,
        other => ApiError::Casino(other),
    })?;
    if account.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

/// Bodies are parsed from the raw bytes so syntactically broken JSON shares
/// the 400 wire shape with schema and domain validation failures, instead of
/// surfacing as the extractor's plain-text rejection.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::Casino(CasinoError::InvalidRequest(e.to_string())))
}

/// Account ids become segments of `:`-separated storage keys, so anything
/// beyond alphanumerics, `-` and `_` is rejected at creation.
fn valid_account_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn history_limit(query: &HistoryQuery) -> usize {
    query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}

pub async fn play(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<PlayResponse>> {
    let user = user_id(&headers)?;
    let request: PlayRequest = parse_body(&body)?;
    let receipt = state
        .ledger
        .place_bet(&user, &request.game_id, request.bet, &request.params)?;
    Ok(Json(PlayResponse {
        balance: receipt.balance,
        payout: receipt.payout,
        result: receipt.result,
        wager_id: receipt.wager_id,
    }))
}

pub async fn transaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<TransactionResponse>> {
    let user = user_id(&headers)?;
    let request: TransactionRequest = parse_body(&body)?;
    let receipt = state.ledger.settle(
        &user,
        request.action,
        request.amount,
        request.game,
        request.wager_id.as_deref(),
    )?;
    Ok(Json(TransactionResponse {
        balance: receipt.balance,
        wager_id: receipt.wager_id,
    }))
}

pub async fn balance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<BalanceResponse>> {
    let user = user_id(&headers)?;
    let account = state.store.account(&user)?;
    Ok(Json(BalanceResponse {
        balance: account.balance,
    }))
}

pub async fn user_bets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<BetsResponse>> {
    let user = user_id(&headers)?;
    state.store.account(&user)?;
    let bets = state.store.list_bets(&user, history_limit(&query))?;
    Ok(Json(BetsResponse { bets }))
}

pub async fn user_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<TransactionsResponse>> {
    let user = user_id(&headers)?;
    state.store.account(&user)?;
    let transactions = state
        .store
        .list_transactions(&user, history_limit(&query))?;
    Ok(Json(TransactionsResponse { transactions }))
}

pub async fn list_games(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GamesResponse>> {
    let mut games = state.store.list_games()?;
    games.retain(|g| g.is_active);
    Ok(Json(GamesResponse { games }))
}

pub async fn admin_create_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<CreateUserResponse>> {
    require_admin(&state, &headers)?;
    let request: CreateUserRequest = parse_body(&body)?;
    if !valid_account_id(&request.user_id) {
        return Err(ApiError::Casino(CasinoError::InvalidRequest(
            "userId must be alphanumeric, - or _".into(),
        )));
    }
    let balance = request
        .starting_balance
        .unwrap_or(state.default_starting_balance);
    let account = state
        .store
        .create_account(&request.user_id, Role::User, balance)?;
    Ok(Json(CreateUserResponse {
        user_id: account.id,
        balance: account.balance,
    }))
}

pub async fn admin_adjust_balance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(target): Path<String>,
    body: Bytes,
) -> ApiResult<Json<BalanceResponse>> {
    require_admin(&state, &headers)?;
    let request: AdjustBalanceRequest = parse_body(&body)?;
    let tx_type = match request.action {
        AdjustAction::Deposit => TxType::Deposit,
        AdjustAction::Withdraw => TxType::Withdraw,
    };
    let balance = state.ledger.adjust(&target, tx_type, request.amount)?;
    Ok(Json(BalanceResponse { balance }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
