//! Request and response bodies.

use crate::catalog::GameDescriptor;
use crate::games::types::GameType;
use crate::ledger::types::{BetRow, TransactionRow};
use crate::ledger::wager::SettleAction;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// POST /api/game/play
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRequest {
    pub game_id: String,
    pub bet: Money,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayResponse {
    pub balance: Money,
    pub payout: Money,
    pub result: serde_json::Value,
    pub wager_id: String,
}

/// POST /api/game/transaction
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub action: SettleAction,
    pub amount: Money,
    #[serde(default)]
    pub game: Option<GameType>,
    #[serde(default)]
    pub wager_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub balance: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub balance: Money,
}

#[derive(Debug, Serialize)]
pub struct BetsResponse {
    pub bets: Vec<BetRow>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionRow>,
}

#[derive(Debug, Serialize)]
pub struct GamesResponse {
    pub games: Vec<GameDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// POST /api/admin/users
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_id: String,
    #[serde(default)]
    pub starting_balance: Option<Money>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub user_id: String,
    pub balance: Money,
}

/// POST /api/admin/users/:id/balance
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustBalanceRequest {
    pub action: AdjustAction,
    pub amount: Money,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustAction {
    Deposit,
    Withdraw,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
