//! Persisted ledger rows: accounts, transactions, bet history and wager
//! state markers.

use crate::games::types::GameType;
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

/// User account. The balance is mutated only through the ledger; `version`
/// increments on every balance write and backs the compare-and-swap debit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub balance: Money,
    pub role: Role,
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

/// Append-only financial record types, wire-compatible with the legacy
/// schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxType {
    Deposit,
    Withdraw,
    GameBet,
    GameWin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    Completed,
}

/// Authoritative ledger entry. Two rows per winning wager (debit + credit),
/// one per losing wager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    pub id: String,
    pub user_id: String,
    pub amount: Money,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetResult {
    Win,
    Loss,
}

/// Best-effort bet history row. Not the financial source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetRow {
    pub id: String,
    pub user_id: String,
    pub game: GameType,
    pub amount: Money,
    pub payout: Money,
    pub result: BetResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Wager lifecycle. `Rejected` is terminal without mutation (or after a
/// successful compensating refund); anything stuck in `Debited` or
/// `Resolved` is a partial settlement awaiting reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WagerState {
    Pending,
    Debited,
    Resolved,
    Settled,
    Rejected,
}

/// State marker persisted at every transition so partial settlements are
/// detectable after a crash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WagerRecord {
    pub wager_id: String,
    pub user_id: String,
    pub game: GameType,
    pub amount: Money,
    pub state: WagerState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout: Option<Money>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WagerRecord {
    pub fn new(wager_id: String, user_id: String, game: GameType, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            wager_id,
            user_id,
            game,
            amount,
            state: WagerState::Pending,
            payout: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition(&mut self, state: WagerState) {
        self.state = state;
        self.updated_at = Utc::now();
    }
}
