//! Wager lifecycle orchestration.
//!
//! Every server-resolved bet runs the same pipeline: validate the request
//! with nothing mutated, debit the stake under compare-and-swap, resolve the
//! outcome, credit any payout, then record the settlement rows atomically.
//! The authoritative money trail is the transaction log; the bet history row
//! is a best-effort side write and never fails the wager.
//!
//! If the pipeline breaks after the debit, the ledger first attempts a
//! compensating refund. Only when that also fails is the wager left in a
//! non-terminal state and a partial settlement alarm raised.

use crate::errors::{CasinoError, CasinoResult};
use crate::games::types::{GameType, Outcome};
use crate::games::OutcomeEngine;
use crate::ledger::store::CasinoStore;
use crate::ledger::types::{
    BetResult, BetRow, TransactionRow, TxStatus, TxType, WagerRecord, WagerState,
};
use crate::money::Money;
use crate::rng::{EntropySource, OsEntropy, SecureRandom};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Attempts at the conditional debit before giving up on the race.
const MAX_DEBIT_ATTEMPTS: u32 = 3;

/// Outcome of a settled server-resolved wager.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WagerReceipt {
    pub wager_id: String,
    pub balance: Money,
    pub payout: Money,
    pub result: serde_json::Value,
}

/// Client-settled transaction primitive for games resolved off the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettleAction {
    Bet,
    Win,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleReceipt {
    pub balance: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager_id: Option<String>,
}

/// Produces a fresh entropy source per wager. Production uses the OS
/// CSPRNG; tests swap in scripted byte streams to pin draws through the
/// whole pipeline.
pub type EntropyFactory = Arc<dyn Fn() -> Box<dyn EntropySource> + Send + Sync>;

/// Ledger front door. Cheap to clone; all state lives behind the store.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<CasinoStore>,
    engine: OutcomeEngine,
    max_bet: Money,
    entropy: EntropyFactory,
}

impl Ledger {
    pub fn new(store: Arc<CasinoStore>, engine: OutcomeEngine, max_bet: Money) -> Self {
        Self::with_entropy(
            store,
            engine,
            max_bet,
            Arc::new(|| Box::new(OsEntropy) as Box<dyn EntropySource>),
        )
    }

    pub fn with_entropy(
        store: Arc<CasinoStore>,
        engine: OutcomeEngine,
        max_bet: Money,
        entropy: EntropyFactory,
    ) -> Self {
        Self {
            store,
            engine,
            max_bet,
            entropy,
        }
    }

    pub fn store(&self) -> &Arc<CasinoStore> {
        &self.store
    }

    /// Runs one wager end to end and returns the settled receipt.
    pub fn place_bet(
        &self,
        user_id: &str,
        game_slug: &str,
        bet: Money,
        params: &serde_json::Value,
    ) -> CasinoResult<WagerReceipt> {
        if bet.is_zero() {
            return Err(CasinoError::InvalidRequest("bet must be positive".into()));
        }
        if bet > self.max_bet {
            return Err(CasinoError::InvalidRequest(format!(
                "bet exceeds the table maximum of {}",
                self.max_bet
            )));
        }
        let game = self.lookup_game(game_slug)?;

        // All game-logic validation happens before any money moves.
        self.engine.validate(game, bet, params)?;

        let wager_id = Uuid::new_v4().to_string();
        let mut wager = WagerRecord::new(wager_id.clone(), user_id.to_string(), game, bet);
        self.store.put_wager(&wager)?;

        let after_debit = self.debit_with_retry(user_id, bet, None)?;
        wager.transition(WagerState::Debited);
        // The stake is gone; from here every failure refunds or alarms.
        if let Err(e) = self.store.put_wager(&wager) {
            return Err(self.refund_failed_wager(wager, bet, e));
        }

        let mut rng = SecureRandom::with_entropy((self.entropy)());
        let outcome = match self.engine.resolve(game, bet, params, &mut rng) {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.refund_failed_wager(wager, bet, e)),
        };
        wager.payout = Some(outcome.payout);
        wager.transition(WagerState::Resolved);
        if let Err(e) = self.store.put_wager(&wager) {
            return Err(self.refund_failed_wager(wager, bet, e));
        }

        let balance = if outcome.payout.is_zero() {
            after_debit.balance
        } else {
            match self.store.credit(user_id, outcome.payout) {
                Ok(account) => account.balance,
                Err(e) => {
                    // The stake is gone and the win is owed. Leave the marker
                    // in Resolved for reconciliation.
                    return Err(self.raise_partial_settlement(
                        &wager,
                        format!("payout credit failed: {}", e),
                    ));
                }
            }
        };

        let rows = settlement_rows(user_id, &wager_id, bet, outcome.payout);
        if let Err(e) = self.store.record_settlement(&wager, &rows) {
            return Err(self.raise_partial_settlement(
                &wager,
                format!("settlement record failed: {}", e),
            ));
        }

        self.append_bet_history(user_id, game, bet, &outcome, &wager_id);

        let result = serde_json::to_value(&outcome.result)?;
        Ok(WagerReceipt {
            wager_id,
            balance,
            payout: outcome.payout,
            result,
        })
    }

    /// BET/WIN primitive for client-settled games. A BET debits the stake and
    /// opens a provisional loss row; a WIN credits the payout and, when the
    /// caller proves the correlation with the wager id from its BET, patches
    /// that row to a win. A WIN without a wager id still pays but cannot
    /// rewrite history.
    pub fn settle(
        &self,
        user_id: &str,
        action: SettleAction,
        amount: Money,
        game: Option<GameType>,
        wager_id: Option<&str>,
    ) -> CasinoResult<SettleReceipt> {
        if amount.is_zero() {
            return Err(CasinoError::InvalidRequest(
                "amount must be positive".into(),
            ));
        }
        match action {
            SettleAction::Bet => {
                if amount > self.max_bet {
                    return Err(CasinoError::InvalidRequest(format!(
                        "bet exceeds the table maximum of {}",
                        self.max_bet
                    )));
                }
                let wager_id = Uuid::new_v4().to_string();
                // Balance and GameBet row commit in one batch.
                let row = TransactionRow {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    amount,
                    tx_type: TxType::GameBet,
                    status: TxStatus::Completed,
                    wager_id: Some(wager_id.clone()),
                    created_at: Utc::now(),
                };
                let account = self.debit_with_retry(user_id, amount, Some(&row))?;
                // Provisional loss; a correlated WIN may upgrade it. Written
                // only when the caller attributes the bet to a game.
                if let Some(game) = game {
                    if let Err(e) = self.store.append_bet(&BetRow {
                        id: Uuid::new_v4().to_string(),
                        user_id: user_id.to_string(),
                        game,
                        amount,
                        payout: Money::ZERO,
                        result: BetResult::Loss,
                        wager_id: Some(wager_id.clone()),
                        created_at: Utc::now(),
                    }) {
                        tracing::warn!(user_id, error = %e, "bet history write failed");
                    }
                }
                Ok(SettleReceipt {
                    balance: account.balance,
                    wager_id: Some(wager_id),
                })
            }
            SettleAction::Win => {
                let row = TransactionRow {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    amount,
                    tx_type: TxType::GameWin,
                    status: TxStatus::Completed,
                    wager_id: wager_id.map(str::to_string),
                    created_at: Utc::now(),
                };
                let account = self.store.credit_recorded(user_id, amount, &row)?;
                if let Some(wager_id) = wager_id {
                    match self.store.patch_bet_result(wager_id, amount, BetResult::Win) {
                        Ok(true) => {}
                        Ok(false) => {
                            tracing::warn!(user_id, wager_id, "win reported for unknown wager");
                        }
                        Err(e) => {
                            tracing::warn!(user_id, error = %e, "bet history patch failed");
                        }
                    }
                }
                Ok(SettleReceipt {
                    balance: account.balance,
                    wager_id: None,
                })
            }
        }
    }

    /// Administrative balance adjustment, recorded in the transaction log.
    pub fn adjust(&self, user_id: &str, tx_type: TxType, amount: Money) -> CasinoResult<Money> {
        if amount.is_zero() {
            return Err(CasinoError::InvalidRequest(
                "amount must be positive".into(),
            ));
        }
        if !matches!(tx_type, TxType::Deposit | TxType::Withdraw) {
            return Err(CasinoError::InvalidRequest(
                "game entries are written by settlement only".into(),
            ));
        }
        let row = TransactionRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            amount,
            tx_type,
            status: TxStatus::Completed,
            wager_id: None,
            created_at: Utc::now(),
        };
        let account = match tx_type {
            TxType::Deposit => self.store.credit_recorded(user_id, amount, &row)?,
            _ => self.debit_with_retry(user_id, amount, Some(&row))?,
        };
        Ok(account.balance)
    }

    fn lookup_game(&self, slug: &str) -> CasinoResult<GameType> {
        let descriptor = self
            .store
            .game(slug)?
            .ok_or_else(|| CasinoError::UnsupportedGame(slug.to_string()))?;
        if !descriptor.is_active {
            return Err(CasinoError::UnsupportedGame(slug.to_string()));
        }
        Ok(descriptor.game_type)
    }

    /// When `row` is given, the debit and the transaction row commit in one
    /// batch; the whole operation is retried on a version conflict.
    fn debit_with_retry(
        &self,
        user_id: &str,
        amount: Money,
        row: Option<&TransactionRow>,
    ) -> CasinoResult<crate::ledger::types::Account> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let account = self.store.account(user_id)?;
            let result = match row {
                Some(row) => self
                    .store
                    .debit_recorded(user_id, amount, account.version, row),
                None => self.store.debit(user_id, amount, account.version),
            };
            match result {
                Ok(account) => return Ok(account),
                Err(e) if e.is_retryable() && attempt < MAX_DEBIT_ATTEMPTS => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Compensating refund after a post-debit failure. On success the wager
    /// ends Rejected and the original error propagates; if the refund itself
    /// fails the fault escalates to a partial settlement.
    fn refund_failed_wager(
        &self,
        mut wager: WagerRecord,
        bet: Money,
        cause: CasinoError,
    ) -> CasinoError {
        match self.store.credit(&wager.user_id, bet) {
            Ok(_) => {
                wager.transition(WagerState::Rejected);
                if let Err(e) = self.store.put_wager(&wager) {
                    tracing::warn!(wager_id = %wager.wager_id, error = %e, "wager marker write failed");
                }
                tracing::warn!(
                    wager_id = %wager.wager_id,
                    user_id = %wager.user_id,
                    error = %cause,
                    "wager refunded after resolution failure"
                );
                cause
            }
            Err(refund_err) => self.raise_partial_settlement(
                &wager,
                format!("resolution failed ({}) and refund failed ({})", cause, refund_err),
            ),
        }
    }

    fn raise_partial_settlement(&self, wager: &WagerRecord, detail: String) -> CasinoError {
        tracing::error!(
            wager_id = %wager.wager_id,
            user_id = %wager.user_id,
            state = ?wager.state,
            %detail,
            "PARTIAL SETTLEMENT: manual reconciliation required"
        );
        CasinoError::PartialSettlement {
            wager_id: wager.wager_id.clone(),
            detail,
        }
    }

    fn append_bet_history(
        &self,
        user_id: &str,
        game: GameType,
        bet: Money,
        outcome: &Outcome,
        wager_id: &str,
    ) {
        let result = if outcome.payout.is_zero() {
            BetResult::Loss
        } else {
            BetResult::Win
        };
        let row = BetRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            game,
            amount: bet,
            payout: outcome.payout,
            result,
            wager_id: Some(wager_id.to_string()),
            created_at: Utc::now(),
        };
        if let Err(e) = self.store.append_bet(&row) {
            tracing::warn!(user_id, wager_id, error = %e, "bet history write failed");
        }
    }
}

fn settlement_rows(
    user_id: &str,
    wager_id: &str,
    bet: Money,
    payout: Money,
) -> Vec<TransactionRow> {
    let now = Utc::now();
    let mut rows = vec![TransactionRow {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        amount: bet,
        tx_type: TxType::GameBet,
        status: TxStatus::Completed,
        wager_id: Some(wager_id.to_string()),
        created_at: now,
    }];
    if !payout.is_zero() {
        rows.push(TransactionRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            amount: payout,
            tx_type: TxType::GameWin,
            status: TxStatus::Completed,
            wager_id: Some(wager_id.to_string()),
            created_at: now,
        });
    }
    rows
}
