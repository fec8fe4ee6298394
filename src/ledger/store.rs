//! RocksDB-backed account and ledger store.
//!
//! Single embedded database, JSON-encoded rows, prefix-scanned listings.
//! Balance writes serialize per account through a lock registry and carry a
//! version counter for compare-and-swap debits; cross-account operations are
//! fully independent. The handle is constructed once at startup and injected
//! wherever it is needed - there is no ambient global client.
//!
//! Key layout (listing keys embed an inverted timestamp so a forward prefix
//! scan yields newest-first):
//!   account:{id}
//!   game:{slug}
//!   wager:{wager_id}
//!   txn:{user}:{inv_ts}:{row_id}
//!   bet:{user}:{inv_ts}:{row_id}
//!   betwager:{wager_id}            -> primary bet key, for result patching

use crate::catalog::GameDescriptor;
use crate::errors::{CasinoError, CasinoResult};
use crate::ledger::types::{Account, BetRow, Role, TransactionRow, WagerRecord, WagerState};
use crate::money::Money;
use chrono::Utc;
use dashmap::DashMap;
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct CasinoStore {
    db: Arc<DB>,
    account_locks: DashMap<String, Arc<Mutex<()>>>,
}

fn account_key(id: &str) -> String {
    format!("account:{}", id)
}

fn game_key(slug: &str) -> String {
    format!("game:{}", slug)
}

fn wager_key(id: &str) -> String {
    format!("wager:{}", id)
}

fn bet_wager_index_key(wager_id: &str) -> String {
    format!("betwager:{}", wager_id)
}

fn inverted_now() -> u64 {
    u64::MAX - Utc::now().timestamp_millis().max(0) as u64
}

fn txn_row_key(user_id: &str, row_id: &str) -> String {
    format!("txn:{}:{:020}:{}", user_id, inverted_now(), row_id)
}

fn bet_row_key(user_id: &str, row_id: &str) -> String {
    format!("bet:{}:{:020}:{}", user_id, inverted_now(), row_id)
}

impl CasinoStore {
    pub fn open<P: AsRef<Path>>(path: P) -> CasinoResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        let db = DB::open(&opts, path)?;
        Ok(Self {
            db: Arc::new(db),
            account_locks: DashMap::new(),
        })
    }

    // --- generic row helpers ---

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> CasinoResult<Option<T>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(|e| {
                CasinoError::Storage(format!("corrupt row at {}: {}", key, e))
            })?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, key: &str, value: &T) -> CasinoResult<()> {
        self.db.put(key.as_bytes(), serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn scan_prefix<T: DeserializeOwned>(&self, prefix: &str, limit: usize) -> CasinoResult<Vec<T>> {
        let mut rows = Vec::new();
        let iter = self.db.iterator(IteratorMode::From(
            prefix.as_bytes(),
            Direction::Forward,
        ));
        for entry in iter {
            let (key, value) = entry?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            rows.push(serde_json::from_slice(&value).map_err(|e| {
                CasinoError::Storage(format!("corrupt row under {}: {}", prefix, e))
            })?);
            if rows.len() >= limit {
                break;
            }
        }
        Ok(rows)
    }

    // --- accounts ---

    fn account_lock(&self, id: &str) -> Arc<Mutex<()>> {
        self.account_locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn guard<'a>(&self, lock: &'a Mutex<()>) -> CasinoResult<MutexGuard<'a, ()>> {
        lock.lock()
            .map_err(|_| CasinoError::Storage("account lock poisoned".into()))
    }

    pub fn create_account(
        &self,
        id: &str,
        role: Role,
        starting_balance: Money,
    ) -> CasinoResult<Account> {
        let lock = self.account_lock(id);
        let _guard = self.guard(&lock)?;
        if self.get_json::<Account>(&account_key(id))?.is_some() {
            return Err(CasinoError::AccountExists(id.to_string()));
        }
        let account = Account {
            id: id.to_string(),
            balance: starting_balance,
            role,
            version: 0,
            created_at: Utc::now(),
        };
        self.put_json(&account_key(id), &account)?;
        Ok(account)
    }

    pub fn account(&self, id: &str) -> CasinoResult<Account> {
        self.get_json(&account_key(id))?
            .ok_or_else(|| CasinoError::UserNotFound(id.to_string()))
    }

    /// Conditional debit: succeeds only if the account version still matches
    /// what the caller observed and the balance covers the amount.
    pub fn debit(&self, id: &str, amount: Money, expected_version: u64) -> CasinoResult<Account> {
        let lock = self.account_lock(id);
        let _guard = self.guard(&lock)?;
        let mut account = self.account(id)?;
        if account.version != expected_version {
            return Err(CasinoError::ConcurrentModification(id.to_string()));
        }
        account.balance = account
            .balance
            .checked_sub(amount)
            .ok_or(CasinoError::InsufficientFunds)?;
        account.version += 1;
        self.put_json(&account_key(id), &account)?;
        Ok(account)
    }

    /// Unconditional credit. Payouts and refunds must land regardless of
    /// interleaved debits, so this only bumps the version.
    pub fn credit(&self, id: &str, amount: Money) -> CasinoResult<Account> {
        let lock = self.account_lock(id);
        let _guard = self.guard(&lock)?;
        let mut account = self.account(id)?;
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| CasinoError::Storage("balance overflow".into()))?;
        account.version += 1;
        self.put_json(&account_key(id), &account)?;
        Ok(account)
    }

    /// Conditional debit that commits the balance write and its transaction
    /// row in one batch, so a balance can never move without its row.
    pub fn debit_recorded(
        &self,
        id: &str,
        amount: Money,
        expected_version: u64,
        row: &TransactionRow,
    ) -> CasinoResult<Account> {
        let lock = self.account_lock(id);
        let _guard = self.guard(&lock)?;
        let mut account = self.account(id)?;
        if account.version != expected_version {
            return Err(CasinoError::ConcurrentModification(id.to_string()));
        }
        account.balance = account
            .balance
            .checked_sub(amount)
            .ok_or(CasinoError::InsufficientFunds)?;
        account.version += 1;
        self.write_account_with_row(&account, row)?;
        Ok(account)
    }

    /// Credit counterpart of [`debit_recorded`](Self::debit_recorded).
    pub fn credit_recorded(
        &self,
        id: &str,
        amount: Money,
        row: &TransactionRow,
    ) -> CasinoResult<Account> {
        let lock = self.account_lock(id);
        let _guard = self.guard(&lock)?;
        let mut account = self.account(id)?;
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| CasinoError::Storage("balance overflow".into()))?;
        account.version += 1;
        self.write_account_with_row(&account, row)?;
        Ok(account)
    }

    fn write_account_with_row(
        &self,
        account: &Account,
        row: &TransactionRow,
    ) -> CasinoResult<()> {
        let mut batch = WriteBatch::default();
        batch.put(
            account_key(&account.id).as_bytes(),
            serde_json::to_vec(account)?,
        );
        batch.put(
            txn_row_key(&row.user_id, &row.id).as_bytes(),
            serde_json::to_vec(row)?,
        );
        self.db.write(batch)?;
        Ok(())
    }

    // --- game catalog ---

    pub fn put_game(&self, descriptor: &GameDescriptor) -> CasinoResult<()> {
        self.put_json(&game_key(&descriptor.slug), descriptor)
    }

    pub fn game(&self, slug: &str) -> CasinoResult<Option<GameDescriptor>> {
        self.get_json(&game_key(slug))
    }

    pub fn list_games(&self) -> CasinoResult<Vec<GameDescriptor>> {
        self.scan_prefix("game:", usize::MAX)
    }

    /// Seeds missing catalog entries; existing rows (for example a game an
    /// operator deactivated) are left untouched.
    pub fn seed_catalog(&self, catalog: &[GameDescriptor]) -> CasinoResult<usize> {
        let mut seeded = 0;
        for descriptor in catalog {
            if self.game(&descriptor.slug)?.is_none() {
                self.put_game(descriptor)?;
                seeded += 1;
            }
        }
        Ok(seeded)
    }

    // --- wager markers ---

    pub fn put_wager(&self, wager: &WagerRecord) -> CasinoResult<()> {
        self.put_json(&wager_key(&wager.wager_id), wager)
    }

    pub fn wager(&self, wager_id: &str) -> CasinoResult<Option<WagerRecord>> {
        self.get_json(&wager_key(wager_id))
    }

    /// All wager markers. Reconciliation sweeps use this to find wagers
    /// stuck short of `Settled`.
    pub fn list_wagers(&self) -> CasinoResult<Vec<WagerRecord>> {
        self.scan_prefix("wager:", usize::MAX)
    }

    // --- ledger rows ---

    /// Atomically appends the settlement transaction rows and flips the
    /// wager marker to `Settled` in one write batch. Idempotent on the wager
    /// id: replaying a settled wager writes nothing.
    pub fn record_settlement(
        &self,
        wager: &WagerRecord,
        rows: &[TransactionRow],
    ) -> CasinoResult<()> {
        if let Some(existing) = self.wager(&wager.wager_id)? {
            if existing.state == WagerState::Settled {
                return Ok(());
            }
        }
        let mut settled = wager.clone();
        settled.transition(WagerState::Settled);

        let mut batch = WriteBatch::default();
        batch.put(
            wager_key(&wager.wager_id).as_bytes(),
            serde_json::to_vec(&settled)?,
        );
        for row in rows {
            batch.put(
                txn_row_key(&row.user_id, &row.id).as_bytes(),
                serde_json::to_vec(row)?,
            );
        }
        self.db.write(batch)?;
        Ok(())
    }

    pub fn list_transactions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> CasinoResult<Vec<TransactionRow>> {
        self.scan_prefix(&format!("txn:{}:", user_id), limit)
    }

    // --- bet history (best-effort side writes) ---

    pub fn append_bet(&self, row: &BetRow) -> CasinoResult<()> {
        let key = bet_row_key(&row.user_id, &row.id);
        let mut batch = WriteBatch::default();
        batch.put(key.as_bytes(), serde_json::to_vec(row)?);
        if let Some(wager_id) = &row.wager_id {
            batch.put(bet_wager_index_key(wager_id).as_bytes(), key.as_bytes());
        }
        self.db.write(batch)?;
        Ok(())
    }

    /// Patches a provisional bet row to its final result, located through
    /// the wager-id index. Unknown wager ids are a no-op so stale clients
    /// cannot flip arbitrary history.
    pub fn patch_bet_result(
        &self,
        wager_id: &str,
        payout: Money,
        result: crate::ledger::types::BetResult,
    ) -> CasinoResult<bool> {
        let Some(key_bytes) = self.db.get(bet_wager_index_key(wager_id).as_bytes())? else {
            return Ok(false);
        };
        let key = String::from_utf8(key_bytes)
            .map_err(|_| CasinoError::Storage("corrupt bet index key".into()))?;
        let Some(mut row) = self.get_json::<BetRow>(&key)? else {
            return Ok(false);
        };
        row.payout = payout;
        row.result = result;
        self.put_json(&key, &row)?;
        Ok(true)
    }

    pub fn list_bets(&self, user_id: &str, limit: usize) -> CasinoResult<Vec<BetRow>> {
        self.scan_prefix(&format!("bet:{}:", user_id), limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::games::types::GameType;
    use crate::ledger::types::{BetResult, TxStatus, TxType};
    use tempfile::TempDir;

    fn open_store() -> (TempDir, CasinoStore) {
        let dir = TempDir::new().unwrap();
        let store = CasinoStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn txn_row(user: &str, id: &str, cents: u64, tx_type: TxType) -> TransactionRow {
        TransactionRow {
            id: id.into(),
            user_id: user.into(),
            amount: Money::from_cents(cents),
            tx_type,
            status: TxStatus::Completed,
            wager_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn account_lifecycle() {
        let (_dir, store) = open_store();
        let account = store
            .create_account("alice", Role::User, Money::from_cents(10_000))
            .unwrap();
        assert_eq!(account.version, 0);
        assert!(matches!(
            store.create_account("alice", Role::User, Money::ZERO),
            Err(CasinoError::AccountExists(_))
        ));
        assert!(matches!(
            store.account("nobody"),
            Err(CasinoError::UserNotFound(_))
        ));
    }

    #[test]
    fn debit_enforces_version_and_balance() {
        let (_dir, store) = open_store();
        store
            .create_account("bob", Role::User, Money::from_cents(10_000))
            .unwrap();

        let debited = store.debit("bob", Money::from_cents(4_000), 0).unwrap();
        assert_eq!(debited.balance.cents(), 6_000);
        assert_eq!(debited.version, 1);

        // Stale version loses the race.
        assert!(matches!(
            store.debit("bob", Money::from_cents(1_000), 0),
            Err(CasinoError::ConcurrentModification(_))
        ));

        // Overdraft is rejected without mutation.
        assert!(matches!(
            store.debit("bob", Money::from_cents(7_000), 1),
            Err(CasinoError::InsufficientFunds)
        ));
        assert_eq!(store.account("bob").unwrap().balance.cents(), 6_000);
    }

    #[test]
    fn catalog_seeding_is_additive() {
        let (_dir, store) = open_store();
        let catalog = default_catalog();
        assert_eq!(store.seed_catalog(&catalog).unwrap(), catalog.len());
        assert_eq!(store.seed_catalog(&catalog).unwrap(), 0);

        let mut keno = store.game("keno").unwrap().unwrap();
        keno.is_active = false;
        store.put_game(&keno).unwrap();
        // Re-seeding must not resurrect a deactivated game.
        store.seed_catalog(&catalog).unwrap();
        assert!(!store.game("keno").unwrap().unwrap().is_active);
    }

    #[test]
    fn settlement_record_is_idempotent() {
        let (_dir, store) = open_store();
        let wager = WagerRecord::new(
            "w1".into(),
            "carol".into(),
            GameType::Keno,
            Money::from_cents(1_000),
        );
        let rows = vec![
            txn_row("carol", "r1", 1_000, TxType::GameBet),
            txn_row("carol", "r2", 2_000, TxType::GameWin),
        ];
        store.record_settlement(&wager, &rows).unwrap();
        store.record_settlement(&wager, &rows).unwrap();

        let listed = store.list_transactions("carol", 100).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(
            store.wager("w1").unwrap().unwrap().state,
            WagerState::Settled
        );
    }

    #[test]
    fn transactions_list_newest_first() {
        let (_dir, store) = open_store();
        store.create_account("dave", Role::User, Money::ZERO).unwrap();
        store
            .credit_recorded(
                "dave",
                Money::from_cents(100),
                &txn_row("dave", "r1", 100, TxType::Deposit),
            )
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store
            .credit_recorded(
                "dave",
                Money::from_cents(200),
                &txn_row("dave", "r2", 200, TxType::Deposit),
            )
            .unwrap();

        let rows = store.list_transactions("dave", 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "r2");
        assert_eq!(store.list_transactions("dave", 1).unwrap().len(), 1);
        // Other users' rows are invisible.
        assert!(store.list_transactions("erin", 10).unwrap().is_empty());
    }

    #[test]
    fn recorded_writes_commit_balance_and_row_together() {
        let (_dir, store) = open_store();
        store
            .create_account("gina", Role::User, Money::from_cents(10_000))
            .unwrap();

        let debited = store
            .debit_recorded(
                "gina",
                Money::from_cents(4_000),
                0,
                &txn_row("gina", "r1", 4_000, TxType::GameBet),
            )
            .unwrap();
        assert_eq!(debited.balance.cents(), 6_000);
        assert_eq!(store.list_transactions("gina", 10).unwrap().len(), 1);

        // A lost race writes neither the balance nor the row.
        assert!(matches!(
            store.debit_recorded(
                "gina",
                Money::from_cents(1_000),
                0,
                &txn_row("gina", "r2", 1_000, TxType::GameBet),
            ),
            Err(CasinoError::ConcurrentModification(_))
        ));
        assert_eq!(store.account("gina").unwrap().balance.cents(), 6_000);
        assert_eq!(store.list_transactions("gina", 10).unwrap().len(), 1);

        // Same for an overdraft.
        assert!(matches!(
            store.debit_recorded(
                "gina",
                Money::from_cents(7_000),
                1,
                &txn_row("gina", "r3", 7_000, TxType::GameBet),
            ),
            Err(CasinoError::InsufficientFunds)
        ));
        assert_eq!(store.list_transactions("gina", 10).unwrap().len(), 1);

        let credited = store
            .credit_recorded(
                "gina",
                Money::from_cents(500),
                &txn_row("gina", "r4", 500, TxType::GameWin),
            )
            .unwrap();
        assert_eq!(credited.balance.cents(), 6_500);
        assert_eq!(store.list_transactions("gina", 10).unwrap().len(), 2);
    }

    #[test]
    fn bet_patching_requires_a_known_wager_id() {
        let (_dir, store) = open_store();
        let row = BetRow {
            id: "b1".into(),
            user_id: "frank".into(),
            game: GameType::CoinFlip,
            amount: Money::from_cents(500),
            payout: Money::ZERO,
            result: BetResult::Loss,
            wager_id: Some("w9".into()),
            created_at: Utc::now(),
        };
        store.append_bet(&row).unwrap();

        assert!(store
            .patch_bet_result("w9", Money::from_cents(1_000), BetResult::Win)
            .unwrap());
        let bets = store.list_bets("frank", 10).unwrap();
        assert_eq!(bets[0].result, BetResult::Win);
        assert_eq!(bets[0].payout.cents(), 1_000);

        assert!(!store
            .patch_bet_result("unknown", Money::from_cents(1), BetResult::Win)
            .unwrap());
    }
}
