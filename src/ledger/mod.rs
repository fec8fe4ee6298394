//! Money movement and wager settlement.
//!
//! `store` holds the RocksDB rows and the per-account compare-and-swap
//! primitives; `wager` drives the bet lifecycle (validate, debit, resolve,
//! credit, record) on top of it.

pub mod store;
pub mod types;
pub mod wager;

pub use store::CasinoStore;
pub use wager::{EntropyFactory, Ledger, SettleAction, SettleReceipt, WagerReceipt};
