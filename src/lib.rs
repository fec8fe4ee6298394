//! Rollhouse: a casino wagering service.
//!
//! Server-resolved games (keno, classic slots, blackjack, roulette) settle
//! through a single wager pipeline backed by an embedded RocksDB ledger;
//! client-settled games use the BET/WIN transaction primitive. All draws
//! come from OS entropy via rejection sampling.

pub mod api;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod games;
pub mod ledger;
pub mod money;
pub mod rng;
