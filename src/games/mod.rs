//! Game outcome engine.
//!
//! One pure resolver per variant mapping (bet, player parameters, random
//! draws) to (payout, public result). The engine owns no balance state; the
//! ledger debits before calling in and credits after.

pub mod blackjack;
pub mod house;
pub mod keno;
pub mod roulette;
pub mod slots;
pub mod types;

use crate::errors::{CasinoError, CasinoResult};
use crate::money::Money;
use crate::rng::{EntropySource, SecureRandom};
use house::HousePolicy;
use types::{GameType, KenoParams, Outcome, RouletteParams, SlotsParams};

/// Dispatches wagers to the per-game resolvers under a house policy.
#[derive(Debug, Clone)]
pub struct OutcomeEngine {
    policy: HousePolicy,
}

impl OutcomeEngine {
    pub fn new(policy: HousePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &HousePolicy {
        &self.policy
    }

    /// Parses and validates player parameters without consuming randomness
    /// or mutating anything. The ledger runs this before the debit so every
    /// game-logic failure surfaces while no state has changed.
    pub fn validate(
        &self,
        game: GameType,
        bet: Money,
        params: &serde_json::Value,
    ) -> CasinoResult<()> {
        if bet.is_zero() {
            return Err(CasinoError::InvalidRequest("bet must be positive".into()));
        }
        match game {
            GameType::Keno => keno::validate(&parse::<KenoParams>(params)?),
            GameType::ClassicSlots => {
                parse::<SlotsParams>(params)?;
                Ok(())
            }
            GameType::Blackjack => Ok(()),
            GameType::Roulette => roulette::validate(bet, &parse::<RouletteParams>(params)?),
            GameType::CoinFlip => Err(CasinoError::UnsupportedGame(
                "coin-flip settles client-side via the transaction endpoint".into(),
            )),
        }
    }

    /// Resolves a validated wager with fresh randomness.
    pub fn resolve<E: EntropySource>(
        &self,
        game: GameType,
        bet: Money,
        params: &serde_json::Value,
        rng: &mut SecureRandom<E>,
    ) -> CasinoResult<Outcome> {
        if bet.is_zero() {
            return Err(CasinoError::InvalidRequest("bet must be positive".into()));
        }
        match game {
            GameType::Keno => {
                let params = parse::<KenoParams>(params)?;
                let directive = self.policy.directive(rng)?;
                keno::resolve(bet, &params, rng, directive)
            }
            GameType::ClassicSlots => {
                let params = parse::<SlotsParams>(params)?;
                let directive = self.policy.directive(rng)?;
                slots::resolve(bet, &params, rng, directive)
            }
            GameType::Blackjack => blackjack::resolve(bet, rng),
            GameType::Roulette => {
                let params = parse::<RouletteParams>(params)?;
                roulette::resolve(bet, &params, rng)
            }
            GameType::CoinFlip => Err(CasinoError::UnsupportedGame(
                "coin-flip settles client-side via the transaction endpoint".into(),
            )),
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(params: &serde_json::Value) -> CasinoResult<T> {
    serde_json::from_value(params.clone())
        .map_err(|e| CasinoError::InvalidRequest(format!("invalid game parameters: {}", e)))
}
