//! House outcome-bias policy.
//!
//! The legacy implementation hid a forced-loss bias inside the draw itself,
//! conditioned on the player's selection. Here the bias is a named,
//! configurable business rule decided once per wager, before the game draws
//! anything. The default is `Fair`: honest, unconditioned sampling. Operators
//! who want the legacy behavior opt in explicitly via configuration.
//!
//! Only keno and classic slots honor a directive; blackjack and roulette
//! always draw fairly.

use crate::errors::CasinoResult;
use crate::rng::{EntropySource, SecureRandom};
use serde::{Deserialize, Serialize};

/// Outcome-bias rule applied per wager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HousePolicy {
    /// Honest uniform draws, unconditioned on the player's selection.
    Fair,
    /// Legacy biased behavior: with `loss_probability` the draw is steered
    /// away from the player's selection, otherwise toward a minimal win.
    ForcedBias { loss_probability: f64 },
}

impl Default for HousePolicy {
    fn default() -> Self {
        HousePolicy::Fair
    }
}

/// Per-wager decision handed to the game variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiasDirective {
    /// Draw honestly.
    None,
    /// Steer the draw so the wager cannot pay out.
    ForceLoss,
    /// Steer the draw toward the minimal winning outcome.
    ForceWin,
}

impl HousePolicy {
    /// Decide the directive for one wager, consuming secure randomness for
    /// the bias coin itself.
    pub fn directive<E: EntropySource>(
        &self,
        rng: &mut SecureRandom<E>,
    ) -> CasinoResult<BiasDirective> {
        match self {
            HousePolicy::Fair => Ok(BiasDirective::None),
            HousePolicy::ForcedBias { loss_probability } => {
                let bp = (loss_probability.clamp(0.0, 1.0) * 10_000.0).round() as u32;
                if rng.chance(bp)? {
                    Ok(BiasDirective::ForceLoss)
                } else {
                    Ok(BiasDirective::ForceWin)
                }
            }
        }
    }

    /// Validates operator-supplied policy parameters.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            HousePolicy::Fair => Ok(()),
            HousePolicy::ForcedBias { loss_probability } => {
                if (0.0..=1.0).contains(loss_probability) {
                    Ok(())
                } else {
                    Err(format!(
                        "loss_probability must be within [0, 1], got {}",
                        loss_probability
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedEntropy;

    #[test]
    fn fair_policy_never_touches_entropy() {
        let mut rng = SecureRandom::with_entropy(ScriptedEntropy::from_bytes(vec![]));
        assert_eq!(
            HousePolicy::Fair.directive(&mut rng).unwrap(),
            BiasDirective::None
        );
    }

    #[test]
    fn forced_bias_extremes() {
        let always_lose = HousePolicy::ForcedBias {
            loss_probability: 1.0,
        };
        let mut rng = SecureRandom::new();
        for _ in 0..20 {
            assert_eq!(
                always_lose.directive(&mut rng).unwrap(),
                BiasDirective::ForceLoss
            );
        }

        let always_win = HousePolicy::ForcedBias {
            loss_probability: 0.0,
        };
        for _ in 0..20 {
            assert_eq!(
                always_win.directive(&mut rng).unwrap(),
                BiasDirective::ForceWin
            );
        }
    }

    #[test]
    fn validation_bounds() {
        assert!(HousePolicy::Fair.validate().is_ok());
        assert!(HousePolicy::ForcedBias {
            loss_probability: 0.6
        }
        .validate()
        .is_ok());
        assert!(HousePolicy::ForcedBias {
            loss_probability: 1.5
        }
        .validate()
        .is_err());
    }
}
