//! Static game catalog.
//!
//! Descriptors attribute bets to games and gate which slugs accept wagers.
//! The catalog is seeded into the store at startup and read-only at wager
//! time.

use crate::games::types::GameType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameDescriptor {
    pub slug: String,
    pub name: String,
    pub game_type: GameType,
    pub is_active: bool,
}

impl GameDescriptor {
    fn new(name: &str, game_type: GameType) -> Self {
        Self {
            slug: game_type.to_string(),
            name: name.to_string(),
            game_type,
            is_active: true,
        }
    }
}

/// The launch catalog. Coin flip is listed but settles client-side.
pub fn default_catalog() -> Vec<GameDescriptor> {
    vec![
        GameDescriptor::new("Keno", GameType::Keno),
        GameDescriptor::new("Classic Slots", GameType::ClassicSlots),
        GameDescriptor::new("Blackjack", GameType::Blackjack),
        GameDescriptor::new("Roulette", GameType::Roulette),
        GameDescriptor::new("Coin Flip", GameType::CoinFlip),
    ]
}
