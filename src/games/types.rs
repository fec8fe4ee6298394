//! Shared game types: catalog identifiers, per-game parameters and the
//! public result payloads returned to clients.

use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported game variants. Serialized form matches the catalog slugs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    Keno,
    ClassicSlots,
    Blackjack,
    Roulette,
    /// Settled client-side through the low-level transaction endpoint;
    /// never resolved by the outcome engine.
    CoinFlip,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            GameType::Keno => "keno",
            GameType::ClassicSlots => "classic-slots",
            GameType::Blackjack => "blackjack",
            GameType::Roulette => "roulette",
            GameType::CoinFlip => "coin-flip",
        };
        write!(f, "{}", slug)
    }
}

/// Resolved wager outcome: the payout plus the payload clients use for the
/// reveal animation.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub payout: Money,
    pub result: ResultPayload,
}

/// Game-specific public result data.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResultPayload {
    Keno(KenoResult),
    Slots(SlotsResult),
    Blackjack(BlackjackResult),
    Roulette(RouletteResult),
}

// --- Keno ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KenoParams {
    pub selected_numbers: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KenoResult {
    pub drawn_numbers: Vec<u8>,
    pub matches: u8,
    pub selected_numbers: Vec<u8>,
}

// --- Classic slots ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SlotsParams {
    #[serde(default = "default_lines")]
    pub lines: u32,
}

fn default_lines() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotSymbol {
    Cherry,
    Lemon,
    Orange,
    Grape,
    Bell,
    Diamond,
    Seven,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsResult {
    pub grid: [[SlotSymbol; 3]; 3],
    /// 1-based payline indices that paid out, always within the lines played.
    pub winning_lines: Vec<u8>,
}

// --- Blackjack ---

/// Card code `0..=51`: rank = code % 13 (0 is Ace), suit = code / 13.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card(pub u8);

impl Card {
    pub fn rank(self) -> u8 {
        self.0 % 13
    }

    pub fn suit(self) -> u8 {
        self.0 / 13
    }

    /// Blackjack value with Ace counted high (11); soft adjustment is done
    /// at the hand level.
    pub fn value(self) -> u8 {
        match self.rank() {
            0 => 11,
            r if r >= 9 => 10,
            r => r + 1,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const RANKS: [&str; 13] = [
            "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
        ];
        const SUITS: [&str; 4] = ["S", "H", "D", "C"];
        write!(
            f,
            "{}{}",
            RANKS[self.rank() as usize],
            SUITS[self.suit() as usize]
        )
    }
}

impl Serialize for Card {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandOutcome {
    Win,
    Push,
    Loss,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackjackResult {
    pub player_hand: Vec<Card>,
    pub dealer_hand: Vec<Card>,
    pub player_total: u8,
    pub dealer_total: u8,
    pub outcome: HandOutcome,
}

// --- Roulette ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouletteColor {
    Red,
    Black,
    Green,
}

/// One sub-bet on the table. The amounts across all sub-bets must add up to
/// the wager's bet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouletteBet {
    #[serde(flatten)]
    pub kind: RouletteBetKind,
    pub amount: Money,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RouletteBetKind {
    Straight { number: u8 },
    Color { color: RouletteColor },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RouletteParams {
    pub bets: Vec<RouletteBet>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouletteResult {
    pub winning_number: u8,
    pub color: RouletteColor,
    /// Indices into the submitted bet list that paid out.
    pub winning_bets: Vec<usize>,
}
