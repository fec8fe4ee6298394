//! Single-round blackjack against the house.
//!
//! One freshly shuffled 52-card deck per wager. Player and dealer each get
//! two cards; the player stands, the dealer draws to 17. Wins pay twice the
//! bet, pushes return it. Always a fair draw; the house policy does not
//! apply here.

use crate::errors::{CasinoError, CasinoResult};
use crate::games::types::{BlackjackResult, Card, HandOutcome, Outcome, ResultPayload};
use crate::money::Money;
use crate::rng::{EntropySource, SecureRandom};

const DECK_SIZE: u8 = 52;
const DEALER_STANDS_AT: u8 = 17;
const BUST_OVER: u8 = 21;

/// Hand total with soft-ace adjustment: aces count 11, downgraded to 1 one
/// at a time while the total busts.
pub fn hand_value(cards: &[Card]) -> u8 {
    let mut total: u32 = cards.iter().map(|c| c.value() as u32).sum();
    let mut aces = cards.iter().filter(|c| c.rank() == 0).count();
    while total > BUST_OVER as u32 && aces > 0 {
        total -= 10;
        aces -= 1;
    }
    total as u8
}

pub fn resolve<E: EntropySource>(bet: Money, rng: &mut SecureRandom<E>) -> CasinoResult<Outcome> {
    let mut deck: Vec<Card> = (0..DECK_SIZE).map(Card).collect();
    rng.shuffle(&mut deck)?;
    let mut deal = deck.into_iter();

    // Alternating two-card deal, player first.
    let mut player = vec![next_card(&mut deal)?];
    let mut dealer = vec![next_card(&mut deal)?];
    player.push(next_card(&mut deal)?);
    dealer.push(next_card(&mut deal)?);

    while hand_value(&dealer) < DEALER_STANDS_AT {
        dealer.push(next_card(&mut deal)?);
    }

    settle(bet, player, dealer)
}

fn next_card(deal: &mut impl Iterator<Item = Card>) -> CasinoResult<Card> {
    deal.next()
        .ok_or_else(|| CasinoError::Storage("deck exhausted".into()))
}

/// Resolution from fixed hands; pure so tests can pin the cards.
pub(crate) fn settle(bet: Money, player: Vec<Card>, dealer: Vec<Card>) -> CasinoResult<Outcome> {
    let player_total = hand_value(&player);
    let dealer_total = hand_value(&dealer);

    let outcome = if dealer_total > BUST_OVER || player_total > dealer_total {
        HandOutcome::Win
    } else if player_total == dealer_total {
        HandOutcome::Push
    } else {
        HandOutcome::Loss
    };

    let payout = match outcome {
        HandOutcome::Win => bet
            .checked_mul(2)
            .ok_or_else(|| CasinoError::InvalidRequest("bet too large".into()))?,
        HandOutcome::Push => bet,
        HandOutcome::Loss => Money::ZERO,
    };

    Ok(Outcome {
        payout,
        result: ResultPayload::Blackjack(BlackjackResult {
            player_hand: player,
            dealer_hand: dealer,
            player_total,
            dealer_total,
            outcome,
        }),
    })
}
