//! Keno: pick 1-10 numbers from 1-80, the house draws 20.
//!
//! The draw is a uniform sample without replacement; the paytable keys off
//! the intersection size between the player's picks and the drawn set.

use crate::errors::{CasinoError, CasinoResult};
use crate::games::house::BiasDirective;
use crate::games::types::{KenoParams, KenoResult, Outcome, ResultPayload};
use crate::money::Money;
use crate::rng::{EntropySource, SecureRandom};

pub const NUMBER_MIN: u8 = 1;
pub const NUMBER_MAX: u8 = 80;
pub const DRAW_COUNT: usize = 20;
pub const MIN_SELECTION: usize = 1;
pub const MAX_SELECTION: usize = 10;

/// Matches guaranteed by a forced-win directive; two matches is the lowest
/// paying rung of the paytable.
const FORCED_WIN_MATCHES: usize = 2;

/// Payout multiplier per match count.
fn payout_multiplier(matches: usize) -> u64 {
    match matches {
        0 | 1 => 0,
        2 => 1,
        3 => 2,
        4 => 5,
        5 => 10,
        _ => 50,
    }
}

/// Validates player picks without consuming randomness. Called by the ledger
/// before the debit so a bad selection never mutates a balance.
pub fn validate(params: &KenoParams) -> CasinoResult<()> {
    let picks = &params.selected_numbers;
    if picks.len() < MIN_SELECTION || picks.len() > MAX_SELECTION {
        return Err(CasinoError::InvalidSelection(format!(
            "expected between {} and {} numbers, got {}",
            MIN_SELECTION,
            MAX_SELECTION,
            picks.len()
        )));
    }
    let mut seen = [false; (NUMBER_MAX + 1) as usize];
    for &n in picks {
        if !(NUMBER_MIN..=NUMBER_MAX).contains(&n) {
            return Err(CasinoError::InvalidSelection(format!(
                "number {} is outside {}..={}",
                n, NUMBER_MIN, NUMBER_MAX
            )));
        }
        if seen[n as usize] {
            return Err(CasinoError::InvalidSelection(format!(
                "number {} selected twice",
                n
            )));
        }
        seen[n as usize] = true;
    }
    Ok(())
}

pub fn resolve<E: EntropySource>(
    bet: Money,
    params: &KenoParams,
    rng: &mut SecureRandom<E>,
    directive: BiasDirective,
) -> CasinoResult<Outcome> {
    validate(params)?;
    let drawn = match directive {
        BiasDirective::None => {
            let mut drawn: Vec<u8> = rng
                .draw_unique(DRAW_COUNT, NUMBER_MIN as u64, NUMBER_MAX as u64)?
                .into_iter()
                .map(|n| n as u8)
                .collect();
            drawn.sort_unstable();
            drawn
        }
        BiasDirective::ForceLoss => draw_forced_loss(params, rng)?,
        BiasDirective::ForceWin => draw_forced_win(params, rng)?,
    };
    score(bet, &params.selected_numbers, drawn)
}

/// Draws 20 numbers from the complement of the player's selection.
fn draw_forced_loss<E: EntropySource>(
    params: &KenoParams,
    rng: &mut SecureRandom<E>,
) -> CasinoResult<Vec<u8>> {
    let mut pool: Vec<u8> = (NUMBER_MIN..=NUMBER_MAX)
        .filter(|n| !params.selected_numbers.contains(n))
        .collect();
    rng.shuffle(&mut pool)?;
    pool.truncate(DRAW_COUNT);
    pool.sort_unstable();
    Ok(pool)
}

/// Seeds the draw with two of the player's picks, then fills the remaining
/// slots uniformly from everything else.
fn draw_forced_win<E: EntropySource>(
    params: &KenoParams,
    rng: &mut SecureRandom<E>,
) -> CasinoResult<Vec<u8>> {
    let mut picks = params.selected_numbers.clone();
    rng.shuffle(&mut picks)?;
    let guaranteed: Vec<u8> = picks
        .into_iter()
        .take(FORCED_WIN_MATCHES.min(params.selected_numbers.len()))
        .collect();

    let mut pool: Vec<u8> = (NUMBER_MIN..=NUMBER_MAX)
        .filter(|n| !guaranteed.contains(n))
        .collect();
    rng.shuffle(&mut pool)?;

    let mut drawn = guaranteed;
    drawn.extend(pool.into_iter().take(DRAW_COUNT - drawn.len()));
    drawn.sort_unstable();
    Ok(drawn)
}

/// Settlement math: intersection count and paytable lookup. Pure, so tests
/// can force a drawn set directly.
pub(crate) fn score(bet: Money, selected: &[u8], drawn: Vec<u8>) -> CasinoResult<Outcome> {
    let matches = selected.iter().filter(|n| drawn.contains(n)).count();
    let payout = bet
        .checked_mul(payout_multiplier(matches))
        .ok_or_else(|| CasinoError::InvalidRequest("bet too large".into()))?;
    Ok(Outcome {
        payout,
        result: ResultPayload::Keno(KenoResult {
            drawn_numbers: drawn,
            matches: matches as u8,
            selected_numbers: selected.to_vec(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedEntropy;
    use std::collections::HashSet;

    fn params(picks: &[u8]) -> KenoParams {
        KenoParams {
            selected_numbers: picks.to_vec(),
        }
    }

    #[test]
    fn rejects_bad_selections() {
        assert!(validate(&params(&[])).is_err());
        assert!(validate(&params(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11])).is_err());
        assert!(validate(&params(&[0])).is_err());
        assert!(validate(&params(&[81])).is_err());
        assert!(validate(&params(&[7, 7])).is_err());
        assert!(validate(&params(&[1, 40, 80])).is_ok());
    }

    #[test]
    fn draws_twenty_unique_numbers_and_counts_matches() {
        let mut rng = SecureRandom::new();
        for _ in 0..50 {
            let outcome = resolve(
                Money::from_cents(1000),
                &params(&[4, 8, 15, 16, 23, 42]),
                &mut rng,
                BiasDirective::None,
            )
            .unwrap();
            let ResultPayload::Keno(result) = outcome.result else {
                panic!("expected keno payload");
            };
            assert_eq!(result.drawn_numbers.len(), DRAW_COUNT);
            let unique: HashSet<u8> = result.drawn_numbers.iter().copied().collect();
            assert_eq!(unique.len(), DRAW_COUNT);
            assert!(result
                .drawn_numbers
                .iter()
                .all(|n| (NUMBER_MIN..=NUMBER_MAX).contains(n)));
            let expected_matches = result
                .selected_numbers
                .iter()
                .filter(|n| result.drawn_numbers.contains(n))
                .count();
            assert_eq!(result.matches as usize, expected_matches);
        }
    }

    #[test]
    fn three_matches_pay_double() {
        // Zeroed entropy pins the partial Fisher-Yates, so the draw is 1..=20
        // and picks 1, 2, 3 all match.
        let mut rng = SecureRandom::with_entropy(ScriptedEntropy::repeat(0, 64));
        let outcome = resolve(
            Money::from_cents(1000),
            &params(&[1, 2, 3]),
            &mut rng,
            BiasDirective::None,
        )
        .unwrap();
        assert_eq!(outcome.payout, Money::from_cents(2000));
        let ResultPayload::Keno(result) = outcome.result else {
            panic!("expected keno payload");
        };
        assert_eq!(result.matches, 3);
        assert_eq!(result.drawn_numbers, (1..=20).collect::<Vec<u8>>());
    }

    #[test]
    fn paytable_rungs() {
        let bet = Money::from_cents(100);
        let drawn: Vec<u8> = (1..=20).collect();
        for (picks, multiplier) in [
            (vec![21u8], 0u64),
            (vec![1, 21], 0),
            (vec![1, 2, 21], 1),
            (vec![1, 2], 1),
            (vec![1, 2, 3], 2),
            (vec![1, 2, 3, 4], 5),
            (vec![1, 2, 3, 4, 5], 10),
            (vec![1, 2, 3, 4, 5, 6], 50),
            (vec![1, 2, 3, 4, 5, 6, 7, 8], 50),
        ] {
            let outcome = score(bet, &picks, drawn.clone()).unwrap();
            assert_eq!(
                outcome.payout,
                bet.checked_mul(multiplier).unwrap(),
                "picks {:?}",
                picks
            );
        }
    }

    #[test]
    fn forced_loss_never_matches() {
        let mut rng = SecureRandom::new();
        for _ in 0..25 {
            let outcome = resolve(
                Money::from_cents(500),
                &params(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
                &mut rng,
                BiasDirective::ForceLoss,
            )
            .unwrap();
            assert_eq!(outcome.payout, Money::ZERO);
            let ResultPayload::Keno(result) = outcome.result else {
                panic!("expected keno payload");
            };
            assert_eq!(result.matches, 0);
            assert_eq!(result.drawn_numbers.len(), DRAW_COUNT);
        }
    }

    #[test]
    fn forced_win_guarantees_at_least_two_matches() {
        let mut rng = SecureRandom::new();
        for _ in 0..25 {
            let outcome = resolve(
                Money::from_cents(500),
                &params(&[11, 22, 33]),
                &mut rng,
                BiasDirective::ForceWin,
            )
            .unwrap();
            let ResultPayload::Keno(result) = outcome.result else {
                panic!("expected keno payload");
            };
            assert!(result.matches >= 2);
            assert!(outcome.payout >= Money::from_cents(500));
            let unique: HashSet<u8> = result.drawn_numbers.iter().copied().collect();
            assert_eq!(unique.len(), DRAW_COUNT);
        }
    }
}
