//! European roulette: one zero, 37 wheel positions.
//!
//! A wager is a set of sub-bets whose amounts must add up to the bet.
//! Straight numbers pay 36x, colors pay 2x; zero is neither red nor black.
//! Always a fair draw.

use crate::errors::{CasinoError, CasinoResult};
use crate::games::types::{
    Outcome, ResultPayload, RouletteBet, RouletteBetKind, RouletteColor, RouletteParams,
    RouletteResult,
};
use crate::money::Money;
use crate::rng::{EntropySource, SecureRandom};

pub const WHEEL_MAX: u8 = 36;
const STRAIGHT_MULTIPLIER: u64 = 36;
const COLOR_MULTIPLIER: u64 = 2;

/// The 18 red numbers of the European layout.
const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

pub fn color_of(number: u8) -> RouletteColor {
    if number == 0 {
        RouletteColor::Green
    } else if RED_NUMBERS.contains(&number) {
        RouletteColor::Red
    } else {
        RouletteColor::Black
    }
}

/// Validates sub-bets against the wager bet without consuming randomness.
pub fn validate(bet: Money, params: &RouletteParams) -> CasinoResult<()> {
    if params.bets.is_empty() {
        return Err(CasinoError::InvalidRequest(
            "at least one roulette bet is required".into(),
        ));
    }
    let mut total = Money::ZERO;
    for sub in &params.bets {
        if sub.amount.is_zero() {
            return Err(CasinoError::InvalidRequest(
                "roulette bet amounts must be positive".into(),
            ));
        }
        if let RouletteBetKind::Straight { number } = sub.kind {
            if number > WHEEL_MAX {
                return Err(CasinoError::InvalidRequest(format!(
                    "straight bet on {} is outside the wheel",
                    number
                )));
            }
        }
        total = total
            .checked_add(sub.amount)
            .ok_or_else(|| CasinoError::InvalidRequest("bet too large".into()))?;
    }
    if total != bet {
        return Err(CasinoError::InvalidRequest(format!(
            "sub-bets total {} but the wager bet is {}",
            total, bet
        )));
    }
    Ok(())
}

pub fn resolve<E: EntropySource>(
    bet: Money,
    params: &RouletteParams,
    rng: &mut SecureRandom<E>,
) -> CasinoResult<Outcome> {
    validate(bet, params)?;
    let winning = rng.random_int(0, WHEEL_MAX as u64)? as u8;
    score(&params.bets, winning)
}

/// Payout accounting for a known winning number; pure for tests.
pub(crate) fn score(bets: &[RouletteBet], winning: u8) -> CasinoResult<Outcome> {
    let color = color_of(winning);
    let mut payout = Money::ZERO;
    let mut winning_bets = Vec::new();

    for (i, sub) in bets.iter().enumerate() {
        let multiplier = match sub.kind {
            RouletteBetKind::Straight { number } if number == winning => STRAIGHT_MULTIPLIER,
            RouletteBetKind::Color { color: c } if c == color && color != RouletteColor::Green => {
                COLOR_MULTIPLIER
            }
            _ => continue,
        };
        let win = sub
            .amount
            .checked_mul(multiplier)
            .ok_or_else(|| CasinoError::InvalidRequest("bet too large".into()))?;
        payout = payout
            .checked_add(win)
            .ok_or_else(|| CasinoError::InvalidRequest("bet too large".into()))?;
        winning_bets.push(i);
    }

    Ok(Outcome {
        payout,
        result: ResultPayload::Roulette(RouletteResult {
            winning_number: winning,
            color,
            winning_bets,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(number: u8, cents: u64) -> RouletteBet {
        RouletteBet {
            kind: RouletteBetKind::Straight { number },
            amount: Money::from_cents(cents),
        }
    }

    fn color(c: RouletteColor, cents: u64) -> RouletteBet {
        RouletteBet {
            kind: RouletteBetKind::Color { color: c },
            amount: Money::from_cents(cents),
        }
    }

    #[test]
    fn wheel_colors() {
        assert_eq!(color_of(0), RouletteColor::Green);
        assert_eq!(color_of(1), RouletteColor::Red);
        assert_eq!(color_of(2), RouletteColor::Black);
        assert_eq!(color_of(18), RouletteColor::Red);
        assert_eq!(color_of(19), RouletteColor::Red);
        let reds = (1..=36).filter(|&n| color_of(n) == RouletteColor::Red).count();
        assert_eq!(reds, 18);
    }

    #[test]
    fn validation_requires_amounts_to_sum_to_bet() {
        let params = RouletteParams {
            bets: vec![straight(17, 300), color(RouletteColor::Red, 700)],
        };
        assert!(validate(Money::from_cents(1000), &params).is_ok());
        assert!(validate(Money::from_cents(900), &params).is_err());

        let empty = RouletteParams { bets: vec![] };
        assert!(validate(Money::from_cents(1000), &empty).is_err());

        let off_wheel = RouletteParams {
            bets: vec![straight(37, 1000)],
        };
        assert!(validate(Money::from_cents(1000), &off_wheel).is_err());
    }

    #[test]
    fn straight_hit_pays_thirty_six() {
        let outcome = score(&[straight(17, 100)], 17).unwrap();
        assert_eq!(outcome.payout, Money::from_cents(3600));
        let ResultPayload::Roulette(result) = outcome.result else {
            panic!("expected roulette payload");
        };
        assert_eq!(result.winning_bets, vec![0]);
    }

    #[test]
    fn color_hit_pays_double_and_zero_beats_colors() {
        let outcome = score(&[color(RouletteColor::Red, 500)], 1).unwrap();
        assert_eq!(outcome.payout, Money::from_cents(1000));

        let outcome = score(&[color(RouletteColor::Red, 500)], 2).unwrap();
        assert_eq!(outcome.payout, Money::ZERO);

        // Zero is green: neither color bet pays.
        let outcome = score(
            &[color(RouletteColor::Red, 500), color(RouletteColor::Black, 500)],
            0,
        )
        .unwrap();
        assert_eq!(outcome.payout, Money::ZERO);
    }

    #[test]
    fn multiple_sub_bets_accumulate() {
        let bets = vec![
            straight(32, 100),
            color(RouletteColor::Red, 400),
            straight(15, 500),
        ];
        // 32 is red: straight pays 3600, color pays 800, straight on 15 loses.
        let outcome = score(&bets, 32).unwrap();
        assert_eq!(outcome.payout, Money::from_cents(4400));
        let ResultPayload::Roulette(result) = outcome.result else {
            panic!("expected roulette payload");
        };
        assert_eq!(result.winning_bets, vec![0, 1]);
    }

    #[test]
    fn resolve_draws_within_the_wheel() {
        let mut rng = SecureRandom::new();
        let params = RouletteParams {
            bets: vec![color(RouletteColor::Black, 1000)],
        };
        for _ in 0..100 {
            let outcome = resolve(Money::from_cents(1000), &params, &mut rng).unwrap();
            let ResultPayload::Roulette(result) = outcome.result else {
                panic!("expected roulette payload");
            };
            assert!(result.winning_number <= WHEEL_MAX);
            assert_eq!(result.color, color_of(result.winning_number));
        }
    }
}
