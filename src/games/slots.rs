//! Classic three-reel slots with five fixed paylines.
//!
//! Each grid cell is an independent uniform draw over the seven-symbol
//! alphabet. Paylines are evaluated in a fixed order (middle, top, bottom,
//! then the two diagonals) and only the first `lines` paylines are in play.

use crate::errors::{CasinoError, CasinoResult};
use crate::games::house::BiasDirective;
use crate::games::types::{Outcome, ResultPayload, SlotSymbol, SlotsParams, SlotsResult};
use crate::money::Money;
use crate::rng::{EntropySource, SecureRandom};

pub const MIN_LINES: u32 = 1;
pub const MAX_LINES: u32 = 5;

/// Attempts to roll a losing grid under a forced-loss directive before
/// giving up and keeping the last roll.
const FORCE_LOSS_ATTEMPTS: usize = 100;

/// Payline cell coordinates as (row, col), in play order.
pub const PAYLINES: [[(usize, usize); 3]; 5] = [
    [(1, 0), (1, 1), (1, 2)], // middle
    [(0, 0), (0, 1), (0, 2)], // top
    [(2, 0), (2, 1), (2, 2)], // bottom
    [(0, 0), (1, 1), (2, 2)], // diagonal, top-left to bottom-right
    [(2, 0), (1, 1), (0, 2)], // diagonal, bottom-left to top-right
];

const SYMBOLS: [SlotSymbol; 7] = [
    SlotSymbol::Cherry,
    SlotSymbol::Lemon,
    SlotSymbol::Orange,
    SlotSymbol::Grape,
    SlotSymbol::Bell,
    SlotSymbol::Diamond,
    SlotSymbol::Seven,
];

fn symbol_multiplier(symbol: SlotSymbol) -> u64 {
    match symbol {
        SlotSymbol::Seven => 100,
        SlotSymbol::Diamond => 50,
        SlotSymbol::Bell => 20,
        SlotSymbol::Grape => 15,
        SlotSymbol::Orange => 10,
        SlotSymbol::Lemon => 5,
        SlotSymbol::Cherry => 2,
    }
}

/// Lines are clamped, never rejected, matching the legacy behavior.
pub fn lines_in_play(params: &SlotsParams) -> u32 {
    params.lines.clamp(MIN_LINES, MAX_LINES)
}

pub fn resolve<E: EntropySource>(
    bet: Money,
    params: &SlotsParams,
    rng: &mut SecureRandom<E>,
    directive: BiasDirective,
) -> CasinoResult<Outcome> {
    let lines = lines_in_play(params);
    let per_line = bet.div_floor(lines as u64);

    let grid = match directive {
        BiasDirective::None => draw_grid(rng)?,
        BiasDirective::ForceLoss => draw_forced_loss(rng, lines)?,
        BiasDirective::ForceWin => draw_forced_win(rng, lines)?,
    };
    score(per_line, lines, grid)
}

fn draw_grid<E: EntropySource>(rng: &mut SecureRandom<E>) -> CasinoResult<[[SlotSymbol; 3]; 3]> {
    let mut grid = [[SlotSymbol::Cherry; 3]; 3];
    for row in grid.iter_mut() {
        for cell in row.iter_mut() {
            *cell = SYMBOLS[rng.random_int(0, (SYMBOLS.len() - 1) as u64)? as usize];
        }
    }
    Ok(grid)
}

fn draw_forced_loss<E: EntropySource>(
    rng: &mut SecureRandom<E>,
    lines: u32,
) -> CasinoResult<[[SlotSymbol; 3]; 3]> {
    let mut grid = draw_grid(rng)?;
    for _ in 0..FORCE_LOSS_ATTEMPTS {
        if winning_lines(&grid, lines).is_empty() {
            break;
        }
        grid = draw_grid(rng)?;
    }
    Ok(grid)
}

fn draw_forced_win<E: EntropySource>(
    rng: &mut SecureRandom<E>,
    lines: u32,
) -> CasinoResult<[[SlotSymbol; 3]; 3]> {
    let mut grid = draw_grid(rng)?;
    let line = PAYLINES[rng.random_int(0, (lines - 1) as u64)? as usize];
    // Low-tier symbols only, so forced wins stay cheap for the house.
    let symbol = SYMBOLS[rng.random_int(0, 2)? as usize];
    for (r, c) in line {
        grid[r][c] = symbol;
    }
    Ok(grid)
}

fn winning_lines(grid: &[[SlotSymbol; 3]; 3], lines: u32) -> Vec<u8> {
    PAYLINES
        .iter()
        .take(lines as usize)
        .enumerate()
        .filter_map(|(i, line)| {
            let [a, b, c] = line.map(|(r, col)| grid[r][col]);
            (a == b && b == c).then_some((i + 1) as u8)
        })
        .collect()
}

pub(crate) fn score(
    per_line: Money,
    lines: u32,
    grid: [[SlotSymbol; 3]; 3],
) -> CasinoResult<Outcome> {
    let winners = winning_lines(&grid, lines);
    let mut payout = Money::ZERO;
    for &line_no in &winners {
        let (r, c) = PAYLINES[(line_no - 1) as usize][0];
        let line_pay = per_line
            .checked_mul(symbol_multiplier(grid[r][c]))
            .ok_or_else(|| CasinoError::InvalidRequest("bet too large".into()))?;
        payout = payout
            .checked_add(line_pay)
            .ok_or_else(|| CasinoError::InvalidRequest("bet too large".into()))?;
    }
    Ok(Outcome {
        payout,
        result: ResultPayload::Slots(SlotsResult {
            grid,
            winning_lines: winners,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedEntropy;

    fn params(lines: u32) -> SlotsParams {
        SlotsParams { lines }
    }

    #[test]
    fn lines_are_clamped() {
        assert_eq!(lines_in_play(&params(0)), 1);
        assert_eq!(lines_in_play(&params(3)), 3);
        assert_eq!(lines_in_play(&params(9)), 5);
    }

    #[test]
    fn middle_row_of_sevens_pays_hundredfold() {
        // Byte 6 maps every cell draw to index 6 (seven); with one line in
        // play only the middle row counts even though all five lines match.
        let mut rng = SecureRandom::with_entropy(ScriptedEntropy::repeat(6, 9));
        let outcome = resolve(
            Money::from_cents(1000),
            &params(1),
            &mut rng,
            BiasDirective::None,
        )
        .unwrap();
        assert_eq!(outcome.payout, Money::from_cents(100_000));
        let ResultPayload::Slots(result) = outcome.result else {
            panic!("expected slots payload");
        };
        assert_eq!(result.winning_lines, vec![1]);
        assert!(result
            .grid
            .iter()
            .flatten()
            .all(|&s| s == SlotSymbol::Seven));
    }

    #[test]
    fn all_lines_in_play_all_pay() {
        let mut rng = SecureRandom::with_entropy(ScriptedEntropy::repeat(6, 9));
        let outcome = resolve(
            Money::from_cents(500),
            &params(5),
            &mut rng,
            BiasDirective::None,
        )
        .unwrap();
        // Per-line bet is 100 cents; five lines of sevens at 100x each.
        assert_eq!(outcome.payout, Money::from_cents(50_000));
        let ResultPayload::Slots(result) = outcome.result else {
            panic!("expected slots payload");
        };
        assert_eq!(result.winning_lines, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn payline_integrity_under_random_play() {
        let mut rng = SecureRandom::new();
        for lines in 1..=5u32 {
            for _ in 0..40 {
                let bet = Money::from_cents(1000);
                let outcome =
                    resolve(bet, &params(lines), &mut rng, BiasDirective::None).unwrap();
                let ResultPayload::Slots(result) = outcome.result else {
                    panic!("expected slots payload");
                };
                // Winning lines are a subset of the lines in play.
                assert!(result.winning_lines.iter().all(|&l| l as u32 <= lines));
                // Reported payout equals the independent recomputation.
                let per_line = bet.div_floor(lines as u64);
                let expected: u64 = result
                    .winning_lines
                    .iter()
                    .map(|&l| {
                        let (r, c) = PAYLINES[(l - 1) as usize][0];
                        per_line.cents() * symbol_multiplier(result.grid[r][c])
                    })
                    .sum();
                assert_eq!(outcome.payout.cents(), expected);
            }
        }
    }

    #[test]
    fn forced_loss_produces_no_winning_line() {
        let mut rng = SecureRandom::new();
        for _ in 0..25 {
            let outcome = resolve(
                Money::from_cents(500),
                &params(5),
                &mut rng,
                BiasDirective::ForceLoss,
            )
            .unwrap();
            assert_eq!(outcome.payout, Money::ZERO);
        }
    }

    #[test]
    fn forced_win_pays_on_an_active_line() {
        let mut rng = SecureRandom::new();
        for _ in 0..25 {
            let outcome = resolve(
                Money::from_cents(500),
                &params(2),
                &mut rng,
                BiasDirective::ForceWin,
            )
            .unwrap();
            let ResultPayload::Slots(result) = outcome.result else {
                panic!("expected slots payload");
            };
            assert!(!result.winning_lines.is_empty());
            assert!(result.winning_lines.iter().all(|&l| l <= 2));
            assert!(outcome.payout > Money::ZERO);
        }
    }
}
