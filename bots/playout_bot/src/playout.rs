use connect_four::{drop_stone, has_four_in_row, legal_columns};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// The end of a random game, from the point of view of the player that
/// started the playout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayoutResult {
    Win,
    Loss,
    Draw,
}

/// Plays uniformly random moves until someone has four in a row or the board
/// is full.
///
/// `mine` has just moved, so `theirs` is next.
pub fn playout<R: Rng>(rng: &mut R, mine: u64, theirs: u64) -> PlayoutResult {
    let (mut to_move, mut just_moved) = (theirs, mine);
    let mut my_turn = false;
    loop {
        if has_four_in_row(just_moved) {
            return if my_turn {
                PlayoutResult::Loss
            } else {
                PlayoutResult::Win
            };
        }
        let Some(&col) = legal_columns(to_move, just_moved).choose(rng) else {
            return PlayoutResult::Draw;
        };
        let moved = drop_stone(to_move, just_moved, col);
        to_move = just_moved;
        just_moved = moved;
        my_turn = !my_turn;
    }
}

/// Picks the column whose random playouts are won most often.
///
/// Ties go to the lower column.
pub fn best_column<R: Rng>(rng: &mut R, own: u64, opp: u64, legal_moves: &[u8], playouts: u32) -> u8 {
    let mut best: Option<(u8, u32)> = None;
    for &col in legal_moves {
        let mine = drop_stone(own, opp, col);
        let mut wins = 0;
        for _ in 0..playouts {
            if playout(rng, mine, opp) == PlayoutResult::Win {
                wins += 1;
            }
        }
        debug!(col, wins, playouts);
        if best.map_or(true, |(_, best_wins)| wins > best_wins) {
            best = Some((col, wins));
        }
    }
    best.map_or(0, |(col, _)| col)
}

#[cfg(test)]
mod tests {
    use connect_four::cell_index;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn finished_games() {
        let mut rng = StdRng::seed_from_u64(1);
        let four = (0..4).fold(0, |acc, row| acc | 1u64 << cell_index(1, row));
        assert_eq!(playout(&mut rng, four, 0), PlayoutResult::Win);
        assert_eq!(playout(&mut rng, 0, four), PlayoutResult::Loss);
    }

    #[test]
    fn random_games_end() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let _ = playout(&mut rng, 0, 0);
        }
    }

    #[test]
    fn takes_an_immediate_win() {
        let mut rng = StdRng::seed_from_u64(3);
        let own = (0..3).fold(0, |acc, row| acc | 1u64 << cell_index(5, row));
        let opp = (0..3).fold(0, |acc, col| acc | 1u64 << cell_index(col, 0));
        let legal = legal_columns(own, opp);
        assert_eq!(best_column(&mut rng, own, opp, &legal, 50), 5);
    }
}
