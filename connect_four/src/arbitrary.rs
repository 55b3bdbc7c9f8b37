use quickcheck::{Arbitrary, Gen};

use crate::{drop_stone, legal_columns, NUM_CELLS};

/// A sequence of legal moves from the empty board, black first.
///
/// The game may contain a four-in-a-row; play simply continues past it.
#[derive(Clone, Debug)]
pub struct MoveSequence(pub Vec<u8>);

impl Arbitrary for MoveSequence {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % (usize::from(NUM_CELLS) + 1);
        let (mut own, mut opp) = (0u64, 0u64);
        let mut columns = Vec::with_capacity(len);
        for _ in 0..len {
            let legal = legal_columns(own, opp);
            // Can't be empty, since at most NUM_CELLS moves are played
            let col = *g.choose(&legal).unwrap();
            own = drop_stone(own, opp, col);
            columns.push(col);
            std::mem::swap(&mut own, &mut opp);
        }
        MoveSequence(columns)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        // Every prefix of a legal sequence is legal
        let columns = self.0.clone();
        Box::new((0..columns.len()).rev().map(move |n| MoveSequence(columns[..n].to_vec())))
    }
}
