use connect_four::{
    can_drop, drop_stone, has_four_in_row, legal_columns, render_text, Side, NUM_CELLS, WIDTH,
};

use crate::IllegalMove;

/// The position of a running match.
///
/// Only the match orchestrator mutates this; everyone else gets a shared
/// reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchState {
    black: u64,
    white: u64,
    /// Every column played so far. Its length is always `turn`.
    history: Vec<u8>,
    turn: u8,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn black(&self) -> u64 {
        self.black
    }

    pub fn white(&self) -> u64 {
        self.white
    }

    pub fn stones(&self, side: Side) -> u64 {
        match side {
            Side::Black => self.black,
            Side::White => self.white,
        }
    }

    /// The stones of `side` and of its opponent.
    pub fn own_and_opp(&self, side: Side) -> (u64, u64) {
        (self.stones(side), self.stones(side.opponent()))
    }

    pub fn history(&self) -> &[u8] {
        &self.history
    }

    /// The number of moves played so far.
    pub fn turn(&self) -> u8 {
        self.turn
    }

    pub fn side_to_move(&self) -> Side {
        Side::to_move(self.turn)
    }

    pub fn legal_columns(&self) -> Vec<u8> {
        legal_columns(self.black, self.white)
    }

    pub fn is_full(&self) -> bool {
        self.turn >= NUM_CELLS
    }

    pub fn has_four_in_row(&self, side: Side) -> bool {
        has_four_in_row(self.stones(side))
    }

    pub fn render(&self) -> String {
        render_text(self.black, self.white)
    }

    /// Drops a stone of the side to move into `column`.
    ///
    /// Returns the bit index of the cell the stone landed in. An illegal move
    /// leaves the state untouched.
    pub(crate) fn play(&mut self, column: u8) -> Result<u8, IllegalMove> {
        if column >= WIDTH {
            return Err(IllegalMove::ColumnOutOfRange { column });
        }
        if !can_drop(self.black, self.white, column) {
            return Err(IllegalMove::ColumnFull { column });
        }
        let before = self.black | self.white;
        match self.side_to_move() {
            Side::Black => self.black = drop_stone(self.black, self.white, column),
            Side::White => self.white = drop_stone(self.white, self.black, column),
        }
        let landed = ((self.black | self.white) ^ before).trailing_zeros() as u8;
        self.history.push(column);
        self.turn += 1;
        Ok(landed)
    }
}
