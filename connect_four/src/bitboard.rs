//! Operations on Connect Four positions stored as one `u64` per side.
//!
//! Layout of the bits (cell index = `col * 7 + row`):
//!
//! ```text
//!     06 13 20 27 34 41 48   <- sentinel row, always zero
//!     05 12 19 26 33 40 47
//!     04 11 18 25 32 39 46
//!     03 10 17 24 31 38 45
//!     02 09 16 23 30 37 44
//!     01 08 15 22 29 36 43
//!     00 07 14 21 28 35 42
//! col  0  1  2  3  4  5  6
//! ```
//!
//! All functions are pure; "mutating" ones return the new bitboard of the
//! side that was changed.

/// Number of columns on the board.
pub const WIDTH: u8 = 7;
/// Number of playable rows on the board.
pub const HEIGHT: u8 = 6;
/// Bits reserved per column: six rows plus the sentinel bit.
pub const COLUMN_STRIDE: u8 = 7;
/// Number of cells, which is also the maximum number of moves in a match.
pub const NUM_CELLS: u8 = WIDTH * HEIGHT;

/// The six playable bits of column 0.
const COLUMN_MASK: u64 = 0b11_1111;
/// The topmost playable cell of every column (bits 5, 12, .., 47).
pub const TOP_ROW: u64 = 0x8102_0408_1020;
/// Every playable cell of the board.
pub const BOARD_MASK: u64 = 0xfdfb_f7ef_dfbf;

// Shift sets for the four line directions.
const DIRECTIONS: [u8; 4] = [
    // vertical
    1,
    // horizontal
    COLUMN_STRIDE,
    // diagonal, falling to the right
    COLUMN_STRIDE - 1,
    // diagonal, rising to the right
    COLUMN_STRIDE + 1,
];

fn column_shift(col: u8) -> u8 {
    col * COLUMN_STRIDE
}

/// The bit index of the cell at `col`, `row` (row 0 is the bottom).
pub fn cell_index(col: u8, row: u8) -> u8 {
    debug_assert!(col < WIDTH);
    debug_assert!(row < HEIGHT);
    column_shift(col) + row
}

/// Whether a stone can still be dropped into `col`.
///
/// Columns outside of `0..WIDTH` are never droppable.
pub fn can_drop(own: u64, opp: u64, col: u8) -> bool {
    if col >= WIDTH {
        return false;
    }
    let top_bit = 1u64 << (column_shift(col) + HEIGHT - 1);
    (own | opp) & top_bit == 0
}

/// Drops a stone of `own` into the lowest empty row of `col`.
///
/// The caller must check [`can_drop()`] first. For a full column the result
/// is meaningless, and it will panic in debug mode.
#[must_use]
pub fn drop_stone(own: u64, opp: u64, col: u8) -> u64 {
    debug_assert!(can_drop(own, opp, col));
    let shift = column_shift(col);
    // The occupied cells of a column are contiguous from the bottom, so adding
    // one carries into exactly the next free cell.
    let next_free = (((own | opp) >> shift) & COLUMN_MASK) + 1;
    own ^ (next_free << shift)
}

/// Removes the topmost stone of `col` from `own`. Inverse of [`drop_stone()`].
///
/// The topmost stone must belong to `own`. Removing from an empty column
/// leaves the bitboard unchanged.
#[must_use]
pub fn undrop_stone(own: u64, opp: u64, col: u8) -> u64 {
    debug_assert!(col < WIDTH);
    let shift = column_shift(col);
    let top_stone = ((((own | opp) >> shift) & COLUMN_MASK) + 1) >> 1;
    own ^ (top_stone << shift)
}

/// Number of stones in `col`.
pub fn column_height(own: u64, opp: u64, col: u8) -> u8 {
    debug_assert!(col < WIDTH);
    (((own | opp) >> column_shift(col)) & COLUMN_MASK).count_ones() as u8
}

/// The columns that are not full yet, in ascending order.
pub fn legal_columns(black: u64, white: u64) -> Vec<u8> {
    (0..WIDTH)
        .filter(|&col| can_drop(black, white, col))
        .collect()
}

/// Whether four stones of `bits` are aligned in any direction.
pub fn has_four_in_row(bits: u64) -> bool {
    DIRECTIONS.iter().any(|&s| {
        // If four stones are aligned, shifting by 1, 2 and 3 steps still leaves
        // one bit that is set in all four copies.
        bits & (bits >> s) & (bits >> (2 * s)) & (bits >> (3 * s)) != 0
    })
}

/// Whether no cell is occupied by both sides and the sentinel row is empty.
pub fn is_consistent(black: u64, white: u64) -> bool {
    black & white == 0 && (black | white) & !BOARD_MASK == 0
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::MoveSequence;

    fn play(columns: &[u8]) -> (u64, u64) {
        let (mut black, mut white) = (0, 0);
        for (turn, &col) in columns.iter().enumerate() {
            if turn % 2 == 0 {
                black = drop_stone(black, white, col);
            } else {
                white = drop_stone(white, black, col);
            }
        }
        (black, white)
    }

    fn bits(cells: &[(u8, u8)]) -> u64 {
        cells
            .iter()
            .fold(0, |acc, &(col, row)| acc | 1u64 << cell_index(col, row))
    }

    quickcheck! {
        fn no_double_occupancy(seq: MoveSequence) -> bool {
            let (black, white) = play(&seq.0);
            is_consistent(black, white)
                && (black | white).count_ones() as usize == seq.0.len()
        }

        fn undrop_reverts_drop(seq: MoveSequence, col: u8) -> bool {
            let (own, opp) = play(&seq.0);
            let col = col % WIDTH;
            if !can_drop(own, opp, col) {
                return true;
            }
            undrop_stone(drop_stone(own, opp, col), opp, col) == own
        }

        fn legal_columns_match_can_drop(seq: MoveSequence) -> bool {
            let (black, white) = play(&seq.0);
            let legal = legal_columns(black, white);
            (0..WIDTH).all(|col| legal.contains(&col) == can_drop(black, white, col))
        }
    }

    #[test]
    fn masks() {
        let top = (0..WIDTH).fold(0, |acc, col| acc | 1u64 << cell_index(col, HEIGHT - 1));
        assert_eq!(top, TOP_ROW);
        assert_eq!(TOP_ROW, 141845657554976);
        let all = (0..WIDTH)
            .flat_map(|col| (0..HEIGHT).map(move |row| (col, row)))
            .fold(0, |acc, (col, row)| acc | 1u64 << cell_index(col, row));
        assert_eq!(all, BOARD_MASK);
        assert_eq!(BOARD_MASK.count_ones(), u32::from(NUM_CELLS));
    }

    #[test]
    fn drop_stacks_stones() {
        let black = drop_stone(0, 0, 3);
        assert_eq!(black, 1 << 21);
        let white = drop_stone(0, black, 3);
        assert_eq!(white, 1 << 22);
        let black = drop_stone(black, white, 3);
        assert_eq!(black, (1 << 21) | (1 << 23));
        assert_eq!(column_height(black, white, 3), 3);
        assert_eq!(column_height(black, white, 2), 0);
    }

    #[test]
    fn full_column() {
        let (black, white) = play(&[0, 0, 0, 0, 0, 0]);
        assert!(!can_drop(black, white, 0));
        assert!(!can_drop(white, black, 0));
        assert_eq!(legal_columns(black, white), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!((black | white) & !BOARD_MASK, 0);
    }

    #[test]
    fn out_of_range_column() {
        assert!(!can_drop(0, 0, 7));
        assert!(!can_drop(0, 0, 255));
    }

    #[test]
    fn undrop_empty_column() {
        let (black, white) = play(&[2, 4]);
        assert_eq!(undrop_stone(black, white, 0), black);
        assert_eq!(undrop_stone(white, black, 4), 0);
    }

    #[test]
    fn four_in_row_directions() {
        let vertical = bits(&[(2, 1), (2, 2), (2, 3), (2, 4)]);
        let horizontal = bits(&[(1, 0), (2, 0), (3, 0), (4, 0)]);
        let rising = bits(&[(0, 0), (1, 1), (2, 2), (3, 3)]);
        let falling = bits(&[(3, 5), (4, 4), (5, 3), (6, 2)]);
        for line in [vertical, horizontal, rising, falling] {
            assert!(has_four_in_row(line));
        }
    }

    #[test]
    fn three_is_not_enough() {
        assert!(!has_four_in_row(0));
        assert!(!has_four_in_row(bits(&[(0, 0), (0, 1), (0, 2)])));
        assert!(!has_four_in_row(bits(&[(0, 0), (1, 0), (2, 0), (4, 0)])));
        assert!(!has_four_in_row(bits(&[(0, 0), (1, 1), (2, 2), (4, 4)])));
        // Column wraparound: row 5 of column 0 and rows 0..3 of column 1 are
        // adjacent bits, but the sentinel bit keeps them apart.
        assert!(!has_four_in_row(bits(&[(0, 4), (0, 5), (1, 0), (1, 1)])));
    }

    #[test]
    fn drawn_game() {
        let columns: Vec<u8> = "436014551150160155104632660465204242223333"
            .bytes()
            .map(|b| b - b'0')
            .collect();
        let (black, white) = play(&columns);
        assert_eq!((black, white), (180780857070996, 98477781240363));
        assert!(!has_four_in_row(black));
        assert!(!has_four_in_row(white));
        assert!(legal_columns(black, white).is_empty());
    }
}
