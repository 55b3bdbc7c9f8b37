use crate::{cell_index, HEIGHT, WIDTH};

pub const BLACK_SYMBOL: char = 'o';
pub const WHITE_SYMBOL: char = 'x';
pub const EMPTY_SYMBOL: char = '-';

/// Draws the board as 6 lines of 7 characters, top row first.
///
/// Every line, including the last one, ends with a newline.
pub fn render_text(black: u64, white: u64) -> String {
    let mut result = String::with_capacity(usize::from(HEIGHT * (WIDTH + 1)));
    for row in (0..HEIGHT).rev() {
        for col in 0..WIDTH {
            let mask = 1u64 << cell_index(col, row);
            result.push(if black & mask != 0 {
                BLACK_SYMBOL
            } else if white & mask != 0 {
                WHITE_SYMBOL
            } else {
                EMPTY_SYMBOL
            });
        }
        result.push('\n');
    }
    result
}
