pub use bitboard::*;
pub use errors::*;
pub use protocol::*;
pub use visualization::*;

#[cfg(test)]
mod arbitrary;
mod bitboard;
mod errors;
mod protocol;
mod visualization;
