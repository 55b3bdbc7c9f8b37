mod channel;
mod error;
mod game;
mod player;
mod state;
pub use channel::*;
pub use error::*;
pub use game::*;
pub use player::*;
pub use state::*;

use std::time::Duration;

/// Runtime knobs of a match.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// How long a player may take to answer a single request.
    ///
    /// `None` waits forever. When set, a player that does not answer in time
    /// is disconnected and loses the match.
    pub move_timeout: Option<Duration>,
    /// Print the board to stdout after every turn.
    pub show_board: bool,
}
