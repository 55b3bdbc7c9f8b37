use std::fmt;

use connect_four::{Outcome, Request, Response, Side};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{ChannelError, Config, IllegalMove, MatchState, PlayerHandle};

/// How the winner won.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Victory {
    FourInARow,
    /// The opponent played a full or non-existent column, or did not answer
    /// with a move.
    IllegalMove,
    /// The connection to the opponent failed during the match.
    Disconnected,
    /// The opponent did not answer within the move timeout.
    TimedOut,
    /// There was no opponent to ask for a move.
    NoPlayer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchResult {
    Won { winner: Side, by: Victory },
    Draw,
    /// A player refused to start, or could not be reached before the first move.
    Aborted,
}

impl MatchResult {
    /// The result as reported to `side`.
    pub fn outcome_for(self, side: Side) -> Outcome {
        match self {
            MatchResult::Won { winner, .. } if winner == side => Outcome::Win,
            MatchResult::Won { .. } => Outcome::Lose,
            MatchResult::Draw => Outcome::Draw,
            MatchResult::Aborted => Outcome::Aborted,
        }
    }

    /// 0 if black won, 1 if white won, 2 for a draw and 255 for an aborted match.
    pub fn code(self) -> u8 {
        match self {
            MatchResult::Won {
                winner: Side::Black,
                ..
            } => 0,
            MatchResult::Won {
                winner: Side::White,
                ..
            } => 1,
            MatchResult::Draw => 2,
            MatchResult::Aborted => 255,
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::Won {
                winner: Side::Black,
                ..
            } => write!(f, "Win: Black, Lose: White"),
            MatchResult::Won {
                winner: Side::White,
                ..
            } => write!(f, "Win: White, Lose: Black"),
            MatchResult::Draw => write!(f, "Draw"),
            MatchResult::Aborted => write!(f, "Aborted"),
        }
    }
}

/// Where a match is in its lifecycle.
///
/// `Finished` and `TornDown` are terminal: no operation leaves them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    AwaitingStart,
    /// Waiting for the given side to move.
    TurnLoop(Side),
    Finished(MatchResult),
    /// The result has been sent and the connections are closed.
    TornDown(MatchResult),
}

/// Summary of a finished match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub result: MatchResult,
    pub code: u8,
    pub black_name: String,
    pub white_name: String,
    pub moves: Vec<u8>,
    pub black: u64,
    pub white: u64,
}

/// The match orchestrator.
///
/// It owns the [`MatchState`] and both players, and drives them one request at
/// a time. Either side may be absent: an absent side is always ready to start
/// and forfeits as soon as it has to move.
pub struct Match {
    config: Config,
    state: MatchState,
    players: [Option<PlayerHandle>; 2],
    phase: Phase,
}

impl Match {
    pub fn new(config: Config, black: Option<PlayerHandle>, white: Option<PlayerHandle>) -> Self {
        let mut players = [black, white];
        for player in players.iter_mut().flatten() {
            player.set_timeout(config.move_timeout);
        }
        Self {
            config,
            state: MatchState::new(),
            players,
            phase: Phase::Uninitialized,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// The display name of `side`, or `None` if no player is attached.
    pub fn player_name(&self, side: Side) -> Option<&str> {
        self.players[side.index()]
            .as_ref()
            .map(|player| player.name.as_str())
    }

    /// Resets the board and asks both players for their names.
    ///
    /// Moves from `Uninitialized` to `AwaitingStart`, or to an aborted match if
    /// a player cannot be reached.
    pub fn initialize(&mut self) -> Phase {
        if self.phase != Phase::Uninitialized {
            return self.phase;
        }
        self.state = MatchState::new();
        self.phase = Phase::AwaitingStart;

        for side in Side::BOTH {
            let Some(player) = self.players[side.index()].as_mut() else {
                continue;
            };
            match player.perform_request(Request::Identify) {
                Ok(Some(Response::DeclareName { name })) => {
                    info!(%side, %name, "Player identified");
                    player.name = name;
                }
                Ok(response) => {
                    warn!(%side, ?response, "Unexpected answer to the name request");
                }
                Err(ChannelError::Decode(err)) => {
                    warn!(%side, %err, "Malformed answer to the name request");
                }
                Err(err) => {
                    warn!(%side, %err, "Name handshake failed");
                    self.phase = Phase::Finished(MatchResult::Aborted);
                    break;
                }
            }
        }
        self.phase
    }

    /// Tells both players that the match starts.
    ///
    /// Moves from `AwaitingStart` to black's first turn if both are ready,
    /// otherwise the match is aborted.
    pub fn start(&mut self) -> Phase {
        if self.phase != Phase::AwaitingStart {
            return self.phase;
        }

        let mut all_ready = true;
        for side in Side::BOTH {
            let Some(player) = self.players[side.index()].as_mut() else {
                continue;
            };
            let request = Request::StartMatch {
                is_first: side == Side::Black,
            };
            let ready = match player.perform_request(request) {
                Ok(Some(Response::AcknowledgeStart { ready })) => ready,
                Ok(response) => {
                    warn!(%side, ?response, "Unexpected answer to the start request");
                    false
                }
                Err(err) => {
                    warn!(%side, %err, "Start handshake failed");
                    false
                }
            };
            if !ready {
                info!(%side, player = %player.name, "Player is not ready");
                all_ready = false;
            }
        }

        self.phase = if all_ready {
            Phase::TurnLoop(Side::Black)
        } else {
            Phase::Finished(MatchResult::Aborted)
        };
        self.phase
    }

    /// Asks the side to move for a column and applies it.
    pub fn play_turn(&mut self) -> Phase {
        let Phase::TurnLoop(side) = self.phase else {
            return self.phase;
        };

        let Some(player) = self.players[side.index()].as_mut() else {
            info!(%side, "No player to move");
            return self.forfeit(side, Victory::NoPlayer);
        };
        let (own_bits, opp_bits) = self.state.own_and_opp(side);
        let request = Request::RequestMove {
            own_bits,
            opp_bits,
            history: self.state.history().to_vec(),
            legal_moves: self.state.legal_columns(),
        };

        match player.perform_request(request) {
            Ok(Some(Response::Move { column })) => match self.apply_move(column) {
                Ok(cell) => debug!(%side, column, cell, "Stone landed"),
                // apply_move() already forfeited the match for the mover
                Err(err) => debug!(%side, %err, "Move rejected"),
            },
            Ok(response) => {
                let err = IllegalMove::UnexpectedResponse { response };
                info!(%side, %err, "Illegal move");
                self.forfeit(side, Victory::IllegalMove);
            }
            Err(ChannelError::Decode(err)) => {
                let err = IllegalMove::MalformedResponse(err);
                info!(%side, %err, "Illegal move");
                self.forfeit(side, Victory::IllegalMove);
            }
            Err(ChannelError::TimedOut) => {
                self.forfeit(side, Victory::TimedOut);
            }
            Err(err) => {
                warn!(%side, %err, "Lost the connection during the match");
                self.forfeit(side, Victory::Disconnected);
            }
        }

        if self.config.show_board {
            println!("{}", self.state.turn());
            println!("{}", self.state.render());
        }
        self.phase
    }

    /// Drops a stone of the side to move into `column`.
    ///
    /// This is the part of [`Match::play_turn()`] after the player has
    /// answered, for front-ends that get the column from elsewhere. Returns
    /// the bit index of the cell the stone landed in. An illegal column loses
    /// the match for the side to move, and the board stays untouched.
    pub fn apply_move(&mut self, column: u8) -> Result<u8, IllegalMove> {
        let Phase::TurnLoop(side) = self.phase else {
            return Err(IllegalMove::MatchNotInProgress);
        };
        debug_assert_eq!(side, self.state.side_to_move());

        match self.state.play(column) {
            Ok(cell) => {
                debug!(%side, column, turn = self.state.turn(), "Move played");
                self.phase = if self.state.has_four_in_row(side) {
                    Phase::Finished(MatchResult::Won {
                        winner: side,
                        by: Victory::FourInARow,
                    })
                } else if self.state.is_full() {
                    Phase::Finished(MatchResult::Draw)
                } else {
                    Phase::TurnLoop(side.opponent())
                };
                Ok(cell)
            }
            Err(err) => {
                info!(%side, %err, "Illegal move");
                self.forfeit(side, Victory::IllegalMove);
                Err(err)
            }
        }
    }

    fn forfeit(&mut self, loser: Side, by: Victory) -> Phase {
        self.phase = Phase::Finished(MatchResult::Won {
            winner: loser.opponent(),
            by,
        });
        self.phase
    }

    /// Tells both players the result and disconnects them.
    ///
    /// Returns `None` unless the match is `Finished`. Failures to reach a
    /// player at this point are logged and otherwise ignored.
    pub fn finish(&mut self) -> Option<MatchReport> {
        let Phase::Finished(result) = self.phase else {
            return None;
        };
        info!(%result, turns = self.state.turn(), "Match finished");

        for side in Side::BOTH {
            let Some(player) = self.players[side.index()].as_mut() else {
                continue;
            };
            let outcome = result.outcome_for(side);
            match player.perform_request(Request::EndMatch { outcome }) {
                Ok(Some(Response::Farewell)) => {}
                Ok(response) => debug!(%side, ?response, "Unexpected answer to the end request"),
                Err(err) => warn!(%side, %err, "Could not tell the player the result"),
            }
        }
        for side in Side::BOTH {
            if let Some(player) = self.players[side.index()].as_mut() {
                if let Err(err) = player.perform_request(Request::Terminate) {
                    debug!(%side, %err, "Could not send quit");
                }
            }
        }
        // Don't report before both connections have been written out
        for player in self.players.iter_mut().flatten() {
            player.disconnect();
        }

        self.phase = Phase::TornDown(result);
        Some(self.report(result))
    }

    /// Plays the whole match and returns its result.
    pub fn run(mut self) -> MatchReport {
        self.initialize();
        self.start();
        while let Phase::TurnLoop(_) = self.phase {
            self.play_turn();
        }
        match self.finish() {
            Some(report) => report,
            // Only reachable if the match was torn down before
            None => self.report(match self.phase {
                Phase::TornDown(result) => result,
                _ => MatchResult::Aborted,
            }),
        }
    }

    fn report(&self, result: MatchResult) -> MatchReport {
        let name = |side: Side| {
            String::from(self.player_name(side).unwrap_or_default())
        };
        MatchReport {
            result,
            code: result.code(),
            black_name: name(Side::Black),
            white_name: name(Side::White),
            moves: self.state.history().to_vec(),
            black: self.state.black(),
            white: self.state.white(),
        }
    }
}
