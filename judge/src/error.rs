use connect_four::{DecodeError, Response};

#[derive(Debug)]
/// Why a move was rejected. The player who made it loses the match.
pub enum IllegalMove {
    ColumnFull { column: u8 },
    ColumnOutOfRange { column: u8 },
    /// The player answered a move request with something other than a move.
    UnexpectedResponse { response: Option<Response> },
    MalformedResponse(DecodeError),
    /// A move was submitted while no turn was in progress.
    MatchNotInProgress,
}

impl std::error::Error for IllegalMove {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IllegalMove::MalformedResponse(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IllegalMove::ColumnFull { column } => {
                write!(f, "Tried to drop a stone into column {}, which is full", column)
            }
            IllegalMove::ColumnOutOfRange { column } => {
                write!(f, "Tried to drop a stone into column {}, which does not exist", column)
            }
            IllegalMove::UnexpectedResponse {
                response: Some(response),
            } => write!(
                f,
                "Answered a move request with `{}` instead of `move`",
                response.command()
            ),
            IllegalMove::UnexpectedResponse { response: None } => {
                write!(f, "Did not answer the move request")
            }
            IllegalMove::MalformedResponse(_) => write!(f, "Answered with a malformed message"),
            IllegalMove::MatchNotInProgress => write!(f, "The match is not in progress"),
        }
    }
}

#[derive(Debug)]
/// Error type for a single request/response round trip with a player.
pub enum ChannelError {
    /// Reading from or writing to the socket failed, or the player hung up.
    Transport(std::io::Error),
    /// The player answered with a line that could not be decoded.
    Decode(DecodeError),
    /// The player did not answer within the configured timeout.
    TimedOut,
    /// The connection was closed earlier and cannot be used anymore.
    Closed,
}

impl std::error::Error for ChannelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChannelError::Transport(err) => Some(err),
            ChannelError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelError::Transport(err) => write!(f, "Connection to the player failed: {}", err),
            ChannelError::Decode(err) => write!(f, "Could not decode the player's answer: {}", err),
            ChannelError::TimedOut => write!(f, "The player did not answer in time"),
            ChannelError::Closed => write!(f, "The connection to the player is closed"),
        }
    }
}
