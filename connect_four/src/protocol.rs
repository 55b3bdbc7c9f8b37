//! The line protocol spoken between the judge and a player.
//!
//! Every message is a single line of space-separated tokens: a command name
//! followed by positional arguments. Argument values never contain
//! whitespace, and there is no escaping.
//!
//! | Command   | Direction | Arguments                                  |
//! |-----------|-----------|--------------------------------------------|
//! | `name`    | → player  |                                            |
//! | `setname` | player →  | `<name>`                                   |
//! | `start`   | → player  | `black` or `white`                         |
//! | `ready`   | player →  |                                            |
//! | `go`      | → player  | `<own> <opp> <legal moves> <history>`      |
//! | `move`    | player →  | `<column>`                                 |
//! | `end`     | → player  | `win`, `lose`, `draw` or `aborted`         |
//! | `bye`     | player →  |                                            |
//! | `quit`    | → player  | (no response)                              |
//!
//! Bitboards are written in decimal, lists of columns as one digit per column
//! without separators (e.g. `0256`).
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::DecodeError;

/// One of the two sides of a match. Black always moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Black,
    White,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Black, Side::White];

    /// The side that moves when `turn` moves have been played so far.
    pub fn to_move(turn: u8) -> Self {
        if turn % 2 == 0 {
            Side::Black
        } else {
            Side::White
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Black => write!(f, "black"),
            Side::White => write!(f, "white"),
        }
    }
}

/// How a match ended, from the point of view of one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Draw,
    /// The match never started properly.
    Aborted,
}

impl Outcome {
    fn token(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Lose => "lose",
            Outcome::Draw => "draw",
            Outcome::Aborted => "aborted",
        }
    }
}

/// Message from the judge to a player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Ask for the player's name.
    ///
    /// The response should be a [`Response::DeclareName`].
    Identify,
    /// A new match begins.
    ///
    /// The response should be a [`Response::AcknowledgeStart`].
    StartMatch { is_first: bool },
    /// Ask for the next move.
    ///
    /// The response should be a [`Response::Move`].
    RequestMove {
        /// The stones of the player that is asked to move.
        own_bits: u64,
        opp_bits: u64,
        /// Every column played so far, in order.
        history: Vec<u8>,
        /// The columns that are not full, in ascending order.
        legal_moves: Vec<u8>,
    },
    /// The match is over.
    ///
    /// The response should be a [`Response::Farewell`].
    EndMatch { outcome: Outcome },
    /// The player should shut down. There is no response.
    Terminate,
}

/// Message from a player to the judge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// The name must not contain whitespace.
    DeclareName { name: String },
    AcknowledgeStart { ready: bool },
    Move { column: u8 },
    Farewell,
}

impl Request {
    pub fn command(&self) -> &'static str {
        match self {
            Request::Identify => "name",
            Request::StartMatch { .. } => "start",
            Request::RequestMove { .. } => "go",
            Request::EndMatch { .. } => "end",
            Request::Terminate => "quit",
        }
    }

    /// Whether the player answers this request with a line.
    pub fn expects_response(&self) -> bool {
        !matches!(self, Request::Terminate)
    }

    /// Renders the request as a protocol line, without the trailing newline.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn decode(line: &str) -> Result<Self, DecodeError> {
        let (command, args) = tokenize(line)?;
        match command {
            "name" => Ok(Request::Identify),
            "start" => match arg(&args, "start", 0)? {
                "black" => Ok(Request::StartMatch { is_first: true }),
                "white" => Ok(Request::StartMatch { is_first: false }),
                other => Err(DecodeError::InvalidArgument {
                    command: "start",
                    value: String::from(other),
                }),
            },
            "go" => Ok(Request::RequestMove {
                own_bits: lenient_number(args.first().copied()),
                opp_bits: lenient_number(args.get(1).copied()),
                legal_moves: decode_columns(args.get(2).copied()),
                history: decode_columns(args.get(3).copied()),
            }),
            "end" => {
                let outcome = match arg(&args, "end", 0)? {
                    "win" => Outcome::Win,
                    "lose" => Outcome::Lose,
                    "draw" => Outcome::Draw,
                    "aborted" => Outcome::Aborted,
                    other => {
                        return Err(DecodeError::InvalidArgument {
                            command: "end",
                            value: String::from(other),
                        })
                    }
                };
                Ok(Request::EndMatch { outcome })
            }
            "quit" => Ok(Request::Terminate),
            other => Err(DecodeError::UnknownCommand(String::from(other))),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Identify | Request::Terminate => write!(f, "{}", self.command()),
            Request::StartMatch { is_first } => {
                let side = if *is_first { Side::Black } else { Side::White };
                write!(f, "start {}", side)
            }
            Request::RequestMove {
                own_bits,
                opp_bits,
                history,
                legal_moves,
            } => write!(
                f,
                "go {} {} {} {}",
                own_bits,
                opp_bits,
                encode_columns(legal_moves),
                encode_columns(history)
            ),
            Request::EndMatch { outcome } => write!(f, "end {}", outcome.token()),
        }
    }
}

impl FromStr for Request {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Request::decode(s)
    }
}

impl Response {
    pub fn command(&self) -> &'static str {
        match self {
            Response::DeclareName { .. } => "setname",
            Response::AcknowledgeStart { .. } => "ready",
            Response::Move { .. } => "move",
            Response::Farewell => "bye",
        }
    }

    /// Renders the response as a protocol line, without the trailing newline.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn decode(line: &str) -> Result<Self, DecodeError> {
        let (command, args) = tokenize(line)?;
        match command {
            "setname" => Ok(Response::DeclareName {
                name: String::from(arg(&args, "setname", 0)?),
            }),
            // A bare `ready` means ready. Only an explicit `ready false` refuses.
            "ready" => Ok(Response::AcknowledgeStart {
                ready: args.first().map_or(true, |&token| token != "false"),
            }),
            "move" => Ok(Response::Move {
                column: decode_column(args.first().copied()),
            }),
            "bye" => Ok(Response::Farewell),
            other => Err(DecodeError::UnknownCommand(String::from(other))),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::DeclareName { name } => write!(f, "setname {}", name),
            Response::AcknowledgeStart { ready: true } => write!(f, "ready"),
            Response::AcknowledgeStart { ready: false } => write!(f, "ready false"),
            Response::Move { column } => write!(f, "move {}", column),
            Response::Farewell => write!(f, "bye"),
        }
    }
}

impl FromStr for Response {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Response::decode(s)
    }
}

/// Splits a line into the command and its arguments.
///
/// Arguments are separated by single spaces, so an empty column list in the
/// middle of a `go` line still occupies its position.
fn tokenize(line: &str) -> Result<(&str, Vec<&str>), DecodeError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(DecodeError::Empty);
    }
    let mut tokens = line.split(' ');
    // split() always yields at least one item
    let command = tokens.next().unwrap_or_default();
    Ok((command, tokens.collect()))
}

fn arg<'a>(args: &[&'a str], command: &'static str, position: usize) -> Result<&'a str, DecodeError> {
    match args.get(position) {
        Some(&token) if !token.is_empty() => Ok(token),
        _ => Err(DecodeError::MissingArgument { command, position }),
    }
}

/// Parses a number, falling back to zero for missing or malformed tokens.
///
/// This mirrors the established behaviour of the protocol: a player that
/// sends `move x` plays column 0 rather than having its message rejected.
fn lenient_number<T: FromStr + Default>(token: Option<&str>) -> T {
    token.and_then(|t| t.parse().ok()).unwrap_or_default()
}

/// Like [`lenient_number`], but a number that is not a valid `u8` becomes
/// `u8::MAX`, which is never a legal column.
fn decode_column(token: Option<&str>) -> u8 {
    let Some(token) = token else {
        return 0;
    };
    match token.parse::<i64>() {
        Ok(number) => u8::try_from(number).unwrap_or(u8::MAX),
        Err(_) => {
            let digits = token.strip_prefix(&['-', '+'][..]).unwrap_or(token);
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                // Too large even for i64
                u8::MAX
            } else {
                0
            }
        }
    }
}

fn encode_columns(columns: &[u8]) -> String {
    columns
        .iter()
        .map(|&col| char::from(b'0' + col % 10))
        .collect()
}

/// Non-digit characters are skipped.
fn decode_columns(token: Option<&str>) -> Vec<u8> {
    token
        .unwrap_or_default()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_round_trip() {
        let req = Request::RequestMove {
            own_bits: 12,
            opp_bits: 5,
            legal_moves: vec![0, 2, 5],
            history: vec![2, 3],
        };
        assert_eq!(req.encode(), "go 12 5 025 23");
        assert_eq!(Request::decode(&req.encode()), Ok(req));
    }

    #[test]
    fn go_on_empty_board() {
        let req = Request::RequestMove {
            own_bits: 0,
            opp_bits: 0,
            legal_moves: vec![0, 1, 2, 3, 4, 5, 6],
            history: vec![],
        };
        let line = req.encode();
        assert_eq!(line, "go 0 0 0123456 ");
        assert_eq!(Request::decode(&format!("{}\n", line)), Ok(req));
    }

    #[test]
    fn go_with_malformed_bits() {
        let req = Request::decode("go abc 5 0123456 33").unwrap();
        assert_eq!(
            req,
            Request::RequestMove {
                own_bits: 0,
                opp_bits: 5,
                legal_moves: vec![0, 1, 2, 3, 4, 5, 6],
                history: vec![3, 3],
            }
        );
    }

    #[test]
    fn go_with_empty_legal_moves_keeps_positions() {
        let req = Request::decode("go 1 2  16").unwrap();
        assert_eq!(
            req,
            Request::RequestMove {
                own_bits: 1,
                opp_bits: 2,
                legal_moves: vec![],
                history: vec![1, 6],
            }
        );
    }

    #[test]
    fn other_requests() {
        let cases = [
            (Request::Identify, "name"),
            (Request::StartMatch { is_first: true }, "start black"),
            (Request::StartMatch { is_first: false }, "start white"),
            (Request::EndMatch { outcome: Outcome::Win }, "end win"),
            (Request::EndMatch { outcome: Outcome::Lose }, "end lose"),
            (Request::EndMatch { outcome: Outcome::Draw }, "end draw"),
            (Request::Terminate, "quit"),
        ];
        for (req, line) in cases {
            assert_eq!(req.encode(), line);
            assert_eq!(line.parse::<Request>(), Ok(req));
        }
    }

    #[test]
    fn responses() {
        let cases = [
            (
                Response::DeclareName {
                    name: String::from("RandomBot"),
                },
                "setname RandomBot",
            ),
            (Response::AcknowledgeStart { ready: true }, "ready"),
            (Response::AcknowledgeStart { ready: false }, "ready false"),
            (Response::Move { column: 4 }, "move 4"),
            (Response::Farewell, "bye"),
        ];
        for (resp, line) in cases {
            assert_eq!(resp.encode(), line);
            assert_eq!(line.parse::<Response>(), Ok(resp));
        }
    }

    #[test]
    fn lenient_move() {
        assert_eq!(Response::decode("move x"), Ok(Response::Move { column: 0 }));
        assert_eq!(Response::decode("move"), Ok(Response::Move { column: 0 }));
        assert_eq!(Response::decode("move 9\r\n"), Ok(Response::Move { column: 9 }));
    }

    #[test]
    fn move_numbers_out_of_range_are_not_column_zero() {
        for line in ["move 300", "move 256", "move -1", "move 99999999999999999999"] {
            assert_eq!(
                Response::decode(line),
                Ok(Response::Move { column: u8::MAX }),
                "{}",
                line
            );
        }
        assert_eq!(Response::decode("move 255"), Ok(Response::Move { column: 255 }));
        assert_eq!(Response::decode("move +6"), Ok(Response::Move { column: 6 }));
        assert_eq!(Response::decode("move -"), Ok(Response::Move { column: 0 }));
    }

    #[test]
    fn unknown_commands() {
        assert_eq!(
            Response::decode("hello world"),
            Err(DecodeError::UnknownCommand(String::from("hello")))
        );
        assert_eq!(
            Request::decode("move 3"),
            Err(DecodeError::UnknownCommand(String::from("move")))
        );
        assert_eq!(Response::decode("  \n"), Err(DecodeError::Empty));
    }

    #[test]
    fn missing_and_invalid_arguments() {
        assert_eq!(
            Response::decode("setname"),
            Err(DecodeError::MissingArgument {
                command: "setname",
                position: 0
            })
        );
        assert_eq!(
            Request::decode("start purple"),
            Err(DecodeError::InvalidArgument {
                command: "start",
                value: String::from("purple")
            })
        );
    }

    #[test]
    fn sides() {
        assert_eq!(Side::to_move(0), Side::Black);
        assert_eq!(Side::to_move(41), Side::White);
        assert_eq!(Side::Black.opponent(), Side::White);
        assert_eq!(Side::White.index(), 1);
    }
}
