/// The error type for decoding a single protocol line.
///
/// Decoding is deliberately lenient: malformed numbers never produce an
/// error (they decode to zero), so these only classify lines that cannot be
/// mapped to any message at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The line contained no tokens.
    Empty,
    UnknownCommand(String),
    MissingArgument {
        command: &'static str,
        position: usize,
    },
    /// A token that should be one of a fixed set of words wasn't.
    InvalidArgument {
        command: &'static str,
        value: String,
    },
}

impl std::error::Error for DecodeError {}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "Received an empty line"),
            DecodeError::UnknownCommand(command) => write!(f, "Unknown command `{}`", command),
            DecodeError::MissingArgument { command, position } => write!(
                f,
                "Command `{}` is missing its argument number {}",
                command,
                position + 1
            ),
            DecodeError::InvalidArgument { command, value } => {
                write!(f, "Invalid argument `{}` for command `{}`", value, command)
            }
        }
    }
}
