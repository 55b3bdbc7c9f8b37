use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};

use connect_four::{Outcome, Request, Response};
use tracing::{debug, warn};

/// A trait to simplify writing bots.
///
/// Implementors only decide on moves; [`Bot::respond()`] maps every request
/// of the protocol to the matching response, and [`Bot::run()`] serves it
/// over a connection to the judge.
pub trait Bot {
    /// The name reported to the judge. Must not contain whitespace.
    fn name(&self) -> String;

    /// Called when a match starts. Returning `false` refuses the match.
    fn new_game(&mut self, _is_first: bool) -> bool {
        true
    }

    /// Picks one of `legal_moves`, which is never empty.
    fn choose_column(&mut self, own: u64, opp: u64, history: &[u8], legal_moves: &[u8]) -> u8;

    fn end_game(&mut self, _outcome: Outcome) {}

    /// Answers a single request. Returns `None` for requests that get no answer.
    fn respond(&mut self, request: Request) -> Option<Response> {
        match request {
            Request::Identify => Some(Response::DeclareName { name: self.name() }),
            Request::StartMatch { is_first } => Some(Response::AcknowledgeStart {
                ready: self.new_game(is_first),
            }),
            Request::RequestMove {
                own_bits,
                opp_bits,
                history,
                legal_moves,
            } => Some(Response::Move {
                column: self.choose_column(own_bits, opp_bits, &history, &legal_moves),
            }),
            Request::EndMatch { outcome } => {
                self.end_game(outcome);
                Some(Response::Farewell)
            }
            Request::Terminate => None,
        }
    }

    /// Connects to the judge and plays until told to quit.
    fn run(&mut self, addr: impl ToSocketAddrs) -> anyhow::Result<()> {
        let stream = TcpStream::connect(addr)?;
        self.serve(stream)
    }

    /// Plays over an established connection until told to quit.
    fn serve(&mut self, stream: TcpStream) -> anyhow::Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = stream;
        let mut buf = String::new();

        loop {
            // Read the next line into buf
            buf.clear(); // because read_line() appends to the buffer
            let num_bytes_read = reader.read_line(&mut buf)?;
            if num_bytes_read == 0 {
                // 0 bytes read means EOF - the judge has exited.
                break Ok(());
            }

            let request = match Request::decode(&buf) {
                Ok(request) => request,
                Err(err) => {
                    warn!(%err, line = buf.trim_end(), "Ignoring request");
                    continue;
                }
            };
            debug!(?request, "Received request");

            let Some(response) = self.respond(request) else {
                break Ok(());
            };
            let mut line = response.encode();
            line.push('\n');
            writer.write_all(line.as_bytes())?;
            writer.flush()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FirstColumn;

    impl Bot for FirstColumn {
        fn name(&self) -> String {
            String::from("FirstColumn")
        }

        fn choose_column(&mut self, _: u64, _: u64, _: &[u8], legal_moves: &[u8]) -> u8 {
            legal_moves[0]
        }
    }

    #[test]
    fn responses_follow_requests() {
        let mut bot = FirstColumn;
        assert_eq!(
            bot.respond(Request::Identify),
            Some(Response::DeclareName {
                name: String::from("FirstColumn")
            })
        );
        assert_eq!(
            bot.respond(Request::StartMatch { is_first: false }),
            Some(Response::AcknowledgeStart { ready: true })
        );
        let go = Request::RequestMove {
            own_bits: 0,
            opp_bits: 1,
            history: vec![0],
            legal_moves: vec![2, 4],
        };
        assert_eq!(bot.respond(go), Some(Response::Move { column: 2 }));
        assert_eq!(
            bot.respond(Request::EndMatch {
                outcome: Outcome::Draw
            }),
            Some(Response::Farewell)
        );
        assert_eq!(bot.respond(Request::Terminate), None);
    }
}
