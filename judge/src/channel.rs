use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use connect_four::{Request, Response, Side};
use tracing::{trace, warn};

use crate::ChannelError;

type Reply = Result<Response, ChannelError>;

/// Owns the connection to one player.
///
/// The socket is served by a worker thread. [`PlayerChannel::submit()`] hands
/// a request to the worker and blocks until the decoded answer comes back, so
/// there is never more than one request in flight.
pub struct PlayerChannel {
    side: Side,
    // Dropping the sender tells an idle worker to exit
    requests: Option<SyncSender<Request>>,
    replies: Receiver<Reply>,
    // A handle on the socket for shutting it down while the worker is reading
    socket: TcpStream,
    worker: Option<JoinHandle<()>>,
    timeout: Option<Duration>,
    closed: bool,
}

impl PlayerChannel {
    pub fn new(side: Side, stream: TcpStream) -> io::Result<Self> {
        let socket = stream.try_clone()?;
        let reader = BufReader::new(stream.try_clone()?);
        let (request_tx, request_rx) = mpsc::sync_channel(1);
        let (reply_tx, reply_rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name(format!("{}-player", side))
            .spawn(move || serve(side, stream, reader, request_rx, reply_tx))?;

        Ok(Self {
            side,
            requests: Some(request_tx),
            replies: reply_rx,
            socket,
            worker: Some(worker),
            timeout: None,
            closed: false,
        })
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Whether the channel can no longer be used.
    ///
    /// This is the case after a transport failure, a timeout, or after
    /// [`Request::Terminate`] was submitted.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Sends a request and waits for the player's answer.
    ///
    /// [`Request::Terminate`] is not answered, so for it this returns
    /// `Ok(None)` right away and closes the channel.
    pub fn submit(&mut self, request: Request) -> Result<Option<Response>, ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        let expects_response = request.expects_response();
        let sent = match &self.requests {
            Some(requests) => requests.send(request).is_ok(),
            None => false,
        };
        if !sent {
            // The worker has exited
            self.closed = true;
            return Err(ChannelError::Closed);
        }
        if !expects_response {
            self.closed = true;
            return Ok(None);
        }

        let reply = match self.timeout {
            Some(timeout) => match self.replies.recv_timeout(timeout) {
                Ok(reply) => reply,
                Err(RecvTimeoutError::Timeout) => {
                    self.abort();
                    return Err(ChannelError::TimedOut);
                }
                Err(RecvTimeoutError::Disconnected) => Err(ChannelError::Closed),
            },
            None => self.replies.recv().unwrap_or(Err(ChannelError::Closed)),
        };
        if matches!(reply, Err(ChannelError::Transport(_) | ChannelError::Closed)) {
            self.closed = true;
        }
        reply.map(Some)
    }

    /// Shuts the socket down, which also wakes up a worker that is blocked
    /// reading.
    fn abort(&mut self) {
        warn!(side = %self.side, "Closing the connection to an unresponsive player");
        if let Err(err) = self.socket.shutdown(Shutdown::Both) {
            trace!(side = %self.side, %err, "Socket shutdown failed");
        }
        self.closed = true;
    }

    /// Waits for the worker thread to finish.
    ///
    /// After this, everything that was submitted has been written out.
    pub fn join(&mut self) {
        self.requests = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(side = %self.side, "Player worker thread panicked");
            }
        }
        self.closed = true;
    }
}

impl Drop for PlayerChannel {
    fn drop(&mut self) {
        self.join();
    }
}

/// The worker loop: write each request as a line, then read one line back.
///
/// Exits when the request sender is dropped, after [`Request::Terminate`],
/// or on the first socket failure.
fn serve(
    side: Side,
    mut writer: TcpStream,
    mut reader: BufReader<TcpStream>,
    requests: Receiver<Request>,
    replies: Sender<Reply>,
) {
    // A re-usable buffer for reading lines.
    let mut buf = String::new();

    for request in requests {
        let mut line = request.encode();
        trace!(name: "Sending request", %side, request = %line);
        line.push('\n');
        let written = writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush());
        if let Err(err) = written {
            warn!(%side, %err, "Failed to send a request");
            if request.expects_response() {
                let _ = replies.send(Err(ChannelError::Transport(err)));
            }
            break;
        }
        if !request.expects_response() {
            break;
        }

        buf.clear();
        let reply = match reader.read_line(&mut buf) {
            Ok(0) => Err(ChannelError::Transport(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "the player closed the connection",
            ))),
            Ok(_) => {
                let line = buf.trim_end();
                trace!(name: "Received response", %side, response = %line);
                Response::decode(line).map_err(ChannelError::Decode)
            }
            Err(err) => Err(ChannelError::Transport(err)),
        };
        // A line that could not be decoded does not end the connection
        let fatal = matches!(reply, Err(ChannelError::Transport(_)));
        if replies.send(reply).is_err() || fatal {
            break;
        }
    }
}
