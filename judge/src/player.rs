use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use connect_four::{Request, Response, Side};
use tracing::{debug, info};

use crate::{ChannelError, PlayerChannel};

/// One connected player, for the duration of one match.
pub struct PlayerHandle {
    pub side: Side,
    /// Filled in by the name handshake. Until then, this is the side's name.
    pub name: String,
    pub endpoint: SocketAddr,
    channel: PlayerChannel,
}

impl PlayerHandle {
    /// Waits for a player to connect to `listener`.
    pub fn accept(side: Side, listener: &TcpListener) -> anyhow::Result<Self> {
        info!(%side, addr = %listener.local_addr()?, "Waiting for player to connect");
        let (stream, endpoint) = listener.accept()?;
        info!(%side, %endpoint, "Player connected");
        Self::new(side, stream, endpoint)
    }

    pub fn new(side: Side, stream: TcpStream, endpoint: SocketAddr) -> anyhow::Result<Self> {
        // Every message is a single small line that is waited upon
        stream.set_nodelay(true)?;
        Ok(Self {
            side,
            name: side.to_string(),
            endpoint,
            channel: PlayerChannel::new(side, stream)?,
        })
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.channel.set_timeout(timeout);
    }

    pub fn perform_request(&mut self, request: Request) -> Result<Option<Response>, ChannelError> {
        let command = request.command();
        let result = self.channel.submit(request);
        if let Err(err) = &result {
            debug!(side = %self.side, player = %self.name, command, %err, "Request failed");
        }
        result
    }

    /// Waits until everything sent to the player has been written out.
    pub fn disconnect(&mut self) {
        self.channel.join();
    }
}
