// ── Control channel ──
//
// Raw duplex line transport to the daemon. No protocol knowledge lives
// here: the demultiplexer decides what a line means.

use std::future::Future;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::UnixStream;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, trace};

use crate::config::ChannelAddress;

/// Longest line accepted from the daemon before the channel is considered broken.
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("{reason}")]
    Connection { reason: String },

    #[error("no line received within {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("channel is not open")]
    NotOpen,
}

/// Duplex line transport owned by the request worker.
///
/// `read_line` must be cancel-safe: the worker races it against the
/// request queue, and a dropped read must not lose a partial line.
pub trait ControlChannel: Send + 'static {
    fn open(
        &mut self,
        address: &ChannelAddress,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Release the connection. Calling it on a closed channel is a no-op.
    fn close(&mut self) -> impl Future<Output = ()> + Send;

    fn write_line(&mut self, text: &str) -> impl Future<Output = Result<(), ChannelError>> + Send;

    fn read_line(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<String, ChannelError>> + Send;
}

/// Control channel over a Unix stream socket with newline framing.
#[derive(Debug, Default)]
pub struct UnixChannel {
    framed: Option<Framed<UnixStream, LinesCodec>>,
}

impl UnixChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.framed.is_some()
    }
}

impl ControlChannel for UnixChannel {
    async fn open(&mut self, address: &ChannelAddress) -> Result<(), ChannelError> {
        self.close().await;

        let path = address.socket_path();
        let stream = UnixStream::connect(&path)
            .await
            .map_err(|e| ChannelError::Connection {
                reason: format!("{}: {e}", path.display()),
            })?;

        debug!(path = %path.display(), "control channel open");
        self.framed = Some(Framed::new(
            stream,
            LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        ));
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(mut framed) = self.framed.take() {
            // Flushes pending writes and shuts down the write half.
            if let Err(e) = SinkExt::<&str>::close(&mut framed).await {
                debug!(error = %e, "error while closing control channel");
            }
            debug!("control channel closed");
        }
    }

    async fn write_line(&mut self, text: &str) -> Result<(), ChannelError> {
        let framed = self.framed.as_mut().ok_or(ChannelError::NotOpen)?;
        trace!(line = text, "->");
        framed
            .send(text)
            .await
            .map_err(|e| ChannelError::Connection {
                reason: e.to_string(),
            })
    }

    async fn read_line(&mut self, timeout: Duration) -> Result<String, ChannelError> {
        let framed = self.framed.as_mut().ok_or(ChannelError::NotOpen)?;
        match tokio::time::timeout(timeout, framed.next()).await {
            Err(_) => Err(ChannelError::Timeout { timeout }),
            Ok(None) => Err(ChannelError::Connection {
                reason: "daemon closed the control channel".into(),
            }),
            Ok(Some(Err(e))) => Err(ChannelError::Connection {
                reason: e.to_string(),
            }),
            Ok(Some(Ok(line))) => {
                trace!(line = %line, "<-");
                Ok(line)
            }
        }
    }
}
