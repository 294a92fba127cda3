// Fake control daemon listening on a real Unix socket in a temp dir.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::UnixListener;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;

use wlanctl_core::{ChannelAddress, ControllerConfig};

const EXPECT_TIMEOUT: Duration = Duration::from_secs(5);

type Connection = (Lines<BufReader<OwnedReadHalf>>, OwnedWriteHalf);

#[derive(Default)]
struct Counters {
    accepted: AtomicUsize,
    closed: AtomicUsize,
}

pub struct FakeDaemon {
    _dir: TempDir,
    address: ChannelAddress,
    commands: mpsc::UnboundedReceiver<String>,
    outgoing: mpsc::UnboundedSender<String>,
    counters: Arc<Counters>,
}

impl FakeDaemon {
    pub fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let address = ChannelAddress::new(dir.path(), "wlan0");
        let listener = UnixListener::bind(address.socket_path()).unwrap();

        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        tokio::spawn(serve(listener, commands_tx, outgoing_rx, Arc::clone(&counters)));

        Self {
            _dir: dir,
            address,
            commands,
            outgoing,
            counters,
        }
    }

    pub fn config(&self) -> ControllerConfig {
        ControllerConfig::new(self.address.clone())
    }

    /// Wait for the client to send `command`.
    pub async fn expect(&mut self, command: &str) {
        let received = tokio::time::timeout(EXPECT_TIMEOUT, self.commands.recv())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {command}"))
            .unwrap();
        assert_eq!(received, command);
    }

    /// Assert nothing is sent for a short while.
    pub async fn expect_silence(&mut self) {
        let next = tokio::time::timeout(Duration::from_millis(100), self.commands.recv()).await;
        assert!(next.is_err(), "unexpected command: {next:?}");
    }

    /// Write lines to the current connection.
    pub fn send(&self, lines: &[&str]) {
        for line in lines {
            self.outgoing.send((*line).to_owned()).unwrap();
        }
    }

    pub fn accepted(&self) -> usize {
        self.counters.accepted.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Poll until `closed()` reaches `count`.
    pub async fn wait_closed(&self, count: usize) {
        wait_until(|| self.closed() >= count).await;
    }

    /// Poll until `accepted()` reaches `count`.
    pub async fn wait_accepted(&self, count: usize) {
        wait_until(|| self.accepted() >= count).await;
    }
}

async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(EXPECT_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

enum Wake {
    Accepted(std::io::Result<tokio::net::UnixStream>),
    Line(Option<String>),
    Outgoing(Option<String>),
}

async fn serve(
    listener: UnixListener,
    commands: mpsc::UnboundedSender<String>,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    counters: Arc<Counters>,
) {
    let mut current: Option<Connection> = None;

    loop {
        let wake = tokio::select! {
            accepted = listener.accept() => Wake::Accepted(accepted.map(|(stream, _)| stream)),
            line = next_line(&mut current) => Wake::Line(line),
            out = outgoing.recv() => Wake::Outgoing(out),
        };

        match wake {
            Wake::Accepted(Ok(stream)) => {
                counters.accepted.fetch_add(1, Ordering::SeqCst);
                if current.is_some() {
                    counters.closed.fetch_add(1, Ordering::SeqCst);
                }
                let (read, write) = stream.into_split();
                current = Some((BufReader::new(read).lines(), write));
            }
            Wake::Accepted(Err(_)) | Wake::Outgoing(None) => break,
            Wake::Line(Some(line)) => {
                let _ = commands.send(line);
            }
            Wake::Line(None) => {
                counters.closed.fetch_add(1, Ordering::SeqCst);
                current = None;
            }
            Wake::Outgoing(Some(line)) => {
                if let Some((_, write)) = current.as_mut() {
                    // The client may already have hung up.
                    let _ = write.write_all(format!("{line}\n").as_bytes()).await;
                }
            }
        }
    }
}

async fn next_line(current: &mut Option<Connection>) -> Option<String> {
    match current {
        Some((lines, _)) => lines.next_line().await.ok().flatten(),
        None => std::future::pending().await,
    }
}
