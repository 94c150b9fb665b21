//! Control socket between the daemon, the platform bridge and the CLI.

use guardian_core::capability::ServiceStatus;
use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

const IO_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown message byte 0x{0:02x}")]
    UnknownMessage(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Platform connected the monitoring service.
    Connected,
    /// Platform interrupted the service.
    Interrupt,
    /// Platform destroyed the service.
    Teardown,
    /// Status request; answered with one status byte.
    Status,
    /// Stop the daemon.
    Shutdown,
}

impl Message {
    fn to_byte(self) -> u8 {
        match self {
            Message::Connected => 0x01,
            Message::Interrupt => 0x02,
            Message::Teardown => 0x03,
            Message::Status => 0x04,
            Message::Shutdown => 0x05,
        }
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Message::Connected),
            0x02 => Some(Message::Interrupt),
            0x03 => Some(Message::Teardown),
            0x04 => Some(Message::Status),
            0x05 => Some(Message::Shutdown),
            _ => None,
        }
    }
}

/// Monitoring state plus capability grants, as reported over the socket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub active: bool,
    pub capabilities: ServiceStatus,
}

impl StatusReport {
    const ACTIVE: u8 = 1 << 0;
    const ACCESSIBILITY: u8 = 1 << 1;
    const USAGE_STATS: u8 = 1 << 2;
    const DEVICE_ADMIN: u8 = 1 << 3;
    const OVERLAY: u8 = 1 << 4;

    pub fn to_byte(self) -> u8 {
        let caps = self.capabilities;
        [
            (self.active, Self::ACTIVE),
            (caps.accessibility, Self::ACCESSIBILITY),
            (caps.usage_stats, Self::USAGE_STATS),
            (caps.device_admin, Self::DEVICE_ADMIN),
            (caps.overlay, Self::OVERLAY),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .fold(0, |acc, (_, bit)| acc | bit)
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            active: byte & Self::ACTIVE != 0,
            capabilities: ServiceStatus {
                accessibility: byte & Self::ACCESSIBILITY != 0,
                usage_stats: byte & Self::USAGE_STATS != 0,
                device_admin: byte & Self::DEVICE_ADMIN != 0,
                overlay: byte & Self::OVERLAY != 0,
            },
        }
    }
}

/// Server side - runs in the daemon
pub struct IpcServer {
    listener: UnixListener,
    path: PathBuf,
    running: Arc<AtomicBool>,
}

impl IpcServer {
    pub fn new(path: &Path) -> Result<Self, IpcError> {
        // Remove a stale socket left by a previous run
        let _ = std::fs::remove_file(path);

        let listener = UnixListener::bind(path)?;
        listener.set_nonblocking(true)?;

        info!("IPC server listening on {:?}", path);

        Ok(Self {
            listener,
            path: path.to_path_buf(),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Run the accept loop, returning a channel for received messages
    pub fn run(&self) -> Result<mpsc::Receiver<(Message, UnixStream)>, IpcError> {
        let (tx, rx) = mpsc::channel(32);
        let running = self.running.clone();
        let listener = self.listener.try_clone()?;

        std::thread::Builder::new()
            .name("ipc-accept".into())
            .spawn(move || {
                while running.load(Ordering::Relaxed) {
                    match listener.accept() {
                        Ok((stream, _)) => match read_message(stream) {
                            Ok((msg, stream)) => {
                                debug!("Received message: {:?}", msg);
                                if tx.blocking_send((msg, stream)).is_err() {
                                    break;
                                }
                            }
                            Err(e) => debug!("Dropping connection: {}", e),
                        },
                        Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                            std::thread::sleep(Duration::from_millis(50));
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
            })?;

        Ok(rx)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.stop();
        let _ = std::fs::remove_file(&self.path);
    }
}

fn read_message(mut stream: UnixStream) -> Result<(Message, UnixStream), IpcError> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(IO_TIMEOUT))?;

    let mut buf = [0u8; 1];
    stream.read_exact(&mut buf)?;
    let msg = Message::from_byte(buf[0]).ok_or(IpcError::UnknownMessage(buf[0]))?;
    Ok((msg, stream))
}

/// Answer a status request.
pub fn respond_status(mut stream: UnixStream, report: StatusReport) -> Result<(), IpcError> {
    stream.set_write_timeout(Some(IO_TIMEOUT))?;
    stream.write_all(&[report.to_byte()])?;
    Ok(())
}

/// Client side - used by the platform bridge and the CLI
pub struct IpcClient {
    path: PathBuf,
}

impl IpcClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn connect(&self) -> Result<UnixStream, IpcError> {
        let stream = UnixStream::connect(&self.path)?;
        stream.set_write_timeout(Some(IO_TIMEOUT))?;
        stream.set_read_timeout(Some(IO_TIMEOUT))?;
        Ok(stream)
    }

    /// Send a message to the daemon
    pub fn send(&self, msg: Message) -> Result<(), IpcError> {
        let mut stream = self.connect()?;
        stream.write_all(&[msg.to_byte()])?;
        Ok(())
    }

    /// Ask the daemon for its status
    pub fn status(&self) -> Result<StatusReport, IpcError> {
        let mut stream = self.connect()?;
        stream.write_all(&[Message::Status.to_byte()])?;

        let mut buf = [0u8; 1];
        stream.read_exact(&mut buf)?;
        Ok(StatusReport::from_byte(buf[0]))
    }
}

/// Check if daemon is running
pub fn is_daemon_running(path: &Path) -> bool {
    UnixStream::connect(path).is_ok()
}
