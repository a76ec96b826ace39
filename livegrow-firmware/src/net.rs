//! CYW43 radio and embassy-net TCP behind the core network traits
//!
//! One TCP socket is created at boot and kept for the life of the
//! firmware. It stays in the listening state between ticks, so a peer that
//! connects while the display is holding a page completes its handshake
//! and waits for the next accept instead of being reset.

use core::cell::{RefCell, RefMut};

use cyw43::JoinOptions;
use defmt::*;
use embassy_net::tcp::{self, AcceptError, State, TcpSocket};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};

use livegrow_core::traits::{Connection, ConnectionAttempt, Listener, NetworkError, NetworkLink};

/// Receive and transmit window of the listening socket
pub const SOCKET_BUFFER_SIZE: usize = 1536;

/// A peer that stops talking mid-request is dropped after this long
const SOCKET_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Receive and transmit buffers backing the listening socket
pub type SocketBuffers = ([u8; SOCKET_BUFFER_SIZE], [u8; SOCKET_BUFFER_SIZE]);

/// The socket shared between the link and its listener handles
pub type SharedSocket = RefCell<TcpSocket<'static>>;

/// Build the listening socket on static buffers
pub fn listen_socket(stack: Stack<'static>, buffers: &'static mut SocketBuffers) -> SharedSocket {
    let (rx, tx) = buffers;
    let mut socket = TcpSocket::new(stack, rx, tx);
    socket.set_timeout(Some(SOCKET_IO_TIMEOUT));
    RefCell::new(socket)
}

/// Station-mode Wi-Fi link
pub struct WifiLink<'s> {
    control: cyw43::Control<'static>,
    stack: Stack<'static>,
    socket: &'s SharedSocket,
    ssid: &'static str,
    password: &'static str,
}

impl<'s> WifiLink<'s> {
    pub fn new(
        control: cyw43::Control<'static>,
        stack: Stack<'static>,
        socket: &'s SharedSocket,
        ssid: &'static str,
        password: &'static str,
    ) -> Self {
        Self {
            control,
            stack,
            socket,
            ssid,
            password,
        }
    }
}

impl<'s> NetworkLink for WifiLink<'s> {
    type Listener = TcpListener<'s>;

    async fn start_association(&mut self) -> Result<(), NetworkError> {
        // A dropped link leaves the chip half-joined
        self.control.leave().await;

        let options = if self.password.is_empty() {
            JoinOptions::new_open()
        } else {
            JoinOptions::new(self.password.as_bytes())
        };

        info!("Joining '{}'", self.ssid);
        self.control.join(self.ssid, options).await.map_err(|e| {
            warn!("Join failed with status {}", e.status);
            NetworkError::AssociationFailed
        })
    }

    async fn is_associated(&mut self) -> bool {
        self.stack.is_link_up() && self.stack.is_config_up()
    }

    async fn listen(&mut self, port: u16) -> Result<TcpListener<'s>, NetworkError> {
        let Some(config) = self.stack.config_v4() else {
            return Err(NetworkError::InvalidState);
        };

        // Whatever the socket was doing belongs to the previous listener
        let mut socket = self
            .socket
            .try_borrow_mut()
            .map_err(|_| NetworkError::InvalidState)?;
        socket.abort();

        info!("Listening on {}:{}", config.address.address(), port);
        Ok(TcpListener {
            socket: self.socket,
            port,
        })
    }
}

/// Handle to the shared socket, bound to one port
pub struct TcpListener<'s> {
    socket: &'s SharedSocket,
    port: u16,
}

impl<'s> Listener for TcpListener<'s> {
    type Connection<'a> = TcpConnection<'a> where Self: 'a;

    async fn accept(&mut self, timeout_ms: u32) -> ConnectionAttempt<TcpConnection<'_>> {
        let Ok(mut socket) = self.socket.try_borrow_mut() else {
            return ConnectionAttempt::FatalError(NetworkError::InvalidState);
        };

        let deadline = Duration::from_millis(u64::from(timeout_ms));
        match with_timeout(deadline, wait_for_peer(&mut socket, self.port)).await {
            // Still listening; a peer arriving later is queued for the next tick
            Err(_) => ConnectionAttempt::TimedOut,
            Ok(Ok(())) => {
                debug!("Accepted {}", socket.remote_endpoint());
                ConnectionAttempt::Accepted(TcpConnection { socket })
            }
            Ok(Err(AcceptError::ConnectionReset)) => {
                socket.abort();
                ConnectionAttempt::TransientError(NetworkError::ConnectionReset)
            }
            Ok(Err(AcceptError::InvalidState)) => {
                ConnectionAttempt::FatalError(NetworkError::InvalidState)
            }
            Ok(Err(_)) => ConnectionAttempt::FatalError(NetworkError::Io),
        }
    }
}

/// Wait until the socket holds an established peer
///
/// A closed socket is armed on `port`. Calling `accept` again on a socket
/// already listening on the same port keeps it listening. A handshake that
/// finished while nobody was waiting is returned straight away.
async fn wait_for_peer(socket: &mut TcpSocket<'static>, port: u16) -> Result<(), AcceptError> {
    match socket.state() {
        State::Closed | State::Listen => socket.accept(port).await,
        State::SynReceived => {
            socket.wait_write_ready().await;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// One accepted TCP peer, holding the shared socket until closed
pub struct TcpConnection<'a> {
    socket: RefMut<'a, TcpSocket<'static>>,
}

impl Connection for TcpConnection<'_> {
    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, NetworkError> {
        self.socket.read(buf).await.map_err(map_tcp_error)
    }

    async fn send(&mut self, mut bytes: &[u8]) -> Result<(), NetworkError> {
        while !bytes.is_empty() {
            let written = self.socket.write(bytes).await.map_err(map_tcp_error)?;
            if written == 0 {
                return Err(NetworkError::ConnectionReset);
            }
            bytes = &bytes[written..];
        }
        self.socket.flush().await.map_err(map_tcp_error)
    }

    async fn close(mut self) {
        self.socket.close();
        if let Err(e) = self.socket.flush().await {
            debug!("Flush on close failed: {}", e);
        }
        // Back to Closed so the next accept can listen again
        self.socket.abort();
    }
}

fn map_tcp_error(e: tcp::Error) -> NetworkError {
    match e {
        tcp::Error::ConnectionReset => NetworkError::ConnectionReset,
        #[allow(unreachable_patterns)]
        _ => NetworkError::Io,
    }
}
