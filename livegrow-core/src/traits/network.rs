//! Network traits
//!
//! Three layers, each owned by the one above it:
//!
//! - [`NetworkLink`]: radio association and listener creation
//! - [`Listener`]: a bound port accepting one connection at a time
//! - [`Connection`]: one accepted peer

/// Errors reported by the network stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    /// Peer reset the connection
    ConnectionReset,
    /// Socket is in a state that does not allow the operation
    InvalidState,
    /// Association with the access point failed
    AssociationFailed,
    /// Any other stack error
    Io,
}

/// Result of one bounded accept attempt
#[derive(Debug, PartialEq, Eq)]
pub enum ConnectionAttempt<C> {
    /// A peer connected
    Accepted(C),
    /// Nobody connected before the deadline
    TimedOut,
    /// The attempt failed but the listener is still usable
    TransientError(NetworkError),
    /// The listener itself is broken and must be recreated
    FatalError(NetworkError),
}

/// One accepted connection
pub trait Connection {
    /// Read once into `buf`, returning the number of bytes received
    fn receive(
        &mut self,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, NetworkError>>;

    /// Send all of `bytes`
    fn send(&mut self, bytes: &[u8]) -> impl core::future::Future<Output = Result<(), NetworkError>>;

    /// Close the connection
    fn close(self) -> impl core::future::Future<Output = ()>;
}

/// A listening socket
pub trait Listener {
    /// Connection type, which may borrow the listener's buffers
    type Connection<'a>: Connection
    where
        Self: 'a;

    /// Wait at most `timeout_ms` for a peer
    fn accept(
        &mut self,
        timeout_ms: u32,
    ) -> impl core::future::Future<Output = ConnectionAttempt<Self::Connection<'_>>>;
}

/// Radio link to the access point
pub trait NetworkLink {
    /// Listener type produced by [`NetworkLink::listen`]
    type Listener: Listener;

    /// Issue an association request with the configured credentials
    ///
    /// Completion is observed through [`NetworkLink::is_associated`].
    fn start_association(&mut self)
        -> impl core::future::Future<Output = Result<(), NetworkError>>;

    /// Whether the link is up and has an address
    fn is_associated(&mut self) -> impl core::future::Future<Output = bool>;

    /// Bind a listener on `port` on all interfaces
    fn listen(
        &mut self,
        port: u16,
    ) -> impl core::future::Future<Output = Result<Self::Listener, NetworkError>>;
}

impl<T: NetworkLink + ?Sized> NetworkLink for &mut T {
    type Listener = T::Listener;

    fn start_association(&mut self)
        -> impl core::future::Future<Output = Result<(), NetworkError>> {
        T::start_association(self)
    }

    fn is_associated(&mut self) -> impl core::future::Future<Output = bool> {
        T::is_associated(self)
    }

    fn listen(
        &mut self,
        port: u16,
    ) -> impl core::future::Future<Output = Result<Self::Listener, NetworkError>> {
        T::listen(self, port)
    }
}
