//! Per-address pools of request/reply sockets.
//!
//! The pool is an explicit object, created at startup and shared (usually
//! through an `Arc`) by every [`SocketExecutor`] that talks to the same
//! hosts. Dropping the pool drops every idle socket.
//!
//! # Discipline
//!
//! - Borrowing from an empty pool creates a new socket; nobody waits.
//! - Returning a socket to a full pool closes it instead of blocking.
//! - A socket involved in a failed exchange is closed, never returned.
//!
//! The last rule matters on a strict request/reply transport: a socket that
//! sent a request but never read its reply is out of step for good.
//!
//! [`SocketExecutor`]: super::SocketExecutor

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// A connected request/reply socket.
pub trait ReqSocket: Send {
    /// Send one message.
    fn send(&mut self, message: &[u8]) -> io::Result<()>;

    /// Wait up to `timeout` for the reply; `Ok(None)` when none arrived.
    fn recv_timeout(&mut self, timeout: Duration) -> io::Result<Option<Vec<u8>>>;

    /// Close immediately, discarding unsent messages.
    fn close(&mut self);
}

/// Opens sockets for the pool.
pub trait SocketConnector: Send + Sync {
    /// Socket type produced
    type Socket: ReqSocket;

    /// Open a socket connected to `address`.
    fn connect(&self, address: &str) -> io::Result<Self::Socket>;
}

/// Bounded socket pools keyed by address.
pub struct SocketPool<C: SocketConnector> {
    connector: C,
    capacity: usize,
    pools: Mutex<HashMap<String, VecDeque<C::Socket>>>,
}

impl<C: SocketConnector> SocketPool<C> {
    /// Create a pool manager whose per-address pools hold at most `capacity` idle sockets.
    pub fn new(connector: C, capacity: usize) -> Self {
        SocketPool {
            connector,
            capacity,
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Borrow a socket for `address`, returned to the pool when the guard drops.
    pub fn checkout(&self, address: &str) -> io::Result<PooledSocket<'_, C>> {
        let socket = self.get_socket(address)?;
        Ok(PooledSocket {
            pool: self,
            address: address.to_string(),
            socket: Some(socket),
        })
    }

    /// Take an idle socket for `address`, or open a new one.
    ///
    /// The per-address pool is created on first use.
    pub fn get_socket(&self, address: &str) -> io::Result<C::Socket> {
        let idle = self
            .pools
            .lock()
            .entry(address.to_string())
            .or_default()
            .pop_front();
        match idle {
            Some(socket) => Ok(socket),
            None => self.connector.connect(address),
        }
    }

    /// Put `socket` back into its pool, or close it if the pool is full or missing.
    pub fn checkin(&self, address: &str, socket: C::Socket) {
        let rejected = {
            let mut pools = self.pools.lock();
            match pools.get_mut(address) {
                None => {
                    tracing::warn!(address, "no socket pool for address, closing socket");
                    Some(socket)
                }
                Some(idle) if idle.len() >= self.capacity => {
                    tracing::debug!(address, capacity = self.capacity, "socket pool full, closing socket");
                    Some(socket)
                }
                Some(idle) => {
                    idle.push_back(socket);
                    None
                }
            }
        };
        if let Some(socket) = rejected {
            self.destroy(socket);
        }
    }

    /// Close a socket.
    pub fn destroy(&self, mut socket: C::Socket) {
        socket.close();
    }

    /// Idle sockets held for `address`, `None` if no pool exists yet
    pub fn idle_count(&self, address: &str) -> Option<usize> {
        self.pools.lock().get(address).map(VecDeque::len)
    }

    /// Maximum idle sockets per address
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Connector used to open new sockets
    pub fn connector(&self) -> &C {
        &self.connector
    }
}

/// A borrowed socket.
///
/// Dropping the guard returns the socket to its pool; [`PooledSocket::discard`]
/// closes it instead.
pub struct PooledSocket<'a, C: SocketConnector> {
    pool: &'a SocketPool<C>,
    address: String,
    socket: Option<C::Socket>,
}

impl<C: SocketConnector> PooledSocket<'_, C> {
    /// Close the socket rather than returning it.
    pub fn discard(mut self) {
        if let Some(socket) = self.socket.take() {
            self.pool.destroy(socket);
        }
    }
}

impl<C: SocketConnector> Deref for PooledSocket<'_, C> {
    type Target = C::Socket;

    fn deref(&self) -> &Self::Target {
        self.socket.as_ref().expect("socket present until drop")
    }
}

impl<C: SocketConnector> DerefMut for PooledSocket<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.socket.as_mut().expect("socket present until drop")
    }
}

impl<C: SocketConnector> Drop for PooledSocket<'_, C> {
    fn drop(&mut self) {
        if let Some(socket) = self.socket.take() {
            self.pool.checkin(&self.address, socket);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub(crate) const ADDRESS: &str = "tcp://1.2.3.4:69";

    /// Socket that replays queued replies and records what it sent.
    pub(crate) struct MockSocket {
        pub id: usize,
        pub sent: Vec<Vec<u8>>,
        pub replies: VecDeque<io::Result<Option<Vec<u8>>>>,
        pub waits: Vec<Duration>,
        closed: Arc<AtomicUsize>,
    }

    impl ReqSocket for MockSocket {
        fn send(&mut self, message: &[u8]) -> io::Result<()> {
            self.sent.push(message.to_vec());
            Ok(())
        }

        fn recv_timeout(&mut self, timeout: Duration) -> io::Result<Option<Vec<u8>>> {
            self.waits.push(timeout);
            self.replies.pop_front().unwrap_or(Ok(None))
        }

        fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Connector handing out mock sockets preloaded with `replies`.
    #[derive(Default)]
    pub(crate) struct MockConnector {
        pub created: AtomicUsize,
        pub closed: Arc<AtomicUsize>,
        pub replies: parking_lot::Mutex<Vec<io::Result<Option<Vec<u8>>>>>,
    }

    impl MockConnector {
        pub(crate) fn replying(replies: Vec<io::Result<Option<Vec<u8>>>>) -> Self {
            MockConnector {
                replies: parking_lot::Mutex::new(replies),
                ..Default::default()
            }
        }
    }

    impl SocketConnector for MockConnector {
        type Socket = MockSocket;

        fn connect(&self, _address: &str) -> io::Result<MockSocket> {
            let id = self.created.fetch_add(1, Ordering::SeqCst);
            Ok(MockSocket {
                id,
                sent: Vec::new(),
                replies: self.replies.lock().drain(..).collect(),
                waits: Vec::new(),
                closed: Arc::clone(&self.closed),
            })
        }
    }

    #[test]
    fn test_pool_creation() {
        let pool = SocketPool::new(MockConnector::default(), 42);
        assert_eq!(pool.capacity(), 42);
        assert_eq!(pool.idle_count(ADDRESS), None);
    }

    #[test]
    fn test_get_socket_from_missing_pool_creates_both() {
        let pool = SocketPool::new(MockConnector::default(), 10);
        let socket = pool.get_socket(ADDRESS).unwrap();
        assert_eq!(socket.id, 0);
        assert_eq!(pool.idle_count(ADDRESS), Some(0));
        assert_eq!(pool.connector.created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_returned_socket_is_reused() {
        let pool = SocketPool::new(MockConnector::default(), 10);
        {
            let _socket = pool.checkout(ADDRESS).unwrap();
        }
        assert_eq!(pool.idle_count(ADDRESS), Some(1));

        let socket = pool.checkout(ADDRESS).unwrap();
        assert_eq!(socket.id, 0);
        assert_eq!(pool.idle_count(ADDRESS), Some(0));
        assert_eq!(pool.connector.created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_borrowers_get_distinct_sockets() {
        let pool = SocketPool::new(MockConnector::default(), 10);
        let a = pool.checkout(ADDRESS).unwrap();
        let b = pool.checkout(ADDRESS).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_checkin_to_full_pool_discards() {
        let pool = SocketPool::new(MockConnector::default(), 1);
        let first = pool.get_socket(ADDRESS).unwrap();
        let second = pool.get_socket(ADDRESS).unwrap();

        pool.checkin(ADDRESS, first);
        pool.checkin(ADDRESS, second);

        assert_eq!(pool.idle_count(ADDRESS), Some(1));
        assert_eq!(pool.connector.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_checkin_without_pool_discards() {
        let connector = MockConnector::default();
        let socket = connector.connect(ADDRESS).unwrap();
        let pool = SocketPool::new(connector, 10);

        pool.checkin(ADDRESS, socket);
        assert_eq!(pool.idle_count(ADDRESS), None);
        assert_eq!(pool.connector.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_discarded_socket_is_not_returned() {
        let pool = SocketPool::new(MockConnector::default(), 10);
        let socket = pool.checkout(ADDRESS).unwrap();
        socket.discard();
        assert_eq!(pool.idle_count(ADDRESS), Some(0));
        assert_eq!(pool.connector.closed.load(Ordering::SeqCst), 1);
    }
}
