//! Client and session ID allocation.
//!
//! Every local endpoint that talks SOME/IP gets its own client ID, drawn from
//! `[1, 0xFFFE]`, and every client ID owns a session counter that runs
//! `0, 1, ..., 0xFFFF` and then wraps to `0`. One mutex guards the pool, the
//! address map and the counters together, so no caller ever sees them out of
//! step with each other.

use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::{Result, SomeIpError};
use crate::header::{ClientId, SessionId};

/// Lowest client ID handed out.
pub const MIN_CLIENT_ID: u16 = 0x0001;
/// Highest client ID handed out.
pub const MAX_CLIENT_ID: u16 = 0xFFFE;

#[derive(Debug)]
struct State {
    address_to_client: HashMap<SocketAddr, ClientId>,
    client_to_session: HashMap<ClientId, u16>,
    /// Returned IDs, all below `next_fresh`.
    released: BTreeSet<u16>,
    /// Lowest ID never handed out; past `MAX_CLIENT_ID` once the range is used up.
    next_fresh: u32,
}

impl State {
    fn new() -> Self {
        Self {
            address_to_client: HashMap::new(),
            client_to_session: HashMap::new(),
            released: BTreeSet::new(),
            next_fresh: u32::from(MIN_CLIENT_ID),
        }
    }

    fn draw(&mut self) -> Option<ClientId> {
        if let Some(id) = self.released.pop_first() {
            return Some(ClientId(id));
        }
        let id = u16::try_from(self.next_fresh)
            .ok()
            .filter(|id| *id <= MAX_CLIENT_ID)?;
        self.next_fresh += 1;
        Some(ClientId(id))
    }

    fn available(&self) -> usize {
        let fresh = (u32::from(MAX_CLIENT_ID) + 1).saturating_sub(self.next_fresh);
        self.released.len() + fresh as usize
    }

    fn client_id(&mut self, address: SocketAddr) -> Result<ClientId> {
        if let Some(client) = self.address_to_client.get(&address) {
            return Ok(*client);
        }
        let Some(client) = self.draw() else {
            warn!(%address, "client ID pool exhausted");
            return Err(SomeIpError::PoolExhausted);
        };
        self.address_to_client.insert(address, client);
        debug!(%address, %client, "assigned client ID");
        Ok(client)
    }

    fn session_id(&mut self, client: ClientId) -> SessionId {
        let next = self.client_to_session.entry(client).or_insert(0);
        let session = *next;
        *next = next.wrapping_add(1);
        SessionId(session)
    }
}

/// Thread-safe client/session ID allocator.
///
/// Share it between threads with an `Arc`.
#[derive(Debug)]
pub struct Allocator {
    state: Mutex<State>,
}

impl Allocator {
    /// Create an allocator with the full client ID pool.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::new()),
        }
    }

    /// Client ID of `address`, assigning the lowest free ID on first use.
    ///
    /// Repeated calls for a registered address return the same ID.
    pub fn get_client_id(&self, address: SocketAddr) -> Result<ClientId> {
        self.state.lock().client_id(address)
    }

    /// Next session ID of `client`.
    ///
    /// A client without a counter (never seen, or released) starts at 0.
    pub fn get_session_id(&self, client: ClientId) -> SessionId {
        let session = self.state.lock().session_id(client);
        trace!(%client, %session, "issued session ID");
        session
    }

    /// Client ID of `address` and its next session ID, in one step.
    pub fn allocate(&self, address: SocketAddr) -> Result<(ClientId, SessionId)> {
        let mut state = self.state.lock();
        let client = state.client_id(address)?;
        let session = state.session_id(client);
        Ok((client, session))
    }

    /// Unregister `address`, dropping its session counter and returning its
    /// client ID to the pool. Does nothing for unknown addresses.
    pub fn release(&self, address: SocketAddr) {
        let mut state = self.state.lock();
        if let Some(client) = state.address_to_client.remove(&address) {
            state.client_to_session.remove(&client);
            state.released.insert(client.0);
            debug!(%address, %client, "released client ID");
        }
    }

    /// Forget every address and counter and restore the full pool.
    pub fn reset(&self) {
        *self.state.lock() = State::new();
        debug!("allocator reset");
    }

    /// Client ID currently assigned to `address`, without assigning one.
    pub fn lookup(&self, address: SocketAddr) -> Option<ClientId> {
        self.state.lock().address_to_client.get(&address).copied()
    }

    /// Number of registered addresses.
    pub fn registered(&self) -> usize {
        self.state.lock().address_to_client.len()
    }

    /// Number of client IDs still free.
    pub fn available(&self) -> usize {
        self.state.lock().available()
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[test]
    fn test_client_id_idempotent() {
        let allocator = Allocator::new();
        let first = allocator.get_client_id(addr(1000)).unwrap();
        let again = allocator.get_client_id(addr(1000)).unwrap();
        let other = allocator.get_client_id(addr(1001)).unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(first, ClientId(MIN_CLIENT_ID));
        assert_eq!(allocator.registered(), 2);
    }

    #[test]
    fn test_session_sequence_wraps() {
        let allocator = Allocator::new();
        let client = allocator.get_client_id(addr(1000)).unwrap();

        for expected in 0..=0xFFFFu32 {
            assert_eq!(allocator.get_session_id(client).0 as u32, expected);
        }
        assert_eq!(allocator.get_session_id(client), SessionId(0));
        assert_eq!(allocator.get_session_id(client), SessionId(1));
    }

    #[test]
    fn test_session_counters_are_per_client() {
        let allocator = Allocator::new();
        let a = allocator.get_client_id(addr(1)).unwrap();
        let b = allocator.get_client_id(addr(2)).unwrap();

        allocator.get_session_id(a);
        allocator.get_session_id(a);
        assert_eq!(allocator.get_session_id(b), SessionId(0));
        assert_eq!(allocator.get_session_id(a), SessionId(2));
    }

    #[test]
    fn test_release_returns_id_and_drops_counter() {
        let allocator = Allocator::new();
        let client = allocator.get_client_id(addr(1)).unwrap();
        allocator.get_client_id(addr(2)).unwrap();
        allocator.get_session_id(client);
        allocator.get_session_id(client);

        allocator.release(addr(1));
        assert_eq!(allocator.lookup(addr(1)), None);
        assert_eq!(allocator.get_session_id(client), SessionId(0));

        // The released ID is the lowest free one and is handed out again.
        assert_eq!(allocator.get_client_id(addr(3)).unwrap(), client);

        // Unknown addresses are ignored.
        allocator.release(addr(9));
        assert_eq!(allocator.registered(), 2);
    }

    #[test]
    fn test_allocate_pair() {
        let allocator = Allocator::new();
        let (client, first) = allocator.allocate(addr(1)).unwrap();
        let (same, second) = allocator.allocate(addr(1)).unwrap();

        assert_eq!(client, same);
        assert_eq!(first, SessionId(0));
        assert_eq!(second, SessionId(1));
    }

    #[test]
    fn test_pool_exhaustion_and_reset() {
        let allocator = Allocator::new();
        let total = usize::from(MAX_CLIENT_ID - MIN_CLIENT_ID + 1);
        assert_eq!(allocator.available(), total);

        for i in 0..total {
            let port = (i % 60000) as u16 + 1;
            let ip = if i < 60000 { [10, 0, 0, 1] } else { [10, 0, 0, 2] };
            let client = allocator
                .get_client_id(SocketAddr::from((ip, port)))
                .unwrap();
            assert!((MIN_CLIENT_ID..=MAX_CLIENT_ID).contains(&client.0));
        }
        assert_eq!(allocator.available(), 0);
        assert!(matches!(
            allocator.get_client_id(addr(1)),
            Err(SomeIpError::PoolExhausted)
        ));

        allocator.release(SocketAddr::from(([10, 0, 0, 1], 5)));
        assert_eq!(allocator.get_client_id(addr(1)).unwrap(), ClientId(5));

        allocator.reset();
        assert_eq!(allocator.registered(), 0);
        assert_eq!(allocator.available(), total);
        assert_eq!(allocator.get_client_id(addr(1)).unwrap(), ClientId(1));
    }
}
