//! Peer id assignment for incoming connections.
//!
//! Each connection that completes a handshake is given a random peer id.
//! The authority keeps id 1, so owners draw from `2..=i32::MAX`; the upper
//! bound keeps ids representable as a signed 32-bit integer for clients
//! that cannot handle unsigned ones.

use std::collections::HashMap;

use rand::Rng;
use satchel_protocol::PeerId;
use satchel_transport::ConnectionId;

const FIRST_OWNER_ID: u32 = 2;
const LAST_OWNER_ID: u32 = i32::MAX as u32;

/// Tracks which peer id belongs to which live connection.
///
/// Not thread-safe on its own; the server wraps it in a mutex.
#[derive(Debug, Default)]
pub(crate) struct PeerRegistry {
    peers: HashMap<PeerId, ConnectionId>,
}

impl PeerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Draws an unused id and binds it to `conn_id`.
    pub(crate) fn assign(&mut self, conn_id: ConnectionId) -> PeerId {
        let mut rng = rand::rng();
        loop {
            let candidate = PeerId(rng.random_range(FIRST_OWNER_ID..=LAST_OWNER_ID));
            if !self.peers.contains_key(&candidate) {
                self.peers.insert(candidate, conn_id);
                tracing::debug!(peer = %candidate, %conn_id, "peer id assigned");
                return candidate;
            }
        }
    }

    /// Frees `peer`. Returns the connection it was bound to.
    pub(crate) fn release(&mut self, peer: PeerId) -> Option<ConnectionId> {
        self.peers.remove(&peer)
    }

    pub(crate) fn len(&self) -> usize {
        self.peers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_stays_in_owner_range() {
        let mut registry = PeerRegistry::new();
        for n in 0..200 {
            let peer = registry.assign(ConnectionId::new(n));
            assert!(peer.0 >= 2, "{peer} collides with the authority");
            assert!(peer.0 <= i32::MAX as u32);
        }
    }

    #[test]
    fn test_assign_never_repeats_live_ids() {
        let mut registry = PeerRegistry::new();
        let mut seen = std::collections::HashSet::new();
        for n in 0..500 {
            assert!(seen.insert(registry.assign(ConnectionId::new(n))));
        }
        assert_eq!(registry.len(), 500);
    }

    #[test]
    fn test_release_frees_the_id() {
        let mut registry = PeerRegistry::new();
        let peer = registry.assign(ConnectionId::new(9));

        assert_eq!(registry.release(peer), Some(ConnectionId::new(9)));
        assert_eq!(registry.release(peer), None);
        assert_eq!(registry.len(), 0);
    }
}
