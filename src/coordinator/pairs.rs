use std::collections::HashMap;

use crate::hub::ConnectionId;

/// Established video pairings, stored in both directions.
///
/// Entries are only added and removed two at a time, so `a → b` exists
/// exactly when `b → a` does.
#[derive(Debug, Default)]
pub struct PairTable {
    partners: HashMap<ConnectionId, ConnectionId>,
}

impl PairTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `a` with `b`. Refuses self-pairs and connections already paired.
    pub fn link(&mut self, a: ConnectionId, b: ConnectionId) -> bool {
        if a == b || self.partners.contains_key(&a) || self.partners.contains_key(&b) {
            return false;
        }
        self.partners.insert(a, b);
        self.partners.insert(b, a);
        true
    }

    /// Dissolve the pairing `id` belongs to, returning the former partner.
    pub fn unlink(&mut self, id: ConnectionId) -> Option<ConnectionId> {
        let partner = self.partners.remove(&id)?;
        self.partners.remove(&partner);
        Some(partner)
    }

    #[must_use]
    pub fn partner_of(&self, id: ConnectionId) -> Option<ConnectionId> {
        self.partners.get(&id).copied()
    }

    /// Number of pairings (each counted once).
    #[must_use]
    pub fn len(&self) -> usize {
        self.partners.len() / 2
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Every paired connection, both sides of each pairing.
    pub fn participants(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.partners.keys().copied()
    }
}
