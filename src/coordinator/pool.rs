use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::hub::ConnectionId;

/// Which activity a waiting connection wants a partner for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    Video,
    Chess,
}

impl Pool {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Video => Self::Chess,
            Self::Chess => Self::Video,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Chess => "chess",
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unordered set of connections awaiting a partner.
///
/// Entries live in a dense vector with a position index, so membership,
/// insertion, removal and picking an arbitrary entry are all O(1) and the
/// pick does not depend on any hash iteration order.
#[derive(Debug, Default)]
pub struct WaitingPool {
    entries: Vec<ConnectionId>,
    positions: HashMap<ConnectionId, usize>,
}

impl WaitingPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection; returns `false` if it was already waiting.
    pub fn insert(&mut self, id: ConnectionId) -> bool {
        if self.positions.contains_key(&id) {
            return false;
        }
        self.positions.insert(id, self.entries.len());
        self.entries.push(id);
        true
    }

    /// Remove a connection; returns `false` if it was not waiting.
    pub fn remove(&mut self, id: ConnectionId) -> bool {
        let Some(pos) = self.positions.remove(&id) else {
            return false;
        };
        self.entries.swap_remove(pos);
        if let Some(&moved) = self.entries.get(pos) {
            self.positions.insert(moved, pos);
        }
        true
    }

    /// Remove and return some waiting entry other than `caller`.
    ///
    /// The caller is never handed back to itself, which guards against
    /// duplicate match requests pairing a connection with itself.
    pub fn take_other(&mut self, caller: ConnectionId) -> Option<ConnectionId> {
        let others = self.entries.len() - usize::from(self.contains(caller));
        if others == 0 {
            return None;
        }

        let len = self.entries.len();
        let mut pos = rand::thread_rng().gen_range(0..len);
        if self.entries[pos] == caller {
            pos = (pos + 1) % len;
        }
        let picked = self.entries[pos];
        self.remove(picked);
        Some(picked)
    }

    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.positions.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.entries.iter().copied()
    }
}
