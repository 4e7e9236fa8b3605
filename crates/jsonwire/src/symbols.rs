//! Canonicalization of recurring member-name strings.
//!
//! Parsers see the same handful of object member names over and over. The
//! symbol table interns them so every occurrence within one table lineage
//! resolves to the same `Arc<str>` (pointer-identical, enabling
//! reference-equality fast paths upstream) and repeated documents stop
//! allocating.
//!
//! One root table lives in the factory and is shared by every parsing session
//! it creates. A session never mutates the root while parsing: it reads root
//! entries through the lock and collects its own additions locally, merging
//! them back under the write lock when the session is released. Sessions that
//! are dropped without release simply discard their additions.
//!
//! Hash-collision defense: an attacker feeding crafted names can degrade a
//! hash map into a linked list. Beyond a per-bucket chain limit the session
//! either fails or silently stops interning for the rest of the session,
//! selected by [`CollisionPolicy`].

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::error::{ErrorKind, JsonError};

/// Longest tolerated same-hash chain before the collision policy applies.
pub const DEFAULT_COLLISION_LIMIT: usize = 100;

/// Root tables larger than this stop accepting merge-backs; sessions still
/// work, their additions just die with them.
const MAX_ROOT_ENTRIES: usize = 12_000;

/// What to do when a hash bucket's chain exceeds the collision limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Return an error; the document is likely hostile.
    #[default]
    Fail,
    /// Stop canonicalizing for the remainder of the session.
    Disable,
}

#[derive(Debug, Default)]
struct Buckets {
    map: HashMap<u64, Vec<Arc<str>>>,
    entries: usize,
}

impl Buckets {
    fn find(&self, hash: u64, name: &str) -> Option<Arc<str>> {
        self.map
            .get(&hash)
            .and_then(|bucket| bucket.iter().find(|s| ***s == *name).cloned())
    }

    fn chain_len(&self, hash: u64) -> usize {
        self.map.get(&hash).map_or(0, Vec::len)
    }

    fn insert(&mut self, hash: u64, sym: Arc<str>) {
        self.map.entry(hash).or_default().push(sym);
        self.entries += 1;
    }
}

/// FNV-1a over the name bytes. Stable across sessions so root and session
/// tables agree on bucket identity.
#[inline]
pub(crate) fn name_hash(name: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in name.as_bytes() {
        h ^= u64::from(*b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

/// The shared root table. One per factory; cheap to clone (handle semantics).
#[derive(Debug, Clone)]
pub struct SymbolTable {
    root: Arc<RwLock<Buckets>>,
    collision_limit: usize,
    policy: CollisionPolicy,
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new(DEFAULT_COLLISION_LIMIT, CollisionPolicy::default())
    }
}

impl SymbolTable {
    /// Creates a root table with the given collision defense configuration.
    #[must_use]
    pub fn new(collision_limit: usize, policy: CollisionPolicy) -> Self {
        SymbolTable {
            root: Arc::new(RwLock::new(Buckets::default())),
            collision_limit,
            policy,
        }
    }

    /// Opens a session-scoped child view for one parsing session.
    #[must_use]
    pub fn session(&self) -> SymbolSession {
        SymbolSession {
            root: Arc::clone(&self.root),
            local: HashMap::new(),
            local_entries: 0,
            disabled: false,
            collision_limit: self.collision_limit,
            policy: self.policy,
        }
    }

    /// Number of interned names currently in the root.
    #[must_use]
    pub fn root_len(&self) -> usize {
        self.root.read().expect("symbol table poisoned").entries
    }
}

/// A per-session child view of the root table.
#[derive(Debug)]
pub struct SymbolSession {
    root: Arc<RwLock<Buckets>>,
    local: HashMap<u64, Vec<Arc<str>>>,
    local_entries: usize,
    disabled: bool,
    collision_limit: usize,
    policy: CollisionPolicy,
}

impl SymbolSession {
    /// Returns the canonical instance for `name`.
    ///
    /// Identical content always yields the same `Arc` within this session's
    /// lineage (root hits are shared across sessions).
    ///
    /// # Errors
    ///
    /// Fails when a hash chain exceeds the collision limit under
    /// [`CollisionPolicy::Fail`].
    pub fn canonicalize(&mut self, name: &str) -> Result<Arc<str>, JsonError> {
        if self.disabled {
            return Ok(Arc::from(name));
        }
        let hash = name_hash(name);

        let root_chain = {
            let root = self.root.read().expect("symbol table poisoned");
            if let Some(sym) = root.find(hash, name) {
                return Ok(sym);
            }
            root.chain_len(hash)
        };

        if let Some(bucket) = self.local.get(&hash) {
            if let Some(sym) = bucket.iter().find(|s| ***s == *name) {
                return Ok(Arc::clone(sym));
            }
        }

        let local_chain = self.local.get(&hash).map_or(0, Vec::len);
        if root_chain + local_chain >= self.collision_limit {
            match self.policy {
                CollisionPolicy::Fail => {
                    return Err(JsonError::new(ErrorKind::CollisionLimit(
                        self.collision_limit,
                    )));
                }
                CollisionPolicy::Disable => {
                    self.disabled = true;
                    return Ok(Arc::from(name));
                }
            }
        }

        let sym: Arc<str> = Arc::from(name);
        self.local
            .entry(hash)
            .or_default()
            .push(Arc::clone(&sym));
        self.local_entries += 1;
        Ok(sym)
    }

    /// Merges session additions back into the root table.
    ///
    /// Skipped entirely when canonicalization was disabled mid-session or the
    /// root has grown past its reuse cap.
    pub fn release(&mut self) {
        if self.disabled || self.local.is_empty() {
            return;
        }
        let mut root = self.root.write().expect("symbol table poisoned");
        if root.entries + self.local_entries > MAX_ROOT_ENTRIES {
            self.local.clear();
            return;
        }
        for (hash, bucket) in self.local.drain() {
            for sym in bucket {
                if root.find(hash, &sym).is_none() {
                    root.insert(hash, sym);
                }
            }
        }
        self.local_entries = 0;
    }

    /// Whether collision defense has disabled interning for this session.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_instance_within_session() {
        let table = SymbolTable::default();
        let mut session = table.session();
        let a = session.canonicalize("x").unwrap();
        let b = session.canonicalize("x").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn merge_back_shares_across_sessions() {
        let table = SymbolTable::default();
        let first = {
            let mut session = table.session();
            let sym = session.canonicalize("name").unwrap();
            session.release();
            sym
        };
        assert_eq!(table.root_len(), 1);
        let mut session = table.session();
        let second = session.canonicalize("name").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn dropped_session_discards_additions() {
        let table = SymbolTable::default();
        {
            let mut session = table.session();
            let _ = session.canonicalize("gone").unwrap();
            // no release
        }
        assert_eq!(table.root_len(), 0);
    }

    #[test]
    fn collision_limit_fail_policy() {
        let table = SymbolTable::new(0, CollisionPolicy::Fail);
        let mut session = table.session();
        let err = session.canonicalize("a").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::CollisionLimit(0)));
    }

    #[test]
    fn collision_limit_disable_policy() {
        let table = SymbolTable::new(0, CollisionPolicy::Disable);
        let mut session = table.session();
        let a = session.canonicalize("a").unwrap();
        let b = session.canonicalize("a").unwrap();
        assert!(session.is_disabled());
        // Interning is off: equal content, distinct instances.
        assert_eq!(a, b);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn distinct_names_distinct_instances() {
        let table = SymbolTable::default();
        let mut session = table.session();
        let a = session.canonicalize("a").unwrap();
        let b = session.canonicalize("b").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_ne!(a, b);
    }
}
