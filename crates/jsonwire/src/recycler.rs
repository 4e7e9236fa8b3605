//! Pooling of scratch buffers across parsing/generation sessions.
//!
//! Buffers are keyed by logical role. Acquiring a buffer moves it out of the
//! pool, so an outstanding lease can never be handed to a second session;
//! releasing clears and returns it. The handle is cheap to clone and shared
//! between a factory and everything it constructs.
//!
//! A disabled recycler (for environments where pooling is unsafe or would
//! leak) allocates fresh on acquire and drops on release.

use std::sync::{Arc, Mutex};

/// Logical role of a recycled buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    /// Parser-side decoded character scratch.
    ParserChar,
    /// Parser-side raw input bytes.
    ParserByte,
    /// Copy of the current member name.
    NameCopy,
    /// Generator-side concatenation scratch.
    WriteConcat,
    /// Generator-side encoding scratch.
    WriteEncoding,
    /// Base64 decode output.
    BinaryDecode,
}

const BYTE_ROLES: usize = 3;
const CHAR_ROLES: usize = 3;

impl BufferRole {
    // Byte-backed roles index one pool, char-backed roles the other.
    fn byte_slot(self) -> Option<usize> {
        match self {
            BufferRole::ParserByte => Some(0),
            BufferRole::WriteEncoding => Some(1),
            BufferRole::BinaryDecode => Some(2),
            _ => None,
        }
    }

    fn char_slot(self) -> Option<usize> {
        match self {
            BufferRole::ParserChar => Some(0),
            BufferRole::NameCopy => Some(1),
            BufferRole::WriteConcat => Some(2),
            _ => None,
        }
    }

    /// Initial capacity for a freshly allocated buffer of this role.
    fn initial_capacity(self) -> usize {
        match self {
            BufferRole::ParserByte | BufferRole::ParserChar => 8_000,
            BufferRole::NameCopy => 200,
            BufferRole::WriteConcat | BufferRole::WriteEncoding => 4_000,
            BufferRole::BinaryDecode => 2_000,
        }
    }
}

#[derive(Debug, Default)]
struct Pool {
    bytes: [Option<Vec<u8>>; BYTE_ROLES],
    chars: [Option<String>; CHAR_ROLES],
}

/// Shared handle to the buffer pool.
#[derive(Debug, Clone, Default)]
pub struct BufferRecycler {
    pool: Option<Arc<Mutex<Pool>>>,
}

impl BufferRecycler {
    /// A pooling recycler.
    #[must_use]
    pub fn new() -> Self {
        BufferRecycler {
            pool: Some(Arc::new(Mutex::new(Pool::default()))),
        }
    }

    /// A recycler that never pools: acquire allocates, release drops.
    #[must_use]
    pub fn disabled() -> Self {
        BufferRecycler { pool: None }
    }

    /// Whether pooling is active.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    /// Takes the pooled byte buffer for `role`, or allocates a fresh one.
    ///
    /// # Panics
    ///
    /// Panics if `role` is a char-backed role.
    #[must_use]
    pub fn acquire_bytes(&self, role: BufferRole) -> Vec<u8> {
        let slot = role.byte_slot().expect("byte-backed role required");
        if let Some(pool) = &self.pool {
            if let Some(buf) = pool.lock().expect("recycler poisoned").bytes[slot].take() {
                return buf;
            }
        }
        Vec::with_capacity(role.initial_capacity())
    }

    /// Returns a byte buffer to the pool (cleared), or drops it when pooling
    /// is disabled.
    pub fn release_bytes(&self, role: BufferRole, mut buf: Vec<u8>) {
        let Some(slot) = role.byte_slot() else {
            debug_assert!(false, "byte-backed role required");
            return;
        };
        if let Some(pool) = &self.pool {
            buf.clear();
            pool.lock().expect("recycler poisoned").bytes[slot] = Some(buf);
        }
    }

    /// Takes the pooled char buffer for `role`, or allocates a fresh one.
    ///
    /// # Panics
    ///
    /// Panics if `role` is a byte-backed role.
    #[must_use]
    pub fn acquire_chars(&self, role: BufferRole) -> String {
        let slot = role.char_slot().expect("char-backed role required");
        if let Some(pool) = &self.pool {
            if let Some(buf) = pool.lock().expect("recycler poisoned").chars[slot].take() {
                return buf;
            }
        }
        String::with_capacity(role.initial_capacity())
    }

    /// Returns a char buffer to the pool (cleared), or drops it when pooling
    /// is disabled.
    pub fn release_chars(&self, role: BufferRole, mut buf: String) {
        let Some(slot) = role.char_slot() else {
            debug_assert!(false, "char-backed role required");
            return;
        };
        if let Some(pool) = &self.pool {
            buf.clear();
            pool.lock().expect("recycler poisoned").chars[slot] = Some(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_reuses_allocation() {
        let recycler = BufferRecycler::new();
        let mut buf = recycler.acquire_bytes(BufferRole::ParserByte);
        buf.extend_from_slice(b"data");
        let cap = buf.capacity();
        let ptr = buf.as_ptr();
        recycler.release_bytes(BufferRole::ParserByte, buf);

        let again = recycler.acquire_bytes(BufferRole::ParserByte);
        assert!(again.is_empty());
        assert_eq!(again.capacity(), cap);
        assert_eq!(again.as_ptr(), ptr);
    }

    #[test]
    fn outstanding_lease_never_aliased() {
        let recycler = BufferRecycler::new();
        let first = recycler.acquire_bytes(BufferRole::BinaryDecode);
        let second = recycler.acquire_bytes(BufferRole::BinaryDecode);
        // Second acquire without a release gets a distinct allocation.
        assert_ne!(first.as_ptr(), second.as_ptr());
    }

    #[test]
    fn roles_are_independent() {
        let recycler = BufferRecycler::new();
        let mut a = recycler.acquire_bytes(BufferRole::ParserByte);
        a.push(1);
        recycler.release_bytes(BufferRole::ParserByte, a);
        // Releasing one role must not affect another role's slot.
        let b = recycler.acquire_bytes(BufferRole::WriteEncoding);
        assert!(b.is_empty());
    }

    #[test]
    fn disabled_recycler_always_allocates() {
        let recycler = BufferRecycler::disabled();
        assert!(!recycler.is_enabled());
        let mut buf = recycler.acquire_chars(BufferRole::ParserChar);
        buf.push('x');
        recycler.release_chars(BufferRole::ParserChar, buf);
        let buf = recycler.acquire_chars(BufferRole::ParserChar);
        assert!(buf.is_empty());
    }

    #[test]
    fn char_roles_round_trip() {
        let recycler = BufferRecycler::new();
        let mut s = recycler.acquire_chars(BufferRole::WriteConcat);
        s.push_str("scratch");
        recycler.release_chars(BufferRole::WriteConcat, s);
        let s = recycler.acquire_chars(BufferRole::WriteConcat);
        assert!(s.is_empty());
        assert!(s.capacity() >= 7);
    }
}
