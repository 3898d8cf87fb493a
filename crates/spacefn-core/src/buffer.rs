// Spacefn Key Buffer
// Ordered, duplicate-free set of in-flight key codes

use smallvec::SmallVec;

use crate::Key;

/// Maximum number of keys tracked while a layer decision is pending.
pub const CAPACITY: usize = 8;

/// Outcome of a [`KeyBuffer::append`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Append {
    /// The key was stored.
    Added,
    /// The key was already present; the buffer is unchanged.
    Duplicate,
    /// The buffer is at capacity; the key was not stored.
    Full,
}

/// Insertion-ordered collection of unique key codes, bounded at
/// [`CAPACITY`] entries.
///
/// The buffer tracks keys whose virtual press is still owed a release,
/// so duplicate codes are never stored and removal preserves the
/// relative order of the remaining entries. All operations are linear
/// in the (small, fixed) capacity.
#[derive(Debug, Default)]
pub struct KeyBuffer {
    keys: SmallVec<[Key; CAPACITY]>,
}

impl KeyBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self {
            keys: SmallVec::new(),
        }
    }

    /// Number of keys currently buffered
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check whether a key is currently buffered
    pub fn contains(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Append a key, rejecting duplicates and respecting capacity.
    ///
    /// Duplicate suppression lives here rather than in the caller so a
    /// key-repeat or double press can never produce two tracked
    /// entries for the same code.
    pub fn append(&mut self, key: Key) -> Append {
        if self.contains(key) {
            return Append::Duplicate;
        }
        if self.keys.len() >= CAPACITY {
            return Append::Full;
        }
        self.keys.push(key);
        Append::Added
    }

    /// Remove a key by value, preserving the order of the rest.
    ///
    /// Returns true if the key was present.
    pub fn remove(&mut self, key: Key) -> bool {
        match self.keys.iter().position(|&k| k == key) {
            Some(idx) => {
                self.keys.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Clear all buffered keys
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// The buffered keys in insertion order
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Take the buffered keys, leaving the buffer empty
    pub fn take(&mut self) -> SmallVec<[Key; CAPACITY]> {
        std::mem::take(&mut self.keys)
    }
}
