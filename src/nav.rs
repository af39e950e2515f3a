//! Current-feed cursor with wraparound at both ends.

/// Cursor into a registry of `len` feeds.
///
/// `current` always lies in `[0, len)`. Stepping past either end wraps, so a
/// single-feed registry steps onto itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    current: usize,
    len: usize,
}

impl Navigation {
    /// Creates a cursor at index 0. `len` must be non-zero.
    pub fn new(len: usize) -> Self {
        debug_assert!(len > 0, "navigation over an empty registry");
        Self {
            current: 0,
            len: len.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.len
    }

    /// Index after `current`, wrapping to 0 past the last feed.
    pub fn next_index(&self) -> usize {
        if self.current + 1 >= self.len {
            0
        } else {
            self.current + 1
        }
    }

    /// Index before `current`, wrapping to the last feed before 0.
    pub fn previous_index(&self) -> usize {
        if self.current == 0 {
            self.len - 1
        } else {
            self.current - 1
        }
    }

    /// Move the cursor. Out-of-range indices are ignored and return `false`.
    pub fn set_current(&mut self, index: usize) -> bool {
        if !self.contains(index) {
            return false;
        }
        self.current = index;
        true
    }
}
