//! Load generation tokens.

use serde::{Deserialize, Serialize};

/// Identifies one load request. Later requests carry larger values.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct LoadToken(pub u64);

/// Monotonic allocator for LoadToken. Only the most recently issued token is
/// allowed to commit.
#[derive(Default, Debug)]
pub struct GenerationCounter {
    latest: u64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn issue(&mut self) -> LoadToken {
        self.latest = self.latest.wrapping_add(1);
        LoadToken(self.latest)
    }

    #[inline]
    pub fn is_latest(&self, token: LoadToken) -> bool {
        token.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut counter = GenerationCounter::new();
        let a = counter.issue();
        let b = counter.issue();
        assert!(b > a);
        assert!(!counter.is_latest(a));
        assert!(counter.is_latest(b));
    }
}
