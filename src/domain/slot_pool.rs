//! Bounded pool of free slot tokens.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;

/// One unit of fungible capacity, an integer in `[0, capacity)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SlotToken(u32);

impl SlotToken {
    /// Wraps a raw token value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw token value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SlotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// FIFO of free tokens that never grows past its capacity.
///
/// Callers only ever take tokens out with [`SlotPool::drain_into`] and put
/// tokens they exclusively own back with [`SlotPool::release`]. Neither call
/// waits: an empty pool yields nothing.
#[derive(Debug)]
pub struct SlotPool {
    capacity: usize,
    free: Mutex<VecDeque<SlotToken>>,
}

impl SlotPool {
    /// Creates a pool holding every token `0..capacity`.
    #[must_use]
    pub fn full(capacity: u32) -> Self {
        Self {
            capacity: capacity as usize,
            free: Mutex::new((0..capacity).map(SlotToken).collect()),
        }
    }

    /// Maximum number of tokens the pool can ever hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tokens currently free.
    #[must_use]
    pub fn len(&self) -> usize {
        self.free.lock().len()
    }

    /// Returns `true` if no token is free.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free.lock().is_empty()
    }

    /// Moves up to `max` tokens from the front of the pool into `dst`.
    ///
    /// Returns how many tokens were moved.
    pub fn drain_into(&self, dst: &mut Vec<SlotToken>, max: usize) -> usize {
        let mut free = self.free.lock();
        let take = max.min(free.len());
        dst.extend(free.drain(..take));
        take
    }

    /// Returns tokens to the back of the pool.
    ///
    /// Tokens must have been taken out of this pool earlier; pushing the
    /// pool past its capacity means a token was duplicated somewhere.
    pub fn release<I>(&self, tokens: I)
    where
        I: IntoIterator<Item = SlotToken>,
    {
        let mut free = self.free.lock();
        free.extend(tokens);
        debug_assert!(
            free.len() <= self.capacity,
            "slot pool overflow: {} > {}",
            free.len(),
            self.capacity
        );
        if free.len() > self.capacity {
            tracing::error!(
                free = free.len(),
                capacity = self.capacity,
                "slot pool holds more tokens than its capacity"
            );
        }
    }

    /// Snapshot of the free tokens, front first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SlotToken> {
        self.free.lock().iter().copied().collect()
    }
}
