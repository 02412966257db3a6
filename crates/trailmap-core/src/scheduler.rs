//! Keyed one-shot timers on a simulated monotonic clock.
//!
//! Each key has at most one pending timer; scheduling a key again replaces
//! the old fire time. Cancelled or replaced entries stay in the heap and are
//! skipped lazily when they surface. Timers due at the same instant fire in
//! the order they were scheduled.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    queue: BinaryHeap<Reverse<(Duration, u64)>>,
    /// seq → (key, fire time) for live entries only.
    pending: HashMap<u64, (K, Duration)>,
    by_key: HashMap<K, u64>,
    next_seq: u64,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            pending: HashMap::new(),
            by_key: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<K: Copy + Eq + Hash> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire at `at`, replacing any pending timer for it.
    pub fn schedule(&mut self, key: K, at: Duration) {
        self.cancel(key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse((at, seq)));
        self.pending.insert(seq, (key, at));
        self.by_key.insert(key, seq);
    }

    /// Disarm `key`. Safe to call when nothing is pending.
    pub fn cancel(&mut self, key: K) -> bool {
        match self.by_key.remove(&key) {
            Some(seq) => self.pending.remove(&seq).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.by_key.contains_key(&key)
    }

    pub fn fire_time(&self, key: K) -> Option<Duration> {
        let seq = self.by_key.get(&key)?;
        self.pending.get(seq).map(|(_, at)| *at)
    }

    /// Fire time of the earliest live timer.
    pub fn next_due(&mut self) -> Option<Duration> {
        self.drop_stale();
        self.queue.peek().map(|Reverse((at, _))| *at)
    }

    /// Pop the earliest live timer if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<K> {
        self.drop_stale();
        let Reverse((at, seq)) = *self.queue.peek()?;
        if at > now {
            return None;
        }
        self.queue.pop();
        let (key, _) = self.pending.remove(&seq)?;
        self.by_key.remove(&key);
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.pending.clear();
        self.by_key.clear();
    }

    fn drop_stale(&mut self) {
        while let Some(Reverse((_, seq))) = self.queue.peek() {
            if self.pending.contains_key(seq) {
                break;
            }
            self.queue.pop();
        }
    }
}
