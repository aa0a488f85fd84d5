//! The single-level hashed timing wheel.
//!
//! [`Wheel`] is purely synchronous: it knows nothing about clocks, channels
//! or tasks. Whoever owns it calls [`Wheel::tick`] once per tick interval and
//! decides what to do with the jobs that come out. [`TimeWheel`](crate::TimeWheel)
//! drives it from a Tokio command loop.
//!
//! A tick first advances the cursor and then visits the slot it lands on, so
//! `cursor` always names the slot visited last. A job whose delay covers
//! `ticks` slot advances is placed `ticks` slots ahead of the cursor and skips
//! `(ticks - 1) / slot_count` visits to that slot before it fires on tick
//! number `ticks`.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::WheelError;
use crate::slots::{NodeRef, SlotRing};

/// A pending job.
#[derive(Debug)]
pub struct Job<T> {
    key: String,
    delay: Duration,
    laps: u64,
    action: T,
}

impl<T> Job<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The delay originally requested.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Remaining visits to this job's slot before it fires.
    pub fn laps(&self) -> u64 {
        self.laps
    }

    pub fn action(&self) -> &T {
        &self.action
    }

    pub fn into_action(self) -> T {
        self.action
    }
}

/// Where a job currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    slot: usize,
    node: NodeRef,
}

impl Location {
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Slot array, cursor and key index.
///
/// Every job in a slot has exactly one entry in the index and every index
/// entry points at a job in the slot it names.
pub struct Wheel<T> {
    tick_interval: Duration,
    slots: SlotRing<Job<T>>,
    cursor: usize,
    index: HashMap<String, Location>,
}

impl<T> Wheel<T> {
    /// Create an empty wheel.
    ///
    /// Fails if `tick_interval` is zero or `slot_count` is zero.
    pub fn new(tick_interval: Duration, slot_count: usize) -> Result<Self, WheelError> {
        if tick_interval.is_zero() {
            return Err(WheelError::InvalidTickInterval);
        }
        if slot_count == 0 {
            return Err(WheelError::InvalidSlotCount);
        }
        Ok(Self {
            tick_interval,
            slots: SlotRing::new(slot_count),
            cursor: 0,
            index: HashMap::new(),
        })
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn slot_count(&self) -> usize {
        self.slots.slot_count()
    }

    /// The slot visited by the most recent tick.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of pending jobs.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of jobs waiting in `slot`, zero if out of range.
    pub fn slot_len(&self, slot: usize) -> usize {
        if slot < self.slot_count() {
            self.slots.slot_len(slot)
        } else {
            0
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn location(&self, key: &str) -> Option<Location> {
        self.index.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&Job<T>> {
        let location = self.index.get(key)?;
        self.slots.get(location.node)
    }

    /// Insert a job, replacing any pending job with the same key.
    ///
    /// Returns the replaced job, if there was one.
    pub fn schedule(&mut self, delay: Duration, key: String, action: T) -> Option<Job<T>> {
        let replaced = self.cancel(&key);

        let ticks = self.ticks_for(delay);
        let slot_count = self.slot_count() as u64;
        let slot = ((self.cursor as u64 + ticks % slot_count) % slot_count) as usize;
        let laps = (ticks - 1) / slot_count;

        let node = self.slots.push_back(
            slot,
            Job {
                key: key.clone(),
                delay,
                laps,
                action,
            },
        );
        self.index.insert(key, Location { slot, node });

        replaced
    }

    /// Remove the pending job for `key`, if any.
    pub fn cancel(&mut self, key: &str) -> Option<Job<T>> {
        let location = self.index.remove(key)?;
        self.slots.remove(location.slot, location.node)
    }

    /// Advance the cursor one slot and fire every due job in it.
    ///
    /// Jobs with laps remaining lose one lap and stay put. Due jobs are
    /// removed from the index before being handed to `on_fire`, in the order
    /// they were inserted.
    pub fn tick(&mut self, mut on_fire: impl FnMut(Job<T>)) {
        self.cursor = (self.cursor + 1) % self.slot_count();

        let index = &mut self.index;
        self.slots.drain_where(
            self.cursor,
            |job| {
                if job.laps == 0 {
                    true
                } else {
                    job.laps -= 1;
                    false
                }
            },
            |job| {
                index.remove(&job.key);
                on_fire(job);
            },
        );
    }

    /// Drop every pending job and return how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.index.len();
        for slot in 0..self.slot_count() {
            self.slots.drain_where(slot, |_| true, drop);
        }
        self.index.clear();
        count
    }

    /// Whole slot advances covered by `delay`, never less than one.
    fn ticks_for(&self, delay: Duration) -> u64 {
        let ticks = delay.as_nanos() / self.tick_interval.as_nanos();
        u64::try_from(ticks).unwrap_or(u64::MAX).max(1)
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        let mut seen = 0;
        for slot in 0..self.slot_count() {
            for (node, job) in self.slots.iter(slot) {
                let location = self
                    .index
                    .get(&job.key)
                    .unwrap_or_else(|| panic!("job '{}' has no index entry", job.key));
                assert_eq!(location.slot, slot, "job '{}' indexed in wrong slot", job.key);
                assert_eq!(location.node, node, "job '{}' indexed to wrong node", job.key);
                seen += 1;
            }
        }
        assert_eq!(seen, self.index.len(), "index has orphaned entries");
        assert_eq!(seen, self.slots.len());
    }
}
