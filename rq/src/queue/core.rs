//! Weighted priority queue implementation

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::priority::Priority;

use super::config::PriorityWeights;
use super::entry::{QueueEntry, QueueSnapshot};
use super::error::QueueError;

/// Internal state protected by mutex
struct QueueInner<T> {
    /// FIFO sequence per level, indexed by `Priority::index`
    levels: [VecDeque<QueueEntry<T>>; Priority::COUNT],

    /// Cached backlog x multiplier per level
    level_weights: [f64; Priority::COUNT],

    /// Level the next pop serves; `None` only while empty
    next: Option<Priority>,

    /// Always equal to the sum of the level lengths
    len: usize,
}

impl<T> QueueInner<T> {
    fn update_weight(&mut self, priority: Priority, weights: &PriorityWeights) {
        let i = priority.index();
        self.level_weights[i] = self.levels[i].len() as f64 * weights.multiplier(priority);
    }

    /// Ascending scan from Immediate to Low; a level only displaces the
    /// current pick when its weight is strictly greater
    fn select_next(&mut self) {
        let mut next = None;
        let mut max = 0.0;

        for priority in Priority::ALL {
            let weight = self.level_weights[priority.index()];
            if weight > max {
                next = Some(priority);
                max = weight;
            }
        }

        self.next = next;
    }
}

/// Priority queue that serves the level with the largest weighted backlog
///
/// Each level's weight is `queued entries x configured multiplier`, recomputed
/// on every push and pop. Entries within a level come out in FIFO order.
/// Selection is deterministic for a given sequence of operations.
pub struct WeightedPriorityQueue<T> {
    weights: PriorityWeights,
    inner: Mutex<QueueInner<T>>,
}

impl<T> Default for WeightedPriorityQueue<T> {
    fn default() -> Self {
        Self::build(PriorityWeights::default())
    }
}

impl<T> WeightedPriorityQueue<T> {
    /// Create an empty queue with the given multipliers
    pub fn new(weights: PriorityWeights) -> Result<Self, QueueError> {
        debug!(?weights, "WeightedPriorityQueue::new: called");
        weights.validate()?;
        Ok(Self::build(weights))
    }

    fn build(weights: PriorityWeights) -> Self {
        Self {
            weights,
            inner: Mutex::new(QueueInner {
                levels: Default::default(),
                level_weights: [0.0; Priority::COUNT],
                next: None,
                len: 0,
            }),
        }
    }

    /// Every mutation recomputes the cached state before the guard drops, so
    /// a poisoned lock still holds a consistent queue
    fn lock(&self) -> MutexGuard<'_, QueueInner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Multipliers this queue was built with
    pub fn weights(&self) -> &PriorityWeights {
        &self.weights
    }

    /// Append an item to the tail of its level. Never rejects.
    pub fn push(&self, item: T, priority: Priority) {
        let mut inner = self.lock();
        Self::push_locked(&mut inner, &self.weights, item, priority);
        debug!(%priority, len = inner.len, next = ?inner.next, "WeightedPriorityQueue::push: queued");
    }

    /// Append an item unless `limit` entries are already queued
    pub fn push_bounded(&self, item: T, priority: Priority, limit: usize) -> Result<(), QueueError> {
        let mut inner = self.lock();
        if inner.len >= limit {
            debug!(%priority, limit, "WeightedPriorityQueue::push_bounded: queue full, rejecting");
            return Err(QueueError::Full { limit });
        }
        Self::push_locked(&mut inner, &self.weights, item, priority);
        debug!(%priority, len = inner.len, next = ?inner.next, "WeightedPriorityQueue::push_bounded: queued");
        Ok(())
    }

    fn push_locked(inner: &mut QueueInner<T>, weights: &PriorityWeights, item: T, priority: Priority) {
        inner.levels[priority.index()].push_back(QueueEntry::new(item, priority));
        inner.update_weight(priority, weights);
        inner.len += 1;
        inner.select_next();
    }

    /// Remove the head entry of the currently selected level
    pub fn pop(&self) -> Result<QueueEntry<T>, QueueError> {
        let mut inner = self.lock();

        if inner.len == 0 {
            return Err(QueueError::Empty);
        }

        let priority = inner
            .next
            .ok_or_else(|| QueueError::Inconsistent(format!("no level selected with {} entries queued", inner.len)))?;

        let entry = inner.levels[priority.index()]
            .pop_front()
            .ok_or_else(|| QueueError::Inconsistent(format!("selected level {} is empty", priority)))?;

        inner.update_weight(priority, &self.weights);
        inner.len -= 1;
        inner.select_next();

        debug!(%priority, len = inner.len, next = ?inner.next, "WeightedPriorityQueue::pop: removed");
        Ok(entry)
    }

    /// Total number of queued entries
    pub fn len(&self) -> usize {
        self.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries queued at one level
    pub fn len_at(&self, priority: Priority) -> usize {
        self.lock().levels[priority.index()].len()
    }

    /// Current weight of one level
    pub fn weight(&self, priority: Priority) -> f64 {
        self.lock().level_weights[priority.index()]
    }

    /// Level the next pop will serve
    pub fn next_priority(&self) -> Option<Priority> {
        self.lock().next
    }

    /// Consistent view of all counters taken under one lock
    pub fn snapshot(&self) -> QueueSnapshot {
        let inner = self.lock();
        let mut depths = [0; Priority::COUNT];
        for (depth, level) in depths.iter_mut().zip(inner.levels.iter()) {
            *depth = level.len();
        }
        QueueSnapshot {
            depths,
            weights: inner.level_weights,
            next: inner.next,
            total: inner.len,
        }
    }
}
