//! Timed task queues.
//!
//! Every delayed sequence in the game (warning → materialize, burst shots,
//! staggered wave spawns, delayed pool returns) is a value of some step enum
//! parked on a `Timeline` with a wake time. A system owned by the feature
//! drains the due tasks each frame and acts on them.
//!
//! ```text
//! producer:  timeline.schedule_in(now, delay, Step::Next { .. })
//! consumer:  for step in timeline.drain_due(now) { match step { .. } }
//! ```
//!
//! Cancellation marks a task id dead; its wake is skipped when it comes due.
//! Everything else that can go stale (a released entity, an older wave) is
//! guarded by the consumer when the task wakes.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use bevy::platform::collections::HashSet;
use bevy::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Wake<T> {
    at: Duration,
    id: TaskId,
    task: T,
}

impl<T> PartialEq for Wake<T> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.id == other.id
    }
}

impl<T> Eq for Wake<T> {}

impl<T> PartialOrd for Wake<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed: BinaryHeap is a max-heap and we want the earliest wake on top.
// Ties resolve in submission order.
impl<T> Ord for Wake<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.at.cmp(&self.at).then_with(|| other.id.cmp(&self.id))
    }
}

#[derive(Resource, Debug)]
pub struct Timeline<T: Send + Sync + 'static> {
    heap: BinaryHeap<Wake<T>>,
    cancelled: HashSet<TaskId>,
    next_id: u64,
}

impl<T: Send + Sync + 'static> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            cancelled: HashSet::default(),
            next_id: 0,
        }
    }
}

impl<T: Send + Sync + 'static> Timeline<T> {
    pub fn schedule(&mut self, at: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.heap.push(Wake { at, id, task });
        id
    }

    /// Schedule `delay_secs` after `now`. Negative delays wake immediately.
    pub fn schedule_in(&mut self, now: Duration, delay_secs: f32, task: T) -> TaskId {
        self.schedule(now + Duration::from_secs_f32(delay_secs.max(0.0)), task)
    }

    pub fn cancel(&mut self, id: TaskId) {
        if self.heap.iter().any(|w| w.id == id) {
            self.cancelled.insert(id);
        }
    }

    /// True while `id` is still waiting and has not been cancelled.
    pub fn is_scheduled(&self, id: TaskId) -> bool {
        !self.cancelled.contains(&id) && self.heap.iter().any(|w| w.id == id)
    }

    /// Pop the earliest live task whose wake time is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<T> {
        while self.heap.peek().is_some_and(|w| w.at <= now) {
            let wake = self.heap.pop()?;
            if self.cancelled.remove(&wake.id) {
                continue;
            }
            return Some(wake.task);
        }
        None
    }

    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(task) = self.pop_due(now) {
            due.push(task);
        }
        due
    }

    /// Live (not cancelled) tasks still waiting.
    pub fn pending(&self) -> usize {
        self.heap.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    pub fn next_wake(&self) -> Option<Duration> {
        self.heap
            .iter()
            .filter(|w| !self.cancelled.contains(&w.id))
            .map(|w| w.at)
            .min()
    }
}
