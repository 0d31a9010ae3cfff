//! One-shot cooperative timers.
//!
//! Nothing runs on its own: the owner drains due tasks with [`Scheduler::pop_due`]
//! once per frame. Handles are never reused, so a consumer can always tell
//! whether a fired task is the one it is still waiting for.

use std::time::Instant;

use crate::reveal::RevealId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

/// The timers a glyph field runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// Mouse stillness poll.
    StillnessCheck,
    /// Touch hold expiry.
    HoldCheck,
    /// End of the given reveal's display time.
    RevealExpiry(RevealId),
    /// Hide the transient overlay.
    OverlayHide,
}

#[derive(Debug)]
struct Pending<T> {
    id: TaskId,
    due: Instant,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, due: Instant, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending { id, due, task });
        id
    }

    /// Returns whether the task was still pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Cancels whatever the slot holds and empties it.
    pub fn cancel_slot(&mut self, slot: &mut Option<TaskId>) {
        if let Some(id) = slot.take() {
            self.cancel(id);
        }
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }

    /// Removes and returns the earliest task due at or before `now`.
    /// Ties go to the task scheduled first.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TaskId, T)> {
        let pos = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| (p.due, p.id))
            .map(|(i, _)| i)?;
        let Pending { id, task, .. } = self.pending.swap_remove(pos);
        Some((id, task))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pops_in_due_order() {
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        sched.schedule(t0 + Duration::from_millis(30), "late");
        sched.schedule(t0 + Duration::from_millis(10), "early");
        sched.schedule(t0 + Duration::from_millis(10), "early-second");

        assert!(sched.pop_due(t0).is_none());
        let now = t0 + Duration::from_millis(50);
        let order: Vec<_> = std::iter::from_fn(|| sched.pop_due(now).map(|(_, t)| t)).collect();
        assert_eq!(order, vec!["early", "early-second", "late"]);
        assert!(sched.is_empty());
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let a = sched.schedule(t0, 1);
        let b = sched.schedule(t0, 2);
        assert!(sched.cancel(a));
        assert!(!sched.cancel(a));

        assert_eq!(sched.pop_due(t0), Some((b, 2)));
        assert_eq!(sched.pop_due(t0), None);
    }

    #[test]
    fn cancel_slot_empties_handle() {
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let mut slot = Some(sched.schedule(t0, ()));
        sched.cancel_slot(&mut slot);
        assert!(slot.is_none());
        assert!(sched.is_empty());
    }

    #[test]
    fn ids_are_monotonic() {
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let a = sched.schedule(t0, ());
        sched.clear();
        let b = sched.schedule(t0, ());
        assert!(b > a);
        assert_eq!(sched.next_due(), Some(t0));
    }
}
