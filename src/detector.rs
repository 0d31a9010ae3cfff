//! Decides when the pointer has rested long enough to reveal something.
//!
//! A mouse is polled: every move arms a check at half the stillness threshold,
//! and the check keeps re-arming itself until the pointer has been quiet for
//! the full threshold. A touch gets a single hold timer instead, which any
//! movement or lift cancels.

use std::time::{Duration, Instant};

use log::trace;

use crate::schedule::{Scheduler, Task, TaskId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    Armed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub position: Option<(f32, f32)>,
    pub last_move: Instant,
    pub mode: InputMode,
}

impl PointerState {
    pub fn new(now: Instant) -> Self {
        Self {
            position: None,
            last_move: now,
            mode: InputMode::Mouse,
        }
    }

    pub fn since_move(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_move)
    }
}

/// Told about pointer activity so transient UI can show and hide itself.
pub trait InteractionHook {
    fn pointer_active(&mut self, scheduler: &mut Scheduler<Task>, now: Instant);
    fn pointer_ended(&mut self, scheduler: &mut Scheduler<Task>, now: Instant);
}

impl InteractionHook for () {
    fn pointer_active(&mut self, _: &mut Scheduler<Task>, _: Instant) {}
    fn pointer_ended(&mut self, _: &mut Scheduler<Task>, _: Instant) {}
}

#[derive(Debug)]
pub struct StillnessDetector {
    stillness_threshold: Duration,
    hold_threshold: Duration,
    stillness_timer: Option<TaskId>,
    hold_timer: Option<TaskId>,
}

impl StillnessDetector {
    pub fn new(stillness_threshold: Duration, hold_threshold: Duration) -> Self {
        Self {
            stillness_threshold,
            hold_threshold,
            stillness_timer: None,
            hold_timer: None,
        }
    }

    pub fn state(&self) -> DetectorState {
        if self.stillness_timer.is_some() || self.hold_timer.is_some() {
            DetectorState::Armed
        } else {
            DetectorState::Idle
        }
    }

    pub fn stillness_pending(&self) -> bool {
        self.stillness_timer.is_some()
    }

    pub fn hold_pending(&self) -> bool {
        self.hold_timer.is_some()
    }

    fn poll_interval(&self) -> Duration {
        self.stillness_threshold / 2
    }

    pub fn clear(&mut self, scheduler: &mut Scheduler<Task>) {
        scheduler.cancel_slot(&mut self.stillness_timer);
        scheduler.cancel_slot(&mut self.hold_timer);
    }

    /// Pointer moved. Mouse movement re-arms polling; touch movement only cancels.
    pub fn on_move<H: InteractionHook + ?Sized>(
        &mut self,
        scheduler: &mut Scheduler<Task>,
        now: Instant,
        mode: InputMode,
        hook: &mut H,
    ) {
        self.clear(scheduler);
        if mode == InputMode::Mouse {
            self.stillness_timer =
                Some(scheduler.schedule(now + self.poll_interval(), Task::StillnessCheck));
        }
        hook.pointer_active(scheduler, now);
    }

    pub fn on_touch_start<H: InteractionHook + ?Sized>(
        &mut self,
        scheduler: &mut Scheduler<Task>,
        now: Instant,
        hook: &mut H,
    ) {
        self.clear(scheduler);
        self.hold_timer = Some(scheduler.schedule(now + self.hold_threshold, Task::HoldCheck));
        hook.pointer_active(scheduler, now);
    }

    /// Pointer left or lifted. An active reveal keeps running.
    pub fn on_end<H: InteractionHook + ?Sized>(
        &mut self,
        scheduler: &mut Scheduler<Task>,
        now: Instant,
        hook: &mut H,
    ) {
        self.clear(scheduler);
        hook.pointer_ended(scheduler, now);
    }

    /// Handles a fired stillness poll. Returns true when the pointer has been
    /// still for the full threshold; the detector is then idle.
    pub fn on_stillness_check(
        &mut self,
        task: TaskId,
        scheduler: &mut Scheduler<Task>,
        now: Instant,
        last_move: Instant,
    ) -> bool {
        if self.stillness_timer != Some(task) {
            trace!("ignoring stale stillness check");
            return false;
        }
        self.stillness_timer = None;

        if now.saturating_duration_since(last_move) >= self.stillness_threshold {
            true
        } else {
            self.stillness_timer =
                Some(scheduler.schedule(now + self.poll_interval(), Task::StillnessCheck));
            false
        }
    }

    /// Handles a fired hold timer. True at most once per touch start.
    pub fn on_hold_check(&mut self, task: TaskId) -> bool {
        if self.hold_timer != Some(task) {
            trace!("ignoring stale hold check");
            return false;
        }
        self.hold_timer = None;
        true
    }

    /// Restarts polling after an interruption, once the pointer has been quiet
    /// for half the threshold and nothing else is pending. `busy` covers any
    /// reveal still showing or waiting to expire.
    pub fn maybe_rearm(
        &mut self,
        scheduler: &mut Scheduler<Task>,
        now: Instant,
        pointer: &PointerState,
        busy: bool,
    ) -> bool {
        if busy
            || pointer.mode != InputMode::Mouse
            || self.stillness_timer.is_some()
            || self.hold_timer.is_some()
            || pointer.since_move(now) <= self.poll_interval()
        {
            return false;
        }
        self.stillness_timer =
            Some(scheduler.schedule(now + self.stillness_threshold, Task::StillnessCheck));
        true
    }

    /// Forgets every handle without touching the scheduler.
    pub fn reset(&mut self) {
        self.stillness_timer = None;
        self.hold_timer = None;
    }
}
