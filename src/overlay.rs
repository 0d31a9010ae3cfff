use std::time::{Duration, Instant};

use crate::detector::InteractionHook;
use crate::schedule::{Scheduler, Task, TaskId};

pub const HINT_TEXT: &str = "Hold still / press & hold to reveal...";

/// Visibility of the status line and the first-run hint.
#[derive(Debug)]
pub struct Overlay {
    timeout: Duration,
    visible: bool,
    hint_visible: bool,
    hide_timer: Option<TaskId>,
}

impl Overlay {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            visible: false,
            hint_visible: true,
            hide_timer: None,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn hint_visible(&self) -> bool {
        self.hint_visible
    }

    /// Shows the status line and pushes its hide deadline out.
    pub fn show(&mut self, scheduler: &mut Scheduler<Task>, now: Instant) {
        self.visible = true;
        self.restart_timer(scheduler, now);
    }

    pub fn hide(&mut self, scheduler: &mut Scheduler<Task>) {
        scheduler.cancel_slot(&mut self.hide_timer);
        self.visible = false;
    }

    /// Handles a fired hide task; stale ones are ignored.
    pub fn on_hide(&mut self, task: TaskId) -> bool {
        if self.hide_timer != Some(task) {
            return false;
        }
        self.hide_timer = None;
        self.visible = false;
        true
    }

    /// Forgets the hide timer without touching the scheduler.
    pub fn reset(&mut self) {
        self.hide_timer = None;
        self.visible = false;
    }

    fn restart_timer(&mut self, scheduler: &mut Scheduler<Task>, now: Instant) {
        scheduler.cancel_slot(&mut self.hide_timer);
        self.hide_timer = Some(scheduler.schedule(now + self.timeout, Task::OverlayHide));
    }
}

impl InteractionHook for Overlay {
    fn pointer_active(&mut self, scheduler: &mut Scheduler<Task>, now: Instant) {
        self.hint_visible = false;
        self.show(scheduler, now);
    }

    fn pointer_ended(&mut self, scheduler: &mut Scheduler<Task>, now: Instant) {
        if self.visible {
            self.restart_timer(scheduler, now);
        }
    }
}
