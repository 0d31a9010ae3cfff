use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::Rng;

use crate::grid::{CellTarget, GridStore};
use crate::schedule::{Scheduler, Task, TaskId};
use crate::theme::DEFAULT_SNIPPETS;

/// Identifies one reveal. Strictly increasing over the life of an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RevealId(u64);

impl RevealId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What a trigger wrote into the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub id: RevealId,
    pub row: usize,
    pub start_col: usize,
    pub snippet: String,
    /// Characters actually written; fewer than the snippet when it hit the right edge.
    pub placed: usize,
}

#[derive(Debug)]
pub struct RevealEngine {
    snippets: Vec<Vec<char>>,
    duration: Duration,
    last_id: u64,
    active: Option<RevealId>,
    expiry: Option<TaskId>,
}

impl RevealEngine {
    pub fn new(snippets: &[String], duration: Duration) -> Self {
        let mut list: Vec<Vec<char>> = snippets
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.chars().collect())
            .collect();
        if list.is_empty() {
            warn!("no usable snippets configured, using the built-in list");
            list = DEFAULT_SNIPPETS.iter().map(|s| s.chars().collect()).collect();
        }
        Self {
            snippets: list,
            duration,
            last_id: 0,
            active: None,
            expiry: None,
        }
    }

    pub fn active(&self) -> Option<RevealId> {
        self.active
    }

    pub fn expiry_pending(&self) -> bool {
        self.expiry.is_some()
    }

    /// Writes a random snippet centered on the cell under `position` and makes
    /// it the active reveal. Does nothing without a position or outside the grid.
    pub fn trigger<R: Rng>(
        &mut self,
        position: Option<(f32, f32)>,
        cell_size: f32,
        grid: &mut GridStore,
        scheduler: &mut Scheduler<Task>,
        now: Instant,
        rng: &mut R,
    ) -> Option<Placement> {
        let (x, y) = position?;
        let dims = grid.dims();
        let (col, row) = dims.cell_at(x, y, cell_size)?;

        let snippet = &self.snippets[rng.gen_range(0..self.snippets.len())];
        let start_col = col.saturating_sub(snippet.len() / 2);

        self.last_id += 1;
        let id = RevealId(self.last_id);
        self.active = Some(id);

        let mut placed = 0;
        for (offset, &ch) in snippet.iter().enumerate() {
            let Some(index) = dims.index(start_col + offset, row) else {
                break;
            };
            grid.set_target(index, CellTarget::Revealing { ch, id });
            placed += 1;
        }

        scheduler.cancel_slot(&mut self.expiry);
        self.expiry = Some(scheduler.schedule(now + self.duration, Task::RevealExpiry(id)));

        let snippet: String = snippet.iter().collect();
        debug!(
            "reveal {} `{snippet}` at row {row}, cols {start_col}..{}",
            id.0,
            start_col + placed
        );
        Some(Placement {
            id,
            row,
            start_col,
            snippet,
            placed,
        })
    }

    /// Handles a fired expiry. Only the current expiry for the still-active
    /// reveal ends anything; returns whether it did.
    pub fn expire(&mut self, task: TaskId, id: RevealId) -> bool {
        if self.expiry != Some(task) {
            return false;
        }
        self.expiry = None;
        if self.active == Some(id) {
            self.active = None;
            debug!("reveal {} expired", id.0);
            true
        } else {
            false
        }
    }

    /// Ends the active reveal early; its cells fade on the next frame.
    pub fn cancel(&mut self, scheduler: &mut Scheduler<Task>) {
        scheduler.cancel_slot(&mut self.expiry);
        self.active = None;
    }

    /// Forgets the active reveal without touching the scheduler, for when the
    /// whole scheduler is being torn down. Ids keep counting up.
    pub fn reset(&mut self) {
        self.expiry = None;
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Alphabet, GridDims};
    use rand::{rngs::StdRng, SeedableRng};

    fn setup(snippet: &str) -> (RevealEngine, GridStore, Scheduler<Task>, StdRng) {
        let mut rng = StdRng::seed_from_u64(42);
        let mut grid = GridStore::new();
        grid.resize(GridDims::new(10, 5), &Alphabet::new("01"), &mut rng);
        let engine = RevealEngine::new(&[snippet.to_string()], Duration::from_millis(1500));
        (engine, grid, Scheduler::new(), rng)
    }

    fn revealed_row(grid: &GridStore, row: usize) -> String {
        (0..10)
            .map(|col| match grid.target(row * 10 + col) {
                Some(CellTarget::Revealing { ch, .. }) => ch,
                _ => '.',
            })
            .collect()
    }

    #[test]
    fn centers_snippet_on_pointer_cell() {
        let (mut engine, mut grid, mut sched, mut rng) = setup("focus");
        let t0 = Instant::now();
        let placement = engine
            .trigger(
                Some((70.0, 35.0)),
                14.0,
                &mut grid,
                &mut sched,
                t0,
                &mut rng,
            )
            .unwrap();

        assert_eq!(placement.row, 2);
        assert_eq!(placement.start_col, 3);
        assert_eq!(placement.placed, 5);
        assert_eq!(revealed_row(&grid, 2), "...focus..");
        assert_eq!(engine.active(), Some(placement.id));
        for col in 3..8 {
            assert_eq!(
                grid.target(2 * 10 + col),
                Some(CellTarget::Revealing {
                    ch: "focus".chars().nth(col - 3).unwrap(),
                    id: placement.id
                })
            );
        }
    }

    #[test]
    fn truncates_at_right_edge_without_wrapping() {
        let (mut engine, mut grid, mut sched, mut rng) = setup("perceive");
        let t0 = Instant::now();
        let placement = engine
            .trigger(
                Some((9.0 * 14.0, 0.0)),
                14.0,
                &mut grid,
                &mut sched,
                t0,
                &mut rng,
            )
            .unwrap();

        assert_eq!(placement.start_col, 5);
        assert_eq!(placement.placed, 5);
        assert_eq!(revealed_row(&grid, 0), ".....perce");
        assert_eq!(revealed_row(&grid, 1), "..........");
    }

    #[test]
    fn start_column_clamps_at_zero() {
        let (mut engine, mut grid, mut sched, mut rng) = setup("() => {}");
        let placement = engine
            .trigger(
                Some((1.0, 1.0)),
                14.0,
                &mut grid,
                &mut sched,
                Instant::now(),
                &mut rng,
            )
            .unwrap();
        assert_eq!(placement.start_col, 0);
        assert_eq!(revealed_row(&grid, 0), "() => {}..");
    }

    #[test]
    fn outside_or_missing_position_changes_nothing() {
        let (mut engine, mut grid, mut sched, mut rng) = setup("focus");
        let t0 = Instant::now();
        for pos in [None, Some((70.0, -1.0)), Some((-3.0, 5.0)), Some((500.0, 5.0))] {
            let placed = engine.trigger(pos, 14.0, &mut grid, &mut sched, t0, &mut rng);
            assert!(placed.is_none());
        }
        assert!(grid.targets().iter().all(|t| *t == CellTarget::Noise));
        assert!(engine.active().is_none());
        assert!(sched.is_empty());
    }

    #[test]
    fn stale_expiry_does_not_end_superseding_reveal() {
        let (mut engine, mut grid, mut sched, mut rng) = setup("focus");
        let t0 = Instant::now();
        let first = engine
            .trigger(
                Some((70.0, 35.0)),
                14.0,
                &mut grid,
                &mut sched,
                t0,
                &mut rng,
            )
            .unwrap();
        let first_expiry = engine.expiry.unwrap();
        let second = engine
            .trigger(
                Some((14.0, 14.0)),
                14.0,
                &mut grid,
                &mut sched,
                t0,
                &mut rng,
            )
            .unwrap();
        assert!(second.id > first.id);
        assert_eq!(sched.len(), 1);

        // A fired-but-stale expiry for the first reveal is ignored.
        assert!(!engine.expire(first_expiry, first.id));
        assert_eq!(engine.active(), Some(second.id));

        let (task, kind) = sched.pop_due(t0 + Duration::from_millis(1500)).unwrap();
        assert_eq!(kind, Task::RevealExpiry(second.id));
        assert!(engine.expire(task, second.id));
        assert_eq!(engine.active(), None);
        assert!(!engine.expire(task, second.id));
    }

    #[test]
    fn overlapping_trigger_claims_shared_cells() {
        let (mut engine, mut grid, mut sched, mut rng) = setup("focus");
        let t0 = Instant::now();
        let first = engine
            .trigger(
                Some((70.0, 35.0)),
                14.0,
                &mut grid,
                &mut sched,
                t0,
                &mut rng,
            )
            .unwrap();
        let second = engine
            .trigger(
                Some((98.0, 35.0)),
                14.0,
                &mut grid,
                &mut sched,
                t0,
                &mut rng,
            )
            .unwrap();

        assert_eq!(revealed_row(&grid, 2), "...fofocus");
        for col in 3..5 {
            assert!(matches!(
                grid.target(20 + col),
                Some(CellTarget::Revealing { id, .. }) if id == first.id
            ));
        }
        for col in 5..10 {
            assert!(matches!(
                grid.target(20 + col),
                Some(CellTarget::Revealing { id, .. }) if id == second.id
            ));
        }
        assert_eq!(engine.active(), Some(second.id));
    }

    #[test]
    fn cancel_drops_active_and_expiry() {
        let (mut engine, mut grid, mut sched, mut rng) = setup("focus");
        engine.trigger(
            Some((70.0, 35.0)),
            14.0,
            &mut grid,
            &mut sched,
            Instant::now(),
            &mut rng,
        );
        engine.cancel(&mut sched);
        assert!(engine.active().is_none());
        assert!(!engine.expiry_pending());
        assert!(sched.is_empty());
    }
}
