//! Background-thread command/status protocol.
//!
//! A [`Worker`] owns the one "live" crossword and a [`Solver`] over it. A
//! front-end — entirely out of scope here — drives it by sending [`Command`]
//! values through a [`WorkerHandle`] and polling the handle for the latest
//! [`StatusSnapshot`]. The core never calls back into the front-end; it only
//! ever publishes data.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::crossword::Crossword;
use crate::error::CoreError;
use crate::solver::{SolveOutcome, Solver, Statistics};
use crate::types::Coordinate;

/// How long the worker's main loop waits on an empty command queue before
/// falling through to [`IDLE_SLEEP`].
const COMMAND_TIMEOUT: Duration = Duration::from_millis(100);

/// How long the worker sleeps after an empty `recv_timeout`, so the thread
/// stays promptly interruptible without busy-waiting.
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// One entry on the command queue. `Reset`'s crossword replaces the worker's
/// live crossword when present, or re-resets the current one. `Stop` cancels
/// an in-progress solve and is a no-op otherwise; `Shutdown` is the only
/// command that terminates the worker thread.
pub enum Command {
    SetLetter(Coordinate, char),
    SetMask(Coordinate, bool),
    ResetCell(Coordinate),
    Reset(Option<Crossword>),
    UpdateOptions,
    Solve,
    Stop,
    UpdateStatus,
    Shutdown,
}

/// Read-only rendering of a single cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellSnapshot {
    pub coords: Coordinate,
    pub defined: bool,
    pub mask: bool,
    pub options: HashMap<char, u32>,
    pub entropy: f64,
}

/// An independent copy of the worker's live crossword, safe to render on
/// another thread.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSnapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<CellSnapshot>,
    pub statistics: Statistics,
    pub outcome: Option<SolveOutcome>,
}

impl StatusSnapshot {
    fn capture(solver: &Solver, outcome: Option<SolveOutcome>) -> Self {
        let grid = solver.current().grid();
        let cells = grid
            .iter()
            .map(|cell| CellSnapshot {
                coords: cell.coords(),
                defined: cell.is_defined(),
                mask: cell.mask(),
                options: cell.all_letters().map(|l| (l, cell.weight_of(l))).collect(),
                entropy: cell.shannon_entropy(),
            })
            .collect();
        StatusSnapshot {
            width: grid.width(),
            height: grid.height(),
            cells,
            statistics: solver.statistics(),
            outcome,
        }
    }
}

/// The front-end-facing half of the worker: a command sender and a status
/// receiver, plus the join handle for clean shutdown.
pub struct WorkerHandle {
    commands: Sender<Command>,
    status: Receiver<StatusSnapshot>,
    join: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Push a command onto the queue; commands are applied in FIFO order.
    ///
    /// # Errors
    /// Returns [`CoreError::WorkerDisconnected`] if the worker thread has
    /// already exited.
    pub fn send(&self, command: Command) -> Result<(), CoreError> {
        self.commands
            .send(command)
            .map_err(|_| CoreError::WorkerDisconnected)
    }

    /// Drain the status channel and return the newest snapshot, if any was
    /// published since the last call. Never blocks.
    #[must_use]
    pub fn try_recv_latest(&self) -> Option<StatusSnapshot> {
        let mut latest = None;
        while let Ok(snapshot) = self.status.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }

    /// Block until at least one snapshot is available, then return the
    /// newest. For front-ends willing to wait rather than poll.
    #[must_use]
    pub fn recv_latest(&self) -> Option<StatusSnapshot> {
        let first = self.status.recv().ok()?;
        Some(self.try_recv_latest().unwrap_or(first))
    }

    /// Send [`Command::Shutdown`] and join the worker thread. Unlike
    /// [`Command::Stop`], this terminates the thread even when idle.
    pub fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = self.commands.send(Command::Shutdown);
            let _ = join.join();
        }
    }
}

/// The background worker itself: a [`Solver`] plus the two queue endpoints it
/// reads and writes from its own thread.
struct Worker {
    solver: Solver,
    commands: Receiver<Command>,
    status: SyncSender<StatusSnapshot>,
}

impl Worker {
    /// Spawn the worker thread and return the handle that talks to it. The
    /// status queue is bounded to one slot: every publish drains it first, so
    /// it can never hold more than the newest snapshot.
    pub fn spawn(crossword: Crossword, rng_seed: u64) -> WorkerHandle {
        let (command_tx, command_rx) = mpsc::channel();
        let (status_tx, status_rx) = mpsc::sync_channel(1);

        let mut worker = Worker {
            solver: Solver::new(crossword, rng_seed),
            commands: command_rx,
            status: status_tx,
        };
        worker.publish(None);

        let join = thread::spawn(move || worker.run());

        WorkerHandle {
            commands: command_tx,
            status: status_rx,
            join: Some(join),
        }
    }

    /// Drain-then-push: guarantees the channel holds at most the newest
    /// snapshot regardless of how many publishes have run ahead of a slow
    /// reader. Latest always wins.
    fn publish(&self, outcome: Option<SolveOutcome>) {
        while self.status.try_recv().is_ok() {}
        let _ = self.status.try_send(StatusSnapshot::capture(&self.solver, outcome));
    }

    fn run(&mut self) {
        loop {
            match self.commands.recv_timeout(COMMAND_TIMEOUT) {
                Ok(Command::Shutdown) => return,
                Ok(command) => self.apply(command),
                Err(RecvTimeoutError::Timeout) => thread::sleep(IDLE_SLEEP),
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::SetLetter(coords, letter) => {
                self.solver.current_mut().set_letter(coords, letter);
                self.publish(None);
            }
            Command::SetMask(coords, mask) => {
                self.solver.current_mut().set_mask(coords, mask);
                self.publish(None);
            }
            Command::ResetCell(coords) => {
                self.solver.current_mut().reset_cell(coords);
                self.publish(None);
            }
            Command::Reset(crossword) => {
                let root = match crossword {
                    Some(crossword) => crossword,
                    None => {
                        let mut root = self.solver.current().clone();
                        root.reset();
                        root
                    }
                };
                self.solver.reset(root);
                self.publish(None);
            }
            Command::UpdateOptions => {
                self.solver.current_mut().update_options();
                self.publish(None);
            }
            Command::Solve => {
                let (outcome, pending) = self.solve_cooperatively();
                self.publish(outcome);
                if let Some(command) = pending {
                    self.apply(command);
                }
            }
            Command::UpdateStatus => self.publish(None),
            Command::Stop | Command::Shutdown => {}
        }
    }

    /// Runs [`Solver::iterate`] in a loop, checking for a pending command
    /// between every iteration via a non-blocking poll. Any command — not
    /// just `Stop` — aborts the solve loop immediately: `Stop` cancels it
    /// outright, while any other command is handed back to the caller to be
    /// applied once the (now stale) solve has unwound, so e.g. a `Reset`
    /// sent mid-solve is never eaten and always takes effect within one
    /// iteration.
    ///
    /// Returns the solve's own outcome (`None` if the loop was cancelled
    /// rather than run to completion) alongside the interrupting command, if
    /// any, for the caller to apply next.
    fn solve_cooperatively(&mut self) -> (Option<SolveOutcome>, Option<Command>) {
        loop {
            let cur = self.solver.current();
            if cur.grid().is_fully_defined() && cur.is_fully_valid() {
                return (Some(SolveOutcome::Solved), None);
            }
            if self.solver.depth() == 0 && cur.grid().is_deadend() {
                return (Some(SolveOutcome::Exhausted), None);
            }
            match self.commands.try_recv() {
                Ok(Command::Stop) => return (None, None),
                Ok(command) => return (None, Some(command)),
                Err(TryRecvError::Empty) => self.solver.iterate(),
                Err(TryRecvError::Disconnected) => return (None, None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::types::Alphabet;
    use std::sync::Arc;
    use std::time::Duration;

    fn crossword_with(words: &[&str], width: usize, height: usize) -> Crossword {
        let dictionary = Arc::new(Dictionary::new(words.to_vec(), Alphabet::english(), None));
        Crossword::new(width, height, dictionary).unwrap()
    }

    fn wait_for<F: Fn(&StatusSnapshot) -> bool>(handle: &WorkerHandle, predicate: F) -> StatusSnapshot {
        for _ in 0..200 {
            if let Some(snapshot) = handle.try_recv_latest() {
                if predicate(&snapshot) {
                    return snapshot;
                }
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("worker never reached the expected state");
    }

    #[test]
    fn spawn_publishes_an_initial_snapshot() {
        let handle = Worker::spawn(crossword_with(&["cat", "car", "cot"], 3, 1), 1);
        let snapshot = wait_for(&handle, |_| true);
        assert_eq!(snapshot.width, 3);
        assert_eq!(snapshot.height, 1);
        assert_eq!(snapshot.cells.len(), 3);
        handle.shutdown();
    }

    #[test]
    fn set_letter_then_solve_converges_to_a_consistent_word() {
        let handle = Worker::spawn(crossword_with(&["cat", "car", "cot"], 3, 1), 5);
        handle.send(Command::SetLetter(Coordinate::new(0, 0), 'c')).unwrap();
        handle.send(Command::SetMask(Coordinate::new(0, 0), true)).unwrap();
        handle.send(Command::Solve).unwrap();

        let snapshot = wait_for(&handle, |s| s.outcome.is_some());
        assert_eq!(snapshot.outcome, Some(SolveOutcome::Solved));
        assert!(snapshot.cells.iter().all(|c| c.defined));
        handle.shutdown();
    }

    #[test]
    fn reset_clears_a_previous_solve() {
        let handle = Worker::spawn(crossword_with(&["cat", "car", "cot"], 3, 1), 9);
        handle.send(Command::Solve).unwrap();
        wait_for(&handle, |s| s.outcome.is_some());

        handle.send(Command::Reset(None)).unwrap();
        let snapshot = wait_for(&handle, |s| s.outcome.is_none());
        assert!(snapshot.cells.iter().all(|c| !c.defined));
        assert_eq!(snapshot.statistics, Statistics::default(), "reset must also clear the search tree and counters");
        handle.shutdown();
    }

    #[test]
    fn drain_then_push_never_leaves_more_than_one_snapshot_queued() {
        let handle = Worker::spawn(crossword_with(&["cat", "car", "cot"], 3, 1), 2);
        wait_for(&handle, |_| true);
        handle.send(Command::UpdateStatus).unwrap();
        handle.send(Command::UpdateStatus).unwrap();
        handle.send(Command::UpdateStatus).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(handle.status.try_recv().is_ok(), "expected exactly one queued snapshot");
        assert!(handle.status.try_recv().is_err(), "channel must never hold more than one snapshot");
        handle.shutdown();
    }

    fn bare_worker(words: &[&str], width: usize, height: usize, seed: u64) -> (Worker, Sender<Command>, Receiver<StatusSnapshot>) {
        let crossword = crossword_with(words, width, height);
        let (command_tx, command_rx) = mpsc::channel();
        let (status_tx, status_rx) = mpsc::sync_channel(1);
        let worker = Worker {
            solver: Solver::new(crossword, seed),
            commands: command_rx,
            status: status_tx,
        };
        (worker, command_tx, status_rx)
    }

    #[test]
    fn idle_stop_is_a_no_op_and_does_not_kill_the_worker() {
        let handle = Worker::spawn(crossword_with(&["cat", "car", "cot"], 3, 1), 1);
        wait_for(&handle, |_| true);

        handle.send(Command::Stop).unwrap();
        thread::sleep(Duration::from_millis(20));

        // If the idle `Stop` had terminated the thread, the command receiver
        // would be gone and this send would fail.
        handle.send(Command::UpdateStatus).unwrap();
        wait_for(&handle, |_| true);
        handle.shutdown();
    }

    #[test]
    fn stop_queued_before_a_solve_cancels_without_reporting_exhausted() {
        let (mut worker, command_tx, _status_rx) = bare_worker(&["cat", "car", "cot"], 3, 1, 1);
        command_tx.send(Command::Stop).unwrap();

        let (outcome, pending) = worker.solve_cooperatively();
        assert_eq!(outcome, None, "a cancelled solve must not be reported as Exhausted");
        assert!(pending.is_none());
        assert_eq!(worker.solver.statistics().iterations, 0, "cancellation must pre-empt before any iteration runs");
    }

    #[test]
    fn non_stop_command_queued_before_a_solve_is_returned_for_re_application() {
        let (mut worker, command_tx, _status_rx) = bare_worker(&["cat", "car", "cot"], 3, 1, 1);
        command_tx.send(Command::Reset(None)).unwrap();

        let (outcome, pending) = worker.solve_cooperatively();
        assert_eq!(outcome, None);
        assert!(
            matches!(pending, Some(Command::Reset(None))),
            "a non-Stop command seen mid-solve must be handed back, not swallowed"
        );
    }

    #[test]
    fn solving_re_applies_a_command_that_interrupted_it() {
        let (mut worker, command_tx, _status_rx) = bare_worker(&["cat", "car", "cot"], 3, 1, 1);
        command_tx.send(Command::Reset(None)).unwrap();

        worker.apply(Command::Solve);

        assert_eq!(
            worker.solver.statistics(),
            Statistics::default(),
            "the Reset queued mid-solve must actually run, not just be observed and discarded"
        );
        assert!(worker.solver.current().grid().iter().all(|c| !c.is_defined()));
    }

    /// A status snapshot should be suitable for read-only rendering by a
    /// front-end in another process too — round-tripping it through JSON is
    /// the cheapest proxy for that without a real front-end in this crate.
    #[cfg(feature = "serde")]
    #[test]
    fn status_snapshot_round_trips_through_json() {
        let dictionary = Arc::new(Dictionary::new(vec!["cat", "car"], Alphabet::english(), None));
        let crossword = Crossword::new(3, 1, dictionary).unwrap();
        let solver = Solver::new(crossword, 3);
        let snapshot = StatusSnapshot::capture(&solver, None);

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: StatusSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, restored);
    }
}
