//! Cancellable repeating tasks on a virtual clock.
//!
//! The scheduler never sleeps. Callers advance it by the time that has
//! passed and it runs every task that fell due, in due order. Tasks due at
//! the same instant run in the order they were added.

use std::cell::Cell;
use std::rc::Rc;

/// What a task wants after running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run again after another interval.
    Continue,
    /// Remove the task.
    Done,
}

/// Handle that stops a scheduled task. Cancelling takes effect before the
/// task's next run; a task already running finishes its current step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

type TaskFn<C> = Box<dyn FnMut(&mut C) -> Flow>;

struct Task<C> {
    seq: u64,
    interval_ms: u64,
    due_ms: u64,
    token: CancelToken,
    run: TaskFn<C>,
}

/// Task queue over a context `C` that every task receives mutably.
pub struct Scheduler<C> {
    now_ms: u64,
    next_seq: u64,
    tasks: Vec<Task<C>>,
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            tasks: Vec::new(),
        }
    }

    /// Virtual time elapsed since creation.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of live tasks.
    pub fn len(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` every `interval_ms`, first after one interval, until it
    /// returns [`Flow::Done`] or the token is cancelled. A zero interval is
    /// treated as one millisecond.
    pub fn every<F>(&mut self, interval_ms: u64, f: F) -> CancelToken
    where
        F: FnMut(&mut C) -> Flow + 'static,
    {
        let interval_ms = interval_ms.max(1);
        self.push(interval_ms, self.now_ms + interval_ms, Box::new(f))
    }

    /// Run `f` once after `delay_ms`.
    pub fn after<F>(&mut self, delay_ms: u64, f: F) -> CancelToken
    where
        F: FnOnce(&mut C) + 'static,
    {
        let mut f = Some(f);
        self.push(
            1,
            self.now_ms + delay_ms,
            Box::new(move |ctx| {
                if let Some(f) = f.take() {
                    f(ctx);
                }
                Flow::Done
            }),
        )
    }

    fn push(&mut self, interval_ms: u64, due_ms: u64, run: TaskFn<C>) -> CancelToken {
        let token = CancelToken::new();
        self.tasks.push(Task {
            seq: self.next_seq,
            interval_ms,
            due_ms,
            token: token.clone(),
            run,
        });
        self.next_seq += 1;
        token
    }

    /// Cancel every task.
    pub fn cancel_all(&mut self) {
        for task in &self.tasks {
            task.token.cancel();
        }
        self.tasks.clear();
    }

    /// Advance the clock by `dt_ms`, running each task as it falls due.
    /// Returns the number of task runs.
    pub fn advance(&mut self, ctx: &mut C, dt_ms: u64) -> usize {
        let target = self.now_ms.saturating_add(dt_ms);
        let mut runs = 0;
        loop {
            self.tasks.retain(|t| !t.token.is_cancelled());
            let next = self
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due_ms <= target)
                .min_by_key(|(_, t)| (t.due_ms, t.seq))
                .map(|(i, _)| i);
            let Some(i) = next else { break };

            let task = &mut self.tasks[i];
            self.now_ms = self.now_ms.max(task.due_ms);
            let flow = (task.run)(ctx);
            runs += 1;
            if flow == Flow::Done {
                task.token.cancel();
            } else {
                task.due_ms += task.interval_ms;
            }
        }
        self.now_ms = target;
        runs
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}
