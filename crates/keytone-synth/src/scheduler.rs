//! Cancellable repeating tasks driven by the audio context clock.
//!
//! Looping tracks schedule one bar of notes ahead, then ask the
//! [`Scheduler`] to call them again every bar. Each registration returns its
//! own [`CancelToken`], so stopping one track can never cancel another
//! track's loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use keytone_core::AudioContext;

use crate::error::Result;

/// Work run on every period of a repeating task.
pub type Task = Box<dyn FnMut(&mut AudioContext) -> Result<()> + Send>;

/// Cancels exactly one repeating task.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prevent the task from ever running again. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

struct Entry {
    label: &'static str,
    due: f64,
    period: f64,
    token: CancelToken,
    task: Task,
}

/// Repeating tasks keyed to context time.
///
/// Rescheduling is relative to the poll that ran the task (`now + period`),
/// so a late poll delays the loop instead of firing a burst of catch-up runs.
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
}

impl core::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.entries.len())
            .finish()
    }
}

impl Scheduler {
    /// An empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` at `first_due` and every `period` seconds after that.
    pub fn repeat(&mut self, label: &'static str, first_due: f64, period: f64, task: Task) -> CancelToken {
        let token = CancelToken::new();
        self.entries.push(Entry {
            label,
            due: first_due,
            period,
            token: token.clone(),
            task,
        });
        tracing::debug!(task = label, first_due, period, "repeating task scheduled");
        token
    }

    /// Run every task whose due time has passed. Returns how many ran.
    ///
    /// Cancelled tasks are dropped without running. A task that fails is
    /// logged and dropped.
    pub fn poll(&mut self, ctx: &mut AudioContext) -> usize {
        let now = ctx.current_time();
        let mut ran = 0;

        self.entries.retain_mut(|entry| {
            if entry.token.is_cancelled() {
                tracing::debug!(task = entry.label, "cancelled task dropped");
                return false;
            }
            if entry.due > now {
                return true;
            }
            match (entry.task)(ctx) {
                Ok(()) => {
                    ran += 1;
                    entry.due = now + entry.period;
                    true
                }
                Err(err) => {
                    tracing::warn!(task = entry.label, %err, "repeating task failed, dropping it");
                    entry.token.cancel();
                    false
                }
            }
        });

        ran
    }

    /// Tasks not yet dropped, cancelled ones included until the next poll.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tasks that will still run.
    pub fn active(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.token.is_cancelled())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SynthError;
    use keytone_core::{ContextOptions, GraphError};
    use std::sync::atomic::AtomicUsize;

    fn advance(ctx: &mut AudioContext, seconds: f32) {
        let mut buf = vec![0.0f32; (seconds * ctx.sample_rate()) as usize];
        ctx.render(&mut buf);
    }

    fn context() -> AudioContext {
        let mut ctx = AudioContext::new(ContextOptions {
            sample_rate: 1000.0,
            max_nodes: 64,
        });
        ctx.resume();
        ctx
    }

    fn counter() -> (Arc<AtomicUsize>, Task) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let task: Task = Box::new(move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (count, task)
    }

    #[test]
    fn runs_when_due_and_repeats() {
        let mut ctx = context();
        let mut scheduler = Scheduler::new();
        let (count, task) = counter();
        scheduler.repeat("count", 1.0, 1.0, task);

        assert_eq!(scheduler.poll(&mut ctx), 0);
        advance(&mut ctx, 1.0);
        assert_eq!(scheduler.poll(&mut ctx), 1);
        assert_eq!(scheduler.poll(&mut ctx), 0);
        advance(&mut ctx, 1.0);
        scheduler.poll(&mut ctx);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn late_poll_does_not_burst() {
        let mut ctx = context();
        let mut scheduler = Scheduler::new();
        let (count, task) = counter();
        scheduler.repeat("count", 0.5, 0.5, task);

        advance(&mut ctx, 3.0);
        assert_eq!(scheduler.poll(&mut ctx), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let mut ctx = context();
        let mut scheduler = Scheduler::new();
        let (count, task) = counter();
        let token = scheduler.repeat("count", 0.0, 1.0, task);
        token.cancel();
        token.cancel();
        assert_eq!(scheduler.active(), 0);

        advance(&mut ctx, 2.0);
        assert_eq!(scheduler.poll(&mut ctx), 0);
        assert!(scheduler.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn tokens_are_independent() {
        let mut ctx = context();
        let mut scheduler = Scheduler::new();
        let (first, a) = counter();
        let (second, b) = counter();
        let token_a = scheduler.repeat("a", 0.0, 1.0, a);
        let _token_b = scheduler.repeat("b", 0.0, 1.0, b);

        token_a.cancel();
        scheduler.poll(&mut ctx);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn failing_task_dropped() {
        let mut ctx = context();
        let mut scheduler = Scheduler::new();
        let token = scheduler.repeat(
            "fails",
            0.0,
            1.0,
            Box::new(|_| Err(SynthError::Graph(GraphError::NodeLimit(64)))),
        );

        assert_eq!(scheduler.poll(&mut ctx), 0);
        assert!(scheduler.is_empty());
        assert!(token.is_cancelled());
    }
}
