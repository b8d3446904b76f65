// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-thread dispatch (spec.md §4.1) — the single cooperative "main
//! loop" substrate every front-end posts work onto.
//!
//! `Dispatcher::submit` is callable from any thread. It pushes a boxed
//! closure onto an internal queue behind a `parking_lot::Mutex` and sends a
//! non-blocking wake; `Dispatcher::run_once`/`run_forever` (called only from
//! the loop thread) drains the queue in submission order. This gives the
//! per-producer FIFO ordering spec.md §5 demands without ever holding a
//! lock across an `.await` — the mutex only ever guards a `Vec` push/drain,
//! never the submitted future itself.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep as tokio_sleep;

type BoxedJob = Pin<Box<dyn Future<Output = ()> + Send>>;

struct Queue {
    jobs: VecDeque<BoxedJob>,
}

/// Handle for posting work onto the main loop from any thread (spec.md
/// §4.1 "Contract"). Cheap to clone — all clones share the same queue.
#[derive(Clone)]
pub struct Dispatcher {
    queue: Arc<Mutex<Queue>>,
    wake_tx: mpsc::Sender<()>,
}

/// The loop-side half: only the thread running the main loop should hold
/// one of these.
pub struct LoopHandle {
    queue: Arc<Mutex<Queue>>,
    wake_rx: mpsc::Receiver<()>,
}

impl Dispatcher {
    pub fn new() -> (Self, LoopHandle) {
        let queue = Arc::new(Mutex::new(Queue {
            jobs: VecDeque::new(),
        }));
        let (wake_tx, wake_rx) = mpsc::channel(1);
        (
            Self {
                queue: Arc::clone(&queue),
                wake_tx,
            },
            LoopHandle { queue, wake_rx },
        )
    }

    /// Schedule `job` to run on the next loop tick. Submissions from a
    /// single producer (thread or task) are observed on the loop in
    /// submission order (spec.md §5 "Ordering guarantees").
    ///
    /// Returns a completion handle the caller may `.await`, or drop if it
    /// doesn't need the result (spec.md §4.1: "returns a future the
    /// producer may optionally await").
    pub fn submit<F, T>(&self, job: F) -> oneshot::Receiver<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let boxed: BoxedJob = Box::pin(async move {
            let result = job.await;
            let _ = tx.send(result);
        });
        self.queue.lock().jobs.push_back(boxed);
        // Non-blocking: if the channel is full the loop is already awake
        // and will see this job on its current drain pass.
        let _ = self.wake_tx.try_send(());
        rx
    }

    /// Fire-and-forget submission — no completion handle at all.
    pub fn submit_detached<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.queue.lock().jobs.push_back(Box::pin(job));
        let _ = self.wake_tx.try_send(());
    }
}

impl LoopHandle {
    /// Drain every job currently queued, running each to completion in
    /// submission order. Composes with `sleep`/`after`/`every` without a
    /// thread hop since this runs on the loop's own task.
    pub async fn drain(&mut self) {
        loop {
            let next = self.queue.lock().jobs.pop_front();
            match next {
                Some(job) => job.await,
                None => break,
            }
        }
    }

    /// Block until either a wake signal arrives or `timeout` elapses,
    /// whichever first — the main loop's tick boundary.
    pub async fn wait_for_wake(&mut self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.wake_rx.recv()).await;
    }
}

/// Sleep without a thread hop (spec.md §4.1: "`sleep(Δ)`... compose
/// without thread hops").
pub async fn sleep(duration: Duration) {
    tokio_sleep(duration).await;
}

/// Run `job` once, after `delay` (spec.md §4.1 `after(Δ, fn)`).
pub fn after<F>(dispatcher: &Dispatcher, delay: Duration, job: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let dispatcher = dispatcher.clone();
    tokio::spawn(async move {
        tokio_sleep(delay).await;
        dispatcher.submit_detached(job);
    });
}

/// Run `job_factory()` every `period`, until `stop` is cancelled (spec.md
/// §4.1 `every(Δ, fn)`, §5 "Cancellation": "scheduled periodic tasks check
/// a stop-flag before re-arming").
pub fn every<F, Fut>(dispatcher: &Dispatcher, period: Duration, stop: Arc<tokio::sync::Notify>, mut job_factory: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let dispatcher = dispatcher.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tokio_sleep(period) => {
                    dispatcher.submit_detached(job_factory());
                }
                _ = stop.notified() => break,
            }
        }
    });
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
