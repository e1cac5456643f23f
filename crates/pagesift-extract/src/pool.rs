// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded worker pool for per-page jobs.
//
// Each job runs on tokio's blocking pool behind a semaphore permit. Results
// land in a slot per index, so output order never depends on completion
// order. A job that panics is replaced by the caller's degraded value.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Run `job(0..count)` with at most `workers` jobs in flight and return the
/// results in index order.
pub async fn run_indexed<T, F, D>(count: usize, workers: usize, job: F, degraded: D) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize) -> T + Send + Sync + 'static,
    D: Fn(usize, String) -> T,
{
    let job = Arc::new(job);
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for index in 0..count {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(err) => {
                warn!(error = %err, "Worker pool closed early");
                break;
            }
        };
        let job = Arc::clone(&job);
        tasks.spawn_blocking(move || {
            let _permit = permit;
            let outcome = catch_unwind(AssertUnwindSafe(|| job(index)));
            (index, outcome.map_err(panic_message))
        });
    }

    let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(value))) => slots[index] = Some(value),
            Ok((index, Err(message))) => {
                warn!(index, error = %message, "Worker job panicked");
                slots[index] = Some(degraded(index, message));
            }
            Err(err) => warn!(error = %err, "Worker task did not complete"),
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| degraded(index, "worker task did not complete".to_owned()))
        })
        .collect()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {message}")
    } else {
        "panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn results_follow_index_order() {
        // Early indices sleep longest, so they finish last.
        let out = run_indexed(
            6,
            3,
            |i| {
                std::thread::sleep(Duration::from_millis((6 - i as u64) * 5));
                i * 10
            },
            |_, _| usize::MAX,
        )
        .await;
        assert_eq!(out, vec![0, 10, 20, 30, 40, 50]);
    }

    #[tokio::test]
    async fn never_exceeds_worker_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (a, p) = (Arc::clone(&active), Arc::clone(&peak));
        run_indexed(
            8,
            2,
            move |_| {
                let now = a.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(10));
                a.fetch_sub(1, Ordering::SeqCst);
            },
            |_, _| (),
        )
        .await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn panicking_job_is_degraded() {
        let out = run_indexed(
            3,
            2,
            |i| {
                if i == 1 {
                    panic!("page exploded");
                }
                format!("ok {i}")
            },
            |i, msg| format!("degraded {i}: {msg}"),
        )
        .await;
        assert_eq!(out[0], "ok 0");
        assert_eq!(out[1], "degraded 1: panic: page exploded");
        assert_eq!(out[2], "ok 2");
    }

    #[tokio::test]
    async fn zero_jobs_is_empty() {
        let out: Vec<u8> = run_indexed(0, 4, |_| 1u8, |_, _| 0u8).await;
        assert!(out.is_empty());
    }
}
