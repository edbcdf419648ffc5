/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! In-flight exchange accounting for graceful route stop.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Counts exchanges currently running on one route.
pub(crate) struct InflightTracker {
    accepting: AtomicBool,
    in_flight: AtomicUsize,
    drained: Notify,
}

impl InflightTracker {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            accepting: AtomicBool::new(true),
            in_flight: AtomicUsize::new(0),
            drained: Notify::new(),
        })
    }

    /// Registers a new exchange, or returns `None` once the tracker is closed.
    pub(crate) fn try_enter(self: &Arc<Self>) -> Option<InflightGuard> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InflightGuard {
            tracker: self.clone(),
        };
        if self.accepting.load(Ordering::SeqCst) {
            Some(guard)
        } else {
            None
        }
    }

    /// Stops admitting new exchanges. Running ones are unaffected.
    pub(crate) fn close(&self) {
        self.accepting.store(false, Ordering::SeqCst);
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Waits until no exchange is in flight. Returns `false` if `timeout` elapsed first.
    pub(crate) async fn drain(&self, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.drained.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.in_flight() == 0 {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }
}

/// Marks one exchange as in flight until dropped.
pub(crate) struct InflightGuard {
    tracker: Arc<InflightTracker>,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        if self.tracker.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.tracker.drained.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::InflightTracker;
    use std::time::Duration;

    #[tokio::test]
    async fn closed_tracker_rejects_new_exchanges() {
        let tracker = InflightTracker::new();
        let running = tracker.try_enter().expect("open tracker admits");

        tracker.close();

        assert!(tracker.try_enter().is_none());
        assert_eq!(tracker.in_flight(), 1);
        drop(running);
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test]
    async fn drain_waits_for_running_exchanges() {
        let tracker = InflightTracker::new();
        let guard = tracker.try_enter().expect("admitted");
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            drop(guard);
        });

        tracker.close();

        assert!(tracker.drain(Duration::from_secs(2)).await);
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test]
    async fn drain_times_out_when_exchange_hangs() {
        let tracker = InflightTracker::new();
        let _guard = tracker.try_enter().expect("admitted");

        tracker.close();

        assert!(!tracker.drain(Duration::from_millis(20)).await);
    }
}
