// This file is part of FieldFM.
// Copyright (C) 2024-2026 FieldFM contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[cfg(feature = "python")]
use log::*;
#[cfg(feature = "python")]
use pyo3::{intern, prelude::*, types::PyDict};

const REPORT_INTERVAL: Duration = Duration::from_millis(200);

/// Receives the running count of processed rows.
pub type ProgressCallback = Box<dyn Fn(usize) + Send + Sync>;

/// Throttled progress reporting for training passes.
///
/// Rows are counted on every tick. The callback fires when a tick lands past
/// the next reporting deadline (at most once per [REPORT_INTERVAL]), and once
/// more on [ProgressHandle::flush].
pub struct ProgressHandle {
    callback: Option<ProgressCallback>,
    start: Instant,
    count: AtomicUsize,
    /// Microseconds after `start` when the next report is allowed.
    next_report: AtomicU64,
}

impl ProgressHandle {
    /// A handle that counts but reports nowhere.
    pub fn null() -> Self {
        Self::new(None)
    }

    pub fn with_callback<F>(callback: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        Self::new(Some(Box::new(callback)))
    }

    pub fn new(callback: Option<ProgressCallback>) -> Self {
        ProgressHandle {
            callback,
            start: Instant::now(),
            count: AtomicUsize::new(0),
            next_report: AtomicU64::new(interval_micros()),
        }
    }

    /// Wrap a Python progress bar (anything with `update(completed=n)`).
    #[cfg(feature = "python")]
    pub fn from_input(maybe_pb: Option<Bound<'_, PyAny>>) -> Self {
        let pb = match maybe_pb {
            Some(pb) if !pb.is_none() => pb.unbind(),
            _ => return Self::null(),
        };
        Self::with_callback(move |count| {
            let res = Python::with_gil(|py| {
                py.check_signals()?;
                let kwargs = PyDict::new(py);
                kwargs.set_item(intern!(py, "completed"), count)?;
                pb.call_method(py, intern!(py, "update"), (), Some(&kwargs))?;
                Ok::<(), PyErr>(())
            });
            if let Err(e) = res {
                warn!("progress update failed: {}", e);
            }
        })
    }

    /// Number of rows counted so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn tick(&self) {
        self.advance(1);
    }

    /// Count `n` more rows, reporting if the deadline has passed.
    pub fn advance(&self, n: usize) {
        let count = self.count.fetch_add(n, Ordering::Relaxed) + n;
        if self.callback.is_none() {
            return;
        }

        let due = self.next_report.load(Ordering::Relaxed);
        let now = self.start.elapsed().as_micros() as u64;
        if now < due {
            return;
        }
        // only the thread that moves the deadline reports
        if self
            .next_report
            .compare_exchange(due, now + interval_micros(), Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            self.refresh(count);
        }
    }

    /// Report the current count regardless of throttling.
    pub fn flush(&self) {
        self.refresh(self.count());
    }

    fn refresh(&self, count: usize) {
        if let Some(cb) = &self.callback {
            cb(count);
        }
    }
}

fn interval_micros() -> u64 {
    REPORT_INTERVAL.as_micros() as u64
}
