//! Progress reporting for long-running conversions.
//!
//! The classifier walks every cell of the mesh, which takes a while on large
//! inputs. It reports how far it got through a [`Progress`] callback so a
//! front end can draw a bar.
//!
//! # Example
//!
//! ```
//! use polyfoam::algo::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(1, 10, "Classifying faces");
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Number of completed steps
/// - `total`: Total number of steps
/// - `message`: Description of the current stage
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report progress only when `current` crosses one of `steps` equal
    /// slices of `total`, and at the end.
    ///
    /// Keeps per-cell loops from flooding the callback.
    #[inline]
    pub fn report_every(&self, current: usize, total: usize, steps: usize, message: &str) {
        let stride = (total / steps.max(1)).max(1);
        if current % stride == 0 || current == total {
            self.report(current, total, message);
        }
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_report_every_throttles() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let progress = Progress::new(move |_, _, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        for i in 1..=1000 {
            progress.report_every(i, 1000, 50, "cells");
        }
        assert_eq!(calls.load(Ordering::Relaxed), 50);
    }

    #[test]
    fn test_report_every_small_totals() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let progress = Progress::new(move |_, _, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        for i in 1..=3 {
            progress.report_every(i, 3, 50, "cells");
        }
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }
}
