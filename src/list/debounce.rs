//! Debounced deadline for "fetch after N ms of no typing".

use std::time::Duration;

use tokio::time::Instant;

/// Quiet-period timer for search input.
///
/// Every [`reset`](Self::reset) pushes the deadline out by the full
/// interval, so only the last keystroke of a burst lets it fire.
///
/// ```rust,no_run
/// # use std::time::Duration;
/// # use nearby::list::Debouncer;
/// # async fn example(mut keys: tokio::sync::mpsc::Receiver<String>) {
/// let mut debounce = Debouncer::new(Duration::from_millis(500));
/// loop {
///     let deadline = debounce.deadline();
///     tokio::select! {
///         Some(_text) = keys.recv() => debounce.reset(),
///         () = Debouncer::sleep_until(deadline), if deadline.is_some() => {
///             debounce.clear();
///             // send the search
///         }
///     }
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer {
    deadline: Option<Instant>,
    interval: Duration,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            deadline: None,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm (or re-arm) the timer from now
    pub fn reset(&mut self) {
        self.deadline = Some(Instant::now() + self.interval);
    }

    /// Disarm the timer
    pub fn clear(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Sleep until `deadline`, or forever if there is none.
    ///
    /// Takes the deadline by value so the caller can keep mutating the
    /// debouncer while the sleep is pending in a `select!`.
    pub async fn sleep_until(deadline: Option<Instant>) {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}
