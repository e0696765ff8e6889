//! Cancellation tokens for long-running searches.
//!
//! The search polls its token between encodes, never during one, so a stop
//! takes effect after at most one encode and always leaves a complete result.

use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation token for a size search.
pub trait Stop: Send + Sync {
    /// Whether the search should stop and return what it has.
    fn should_stop(&self) -> bool;
}

/// A token that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl Stop for Never {
    fn should_stop(&self) -> bool {
        false
    }
}

impl Stop for AtomicBool {
    fn should_stop(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Adapts a closure into a token.
pub struct StopFn<F>(pub F);

impl<F> Stop for StopFn<F>
where
    F: Fn() -> bool + Send + Sync,
{
    fn should_stop(&self) -> bool {
        (self.0)()
    }
}

/// Fires once a wall-clock deadline has passed.
///
/// Not available on wasm32, where `Instant` is unsupported; browsers supply a
/// [`StopFn`] over their own clock instead.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct Deadline(std::time::Instant);

#[cfg(not(target_arch = "wasm32"))]
impl Deadline {
    pub fn after(timeout: std::time::Duration) -> Self {
        Self(std::time::Instant::now() + timeout)
    }

    pub fn at(instant: std::time::Instant) -> Self {
        Self(instant)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Stop for Deadline {
    fn should_stop(&self) -> bool {
        std::time::Instant::now() >= self.0
    }
}
