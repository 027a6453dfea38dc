//! Game-surface driver trait.
//!
//! Provides a trait-based abstraction over the mechanism that physically
//! presses buttons on the game surface. This allows for:
//! - Dependency injection for testing
//! - Separation of dispatch from confirmation
//! - Different surfaces behind the same executors (animated vs headless)

use std::sync::Arc;

use pulse_core::ExecutionRecord;

use crate::error::{ExecutorError, ExecutorResult};

/// Trait for pressing actions onto the game surface.
///
/// `press` is fire-and-forget: success means the press was delivered to the
/// surface, not that the game accepted the action. Acceptance only ever
/// shows up on the state-update stream.
pub trait SurfaceDriver: Send + Sync {
    /// Dispatch an action to the surface.
    fn press(&self, record: &ExecutionRecord) -> ExecutorResult<()>;

    /// Check if the surface is ready to accept presses.
    fn is_ready(&self) -> bool;
}

/// Arc wrapper for SurfaceDriver trait objects.
pub type DynSurfaceDriver = Arc<dyn SurfaceDriver>;

/// Mock surface driver for testing.
#[derive(Debug)]
pub struct MockSurfaceDriver {
    /// Recorded presses for verification.
    presses: parking_lot::Mutex<Vec<ExecutionRecord>>,
    /// Whether the next press should fail.
    fail_next: parking_lot::Mutex<Option<String>>,
    /// Whether the mock is ready.
    ready: std::sync::atomic::AtomicBool,
}

impl Default for MockSurfaceDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSurfaceDriver {
    /// Create a new mock driver.
    pub fn new() -> Self {
        Self {
            presses: parking_lot::Mutex::new(Vec::new()),
            fail_next: parking_lot::Mutex::new(None),
            ready: std::sync::atomic::AtomicBool::new(true),
        }
    }

    /// Make the next press fail with the given reason.
    pub fn fail_next(&self, reason: &str) {
        *self.fail_next.lock() = Some(reason.to_string());
    }

    /// Set whether the mock is ready.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, std::sync::atomic::Ordering::SeqCst);
    }

    /// Get recorded presses.
    pub fn presses(&self) -> Vec<ExecutionRecord> {
        self.presses.lock().clone()
    }

    /// Number of recorded presses.
    pub fn press_count(&self) -> usize {
        self.presses.lock().len()
    }
}

impl SurfaceDriver for MockSurfaceDriver {
    fn press(&self, record: &ExecutionRecord) -> ExecutorResult<()> {
        if let Some(reason) = self.fail_next.lock().take() {
            return Err(ExecutorError::DispatchFailed(reason));
        }
        self.presses.lock().push(record.clone());
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(std::sync::atomic::Ordering::SeqCst)
    }
}
