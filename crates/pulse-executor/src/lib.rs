//! Action execution back-ends.
//!
//! # Key Components
//!
//! - [`ActionExecutor`]: capability trait shared by all back-ends
//! - [`VisualExecutor`]: animated surface, human-supervised validation
//! - [`LiveExecutor`]: real remote surface automation
//! - [`SimulatedExecutor`]: zero-latency in-process simulation for training
//! - [`SurfaceDriver`]: transport seam between executors and the surface
//!
//! Executors dispatch fire-and-forget and never wait for confirmation; the
//! confirmation monitor correlates effects from the state-update stream.

pub mod error;
pub mod executor;
pub mod live;
pub mod simulated;
pub mod surface;
pub mod visual;

pub use error::{ExecutorError, ExecutorResult};
pub use executor::{ActionExecutor, DynExecutor};
pub use live::LiveExecutor;
pub use simulated::{SimSink, SimulatedExecutor};
pub use surface::{DynSurfaceDriver, MockSurfaceDriver, SurfaceDriver};
pub use visual::VisualExecutor;
