//! # tetrasoft-telemetry
//!
//! Event bus for simulation telemetry. A body emits structured events
//! (load, skinning, per-frame timing and energy) that pluggable sinks
//! consume: collected in memory for tests, or forwarded to `tracing`.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
