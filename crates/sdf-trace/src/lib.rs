//! Boundary-gradient tracing.
//!
//! Walks clockwise along one island's silhouette by rotating the distance
//! field's direction channel 90 degrees and stepping to the nearest lattice
//! neighbor, assigning a monotonically increasing progression value to each
//! visited pixel's boundary origin. The walk is a pure state machine exposed
//! as a lazy step sequence ([`TraceWalk`]); rendering the progression grid is
//! a separate driver ([`trace`]) so observers can consume the raw sequence.
//!
//! The walk is strictly sequential: every step depends on the previous one.

mod trace;
mod walk;

pub use trace::{trace, walk_for, Progression};
pub use walk::{StopReason, TraceConfig, TraceStep, TraceWalk};
