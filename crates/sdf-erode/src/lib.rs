//! Signed-distance propagation ("erosion").
//!
//! Boundary seeds — foreground pixels with a background 8-neighbor inside
//! the grid — expand outward one ring at a time up to the configured radius.
//! Each reached pixel records the seed that claimed it, the Euclidean offset
//! to that seed (capped at the radius; this is the documented approximation,
//! not an exact Euclidean transform), and a unit direction toward it.
//!
//! Claim order is deterministic: seeds are collected in scanline order and
//! each ring's frontier is processed in insertion order. Within one ring a
//! strictly nearer seed's claim replaces an earlier one and exact ties keep
//! the first claimant, so repeated runs are bit-identical.

mod field;
mod propagate;

pub use field::{CoordMap, DistanceField, ErodeConfig, FieldSample, SdfMode};
pub use propagate::propagate;
