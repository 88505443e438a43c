//! Island labeling: partitions a boolean field into disjoint 8-connected
//! components, assigning each a unique non-black color.
//!
//! The flood fill is an explicit frontier worklist processed in rounds (no
//! recursion), consuming a working copy of the field in place. Colors come
//! either from a caller-supplied palette (consumed in order, exhaustion is an
//! error) or from a seeded generator with collision checking, so every island
//! color is distinct and runs are reproducible.

mod color;
mod label;

pub use color::ColorSource;
pub use label::{
    filter_small_islands, island_masks, label, IslandMap, LabelConfig, Labeling,
};
