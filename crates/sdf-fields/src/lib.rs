//! Umbrella crate for the `sdf-fields` workspace.
//!
//! Re-exports the pipeline stages: boolean-field construction, island
//! labeling, distance propagation, and boundary-gradient tracing.

pub use sdf_core::*;
pub use sdf_erode::*;
pub use sdf_label::*;
pub use sdf_mask::*;
pub use sdf_trace::*;
