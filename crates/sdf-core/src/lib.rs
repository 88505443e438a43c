//! Foundational primitives for the `sdf-fields` workspace.
//!
//! ## Grids and Stride
//! Grids are row-major with `(row, col)` addressing. Borrowed views use
//! element stride (not byte stride): `stride` is the distance, in elements,
//! between adjacent row starts and may be greater than `cols`, which allows
//! views over padded collaborator buffers.
//!
//! ## Coordinate Convention
//! Integer grid coordinates are `(row, col)`. Continuous direction vectors
//! use `x` along the column axis and `y` along the row axis (row index grows
//! downward).

mod error;
mod geom;
mod grid;

pub use error::Error;
pub use geom::{Coord, Origin, Rgb8, Vec2f};
pub use grid::{Grid, GridView};
