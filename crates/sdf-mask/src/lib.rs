//! Boolean-field construction.
//!
//! The propagation and labeling stages require absolute 0/1 values, so all
//! inputs pass through a threshold first. [`BoolField`] wraps a `Grid<u8>`
//! holding exactly `{0, 1}`; nothing downstream mutates it.
//!
//! `open3x3`/`close3x3` are optional cleanup steps for noisy masks, run
//! before labeling. Out-of-bounds neighbors count as background.

use sdf_core::{Grid, GridView};

pub const DEFAULT_CUTOFF: f32 = 0.5;

/// Strict 0/1 field over a pixel grid.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolField {
    grid: Grid<u8>,
}

impl BoolField {
    /// Wraps a grid, coercing every non-zero element to 1.
    pub fn from_grid(mut grid: Grid<u8>) -> Self {
        for v in grid.data_mut() {
            *v = u8::from(*v != 0);
        }
        Self { grid }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn grid(&self) -> &Grid<u8> {
        &self.grid
    }

    pub fn data(&self) -> &[u8] {
        self.grid.data()
    }

    pub fn is_set(&self, row: usize, col: usize) -> bool {
        self.grid.get(row, col).is_some_and(|&v| v != 0)
    }

    pub fn count_set(&self) -> usize {
        self.grid.data().iter().filter(|&&v| v != 0).count()
    }
}

/// Thresholds an 8-bit buffer: `pixel / 255 > cutoff` is foreground.
pub fn threshold_u8(src: &GridView<'_, u8>, cutoff: f32) -> BoolField {
    let mut data = Vec::with_capacity(src.rows() * src.cols());
    for r in 0..src.rows() {
        for &px in src.row(r) {
            data.push(u8::from(px as f32 / 255.0 > cutoff));
        }
    }

    BoolField {
        grid: Grid::from_vec(src.rows(), src.cols(), data).expect("threshold output size"),
    }
}

/// Thresholds a float buffer already scaled to `[0, 1]`.
pub fn threshold_f32(src: &GridView<'_, f32>, cutoff: f32) -> BoolField {
    let mut data = Vec::with_capacity(src.rows() * src.cols());
    for r in 0..src.rows() {
        for &px in src.row(r) {
            data.push(u8::from(px > cutoff));
        }
    }

    BoolField {
        grid: Grid::from_vec(src.rows(), src.cols(), data).expect("threshold output size"),
    }
}

pub fn erode3x3(src: &BoolField) -> BoolField {
    morph3x3(src, false)
}

pub fn dilate3x3(src: &BoolField) -> BoolField {
    morph3x3(src, true)
}

/// Erosion followed by dilation; removes isolated specks.
pub fn open3x3(src: &BoolField) -> BoolField {
    dilate3x3(&erode3x3(src))
}

/// Dilation followed by erosion; fills isolated holes.
pub fn close3x3(src: &BoolField) -> BoolField {
    erode3x3(&dilate3x3(src))
}

fn morph3x3(src: &BoolField, dilate: bool) -> BoolField {
    let (rows, cols) = (src.rows(), src.cols());
    let mut out = Grid::new_fill(rows, cols, 0u8);
    if rows == 0 || cols == 0 {
        return BoolField { grid: out };
    }

    for r in 0..rows {
        for c in 0..cols {
            // Dilation keeps a pixel if any neighbor is set; erosion only if
            // all are (out-of-grid reads as background).
            let mut hit = !dilate;
            'scan: for dr in -1isize..=1 {
                for dc in -1isize..=1 {
                    let nr = r as isize + dr;
                    let nc = c as isize + dc;
                    let set = nr >= 0
                        && nc >= 0
                        && src.is_set(nr as usize, nc as usize);
                    if set == dilate {
                        hit = dilate;
                        break 'scan;
                    }
                }
            }

            if hit {
                *out.get_mut(r, c).expect("in-bounds morphology write") = 1;
            }
        }
    }

    BoolField { grid: out }
}
