use std::collections::HashSet;

use log::debug;
use sdf_core::{Error, Grid, Rgb8};
use sdf_mask::BoolField;

use crate::color::ColorProvider;
use crate::ColorSource;

const DR: [isize; 8] = [-1, -1, -1, 0, 0, 1, 1, 1];
const DC: [isize; 8] = [-1, 0, 1, -1, 1, -1, 0, 1];

/// Per-pixel island colors; background is black.
pub type IslandMap = Grid<Rgb8>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelConfig {
    pub colors: ColorSource,
}

/// Result of a labeling pass: the id map, the LUT in discovery order, and
/// each island's pixel count (parallel to the LUT).
#[derive(Debug, Clone, PartialEq)]
pub struct Labeling {
    pub map: IslandMap,
    pub lut: Vec<Rgb8>,
    pub counts: Vec<usize>,
}

impl Labeling {
    pub fn island_count(&self) -> usize {
        self.lut.len()
    }
}

/// Partitions `field` into 8-connected islands.
///
/// Pixels are scanned in row-major order; each unconsumed foreground pixel
/// seeds an iterative flood fill over a working copy of the field. The
/// canonical field is never mutated. Colors are drawn per island before the
/// fill runs, so a provisioning failure aborts with no partial map.
pub fn label(field: &BoolField, cfg: &LabelConfig) -> Result<Labeling, Error> {
    let (rows, cols) = (field.rows(), field.cols());
    let n = rows * cols;

    let mut provider = ColorProvider::new(&cfg.colors)?;
    let mut work: Vec<u8> = field.data().to_vec();
    let mut map = Grid::new_fill(rows, cols, Rgb8::BLACK);
    let mut lut = Vec::new();
    let mut counts = Vec::new();

    let mut frontier: Vec<usize> = Vec::new();
    let mut next: Vec<usize> = Vec::new();

    for start in 0..n {
        if work[start] == 0 {
            continue;
        }

        let color = provider.next()?;
        work[start] = 0;
        map.data_mut()[start] = color;
        let mut consumed = 1usize;

        frontier.clear();
        frontier.push(start);

        while !frontier.is_empty() {
            if frontier.len() > n {
                return Err(Error::Divergence("island flood fill"));
            }

            let before = consumed;
            next.clear();
            for &p in &frontier {
                let (r, c) = (p / cols, p % cols);
                for dir in 0..8 {
                    let nr = r as isize + DR[dir];
                    let nc = c as isize + DC[dir];
                    if nr < 0 || nc < 0 || nr as usize >= rows || nc as usize >= cols {
                        continue;
                    }

                    let nb = nr as usize * cols + nc as usize;
                    if work[nb] == 0 {
                        continue;
                    }

                    // Consuming on push deduplicates the next frontier.
                    work[nb] = 0;
                    map.data_mut()[nb] = color;
                    consumed += 1;
                    next.push(nb);
                }
            }

            if !next.is_empty() && consumed == before {
                return Err(Error::Divergence("island flood fill"));
            }

            std::mem::swap(&mut frontier, &mut next);
        }

        lut.push(color);
        counts.push(consumed);
    }

    debug!("labeled {} islands over {}x{} field", lut.len(), rows, cols);

    Ok(Labeling { map, lut, counts })
}

/// Drops islands with fewer than `min_px` pixels: their pixels revert to
/// background and their LUT entries disappear. `min_px <= 1` is a no-op copy.
pub fn filter_small_islands(labeling: &Labeling, min_px: usize) -> Labeling {
    let dropped: HashSet<Rgb8> = labeling
        .lut
        .iter()
        .zip(&labeling.counts)
        .filter(|(_, &count)| count < min_px)
        .map(|(&color, _)| color)
        .collect();

    if dropped.is_empty() {
        return labeling.clone();
    }

    let mut map = labeling.map.clone();
    for px in map.data_mut() {
        if dropped.contains(px) {
            *px = Rgb8::BLACK;
        }
    }

    let mut lut = Vec::new();
    let mut counts = Vec::new();
    for (&color, &count) in labeling.lut.iter().zip(&labeling.counts) {
        if !dropped.contains(&color) {
            lut.push(color);
            counts.push(count);
        }
    }

    debug!(
        "island filter dropped {} of {} islands (min {} px)",
        dropped.len(),
        labeling.lut.len(),
        min_px
    );

    Labeling { map, lut, counts }
}

/// One boolean mask per LUT entry, in LUT order.
pub fn island_masks(labeling: &Labeling) -> Vec<BoolField> {
    labeling
        .lut
        .iter()
        .map(|&color| {
            let data = labeling
                .map
                .data()
                .iter()
                .map(|&px| u8::from(px == color))
                .collect();
            let grid = Grid::from_vec(labeling.map.rows(), labeling.map.cols(), data)
                .expect("mask size matches map");
            BoolField::from_grid(grid)
        })
        .collect()
}
