use log::debug;
use sdf_core::{Error, Grid, Origin, Rgb8, Vec2f};
use sdf_label::IslandMap;
use sdf_mask::BoolField;

use crate::{CoordMap, DistanceField, ErodeConfig, FieldSample, SdfMode};

const DR: [isize; 8] = [-1, -1, -1, 0, 0, 1, 1, 1];
const DC: [isize; 8] = [-1, 0, 1, -1, 1, -1, 0, 1];

const UNCLAIMED: u32 = u32::MAX;

/// Expands distance/direction/origin information outward from boundary seeds.
///
/// Seeds are foreground pixels with at least one background 8-neighbor inside
/// the grid; a field with no boundary (all foreground or all background)
/// produces a sentinel field with zero coverage, not an error. When `islands`
/// is supplied each reached pixel is also tagged with the island color at its
/// claiming seed.
pub fn propagate(
    field: &BoolField,
    islands: Option<&IslandMap>,
    cfg: &ErodeConfig,
) -> Result<(DistanceField, CoordMap), Error> {
    if cfg.radius == 0 {
        return Err(Error::BadConfig("spread radius must be positive"));
    }

    let (rows, cols) = (field.rows(), field.cols());
    let n = rows * cols;

    if let Some(map) = islands {
        if !field.grid().same_shape(map) {
            return Err(Error::SizeMismatch {
                expected: n,
                actual: map.len(),
            });
        }
    }

    let fg = field.data();
    let mut ring = vec![UNCLAIMED; n];
    let mut origin = vec![Origin::NONE; n];
    let mut raw = vec![0.0f32; n];

    // Seeds in scanline order; their processing order is the deterministic
    // tie-break for equally-near claims.
    let mut frontier: Vec<usize> = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            let p = r * cols + c;
            if fg[p] == 0 || !touches_background(fg, r, c, rows, cols) {
                continue;
            }

            ring[p] = 0;
            origin[p] = Origin::new(r as i32, c as i32);
            frontier.push(p);
        }
    }

    debug!(
        "propagating from {} seeds over {}x{} field, radius {}",
        frontier.len(),
        rows,
        cols,
        cfg.radius
    );

    let radius_f = cfg.radius as f32;
    let mut next: Vec<usize> = Vec::new();
    let mut max_raw = 0.0f32;

    for step in 1..=cfg.radius {
        if frontier.is_empty() {
            break;
        }
        if frontier.len() > n {
            return Err(Error::Divergence("wavefront expansion"));
        }

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
                let allowed = match cfg.mode {
                    SdfMode::Internal => fg[nb] != 0,
                    SdfMode::External => fg[nb] == 0,
                    SdfMode::Dual => true,
                };
                if !allowed {
                    continue;
                }

                let o = origin[p];
                let d = seed_distance(o, nr, nc);

                if ring[nb] == UNCLAIMED {
                    ring[nb] = step;
                    origin[nb] = o;
                    raw[nb] = d;
                    next.push(nb);
                } else if ring[nb] == step && d < raw[nb] {
                    // A same-ring claim from a strictly nearer seed wins;
                    // exact ties keep the first claimant.
                    origin[nb] = o;
                    raw[nb] = d;
                }
            }
        }

        for &p in &next {
            raw[p] = raw[p].min(radius_f);
            if raw[p] > max_raw {
                max_raw = raw[p];
            }
        }

        std::mem::swap(&mut frontier, &mut next);
    }

    let scale = if cfg.normalize && max_raw > 0.0 {
        max_raw
    } else {
        radius_f
    };

    let mut samples = Grid::new_fill(rows, cols, far_sample(cfg.mode, false));
    let mut coords = Grid::new_fill(rows, cols, Origin::NONE);
    let mut tags = islands.map(|_| Grid::new_fill(rows, cols, Rgb8::BLACK));

    for p in 0..n {
        let (r, c) = (p / cols, p % cols);
        let is_fg = fg[p] != 0;

        if ring[p] == UNCLAIMED {
            samples.data_mut()[p] = far_sample(cfg.mode, is_fg);
            continue;
        }

        let o = origin[p];
        let dir = direction_to(o, r, c);
        let dist = match cfg.mode {
            SdfMode::Internal | SdfMode::External => (raw[p] / scale).clamp(0.0, 1.0),
            // Interior distances compose as negative and clamp to the zero
            // floor of the storage range.
            SdfMode::Dual => {
                if is_fg {
                    0.0
                } else {
                    (raw[p] / scale).clamp(0.0, 1.0)
                }
            }
        };

        samples.data_mut()[p] = FieldSample {
            dir_x: 0.5 + 0.5 * dir.x,
            dir_y: 0.5 + 0.5 * dir.y,
            coverage: 1.0,
            dist,
        };
        coords.data_mut()[p] = o;

        if let (Some(tag_grid), Some(island_map)) = (tags.as_mut(), islands) {
            let seed = o
                .coord(rows, cols)
                .expect("claimed pixel has in-grid origin");
            tag_grid.data_mut()[p] = *island_map
                .get(seed.row, seed.col)
                .expect("origin within island map");
        }
    }

    Ok((DistanceField::new(samples, tags, *cfg), coords))
}

fn touches_background(fg: &[u8], r: usize, c: usize, rows: usize, cols: usize) -> bool {
    for dir in 0..8 {
        let nr = r as isize + DR[dir];
        let nc = c as isize + DC[dir];
        if nr < 0 || nc < 0 || nr as usize >= rows || nc as usize >= cols {
            continue;
        }
        if fg[nr as usize * cols + nc as usize] == 0 {
            return true;
        }
    }
    false
}

fn seed_distance(o: Origin, r: isize, c: isize) -> f32 {
    let dr = (r - o.row as isize) as f32;
    let dc = (c - o.col as isize) as f32;
    (dr * dr + dc * dc).sqrt()
}

fn direction_to(o: Origin, r: usize, c: usize) -> Vec2f {
    Vec2f {
        x: o.col as f32 - c as f32,
        y: o.row as f32 - r as f32,
    }
    .normalize()
}

fn far_sample(mode: SdfMode, is_fg: bool) -> FieldSample {
    let dist = match mode {
        SdfMode::Internal | SdfMode::External => 1.0,
        SdfMode::Dual => {
            if is_fg {
                0.0
            } else {
                1.0
            }
        }
    };

    FieldSample {
        dir_x: 0.5,
        dir_y: 0.5,
        coverage: 0.0,
        dist,
    }
}
