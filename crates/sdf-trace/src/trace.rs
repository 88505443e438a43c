use log::debug;
use sdf_core::{Coord, Error, Grid, Rgb8};
use sdf_erode::{CoordMap, DistanceField};

use crate::walk::tagged_with;
use crate::{StopReason, TraceConfig, TraceWalk};

/// Progression values along one island's traced silhouette; 0.0 marks
/// unvisited pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    pub values: Grid<f32>,
    pub max_value: f32,
    pub stop: StopReason,
}

/// Builds the walk for `island` and renders its progression field.
///
/// The start is `start_hint` when it is tagged with `island`, otherwise the
/// top-middle policy: among tagged pixels on the topmost tagged row, the one
/// whose column is closest to the horizontal center of the tagged bounding
/// box (ties take the smaller column). Selection is deterministic so repeated
/// traces are identical.
pub fn trace(
    field: &DistanceField,
    coords: &CoordMap,
    island: Rgb8,
    start_hint: Option<Coord>,
    cfg: &TraceConfig,
) -> Result<Progression, Error> {
    let mut walk = walk_for(field, coords, island, start_hint, cfg)?;

    let mut values = Grid::new_fill(field.rows(), field.cols(), 0.0f32);
    let mut max_value = 0.0f32;
    let mut steps = 0usize;

    while let Some(step) = walk.next() {
        let step = step?;
        *values
            .get_mut(step.origin.row, step.origin.col)
            .expect("origin within grid") = step.value;
        max_value = step.value;
        steps += 1;
    }

    let stop = walk.stop().expect("finished walk has a stop reason");
    debug!("trace covered {steps} pixels, stop: {stop:?}");

    Ok(Progression {
        values,
        max_value,
        stop,
    })
}

/// Start-policy resolution shared by [`trace`] and direct walk consumers.
pub fn walk_for<'a>(
    field: &'a DistanceField,
    coords: &'a CoordMap,
    island: Rgb8,
    start_hint: Option<Coord>,
    cfg: &TraceConfig,
) -> Result<TraceWalk<'a>, Error> {
    if field.tags().is_none() {
        return Err(Error::BadConfig("distance field carries no island tags"));
    }
    if island.is_black() {
        return Err(Error::BadConfig("cannot trace the background color"));
    }

    let start = match start_hint {
        Some(hint) if tagged_with(field, island, hint) => hint,
        _ => top_middle_start(field, island)?,
    };

    TraceWalk::from_start(field, coords, start, *cfg)
}

fn top_middle_start(field: &DistanceField, island: Rgb8) -> Result<Coord, Error> {
    let tags = field.tags().expect("caller checked tags");

    let mut top_row = None;
    let mut min_col = usize::MAX;
    let mut max_col = 0usize;

    for r in 0..tags.rows() {
        for (c, &tag) in tags.row(r).iter().enumerate() {
            if tag != island {
                continue;
            }
            top_row.get_or_insert(r);
            min_col = min_col.min(c);
            max_col = max_col.max(c);
        }
    }

    let Some(top_row) = top_row else {
        return Err(Error::UnknownIsland);
    };

    let center = (min_col + max_col) / 2;
    let mut best = None;
    for (c, &tag) in tags.row(top_row).iter().enumerate() {
        if tag != island {
            continue;
        }
        let dist = center.abs_diff(c);
        let better = match best {
            None => true,
            Some((best_dist, _)) => dist < best_dist,
        };
        if better {
            best = Some((dist, c));
        }
    }

    let (_, col) = best.expect("topmost tagged row has a tagged pixel");
    Ok(Coord::new(top_row, col))
}

#[cfg(test)]
mod tests {
    use sdf_core::{Coord, Error, Grid, Rgb8};
    use sdf_erode::{propagate, ErodeConfig, SdfMode};
    use sdf_label::{label, ColorSource, LabelConfig};
    use sdf_mask::BoolField;

    use super::{trace, walk_for};
    use crate::{StopReason, TraceConfig};

    const ISLAND: Rgb8 = Rgb8 { r: 255, g: 0, b: 0 };

    fn square_setup(
        rows: usize,
        cols: usize,
        r0: usize,
        r1: usize,
        c0: usize,
        c1: usize,
        radius: u32,
    ) -> (sdf_erode::DistanceField, sdf_erode::CoordMap) {
        let mut data = vec![0u8; rows * cols];
        for r in r0..=r1 {
            for c in c0..=c1 {
                data[r * cols + c] = 1;
            }
        }
        let field = BoolField::from_grid(Grid::from_vec(rows, cols, data).expect("valid grid"));

        let labeling = label(
            &field,
            &LabelConfig {
                colors: ColorSource::Palette(vec![ISLAND]),
            },
        )
        .expect("labeling");

        propagate(
            &field,
            Some(&labeling.map),
            &ErodeConfig {
                radius,
                mode: SdfMode::Dual,
                normalize: false,
            },
        )
        .expect("propagation")
    }

    #[test]
    fn walk_follows_top_edge_clockwise() {
        // 2x2 square at rows 2-3, cols 2-3; spread radius 1. Starting just
        // above the top-left corner the walk moves right along the top edge
        // until the tangent pushes it outside the spread.
        let (field, coords) = square_setup(6, 6, 2, 3, 2, 3, 1);

        let walk = walk_for(
            &field,
            &coords,
            ISLAND,
            Some(Coord::new(1, 2)),
            &TraceConfig::default(),
        )
        .expect("walk");

        let steps: Vec<_> = walk.map(|s| s.expect("no walk error")).collect();
        let visited: Vec<(usize, usize)> =
            steps.iter().map(|s| (s.coord.row, s.coord.col)).collect();
        assert_eq!(visited, vec![(1, 2), (1, 3), (1, 4)]);

        let values: Vec<f32> = steps.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn trace_circumnavigates_a_square_flank() {
        // 4x4 square at rows 4-7, cols 4-7 of a 12x12 grid, radius 2. From a
        // hint above the square the walk runs the top edge, rounds the
        // corner, and descends the full right flank before drifting out of
        // the spread below the bottom-right corner.
        let (field, coords) = square_setup(12, 12, 4, 7, 4, 7, 2);

        let walk = walk_for(
            &field,
            &coords,
            ISLAND,
            Some(Coord::new(3, 5)),
            &TraceConfig::default(),
        )
        .expect("walk");
        let visited: Vec<(usize, usize)> = walk
            .map(|s| s.expect("no walk error"))
            .map(|s| (s.coord.row, s.coord.col))
            .collect();
        assert_eq!(
            visited,
            vec![
                (3, 5),
                (3, 6),
                (3, 7),
                (3, 8),
                (4, 9),
                (5, 9),
                (6, 9),
                (7, 9),
                (8, 9),
                (9, 8),
            ]
        );

        let progression = trace(
            &field,
            &coords,
            ISLAND,
            Some(Coord::new(3, 5)),
            &TraceConfig::default(),
        )
        .expect("trace");

        assert_eq!(progression.stop, StopReason::OutsideSpread);
        assert_eq!(progression.max_value, 10.0);

        // Values land on the boundary origins, later visits overwrite.
        assert_eq!(progression.values.get(4, 5), Some(&1.0));
        assert_eq!(progression.values.get(4, 6), Some(&2.0));
        assert_eq!(progression.values.get(4, 7), Some(&5.0));
        assert_eq!(progression.values.get(5, 7), Some(&6.0));
        assert_eq!(progression.values.get(6, 7), Some(&7.0));
        assert_eq!(progression.values.get(7, 7), Some(&10.0));
        let marked = progression
            .values
            .data()
            .iter()
            .filter(|&&v| v != 0.0)
            .count();
        assert_eq!(marked, 6);
    }

    #[test]
    fn disc_orbit_returns_near_start_and_caps() {
        // Filled disc of radius 8 centered in a 32x32 grid, spread radius 6.
        // Starting three pixels above the top of the disc the walk orbits the
        // silhouette; the orbit stays inside the spread, passes back near its
        // start after roughly one circumference, and runs to the ceiling.
        let (rows, cols) = (32usize, 32usize);
        let (cr, cc) = (16.0f32, 16.0f32);
        let mut data = vec![0u8; rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                let dr = r as f32 - cr;
                let dc = c as f32 - cc;
                if (dr * dr + dc * dc).sqrt() <= 8.0 {
                    data[r * cols + c] = 1;
                }
            }
        }
        let field = BoolField::from_grid(
            Grid::from_vec(rows, cols, data).expect("valid grid"),
        );
        let labeling = label(
            &field,
            &LabelConfig {
                colors: ColorSource::Palette(vec![ISLAND]),
            },
        )
        .expect("labeling");
        let (sdf, coords) = propagate(
            &field,
            Some(&labeling.map),
            &ErodeConfig {
                radius: 6,
                mode: SdfMode::Dual,
                normalize: false,
            },
        )
        .expect("propagation");

        let start = Coord::new(5, 16);
        let steps: Vec<_> = walk_for(
            &sdf,
            &coords,
            ISLAND,
            Some(start),
            &TraceConfig { max_value: 100.0 },
        )
        .expect("walk")
        .map(|s| s.expect("no walk error"))
        .collect();

        assert_eq!(steps.len(), 100);
        assert_eq!(steps.last().expect("non-empty walk").value, 100.0);

        // After roughly one circumference the orbit passes close to the
        // start again.
        let revisits = steps
            .iter()
            .filter(|s| s.value >= 30.0)
            .map(|s| {
                s.coord
                    .row
                    .abs_diff(start.row)
                    .max(s.coord.col.abs_diff(start.col))
            })
            .min()
            .expect("steps past value 30");
        assert!(revisits <= 4, "orbit strayed from its start: {revisits}");

        let progression = trace(
            &sdf,
            &coords,
            ISLAND,
            Some(start),
            &TraceConfig { max_value: 100.0 },
        )
        .expect("trace");
        assert_eq!(progression.stop, StopReason::ReachedCap);
        assert_eq!(progression.max_value, 100.0);

        // A full loop marks a broad arc of distinct boundary origins.
        let marked = progression
            .values
            .data()
            .iter()
            .filter(|&&v| v != 0.0)
            .count();
        assert!(marked >= 20, "only {marked} boundary origins marked");
    }

    #[test]
    fn ceiling_caps_the_walk() {
        let (field, coords) = square_setup(12, 12, 4, 7, 4, 7, 2);

        let progression = trace(
            &field,
            &coords,
            ISLAND,
            Some(Coord::new(3, 5)),
            &TraceConfig { max_value: 4.0 },
        )
        .expect("trace");

        assert_eq!(progression.stop, StopReason::ReachedCap);
        assert_eq!(progression.max_value, 4.0);
    }

    #[test]
    fn default_start_is_top_middle_of_tagged_region() {
        let (field, coords) = square_setup(12, 12, 4, 7, 4, 7, 2);

        let walk =
            walk_for(&field, &coords, ISLAND, None, &TraceConfig::default()).expect("walk");
        // Tagged region spans rows/cols 2..=9; its topmost row is 2 and the
        // bounding-box center column is 5.
        assert_eq!(walk.start(), Coord::new(2, 5));
    }

    #[test]
    fn walks_are_replayable() {
        let (field, coords) = square_setup(12, 12, 4, 7, 4, 7, 2);
        let cfg = TraceConfig::default();

        let a: Vec<_> = walk_for(&field, &coords, ISLAND, None, &cfg)
            .expect("walk")
            .map(|s| s.expect("no walk error"))
            .collect();
        let b: Vec<_> = walk_for(&field, &coords, ISLAND, None, &cfg)
            .expect("walk")
            .map(|s| s.expect("no walk error"))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn untagged_field_is_rejected() {
        let mut data = vec![0u8; 36];
        data[14] = 1;
        let field = BoolField::from_grid(Grid::from_vec(6, 6, data).expect("valid grid"));
        let (sdf, coords) = propagate(
            &field,
            None,
            &ErodeConfig {
                radius: 2,
                mode: SdfMode::Dual,
                normalize: false,
            },
        )
        .expect("propagation");

        let err = trace(&sdf, &coords, ISLAND, None, &TraceConfig::default()).unwrap_err();
        assert_eq!(
            err,
            Error::BadConfig("distance field carries no island tags")
        );
    }

    #[test]
    fn unknown_island_is_rejected() {
        let (field, coords) = square_setup(6, 6, 2, 3, 2, 3, 1);
        let missing = Rgb8::new(0, 0, 255);

        let err = trace(&field, &coords, missing, None, &TraceConfig::default()).unwrap_err();
        assert_eq!(err, Error::UnknownIsland);
    }
}
