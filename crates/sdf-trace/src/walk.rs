use sdf_core::{Coord, Error, Rgb8};
use sdf_erode::{CoordMap, DistanceField};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceConfig {
    /// Hard ceiling on the progression value; the walk stops once the next
    /// step would exceed it, bounding pathological inputs.
    pub max_value: f32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self { max_value: 500.0 }
    }
}

/// Why a finished walk stopped. Errors (`NoProgress`, `OriginOutOfRange`)
/// surface through the iterator instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The next step would leave the grid.
    LeftGrid,
    /// The rounded tangent had no lattice direction.
    ZeroStep,
    /// The next pixel lies outside the propagation spread.
    OutsideSpread,
    /// The progression ceiling was reached.
    ReachedCap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceStep {
    pub coord: Coord,
    /// Boundary pixel the progression value is recorded at.
    pub origin: Coord,
    pub value: f32,
}

/// Lazy clockwise walk along one island's silhouette.
///
/// Yields one [`TraceStep`] per visited pixel, starting at value 1.0 and
/// incrementing by 1 per step. The sequence is finite and deterministic;
/// constructing a new walk with the same inputs replays it from scratch.
#[derive(Debug)]
pub struct TraceWalk<'a> {
    field: &'a DistanceField,
    coords: &'a CoordMap,
    cfg: TraceConfig,
    cur: Coord,
    value: f32,
    started: bool,
    done: bool,
    stop: Option<StopReason>,
}

impl<'a> TraceWalk<'a> {
    /// Starts a walk for `island` at `start`, which callers resolve through
    /// the start policy in [`crate::trace`].
    pub(crate) fn from_start(
        field: &'a DistanceField,
        coords: &'a CoordMap,
        start: Coord,
        cfg: TraceConfig,
    ) -> Result<Self, Error> {
        if coords.rows() != field.rows() || coords.cols() != field.cols() {
            return Err(Error::SizeMismatch {
                expected: field.rows() * field.cols(),
                actual: coords.len(),
            });
        }
        if cfg.max_value < 1.0 {
            return Err(Error::BadConfig("trace ceiling below the first step"));
        }

        Ok(Self {
            field,
            coords,
            cfg,
            cur: start,
            value: 1.0,
            started: false,
            done: false,
            stop: None,
        })
    }

    pub fn start(&self) -> Coord {
        self.cur
    }

    /// Stop reason once the sequence has ended without an error.
    pub fn stop(&self) -> Option<StopReason> {
        self.stop
    }

    fn finish(&mut self, reason: StopReason) {
        self.done = true;
        self.stop = Some(reason);
    }

    fn step_at(&mut self, coord: Coord) -> Result<TraceStep, Error> {
        let origin = *self
            .coords
            .get(coord.row, coord.col)
            .expect("walk coordinate within grid");

        let Some(origin) = origin.coord(self.field.rows(), self.field.cols()) else {
            self.done = true;
            return Err(Error::OriginOutOfRange {
                row: origin.row,
                col: origin.col,
            });
        };

        Ok(TraceStep {
            coord,
            origin,
            value: self.value,
        })
    }
}

impl Iterator for TraceWalk<'_> {
    type Item = Result<TraceStep, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            return Some(self.step_at(self.cur));
        }

        let sample = *self
            .field
            .sample(self.cur.row, self.cur.col)
            .expect("walk coordinate within grid");

        // Tangent: the stored direction recentered to [-1, 1], rotated 90
        // degrees clockwise, rounded to the nearest lattice step. Exactly
        // zero components round to zero.
        let tangent = sample.direction().perp_cw();
        let step_r = sign_step(tangent.y);
        let step_c = sign_step(tangent.x);
        if step_r == 0 && step_c == 0 {
            self.finish(StopReason::ZeroStep);
            return None;
        }

        let nr = self.cur.row as isize + step_r;
        let nc = self.cur.col as isize + step_c;
        if nr < 0
            || nc < 0
            || nr as usize >= self.field.rows()
            || nc as usize >= self.field.cols()
        {
            self.finish(StopReason::LeftGrid);
            return None;
        }

        let cand = Coord::new(nr as usize, nc as usize);
        let cand_sample = self
            .field
            .sample(cand.row, cand.col)
            .expect("candidate within grid");
        if !cand_sample.in_spread() {
            // No search for an alternate boundary pixel; the walk cannot
            // continue safely outside the spread.
            self.finish(StopReason::OutsideSpread);
            return None;
        }

        if cand == self.cur {
            self.done = true;
            return Some(Err(Error::NoProgress {
                row: self.cur.row,
                col: self.cur.col,
            }));
        }

        let next_value = self.value + 1.0;
        if next_value > self.cfg.max_value {
            self.finish(StopReason::ReachedCap);
            return None;
        }

        self.cur = cand;
        self.value = next_value;
        Some(self.step_at(cand))
    }
}

pub(crate) fn tagged_with(field: &DistanceField, island: Rgb8, coord: Coord) -> bool {
    field
        .tags()
        .and_then(|tags| tags.get(coord.row, coord.col))
        .is_some_and(|&tag| tag == island)
}

fn sign_step(v: f32) -> isize {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::sign_step;

    #[test]
    fn sign_step_zero_rounds_to_zero() {
        assert_eq!(sign_step(0.7), 1);
        assert_eq!(sign_step(-0.2), -1);
        assert_eq!(sign_step(0.0), 0);
        assert_eq!(sign_step(-0.0), 0);
    }
}
