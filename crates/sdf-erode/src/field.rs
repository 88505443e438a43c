use sdf_core::{Grid, Origin, Rgb8, Vec2f};

/// Which side of the boundary the wavefront expands into.
///
/// `Internal` fills foreground pixels only, `External` background only,
/// `Dual` both sides with a signed composition (foreground negative or zero,
/// background positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdfMode {
    Internal,
    External,
    Dual,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErodeConfig {
    /// Spread radius in rings; must be at least 1.
    pub radius: u32,
    pub mode: SdfMode,
    /// Rescale distances by the observed maximum instead of the radius,
    /// maximizing contrast when the radius far exceeds actual distances.
    pub normalize: bool,
}

impl Default for ErodeConfig {
    fn default() -> Self {
        Self {
            radius: 25,
            mode: SdfMode::Dual,
            normalize: true,
        }
    }
}

/// The four per-pixel channels of a distance field.
///
/// `dir_x`/`dir_y` store the unit vector from the pixel toward its origin,
/// remapped into `[0, 1]` (`0.5 + 0.5 * u`); the zero vector of a seed pixel
/// stores as `(0.5, 0.5)`. `coverage` is 1.0 within the spread, 0.0 outside.
/// `dist` is the normalized distance in `[0, 1]`; in `Dual` mode interior
/// distances clamp to the zero floor, so a shape's own pixels read 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample {
    pub dir_x: f32,
    pub dir_y: f32,
    pub coverage: f32,
    pub dist: f32,
}

impl FieldSample {
    /// Decodes the stored direction back to a unit-ish vector in `[-1, 1]`.
    pub fn direction(&self) -> Vec2f {
        Vec2f {
            x: (self.dir_x - 0.5) * 2.0,
            y: (self.dir_y - 0.5) * 2.0,
        }
    }

    pub fn in_spread(&self) -> bool {
        self.coverage != 0.0
    }
}

/// Origin coordinates per pixel; `Origin::NONE` outside the spread.
pub type CoordMap = Grid<Origin>;

/// Per-pixel distance/direction/coverage channels plus optional island tags.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    samples: Grid<FieldSample>,
    tags: Option<Grid<Rgb8>>,
    config: ErodeConfig,
}

impl DistanceField {
    pub(crate) fn new(
        samples: Grid<FieldSample>,
        tags: Option<Grid<Rgb8>>,
        config: ErodeConfig,
    ) -> Self {
        Self {
            samples,
            tags,
            config,
        }
    }

    pub fn rows(&self) -> usize {
        self.samples.rows()
    }

    pub fn cols(&self) -> usize {
        self.samples.cols()
    }

    pub fn samples(&self) -> &Grid<FieldSample> {
        &self.samples
    }

    pub fn sample(&self, row: usize, col: usize) -> Option<&FieldSample> {
        self.samples.get(row, col)
    }

    /// Island color of the claiming seed, when the field was built with an
    /// island map.
    pub fn tags(&self) -> Option<&Grid<Rgb8>> {
        self.tags.as_ref()
    }

    pub fn config(&self) -> &ErodeConfig {
        &self.config
    }
}
