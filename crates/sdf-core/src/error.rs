use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch { expected: usize, actual: usize },
    InvalidStride,
    BadConfig(&'static str),
    PaletteExhausted { needed: usize, available: usize },
    Divergence(&'static str),
    UnknownIsland,
    NoProgress { row: usize, col: usize },
    OriginOutOfRange { row: i32, col: i32 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::InvalidStride => write!(f, "invalid stride"),
            Self::BadConfig(what) => write!(f, "bad configuration: {what}"),
            Self::PaletteExhausted { needed, available } => {
                write!(f, "palette exhausted: {needed} islands, {available} colors")
            }
            Self::Divergence(stage) => write!(f, "no forward progress in {stage}"),
            Self::UnknownIsland => write!(f, "island color not present in field tags"),
            Self::NoProgress { row, col } => {
                write!(f, "trace step did not advance at ({row}, {col})")
            }
            Self::OriginOutOfRange { row, col } => {
                write!(f, "origin ({row}, {col}) outside grid bounds")
            }
        }
    }
}

impl std::error::Error for Error {}
