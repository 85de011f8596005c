//! Crate-level error type.
//!
//! Every fallible boundary into this engine — input validation, the
//! top-level `pack` entry point — surfaces through this single enum. It is
//! hand-rolled rather than derived, matching this codebase's own
//! `ValidationError`: non-fatal outcomes (oversized items, failed placements,
//! compliance violations) never appear here, only schema-level input
//! violations that must abort before any placement commit.

use std::fmt;

/// Fatal, pre-pack input validation failure.
#[derive(Clone, Debug, PartialEq)]
pub enum PackingError {
    NonPositiveDimension { field: String },
    NonPositiveWeight { field: String },
    InvalidPieceCount { piece_count: u32 },
    AxlePositionsNotIncreasing,
    AxleArrayLengthMismatch { axles: usize, positions: usize },
    NonPositiveTrackWidth { field: String },
    SaddleOutOfRange { saddle_position_x: f64, length: f64 },
    NoAxleOnOneSaddleSide,
    ItemExceedsPalletCapacity { item_name: String },
    EmptyUnitCatalog,
}

impl fmt::Display for PackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackingError::NonPositiveDimension { field } => {
                write!(f, "dimension '{field}' must be positive")
            }
            PackingError::NonPositiveWeight { field } => {
                write!(f, "weight '{field}' must be positive")
            }
            PackingError::InvalidPieceCount { piece_count } => {
                write!(f, "piece_count must be at least 1, got {piece_count}")
            }
            PackingError::AxlePositionsNotIncreasing => {
                write!(f, "axle_positions must be strictly increasing")
            }
            PackingError::AxleArrayLengthMismatch { axles, positions } => write!(
                f,
                "axle count {axles} does not match array length {positions}"
            ),
            PackingError::NonPositiveTrackWidth { field } => {
                write!(f, "track width '{field}' must be positive")
            }
            PackingError::SaddleOutOfRange {
                saddle_position_x,
                length,
            } => write!(
                f,
                "saddle_position_x {saddle_position_x} must lie in (0, {length})"
            ),
            PackingError::NoAxleOnOneSaddleSide => {
                write!(f, "articulated unit needs at least one axle on each side of the saddle")
            }
            PackingError::ItemExceedsPalletCapacity { item_name } => write!(
                f,
                "item '{item_name}' cannot fit its pallet by weight or by any in-plane orientation"
            ),
            PackingError::EmptyUnitCatalog => write!(f, "unit_catalog must not be empty"),
        }
    }
}

impl std::error::Error for PackingError {}
