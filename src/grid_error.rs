//! GridError: unified error type for parallel-grid public APIs.
//!
//! Every variant is fatal for a running simulation: configuration and
//! invariant errors are raised during setup, transport errors during an
//! exchange round. Nothing is retried.

use crate::topology::coord::Coord;
use crate::topology::direction::Direction;
use thiserror::Error;

/// Unified error type for parallel-grid operations.
#[derive(Debug, Error)]
pub enum GridError {
    /// Grid rank (dimensionality) must be 1, 2 or 3.
    #[error("grid rank must be 1, 2 or 3 (got {0})")]
    InvalidRank(usize),
    /// Two coordinates of different rank were combined.
    #[error("coordinate rank mismatch: expected {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },
    /// The decomposed axis set is empty or names an axis the grid lacks.
    #[error("axis set {axes} is not valid for a rank-{rank} grid")]
    InvalidAxisSet { axes: String, rank: usize },
    /// Left and right halo widths differ.
    #[error("halo widths must be symmetric: left {left:?} != right {right:?}")]
    HaloMismatch { left: Coord, right: Coord },
    /// The process-mesh shape is malformed (zero count, count on an inactive axis, ...).
    #[error("invalid process mesh shape {shape:?}: {reason}")]
    InvalidMeshShape { shape: Coord, reason: String },
    /// More processes along an axis than grid cells along it.
    #[error("process mesh {shape:?} does not fit global grid {global:?}")]
    MeshTooLarge { shape: Coord, global: Coord },
    /// A subdomain is thinner than the halo it has to send.
    #[error("axis {axis}: owned extent {owned} is smaller than halo width {halo}")]
    SubdomainTooSmall { axis: usize, owned: usize, halo: usize },
    /// The rank has no subdomain (its id lies beyond the mesh volume).
    #[error("rank {rank} is inactive in a mesh of {volume} processes")]
    InactiveRank { rank: usize, volume: usize },
    /// A direction was used that the configured axis set does not allow.
    #[error("direction {0} is not applicable to the configured axis set")]
    DirectionNotApplicable(Direction),
    /// Participation and neighbour id of a direction disagree.
    #[error("rank {rank}: neighbour toward {direction} does not match its participation")]
    NeighborMismatch { rank: usize, direction: Direction },
    /// A coordinate lies outside the local extended grid.
    #[error("coordinate {coord:?} is outside grid of size {size:?}")]
    OutOfBounds { coord: Coord, size: Coord },
    /// A linear index lies outside the local extended grid.
    #[error("linear index {index} is outside grid of {len} cells")]
    IndexOutOfBounds { index: usize, len: usize },
    /// A send or receive window escapes the extended grid.
    #[error("{which} window of {direction} [{start:?}, {end:?}) escapes grid of size {size:?}")]
    WindowOutOfBounds {
        direction: Direction,
        which: &'static str,
        start: Coord,
        end: Coord,
        size: Coord,
    },
    /// A transfer buffer does not match its window volume.
    #[error("buffer for {direction} holds {got} samples, window needs {expected}")]
    BufferLength {
        direction: Direction,
        expected: usize,
        got: usize,
    },
    /// A field-point value carries a different number of time levels than the grid.
    #[error("field value has {got} time levels, grid stores {expected}")]
    TimeLevelMismatch { expected: usize, got: usize },
    /// Communication failure with a neighbour rank.
    #[error("communication error with rank {neighbor}: {source}")]
    CommError {
        neighbor: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A received message had the wrong length.
    #[error("buffer size mismatch from rank {neighbor}: expected {expected} bytes, got {got}")]
    BufferSizeMismatch {
        neighbor: usize,
        expected: usize,
        got: usize,
    },
}
