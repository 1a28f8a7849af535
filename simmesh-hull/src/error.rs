//! The hull engine's escape payload.

use thiserror::Error;

/// Failure reported by the hull engine through its non-local escape.
///
/// The engine unwinds with this payload; the bridge catches it and returns
/// it as an ordinary error. It never appears as a panic outside the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HullFault {
    /// Fewer than four input points.
    #[error("convex hull needs at least 4 input points, got {0}")]
    TooFewPoints(usize),

    /// Input has no extent in one or more dimensions.
    #[error("degenerate hull input: points are {0}")]
    Degenerate(&'static str),

    /// Construction produced a facet with no usable normal.
    #[error("hull construction produced a degenerate facet")]
    DegenerateFacet,
}
