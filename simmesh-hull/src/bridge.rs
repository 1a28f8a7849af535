//! Recovery bridge over the engine's non-local error escape.

use std::panic::{self, AssertUnwindSafe};

use nalgebra::Point3;

use crate::engine::{self, Hull};
use crate::error::HullFault;

/// Compute the convex hull of `points`.
///
/// This is the only entry point to the engine. It installs the landing pad
/// for the engine's escape protocol, so an engine fault comes back as
/// `Err(HullFault)` while engine state and scratch buffers are released by
/// unwinding on every exit path. A panic that did not originate in the
/// engine is resumed untouched.
///
/// # Errors
///
/// Returns a [`HullFault`] when the input is degenerate (fewer than four
/// points, or all points coincident/collinear/coplanar) or the construction
/// breaks down numerically.
pub fn compute_hull(points: &[Point3<f64>]) -> Result<Hull, HullFault> {
    match panic::catch_unwind(AssertUnwindSafe(|| engine::build(points))) {
        Ok(hull) => Ok(hull),
        Err(payload) => match payload.downcast::<HullFault>() {
            Ok(fault) => Err(*fault),
            Err(other) => panic::resume_unwind(other),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn fault_is_caught_not_propagated() {
        // degenerate input escapes inside the engine; the bridge must turn
        // that into an error, not a panic
        let pts = [Point3::new(0.0, 0.0, 0.0); 4];
        let result = compute_hull(&pts);
        assert!(result.is_err());
    }

    #[test]
    fn success_path() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        let hull = compute_hull(&pts).unwrap();
        assert_eq!(hull.facets.len(), 4);
    }
}
