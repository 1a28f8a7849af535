//! Incremental convex hull engine for the mesh compilation pipeline.
//!
//! The engine lives in [`engine`] and follows the classic incremental
//! construction: an initial tetrahedron from extreme points, then one point
//! at a time, replacing the facets the point can see with a cone of new
//! triangles over the horizon. All facets are triangles; every hull vertex
//! carries the list of facets incident to it.
//!
//! # Error escape protocol
//!
//! Like its qhull-shaped ancestors, the engine reports failure through a
//! non-local escape: it aborts the construction by unwinding with a typed
//! [`HullFault`] payload. Callers never invoke the engine directly; they go
//! through [`compute_hull`], which installs the landing pad, lets RAII
//! release engine state on every exit path, and hands back an ordinary
//! `Result`. The escape does not leak: a fault is returned as an error, and
//! any unrelated panic is resumed untouched.
//!
//! ```
//! use nalgebra::Point3;
//! use simmesh_hull::compute_hull;
//!
//! let points = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let hull = compute_hull(&points).unwrap();
//! assert_eq!(hull.vertices.len(), 4);
//! assert_eq!(hull.facets.len(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bridge;
mod engine;
mod error;

pub use bridge::compute_hull;
pub use engine::{Hull, HullFacet};
pub use error::HullFault;
