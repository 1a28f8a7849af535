//! Mesh compilation pipeline for the simulation engine.
//!
//! This crate turns raw triangle meshes and skinned meshes into the frozen
//! assets the simulation engine consumes. A [`MeshAsset`] is staged from a
//! file (STL, OBJ, MSH via `simmesh-io`) and/or caller-supplied arrays,
//! then compiled in a fixed order:
//!
//! 1. load and fold staging buffers (size and duplicate checks),
//! 2. canonicalize topology (vertex dedup, winding consistency),
//! 3. build the convex hull graph when requested or when faces are absent,
//! 4. synthesize vertex normals when none were supplied,
//! 5. compute surface/volume mass properties, diagonalize the inertia
//!    tensor, and re-express the mesh in its principal inertial frame.
//!
//! Skinned meshes go through [`SkinAsset`]: sizes are validated, bone and
//! material names resolve through a [`ModelCatalog`], bone weights are
//! normalized per vertex, and bind quaternions are normalized to unit
//! length.
//!
//! # Example
//!
//! ```
//! use simmesh::{CompileSettings, MeshAsset, MeshKind};
//!
//! let mut mesh = MeshAsset::new("tetra");
//! mesh.set_vertices(vec![
//!     0.0, 0.0, 0.0,
//!     1.0, 0.0, 0.0,
//!     0.0, 1.0, 0.0,
//!     0.0, 0.0, 1.0,
//! ]);
//! mesh.set_faces(vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3]);
//!
//! let settings = CompileSettings { density: 1.0, ..CompileSettings::default() };
//! mesh.compile(None, &settings).unwrap();
//!
//! let volume = mesh.volume().unwrap();
//! assert!((volume - 1.0 / 6.0).abs() < 1e-4);
//! let boxsz = mesh.inertia_box(MeshKind::Volume).unwrap();
//! assert!(boxsz.x > 0.0);
//! ```
//!
//! # Validity model
//!
//! Structural problems (bad sizes, missing files, out-of-range indices,
//! hull failure) fail `compile` immediately. Geometric defects (tiny area
//! or volume, inconsistent winding, bad inertia eigenvalues) are recorded
//! and surface on the first derived accessor, so a model can finish
//! loading and report the defect where the value is actually needed.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
// f64 math is truncated back into f32 storage throughout the pipeline
#![allow(clippy::cast_possible_truncation)]

mod catalog;
mod error;
mod fit;
mod graph;
mod mesh;
mod normals;
mod process;
mod skin;
mod topology;

pub use catalog::{ModelCatalog, NameCatalog};
pub use error::{MeshError, MeshResult, SkinError, SkinResult};
pub use fit::{FitShape, GeomFit};
pub use graph::HullGraph;
pub use mesh::{CompileSettings, MeshAsset, MeshKind, MeshOptions};
pub use skin::SkinAsset;

// the loader layer is part of the public surface: callers build VFS
// overlays and staging data with it
pub use simmesh_io::{IoError, MeshData, SkinBone, SkinData, Vfs, MINVAL};

// the hull engine's fault type appears inside `MeshError::HullFailed`
pub use simmesh_hull::HullFault;
