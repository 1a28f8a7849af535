//! Primitive fitting: size a geometric primitive around a compiled mesh.
//!
//! This is the single hook the primitive-fitting subsystem couples
//! through. Sizing comes either from the equivalent inertia box or, with
//! `fitaabb`, from the bounding box and vertex sweeps.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MeshResult;
use crate::mesh::{MeshAsset, MeshKind};
use crate::process::to_f64;

/// Primitive shapes a mesh can be fitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FitShape {
    /// Sphere sized from the mean extent.
    Sphere,
    /// Capsule: radius from X/Y, half-length from Z minus the cap.
    Capsule,
    /// Cylinder: radius from X/Y, half-length from Z.
    Cylinder,
    /// Ellipsoid with the box half-extents.
    Ellipsoid,
    /// Box with the box half-extents.
    Box,
}

/// Result of fitting a primitive around a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeomFit {
    /// Center of the fitted primitive in the pre-compile frame.
    pub center: Vector3<f64>,
    /// Primitive size parameters; slots a shape does not use are zero.
    pub size: [f64; 3],
}

impl MeshAsset {
    /// Fit a primitive of the given shape around this mesh.
    ///
    /// With `fitaabb` false the size derives from the equivalent inertia
    /// box of `kind`; with it true, from the axis-aligned bounding box
    /// and vertex sweeps. All sizes are multiplied by `fitscale`.
    ///
    /// # Errors
    ///
    /// See [`check`](Self::check).
    pub fn fit_geom(
        &self,
        shape: FitShape,
        kind: MeshKind,
        fitscale: f64,
        fitaabb: bool,
    ) -> MeshResult<GeomFit> {
        self.check()?;

        let mut center = self.pos(kind)?;
        let mut size = [0.0f64; 3];

        if fitaabb {
            let aabb = self.aabb()?;
            let cen = Vector3::new(
                (aabb[0] + aabb[3]) / 2.0,
                (aabb[1] + aabb[4]) / 2.0,
                (aabb[2] + aabb[5]) / 2.0,
            );
            center += cen;

            match shape {
                FitShape::Sphere => {
                    // largest vertex distance from the box center
                    for v in self.vertices() {
                        size[0] = size[0].max((to_f64(v) - cen).norm());
                    }
                }
                FitShape::Capsule | FitShape::Cylinder => {
                    // largest horizontal radius, then vertical extent
                    for v in self.vertices() {
                        let p = to_f64(v) - cen;
                        size[0] = size[0].max(p.xy().norm());
                        size[1] = size[1].max(p.z.abs());
                    }

                    // the capsule's cap covers part of the vertical
                    // extent: subtract the spherical elevation at each
                    // vertex's horizontal distance
                    if shape == FitShape::Capsule {
                        size[1] = 0.0;
                        for v in self.vertices() {
                            let p = to_f64(v) - cen;
                            let dst = p.xy().norm();
                            let h = size[0] * (dst / size[0]).acos().sin();
                            size[1] = size[1].max(p.z.abs() - h);
                        }
                    }
                }
                FitShape::Ellipsoid | FitShape::Box => {
                    size[0] = aabb[3] - cen.x;
                    size[1] = aabb[4] - cen.y;
                    size[2] = aabb[5] - cen.z;
                }
            }
        } else {
            let boxsz = self.inertia_box(kind)?;
            match shape {
                FitShape::Sphere => {
                    size[0] = (boxsz.x + boxsz.y + boxsz.z) / 3.0;
                }
                FitShape::Capsule => {
                    size[0] = (boxsz.x + boxsz.y) / 2.0;
                    size[1] = (boxsz.z - size[0] / 2.0).max(0.0);
                }
                FitShape::Cylinder => {
                    size[0] = (boxsz.x + boxsz.y) / 2.0;
                    size[1] = boxsz.z;
                }
                FitShape::Ellipsoid | FitShape::Box => {
                    size = [boxsz.x, boxsz.y, boxsz.z];
                }
            }
        }

        for s in &mut size {
            *s *= fitscale;
        }

        Ok(GeomFit { center, size })
    }
}
