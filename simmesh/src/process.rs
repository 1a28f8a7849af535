//! Inertia and framing engine.
//!
//! Runs once per mesh, computing volume/shell mass properties and
//! re-expressing the mesh in its own principal inertial frame. The volume
//! pass runs first because its pre-pass (reference transform, scale,
//! normal renormalization) and its recentering/rotation mutate the mesh
//! the shell pass then reads.

use nalgebra::{Matrix3, Quaternion, Rotation3, UnitQuaternion, Vector3};
use simmesh_io::MINVAL;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{CompileSettings, MeshAsset, MeshKind};

/// Area, outward unit normal, and centroid of a triangle.
///
/// Near-degenerate triangles return zero area; the normal is then the raw
/// cross product, which callers weight by the zero area.
pub(crate) fn triangle(
    v0: &[f32; 3],
    v1: &[f32; 3],
    v2: &[f32; 3],
) -> (f64, Vector3<f64>, Vector3<f64>) {
    let a = to_f64(v0);
    let b = to_f64(v1);
    let c = to_f64(v2);

    let center = (a + b + c) / 3.0;
    let mut normal = (b - a).cross(&(c - a));
    let len = normal.norm();
    if len < MINVAL {
        return (0.0, normal, center);
    }
    normal /= len;
    (len / 2.0, normal, center)
}

pub(crate) fn to_f64(v: &[f32; 3]) -> Vector3<f64> {
    Vector3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2]))
}

/// The six symmetric product-of-inertia slots.
const PAIRS: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (0, 1), (0, 2), (1, 2)];

/// Compute mass properties for both mesh kinds and rotate the mesh into
/// its volume principal frame.
///
/// Degenerate geometry does not fail here; it clears the corresponding
/// validity flag and returns early, leaving the first accessor to raise
/// the structured error.
pub(crate) fn process(m: &mut MeshAsset, settings: &CompileSettings) -> MeshResult<()> {
    for kind in [MeshKind::Volume, MeshKind::Shell] {
        let mut facecen = Vector3::zeros();

        if kind == MeshKind::Volume {
            pre_transform(m);

            // area-weighted face centroid; face indices get their range
            // check on this first full sweep
            let mut area = 0.0;
            for f in &m.face {
                for &v in f {
                    if v as usize >= m.vert.len() {
                        return Err(MeshError::IndexOutOfRange {
                            mesh: m.name().to_string(),
                            index: v,
                            nvert: m.vert.len(),
                        });
                    }
                }
                let (a, _, cen) = face_triangle(m, f);
                facecen += a * cen;
                area += a;
            }

            if area < MINVAL {
                m.valid_area = false;
                return Ok(());
            }
            facecen /= area;
        }

        // first moment: center of mass from pyramid volumes
        let mut com = Vector3::zeros();
        let mut total = 0.0;
        for f in &m.face {
            let (a, nrm, cen) = face_triangle(m, f);
            let mut vol = if kind == MeshKind::Shell {
                a
            } else {
                (cen - facecen).dot(&nrm) * a / 3.0
            };
            // legacy mode trades accuracy on non-watertight meshes for
            // positivity
            if !settings.exactmeshinertia {
                vol = vol.abs();
            }
            total += vol;
            com += vol * (cen * 0.75 + facecen * 0.25);
        }

        if total < MINVAL {
            m.valid_volume = false;
            return Ok(());
        }
        com /= total;
        *m.pos_mut(kind) = com;

        // put the origin at the center of mass
        if kind == MeshKind::Volume {
            for v in &mut m.vert {
                for j in 0..3 {
                    v[j] = (f64::from(v[j]) - com[j]) as f32;
                }
            }
        }

        // second moment: products of inertia over the recentered mesh
        let mut p = [0.0f64; 6];
        total = 0.0;
        let prefactor_div = if kind == MeshKind::Shell { 12.0 } else { 20.0 };
        for f in &m.face {
            let d = to_f64(&m.vert[f[0] as usize]);
            let e = to_f64(&m.vert[f[1] as usize]);
            let g = to_f64(&m.vert[f[2] as usize]);

            let (a, nrm, cen) = face_triangle(m, f);
            let mut vol = if kind == MeshKind::Shell {
                a
            } else {
                cen.dot(&nrm) * a / 3.0
            };
            if !settings.exactmeshinertia {
                vol = vol.abs();
            }
            total += vol;

            let pre = settings.density * vol / prefactor_div;
            for (j, &(x, y)) in PAIRS.iter().enumerate() {
                p[j] += pre
                    * (2.0 * (d[x] * d[y] + e[x] * e[y] + g[x] * g[y])
                        + d[x] * e[y]
                        + d[y] * e[x]
                        + d[x] * g[y]
                        + d[y] * g[x]
                        + e[x] * g[y]
                        + e[y] * g[x]);
            }
        }
        *m.volume_mut(kind) = total;

        // products of inertia to moments of inertia
        let inert = Matrix3::new(
            p[1] + p[2],
            -p[3],
            -p[4],
            -p[3],
            p[0] + p[2],
            -p[5],
            -p[4],
            -p[5],
            p[0] + p[1],
        );

        let (eigval, quat) = eig3(&inert);
        if eigval[2] <= 0.0 {
            m.valid_eigenvalue = false;
            return Ok(());
        }
        if eigval[0] + eigval[1] < eigval[2]
            || eigval[0] + eigval[2] < eigval[1]
            || eigval[1] + eigval[2] < eigval[0]
        {
            m.valid_inequality = false;
            return Ok(());
        }

        // half-extents of the solid box with the same principal inertia
        let mass = total * settings.density;
        *m.boxsz_mut(kind) = Vector3::new(
            (6.0 * (eigval[1] + eigval[2] - eigval[0]) / mass).sqrt() / 2.0,
            (6.0 * (eigval[0] + eigval[2] - eigval[1]) / mass).sqrt() / 2.0,
            (6.0 * (eigval[0] + eigval[1] - eigval[2]) / mass).sqrt() / 2.0,
        );

        // the shell pass reads a mesh already rotated into the volume
        // frame, so it inherits that quaternion
        let frame = if kind == MeshKind::Volume {
            quat
        } else {
            m.quat_volume
        };
        *m.quat_mut(kind) = frame;

        if kind == MeshKind::Volume {
            let rot = quat.inverse();
            for v in &mut m.vert {
                let r = rot * to_f64(v);
                for j in 0..3 {
                    v[j] = r[j] as f32;
                    m.aabb[j] = m.aabb[j].min(r[j]);
                    m.aabb[j + 3] = m.aabb[j + 3].max(r[j]);
                }
            }
            for n in &mut m.normal {
                let r = rot * to_f64(n);
                for j in 0..3 {
                    n[j] = r[j] as f32;
                }
            }
        }
    }

    Ok(())
}

fn face_triangle(m: &MeshAsset, f: &[u32; 3]) -> (f64, Vector3<f64>, Vector3<f64>) {
    triangle(
        &m.vert[f[0] as usize],
        &m.vert[f[1] as usize],
        &m.vert[f[2] as usize],
    )
}

/// Apply the reference transform and scale, then renormalize normals.
///
/// Each step is skipped when its option is at the default, so meshes
/// without a reference frame keep their bits untouched.
fn pre_transform(m: &mut MeshAsset) {
    let opts = m.options.clone();

    if opts.refpos != Vector3::zeros() {
        let rp = [
            opts.refpos.x as f32,
            opts.refpos.y as f32,
            opts.refpos.z as f32,
        ];
        for v in &mut m.vert {
            for j in 0..3 {
                v[j] -= rp[j];
            }
        }
    }

    if opts.refquat != [1.0, 0.0, 0.0, 0.0] {
        let q = UnitQuaternion::from_quaternion(Quaternion::new(
            opts.refquat[0],
            opts.refquat[1],
            opts.refquat[2],
            opts.refquat[3],
        ));
        let rot = q.inverse();
        for v in &mut m.vert {
            let r = rot * to_f64(v);
            for j in 0..3 {
                v[j] = r[j] as f32;
            }
        }
        for n in &mut m.normal {
            let r = rot * to_f64(n);
            for j in 0..3 {
                n[j] = r[j] as f32;
            }
        }
    }

    if opts.scale != Vector3::new(1.0, 1.0, 1.0) {
        let s = [opts.scale.x as f32, opts.scale.y as f32, opts.scale.z as f32];
        for v in &mut m.vert {
            for j in 0..3 {
                v[j] *= s[j];
            }
        }
        for n in &mut m.normal {
            for j in 0..3 {
                n[j] *= s[j];
            }
        }
    }

    // renormalize; degenerate normals fall back to +Z
    for n in &mut m.normal {
        let len2 = n[0] * n[0] + n[1] * n[1] + n[2] * n[2];
        if f64::from(len2) > MINVAL {
            let scl = 1.0 / len2.sqrt();
            for j in 0..3 {
                n[j] *= scl;
            }
        } else {
            *n = [0.0, 0.0, 1.0];
        }
    }
}

/// Eigendecomposition of a symmetric 3x3, eigenvalues ascending, with the
/// eigenbasis returned as a proper rotation.
///
/// A tensor whose off-diagonals are negligible against its diagonal is
/// treated as already diagonal. Iterative routines otherwise resolve the
/// noise direction into an arbitrary basis when eigenvalues repeat, which
/// would spin a symmetric mesh out of its axis-aligned frame.
fn eig3(inert: &Matrix3<f64>) -> ([f64; 3], UnitQuaternion<f64>) {
    let diag_max = inert[(0, 0)]
        .abs()
        .max(inert[(1, 1)].abs())
        .max(inert[(2, 2)].abs())
        .max(MINVAL);
    let off_max = inert[(0, 1)]
        .abs()
        .max(inert[(0, 2)].abs())
        .max(inert[(1, 2)].abs());

    let (eigenvalues, eigenvectors) = if off_max <= 1e-10 * diag_max {
        (
            Vector3::new(inert[(0, 0)], inert[(1, 1)], inert[(2, 2)]),
            Matrix3::identity(),
        )
    } else {
        let eigen = inert.symmetric_eigen();
        (eigen.eigenvalues, eigen.eigenvectors)
    };

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigenvalues[a].total_cmp(&eigenvalues[b]));

    let eigval = [
        eigenvalues[order[0]],
        eigenvalues[order[1]],
        eigenvalues[order[2]],
    ];

    let mut basis = Matrix3::from_columns(&[
        eigenvectors.column(order[0]).into_owned(),
        eigenvectors.column(order[1]).into_owned(),
        eigenvectors.column(order[2]).into_owned(),
    ]);
    if basis.determinant() < 0.0 {
        let flipped = -basis.column(2).into_owned();
        basis.set_column(2, &flipped);
    }

    let quat = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis));
    (eigval, quat)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn triangle_area_and_normal() {
        let (area, normal, center) =
            triangle(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert_relative_eq!(area, 0.5, epsilon = 1e-12);
        assert_relative_eq!(normal.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(center.x, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_triangle_has_zero_area() {
        let (area, _, _) = triangle(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[2.0, 0.0, 0.0]);
        assert_eq!(area, 0.0);
    }

    #[test]
    fn eig3_already_diagonal() {
        let m = Matrix3::from_diagonal(&Vector3::new(3.0, 1.0, 2.0));
        let (eigval, _) = eig3(&m);
        assert_relative_eq!(eigval[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(eigval[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(eigval[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn eig3_rotation_diagonalizes() {
        // rotate a diagonal tensor and check recovery
        let d = Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 5.0));
        let r = Rotation3::from_euler_angles(0.3, -0.7, 1.1);
        let m = r.matrix() * d * r.matrix().transpose();

        let (eigval, quat) = eig3(&m);
        assert_relative_eq!(eigval[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(eigval[2], 5.0, epsilon = 1e-9);

        // R(q)^T M R(q) must be diagonal with the eigenvalues on the
        // diagonal
        let rq = quat.to_rotation_matrix();
        let back = rq.matrix().transpose() * m * rq.matrix();
        for i in 0..3 {
            assert_relative_eq!(back[(i, i)], eigval[i], epsilon = 1e-9);
            for j in 0..3 {
                if i != j {
                    assert_relative_eq!(back[(i, j)], 0.0, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn eig3_returns_proper_rotation() {
        let m = Matrix3::from_diagonal(&Vector3::new(2.0, 3.0, 1.0));
        let (_, quat) = eig3(&m);
        let det = quat.to_rotation_matrix().matrix().determinant();
        assert_relative_eq!(det, 1.0, epsilon = 1e-12);
    }
}
