//! Vertex normal synthesis.

use nalgebra::Vector3;
use simmesh_io::MINVAL;

use crate::mesh::MeshAsset;
use crate::process::to_f64;

/// Face normal and its weight (the cross-product length, twice the area).
fn face_normal(vert: &[[f32; 3]], f: [u32; 3]) -> (Vector3<f64>, f64) {
    let v0 = to_f64(&vert[f[0] as usize]);
    let v1 = to_f64(&vert[f[1] as usize]);
    let v2 = to_f64(&vert[f[2] as usize]);

    let mut nrm = (v1 - v0).cross(&(v2 - v0));
    let len = nrm.norm();
    if len >= MINVAL {
        nrm /= len;
    }
    (nrm, len)
}

/// Synthesize per-vertex normals when none were supplied.
///
/// Face normals are accumulated into their vertices with area weights.
/// Unless `smoothnormal` is set, a second pass removes contributions from
/// faces at a large angle with the accumulated vertex normal (dot below
/// 0.8), keeping sharp edges sharp. Degenerate results fall back to `+Z`.
pub(crate) fn make_normal(m: &mut MeshAsset) {
    if !m.normal.is_empty() {
        return;
    }

    m.normal = vec![[0.0f32; 3]; m.vert.len()];
    if m.facenormal.is_empty() {
        m.facenormal = vec![[0u32; 3]; m.face.len()];
    }

    // accumulate area-weighted face normals
    for i in 0..m.face.len() {
        let f = m.face[i];
        let (nrm, weight) = face_normal(&m.vert, f);
        for j in 0..3 {
            let vid = f[j] as usize;
            for k in 0..3 {
                m.normal[vid][k] += (nrm[k] * weight) as f32;
            }
            m.facenormal[i][j] = f[j];
        }
    }

    // drop large-angle face contributions
    if !m.options.smoothnormal {
        let mut nremove = vec![[0.0f32; 3]; m.normal.len()];
        for i in 0..m.face.len() {
            let f = m.face[i];
            let (nrm, weight) = face_normal(&m.vert, f);
            for j in 0..3 {
                let vid = f[j] as usize;
                let mut vnrm = to_f64(&m.normal[vid]);
                let len = vnrm.norm();
                if len >= MINVAL {
                    vnrm /= len;
                }
                if nrm.dot(&vnrm) < 0.8 {
                    for k in 0..3 {
                        nremove[vid][k] += (nrm[k] * weight) as f32;
                    }
                }
            }
        }
        for (n, r) in m.normal.iter_mut().zip(&nremove) {
            for k in 0..3 {
                n[k] -= r[k];
            }
        }
    }

    // normalize; degenerate normals fall back to +Z
    for n in &mut m.normal {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if f64::from(len) > MINVAL {
            for k in 0..3 {
                n[k] /= len;
            }
        } else {
            *n = [0.0, 0.0, 1.0];
        }
    }
}
