//! Convex hull graph encoding.
//!
//! The hull adjacency is packed into one integer array:
//!
//! ```text
//! [0]                    V = hull vertex count
//! [1]                    F = hull face count (triangles)
//! [2 .. 2+V)             edge_adr: offset into edge_local_id per vertex
//! [2+V .. 2+2V)          global_id: original vertex index per hull vertex
//! [2+2V .. 2+2V+V+3F)    edge_local_id: neighbour lists in hull-local ids,
//!                        each terminated by -1
//! [2+2V+V+3F .. end)     face_global_id: 3F entries, original vertex ids
//! ```
//!
//! An invalid hull (ids out of range, wrong list sizes) discards the graph
//! with a warning instead of failing the compile.

use simmesh_hull::Hull;
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Packed convex hull adjacency graph.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HullGraph {
    data: Vec<i32>,
}

impl HullGraph {
    /// Hull vertex count.
    #[must_use]
    #[allow(clippy::cast_sign_loss)] // counts are written non-negative
    pub fn nvert(&self) -> usize {
        self.data[0] as usize
    }

    /// Hull face count.
    #[must_use]
    #[allow(clippy::cast_sign_loss)] // counts are written non-negative
    pub fn nface(&self) -> usize {
        self.data[1] as usize
    }

    /// Per-vertex offsets into [`Self::edge_local_id`].
    #[must_use]
    pub fn edge_adr(&self) -> &[i32] {
        &self.data[2..2 + self.nvert()]
    }

    /// Original vertex index of each hull vertex.
    #[must_use]
    pub fn global_id(&self) -> &[i32] {
        let v = self.nvert();
        &self.data[2 + v..2 + 2 * v]
    }

    /// Concatenated neighbour lists in hull-local ids, `-1` terminated.
    #[must_use]
    pub fn edge_local_id(&self) -> &[i32] {
        let (v, f) = (self.nvert(), self.nface());
        &self.data[2 + 2 * v..2 + 2 * v + v + 3 * f]
    }

    /// Hull triangles as original vertex ids.
    #[must_use]
    pub fn face_global_id(&self) -> &[i32] {
        let (v, f) = (self.nvert(), self.nface());
        &self.data[2 + 3 * v + 3 * f..]
    }

    /// The whole packed array.
    #[must_use]
    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }
}

/// Pack a hull into the graph layout. Returns `None` (after a warning)
/// when the hull refers to ids outside `[0, nvert)` or its lists do not
/// add up; the compile continues without a graph.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
// ids fit in i32: nvert is bounded by the loader limits
pub(crate) fn encode(name: &str, hull: &Hull, nvert: usize) -> Option<HullGraph> {
    let numvert = hull.vertices.len();
    let numface = hull.facets.len();
    let edge_len = numvert + 3 * numface;

    let mut data = vec![0i32; 2 + 3 * numvert + 6 * numface];
    data[0] = numvert as i32;
    data[1] = numface as i32;

    let edgeadr_base = 2;
    let globalid_base = 2 + numvert;
    let edge_base = 2 + 2 * numvert;
    let face_base = 2 + 3 * numvert + 3 * numface;

    let discard = || {
        warn!(mesh = %name, "could not construct convex hull graph");
        None
    };

    // neighbour lists, recorded as global ids first
    let mut adr = 0usize;
    for (i, &pid) in hull.vertices.iter().enumerate() {
        if pid >= nvert {
            return discard();
        }
        data[edgeadr_base + i] = adr as i32;
        data[globalid_base + i] = pid as i32;

        let start = adr;
        for &fi in &hull.vertex_facets[i] {
            for pid1 in hull.facets[fi].points {
                if pid1 >= nvert {
                    return discard();
                }
                if pid1 == pid {
                    continue;
                }
                let already = data[edge_base + start..edge_base + adr]
                    .contains(&(pid1 as i32));
                if !already {
                    if adr >= edge_len {
                        return discard();
                    }
                    data[edge_base + adr] = pid1 as i32;
                    adr += 1;
                }
            }
        }

        if adr >= edge_len {
            return discard();
        }
        data[edge_base + adr] = -1;
        adr += 1;
    }

    if adr != edge_len {
        return discard();
    }

    // triangles as global ids, reoriented where the stored order is flipped
    for (i, facet) in hull.facets.iter().enumerate() {
        let [a, b, c] = facet.points;
        let (a, b) = if facet.toporient { (b, a) } else { (a, b) };
        data[face_base + 3 * i] = a as i32;
        data[face_base + 3 * i + 1] = b as i32;
        data[face_base + 3 * i + 2] = c as i32;
    }

    // rewrite neighbour entries from global ids to hull-local ids
    for j in 0..edge_len {
        let g = data[edge_base + j];
        if g < 0 {
            continue;
        }
        let local = (0..numvert).find(|&k| data[globalid_base + k] == g);
        match local {
            Some(k) => data[edge_base + j] = k as i32,
            None => return discard(),
        }
    }

    Some(HullGraph { data })
}

/// Synthesize triangle faces from the hull facets, restoring outward
/// winding where the stored corner order is flipped.
#[allow(clippy::cast_possible_truncation)] // vertex ids fit in u32
pub(crate) fn faces_from_hull(hull: &Hull) -> Vec<[u32; 3]> {
    hull.facets
        .iter()
        .map(|f| {
            let [a, b, c] = f.points;
            let (a, b) = if f.toporient { (b, a) } else { (a, b) };
            [a as u32, b as u32, c as u32]
        })
        .collect()
}
