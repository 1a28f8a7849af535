//! Topology canonicalization: vertex deduplication and winding checks.
//!
//! The orientation check looks for a duplicated *directed* edge only: two
//! faces sharing an edge in the same winding means one of them is flipped.
//! A genuine non-manifold edge with opposite-handed patches still passes;
//! tightening that would need an undirected-edge parity count.

use simmesh_io::{MeshData, MINVAL};

use crate::process::triangle;

/// Remove exactly repeated vertices and rewrite faces accordingly.
///
/// Vertices are sorted by the 1-D key `x + 1e-2*y + 1e-4*z`, consecutive
/// exactly equal triples are redirected to their first occurrence, and the
/// vertex array is compacted in place. Only the STL path needs this; the
/// other loaders produce deduplicated input by construction.
///
/// Returns the number of vertices removed.
#[allow(clippy::cast_possible_truncation)] // vertex counts fit in u32 by construction
pub(crate) fn remove_repeated(data: &mut MeshData) -> usize {
    let nvert = data.vert.len() / 3;
    if nvert == 0 {
        return 0;
    }

    let key = |i: usize| {
        f64::from(data.vert[3 * i])
            + 1e-2 * f64::from(data.vert[3 * i + 1])
            + 1e-4 * f64::from(data.vert[3 * i + 2])
    };

    let mut index: Vec<usize> = (0..nvert).collect();
    index.sort_by(|&a, &b| key(a).total_cmp(&key(b)));

    // redirect repeated vertices to their sort predecessor
    let mut redirect: Vec<usize> = (0..nvert).collect();
    let mut repeated = 0;
    for w in index.windows(2) {
        let (prev, cur) = (w[0], w[1]);
        if data.vert[3 * cur..3 * cur + 3] == data.vert[3 * prev..3 * prev + 3] {
            redirect[cur] = prev;
            repeated += 1;
        }
    }

    if repeated == 0 {
        return 0;
    }

    // follow redirection chains to their roots
    for i in 0..nvert {
        let mut j = i;
        while redirect[j] != j {
            j = redirect[j];
        }
        redirect[i] = j;
    }

    // compact surviving vertices, remembering their new positions
    let mut compact = vec![usize::MAX; nvert];
    let mut kept = 0;
    for i in 0..nvert {
        if redirect[i] == i {
            compact[i] = kept;
            data.vert.copy_within(3 * i..3 * i + 3, 3 * kept);
            kept += 1;
        }
    }
    data.vert.truncate(3 * kept);

    // rewrite faces through the resolved redirection
    for f in &mut data.face {
        let idx = compact[redirect[*f as usize]];
        debug_assert!(idx < kept, "face rewrite escaped the compacted range");
        *f = idx as u32;
    }

    repeated
}

/// Find a duplicated directed edge, if any.
///
/// Sorts the edge list in place. Returns the duplicated pair converted to
/// 1-based vertex ids, for the orientation diagnostic.
pub(crate) fn inconsistent_edge(edges: &mut [(u32, u32)]) -> Option<(u32, u32)> {
    edges.sort_unstable();
    edges
        .windows(2)
        .find(|w| w[0] == w[1])
        .map(|w| (w[0].0 + 1, w[0].1 + 1))
}

/// Synthesize directed edges from faces, skipping near-degenerate
/// triangles.
pub(crate) fn edges_from_faces(vert: &[[f32; 3]], face: &[u32]) -> Vec<(u32, u32)> {
    let mut edges = Vec::with_capacity(face.len());
    for tri in face.chunks_exact(3) {
        let (v0, v1, v2) = (tri[0], tri[1], tri[2]);
        let (area, _, _) = triangle(
            &vert[v0 as usize],
            &vert[v1 as usize],
            &vert[v2 as usize],
        );
        if area > MINVAL.sqrt() {
            edges.push((v0, v1));
            edges.push((v1, v2));
            edges.push((v2, v0));
        }
    }
    edges
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn dedup_collapses_exact_duplicates() {
        // two triangles sharing an edge, written STL-style with 6 vertices
        let mut data = MeshData {
            vert: vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                1.0, 0.0, 0.0, // dup of 1
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0, // dup of 2
            ],
            face: vec![0, 1, 2, 3, 4, 5],
            ..MeshData::default()
        };
        let removed = remove_repeated(&mut data);
        assert_eq!(removed, 2);
        assert_eq!(data.vertex_count(), 4);
        // the two triangles still reference the same positions
        let pos = |i: u32| {
            let o = 3 * i as usize;
            [data.vert[o], data.vert[o + 1], data.vert[o + 2]]
        };
        assert_eq!(pos(data.face[1]), [1.0, 0.0, 0.0]);
        assert_eq!(pos(data.face[4]), [1.0, 1.0, 0.0]);
        // shared corners now use the same compacted index
        assert_eq!(data.face[1], data.face[3]);
        assert_eq!(data.face[2], data.face[5]);
    }

    #[test]
    fn dedup_noop_on_unique_vertices() {
        let mut data = MeshData {
            vert: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            face: vec![0, 1, 2],
            ..MeshData::default()
        };
        assert_eq!(remove_repeated(&mut data), 0);
        assert_eq!(data.vertex_count(), 3);
        assert_eq!(data.face, vec![0, 1, 2]);
    }

    #[test]
    fn dedup_chains_resolve() {
        // three copies of the same vertex
        let mut data = MeshData {
            vert: vec![
                5.0, 5.0, 5.0, //
                5.0, 5.0, 5.0, //
                5.0, 5.0, 5.0, //
                1.0, 0.0, 0.0,
            ],
            face: vec![0, 1, 3, 1, 2, 3],
            ..MeshData::default()
        };
        let removed = remove_repeated(&mut data);
        assert_eq!(removed, 2);
        assert_eq!(data.vertex_count(), 2);
        for &f in &data.face {
            assert!((f as usize) < 2);
        }
    }

    #[test]
    fn orientation_finds_duplicated_directed_edge() {
        let mut edges = vec![(0, 1), (1, 2), (2, 0), (0, 1), (3, 0)];
        let dup = inconsistent_edge(&mut edges);
        assert_eq!(dup, Some((1, 2))); // 1-based
    }

    #[test]
    fn orientation_accepts_opposite_windings() {
        // a properly shared edge appears once per direction
        let mut edges = vec![(0, 1), (1, 2), (2, 0), (1, 0), (0, 3), (3, 1)];
        assert_eq!(inconsistent_edge(&mut edges), None);
    }

    /// Deduplication never moves a face corner: the position each corner
    /// references is preserved exactly.
    #[test]
    fn dedup_preserves_face_positions() {
        use proptest::prelude::*;

        let strategy = prop::collection::vec(
            (0.0f32..4.0).prop_map(|v| v.floor()),
            30..120,
        )
        .prop_map(|coords| {
            let n = coords.len() / 3;
            let vert: Vec<f32> = coords[..3 * n].to_vec();
            let face: Vec<u32> = (0..n as u32).collect::<Vec<_>>()
                [..n - n % 3]
                .to_vec();
            (vert, face)
        });

        let mut runner = proptest::test_runner::TestRunner::default();
        runner
            .run(&strategy, |(vert, face)| {
                let before: Vec<[f32; 3]> = face
                    .iter()
                    .map(|&i| {
                        let o = 3 * i as usize;
                        [vert[o], vert[o + 1], vert[o + 2]]
                    })
                    .collect();

                let mut data = MeshData {
                    vert,
                    face,
                    ..MeshData::default()
                };
                remove_repeated(&mut data);

                let after: Vec<[f32; 3]> = data
                    .face
                    .iter()
                    .map(|&i| {
                        let o = 3 * i as usize;
                        [data.vert[o], data.vert[o + 1], data.vert[o + 2]]
                    })
                    .collect();
                prop_assert_eq!(before, after);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn edges_skip_degenerate_faces() {
        let vert = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [2.0, 0.0, 0.0], // collinear with 0 and 1
        ];
        let face = [0, 1, 2, 0, 1, 3];
        let edges = edges_from_faces(&vert, &face);
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0], (0, 1));
    }
}
