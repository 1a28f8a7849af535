//! Staging buffers produced by the format loaders.
//!
//! Loaders fill flat arrays in the same layout the compile pipeline's
//! staging slots use; the orchestrator folds them into frozen storage.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Flat mesh staging buffers filled by a loader.
///
/// All arrays are flat: `vert`/`normal` hold xyz triples, `texcoord` holds
/// uv pairs, the face arrays hold index triples. `edge` holds directed
/// edges used by the orientation check; only the OBJ loader emits them.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshData {
    /// Vertex positions, xyz per vertex.
    pub vert: Vec<f32>,
    /// Vertex normals, xyz per normal.
    pub normal: Vec<f32>,
    /// Texture coordinates, uv per vertex.
    pub texcoord: Vec<f32>,
    /// Triangle vertex indices.
    pub face: Vec<u32>,
    /// Per-corner normal indices.
    pub facenormal: Vec<u32>,
    /// Per-corner texture coordinate indices.
    pub facetexcoord: Vec<u32>,
    /// Directed edges of non-degenerate triangles.
    pub edge: Vec<(u32, u32)>,
}

impl MeshData {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vert.len() / 3
    }

    /// Number of triangle faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.face.len() / 3
    }
}

/// One bone of a skinned mesh: bind pose plus the vertices it influences.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SkinBone {
    /// Name of the body this bone attaches to, resolved later through the
    /// model catalog.
    pub body: String,
    /// Bind-pose position.
    pub bindpos: [f32; 3],
    /// Bind-pose orientation (w, x, y, z); normalized during compile.
    pub bindquat: [f32; 4],
    /// Indices of the vertices this bone influences.
    pub vertid: Vec<u32>,
    /// Influence weights, parallel to `vertid`.
    pub vertweight: Vec<f32>,
}

/// Skin staging buffers filled by the SKN loader.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SkinData {
    /// Vertex positions, xyz per vertex.
    pub vert: Vec<f32>,
    /// Texture coordinates, uv per vertex.
    pub texcoord: Vec<f32>,
    /// Triangle vertex indices.
    pub face: Vec<u32>,
    /// Bones with bind poses and vertex influences.
    pub bones: Vec<SkinBone>,
}
