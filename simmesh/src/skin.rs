//! Skinned mesh asset: staging, compilation, accessors.

use nalgebra::Quaternion;
use simmesh_io::{load_skn, open, strip_path, IoError, MeshFileFormat, SkinBone, Vfs, MINVAL};

use crate::catalog::ModelCatalog;
use crate::error::{SkinError, SkinResult};

/// A skinned mesh asset.
///
/// Staged from a `.skn` file or caller-supplied arrays, then frozen by
/// [`compile`](Self::compile): body and material names are resolved
/// through the model catalog, bone weights are normalized so every vertex
/// sums to one, and bind quaternions are normalized to unit length.
#[derive(Debug, Clone)]
pub struct SkinAsset {
    name: String,
    file: Option<String>,
    material: Option<String>,

    vert: Vec<f32>,
    texcoord: Vec<f32>,
    face: Vec<u32>,
    bones: Vec<SkinBone>,

    bodyid: Vec<usize>,
    matid: Option<usize>,
    compiled: bool,
}

impl SkinAsset {
    /// Create an empty skin with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            material: None,
            vert: Vec::new(),
            texcoord: Vec::new(),
            face: Vec::new(),
            bones: Vec::new(),
            bodyid: Vec::new(),
            matid: None,
            compiled: false,
        }
    }

    /// Create a skin backed by a `.skn` file.
    #[must_use]
    pub fn from_file(name: impl Into<String>, file: impl Into<String>) -> Self {
        let mut skin = Self::new(name);
        skin.file = Some(file.into());
        skin
    }

    /// Name of this asset, used in error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the material name to resolve during compile.
    pub fn set_material(&mut self, material: impl Into<String>) {
        self.material = Some(material.into());
    }

    /// Stage vertex positions, xyz per vertex.
    pub fn set_vertices(&mut self, vert: Vec<f32>) {
        self.vert = vert;
    }

    /// Stage texture coordinates, uv per vertex.
    pub fn set_texcoords(&mut self, texcoord: Vec<f32>) {
        self.texcoord = texcoord;
    }

    /// Stage triangle vertex indices.
    pub fn set_faces(&mut self, face: Vec<u32>) {
        self.face = face;
    }

    /// Stage the bone set.
    pub fn set_bones(&mut self, bones: Vec<SkinBone>) {
        self.bones = bones;
    }

    /// Compile the skin: load the backing file, validate sizes, resolve
    /// names, and normalize weights and bind quaternions.
    ///
    /// Runs at most once; a second call fails with
    /// [`SkinError::AlreadyCompiled`].
    ///
    /// # Errors
    ///
    /// All skin errors are structural and fail the compile immediately;
    /// see [`SkinError`].
    pub fn compile(
        &mut self,
        vfs: Option<&Vfs>,
        catalog: &dyn ModelCatalog,
        strippath: bool,
    ) -> SkinResult<()> {
        if self.compiled {
            return Err(SkinError::AlreadyCompiled {
                skin: self.name.clone(),
            });
        }

        if let Some(file) = self.file.clone() {
            // a file load with staged data would silently shadow one of
            // the two sources
            if !self.vert.is_empty()
                || !self.texcoord.is_empty()
                || !self.face.is_empty()
                || !self.bones.is_empty()
            {
                return Err(SkinError::RepeatedSpecification {
                    skin: self.name.clone(),
                });
            }

            let file = if strippath {
                strip_path(&file).to_string()
            } else {
                file
            };

            if MeshFileFormat::from_path(&file) != Some(MeshFileFormat::Skn) {
                return Err(self.io(IoError::UnknownExtension { path: file }));
            }

            let bytes = open(vfs, &file).map_err(|e| self.io(e))?;
            let data = load_skn(&bytes).map_err(|e| self.io(e))?;
            self.file = Some(file);
            self.vert = data.vert;
            self.texcoord = data.texcoord;
            self.face = data.face;
            self.bones = data.bones;
        }

        // presence
        if self.vert.is_empty() {
            return Err(self.missing("vertex"));
        }
        if self.face.is_empty() {
            return Err(self.missing("face"));
        }
        if self.bones.is_empty() {
            return Err(self.missing("bone"));
        }

        // mesh sizes
        if self.vert.len() % 3 != 0 {
            return Err(SkinError::NotMultipleOfStride {
                skin: self.name.clone(),
                array: "vertex",
                len: self.vert.len(),
                stride: 3,
            });
        }
        let nvert = self.vert.len() / 3;
        if !self.texcoord.is_empty() && self.texcoord.len() != 2 * nvert {
            return Err(SkinError::SizeMismatch {
                skin: self.name.clone(),
                what: "texcoord",
                expected: 2 * nvert,
                got: self.texcoord.len(),
            });
        }
        if self.face.len() % 3 != 0 {
            return Err(SkinError::NotMultipleOfStride {
                skin: self.name.clone(),
                array: "face",
                len: self.face.len(),
                stride: 3,
            });
        }

        // per-bone influence arrays must be parallel and non-empty
        for (i, bone) in self.bones.iter().enumerate() {
            if bone.vertid.is_empty() || bone.vertid.len() != bone.vertweight.len() {
                return Err(SkinError::BoneWeightMismatch {
                    skin: self.name.clone(),
                    bone: i,
                });
            }
        }

        // resolve body names
        self.bodyid = Vec::with_capacity(self.bones.len());
        for bone in &self.bones {
            let id = catalog
                .body_id(&bone.body)
                .ok_or_else(|| SkinError::UnknownBody {
                    skin: self.name.clone(),
                    body: bone.body.clone(),
                })?;
            self.bodyid.push(id);
        }

        // resolve the material; an empty name means none
        self.matid = match self.material.as_deref() {
            None | Some("") => None,
            Some(material) => Some(catalog.material_id(material).ok_or_else(|| {
                SkinError::UnknownMaterial {
                    skin: self.name.clone(),
                    material: material.to_string(),
                }
            })?),
        };

        // accumulate per-vertex total weights
        let mut totals = vec![0.0f32; nvert];
        for (i, bone) in self.bones.iter().enumerate() {
            for (&id, &w) in bone.vertid.iter().zip(&bone.vertweight) {
                let Some(total) = totals.get_mut(id as usize) else {
                    return Err(SkinError::VertexIdOutOfRange {
                        skin: self.name.clone(),
                        bone: i,
                        id,
                        nvert,
                    });
                };
                *total += w;
            }
        }

        // every vertex needs positive coverage
        for (i, &total) in totals.iter().enumerate() {
            if f64::from(total) <= MINVAL {
                return Err(SkinError::ZeroWeightVertex {
                    skin: self.name.clone(),
                    index: i,
                });
            }
        }

        // normalize weights so each vertex sums to one
        for bone in &mut self.bones {
            for (&id, w) in bone.vertid.iter().zip(&mut bone.vertweight) {
                *w /= totals[id as usize];
            }
        }

        // normalize bind quaternions
        for bone in &mut self.bones {
            let q = Quaternion::new(
                f64::from(bone.bindquat[0]),
                f64::from(bone.bindquat[1]),
                f64::from(bone.bindquat[2]),
                f64::from(bone.bindquat[3]),
            );
            let norm = q.norm();
            let q = if norm < MINVAL {
                Quaternion::new(1.0, 0.0, 0.0, 0.0)
            } else {
                q / norm
            };
            bone.bindquat = [q.w as f32, q.i as f32, q.j as f32, q.k as f32];
        }

        self.compiled = true;
        Ok(())
    }

    fn io(&self, source: IoError) -> SkinError {
        SkinError::Io {
            skin: self.name.clone(),
            source,
        }
    }

    fn missing(&self, what: &'static str) -> SkinError {
        SkinError::MissingSkinData {
            skin: self.name.clone(),
            what,
        }
    }

    // ---- accessors ---------------------------------------------------

    /// Vertex positions, xyz per vertex.
    #[must_use]
    pub fn vertices(&self) -> &[f32] {
        &self.vert
    }

    /// Texture coordinates, uv per vertex.
    #[must_use]
    pub fn texcoords(&self) -> &[f32] {
        &self.texcoord
    }

    /// Triangle vertex indices.
    #[must_use]
    pub fn faces(&self) -> &[u32] {
        &self.face
    }

    /// Bones with bind poses and (after compile) normalized weights.
    #[must_use]
    pub fn bones(&self) -> &[SkinBone] {
        &self.bones
    }

    /// Resolved body ids, parallel to [`bones`](Self::bones).
    #[must_use]
    pub fn body_ids(&self) -> &[usize] {
        &self.bodyid
    }

    /// Resolved material id, if a material was named.
    #[must_use]
    pub fn material_id(&self) -> Option<usize> {
        self.matid
    }

    /// Whether compile has run.
    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.compiled
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::catalog::NameCatalog;
    use approx::assert_relative_eq;

    fn catalog() -> NameCatalog {
        let mut c = NameCatalog::new();
        c.add_body("torso");
        c.add_body("arm");
        c.add_material("cloth");
        c
    }

    fn bone(body: &str, vertid: &[u32], weights: &[f32]) -> SkinBone {
        SkinBone {
            body: body.to_string(),
            bindpos: [0.0; 3],
            bindquat: [1.0, 0.0, 0.0, 0.0],
            vertid: vertid.to_vec(),
            vertweight: weights.to_vec(),
        }
    }

    fn triangle_skin() -> SkinAsset {
        let mut skin = SkinAsset::new("patch");
        skin.set_vertices(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        skin.set_faces(vec![0, 1, 2]);
        skin
    }

    #[test]
    fn weights_normalize_across_bones() {
        let mut skin = triangle_skin();
        skin.set_bones(vec![
            bone("torso", &[0, 1, 2], &[1.0, 2.0, 1.0]),
            bone("arm", &[0, 1, 2], &[2.0, 2.0, 3.0]),
        ]);
        skin.compile(None, &catalog(), false).unwrap();

        let bones = skin.bones();
        assert_relative_eq!(bones[0].vertweight[0], 1.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(bones[1].vertweight[0], 2.0 / 3.0, epsilon = 1e-6);
        // per-vertex totals are one
        for v in 0..3 {
            let total: f32 = bones
                .iter()
                .flat_map(|b| b.vertid.iter().zip(&b.vertweight))
                .filter(|(&id, _)| id == v)
                .map(|(_, &w)| w)
                .sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn unknown_body_rejected() {
        let mut skin = triangle_skin();
        skin.set_bones(vec![bone("tail", &[0, 1, 2], &[1.0; 3])]);
        let err = skin.compile(None, &catalog(), false).unwrap_err();
        assert!(matches!(err, SkinError::UnknownBody { .. }));
    }

    #[test]
    fn material_resolution() {
        let mut skin = triangle_skin();
        skin.set_bones(vec![bone("torso", &[0, 1, 2], &[1.0; 3])]);
        skin.set_material("cloth");
        skin.compile(None, &catalog(), false).unwrap();
        assert_eq!(skin.material_id(), Some(0));
    }

    #[test]
    fn empty_material_is_none() {
        let mut skin = triangle_skin();
        skin.set_bones(vec![bone("torso", &[0, 1, 2], &[1.0; 3])]);
        skin.set_material("");
        skin.compile(None, &catalog(), false).unwrap();
        assert_eq!(skin.material_id(), None);
    }

    #[test]
    fn unknown_material_rejected() {
        let mut skin = triangle_skin();
        skin.set_bones(vec![bone("torso", &[0, 1, 2], &[1.0; 3])]);
        skin.set_material("velvet");
        let err = skin.compile(None, &catalog(), false).unwrap_err();
        assert!(matches!(err, SkinError::UnknownMaterial { .. }));
    }

    #[test]
    fn uncovered_vertex_rejected() {
        let mut skin = triangle_skin();
        skin.set_bones(vec![bone("torso", &[0, 1], &[1.0, 1.0])]);
        let err = skin.compile(None, &catalog(), false).unwrap_err();
        assert!(matches!(err, SkinError::ZeroWeightVertex { index: 2, .. }));
    }

    #[test]
    fn bone_weight_size_mismatch_rejected() {
        let mut skin = triangle_skin();
        skin.set_bones(vec![bone("torso", &[0, 1, 2], &[1.0, 1.0])]);
        let err = skin.compile(None, &catalog(), false).unwrap_err();
        assert!(matches!(err, SkinError::BoneWeightMismatch { bone: 0, .. }));
    }

    #[test]
    fn vertex_id_out_of_range_rejected() {
        let mut skin = triangle_skin();
        skin.set_bones(vec![bone("torso", &[0, 1, 7], &[1.0; 3])]);
        let err = skin.compile(None, &catalog(), false).unwrap_err();
        assert!(matches!(err, SkinError::VertexIdOutOfRange { id: 7, .. }));
    }

    #[test]
    fn bindquat_normalized() {
        let mut skin = triangle_skin();
        let mut b = bone("torso", &[0, 1, 2], &[1.0; 3]);
        b.bindquat = [2.0, 0.0, 0.0, 0.0];
        skin.set_bones(vec![b]);
        skin.compile(None, &catalog(), false).unwrap();
        assert_relative_eq!(skin.bones()[0].bindquat[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_bindquat_becomes_identity() {
        let mut skin = triangle_skin();
        let mut b = bone("torso", &[0, 1, 2], &[1.0; 3]);
        b.bindquat = [0.0; 4];
        skin.set_bones(vec![b]);
        skin.compile(None, &catalog(), false).unwrap();
        assert_eq!(skin.bones()[0].bindquat, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_data_rejected() {
        let mut skin = SkinAsset::new("hollow");
        let err = skin.compile(None, &catalog(), false).unwrap_err();
        assert!(matches!(
            err,
            SkinError::MissingSkinData { what: "vertex", .. }
        ));
    }

    #[test]
    fn compile_runs_once() {
        let mut skin = triangle_skin();
        skin.set_bones(vec![bone("torso", &[0, 1, 2], &[1.0; 3])]);
        skin.compile(None, &catalog(), false).unwrap();
        let err = skin.compile(None, &catalog(), false).unwrap_err();
        assert!(matches!(err, SkinError::AlreadyCompiled { .. }));
    }
}
