//! Mesh asset: staging, compilation, and frozen accessors.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use simmesh_hull::compute_hull;
use simmesh_io::{
    load_msh, load_obj, load_stl, open, strip_path, IoError, MeshData, MeshFileFormat, Vfs,
};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};
use crate::graph::{self, HullGraph};
use crate::{normals, process, topology};

/// Which mass distribution a derived quantity refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeshKind {
    /// Mass distributed through the enclosed volume (a solid).
    Volume,
    /// Mass distributed over the faces, weighted by area (a hollow shell).
    Shell,
}

/// Per-mesh compile options.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshOptions {
    /// Translation subtracted from all vertices before rotation.
    pub refpos: Vector3<f64>,
    /// Reference orientation (w, x, y, z); its inverse is applied to
    /// vertices and normals. Normalized before use.
    pub refquat: [f64; 4],
    /// Per-axis scaling. A negative component product flips winding.
    pub scale: Vector3<f64>,
    /// Keep large-angle face contributions when synthesizing vertex
    /// normals.
    pub smoothnormal: bool,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            refpos: Vector3::zeros(),
            refquat: [1.0, 0.0, 0.0, 0.0],
            scale: Vector3::new(1.0, 1.0, 1.0),
            smoothnormal: false,
        }
    }
}

/// Model-level compile settings shared by every mesh.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompileSettings {
    /// Build the convex hull graph for meshes that request one.
    pub convexhull: bool,
    /// Keep signed per-triangle volumes. When false, volumes are taken in
    /// absolute value, which avoids negative masses on non-watertight
    /// meshes at the cost of wrong inertia.
    pub exactmeshinertia: bool,
    /// Strip directory components from mesh file paths.
    pub strippath: bool,
    /// Size fitted primitives from the axis-aligned bounding box instead
    /// of the equivalent inertia box.
    pub fitaabb: bool,
    /// Mass density used for inertia, kg/m^3.
    pub density: f64,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            convexhull: true,
            exactmeshinertia: false,
            strippath: false,
            fitaabb: false,
            density: 1000.0,
        }
    }
}

/// A triangle mesh asset.
///
/// The asset is staged from a file and/or caller-supplied arrays, then
/// frozen by [`compile`](Self::compile). Derived accessors go through
/// [`check`](Self::check), which reports the first recorded defect of a
/// compiled mesh.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    name: String,
    file: Option<String>,
    pub(crate) options: MeshOptions,
    needhull: bool,

    // staging, caller-writable before compile
    user_vert: Vec<f32>,
    user_normal: Vec<f32>,
    user_texcoord: Vec<f32>,
    user_face: Vec<u32>,
    user_facenormal: Vec<u32>,
    user_facetexcoord: Vec<u32>,

    // frozen storage
    pub(crate) vert: Vec<[f32; 3]>,
    pub(crate) normal: Vec<[f32; 3]>,
    pub(crate) texcoord: Vec<[f32; 2]>,
    pub(crate) face: Vec<[u32; 3]>,
    pub(crate) facenormal: Vec<[u32; 3]>,
    pub(crate) facetexcoord: Vec<[u32; 3]>,
    graph: Option<HullGraph>,

    // derived quantities
    pub(crate) surface: f64,
    pub(crate) volume: f64,
    pub(crate) pos_volume: Vector3<f64>,
    pub(crate) pos_surface: Vector3<f64>,
    pub(crate) quat_volume: UnitQuaternion<f64>,
    pub(crate) quat_surface: UnitQuaternion<f64>,
    pub(crate) boxsz_volume: Vector3<f64>,
    pub(crate) boxsz_surface: Vector3<f64>,
    pub(crate) aabb: [f64; 6],

    // validity, deferred to the first accessor
    invalid_orientation: Option<(u32, u32)>,
    pub(crate) valid_area: bool,
    pub(crate) valid_volume: bool,
    pub(crate) valid_eigenvalue: bool,
    pub(crate) valid_inequality: bool,
    processed: bool,
}

impl MeshAsset {
    /// Create an empty asset with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            options: MeshOptions::default(),
            needhull: false,
            user_vert: Vec::new(),
            user_normal: Vec::new(),
            user_texcoord: Vec::new(),
            user_face: Vec::new(),
            user_facenormal: Vec::new(),
            user_facetexcoord: Vec::new(),
            vert: Vec::new(),
            normal: Vec::new(),
            texcoord: Vec::new(),
            face: Vec::new(),
            facenormal: Vec::new(),
            facetexcoord: Vec::new(),
            graph: None,
            surface: 0.0,
            volume: 0.0,
            pos_volume: Vector3::zeros(),
            pos_surface: Vector3::zeros(),
            quat_volume: UnitQuaternion::identity(),
            quat_surface: UnitQuaternion::identity(),
            boxsz_volume: Vector3::zeros(),
            boxsz_surface: Vector3::zeros(),
            aabb: [1e10, 1e10, 1e10, -1e10, -1e10, -1e10],
            invalid_orientation: None,
            valid_area: true,
            valid_volume: true,
            valid_eigenvalue: true,
            valid_inequality: true,
            processed: false,
        }
    }

    /// Create an asset backed by a mesh file.
    #[must_use]
    pub fn from_file(name: impl Into<String>, file: impl Into<String>) -> Self {
        let mut mesh = Self::new(name);
        mesh.file = Some(file.into());
        mesh
    }

    /// Name of this asset, used in error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing file path, if any.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Set the backing file path.
    pub fn set_file(&mut self, file: impl Into<String>) {
        self.file = Some(file.into());
    }

    /// Compile options for this mesh.
    #[must_use]
    pub fn options(&self) -> &MeshOptions {
        &self.options
    }

    /// Mutable compile options; meaningful before compile only.
    pub fn options_mut(&mut self) -> &mut MeshOptions {
        &mut self.options
    }

    /// Request a convex hull graph even when face data exists.
    pub fn request_hull(&mut self) {
        self.needhull = true;
    }

    /// Whether a hull graph was requested.
    #[must_use]
    pub fn hull_requested(&self) -> bool {
        self.needhull
    }

    /// Stage vertex positions, xyz per vertex.
    pub fn set_vertices(&mut self, vert: Vec<f32>) {
        self.user_vert = vert;
    }

    /// Stage vertex normals, xyz per normal.
    pub fn set_normals(&mut self, normal: Vec<f32>) {
        self.user_normal = normal;
    }

    /// Stage texture coordinates, uv per vertex.
    pub fn set_texcoords(&mut self, texcoord: Vec<f32>) {
        self.user_texcoord = texcoord;
    }

    /// Stage triangle vertex indices.
    pub fn set_faces(&mut self, face: Vec<u32>) {
        self.user_face = face;
    }

    /// Stage per-corner normal indices.
    pub fn set_face_normals(&mut self, facenormal: Vec<u32>) {
        self.user_facenormal = facenormal;
    }

    /// Stage per-corner texture coordinate indices.
    pub fn set_face_texcoords(&mut self, facetexcoord: Vec<u32>) {
        self.user_facetexcoord = facetexcoord;
    }

    /// Compile the asset: load the backing file, fold staging buffers,
    /// canonicalize topology, build the hull graph if needed, synthesize
    /// normals, and compute mass properties in the principal frame.
    ///
    /// Runs at most once per asset; a second call fails with
    /// [`MeshError::AlreadyCompiled`]. Staging buffers are consumed when
    /// the data came from a file and copied when caller-supplied.
    ///
    /// # Errors
    ///
    /// Returns structural errors immediately (file problems, bad staging
    /// sizes, out-of-range indices, hull failure). Geometric defects
    /// (tiny area or volume, bad eigenvalues, inconsistent orientation)
    /// only clear validity flags here; the first derived accessor
    /// reports them through [`check`](Self::check).
    pub fn compile(&mut self, vfs: Option<&Vfs>, settings: &CompileSettings) -> MeshResult<()> {
        if self.processed {
            return Err(MeshError::AlreadyCompiled {
                mesh: self.name.clone(),
            });
        }

        // load the backing file, if any
        let mut loaded = MeshData::default();
        let mut from_file = false;
        if let Some(file) = self.file.clone() {
            let file = if settings.strippath {
                strip_path(&file).to_string()
            } else {
                file
            };
            loaded = self.load_file(vfs, &file)?;
            self.file = Some(file);
            from_file = true;
        }

        let mut edges = std::mem::take(&mut loaded.edge);

        // fold staging arrays over the loaded data
        self.fold_vertices(&mut loaded, from_file)?;
        self.fold_normals(&mut loaded, from_file)?;
        self.fold_texcoords(&mut loaded, from_file)?;
        self.fold_faces(&mut loaded, from_file, &mut edges)?;

        // inconsistent winding is recorded, not fatal; the first accessor
        // reports it
        self.invalid_orientation = topology::inconsistent_edge(&mut edges);

        if self.vert.is_empty() {
            return Err(MeshError::NoVertices {
                mesh: self.name.clone(),
            });
        }

        // hull graph, also the face source when no faces were supplied
        if (settings.convexhull && self.needhull) || self.face.is_empty() {
            self.make_graph()?;
        }
        if self.face.is_empty() {
            return Err(MeshError::TooFewVertices {
                mesh: self.name.clone(),
                count: self.vert.len(),
            });
        }

        normals::make_normal(self);
        self.fold_face_normals(from_file)?;
        self.fold_face_texcoords(from_file)?;
        if self.facenormal.is_empty() {
            self.facenormal = self.face.clone();
        }

        process::process(self, settings)?;
        self.processed = true;
        Ok(())
    }

    fn load_file(&mut self, vfs: Option<&Vfs>, file: &str) -> MeshResult<MeshData> {
        let scale = self.options.scale;
        let righthanded = scale.x * scale.y * scale.z > 0.0;

        // dispatch on the extension before touching any file source
        let format = MeshFileFormat::from_path(file);
        let loader: fn(&[u8], bool) -> simmesh_io::IoResult<MeshData> = match format {
            Some(MeshFileFormat::Stl) => load_stl,
            Some(MeshFileFormat::Obj) => load_obj,
            Some(MeshFileFormat::Msh) => load_msh,
            _ => {
                return Err(self.io(IoError::UnknownExtension {
                    path: file.to_string(),
                }))
            }
        };

        let bytes = open(vfs, file).map_err(|e| self.io(e))?;
        let mut data = loader(&bytes, righthanded).map_err(|e| self.io(e))?;

        // STL emits three copies per triangle; collapse them here
        if format == Some(MeshFileFormat::Stl) {
            let removed = topology::remove_repeated(&mut data);
            if removed > 0 {
                debug!(mesh = %self.name, removed, "deduplicated repeated vertices");
            }
        }

        Ok(data)
    }

    fn io(&self, source: IoError) -> MeshError {
        MeshError::Io {
            mesh: self.name.clone(),
            source,
        }
    }

    fn fold_vertices(&mut self, loaded: &mut MeshData, from_file: bool) -> MeshResult<()> {
        if !self.user_vert.is_empty() {
            if !loaded.vert.is_empty() {
                return Err(self.repeated("vertex"));
            }
            if self.user_vert.len() < 12 {
                return Err(MeshError::TooFewVertices {
                    mesh: self.name.clone(),
                    count: self.user_vert.len() / 3,
                });
            }
            if self.user_vert.len() % 3 != 0 {
                return Err(self.bad_stride("vertex", self.user_vert.len(), 3));
            }
            loaded.vert = if from_file {
                std::mem::take(&mut self.user_vert)
            } else {
                self.user_vert.clone()
            };
        }

        self.vert = loaded
            .vert
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(())
    }

    fn fold_normals(&mut self, loaded: &mut MeshData, from_file: bool) -> MeshResult<()> {
        if !self.user_normal.is_empty() {
            if !loaded.normal.is_empty() {
                return Err(self.repeated("normal"));
            }
            if self.user_normal.len() % 3 != 0 {
                return Err(self.bad_stride("normal", self.user_normal.len(), 3));
            }
            loaded.normal = if from_file {
                std::mem::take(&mut self.user_normal)
            } else {
                self.user_normal.clone()
            };
        }

        self.normal = loaded
            .normal
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(())
    }

    fn fold_texcoords(&mut self, loaded: &mut MeshData, from_file: bool) -> MeshResult<()> {
        if !self.user_texcoord.is_empty() {
            if !loaded.texcoord.is_empty() {
                return Err(self.repeated("texcoord"));
            }
            if self.user_texcoord.len() % 2 != 0 {
                return Err(self.bad_stride("texcoord", self.user_texcoord.len(), 2));
            }
            loaded.texcoord = if from_file {
                std::mem::take(&mut self.user_texcoord)
            } else {
                self.user_texcoord.clone()
            };
        }

        self.texcoord = loaded
            .texcoord
            .chunks_exact(2)
            .map(|c| [c[0], c[1]])
            .collect();
        Ok(())
    }

    fn fold_faces(
        &mut self,
        loaded: &mut MeshData,
        from_file: bool,
        edges: &mut Vec<(u32, u32)>,
    ) -> MeshResult<()> {
        if !self.user_face.is_empty() {
            if !loaded.face.is_empty() {
                return Err(self.repeated("face"));
            }
            if self.user_face.len() % 3 != 0 {
                return Err(self.bad_stride("face", self.user_face.len(), 3));
            }

            let face = if from_file {
                std::mem::take(&mut self.user_face)
            } else {
                self.user_face.clone()
            };
            for &idx in &face {
                if idx as usize >= self.vert.len() {
                    return Err(MeshError::IndexOutOfRange {
                        mesh: self.name.clone(),
                        index: idx,
                        nvert: self.vert.len(),
                    });
                }
            }
            loaded.face = face;

            // faces without staged edges came from the caller; build the
            // directed-edge multiset for the orientation check
            if edges.is_empty() {
                edges.extend(topology::edges_from_faces(&self.vert, &loaded.face));
            }
        }

        self.face = loaded
            .face
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        self.facenormal = loaded
            .facenormal
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        self.facetexcoord = loaded
            .facetexcoord
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(())
    }

    fn fold_face_normals(&mut self, from_file: bool) -> MeshResult<()> {
        if self.user_facenormal.is_empty() {
            return Ok(());
        }
        if !self.facenormal.is_empty() {
            return Err(self.repeated("facenormal"));
        }
        if self.user_facenormal.len() != 3 * self.face.len() {
            return Err(MeshError::FaceDataMismatch {
                mesh: self.name.clone(),
                expected: 3 * self.face.len(),
                got: self.user_facenormal.len(),
            });
        }

        let data = if from_file {
            std::mem::take(&mut self.user_facenormal)
        } else {
            self.user_facenormal.clone()
        };
        self.facenormal = data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Ok(())
    }

    fn fold_face_texcoords(&mut self, from_file: bool) -> MeshResult<()> {
        if self.user_facetexcoord.is_empty() {
            return Ok(());
        }
        if !self.facetexcoord.is_empty() {
            return Err(self.repeated("facetexcoord"));
        }
        if self.user_facetexcoord.len() % 3 != 0 {
            return Err(self.bad_stride(
                "facetexcoord",
                self.user_facetexcoord.len(),
                3,
            ));
        }

        let data = if from_file {
            std::mem::take(&mut self.user_facetexcoord)
        } else {
            self.user_facetexcoord.clone()
        };
        self.facetexcoord = data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Ok(())
    }

    fn repeated(&self, array: &'static str) -> MeshError {
        MeshError::RepeatedSpecification {
            mesh: self.name.clone(),
            array,
        }
    }

    fn bad_stride(&self, array: &'static str, len: usize, stride: usize) -> MeshError {
        MeshError::NotMultipleOfStride {
            mesh: self.name.clone(),
            array,
            len,
            stride,
        }
    }

    /// Build the hull graph; when no faces exist, derive them from the
    /// hull facets.
    fn make_graph(&mut self) -> MeshResult<()> {
        // no graph for meshes below the simplex size
        if self.vert.len() < 4 {
            return Ok(());
        }

        let points: Vec<Point3<f64>> = self
            .vert
            .iter()
            .map(|v| Point3::from(process::to_f64(v)))
            .collect();

        let hull = compute_hull(&points).map_err(|source| MeshError::HullFailed {
            mesh: self.name.clone(),
            source,
        })?;

        if self.face.is_empty() {
            self.face = graph::faces_from_hull(&hull);
        }
        let graph = graph::encode(&self.name, &hull, self.vert.len());
        self.graph = graph;
        Ok(())
    }

    // ---- validity and derived accessors ------------------------------

    /// Report the first recorded defect of a compiled mesh.
    ///
    /// An uncompiled mesh passes: its derived state is simply zeroed, and
    /// model assembly probes meshes before compiling them.
    ///
    /// # Errors
    ///
    /// Orientation, area, volume, eigenvalue, and triangle-inequality
    /// defects, in that order.
    pub fn check(&self) -> MeshResult<()> {
        if !self.processed {
            return Ok(());
        }
        if let Some((v1, v2)) = self.invalid_orientation {
            return Err(MeshError::InconsistentOrientation {
                mesh: self.name.clone(),
                v1,
                v2,
            });
        }
        if !self.valid_area {
            return Err(MeshError::AreaTooSmall {
                mesh: self.name.clone(),
            });
        }
        if !self.valid_volume {
            return Err(MeshError::VolumeTooSmall {
                mesh: self.name.clone(),
            });
        }
        if !self.valid_eigenvalue {
            return Err(MeshError::NonPositiveEigenvalue {
                mesh: self.name.clone(),
            });
        }
        if !self.valid_inequality {
            return Err(MeshError::EigenvalueInequality {
                mesh: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Enclosed volume.
    ///
    /// # Errors
    ///
    /// See [`check`](Self::check).
    pub fn volume(&self) -> MeshResult<f64> {
        self.check()?;
        Ok(self.volume)
    }

    /// Total face area.
    ///
    /// # Errors
    ///
    /// See [`check`](Self::check).
    pub fn surface_area(&self) -> MeshResult<f64> {
        self.check()?;
        Ok(self.surface)
    }

    /// Center of mass in the pre-compile frame.
    ///
    /// # Errors
    ///
    /// See [`check`](Self::check).
    pub fn pos(&self, kind: MeshKind) -> MeshResult<Vector3<f64>> {
        self.check()?;
        Ok(match kind {
            MeshKind::Volume => self.pos_volume,
            MeshKind::Shell => self.pos_surface,
        })
    }

    /// Rotation from the input frame to the principal frame.
    ///
    /// # Errors
    ///
    /// See [`check`](Self::check).
    pub fn quat(&self, kind: MeshKind) -> MeshResult<UnitQuaternion<f64>> {
        self.check()?;
        Ok(match kind {
            MeshKind::Volume => self.quat_volume,
            MeshKind::Shell => self.quat_surface,
        })
    }

    /// Half-extents of the equivalent inertia box.
    ///
    /// # Errors
    ///
    /// See [`check`](Self::check).
    pub fn inertia_box(&self, kind: MeshKind) -> MeshResult<Vector3<f64>> {
        self.check()?;
        Ok(match kind {
            MeshKind::Volume => self.boxsz_volume,
            MeshKind::Shell => self.boxsz_surface,
        })
    }

    /// Axis-aligned bounding box in the principal frame, as
    /// `(min.x, min.y, min.z, max.x, max.y, max.z)`.
    ///
    /// # Errors
    ///
    /// See [`check`](Self::check).
    pub fn aabb(&self) -> MeshResult<[f64; 6]> {
        self.check()?;
        Ok(self.aabb)
    }

    // ---- raw data accessors ------------------------------------------

    /// Compiled vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vert
    }

    /// Compiled vertex normals.
    #[must_use]
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normal
    }

    /// Compiled texture coordinates.
    #[must_use]
    pub fn texcoords(&self) -> &[[f32; 2]] {
        &self.texcoord
    }

    /// Compiled triangle faces.
    #[must_use]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.face
    }

    /// Per-corner normal indices.
    #[must_use]
    pub fn face_normals(&self) -> &[[u32; 3]] {
        &self.facenormal
    }

    /// Per-corner texture coordinate indices.
    #[must_use]
    pub fn face_texcoords(&self) -> &[[u32; 3]] {
        &self.facetexcoord
    }

    /// Convex hull graph, if one was built and survived validation.
    #[must_use]
    pub fn graph(&self) -> Option<&HullGraph> {
        self.graph.as_ref()
    }

    /// The duplicated directed edge found by the orientation check,
    /// 1-based, if any.
    #[must_use]
    pub fn invalid_orientation(&self) -> Option<(u32, u32)> {
        self.invalid_orientation
    }

    /// Whether compile has run.
    #[must_use]
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    // ---- internal mutable access for the processing engine -----------

    pub(crate) fn pos_mut(&mut self, kind: MeshKind) -> &mut Vector3<f64> {
        match kind {
            MeshKind::Volume => &mut self.pos_volume,
            MeshKind::Shell => &mut self.pos_surface,
        }
    }

    pub(crate) fn quat_mut(&mut self, kind: MeshKind) -> &mut UnitQuaternion<f64> {
        match kind {
            MeshKind::Volume => &mut self.quat_volume,
            MeshKind::Shell => &mut self.quat_surface,
        }
    }

    pub(crate) fn boxsz_mut(&mut self, kind: MeshKind) -> &mut Vector3<f64> {
        match kind {
            MeshKind::Volume => &mut self.boxsz_volume,
            MeshKind::Shell => &mut self.boxsz_surface,
        }
    }

    pub(crate) fn volume_mut(&mut self, kind: MeshKind) -> &mut f64 {
        match kind {
            MeshKind::Volume => &mut self.volume,
            MeshKind::Shell => &mut self.surface,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn tetra_mesh() -> MeshAsset {
        let mut mesh = MeshAsset::new("tetra");
        mesh.set_vertices(vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ]);
        mesh.set_faces(vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3]);
        mesh
    }

    #[test]
    fn compile_runs_once() {
        let mut mesh = tetra_mesh();
        let settings = CompileSettings::default();
        mesh.compile(None, &settings).unwrap();
        assert!(mesh.is_processed());

        let err = mesh.compile(None, &settings).unwrap_err();
        assert!(matches!(err, MeshError::AlreadyCompiled { .. }));
    }

    #[test]
    fn user_staging_is_copied_not_consumed() {
        let mut mesh = tetra_mesh();
        mesh.compile(None, &CompileSettings::default()).unwrap();
        // caller-supplied buffers stay intact after compile
        assert_eq!(mesh.user_vert.len(), 12);
        assert_eq!(mesh.user_face.len(), 12);
    }

    #[test]
    fn too_few_vertices_rejected() {
        let mut mesh = MeshAsset::new("flat");
        mesh.set_vertices(vec![0.0; 9]);
        mesh.set_faces(vec![0, 1, 2]);
        let err = mesh.compile(None, &CompileSettings::default()).unwrap_err();
        assert!(matches!(err, MeshError::TooFewVertices { count: 3, .. }));
    }

    #[test]
    fn stride_validation() {
        let mut mesh = MeshAsset::new("ragged");
        mesh.set_vertices(vec![0.0; 13]);
        let err = mesh.compile(None, &CompileSettings::default()).unwrap_err();
        assert!(matches!(
            err,
            MeshError::NotMultipleOfStride { array: "vertex", .. }
        ));
    }

    #[test]
    fn face_index_out_of_range() {
        let mut mesh = MeshAsset::new("wild");
        mesh.set_vertices(vec![0.0; 12]);
        mesh.set_faces(vec![0, 1, 9]);
        let err = mesh.compile(None, &CompileSettings::default()).unwrap_err();
        assert!(matches!(err, MeshError::IndexOutOfRange { index: 9, .. }));
    }

    #[test]
    fn no_vertices_rejected() {
        let mut mesh = MeshAsset::new("void");
        let err = mesh.compile(None, &CompileSettings::default()).unwrap_err();
        assert!(matches!(err, MeshError::NoVertices { .. }));
    }

    #[test]
    fn unknown_extension_rejected() {
        let mut mesh = MeshAsset::from_file("weird", "model.ply");
        let mut vfs = Vfs::new();
        vfs.add_file("model.ply", vec![1, 2, 3]);
        let err = mesh
            .compile(Some(&vfs), &CompileSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            MeshError::Io {
                source: IoError::UnknownExtension { .. },
                ..
            }
        ));
    }

    #[test]
    fn faces_synthesized_from_hull_when_absent() {
        let mut mesh = MeshAsset::new("cloud");
        mesh.set_vertices(vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ]);
        mesh.compile(None, &CompileSettings::default()).unwrap();
        assert_eq!(mesh.faces().len(), 4);
        assert!(mesh.graph().is_some());
        // synthesized faces enclose positive volume
        assert!(mesh.volume().unwrap() > 0.0);
    }

    #[test]
    fn hull_failure_is_structured() {
        let mut mesh = MeshAsset::new("plane");
        // four coplanar points, no faces: the hull must run and fail
        mesh.set_vertices(vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            1.0, 1.0, 0.0,
        ]);
        let err = mesh.compile(None, &CompileSettings::default()).unwrap_err();
        assert!(matches!(err, MeshError::HullFailed { .. }));
    }

    #[test]
    fn facenormal_defaults_to_faces() {
        let mut mesh = tetra_mesh();
        // user normals suppress synthesis; facenormal then defaults to a
        // copy of the faces
        mesh.set_normals([0.0f32, 0.0, 1.0].repeat(4));
        mesh.compile(None, &CompileSettings::default()).unwrap();
        assert_eq!(mesh.face_normals(), mesh.faces());
    }

    #[test]
    fn uncompiled_accessors_read_zeroed_state() {
        let mesh = tetra_mesh();
        assert!(mesh.check().is_ok());
        assert_eq!(mesh.volume().unwrap(), 0.0);
        assert_eq!(mesh.aabb().unwrap()[0], 1e10);
    }
}
