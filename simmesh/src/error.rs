//! Error types for mesh and skin compilation.

use simmesh_hull::HullFault;
use simmesh_io::IoError;
use thiserror::Error;

/// Result type for mesh compilation.
pub type MeshResult<T> = Result<T, MeshError>;

/// Result type for skin compilation.
pub type SkinResult<T> = Result<T, SkinError>;

/// Errors raised while compiling a mesh asset.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Failure opening or parsing the backing file.
    #[error("mesh '{mesh}': {source}")]
    Io {
        /// Name of the mesh being compiled.
        mesh: String,
        /// Underlying I/O error.
        #[source]
        source: IoError,
    },

    /// No vertex data after folding files and staging buffers.
    #[error("mesh '{mesh}' has no vertices")]
    NoVertices {
        /// Name of the mesh being compiled.
        mesh: String,
    },

    /// Fewer than four vertices.
    #[error("mesh '{mesh}' needs at least 4 vertices, got {count}")]
    TooFewVertices {
        /// Name of the mesh being compiled.
        mesh: String,
        /// Vertex count found.
        count: usize,
    },

    /// A staging array's length is not a multiple of its stride.
    #[error("mesh '{mesh}': {array} data length {len} must be a multiple of {stride}")]
    NotMultipleOfStride {
        /// Name of the mesh being compiled.
        mesh: String,
        /// Which staging array.
        array: &'static str,
        /// Length found.
        len: usize,
        /// Required stride.
        stride: usize,
    },

    /// The same array was supplied both by a file and by the caller.
    #[error("mesh '{mesh}': repeated {array} specification")]
    RepeatedSpecification {
        /// Name of the mesh being compiled.
        mesh: String,
        /// Which array was specified twice.
        array: &'static str,
    },

    /// A face index points past the vertex array.
    #[error("mesh '{mesh}': face index {index} out of range (nvert = {nvert})")]
    IndexOutOfRange {
        /// Name of the mesh being compiled.
        mesh: String,
        /// The offending index.
        index: u32,
        /// Vertex count at the time of the check.
        nvert: usize,
    },

    /// Face normal indices do not cover every face corner.
    #[error("mesh '{mesh}': face normal data length {got} must equal 3*nface = {expected}")]
    FaceDataMismatch {
        /// Name of the mesh being compiled.
        mesh: String,
        /// Required length.
        expected: usize,
        /// Length found.
        got: usize,
    },

    /// Two faces share a directed edge in the same winding.
    #[error(
        "faces of mesh '{mesh}' have inconsistent orientation; check the faces \
         containing vertices {v1} and {v2}"
    )]
    InconsistentOrientation {
        /// Name of the mesh being compiled.
        mesh: String,
        /// First vertex of the duplicated edge, 1-based.
        v1: u32,
        /// Second vertex of the duplicated edge, 1-based.
        v2: u32,
    },

    /// Total face area fell below the degeneracy threshold.
    #[error("mesh '{mesh}': surface area is too small")]
    AreaTooSmall {
        /// Name of the mesh being compiled.
        mesh: String,
    },

    /// Enclosed volume fell below the degeneracy threshold.
    #[error("mesh '{mesh}': volume is too small")]
    VolumeTooSmall {
        /// Name of the mesh being compiled.
        mesh: String,
    },

    /// The inertia tensor has a non-positive eigenvalue.
    #[error("mesh '{mesh}': inertia eigenvalues must be positive")]
    NonPositiveEigenvalue {
        /// Name of the mesh being compiled.
        mesh: String,
    },

    /// The inertia eigenvalues violate the triangle inequality.
    #[error("mesh '{mesh}': inertia eigenvalues violate A + B >= C")]
    EigenvalueInequality {
        /// Name of the mesh being compiled.
        mesh: String,
    },

    /// The hull engine aborted.
    #[error("mesh '{mesh}': convex hull failed: {source}")]
    HullFailed {
        /// Name of the mesh being compiled.
        mesh: String,
        /// The engine's fault payload.
        #[source]
        source: HullFault,
    },

    /// `compile` was called a second time.
    #[error("mesh '{mesh}' is already compiled")]
    AlreadyCompiled {
        /// Name of the mesh.
        mesh: String,
    },
}

/// Errors raised while compiling a skin asset.
#[derive(Debug, Error)]
pub enum SkinError {
    /// Failure opening or parsing the backing file.
    #[error("skin '{skin}': {source}")]
    Io {
        /// Name of the skin being compiled.
        skin: String,
        /// Underlying I/O error.
        #[source]
        source: IoError,
    },

    /// Staging data was already present when a file load was requested.
    #[error("skin '{skin}': data already exists, trying to load from skin file")]
    RepeatedSpecification {
        /// Name of the skin being compiled.
        skin: String,
    },

    /// A required array is missing after loading.
    #[error("skin '{skin}': missing {what} data")]
    MissingSkinData {
        /// Name of the skin being compiled.
        skin: String,
        /// Which array is missing.
        what: &'static str,
    },

    /// A staging array's length is not a multiple of its stride.
    #[error("skin '{skin}': {array} data length {len} must be a multiple of {stride}")]
    NotMultipleOfStride {
        /// Name of the skin being compiled.
        skin: String,
        /// Which staging array.
        array: &'static str,
        /// Length found.
        len: usize,
        /// Required stride.
        stride: usize,
    },

    /// Two arrays that must agree in size do not.
    #[error("skin '{skin}': {what} size {got}, expected {expected}")]
    SizeMismatch {
        /// Name of the skin being compiled.
        skin: String,
        /// Which relation failed.
        what: &'static str,
        /// Required size.
        expected: usize,
        /// Size found.
        got: usize,
    },

    /// A bone references a body the catalog does not know.
    #[error("skin '{skin}': unknown body '{body}'")]
    UnknownBody {
        /// Name of the skin being compiled.
        skin: String,
        /// The unresolved body name.
        body: String,
    },

    /// The skin references a material the catalog does not know.
    #[error("skin '{skin}': unknown material '{material}'")]
    UnknownMaterial {
        /// Name of the skin being compiled.
        skin: String,
        /// The unresolved material name.
        material: String,
    },

    /// A bone's vertex ids and weights disagree in size, or are empty.
    #[error("skin '{skin}': bone {bone} vertid and vertweight must have the same non-zero size")]
    BoneWeightMismatch {
        /// Name of the skin being compiled.
        skin: String,
        /// Index of the offending bone.
        bone: usize,
    },

    /// A bone influences a vertex past the vertex array.
    #[error("skin '{skin}': bone {bone} vertex id {id} out of range (nvert = {nvert})")]
    VertexIdOutOfRange {
        /// Name of the skin being compiled.
        skin: String,
        /// Index of the offending bone.
        bone: usize,
        /// The offending vertex id.
        id: u32,
        /// Vertex count.
        nvert: usize,
    },

    /// A vertex ended up with no positive total weight.
    #[error("skin '{skin}': vertex {index} must have positive total weight")]
    ZeroWeightVertex {
        /// Name of the skin being compiled.
        skin: String,
        /// Index of the uncovered vertex.
        index: usize,
    },

    /// `compile` was called a second time.
    #[error("skin '{skin}' is already compiled")]
    AlreadyCompiled {
        /// Name of the skin.
        skin: String,
    },
}
