//! Mesh and skin asset file I/O for the simulation toolchain.
//!
//! This crate provides the loading side of the mesh compilation pipeline:
//!
//! - **STL** (Stereolithography) - Binary only
//! - **OBJ** (Wavefront) - ASCII, triangles and quads only
//! - **MSH** - Binary vertex/normal/texcoord/face dump
//! - **SKN** - Binary skinned-mesh format with bone bindings
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no engine dependencies. Loaders are pure
//! functions over byte slices, so they can be driven from a virtual file
//! system, a network buffer, or the host filesystem alike. The [`Vfs`]
//! facade provides the uniform borrowed/owned buffer access the compile
//! pipeline expects.
//!
//! # Example
//!
//! ```no_run
//! use simmesh_io::{open, load_stl};
//!
//! let bytes = open(None, "model.stl").unwrap();
//! let data = load_stl(&bytes, true).unwrap();
//! println!("loaded {} faces", data.face.len() / 3);
//! ```
//!
//! # Handedness
//!
//! Every loader takes a `righthanded` flag derived from the sign of the
//! caller's scale product. Left-handed loads swap the second and third
//! vertex of each triangle so outward-normal orientation stays consistent
//! after the scale is applied.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod data;
mod error;
mod msh;
mod obj;
mod skn;
mod stl;
mod vfs;

pub use data::{MeshData, SkinBone, SkinData};
pub use error::{IoError, IoResult};
pub use msh::load_msh;
pub use obj::load_obj;
pub use skn::load_skn;
pub use stl::load_stl;
pub use vfs::{open, Vfs};

/// Degeneracy threshold shared across the compile pipeline.
///
/// Areas, volumes, and squared normal lengths below this value are treated
/// as zero.
pub const MINVAL: f64 = 1e-15;

/// Supported asset file formats, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFileFormat {
    /// Binary STL.
    Stl,
    /// Wavefront OBJ (triangles and quads only).
    Obj,
    /// Binary MSH vertex/normal/texcoord/face dump.
    Msh,
    /// Binary SKN skinned mesh.
    Skn,
}

impl MeshFileFormat {
    /// Detect format from a file extension, case-insensitively.
    ///
    /// Returns `None` if the path has no extension or the extension is not
    /// recognized.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = std::path::Path::new(path)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match ext.as_str() {
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            "msh" => Some(Self::Msh),
            "skn" => Some(Self::Skn),
            _ => None,
        }
    }
}

/// Strip directory components from a path, leaving the file name.
///
/// Both `/` and `\` separators are recognized, matching the loosest form
/// the model files in the wild use.
#[must_use]
pub fn strip_path(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_path() {
        assert_eq!(MeshFileFormat::from_path("model.stl"), Some(MeshFileFormat::Stl));
        assert_eq!(MeshFileFormat::from_path("model.STL"), Some(MeshFileFormat::Stl));
        assert_eq!(MeshFileFormat::from_path("a/b/model.obj"), Some(MeshFileFormat::Obj));
        assert_eq!(MeshFileFormat::from_path("model.Msh"), Some(MeshFileFormat::Msh));
        assert_eq!(MeshFileFormat::from_path("rig.skn"), Some(MeshFileFormat::Skn));
        assert_eq!(MeshFileFormat::from_path("model.ply"), None);
        assert_eq!(MeshFileFormat::from_path("model"), None);
        assert_eq!(MeshFileFormat::from_path(""), None);
    }

    #[test]
    fn strip_path_variants() {
        assert_eq!(strip_path("assets/meshes/cube.stl"), "cube.stl");
        assert_eq!(strip_path("assets\\meshes\\cube.stl"), "cube.stl");
        assert_eq!(strip_path("cube.stl"), "cube.stl");
        assert_eq!(strip_path(""), "");
    }
}
