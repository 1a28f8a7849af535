//! Binary MSH loader.
//!
//! # Format
//!
//! ```text
//! INT32[4]              – nvert, nnormal, ntexcoord, nface
//! REAL32[3*nvert]       – vertex positions
//! REAL32[3*nnormal]     – vertex normals (0 or nvert entries)
//! REAL32[2*ntexcoord]   – texture coordinates (0 or nvert entries)
//! INT32[3*nface]        – triangle vertex indices
//! ```
//!
//! The buffer must be exactly the size the header implies. Face normal and
//! face texcoord indices are copies of the face indices.

use crate::data::MeshData;
use crate::error::{IoError, IoResult};

fn read_i32(bytes: &[u8], off: usize) -> i32 {
    i32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
}

fn read_f32(bytes: &[u8], off: usize) -> f32 {
    f32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
}

/// Parse a binary MSH buffer.
///
/// Left-handed loads (`righthanded == false`) swap the second and third
/// vertex index of each face.
///
/// # Errors
///
/// Returns an error if the header is truncated, the sizes are inconsistent
/// (`nvert < 4`, `nnormal`/`ntexcoord` neither 0 nor `nvert`, negative
/// counts), or the buffer size disagrees with the header.
#[allow(clippy::cast_sign_loss)] // counts are checked non-negative before casting
pub fn load_msh(bytes: &[u8], righthanded: bool) -> IoResult<MeshData> {
    if bytes.len() < 16 {
        return Err(IoError::malformed_header(format!(
            "binary MSH needs at least 16 bytes, got {}",
            bytes.len()
        )));
    }

    let nvert = read_i32(bytes, 0);
    let nnormal = read_i32(bytes, 4);
    let ntexcoord = read_i32(bytes, 8);
    let nface = read_i32(bytes, 12);

    if nvert < 4
        || nface < 0
        || nnormal < 0
        || ntexcoord < 0
        || (nnormal > 0 && nnormal != nvert)
        || (ntexcoord > 0 && ntexcoord != nvert)
    {
        return Err(IoError::malformed_header(format!(
            "invalid MSH sizes: nvert={nvert} nnormal={nnormal} ntexcoord={ntexcoord} nface={nface}"
        )));
    }

    let (nvert, nnormal, ntexcoord, nface) = (
        nvert as usize,
        nnormal as usize,
        ntexcoord as usize,
        nface as usize,
    );

    let expected = 16 + 12 * nvert + 12 * nnormal + 8 * ntexcoord + 12 * nface;
    if bytes.len() != expected {
        return Err(IoError::SizeMismatch {
            expected,
            got: bytes.len(),
        });
    }

    let mut data = MeshData::default();
    let mut off = 16;

    data.vert = (0..3 * nvert)
        .map(|i| read_f32(bytes, off + 4 * i))
        .collect();
    off += 12 * nvert;

    if nnormal > 0 {
        data.normal = (0..3 * nnormal)
            .map(|i| read_f32(bytes, off + 4 * i))
            .collect();
        off += 12 * nnormal;
    }

    if ntexcoord > 0 {
        data.texcoord = (0..2 * ntexcoord)
            .map(|i| read_f32(bytes, off + 4 * i))
            .collect();
        off += 8 * ntexcoord;
    }

    if nface > 0 {
        data.face = (0..3 * nface)
            .map(|i| read_i32(bytes, off + 4 * i) as u32)
            .collect();
        // facenormal and facetexcoord are copies of the face indices
        data.facenormal = data.face.clone();
        if ntexcoord > 0 {
            data.facetexcoord = data.face.clone();
        }

        if !righthanded {
            for f in data.face.chunks_exact_mut(3) {
                f.swap(1, 2);
            }
        }
    }

    Ok(data)
}
