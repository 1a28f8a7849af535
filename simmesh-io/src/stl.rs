//! Binary STL loader.
//!
//! # Format
//!
//! ```text
//! UINT8[80]    – Header (ignored)
//! UINT32       – Number of triangles N, 1..=200000
//! foreach triangle (50 bytes)
//!     REAL32[3] – Normal vector (discarded)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (discarded)
//! end
//! ```
//!
//! The total buffer must be exactly `84 + 50·N` bytes. Vertices are emitted
//! naively (three copies per triangle); the compile pipeline deduplicates
//! them afterwards.

use crate::data::MeshData;
use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle record (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Largest supported triangle count.
const MAX_FACES: u32 = 200_000;

/// Maximum vertex coordinate magnitude (safe integer cast bound).
const MAX_COORD: f32 = 1_073_741_824.0; // 2^30

/// Parse a binary STL buffer.
///
/// Left-handed loads (`righthanded == false`) swap the second and third
/// vertex of each triangle.
///
/// # Errors
///
/// Returns an error if the header is truncated, the triangle count is
/// outside `1..=200000`, the buffer size disagrees with the count, or any
/// coordinate is NaN, infinite, or larger than 2^30 in magnitude.
pub fn load_stl(bytes: &[u8], righthanded: bool) -> IoResult<MeshData> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(IoError::malformed_header(format!(
            "binary STL needs at least {} bytes, got {}",
            HEADER_SIZE + 4,
            bytes.len()
        )));
    }

    let nface = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);
    if nface < 1 || nface > MAX_FACES {
        return Err(IoError::FaceCountOutOfRange { count: nface });
    }

    let nface = nface as usize;
    let expected = HEADER_SIZE + 4 + nface * TRIANGLE_SIZE;
    if bytes.len() != expected {
        return Err(IoError::SizeMismatch {
            expected,
            got: bytes.len(),
        });
    }

    let mut data = MeshData {
        vert: Vec::with_capacity(9 * nface),
        face: vec![0u32; 3 * nface],
        ..MeshData::default()
    };

    let records = &bytes[HEADER_SIZE + 4..];
    let mut nvert: u32 = 0;
    for (i, rec) in records.chunks_exact(TRIANGLE_SIZE).enumerate() {
        // 12-byte normal discarded, then three 12-byte vertices
        for j in 0..3 {
            let at = 12 * (j + 1);
            let mut v = [0.0f32; 3];
            for (k, coord) in v.iter_mut().enumerate() {
                let o = at + 4 * k;
                let c = f32::from_le_bytes([rec[o], rec[o + 1], rec[o + 2], rec[o + 3]]);
                if c.is_nan() || c.is_infinite() {
                    return Err(IoError::InvalidFloat {
                        context: format!("STL triangle {i}"),
                    });
                }
                if c.abs() > MAX_COORD {
                    return Err(IoError::CoordOverflow { value: c });
                }
                *coord = c;
            }

            // swap winding if the caller's scale makes the load left-handed
            if righthanded || j == 0 {
                data.face[3 * i + j] = nvert;
            } else {
                data.face[3 * i + 3 - j] = nvert;
            }

            data.vert.extend_from_slice(&v);
            nvert += 1;
        }
    }

    Ok(data)
}
