//! Binary SKN skinned-mesh loader.
//!
//! # Format
//!
//! ```text
//! INT32[4]              – nvert, ntexcoord, nface, nbone
//! REAL32[3*nvert]       – vertex positions
//! REAL32[2*ntexcoord]   – texture coordinates
//! INT32[3*nface]        – triangle vertex indices
//! foreach bone
//!     CHAR[40]          – body name, null-padded C string
//!     REAL32[3]         – bind position
//!     REAL32[4]         – bind quaternion
//!     INT32             – influenced vertex count, >= 1
//!     INT32[count]      – vertex indices
//!     REAL32[count]     – vertex weights
//! end
//! ```
//!
//! Weight words are stored with the integer block layout on disk and read
//! back bit-for-bit as floats, so writer and reader agree byte-exactly.

use crate::data::{SkinBone, SkinData};
use crate::error::{IoError, IoResult};

fn read_i32(bytes: &[u8], off: usize) -> i32 {
    i32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
}

fn read_f32(bytes: &[u8], off: usize) -> f32 {
    f32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
}

/// Parse a binary SKN buffer.
///
/// # Errors
///
/// Returns an error if the header is truncated or holds negative sizes, a
/// block runs past the end of the buffer, a bone influences zero vertices,
/// or the final length disagrees with the running cursor.
#[allow(clippy::cast_sign_loss)] // counts are checked non-negative before casting
pub fn load_skn(bytes: &[u8]) -> IoResult<SkinData> {
    if bytes.len() < 16 {
        return Err(IoError::malformed_header(format!(
            "binary SKN needs at least 16 bytes, got {}",
            bytes.len()
        )));
    }

    let nvert = read_i32(bytes, 0);
    let ntexcoord = read_i32(bytes, 4);
    let nface = read_i32(bytes, 8);
    let nbone = read_i32(bytes, 12);

    if nvert < 0 || ntexcoord < 0 || nface < 0 || nbone < 0 {
        return Err(IoError::malformed_header(format!(
            "negative size in SKN header: nvert={nvert} ntexcoord={ntexcoord} \
             nface={nface} nbone={nbone}"
        )));
    }

    let (nvert, ntexcoord, nface, nbone) = (
        nvert as usize,
        ntexcoord as usize,
        nface as usize,
        nbone as usize,
    );

    if bytes.len() < 16 + 12 * nvert + 8 * ntexcoord + 12 * nface {
        return Err(IoError::UnexpectedEof {
            offset: bytes.len(),
        });
    }

    // word cursor into the payload that follows the header
    let mut cnt: usize = 0;
    let at = |cnt: usize| 16 + 4 * cnt;
    let words = bytes.len() / 4;
    let remaining = |cnt: usize| words as i64 - 4 - cnt as i64;

    let mut data = SkinData {
        vert: (0..3 * nvert).map(|i| read_f32(bytes, at(i))).collect(),
        ..SkinData::default()
    };
    cnt += 3 * nvert;

    data.texcoord = (0..2 * ntexcoord)
        .map(|i| read_f32(bytes, at(cnt + i)))
        .collect();
    cnt += 2 * ntexcoord;

    data.face = (0..3 * nface)
        .map(|i| read_i32(bytes, at(cnt + i)) as u32)
        .collect();
    cnt += 3 * nface;

    for bone in 0..nbone {
        // name(10) + bindpos(3) + bindquat(4) + vcount(1)
        if remaining(cnt) < 18 {
            return Err(IoError::UnexpectedEof { offset: at(cnt) });
        }

        let name_bytes = &bytes[at(cnt)..at(cnt) + 40];
        let end = name_bytes[..39]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(39);
        let body = String::from_utf8_lossy(&name_bytes[..end]).into_owned();
        cnt += 10;

        let mut bindpos = [0.0f32; 3];
        for (i, p) in bindpos.iter_mut().enumerate() {
            *p = read_f32(bytes, at(cnt + i));
        }
        cnt += 3;

        let mut bindquat = [0.0f32; 4];
        for (i, q) in bindquat.iter_mut().enumerate() {
            *q = read_f32(bytes, at(cnt + i));
        }
        cnt += 4;

        let vcount = read_i32(bytes, at(cnt));
        cnt += 1;
        if vcount < 1 {
            return Err(IoError::invalid_content(format!(
                "bone {bone}: vertex count must be positive, got {vcount}"
            )));
        }
        let vcount = vcount as usize;

        if remaining(cnt) < 2 * vcount as i64 {
            return Err(IoError::UnexpectedEof { offset: at(cnt) });
        }

        let vertid: Vec<u32> = (0..vcount)
            .map(|i| read_i32(bytes, at(cnt + i)) as u32)
            .collect();
        cnt += vcount;

        // weight words reinterpreted bit-for-bit as floats
        let vertweight: Vec<f32> = (0..vcount)
            .map(|i| read_f32(bytes, at(cnt + i)))
            .collect();
        cnt += vcount;

        data.bones.push(SkinBone {
            body,
            bindpos,
            bindquat,
            vertid,
            vertweight,
        });
    }

    if bytes.len() != at(cnt) {
        return Err(IoError::SizeMismatch {
            expected: at(cnt),
            got: bytes.len(),
        });
    }

    Ok(data)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    /// Build an SKN buffer from its blocks.
    pub(crate) fn make_skn(
        vert: &[f32],
        texcoord: &[f32],
        face: &[i32],
        bones: &[(&str, [f32; 3], [f32; 4], &[i32], &[f32])],
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        for n in [
            i32::try_from(vert.len() / 3).unwrap(),
            i32::try_from(texcoord.len() / 2).unwrap(),
            i32::try_from(face.len() / 3).unwrap(),
            i32::try_from(bones.len()).unwrap(),
        ] {
            buf.extend_from_slice(&n.to_le_bytes());
        }
        for v in vert.iter().chain(texcoord) {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        for f in face {
            buf.extend_from_slice(&f.to_le_bytes());
        }
        for (name, bindpos, bindquat, vertid, vertweight) in bones {
            let mut name_bytes = [0u8; 40];
            name_bytes[..name.len()].copy_from_slice(name.as_bytes());
            buf.extend_from_slice(&name_bytes);
            for p in bindpos.iter().chain(bindquat) {
                buf.extend_from_slice(&p.to_le_bytes());
            }
            buf.extend_from_slice(&i32::try_from(vertid.len()).unwrap().to_le_bytes());
            for id in *vertid {
                buf.extend_from_slice(&id.to_le_bytes());
            }
            for w in *vertweight {
                buf.extend_from_slice(&w.to_le_bytes());
            }
        }
        buf
    }

    fn simple_skn() -> Vec<u8> {
        make_skn(
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            &[],
            &[0, 1, 2],
            &[(
                "torso",
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0, 0.0],
                &[0, 1, 2],
                &[1.0, 1.0, 1.0],
            )],
        )
    }

    #[test]
    fn roundtrip() {
        let data = load_skn(&simple_skn()).unwrap();
        assert_eq!(data.vert.len(), 9);
        assert_eq!(data.face, vec![0, 1, 2]);
        assert_eq!(data.bones.len(), 1);
        let bone = &data.bones[0];
        assert_eq!(bone.body, "torso");
        assert_eq!(bone.vertid, vec![0, 1, 2]);
        assert_eq!(bone.vertweight, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn negative_header_size() {
        let mut buf = simple_skn();
        buf[..4].copy_from_slice(&(-1i32).to_le_bytes());
        let err = load_skn(&buf).unwrap_err();
        assert!(matches!(err, IoError::MalformedHeader { .. }));
    }

    #[test]
    fn zero_vertex_bone() {
        let buf = make_skn(
            &[0.0, 0.0, 0.0],
            &[],
            &[],
            &[(
                "torso",
                [0.0; 3],
                [1.0, 0.0, 0.0, 0.0],
                &[],
                &[],
            )],
        );
        let err = load_skn(&buf).unwrap_err();
        assert!(matches!(err, IoError::InvalidContent { .. }));
    }

    #[test]
    fn truncated_bone_block() {
        let mut buf = simple_skn();
        buf.truncate(buf.len() - 8);
        let err = load_skn(&buf).unwrap_err();
        assert!(matches!(err, IoError::UnexpectedEof { .. }));
    }

    #[test]
    fn trailing_garbage_rejected() {
        let mut buf = simple_skn();
        buf.extend_from_slice(&[0u8; 4]);
        let err = load_skn(&buf).unwrap_err();
        assert!(matches!(err, IoError::SizeMismatch { .. }));
    }

    #[test]
    fn weight_bits_preserved() {
        // a weight whose bit pattern is easy to recognize
        let w = f32::from_le_bytes([0x01, 0x02, 0x03, 0x04]);
        let buf = make_skn(
            &[0.0, 0.0, 0.0],
            &[],
            &[],
            &[("b", [0.0; 3], [1.0, 0.0, 0.0, 0.0], &[0], &[w])],
        );
        let data = load_skn(&buf).unwrap();
        assert_eq!(
            data.bones[0].vertweight[0].to_le_bytes(),
            [0x01, 0x02, 0x03, 0x04]
        );
    }
}
