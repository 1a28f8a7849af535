//! Wavefront OBJ loader, restricted to triangle and quad faces.
//!
//! Quads are fan-split into `(0,1,2)` and `(0,2,3)`; n-gons are rejected
//! rather than silently fanned. Position, normal, and texcoord indices are
//! kept per corner, the way the staging buffers expect them.
//!
//! The `v` texture axis is flipped (`t.v <- 1 - t.v`) for every texcoord
//! except index 0, which stays untouched to match the upstream convention
//! downstream textures rely on.

use nalgebra::Vector3;

use crate::data::MeshData;
use crate::error::{IoError, IoResult};
use crate::MINVAL;

/// One parsed face corner: position index plus optional texcoord/normal.
#[derive(Debug, Clone, Copy)]
struct Corner {
    v: u32,
    t: Option<u32>,
    n: Option<u32>,
}

/// Parse a Wavefront OBJ buffer.
///
/// Left-handed loads (`righthanded == false`) swap the second and third
/// corner of each emitted triangle.
///
/// # Errors
///
/// Returns an error on faces with fewer than 3 or more than 4 corners, on
/// unparsable numbers, and on indices outside the declared data.
pub fn load_obj(bytes: &[u8], righthanded: bool) -> IoResult<MeshData> {
    let text = String::from_utf8_lossy(bytes);

    let mut data = MeshData::default();
    let mut corners: Vec<Corner> = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("");
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let (x, y, z) = parse_vec3(&mut tokens, lineno)?;
                data.vert.extend_from_slice(&[x, y, z]);
            }
            "vn" => {
                let (x, y, z) = parse_vec3(&mut tokens, lineno)?;
                data.normal.extend_from_slice(&[x, y, z]);
            }
            "vt" => {
                let u = parse_float(tokens.next(), lineno)?;
                let v = parse_float(tokens.next(), lineno)?;
                data.texcoord.extend_from_slice(&[u, v]);
            }
            "f" => {
                let face: Vec<Corner> = tokens
                    .map(|tok| parse_corner(tok, &data, lineno))
                    .collect::<IoResult<_>>()?;
                if face.len() < 3 || face.len() > 4 {
                    return Err(IoError::OnlyTrisAndQuads { count: face.len() });
                }

                let (a, b) = if righthanded { (1, 2) } else { (2, 1) };
                corners.push(face[0]);
                corners.push(face[a]);
                corners.push(face[b]);

                if face.len() == 4 {
                    let (a, b) = if righthanded { (2, 3) } else { (3, 2) };
                    corners.push(face[0]);
                    corners.push(face[a]);
                    corners.push(face[b]);
                }
            }
            // groups, materials, smoothing: not used by the pipeline
            _ => {}
        }
    }

    let has_normals = !data.normal.is_empty();
    let has_texcoords = !data.texcoord.is_empty();
    for corner in &corners {
        data.face.push(corner.v);
        if has_normals {
            data.facenormal.push(corner.n.ok_or_else(|| {
                IoError::invalid_content("face corner is missing a normal index")
            })?);
        }
        if has_texcoords {
            data.facetexcoord.push(corner.t.ok_or_else(|| {
                IoError::invalid_content("face corner is missing a texcoord index")
            })?);
        }
    }

    // directed edges for the orientation check, skipping degenerate faces
    for tri in corners.chunks_exact(3) {
        let (v0, v1, v2) = (tri[0].v, tri[1].v, tri[2].v);
        if triangle_area(&data.vert, v0, v1, v2) > MINVAL.sqrt() {
            data.edge.push((v0, v1));
            data.edge.push((v1, v2));
            data.edge.push((v2, v0));
        }
    }

    // flip the v axis of every texcoord except the first
    for i in 1..data.texcoord.len() / 2 {
        data.texcoord[2 * i + 1] = 1.0 - data.texcoord[2 * i + 1];
    }

    Ok(data)
}

fn parse_float(token: Option<&str>, lineno: usize) -> IoResult<f32> {
    let token = token.ok_or_else(|| {
        IoError::invalid_content(format!("line {}: missing coordinate", lineno + 1))
    })?;
    let value: f32 = token.parse().map_err(|_| IoError::InvalidFloat {
        context: format!("OBJ line {}", lineno + 1),
    })?;
    Ok(value)
}

fn parse_vec3(
    tokens: &mut std::str::SplitWhitespace<'_>,
    lineno: usize,
) -> IoResult<(f32, f32, f32)> {
    Ok((
        parse_float(tokens.next(), lineno)?,
        parse_float(tokens.next(), lineno)?,
        parse_float(tokens.next(), lineno)?,
    ))
}

/// Parse a face corner token: `v`, `v/t`, `v//n`, or `v/t/n`.
///
/// Indices are 1-based; negative indices count back from the end of the
/// respective array, as the reference readers resolve them.
fn parse_corner(token: &str, data: &MeshData, lineno: usize) -> IoResult<Corner> {
    let mut parts = token.split('/');

    let v = parse_index(parts.next(), data.vert.len() / 3, lineno)?.ok_or_else(|| {
        IoError::invalid_content(format!("line {}: face corner without vertex index", lineno + 1))
    })?;
    let t = parse_index(parts.next(), data.texcoord.len() / 2, lineno)?;
    let n = parse_index(parts.next(), data.normal.len() / 3, lineno)?;

    Ok(Corner { v, t, n })
}

fn parse_index(part: Option<&str>, count: usize, lineno: usize) -> IoResult<Option<u32>> {
    let Some(part) = part else {
        return Ok(None);
    };
    if part.is_empty() {
        return Ok(None);
    }

    let raw: i64 = part.parse().map_err(|_| {
        IoError::invalid_content(format!("line {}: bad face index '{part}'", lineno + 1))
    })?;
    let resolved = if raw < 0 {
        count as i64 + raw
    } else {
        raw - 1
    };
    if resolved < 0 || resolved >= count as i64 {
        return Err(IoError::invalid_content(format!(
            "line {}: face index {raw} out of range (count {count})",
            lineno + 1
        )));
    }
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let resolved = resolved as u32;
    Ok(Some(resolved))
}

fn triangle_area(vert: &[f32], v0: u32, v1: u32, v2: u32) -> f64 {
    let p = |i: u32| {
        let o = 3 * i as usize;
        Vector3::new(
            f64::from(vert[o]),
            f64::from(vert[o + 1]),
            f64::from(vert[o + 2]),
        )
    };
    let (a, b, c) = (p(v0), p(v1), p(v2));
    (b - a).cross(&(c - a)).norm() / 2.0
}
