//! Minimal Wavefront OBJ reader for visual meshes.
//!
//! Only `v` and `f` records are read; polygon faces are fan-triangulated.
//! Texture and normal references (`f 1/2/3`) are accepted and ignored.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tetrasoft_math::Vec3;
use tetrasoft_types::{SoftBodyError, SoftBodyResult};
use tracing::info;

use crate::visual::StaticMesh;

/// Loads an OBJ file as a [`StaticMesh`] called `name`.
pub fn load_obj(path: &Path, name: &str) -> SoftBodyResult<StaticMesh> {
    let text = fs::read_to_string(path).map_err(|_| SoftBodyError::ResourceNotFound {
        path: path.to_path_buf(),
    })?;
    let mesh = parse_obj(name, &text)?;
    info!(
        path = %path.display(),
        vertices = mesh.positions.len(),
        triangles = mesh.triangle_count(),
        "Loaded visual mesh"
    );
    Ok(mesh)
}

/// Parses OBJ text.
pub fn parse_obj(name: &str, text: &str) -> SoftBodyResult<StaticMesh> {
    let mut positions = Vec::new();
    let mut indices = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let coords: Vec<f32> = tokens
                    .take(3)
                    .map(|t| t.parse::<f32>())
                    .collect::<Result<_, _>>()
                    .map_err(|e| SoftBodyError::MalformedRecord {
                        line: line_no,
                        message: format!("bad vertex coordinate: {e}"),
                    })?;
                if coords.len() != 3 {
                    return Err(SoftBodyError::MalformedRecord {
                        line: line_no,
                        message: "vertex needs three coordinates".into(),
                    });
                }
                positions.push(Vec3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let corners = tokens
                    .map(|t| resolve_index(t, positions.len(), line_no))
                    .collect::<SoftBodyResult<Vec<u32>>>()?;
                if corners.len() < 3 {
                    return Err(SoftBodyError::MalformedRecord {
                        line: line_no,
                        message: "face needs at least three vertices".into(),
                    });
                }
                for k in 1..corners.len() - 1 {
                    indices.extend_from_slice(&[corners[0], corners[k], corners[k + 1]]);
                }
            }
            _ => {}
        }
    }

    StaticMesh::new(name, positions, indices)
}

/// Converts a 1-based (or negative, relative) OBJ index to zero-based.
fn resolve_index(token: &str, vertex_count: usize, line: usize) -> SoftBodyResult<u32> {
    let head = token.split('/').next().unwrap_or_default();
    let raw: i64 = head.parse().map_err(|_| SoftBodyError::MalformedRecord {
        line,
        message: format!("bad face index '{token}'"),
    })?;
    let resolved = if raw < 0 {
        vertex_count as i64 + raw
    } else {
        raw - 1
    };
    if resolved < 0 || resolved >= vertex_count as i64 {
        return Err(SoftBodyError::IndexOutOfRange {
            kind: "obj vertex",
            index: raw,
            len: vertex_count,
        });
    }
    Ok(resolved as u32)
}

/// Renders positions and triangles as OBJ text.
pub fn format_obj(mesh: &StaticMesh) -> String {
    let mut out = String::new();
    for p in &mesh.positions {
        let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
    }
    for tri in mesh.indices.chunks_exact(3) {
        let _ = writeln!(out, "f {} {} {}", tri[0] + 1, tri[1] + 1, tri[2] + 1);
    }
    out
}

/// Writes a mesh to `path` as OBJ, creating parent directories.
pub fn save_obj(path: &Path, mesh: &StaticMesh) -> SoftBodyResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format_obj(mesh))?;
    Ok(())
}
