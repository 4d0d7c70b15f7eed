//! `.tetra` asset parser.
//!
//! The format is line oriented. Five positional header lines declare the
//! record counts (vertices, edges, faces, tetrahedra, neighbour records);
//! only the last token of each header line is read. Data lines follow,
//! tag-dispatched and in any order:
//!
//! ```text
//! v <x> <y> <z>
//! e <i> <j>
//! f <i> <j> <k>          (counted, then discarded)
//! t <i> <j> <k> <l>
//! tn <a> <b> <c> <d>     (-1 = no neighbour)
//! ```
//!
//! Indices are zero-based. Parsed counts must match the header exactly.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tetrasoft_math::Vec3;
use tetrasoft_types::{SoftBodyError, SoftBodyResult};
use tracing::{info, warn};

use crate::tet_mesh::TetMesh;

/// Record counts declared by the five header lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TetraHeader {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    pub tetrahedra: usize,
    pub neighbours: usize,
}

const HEADER_LINES: usize = 5;

/// Reads and parses a `.tetra` file.
///
/// A missing or unreadable file is reported as
/// [`SoftBodyError::ResourceNotFound`].
pub fn load_tetra(path: &Path) -> SoftBodyResult<TetMesh> {
    let text = fs::read_to_string(path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Failed to open tetra asset");
        SoftBodyError::ResourceNotFound {
            path: path.to_path_buf(),
        }
    })?;

    let mesh = parse_tetra(&text)?;
    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        edges = mesh.edge_count(),
        tetrahedra = mesh.tetra_count(),
        "Loaded tetrahedral mesh"
    );
    Ok(mesh)
}

/// Parses the contents of a `.tetra` file.
pub fn parse_tetra(text: &str) -> SoftBodyResult<TetMesh> {
    let mut lines = text.lines().enumerate();
    let header = read_header(&mut lines)?;

    let mut positions = Vec::with_capacity(header.vertices);
    let mut edges = Vec::with_capacity(header.edges);
    let mut tetrahedra = Vec::with_capacity(header.tetrahedra);
    let mut neighbours = Vec::with_capacity(header.neighbours);
    let mut faces = 0usize;

    for (idx, line) in lines {
        let line_no = idx + 1;
        let mut tokens = line.split_whitespace();
        let Some(tag) = tokens.next() else {
            continue;
        };
        let fields: Vec<&str> = tokens.collect();

        match tag {
            "v" => {
                let [x, y, z] = parse_fields::<f32, 3>(&fields, line_no)?;
                positions.push(Vec3::new(x, y, z));
            }
            "e" => edges.push(parse_fields::<i64, 2>(&fields, line_no)?),
            "f" => {
                parse_fields::<i64, 3>(&fields, line_no)?;
                faces += 1;
            }
            "t" => tetrahedra.push(parse_fields::<i64, 4>(&fields, line_no)?),
            "tn" => neighbours.push(parse_fields::<i64, 4>(&fields, line_no)?),
            other => warn!(line = line_no, tag = other, "Skipping unknown tetra record"),
        }
    }

    check_count("v", header.vertices, positions.len())?;
    check_count("e", header.edges, edges.len())?;
    check_count("f", header.faces, faces)?;
    check_count("t", header.tetrahedra, tetrahedra.len())?;
    check_count("tn", header.neighbours, neighbours.len())?;

    Ok(TetMesh::new(positions, &edges, &tetrahedra)?
        .with_neighbours(&neighbours)?
        .with_face_count(faces))
}

/// Renders a mesh in `.tetra` format. Surface faces are not stored, so
/// the face count is always zero.
pub fn format_tetra(mesh: &TetMesh) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "vc {}", mesh.vertex_count());
    let _ = writeln!(out, "ec {}", mesh.edge_count());
    let _ = writeln!(out, "fc 0");
    let _ = writeln!(out, "tc {}", mesh.tetra_count());
    let _ = writeln!(out, "tnc {}", mesh.neighbours().len());
    out.push('\n');
    for p in mesh.positions() {
        let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
    }
    for [a, b] in mesh.edges() {
        let _ = writeln!(out, "e {} {}", a.0, b.0);
    }
    for [a, b, c, d] in mesh.tetrahedra() {
        let _ = writeln!(out, "t {} {} {} {}", a.0, b.0, c.0, d.0);
    }
    for record in mesh.neighbours() {
        let [a, b, c, d] = record.map(|n| n.map_or(-1, |t| i64::from(t.0)));
        let _ = writeln!(out, "tn {a} {b} {c} {d}");
    }
    out
}

/// Writes a mesh to `path` in `.tetra` format, creating parent directories.
pub fn save_tetra(path: &Path, mesh: &TetMesh) -> SoftBodyResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format_tetra(mesh))?;
    info!(path = %path.display(), tetrahedra = mesh.tetra_count(), "Saved tetrahedral mesh");
    Ok(())
}

/// Reads only the header of a `.tetra` text.
pub fn parse_header(text: &str) -> SoftBodyResult<TetraHeader> {
    read_header(&mut text.lines().enumerate())
}

fn read_header<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
) -> SoftBodyResult<TetraHeader> {
    let mut counts = [0usize; HEADER_LINES];
    for (slot, count) in counts.iter_mut().enumerate() {
        let (idx, line) = lines.next().ok_or_else(|| SoftBodyError::MalformedRecord {
            line: slot + 1,
            message: "missing header line".into(),
        })?;
        let token = line
            .split_whitespace()
            .last()
            .ok_or_else(|| SoftBodyError::MalformedRecord {
                line: idx + 1,
                message: "empty header line".into(),
            })?;
        *count = parse_field(token, idx + 1)?;
    }
    Ok(TetraHeader {
        vertices: counts[0],
        edges: counts[1],
        faces: counts[2],
        tetrahedra: counts[3],
        neighbours: counts[4],
    })
}

fn check_count(record: &'static str, expected: usize, actual: usize) -> SoftBodyResult<()> {
    if expected != actual {
        return Err(SoftBodyError::MalformedInput {
            record,
            expected,
            actual,
        });
    }
    Ok(())
}

fn parse_field<T: FromStr>(token: &str, line: usize) -> SoftBodyResult<T> {
    token.parse().map_err(|_| SoftBodyError::MalformedRecord {
        line,
        message: format!("cannot parse '{token}' as {}", std::any::type_name::<T>()),
    })
}

fn parse_fields<T: FromStr + Copy + Default, const N: usize>(
    fields: &[&str],
    line: usize,
) -> SoftBodyResult<[T; N]> {
    if fields.len() < N {
        return Err(SoftBodyError::MalformedRecord {
            line,
            message: format!("expected {N} fields, found {}", fields.len()),
        });
    }
    let mut out = [T::default(); N];
    for (slot, token) in out.iter_mut().zip(fields) {
        *slot = parse_field(token, line)?;
    }
    Ok(out)
}
