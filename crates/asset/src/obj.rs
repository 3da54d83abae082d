//! OBJ-style geometry parser producing a renderable [`Mesh`].
//!
//! Reads positions, texture coordinates, normals and triangle faces,
//! partitions vertices into per-material subsets, and delegates to
//! [`crate::mtl`] for `mtllib` references. Loaded meshes are run
//! through [`crate::postprocess`] before being returned.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use corelib::{LoadError, LoadResult};

use crate::mesh::{Mesh, Subset, Vertex};
use crate::{mtl, postprocess};

/// Load a mesh from an OBJ file path. `mtllib` references resolve
/// relative to the file's directory.
pub fn load_mesh_from_path(path: impl AsRef<Path>) -> LoadResult<Mesh> {
    let path = path.as_ref();
    log::info!("Loading mesh: {}", path.display());
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    let dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
    finish(parse_obj(BufReader::new(file), path, &dir)?)
}

/// Load a mesh from a [`BufRead`] implementation. With no containing
/// file, `mtllib` references resolve relative to the current directory.
pub fn load_mesh_from_reader<R: BufRead>(reader: R) -> LoadResult<Mesh> {
    finish(parse_obj(reader, Path::new("<memory>"), Path::new(""))?)
}

/// Convenience helper to load a mesh from an OBJ string literal.
pub fn load_mesh_from_str(contents: &str) -> LoadResult<Mesh> {
    load_mesh_from_reader(io::Cursor::new(contents))
}

fn finish(mut mesh: Mesh) -> LoadResult<Mesh> {
    postprocess::run(&mut mesh);
    log::debug!(
        "Mesh ready: {} vertices, {} subsets, {} materials",
        mesh.vertices.len(),
        mesh.subsets.len(),
        mesh.materials.len()
    );
    Ok(mesh)
}

fn parse_obj<R: BufRead>(reader: R, path: &Path, dir: &Path) -> LoadResult<Mesh> {
    let mut positions: Vec<[f32; 4]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    let mut mesh = Mesh::default();
    // Index into mesh.subsets of the subset currently receiving faces.
    let mut current_subset: Option<usize> = None;

    for (line_idx, line) in reader.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = line.map_err(|e| LoadError::io(path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), path, line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), path, line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), path, line_no, "z coordinate")?;
                let w = match parts.next() {
                    Some(token) => parse_f32(Some(token), path, line_no, "w coordinate")?,
                    None => 1.0,
                };
                positions.push([x, y, z, w]);
            }
            "vt" => {
                let u = parse_f32(parts.next(), path, line_no, "u coordinate")?;
                let v = parse_f32(parts.next(), path, line_no, "v coordinate")?;
                // Flip v for a top-left raster origin.
                texcoords.push([u, -v]);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), path, line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), path, line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), path, line_no, "nz coordinate")?;
                normals.push([nx, ny, nz]);
            }
            "f" => {
                let subset = current_subset.ok_or_else(|| {
                    LoadError::parse(path, line_no, "face before any 'usemtl' command")
                })?;
                let groups: Vec<&str> = parts.collect();
                if groups.len() != 3 {
                    return Err(LoadError::parse(
                        path,
                        line_no,
                        format!(
                            "face must have exactly 3 index groups, found {}",
                            groups.len()
                        ),
                    ));
                }
                for group in groups {
                    let vertex =
                        resolve_face_group(group, &positions, &texcoords, &normals, path, line_no)?;
                    mesh.vertices.push(vertex);
                    mesh.subsets[subset].length += 1;
                }
            }
            "mtllib" => {
                let name = parts.next().ok_or_else(|| {
                    LoadError::parse(path, line_no, "mtllib without a library name")
                })?;
                let mtl_path = dir.join(name);
                log::debug!("Loading material library: {}", mtl_path.display());
                mtl::load_mtl_into(&mtl_path, &mut mesh.materials)?;
            }
            "usemtl" => {
                let name = parts.next().ok_or_else(|| {
                    LoadError::parse(path, line_no, "usemtl without a material name")
                })?;
                mesh.materials.entry(name.to_string()).or_default();
                mesh.subsets.push(Subset {
                    start: mesh.vertices.len(),
                    length: 0,
                    material: name.to_string(),
                });
                current_subset = Some(mesh.subsets.len() - 1);
            }
            _ => {
                // Ignore other directives (o/g/s/etc.) for format
                // compatibility.
            }
        }
    }

    Ok(mesh)
}

/// Assemble one vertex from a `pos[/tex[/norm]]` face index group.
/// Absent texture/normal components stay zero; the normal may be
/// synthesized later by the post-processor.
fn resolve_face_group(
    group: &str,
    positions: &[[f32; 4]],
    texcoords: &[[f32; 2]],
    normals: &[[f32; 3]],
    path: &Path,
    line_no: usize,
) -> LoadResult<Vertex> {
    let mut split = group.split('/');
    let pos_token = split.next().unwrap_or("");
    let pos_idx = resolve_index(pos_token, positions.len(), "position", path, line_no)?;

    let mut vertex = Vertex {
        position: positions[pos_idx],
        ..Vertex::default()
    };

    match split.next() {
        Some(token) if !token.is_empty() => {
            let idx = resolve_index(token, texcoords.len(), "texture coordinate", path, line_no)?;
            vertex.texture = texcoords[idx];
        }
        _ => {}
    }

    match split.next() {
        Some(token) if !token.is_empty() => {
            let idx = resolve_index(token, normals.len(), "normal", path, line_no)?;
            vertex.normal = normals[idx];
        }
        _ => {}
    }

    Ok(vertex)
}

/// Resolve a 1-based face index into `0..len`.
fn resolve_index(
    token: &str,
    len: usize,
    table: &str,
    path: &Path,
    line_no: usize,
) -> LoadResult<usize> {
    let raw = token.parse::<usize>().map_err(|_| {
        LoadError::parse(path, line_no, format!("invalid {table} index '{token}'"))
    })?;
    if raw == 0 || raw > len {
        return Err(LoadError::parse(
            path,
            line_no,
            format!("{table} index {raw} out of range (table holds {len})"),
        ));
    }
    Ok(raw - 1)
}

fn parse_f32(value: Option<&str>, path: &Path, line_no: usize, what: &str) -> LoadResult<f32> {
    let token = value.ok_or_else(|| LoadError::parse(path, line_no, format!("missing {what}")))?;
    token
        .parse::<f32>()
        .map_err(|_| LoadError::parse(path, line_no, format!("invalid {what} '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // All test geometry sits at z >= 10 so the near-plane cull leaves
    // it alone unless a test wants culling on purpose.

    #[test]
    fn resolves_one_based_indices() {
        let src = "\
usemtl default
v 1.0 2.0 13.0
v 4.0 5.0 16.0
v 7.0 8.0 19.0
vt 0.1 0.2
vt 0.3 0.4
vt 0.5 0.6
vn 1.0 0.0 0.0
vn 0.0 1.0 0.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/2 3/3/3
";
        let mesh = load_mesh_from_str(src).expect("parse triangle");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.vertices[0].position, [1.0, 2.0, 13.0, 1.0]);
        assert_eq!(mesh.vertices[0].texture, [0.1, -0.2]);
        assert_eq!(mesh.vertices[0].normal, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].position, [7.0, 8.0, 19.0, 1.0]);
    }

    #[test]
    fn texture_v_is_negated() {
        let src = "\
usemtl default
v 0 0 20
v 1 0 20
v 0 1 20
vt 0.25 0.75
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
";
        let mesh = load_mesh_from_str(src).expect("parse");
        assert_eq!(mesh.vertices[0].texture, [0.25, -0.75]);
    }

    #[test]
    fn position_w_defaults_to_one() {
        let src = "usemtl m\nv 0 0 20 2.0\nv 1 0 20\nv 0 1 20\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let mesh = load_mesh_from_str(src).expect("parse");
        assert_eq!(mesh.vertices[0].position[3], 2.0);
        assert_eq!(mesh.vertices[1].position[3], 1.0);
    }

    #[test]
    fn vertex_count_is_triangle_aligned_and_subsets_partition() {
        let src = "\
v 0 0 20
v 1 0 20
v 0 1 20
v 1 1 20
vn 0 0 1
usemtl a
f 1//1 2//1 3//1
f 2//1 4//1 3//1
usemtl b
f 1//1 3//1 4//1
";
        let mesh = load_mesh_from_str(src).expect("parse");
        assert_eq!(mesh.vertices.len() % 3, 0);
        assert_eq!(mesh.subsets.len(), 2);
        assert_eq!(mesh.subsets[0].start, 0);
        assert_eq!(mesh.subsets[0].length, 6);
        assert_eq!(mesh.subsets[1].start, 6);
        assert_eq!(mesh.subsets[1].length, 3);
        assert!(mesh.is_valid());
    }

    #[test]
    fn face_before_usemtl_fails() {
        let src = "v 0 0 20\nv 1 0 20\nv 0 1 20\nf 1 2 3\n";
        let err = load_mesh_from_str(src).unwrap_err();
        match err {
            LoadError::Parse { line, message, .. } => {
                assert_eq!(line, 4);
                assert!(message.contains("usemtl"), "message: {message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_face_index_fails() {
        let src = "usemtl m\nv 0 0 20\nf 1 2 3\n";
        let err = load_mesh_from_str(src).unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 3, .. }));
    }

    #[test]
    fn zero_face_index_fails() {
        let src = "usemtl m\nv 0 0 20\nv 1 0 20\nv 0 1 20\nf 0 1 2\n";
        assert!(load_mesh_from_str(src).is_err());
    }

    #[test]
    fn non_triangle_face_fails() {
        let src = "\
usemtl m
v 0 0 20
v 1 0 20
v 1 1 20
v 0 1 20
f 1 2 3 4
";
        let err = load_mesh_from_str(src).unwrap_err();
        match err {
            LoadError::Parse { message, .. } => {
                assert!(message.contains("3 index groups"), "message: {message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn repeated_usemtl_shares_one_material_entry() {
        let src = "\
v 0 0 20
v 1 0 20
v 0 1 20
vn 0 0 1
usemtl foo
f 1//1 2//1 3//1
usemtl foo
f 1//1 3//1 2//1
";
        let mesh = load_mesh_from_str(src).expect("parse");
        assert_eq!(mesh.materials.len(), 1);
        assert_eq!(mesh.subsets.len(), 2);
        assert_eq!(mesh.subsets[0].material, mesh.subsets[1].material);
    }

    #[test]
    fn missing_texture_and_normal_components_stay_zero() {
        let src = "usemtl m\nv 0 0 20\nv 1 0 20\nv 0 1 20\nvn 1 0 0\nf 1//1 2 3\n";
        let mesh = load_mesh_from_str(src).expect("parse");
        assert_eq!(mesh.vertices[0].normal, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[1].normal, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[1].texture, [0.0, 0.0]);
    }

    #[test]
    fn comments_and_unknown_directives_are_ignored() {
        let src = "\
# a cube corner
o corner
s off
usemtl m
v 0 0 20
v 1 0 20
v 0 1 20
vn 0 0 1
f 1//1 2//1 3//1
";
        let mesh = load_mesh_from_str(src).expect("parse");
        assert_eq!(mesh.vertices.len(), 3);
    }

    #[test]
    fn malformed_coordinate_fails_with_line_number() {
        let src = "usemtl m\nv 0 zero 20\n";
        let err = load_mesh_from_str(src).unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = load_mesh_from_path("no/such/mesh.obj").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn mtllib_delegation_merges_materials() {
        use std::fs;

        let dir = std::env::temp_dir().join(format!("asset-objtest-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("create temp dir");
        fs::write(
            dir.join("scene.mtl"),
            "newmtl brick\nKd 0.8 0.2 0.1\nNs 12.5\nmap_Kd brick.png\n",
        )
        .expect("write mtl");
        fs::write(
            dir.join("scene.obj"),
            "mtllib scene.mtl\nv 0 0 20\nv 1 0 20\nv 0 1 20\nvn 0 0 1\nusemtl brick\nf 1//1 2//1 3//1\n",
        )
        .expect("write obj");

        let mesh = load_mesh_from_path(dir.join("scene.obj")).expect("load");
        let brick = &mesh.materials["brick"];
        assert_eq!(brick.diffuse, [0.8, 0.2, 0.1]);
        assert_eq!(brick.shininess, 12.0);
        assert_eq!(brick.texture_path.as_deref(), Some(dir.join("brick.png").as_path()));
        assert_eq!(mesh.subsets[0].material, "brick");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_material_library_reports_io_error() {
        let src = "mtllib does-not-exist.mtl\n";
        let err = load_mesh_from_str(src).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
