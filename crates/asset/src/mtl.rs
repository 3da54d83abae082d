//! MTL-style material library parser.
//!
//! Populates a shared name -> [`Material`] table in place; a geometry
//! file may pull in several libraries via `mtllib`, all merging into
//! the same table.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use corelib::{LoadError, LoadResult};

use crate::mesh::Material;

/// Parse the material library at `path`, merging its definitions into
/// `materials`. Texture paths are resolved relative to the library
/// file's directory.
pub fn load_mtl_into(
    path: impl AsRef<Path>,
    materials: &mut HashMap<String, Material>,
) -> LoadResult<()> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    let dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
    parse_mtl(BufReader::new(file), path, &dir, materials)
}

fn parse_mtl<R: BufRead>(
    reader: R,
    path: &Path,
    dir: &Path,
    materials: &mut HashMap<String, Material>,
) -> LoadResult<()> {
    let mut current: Option<String> = None;

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
            "newmtl" => {
                let name = parts.next().ok_or_else(|| {
                    LoadError::parse(path, line_no, "newmtl without a material name")
                })?;
                materials.entry(name.to_string()).or_default();
                current = Some(name.to_string());
            }
            "Ka" => {
                let color = parse_color(&mut parts, path, line_no, "Ka")?;
                selected(materials, &current, path, line_no, "Ka")?.ambient = color;
            }
            "Kd" => {
                let color = parse_color(&mut parts, path, line_no, "Kd")?;
                selected(materials, &current, path, line_no, "Kd")?.diffuse = color;
            }
            "Ks" => {
                let color = parse_color(&mut parts, path, line_no, "Ks")?;
                selected(materials, &current, path, line_no, "Ks")?.specular = color;
            }
            "Ns" => {
                let value = parse_f32(parts.next(), path, line_no, "shininess")?;
                // Stored truncated to its integral part.
                selected(materials, &current, path, line_no, "Ns")?.shininess = value.trunc();
            }
            "map_Kd" => {
                let file = parts.next().ok_or_else(|| {
                    LoadError::parse(path, line_no, "map_Kd without a file name")
                })?;
                selected(materials, &current, path, line_no, "map_Kd")?.texture_path =
                    Some(dir.join(file));
            }
            // Alpha and illumination model are not part of the material
            // model; recognized so they never trip the unknown path.
            "d" | "Tr" | "illum" => {}
            _ => {
                // Unknown directives are ignored for format compatibility.
            }
        }
    }

    Ok(())
}

/// Resolve the currently selected material, failing with a parse error
/// naming `cmd` if no `newmtl` has been seen yet.
fn selected<'m>(
    materials: &'m mut HashMap<String, Material>,
    current: &Option<String>,
    path: &Path,
    line_no: usize,
    cmd: &str,
) -> LoadResult<&'m mut Material> {
    let name = current.as_ref().ok_or_else(|| {
        LoadError::parse(
            path,
            line_no,
            format!("'{cmd}' before any 'newmtl' declaration"),
        )
    })?;
    materials.get_mut(name).ok_or_else(|| {
        LoadError::parse(path, line_no, format!("unknown current material '{name}'"))
    })
}

fn parse_color<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    path: &Path,
    line_no: usize,
    cmd: &str,
) -> LoadResult<[f32; 3]> {
    let r = parse_f32(parts.next(), path, line_no, &format!("{cmd} red"))?;
    let g = parse_f32(parts.next(), path, line_no, &format!("{cmd} green"))?;
    let b = parse_f32(parts.next(), path, line_no, &format!("{cmd} blue"))?;
    Ok([r, g, b])
}

fn parse_f32(value: Option<&str>, path: &Path, line_no: usize, what: &str) -> LoadResult<f32> {
    let token =
        value.ok_or_else(|| LoadError::parse(path, line_no, format!("missing {what} value")))?;
    // str::parse is locale-independent: '.' is always the decimal
    // separator, which keeps parsing reproducible across hosts.
    token.parse::<f32>().map_err(|_| {
        LoadError::parse(path, line_no, format!("invalid {what} value '{token}'"))
    })
}
