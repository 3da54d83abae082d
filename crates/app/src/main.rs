//! Mesh inspection tool: loads an OBJ mesh with its material
//! libraries and logs what the renderer would receive.

use anyhow::{Result, bail};

fn parse_path_arg() -> Option<String> {
    // First argument that is not a --flag is the mesh path.
    std::env::args().skip(1).find(|arg| !arg.starts_with("--"))
}

fn parse_show_materials_arg() -> bool {
    // --show-materials[=on|off], off by default
    for arg in std::env::args() {
        if arg == "--show-materials" {
            return true;
        }
        if let Some(val) = arg.strip_prefix("--show-materials=") {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(path) = parse_path_arg() else {
        bail!("usage: app <path/to/mesh.obj> [--show-materials]");
    };
    let show_materials = parse_show_materials_arg();

    let mesh = asset::load_mesh_from_path(&path)?;

    log::info!(
        "Loaded {}: {} vertices, {} triangles, {} subsets, {} materials",
        path,
        mesh.vertices.len(),
        mesh.triangle_count(),
        mesh.subsets.len(),
        mesh.materials.len()
    );

    for (i, subset) in mesh.subsets.iter().enumerate() {
        log::info!(
            "Subset {}: vertices [{}..{}), material '{}'",
            i,
            subset.start,
            subset.start + subset.length,
            subset.material
        );
    }

    if show_materials {
        for (name, mat) in &mesh.materials {
            log::info!(
                "Material '{}': Ka={:?} Kd={:?} Ks={:?} Ns={} texture={:?}",
                name,
                mat.ambient,
                mat.diffuse,
                mat.specular,
                mat.shininess,
                mat.texture_path
            );
        }
    }

    Ok(())
}
