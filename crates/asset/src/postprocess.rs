//! Fix-up passes applied to a freshly parsed mesh: flat-normal
//! synthesis and near-plane culling.

use glam::Vec3;

use crate::mesh::{Mesh, Subset, Vertex};

/// Vertices with a depth (Z) below this are behind the near plane and
/// dropped, together with the rest of their triangle. Strict `<`:
/// geometry exactly on the plane survives.
pub const NEAR_PLANE: f32 = 10.0;

/// Run both passes in order: normals first (they read the pre-cull
/// triangle triples), then the cull.
pub fn run(mesh: &mut Mesh) {
    if needs_normals(mesh) {
        log::debug!("Source supplied no normals; generating flat normals");
        generate_flat_normals(&mut mesh.vertices);
    }
    cull_near_triangles(mesh);
}

/// Heuristic for "the file supplied no normals at all": the first
/// vertex still carries the zero normal it was assembled with.
fn needs_normals(mesh: &Mesh) -> bool {
    mesh.vertices
        .first()
        .is_some_and(|v| v.normal == [0.0, 0.0, 0.0])
}

/// Write a flat normal into every vertex, one triangle (consecutive
/// triple) at a time. Each corner's normal comes from the cross
/// product of its own two adjacent edges, so degenerate triangles can
/// yield differing directions per corner. Normals are flipped to a
/// non-negative Y (a fixed point-upward convention) and normalized;
/// a zero-area corner produces a zero normal rather than NaN.
pub fn generate_flat_normals(vertices: &mut [Vertex]) {
    for tri in vertices.chunks_exact_mut(3) {
        let a = position(&tri[0]);
        let b = position(&tri[1]);
        let c = position(&tri[2]);

        tri[0].normal = corner_normal(a, b, c).to_array();
        tri[1].normal = corner_normal(b, a, c).to_array();
        tri[2].normal = corner_normal(c, b, a).to_array();
    }
}

fn position(v: &Vertex) -> Vec3 {
    Vec3::new(v.position[0], v.position[1], v.position[2])
}

fn corner_normal(corner: Vec3, e1: Vec3, e2: Vec3) -> Vec3 {
    let mut n = (e1 - corner).cross(e2 - corner);
    if n.y < 0.0 {
        n = -n;
    }
    n.normalize_or_zero()
}

/// Drop every triangle with a corner in front of [`NEAR_PLANE`] and
/// rebuild the subset table so start/length bookkeeping stays a valid
/// partition. Filtering into a fresh sequence keeps triangle triples
/// intact, unlike removing individual vertices mid-iteration.
pub fn cull_near_triangles(mesh: &mut Mesh) {
    let mut kept: Vec<Vertex> = Vec::with_capacity(mesh.vertices.len());
    let mut subsets: Vec<Subset> = Vec::with_capacity(mesh.subsets.len());

    for subset in &mesh.subsets {
        let start = kept.len();
        let range = &mesh.vertices[subset.start..subset.start + subset.length];
        for tri in range.chunks_exact(3) {
            if tri.iter().all(|v| v.position[2] >= NEAR_PLANE) {
                kept.extend_from_slice(tri);
            }
        }
        subsets.push(Subset {
            start,
            length: kept.len() - start,
            material: subset.material.clone(),
        });
    }

    let dropped = mesh.vertices.len() - kept.len();
    if dropped > 0 {
        log::debug!("Near-plane cull dropped {} vertices", dropped);
    }

    mesh.vertices = kept;
    mesh.subsets = subsets;
}
