//! CPU-side mesh representation produced by the OBJ/MTL loaders.

use std::collections::HashMap;
use std::path::PathBuf;

/// Vertex with position/texcoord/normal. Values are in object space;
/// `position[3]` is the homogeneous w component (1 unless the source
/// file said otherwise).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: [f32; 4],
    pub texture: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: [f32; 4], texture: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            texture,
            normal,
        }
    }
}

/// A contiguous, material-homogeneous run of the vertex sequence.
/// Rendered as one draw call by the consumer. `material` is the key
/// into [`Mesh::materials`]; a single table entry per name is what
/// makes every subset using that name share one material instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Subset {
    pub start: usize,
    pub length: usize,
    pub material: String,
}

/// Surface attributes of one named material. Defaults to all-zero
/// colors, zero shininess and no texture, for materials referenced by
/// `usemtl` before (or without) any `newmtl` definition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub texture_path: Option<PathBuf>,
}

/// Flat triangle mesh with material-tagged draw ranges. The sole
/// artifact of a load; owned exclusively by the caller afterward.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Consecutive triples form one triangle each.
    pub vertices: Vec<Vertex>,
    /// Partition of `vertices` into draw ranges, in creation order.
    pub subsets: Vec<Subset>,
    /// Material table; keys are the names seen in `usemtl`/`newmtl`.
    pub materials: HashMap<String, Material>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Returns `true` if the subsets tile the vertex sequence exactly:
    /// contiguous, non-overlapping, triangle-aligned, no gaps.
    pub fn is_valid(&self) -> bool {
        let mut next_start = 0;
        for subset in &self.subsets {
            if subset.start != next_start || subset.length % 3 != 0 {
                return false;
            }
            next_start += subset.length;
        }
        next_start == self.vertices.len()
    }
}
