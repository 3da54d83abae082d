//! Asset loading/parsers for line-oriented mesh formats.
//! E1: OBJ geometry reader producing a flat vertex buffer with
//!     per-material subsets.
//! E2: MTL material libraries (colors, shininess, texture paths).
//! E3: post-load fix-ups (flat normal synthesis, near-plane cull).

pub mod mesh;
pub mod mtl;
pub mod obj;
pub mod postprocess;

pub use mesh::{Material, Mesh, Subset, Vertex};
pub use obj::load_mesh_from_path;
