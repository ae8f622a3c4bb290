//! Procedural overlay meshes built from hex cells
//!
//! Every generator returns plain vertex and index buffers in world space
//! (y = 0). Triangles are wound so that `(b - a) x (c - a)` points up (+Y).

pub mod arrow;
pub mod brim;
pub mod fill;
pub mod outline;
pub mod wireframe;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::triangle_normal;

pub use arrow::{arrow, ArrowStyle};
pub use brim::brim;
pub use fill::fill;
pub use outline::outline;
pub use wireframe::grid;

/// Vertex and triangle-index buffers
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(triangles * 3),
        }
    }

    /// Index the next pushed vertex will get
    pub fn next_index(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn push_vertex(&mut self, position: Vec3) -> u32 {
        let index = self.next_index();
        self.positions.push(position);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Face normal of every triangle, in index order
    pub fn triangle_normals(&self) -> Vec<Vec3> {
        self.indices
            .chunks_exact(3)
            .map(|tri| {
                triangle_normal(
                    self.positions[tri[0] as usize],
                    self.positions[tri[1] as usize],
                    self.positions[tri[2] as usize],
                )
            })
            .collect()
    }
}
