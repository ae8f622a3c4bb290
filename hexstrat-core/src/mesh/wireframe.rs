//! Grid lines for the whole map

use super::MeshData;
use crate::hex::{corner_offset, Hex};

/// Thin inset border inside every cell of a map of `radius`.
///
/// Per cell: 12 vertices (an inner and outer ring, interleaved) and one quad
/// per side. `thickness` is the inset as a fraction of the circumradius.
pub fn grid(radius: u32, thickness: f32) -> MeshData {
    let cells = Hex::vancouver_square(Hex::ORIGIN, radius);
    let mut mesh = MeshData::with_capacity(cells.len() * 12, cells.len() * 12);
    for cell in cells {
        let center = cell.to_world();
        let base = mesh.next_index();
        for v in 0..6 {
            mesh.push_vertex(center + corner_offset(v) * (1.0 - thickness));
            mesh.push_vertex(center + corner_offset(v));
        }
        for side in 0..6u32 {
            let e = side * 2;
            let inner = base + e;
            let outer = base + e + 1;
            let next_inner = base + (e + 2) % 12;
            let next_outer = base + (e + 3) % 12;
            mesh.push_triangle(inner, outer, next_inner);
            mesh.push_triangle(outer, next_outer, next_inner);
        }
    }
    mesh
}
