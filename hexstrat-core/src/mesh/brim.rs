//! Skirt extending the map edge out to a fixed radius

use super::MeshData;
use crate::hex::{corner_offset, Direction, Hex};

/// Ring of quads from the outward-facing edges of a map of `radius` out to a
/// circle of `outer_radius` around the origin.
///
/// Each edge endpoint is projected radially onto the circle. Neighboring
/// quads share those endpoints exactly, so the ring has no cracks. Points
/// already beyond `outer_radius` stay where they are.
pub fn brim(radius: u32, outer_radius: f32) -> MeshData {
    let r = radius as i32;
    let mut mesh = MeshData::new();
    for cell in Hex::vancouver_ring(Hex::ORIGIN, radius) {
        let center = cell.to_world();
        for d in Direction::ALL {
            if cell.neighbor(d).length() <= r {
                continue;
            }
            let i = d.index() as i32;
            let inner_left = center + corner_offset(i);
            let inner_right = center + corner_offset(i + 1);
            let outer_left = inner_left.normalize_or_zero() * outer_radius.max(inner_left.length());
            let outer_right = inner_right.normalize_or_zero() * outer_radius.max(inner_right.length());

            let base = mesh.push_vertex(inner_left);
            mesh.push_vertex(inner_right);
            mesh.push_vertex(outer_left);
            mesh.push_vertex(outer_right);
            mesh.push_triangle(base, base + 2, base + 1);
            mesh.push_triangle(base + 1, base + 2, base + 3);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_support::assert_faces_up;

    #[test]
    fn test_single_cell_brim() {
        let mesh = brim(0, 3.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_faces_up(&mesh);
        for quad in mesh.positions.chunks_exact(4) {
            assert!((quad[2].length() - 3.0).abs() < 1e-5);
            assert!((quad[3].length() - 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_brim_edge_count() {
        // A map of radius r exposes 6 * (2r + 1) outer edges
        for radius in 1..5u32 {
            let mesh = brim(radius, 20.0);
            assert_eq!(mesh.vertex_count(), 4 * 6 * (2 * radius as usize + 1));
            assert_faces_up(&mesh);
        }
    }

    #[test]
    fn test_brim_is_closed() {
        // Every outer endpoint is shared by exactly two quads
        let mesh = brim(2, 10.0);
        let outer: Vec<_> = mesh
            .positions
            .chunks_exact(4)
            .flat_map(|q| [q[2], q[3]])
            .collect();
        for p in &outer {
            let shared = outer.iter().filter(|o| (**o - *p).length() < 1e-4).count();
            assert_eq!(shared, 2);
        }
    }
}
