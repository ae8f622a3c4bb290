//! Outline around a set of cells

use rustc_hash::FxHashSet;

use super::MeshData;
use crate::hex::{corner_offset, Direction, Hex};

/// One quad per boundary edge (an edge whose neighbor is not in `cells`).
///
/// `dilate` pushes the outline out of (positive) or into (negative) the cell
/// perimeter, as a fraction of the circumradius. `thickness` extrudes the
/// quad outward by the same measure; a negative thickness extrudes inward.
/// At concave corners the extrusion slides along the adjoining boundary
/// edge instead of pointing away from the cell center, so neighboring quads
/// meet without overlap.
pub fn outline(cells: &[Hex], thickness: f32, dilate: f32) -> MeshData {
    let set: FxHashSet<Hex> = cells.iter().copied().collect();
    let mut edges: Vec<(Hex, i32)> = Vec::new();
    for &cell in cells {
        for d in Direction::ALL {
            if !set.contains(&cell.neighbor(d)) {
                edges.push((cell, d.index() as i32));
            }
        }
    }

    let mut mesh = MeshData::with_capacity(edges.len() * 4, edges.len() * 2);
    for (cell, d) in edges {
        let center = cell.to_world();
        let mut left = corner_offset(d) * (1.0 + dilate);
        let mut right = corner_offset(d + 1) * (1.0 + dilate);

        let left_concave = set.contains(&cell.neighbor(Direction::from_index(d - 1)));
        let right_concave = set.contains(&cell.neighbor(Direction::from_index(d + 1)));

        let mut left_ext = if left_concave {
            left + right * thickness
        } else {
            left * (1.0 + thickness)
        };
        let mut right_ext = if right_concave {
            right + left * thickness
        } else {
            right * (1.0 + thickness)
        };

        if left_concave {
            let offset = corner_offset(d - 1) * -dilate;
            left += offset;
            left_ext += offset;
        }
        if right_concave {
            let offset = corner_offset(d + 2) * -dilate;
            right += offset;
            right_ext += offset;
        }

        let base = mesh.push_vertex(center + left);
        mesh.push_vertex(center + right);
        mesh.push_vertex(center + left_ext);
        mesh.push_vertex(center + right_ext);

        if thickness >= 0.0 {
            mesh.push_triangle(base, base + 2, base + 1);
            mesh.push_triangle(base + 1, base + 2, base + 3);
        } else {
            mesh.push_triangle(base, base + 1, base + 2);
            mesh.push_triangle(base + 1, base + 3, base + 2);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::CIRCUMRADIUS;
    use crate::mesh::test_support::assert_faces_up;

    #[test]
    fn test_isolated_cell_has_six_quads() {
        let mesh = outline(&[Hex::new(2, -1)], 0.2, 0.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.indices.len(), 36);
        assert_faces_up(&mesh);
    }

    #[test]
    fn test_isolated_cell_extrusion() {
        let cell = Hex::new(1, 1);
        let mesh = outline(&[cell], 0.5, 0.1);
        let center = cell.to_world();
        for quad in mesh.positions.chunks_exact(4) {
            assert!(((quad[0] - center).length() - CIRCUMRADIUS * 1.1).abs() < 1e-5);
            assert!(((quad[2] - center).length() - CIRCUMRADIUS * 1.65).abs() < 1e-5);
        }
        assert_faces_up(&mesh);
    }

    #[test]
    fn test_negative_thickness_keeps_winding() {
        let mesh = outline(&[Hex::ORIGIN], -0.3, 0.0);
        assert_eq!(mesh.triangle_count(), 12);
        assert_faces_up(&mesh);
    }

    #[test]
    fn test_region_outline_counts_boundary_edges() {
        // Center plus full ring: 18 outer edges
        let cells = Hex::vancouver_square(Hex::ORIGIN, 1);
        let mesh = outline(&cells, 0.2, 0.0);
        assert_eq!(mesh.vertex_count(), 18 * 4);
        assert_faces_up(&mesh);

        // Two adjacent cells: 10 edges
        let mesh = outline(&[Hex::ORIGIN, Hex::new(1, 0)], 0.2, 0.0);
        assert_eq!(mesh.vertex_count(), 40);
        assert_faces_up(&mesh);
    }

    #[test]
    fn test_concave_corner_slides_along_edge() {
        // Origin's north edge: its north-west neighbor is in the set, so the
        // left corner is concave and extrudes toward the right corner.
        let cells = [Hex::ORIGIN, Hex::new(-1, 1)];
        let mesh = outline(&cells, 0.25, 0.0);
        let first = &mesh.positions[0..4];
        let left = corner_offset(0);
        let right = corner_offset(1);
        assert!((first[0] - left).length() < 1e-6);
        assert!((first[2] - (left + right * 0.25)).length() < 1e-6);
        assert!((first[3] - right * 1.25).length() < 1e-6);
    }

    #[test]
    fn test_empty_input() {
        assert!(outline(&[], 0.2, 0.1).is_empty());
    }
}
