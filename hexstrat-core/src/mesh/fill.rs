//! Solid fill of a set of cells

use rustc_hash::FxHashSet;

use super::MeshData;
use crate::hex::{corner_offset, Direction, Hex};

/// A six-triangle fan per cell: center vertex first, then corners 0..6.
///
/// `dilate` scales each corner away from (positive) or toward (negative) the
/// cell center. With `contiguous`, corners shared with in-set neighbors are
/// kept on the shared edges so adjacent fans meet without a gap:
/// - neighbors on both sides of the corner: corner left undilated
/// - neighbor on one side: corner only moves along the shared edge
pub fn fill(cells: &[Hex], dilate: f32, contiguous: bool) -> MeshData {
    let set: FxHashSet<Hex> = if contiguous {
        cells.iter().copied().collect()
    } else {
        FxHashSet::default()
    };

    let mut mesh = MeshData::with_capacity(cells.len() * 7, cells.len() * 6);
    for &cell in cells {
        let center = cell.to_world();
        let base = mesh.push_vertex(center);
        for v in 0..6 {
            let corner = if contiguous {
                let on_left = set.contains(&cell.neighbor(Direction::from_index(v - 1)));
                let on_right = set.contains(&cell.neighbor(Direction::from_index(v)));
                match (on_left, on_right) {
                    (true, true) => corner_offset(v),
                    (true, false) => corner_offset(v) * (1.0 + dilate) + corner_offset(v - 1) * -dilate,
                    (false, true) => corner_offset(v) * (1.0 + dilate) + corner_offset(v + 1) * -dilate,
                    (false, false) => corner_offset(v) * (1.0 + dilate),
                }
            } else {
                corner_offset(v) * (1.0 + dilate)
            };
            mesh.push_vertex(center + corner);
        }

        for s in 0..6 {
            mesh.push_triangle(base, base + 1 + s, base + 1 + (s + 1) % 6);
        }
    }
    mesh
}
