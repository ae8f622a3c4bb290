//! Directional arrow along a path of cells

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::MeshData;
use crate::hex::{corner_offset, vertex_angle, Direction, Hex, CELL_HEIGHT, CIRCUMRADIUS, SIDE_LENGTH};
use crate::math::rotate_azimuth;

/// Arrow ribbon parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrowStyle {
    /// Ribbon width as a fraction of the circumradius
    pub width: f32,
    /// Segments in the rounded start cap
    pub cap_segments: u32,
    /// Segments per 60 degrees of turn
    pub curve_segments: u32,
}

impl Default for ArrowStyle {
    fn default() -> Self {
        Self {
            width: 0.25,
            cap_segments: 10,
            curve_segments: 10,
        }
    }
}

impl ArrowStyle {
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_segments(mut self, cap_segments: u32, curve_segments: u32) -> Self {
        self.cap_segments = cap_segments;
        self.curve_segments = curve_segments;
        self
    }
}

/// Ribbon from the first cell to the last: a rounded cap on the start cell,
/// straight pieces or fillets through the body, an arrowhead on the goal.
///
/// Tight turns (adjacent directions) bend around the vertex shared by the two
/// edges; wide turns bend around the center of the cell inside the turn.
/// Paths of fewer than two cells, or with non-adjacent consecutive cells,
/// produce an empty mesh.
pub fn arrow(path: &[Hex], style: &ArrowStyle) -> MeshData {
    if path.len() < 2 {
        return MeshData::new();
    }
    let dirs: Vec<Direction> = path
        .windows(2)
        .filter_map(|pair| pair[0].direction_to(pair[1]))
        .collect();
    if dirs.len() != path.len() - 1 {
        warn!(cells = path.len(), "arrow path is not contiguous");
        return MeshData::new();
    }

    let mut mesh = MeshData::new();
    let last = path.len() - 1;
    for t in 0..path.len() {
        let center = path[t].to_world();
        if t == 0 {
            let vec_next = path[1].to_world() - center;
            start_cap(&mut mesh, center, vec_next, dirs[0], style);
        } else if t == last {
            let vec_last = path[t - 1].to_world() - center;
            arrow_head(&mut mesh, center, vec_last, dirs[t - 1].opposite(), style);
        } else {
            let vec_last = path[t - 1].to_world() - center;
            let vec_next = path[t + 1].to_world() - center;
            let dir_last = dirs[t - 1].opposite();
            let dir_next = dirs[t];
            if dir_last.turns_to(dir_next) == 3 {
                straight(&mut mesh, center, vec_last, vec_next, dir_last, style);
            } else {
                curve(&mut mesh, path[t], dir_last, dir_next, style);
            }
        }
    }
    mesh
}

fn start_cap(mesh: &mut MeshData, center: Vec3, vec_next: Vec3, dir_next: Direction, style: &ArrowStyle) {
    let segments = style.cap_segments.max(1);
    let left = corner_offset(dir_next.index() as i32 - 1) * (style.width / 2.0);
    let out = center + vec_next / 2.0;

    // Trunk to the exit edge
    let b = mesh.push_vertex(center + left);
    mesh.push_vertex(center - left);
    mesh.push_vertex(out + left);
    mesh.push_vertex(out - left);
    mesh.push_triangle(b, b + 2, b + 1);
    mesh.push_triangle(b + 1, b + 2, b + 3);

    // Half-disc behind the center
    let hub = mesh.push_vertex(center);
    for i in 0..=segments {
        let angle = -180.0 * i as f32 / segments as f32;
        let point = mesh.push_vertex(center + rotate_azimuth(left, angle));
        if i > 0 {
            mesh.push_triangle(hub, point, point - 1);
        }
    }
}

fn arrow_head(mesh: &mut MeshData, center: Vec3, vec_last: Vec3, dir_last: Direction, style: &ArrowStyle) {
    let d = dir_last.index() as i32;
    let side = (style.width * 2.0).clamp(0.0, 1.0);

    let b = mesh.push_vertex(center);
    mesh.push_vertex(center + corner_offset(d) * side);
    mesh.push_vertex(center + corner_offset(d + 1) * side);
    mesh.push_triangle(b, b + 1, b + 2);

    // Trunk from the entry edge up to the base of the head
    let left = corner_offset(d - 1) * (style.width / 2.0);
    let edge_left = center + vec_last / 2.0 + left;
    let edge_right = center + vec_last / 2.0 - left;
    let inset = (SIDE_LENGTH - side * SIDE_LENGTH) / 2.0;
    let trunk = -vec_last.normalize_or_zero() * (2.0 * inset * CELL_HEIGHT);

    let t = mesh.push_vertex(edge_left + trunk);
    mesh.push_vertex(edge_right + trunk);
    mesh.push_vertex(edge_left);
    mesh.push_vertex(edge_right);
    mesh.push_triangle(t, t + 2, t + 1);
    mesh.push_triangle(t + 1, t + 2, t + 3);
}

fn straight(
    mesh: &mut MeshData,
    center: Vec3,
    vec_last: Vec3,
    vec_next: Vec3,
    dir_last: Direction,
    style: &ArrowStyle,
) {
    let left = corner_offset(dir_last.index() as i32 - 1) * (style.width / 2.0);
    let b = mesh.push_vertex(center + vec_last / 2.0 + left);
    mesh.push_vertex(center + vec_last / 2.0 - left);
    mesh.push_vertex(center + vec_next / 2.0 + left);
    mesh.push_vertex(center + vec_next / 2.0 - left);
    mesh.push_triangle(b, b + 1, b + 2);
    mesh.push_triangle(b + 1, b + 3, b + 2);
}

fn curve(mesh: &mut MeshData, cell: Hex, dir_last: Direction, dir_next: Direction, style: &ArrowStyle) {
    let turns = dir_last.turns_to(dir_next);
    let tight = turns.abs() == 1;
    let left_turn = turns > 0;
    let dl = dir_last.index() as i32;
    let toward = if left_turn { dl + 1 } else { dl - 1 };
    let half_width = CIRCUMRADIUS * style.width / 2.0;

    let (pivot, inner, outer) = if tight {
        let corner = toward + if left_turn { 0 } else { 1 };
        (
            cell.to_world() + corner_offset(corner),
            SIDE_LENGTH / 2.0 - half_width,
            SIDE_LENGTH / 2.0 + half_width,
        )
    } else {
        (
            cell.neighbor(Direction::from_index(toward)).to_world(),
            CIRCUMRADIUS + SIDE_LENGTH / 2.0 - half_width,
            CIRCUMRADIUS + SIDE_LENGTH / 2.0 + half_width,
        )
    };

    let per_sixth = style.curve_segments.max(1);
    let segments = per_sixth * if tight { 2 } else { 1 };
    let start_angle = vertex_angle(toward + if left_turn { -2 } else { 3 });
    let sweep = if left_turn { -60.0 } else { 60.0 };

    let b = mesh.next_index();
    for i in 0..=segments {
        let angle = start_angle + sweep * i as f32 / per_sixth as f32;
        mesh.push_vertex(pivot + rotate_azimuth(Vec3::Z * inner, angle));
        mesh.push_vertex(pivot + rotate_azimuth(Vec3::Z * outer, angle));
        if i > 0 {
            let k = b + (i - 1) * 2;
            if left_turn {
                mesh.push_triangle(k, k + 2, k + 1);
                mesh.push_triangle(k + 1, k + 2, k + 3);
            } else {
                mesh.push_triangle(k, k + 1, k + 2);
                mesh.push_triangle(k + 1, k + 3, k + 2);
            }
        }
    }
}
