use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::TrackSegment;

/// Left-bottom, left-top, right-top, right-bottom.
pub const POINTS_PER_SECTION: usize = 4;
/// Left wall, road surface, right wall.
pub const FACES_PER_SECTION: usize = POINTS_PER_SECTION - 1;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Cross-section of the road at `point`. Walls drop down to `z = 0`.
pub fn cross_section(point: Vec2, tangent: Vec2, width: f32, height: f32) -> [Vec3; 4] {
    let half = 0.5 * width * tangent;
    let left = point - half;
    let right = point + half;
    [
        left.extend(0.0),
        left.extend(height),
        right.extend(height),
        right.extend(0.0),
    ]
}

/// Flat-shaded triangle list: one cross-section per segment start plus a
/// closing one at the end of the last segment, joined pairwise.
pub fn build_mesh(segments: &[TrackSegment]) -> Vec<MeshVertex> {
    let Some(last) = segments.last() else {
        return Vec::new();
    };

    let mut points: Vec<Vec3> = Vec::with_capacity((segments.len() + 1) * POINTS_PER_SECTION);
    for segment in segments {
        points.extend(cross_section(
            segment.point,
            segment.tangent,
            segment.width,
            segment.height,
        ));
    }
    points.extend(cross_section(
        last.end_point(),
        last.tangent,
        last.width,
        last.height,
    ));

    let sections = points.len() / POINTS_PER_SECTION;
    let mut vertices = Vec::with_capacity((sections - 1) * FACES_PER_SECTION * 6);
    for i in 0..sections - 1 {
        let a = POINTS_PER_SECTION * i;
        let b = POINTS_PER_SECTION * (i + 1);
        for j in 0..FACES_PER_SECTION {
            push_face(&mut vertices, [points[a + j], points[a + j + 1], points[b + j]]);
            push_face(
                &mut vertices,
                [points[b + j + 1], points[b + j], points[a + j + 1]],
            );
        }
    }
    vertices
}

fn push_face(vertices: &mut Vec<MeshVertex>, face: [Vec3; 3]) {
    let normal = (face[1] - face[0])
        .cross(face[2] - face[0])
        .normalize_or_zero()
        .to_array();
    vertices.extend(face.iter().map(|p| MeshVertex {
        position: p.to_array(),
        normal,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_segments(count: usize) -> Vec<TrackSegment> {
        (0..count)
            .map(|i| TrackSegment {
                point: Vec2::new(0.0, 10.0 * i as f32),
                dir: Vec2::Y,
                tangent: Vec2::X,
                width: 8.0,
                length: 10.0,
                height: 5.0,
                distance: 10.0 * i as f32,
            })
            .collect()
    }

    #[test]
    fn emits_three_faces_per_section_pair() {
        let mesh = build_mesh(&straight_segments(3));
        assert_eq!(mesh.len(), 3 * FACES_PER_SECTION * 6);
    }

    #[test]
    fn road_surface_faces_up_and_walls_face_out() {
        let mesh = build_mesh(&straight_segments(1));
        // Per section pair: left wall (6), surface (6), right wall (6).
        for vertex in &mesh[6..12] {
            assert_eq!(vertex.normal[0], 0.0);
            assert_eq!(vertex.normal[1], 0.0);
            assert!((vertex.normal[2] - 1.0).abs() < 1e-6);
            assert_eq!(vertex.position[2], 5.0);
        }
        assert!(mesh[0].normal[0] < 0.0);
        assert!(mesh[12].normal[0] > 0.0);
    }

    #[test]
    fn closing_section_reaches_track_end() {
        let segments = straight_segments(2);
        let mesh = build_mesh(&segments);
        let max_y = mesh
            .iter()
            .map(|v| v.position[1])
            .fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(max_y, 20.0);
    }

    #[test]
    fn vertices_cast_to_bytes() {
        let mesh = build_mesh(&straight_segments(1));
        let bytes: &[u8] = bytemuck::cast_slice(&mesh);
        assert_eq!(bytes.len(), mesh.len() * 6 * 4);
    }

    #[test]
    fn empty_segments_yield_empty_mesh() {
        assert!(build_mesh(&[]).is_empty());
    }
}
