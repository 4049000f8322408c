//! Height tracing against the road floor.
//!
//! Heights are solved from the plane equation of each triangle, so a hit
//! reports the exact surface height rather than an interpolated one.

use glam::{Vec2, Vec3};

/// Sign-consistency test; points on an edge count as inside.
pub fn point_in_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> bool {
    let (a, b, c) = (a - p, b - p, c - p);
    let u = b.cross(c);
    let v = c.cross(a);
    if u.dot(v) < 0.0 {
        return false;
    }
    let w = a.cross(b);
    if u.dot(w) < 0.0 {
        return false;
    }
    v.dot(w) >= 0.0
}

/// Height of the triangle's plane above `p`, if `p` lies inside the triangle.
pub fn trace_triangle_height(p: Vec2, triangle: [Vec3; 3]) -> Option<f32> {
    let [t0, t1, t2] = triangle;
    let n = (t1 - t0).cross(t2 - t0).try_normalize()?;
    if n.z.abs() <= f32::EPSILON {
        // Vertical wall: no unique height above a 2D point.
        return None;
    }
    let d = n.dot(t0);
    let z = (d - (n.x * p.x + n.y * p.y)) / n.z;
    point_in_triangle(p.extend(z), t0, t1, t2).then_some(z)
}

/// Quad as `[start_left, start_right, end_left, end_right]`, split along the
/// `start_right`/`end_left` diagonal.
pub fn trace_quad_height(p: Vec2, quad: [Vec3; 4]) -> Option<f32> {
    let [q0, q1, q2, q3] = quad;
    trace_triangle_height(p, [q0, q1, q2]).or_else(|| trace_triangle_height(p, [q3, q2, q1]))
}

/// Unit direction for a heading angle (0 = +X, pi/2 = +Y).
#[inline]
pub fn dir_from_angle(angle: f32) -> Vec2 {
    Vec2::from_angle(angle)
}

#[inline]
pub fn angle_from_dir(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x)
}

/// Right-hand perpendicular of a travel direction.
#[inline]
pub fn right_of(dir: Vec2) -> Vec2 {
    Vec2::new(dir.y, -dir.x)
}
