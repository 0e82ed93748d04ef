//! Screen-space ray generation and triangle hit-testing
//!
//! A pick unprojects the cursor at the near and far clip depths through the
//! inverse view-projection, then runs a Möller–Trumbore intersection against
//! world-space mesh triangles.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Screen-space rectangle the scene is rendered into, in pixels
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Build a world-space pick ray from a cursor position. The origin is
    /// the cursor unprojected at the near plane; the direction points at its
    /// far-plane unprojection.
    pub fn from_screen(screen: Vec2, viewport: Viewport, view: Mat4, projection: Mat4) -> Self {
        let inverse = (projection * view).inverse();
        let near = unproject(screen, 0.0, viewport, inverse);
        let far = unproject(screen, 1.0, viewport, inverse);
        Self {
            origin: near,
            direction: (far - near).normalize(),
        }
    }

    /// Möller–Trumbore ray/triangle intersection. Returns the distance
    /// along the ray, or `None` for misses, parallel rays, and hits behind
    /// the origin.
    pub fn intersects_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        let e1 = v1 - v0;
        let e2 = v2 - v0;

        let h = self.direction.cross(e2);
        let det = e1.dot(h);
        if det.abs() < f32::EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - v0;
        let u = s.dot(h) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(e1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }
}

/// Unproject a screen position at the given clip depth (0 = near, 1 = far).
fn unproject(screen: Vec2, depth: f32, viewport: Viewport, inverse_view_proj: Mat4) -> Vec3 {
    let ndc_x = (screen.x - viewport.x) / viewport.width * 2.0 - 1.0;
    let ndc_y = 1.0 - (screen.y - viewport.y) / viewport.height * 2.0;

    let world = inverse_view_proj * Vec4::new(ndc_x, ndc_y, depth, 1.0);
    world.truncate() / world.w
}
