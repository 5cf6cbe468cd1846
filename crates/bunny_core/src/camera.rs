//! 2D camera shared by the demo logic and the sprite renderer.
//!
//! World space is y-up; screen space is y-down with the origin at the top-left
//! corner of the viewport. The forward mapping is
//!
//!   screen = viewport / 2 + S(k.x, -k.y) * R(rotation) * (world - position)
//!
//! where `k = zoom` when the camera follows the window, and
//! `k = zoom * viewport / size` when it has a fixed logical `size` that is
//! stretched over the viewport. `project` inverts it. Neither direction guards
//! against `zoom == 0`: the scale collapses and `project` returns non-finite
//! coordinates.

use glam::{Mat4, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec2,
    /// Radians, counter-clockwise in world space.
    pub rotation: f32,
    pub zoom: f32,
    /// Fixed logical view size in world units at zoom 1. `None` uses the viewport.
    pub size: Option<Vec2>,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            zoom: 1.0,
            size: None,
        }
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = Some(size);
        self
    }

    /// Pixels per world unit along each axis.
    fn pixel_scale(&self, viewport: Vec2) -> Vec2 {
        match self.size {
            Some(size) => viewport / size * self.zoom,
            None => Vec2::splat(self.zoom),
        }
    }

    /// Screen-space point to world space.
    pub fn project(&self, screen: Vec2, viewport: Vec2) -> Vec2 {
        let scale = self.pixel_scale(viewport);
        let centered = screen - viewport * 0.5;
        let local = Vec2::new(centered.x / scale.x, -centered.y / scale.y);
        self.position + Vec2::from_angle(-self.rotation).rotate(local)
    }

    /// World-space point to screen space.
    pub fn unproject(&self, world: Vec2, viewport: Vec2) -> Vec2 {
        let scale = self.pixel_scale(viewport);
        let local = Vec2::from_angle(self.rotation).rotate(world - self.position);
        viewport * 0.5 + Vec2::new(local.x * scale.x, -local.y * scale.y)
    }

    /// Clip-space matrix for the same transform, with the view centered on the
    /// camera position.
    pub fn view_projection(&self, viewport: Vec2) -> Mat4 {
        let half = self.size.unwrap_or(viewport) * 0.5;
        let proj = Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, -1.0, 1.0);
        let view = Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0))
            * Mat4::from_rotation_z(self.rotation)
            * Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0));
        proj * view
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.rotation.is_finite()
            && self.zoom.is_finite()
            && self.size.map_or(true, |size| size.is_finite())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn assert_close(a: Vec2, b: Vec2) {
        assert!(
            (a - b).length() < 1e-3,
            "expected {:?} to be close to {:?}",
            a,
            b
        );
    }

    #[test]
    fn default_is_identity() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec2::ZERO);
        assert_eq!(camera.rotation, 0.0);
        assert_eq!(camera.zoom, 1.0);
    }

    #[test]
    fn viewport_center_maps_to_camera_position() {
        let camera = Camera {
            position: Vec2::new(40.0, -12.0),
            rotation: 0.7,
            zoom: 2.5,
            size: None,
        };
        assert_close(camera.project(VIEWPORT * 0.5, VIEWPORT), camera.position);
    }

    #[test]
    fn identity_project_flips_y_around_center() {
        let camera = Camera::new();
        // 100px right and 50px down from center is (+100, -50) in world space.
        let world = camera.project(Vec2::new(740.0, 410.0), VIEWPORT);
        assert_close(world, Vec2::new(100.0, -50.0));
    }

    #[test]
    fn zoom_scales_world_distance() {
        let camera = Camera {
            zoom: 2.0,
            ..Camera::new()
        };
        let world = camera.project(Vec2::new(740.0, 360.0), VIEWPORT);
        assert_close(world, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn project_inverts_unproject() {
        let cameras = [
            Camera::new(),
            Camera {
                position: Vec2::new(300.0, -75.0),
                rotation: PI / 3.0,
                zoom: 0.5,
                size: None,
            },
            Camera {
                position: Vec2::new(-20.0, 940.0),
                rotation: -2.0 * PI + 0.1,
                zoom: -1.5,
                size: None,
            },
        ];
        let points = [
            Vec2::ZERO,
            Vec2::new(950.0, 950.0),
            Vec2::new(-123.5, 42.25),
        ];
        for camera in &cameras {
            for &p in &points {
                let screen = camera.unproject(p, VIEWPORT);
                assert_close(camera.project(screen, VIEWPORT), p);
            }
        }
    }

    #[test]
    fn fixed_size_stretches_over_viewport() {
        // 640x360 logical units shown in a 1280x720 window: 2 px per unit.
        let camera = Camera::new().with_size(Vec2::new(640.0, 360.0));
        let world = camera.project(Vec2::new(740.0, 410.0), VIEWPORT);
        assert_close(world, Vec2::new(50.0, -25.0));
        assert_close(camera.unproject(Vec2::new(320.0, -180.0), VIEWPORT), VIEWPORT);
    }

    #[test]
    fn fixed_size_project_inverts_unproject() {
        let cameras = [
            Camera::new().with_size(Vec2::new(800.0, 600.0)),
            Camera {
                position: Vec2::new(12.0, -40.0),
                rotation: 1.1,
                zoom: 0.75,
                size: Some(Vec2::new(320.0, 240.0)),
            },
        ];
        for camera in &cameras {
            for viewport in [VIEWPORT, Vec2::new(1024.0, 1024.0)] {
                for p in [Vec2::ZERO, Vec2::new(-310.0, 77.5), Vec2::new(950.0, 950.0)] {
                    let screen = camera.unproject(p, viewport);
                    assert_close(camera.project(screen, viewport), p);
                }
            }
        }
    }

    #[test]
    fn fixed_size_view_projection_matches_unproject() {
        let camera = Camera {
            position: Vec2::new(-30.0, 15.0),
            rotation: -0.3,
            zoom: 1.25,
            size: Some(Vec2::new(400.0, 300.0)),
        };
        let world = Vec2::new(75.0, 40.0);
        let clip = camera
            .view_projection(VIEWPORT)
            .project_point3(Vec3::new(world.x, world.y, 0.0));
        let screen = Vec2::new(
            (clip.x + 1.0) * 0.5 * VIEWPORT.x,
            (1.0 - clip.y) * 0.5 * VIEWPORT.y,
        );
        assert_close(screen, camera.unproject(world, VIEWPORT));
    }

    #[test]
    fn zero_zoom_projection_is_not_finite() {
        let camera = Camera {
            zoom: 0.0,
            ..Camera::new()
        };
        let world = camera.project(Vec2::new(10.0, 20.0), VIEWPORT);
        assert!(!world.is_finite());

        let centered = camera.project(VIEWPORT * 0.5, VIEWPORT);
        assert!(!centered.is_finite());
    }

    #[test]
    fn view_projection_matches_unproject() {
        let camera = Camera {
            position: Vec2::new(64.0, 32.0),
            rotation: 0.4,
            zoom: 1.75,
            size: None,
        };
        let world = Vec2::new(200.0, -90.0);
        let clip = camera
            .view_projection(VIEWPORT)
            .project_point3(Vec3::new(world.x, world.y, 0.0));
        // NDC to pixels: x right, y down.
        let screen = Vec2::new(
            (clip.x + 1.0) * 0.5 * VIEWPORT.x,
            (1.0 - clip.y) * 0.5 * VIEWPORT.y,
        );
        assert_close(screen, camera.unproject(world, VIEWPORT));
    }

    #[test]
    fn is_finite_detects_nan() {
        let mut camera = Camera::new();
        assert!(camera.is_finite());
        camera.zoom = f32::NAN;
        assert!(!camera.is_finite());

        let sized = Camera::new().with_size(Vec2::new(f32::INFINITY, 10.0));
        assert!(!sized.is_finite());
    }
}
