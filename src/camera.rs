//! Cameras: look-at views, projection and the per-frame active camera.
//!
//! A level may hold several cameras. Every camera is ticked once per frame;
//! the one reporting [`Camera::is_primary`] is drawn from. When no camera is
//! primary the last camera ticked is used.

use cgmath::{InnerSpace, Rotation3};
use instant::Duration;

use crate::scene::Actor;

/// cgmath builds OpenGL clip space (z in -1..1), wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Where a camera is, what it looks at and how wide it sees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraView {
    pub position: cgmath::Point3<f32>,
    pub looking_at: cgmath::Point3<f32>,
    pub up: cgmath::Vector3<f32>,
    pub fov: cgmath::Deg<f32>,
}

impl CameraView {
    pub fn new(
        position: impl Into<cgmath::Point3<f32>>,
        looking_at: impl Into<cgmath::Point3<f32>>,
    ) -> Self {
        Self {
            position: position.into(),
            looking_at: looking_at.into(),
            up: cgmath::Vector3::unit_y(),
            fov: cgmath::Deg(45.0),
        }
    }

    pub fn view_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::look_at_rh(self.position, self.looking_at, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32, znear: f32, zfar: f32) -> cgmath::Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fov, aspect, znear, zfar)
    }

    /// Projection · view, ready to be multiplied with a world matrix.
    pub fn view_projection(&self, aspect: f32, znear: f32, zfar: f32) -> cgmath::Matrix4<f32> {
        self.projection_matrix(aspect, znear, zfar) * self.view_matrix()
    }
}

/// A camera owned by a level.
pub trait Camera {
    /// Advance the camera. Actors are passed so a camera can follow one.
    fn tick(&mut self, dt: Duration, actors: &[Box<dyn Actor>]);

    fn view(&self) -> CameraView;

    /// A primary camera is drawn from regardless of tick order.
    fn is_primary(&self) -> bool {
        false
    }
}

/// A camera that never moves.
#[derive(Clone, Debug)]
pub struct FixedCamera {
    pub view: CameraView,
    pub primary: bool,
}

impl FixedCamera {
    pub fn new(view: CameraView) -> Self {
        Self {
            view,
            primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }
}

impl Camera for FixedCamera {
    fn tick(&mut self, _: Duration, _: &[Box<dyn Actor>]) {}

    fn view(&self) -> CameraView {
        self.view
    }

    fn is_primary(&self) -> bool {
        self.primary
    }
}

/// Circles around `view.looking_at` at a constant angular speed, keeping its height.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub view: CameraView,
    pub speed: cgmath::Deg<f32>,
    pub primary: bool,
}

impl OrbitCamera {
    /// `speed` is in degrees per second.
    pub fn new(view: CameraView, speed: cgmath::Deg<f32>) -> Self {
        Self {
            view,
            speed,
            primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }
}

impl Camera for OrbitCamera {
    fn tick(&mut self, dt: Duration, _: &[Box<dyn Actor>]) {
        let arm = self.view.position - self.view.looking_at;
        if arm.magnitude2() == 0.0 {
            return;
        }
        let rotation =
            cgmath::Quaternion::from_axis_angle(self.view.up.normalize(), self.speed * dt.as_secs_f32());
        self.view.position = self.view.looking_at + rotation * arm;
    }

    fn view(&self) -> CameraView {
        self.view
    }

    fn is_primary(&self) -> bool {
        self.primary
    }
}

/// Tick every camera in order and pick the one to draw from.
///
/// Returns the index of the first primary camera, or of the last camera
/// ticked when none is primary. `None` only for an empty slice.
pub fn tick_cameras(
    cameras: &mut [Box<dyn Camera>],
    dt: Duration,
    actors: &[Box<dyn Actor>],
) -> Option<usize> {
    let mut last = None;
    let mut primary = None;
    for (idx, camera) in cameras.iter_mut().enumerate() {
        camera.tick(dt, actors);
        if primary.is_none() && camera.is_primary() {
            primary = Some(idx);
        }
        last = Some(idx);
    }
    primary.or(last)
}
