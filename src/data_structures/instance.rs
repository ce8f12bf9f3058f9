//! Actor transforms and the per-instance data uploaded for instanced draws.

use cgmath::{One, Rotation3};

/// Position, rotation (as quaternion) and scale of an actor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(position: cgmath::Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Rotation from pitch (x), yaw (y) and roll (z), applied as Rx · Ry · Rz.
    pub fn set_euler(
        &mut self,
        pitch: impl Into<cgmath::Rad<f32>>,
        yaw: impl Into<cgmath::Rad<f32>>,
        roll: impl Into<cgmath::Rad<f32>>,
    ) {
        self.rotation = cgmath::Quaternion::from_angle_x(pitch)
            * cgmath::Quaternion::from_angle_y(yaw)
            * cgmath::Quaternion::from_angle_z(roll);
    }

    /// World matrix T · S · R: a point is rotated, then scaled, then translated.
    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
            * cgmath::Matrix4::from(self.rotation)
    }

    /// Largest scale component, used as a uniform size estimate.
    pub fn max_scale(&self) -> f32 {
        self.scale.x.abs().max(self.scale.y.abs()).max(self.scale.z.abs())
    }
}

impl From<cgmath::Vector3<f32>> for Transform {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Transform::at(position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the actual data stored on the GPU: one full
 * model-view-projection matrix per instance.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub mvp: [[f32; 4]; 4],
}

impl From<cgmath::Matrix4<f32>> for InstanceRaw {
    fn from(mvp: cgmath::Matrix4<f32>) -> Self {
        Self { mvp: mvp.into() }
    }
}

impl InstanceRaw {
    /**
     * Stride layout here: the 4x4 matrix takes up four vertex slots as it is
     * technically four vec4s, following the three vertex attributes at
     * locations 0..=2.
     */
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // The shader only moves on to the next matrix when it starts
            // processing a new instance
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
