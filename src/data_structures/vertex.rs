//! The packed vertex record shared by every model in the geometry buffer.

use std::mem;

/// A single vertex as it is stored in the geometry buffer.
///
/// The record is packed without padding (3×f32 position, 4×u8 colour,
/// 2×f32 texture coordinates, 24 bytes) so that model data can be copied
/// byte-for-byte into GPU memory.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [u8; 4],
    pub tex_coords: [f32; 2],
}

/// Size of one [`Vertex`] in bytes. Also the stride of the vertex layout.
pub const VERTEX_SIZE: u64 = mem::size_of::<Vertex>() as u64;

impl Vertex {
    pub const fn new(position: [f32; 3], color: [u8; 4], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            color,
            tex_coords,
        }
    }

    /// Layout of a vertex inside the geometry buffer.
    ///
    /// The stride comes from the record itself, never from the offsets of the
    /// models appended to the buffer, so every model shares the same layout.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: VERTEX_SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Unorm8x4,
                },
                wgpu::VertexAttribute {
                    offset: (mem::size_of::<[f32; 3]>() + mem::size_of::<[u8; 4]>())
                        as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}
