//! Models: named vertex runs living at a fixed offset of the geometry buffer.

use std::{ops::Range, path::PathBuf};

use crate::{
    data_structures::vertex::{VERTEX_SIZE, Vertex},
    error::GpuError,
};

/// Index of a model in its level's model collection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub usize);

/// Index of a texture in its level's texture collection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// Where the pixels of a texture come from.
#[derive(Clone, Debug)]
pub enum TextureData {
    /// Image file relative to the assets directory. Resolved to `Encoded`
    /// before the level is loaded, see [`crate::resources::prefetch_textures`].
    File(PathBuf),
    /// Encoded image file contents (PNG, JPEG, ...).
    Encoded(Vec<u8>),
    /// Raw RGBA8 pixels, row-major.
    Rgba {
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    },
}

#[derive(Clone, Debug)]
pub struct TextureSource {
    pub name: String,
    pub data: TextureData,
}

impl TextureSource {
    pub fn file(name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            data: TextureData::File(path.into()),
        }
    }

    pub fn rgba(name: &str, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            data: TextureData::Rgba {
                width,
                height,
                pixels,
            },
        }
    }
}

/// A named, ordered run of vertices drawn as a triangle list.
///
/// The byte offset is assigned when the owning level is loaded into the
/// geometry buffer and stays valid until the next level load.
#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub texture: Option<TextureId>,
    offset: Option<u64>,
}

impl Model {
    pub fn new(name: &str, vertices: Vec<Vertex>) -> Self {
        Self {
            name: name.to_string(),
            vertices,
            texture: None,
            offset: None,
        }
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Byte offset of the first vertex, `None` until the level is loaded.
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub(crate) fn set_offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    pub fn byte_len(&self) -> u64 {
        self.vertices.len() as u64 * VERTEX_SIZE
    }

    /// Vertex index range used by a draw call: starts at `offset / size_of::<Vertex>()`.
    pub fn vertex_range(&self) -> Result<Range<u32>, GpuError> {
        let offset = self
            .offset
            .ok_or_else(|| GpuError::ModelNotLoaded(self.name.clone()))?;
        let end = offset / VERTEX_SIZE + self.vertices.len() as u64;
        let first = draw_index(offset / VERTEX_SIZE, "vertices")?;
        Ok(first..draw_index(end, "vertices")?)
    }
}

/// Narrow a vertex or instance index to what wgpu draw calls take.
pub fn draw_index(count: u64, what: &'static str) -> Result<u32, GpuError> {
    u32::try_from(count).map_err(|_| GpuError::DrawRange { what, count })
}
