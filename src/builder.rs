//! Loads a [`Level`] into the geometry buffer and the texture loader.

use crate::{
    data_structures::model::{Model, TextureId},
    error::GpuError,
    geometry::{GeometryBuffer, VertexStore},
    resources::texture::TextureLoader,
    scene::Level,
};

/// What a level load produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    pub total_bytes: u64,
    pub stride: u64,
    pub model_count: usize,
}

pub struct BufferBuilder;

impl BufferBuilder {
    /// Replace whatever the buffer held with `level`.
    ///
    /// Sky block and terrain always occupy the first two ranges, followed by
    /// the model collection in order. Every model gets its offset recorded.
    /// On error the buffer is left deleted or unformatted and must not be drawn.
    pub fn load_level<S: VertexStore>(
        geometry: &mut GeometryBuffer<S>,
        textures: &mut dyn TextureLoader,
        level: &mut Level,
    ) -> Result<LevelLayout, GpuError> {
        geometry.delete();
        geometry.init(level.total_bytes())?;

        textures.unload_all();
        for (idx, source) in level.textures.iter().enumerate() {
            textures.load(TextureId(idx), source)?;
        }
        let texture_count = level.textures.len();

        append(geometry, &mut level.sky_block, texture_count)?;
        append(geometry, &mut level.terrain, texture_count)?;
        for model in level.models.iter_mut() {
            append(geometry, model, texture_count)?;
        }
        let vertex_layout = geometry.format_layout()?;

        let layout = LevelLayout {
            total_bytes: geometry.size(),
            stride: vertex_layout.array_stride,
            model_count: level.models.len(),
        };
        log::info!(
            "loaded level `{}`: {} models, {} textures, {} bytes of geometry",
            level.name,
            layout.model_count,
            texture_count,
            layout.total_bytes
        );
        Ok(layout)
    }
}

fn append<S: VertexStore>(
    geometry: &mut GeometryBuffer<S>,
    model: &mut Model,
    texture_count: usize,
) -> Result<(), GpuError> {
    if let Some(texture) = model.texture {
        if texture.0 >= texture_count {
            return Err(GpuError::MissingTexture(texture));
        }
    }
    let offset = geometry.add_data(&model.vertices)?;
    model.set_offset(offset);
    log::debug!(
        "model `{}` at offset {} ({} vertices)",
        model.name,
        offset,
        model.vertices.len()
    );
    Ok(())
}
