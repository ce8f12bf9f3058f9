use crate::{
    data_structures::{
        model::{TextureData, TextureId, TextureSource},
        texture::Texture,
    },
    error::GpuError,
};

/// Loads the textures of a level onto the GPU.
///
/// `unload_all` runs before a new level's textures are loaded; `load` is
/// called once per texture of the level, in order.
pub trait TextureLoader {
    fn unload_all(&mut self);

    fn load(&mut self, id: TextureId, source: &TextureSource) -> Result<(), GpuError>;
}

pub fn diffuse_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("Model texture_bind_group_layout"),
    })
}

fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some(label),
    })
}

#[derive(Debug)]
struct LoadedTexture {
    #[allow(unused)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// GPU textures of the current level, addressed by [`TextureId`].
#[derive(Debug)]
pub struct TextureSet {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: wgpu::BindGroup,
    loaded: Vec<Option<LoadedTexture>>,
}

impl TextureSet {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = diffuse_layout(device);
        let sampler = crate::data_structures::texture::create_default_sampler(device);
        let white = Texture::create_white(device, queue);
        let white = mk_bind_group(device, &layout, &white, &sampler, "white bind group");
        Self {
            device: device.clone(),
            queue: queue.clone(),
            layout,
            sampler,
            white,
            loaded: Vec::new(),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Bind group to use for a draw, the white fallback for untextured models.
    pub fn bind_group(&self, id: Option<TextureId>) -> Result<&wgpu::BindGroup, GpuError> {
        match id {
            None => Ok(&self.white),
            Some(id) => self
                .loaded
                .get(id.0)
                .and_then(Option::as_ref)
                .map(|loaded| &loaded.bind_group)
                .ok_or(GpuError::MissingTexture(id)),
        }
    }
}

impl TextureLoader for TextureSet {
    fn unload_all(&mut self) {
        self.loaded.clear();
    }

    fn load(&mut self, id: TextureId, source: &TextureSource) -> Result<(), GpuError> {
        let texture = match &source.data {
            TextureData::Encoded(bytes) => {
                Texture::from_bytes(&self.device, &self.queue, bytes, &source.name).map_err(|e| {
                    GpuError::TextureLoad {
                        name: source.name.clone(),
                        reason: e.to_string(),
                    }
                })?
            }
            TextureData::Rgba {
                width,
                height,
                pixels,
            } => {
                Texture::check_extent(&self.device, *width, *height).map_err(|e| {
                    GpuError::TextureLoad {
                        name: source.name.clone(),
                        reason: e.to_string(),
                    }
                })?;
                if pixels.len() != 4 * *width as usize * *height as usize {
                    return Err(GpuError::TextureLoad {
                        name: source.name.clone(),
                        reason: format!(
                            "{} bytes do not fill {}x{} RGBA pixels",
                            pixels.len(),
                            width,
                            height
                        ),
                    });
                }
                Texture::from_rgba(
                    &self.device,
                    &self.queue,
                    *width,
                    *height,
                    pixels,
                    Some(&source.name),
                )
            }
            TextureData::File(path) => {
                return Err(GpuError::TextureLoad {
                    name: source.name.clone(),
                    reason: format!("{} was not prefetched", path.display()),
                });
            }
        };
        let label = format!("{} bind group", source.name);
        let bind_group = mk_bind_group(&self.device, &self.layout, &texture, &self.sampler, &label);
        if self.loaded.len() <= id.0 {
            self.loaded.resize_with(id.0 + 1, || None);
        }
        self.loaded[id.0] = Some(LoadedTexture {
            texture,
            bind_group,
        });
        Ok(())
    }
}
