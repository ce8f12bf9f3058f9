//! Combined shader sources.
//!
//! One text file carries both stages. A line starting with `#shader vertex`
//! or `#shader fragment` opens a block that runs until the next marker or the
//! end of the file:
//!
//! ```text
//! #shader vertex
//! @vertex fn vs_main(...) -> ... { ... }
//!
//! #shader fragment
//! @fragment fn fs_main(...) -> ... { ... }
//! ```
//!
//! Text before the first marker is ignored. A stage given twice keeps the
//! later block.

use crate::{error::ShaderError, pipelines::basic::mk_basic_pipeline};

/// The built-in shader used when no other shader is configured.
pub const BASE_SHADER: &str = include_str!(concat!(env!("BATCH_NGIN_ASSETS"), "/base.shader"));

const MARKER: &str = "#shader";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Stage {
    Vertex,
    Fragment,
}

/// WGSL source of both stages of a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shader {
    pub vertex: String,
    pub fragment: String,
}

impl Shader {
    pub fn parse(source: &str) -> Result<Self, ShaderError> {
        let mut vertex: Option<String> = None;
        let mut fragment: Option<String> = None;
        let mut current: Option<Stage> = None;

        for (idx, line) in source.lines().enumerate() {
            if let Some(rest) = line.trim_start().strip_prefix(MARKER) {
                let stage = rest.trim();
                let (stage, block) = match stage {
                    "vertex" => (Stage::Vertex, &mut vertex),
                    "fragment" => (Stage::Fragment, &mut fragment),
                    _ => {
                        return Err(ShaderError::UnknownStage {
                            stage: stage.to_string(),
                            line: idx + 1,
                        });
                    }
                };
                if block.is_some() {
                    log::warn!(
                        "{:?} stage redefined on line {}, the earlier block is dropped",
                        stage,
                        idx + 1
                    );
                }
                *block = Some(String::new());
                current = Some(stage);
                continue;
            }
            let block = match current {
                Some(Stage::Vertex) => vertex.as_mut(),
                Some(Stage::Fragment) => fragment.as_mut(),
                None => None,
            };
            if let Some(block) = block {
                block.push_str(line);
                block.push('\n');
            }
        }

        Ok(Self {
            vertex: vertex.ok_or(ShaderError::MissingStage("vertex"))?,
            fragment: fragment.ok_or(ShaderError::MissingStage("fragment"))?,
        })
    }

    /// Compile both stages and link them into the engine's render pipeline.
    ///
    /// The vertex block must define `vs_main`, the fragment block `fs_main`.
    pub fn create_program(
        &self,
        device: &wgpu::Device,
        texture_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let vertex = wgpu::ShaderModuleDescriptor {
            label: Some("Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(self.vertex.as_str().into()),
        };
        let fragment = wgpu::ShaderModuleDescriptor {
            label: Some("Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(self.fragment.as_str().into()),
        };
        mk_basic_pipeline(device, texture_layout, format, vertex, fragment)
    }
}
