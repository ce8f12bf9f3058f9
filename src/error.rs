//! Error types for GPU-facing calls and the frame loop.
//!
//! Every buffer, texture and draw operation returns a [`GpuError`] instead of
//! trapping, so the caller decides whether a failure only costs a frame or
//! ends the program. Scene and loop failures are wrapped in [`EngineError`].

use thiserror::Error;

use crate::data_structures::model::{ModelId, TextureId};

/// Failure of a buffer, texture or draw operation.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("buffer not initialized")]
    NotInitialized,
    #[error("vertex layout has not been formatted for this buffer")]
    NotFormatted,
    #[error("vertex layout was already formatted for this buffer")]
    AlreadyFormatted,
    #[error("buffer layout is sealed, appends must happen before format_layout")]
    Sealed,
    #[error("model `{0}` has no offset in the geometry buffer")]
    ModelNotLoaded(String),
    #[error("texture {0:?} is not part of the level")]
    MissingTexture(TextureId),
    #[error("texture `{name}` could not be loaded: {reason}")]
    TextureLoad { name: String, reason: String },
    #[error("allocation of {requested} bytes exceeds the device limit of {limit} bytes")]
    OutOfMemory { requested: u64, limit: u64 },
    #[error("write of {len} bytes at offset {offset} is not aligned to {alignment} bytes")]
    Misaligned { offset: u64, len: u64, alignment: u64 },
    #[error("{count} {what} do not fit the u32 range of a draw call")]
    DrawRange { what: &'static str, count: u64 },
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("gpu context lost")]
    ContextLost,
}

impl GpuError {
    /// Whether skipping the current frame is enough to recover.
    pub fn is_recoverable(&self) -> bool {
        match self {
            GpuError::Surface(wgpu::SurfaceError::OutOfMemory) => false,
            GpuError::Surface(_) => true,
            _ => false,
        }
    }
}

/// Failure while loading a level or running a frame.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error("actor {actor} references unknown model {model:?}")]
    UnknownModel { actor: usize, model: ModelId },
    #[error("level `{0}` has no camera")]
    NoCamera(String),
    #[error("no level loaded")]
    NoLevel,
}

/// Failure while splitting a combined shader source into its stages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShaderError {
    #[error("unknown shader stage `{stage}` on line {line}")]
    UnknownStage { stage: String, line: usize },
    #[error("shader source has no {0} stage")]
    MissingStage(&'static str),
}
