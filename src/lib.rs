//! batch-ngin
//!
//! A small level-based renderer. Every model of a level lives in one shared
//! vertex buffer, actors are grouped by model each frame and every group is
//! drawn with a single instanced call.
//!
//! High-level modules
//! - `geometry`: the shared vertex buffer and its storage backends
//! - `builder`: loads a level's models and textures into the buffer
//! - `batch`: per-frame grouping of actors by model
//! - `flow`: the engine context and frame loop
//! - `render`: draw planning and the wgpu renderer
//! - `scene`: levels, actors, controllers and collision
//! - `camera`: look-at cameras and active camera selection
//! - `app`: the winit application running an engine in a window
//! - `config`, `error`: configuration and error types
//!

pub mod app;
pub mod batch;
pub mod builder;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod geometry;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
