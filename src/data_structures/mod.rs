//! Engine data structures: vertices, models, transforms and textures.
//!
//! - `vertex` is the packed record stored in the geometry buffer
//! - `model` contains named vertex runs and their buffer offsets
//! - `instance` holds actor transforms and per-instance GPU data
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `shapes` generates vertices for simple primitives

pub mod instance;
pub mod model;
pub mod shapes;
pub mod texture;
pub mod vertex;
