//! Render pipeline construction and combined shader sources.

pub mod basic;
pub mod shader;
