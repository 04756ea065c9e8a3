// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, materials, and the global uniform bindings.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, LightConfig};
pub use material::{Material, MaterialManager};
pub use texture_resource::TextureResource;
