// src/gfx/resources/mod.rs
//! GPU resource management: materials, global bindings, and textures.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

pub use material::{Material, MaterialManager};
pub use texture_resource::TextureResource;
