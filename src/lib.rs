// src/lib.rs
//! Homestead
//!
//! A day/night house diorama built on wgpu and winit. One angle parameter
//! drives the sun and moon across the sky, the light rig, and the sky shader;
//! an imgui panel exposes the tunables and a bloom chain makes the sun glow.

pub mod app;
pub mod celestial;
pub mod error;
pub mod gfx;
pub mod params;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::HomesteadApp;
pub use celestial::CelestialAnimator;
pub use error::SceneError;
pub use params::{BloomSettings, Parameters};

/// Creates a default application instance
pub fn default() -> HomesteadApp {
    pollster::block_on(HomesteadApp::new())
}
