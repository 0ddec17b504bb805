// src/gfx/resources/global_bindings.rs
//! Global uniform bindings for camera and lighting
//!
//! One uniform buffer carries all per-frame global state the shaders need:
//! camera matrices plus the celestial light rig (sun and moon point lights,
//! ambient term, and the constant hemisphere tint). Bound to slot 0 in all
//! scene render pipelines.

use crate::{
    gfx::camera::CameraUniform,
    gfx::scene::registry::SceneRegistry,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Constant hemisphere tint: a faint night-sky blue from above and an ember
/// brown from below.
pub const HEMISPHERE_SKY_COLOR: [f32; 3] = [0.0, 0.122, 0.2];
pub const HEMISPHERE_GROUND_COLOR: [f32; 3] = [0.133, 0.043, 0.0];
pub const HEMISPHERE_INTENSITY: f32 = 0.5;

/// Global uniform buffer content structure
///
/// MUST match the Globals struct in scene.wgsl exactly, including padding.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],

    sun_position: [f32; 3],
    sun_intensity: f32,
    sun_color: [f32; 3],
    _pad0: f32,

    moon_position: [f32; 3],
    moon_intensity: f32,
    moon_color: [f32; 3],
    _pad1: f32,

    ambient_color: [f32; 3],
    ambient_intensity: f32,

    hemisphere_sky: [f32; 3],
    hemisphere_intensity: f32,
    hemisphere_ground: [f32; 3],
    _pad2: f32,
}

unsafe impl bytemuck::Pod for GlobalUBOContent {}
unsafe impl bytemuck::Zeroable for GlobalUBOContent {}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Updates the global uniform buffer from the camera and the registry's
/// light rig. Called once per frame before any pass is encoded.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    registry: &SceneRegistry,
) {
    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,

        sun_position: registry.sun_light.position.into(),
        sun_intensity: registry.sun_light.intensity,
        sun_color: registry.sun_light.color,
        _pad0: 0.0,

        moon_position: registry.moon_light.position.into(),
        moon_intensity: registry.moon_light.intensity,
        moon_color: registry.moon_light.color,
        _pad1: 0.0,

        ambient_color: registry.ambient.color,
        ambient_intensity: registry.ambient.intensity,

        hemisphere_sky: HEMISPHERE_SKY_COLOR,
        hemisphere_intensity: HEMISPHERE_INTENSITY,
        hemisphere_ground: HEMISPHERE_GROUND_COLOR,
        _pad2: 0.0,
    };

    ubo.update_content(queue, content);
}

/// Manages bind group layouts and bind groups for global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Creates the bind group with the provided uniform buffer
    ///
    /// Must be called after the uniform buffer is created and before
    /// any rendering operations that need global uniforms.
    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// # Panics
    /// Panics if `create_bind_group()` hasn't been called yet
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("Bind group has not been created yet!")
    }
}
