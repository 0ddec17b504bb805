// src/gfx/rendering/bloom.rs
//! Bloom post-processing resources
//!
//! Ordered chain over the offscreen scene buffer: bright-pass threshold
//! extract, separable gaussian blur (one pass per axis, ping-ponging between
//! two HDR targets), then composite onto the surface. Strength, radius, and
//! threshold come from the parameter store every frame.

use crate::gfx::resources::texture_resource::TextureResource;
use crate::params::BloomSettings;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BloomUniform {
    strength: f32,
    radius: f32,
    threshold: f32,
    _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniform {
    texel: [f32; 2],
    direction: [f32; 2],
    radius: f32,
    _pad: [f32; 3],
}

/// GPU resources for the bloom chain.
///
/// The blurred result always lands back in `ping_a`, which is what the
/// composite bind group samples.
pub struct BloomChain {
    pub input_layout: BindGroupLayoutWithDesc,
    pub composite_layout: BindGroupLayoutWithDesc,
    pub params_layout: BindGroupLayoutWithDesc,

    pub ping_a: TextureResource,
    pub ping_b: TextureResource,

    pub extract_bind_group: wgpu::BindGroup,
    pub blur_h_bind_group: wgpu::BindGroup,
    pub blur_v_bind_group: wgpu::BindGroup,
    pub composite_bind_group: wgpu::BindGroup,
    pub blit_bind_group: wgpu::BindGroup,

    pub params_bind_group: wgpu::BindGroup,
    pub blur_h_params_bind_group: wgpu::BindGroup,
    pub blur_v_params_bind_group: wgpu::BindGroup,

    params_ubo: UniformBuffer<BloomUniform>,
    blur_h_ubo: UniformBuffer<BlurUniform>,
    blur_v_ubo: UniformBuffer<BlurUniform>,

    width: u32,
    height: u32,
}

impl BloomChain {
    pub fn new(
        device: &wgpu::Device,
        scene_color: &TextureResource,
        width: u32,
        height: u32,
    ) -> Self {
        let input_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Bloom Input Layout");

        let composite_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .next_binding_fragment(binding_types::texture_2d())
            .create(device, "Bloom Composite Layout");

        let params_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Bloom Params Layout");

        let params_ubo = UniformBuffer::new(device);
        let blur_h_ubo = UniformBuffer::new(device);
        let blur_v_ubo = UniformBuffer::new(device);

        let params_bind_group = BindGroupBuilder::new(&params_layout)
            .resource(params_ubo.binding_resource())
            .create(device, "Bloom Params Bind Group");
        let blur_h_params_bind_group = BindGroupBuilder::new(&params_layout)
            .resource(blur_h_ubo.binding_resource())
            .create(device, "Blur H Params Bind Group");
        let blur_v_params_bind_group = BindGroupBuilder::new(&params_layout)
            .resource(blur_v_ubo.binding_resource())
            .create(device, "Blur V Params Bind Group");

        let (ping_a, ping_b) = Self::create_targets(device, width, height);
        let (
            extract_bind_group,
            blur_h_bind_group,
            blur_v_bind_group,
            composite_bind_group,
            blit_bind_group,
        ) = Self::create_io_bind_groups(
            device,
            &input_layout,
            &composite_layout,
            scene_color,
            &ping_a,
            &ping_b,
        );

        Self {
            input_layout,
            composite_layout,
            params_layout,
            ping_a,
            ping_b,
            extract_bind_group,
            blur_h_bind_group,
            blur_v_bind_group,
            composite_bind_group,
            blit_bind_group,
            params_bind_group,
            blur_h_params_bind_group,
            blur_v_params_bind_group,
            params_ubo,
            blur_h_ubo,
            blur_v_ubo,
            width,
            height,
        }
    }

    fn create_targets(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (TextureResource, TextureResource) {
        let ping_a = TextureResource::create_color_target(
            device,
            width,
            height,
            TextureResource::HDR_FORMAT,
            "Bloom Ping A",
        );
        let ping_b = TextureResource::create_color_target(
            device,
            width,
            height,
            TextureResource::HDR_FORMAT,
            "Bloom Ping B",
        );
        (ping_a, ping_b)
    }

    fn create_io_bind_groups(
        device: &wgpu::Device,
        input_layout: &BindGroupLayoutWithDesc,
        composite_layout: &BindGroupLayoutWithDesc,
        scene_color: &TextureResource,
        ping_a: &TextureResource,
        ping_b: &TextureResource,
    ) -> (
        wgpu::BindGroup,
        wgpu::BindGroup,
        wgpu::BindGroup,
        wgpu::BindGroup,
        wgpu::BindGroup,
    ) {
        let extract = BindGroupBuilder::new(input_layout)
            .texture(&scene_color.view)
            .sampler(&scene_color.sampler)
            .create(device, "Bloom Extract Bind Group");

        let blur_h = BindGroupBuilder::new(input_layout)
            .texture(&ping_a.view)
            .sampler(&ping_a.sampler)
            .create(device, "Bloom Blur H Bind Group");

        let blur_v = BindGroupBuilder::new(input_layout)
            .texture(&ping_b.view)
            .sampler(&ping_b.sampler)
            .create(device, "Bloom Blur V Bind Group");

        let composite = BindGroupBuilder::new(composite_layout)
            .texture(&scene_color.view)
            .sampler(&scene_color.sampler)
            .texture(&ping_a.view)
            .create(device, "Bloom Composite Bind Group");

        let blit = BindGroupBuilder::new(input_layout)
            .texture(&scene_color.view)
            .sampler(&scene_color.sampler)
            .create(device, "Blit Bind Group");

        (extract, blur_h, blur_v, composite, blit)
    }

    /// Recreates the ping-pong targets and bind groups after a surface resize.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        scene_color: &TextureResource,
        width: u32,
        height: u32,
    ) {
        self.width = width;
        self.height = height;

        let (ping_a, ping_b) = Self::create_targets(device, width, height);
        self.ping_a = ping_a;
        self.ping_b = ping_b;

        let (extract, blur_h, blur_v, composite, blit) = Self::create_io_bind_groups(
            device,
            &self.input_layout,
            &self.composite_layout,
            scene_color,
            &self.ping_a,
            &self.ping_b,
        );
        self.extract_bind_group = extract;
        self.blur_h_bind_group = blur_h;
        self.blur_v_bind_group = blur_v;
        self.composite_bind_group = composite;
        self.blit_bind_group = blit;
    }

    /// Syncs the chain's uniforms from the current settings.
    pub fn update(&mut self, queue: &wgpu::Queue, settings: &BloomSettings) {
        self.params_ubo.update_content(
            queue,
            BloomUniform {
                strength: settings.strength,
                radius: settings.radius,
                threshold: settings.threshold,
                _pad: 0.0,
            },
        );

        let texel = [
            1.0 / self.width.max(1) as f32,
            1.0 / self.height.max(1) as f32,
        ];
        self.blur_h_ubo.update_content(
            queue,
            BlurUniform {
                texel,
                direction: [1.0, 0.0],
                radius: settings.radius,
                _pad: [0.0; 3],
            },
        );
        self.blur_v_ubo.update_content(
            queue,
            BlurUniform {
                texel,
                direction: [0.0, 1.0],
                radius: settings.radius,
                _pad: [0.0; 3],
            },
        );
    }
}
