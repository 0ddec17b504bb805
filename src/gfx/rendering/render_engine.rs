// src/gfx/rendering/render_engine.rs
//! WGPU-based render engine for the homestead scene
//!
//! Owns the surface, device, and every pass in the frame: the lit scene pass
//! and sky pass into an offscreen HDR buffer, then either a plain blit or the
//! bloom chain onto the surface, and finally the UI overlay.

use std::sync::Arc;
use wgpu::{Device, TextureFormat};

use crate::gfx::{
    camera::CameraUniform,
    resources::{
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
        texture_resource::TextureResource,
    },
    scene::registry::{NodeRole, SceneRegistry},
    scene::{object::DrawObject, Scene},
};
use crate::params::BloomSettings;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

use super::bloom::BloomChain;
use super::pipeline_manager::{PipelineConfig, PipelineManager};

/// Uniform fed to the sky shader. One scalar, padded to 16 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SkyUniformContent {
    sun_angle: f32,
    _pad: [f32; 3],
}

type SkyUBO = UniformBuffer<SkyUniformContent>;

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    depth_texture: TextureResource,
    scene_color: TextureResource,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    sky_ubo: SkyUBO,
    sky_bind_group: wgpu::BindGroup,
    bloom: BloomChain,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Panics
    /// Panics if unable to create a wgpu adapter or device
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> RenderEngine {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = {
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits {
                        max_texture_dimension_2d: 4096,
                        ..wgpu::Limits::downlevel_defaults()
                    },
                    memory_hints: wgpu::MemoryHints::default(),
                    trace: wgpu::Trace::Off,
                })
                .await
                .expect("Failed to request a device!")
        };

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            // Fifo keeps the loop at the display's refresh cadence.
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let scene_color = TextureResource::create_color_target(
            &device,
            width,
            height,
            TextureResource::HDR_FORMAT,
            "Scene Color",
        );

        // Global uniforms: camera plus the celestial light rig
        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        // Sky shader uniform, its own tiny group
        let sky_layout: BindGroupLayoutWithDesc = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .create(&device, "Sky Bind Group");
        let sky_ubo = SkyUBO::new(&device);
        let sky_bind_group = BindGroupBuilder::new(&sky_layout)
            .resource(sky_ubo.binding_resource())
            .create(&device, "Sky Bind Group");

        // Per-object transform layout, must match Object::init_gpu_resources
        let transform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Transform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        // Borrow the material layout shape from a temporary binding set
        let temp_material_bindings =
            crate::gfx::resources::material::MaterialBindings::new(&device);
        let material_bind_group_layout = temp_material_bindings.bind_group_layout().clone();

        let bloom = BloomChain::new(&device, &scene_color, width, height);

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        let _ = pipeline_manager.load_shader("scene", include_str!("scene.wgsl"));
        let _ = pipeline_manager.load_shader("sky", include_str!("sky.wgsl"));
        let _ = pipeline_manager.load_shader("bright", include_str!("bright_pass.wgsl"));
        let _ = pipeline_manager.load_shader("blur", include_str!("bloom_blur.wgsl"));
        let _ = pipeline_manager.load_shader("composite", include_str!("bloom_composite.wgsl"));
        let _ = pipeline_manager.load_shader("blit", include_str!("blit.wgsl"));

        let hdr_target = vec![Some(wgpu::ColorTargetState {
            format: TextureResource::HDR_FORMAT,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];
        let surface_target = vec![Some(wgpu::ColorTargetState {
            format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        pipeline_manager.register_pipeline(
            "Scene",
            PipelineConfig::default()
                .with_label("SCENE")
                .with_shader("scene")
                .with_depth_stencil(depth_texture.texture.clone())
                .with_color_targets(hdr_target.clone())
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    transform_bind_group_layout.clone(),
                    material_bind_group_layout,
                ]),
        );

        // The sky dome is seen from inside, so no culling
        pipeline_manager.register_pipeline(
            "Sky",
            PipelineConfig::default()
                .with_label("SKY")
                .with_shader("sky")
                .with_depth_stencil(depth_texture.texture.clone())
                .with_color_targets(hdr_target.clone())
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    transform_bind_group_layout,
                    sky_layout.layout.clone(),
                ]),
        );

        pipeline_manager.register_pipeline(
            "BloomExtract",
            PipelineConfig::default()
                .with_label("BLOOM EXTRACT")
                .with_shader("bright")
                .with_color_targets(hdr_target.clone())
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    bloom.input_layout.layout.clone(),
                    bloom.params_layout.layout.clone(),
                ])
                .with_no_vertex_buffers(),
        );

        pipeline_manager.register_pipeline(
            "BloomBlur",
            PipelineConfig::default()
                .with_label("BLOOM BLUR")
                .with_shader("blur")
                .with_color_targets(hdr_target)
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    bloom.input_layout.layout.clone(),
                    bloom.params_layout.layout.clone(),
                ])
                .with_no_vertex_buffers(),
        );

        pipeline_manager.register_pipeline(
            "BloomComposite",
            PipelineConfig::default()
                .with_label("BLOOM COMPOSITE")
                .with_shader("composite")
                .with_color_targets(surface_target.clone())
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    bloom.composite_layout.layout.clone(),
                    bloom.params_layout.layout.clone(),
                ])
                .with_no_vertex_buffers(),
        );

        pipeline_manager.register_pipeline(
            "Blit",
            PipelineConfig::default()
                .with_label("BLIT")
                .with_shader("blit")
                .with_color_targets(surface_target)
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![bloom.input_layout.layout.clone()])
                .with_no_vertex_buffers(),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{error}");
            }
        }

        RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            format,
            depth_texture,
            scene_color,
            pipeline_manager,
            global_ubo,
            global_bindings,
            sky_ubo,
            sky_bind_group,
            bloom,
        }
    }

    /// Updates the global and sky uniform buffers for this frame.
    ///
    /// Should be called each frame after the animator has run, so the
    /// uploaded light rig and sky angle are numerically current.
    pub fn update(&mut self, camera_uniform: CameraUniform, registry: &SceneRegistry) {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera_uniform, registry);

        self.sky_ubo.update_content(
            &self.queue,
            SkyUniformContent {
                sun_angle: registry.sky_angle,
                _pad: [0.0; 3],
            },
        );
    }

    /// Renders one frame: scene and sky into the HDR buffer, then either the
    /// bloom chain or a plain blit onto the surface, then the UI overlay.
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        clear_color: [f32; 3],
        bloom_settings: &BloomSettings,
        ui_callback: Option<F>,
    ) where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.bloom.update(&self.queue, bloom_settings);

        let surface_texture = self
            .surface
            .get_current_texture()
            .expect("Failed to get surface texture!");

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let sky_index = scene.registry.object_index(NodeRole::Sky);

        // PASS 1: sky and lit objects into the offscreen HDR buffer
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.scene_color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear_color[0] as f64,
                            g: clear_color[1] as f64,
                            b: clear_color[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            // Sky dome first, through its own pipeline
            if let Some(sky_index) = sky_index {
                if let (Some(sky_object), Some(pipeline)) = (
                    scene.objects.get(sky_index),
                    self.pipeline_manager.get_pipeline("Sky"),
                ) {
                    if let Some(transform_bind_group) = sky_object.transform_bind_group() {
                        render_pass.set_pipeline(pipeline);
                        render_pass.set_bind_group(1, transform_bind_group, &[]);
                        render_pass.set_bind_group(2, &self.sky_bind_group, &[]);
                        render_pass.draw_object(sky_object);
                    }
                }
            }

            if let Some(pipeline) = self.pipeline_manager.get_pipeline("Scene") {
                render_pass.set_pipeline(pipeline);

                for (index, object) in scene.objects.iter().enumerate() {
                    if Some(index) == sky_index || !object.visible {
                        continue;
                    }

                    let material = scene.material_for_object(object);
                    let (Some(material_bind_group), Some(transform_bind_group)) =
                        (material.bind_group(), object.transform_bind_group())
                    else {
                        continue;
                    };

                    render_pass.set_bind_group(1, transform_bind_group, &[]);
                    render_pass.set_bind_group(2, material_bind_group, &[]);
                    render_pass.draw_object(object);
                }
            }
        }

        if bloom_settings.enabled {
            // PASS 2: bright-pass extract into ping A
            Self::fullscreen_pass(
                &mut self.pipeline_manager,
                &mut encoder,
                "Bloom Extract Pass",
                "BloomExtract",
                &self.bloom.ping_a.view,
                &self.bloom.extract_bind_group,
                Some(&self.bloom.params_bind_group),
            );

            // PASS 3: horizontal blur, A -> B
            Self::fullscreen_pass(
                &mut self.pipeline_manager,
                &mut encoder,
                "Bloom Blur H Pass",
                "BloomBlur",
                &self.bloom.ping_b.view,
                &self.bloom.blur_h_bind_group,
                Some(&self.bloom.blur_h_params_bind_group),
            );

            // PASS 4: vertical blur, B -> A
            Self::fullscreen_pass(
                &mut self.pipeline_manager,
                &mut encoder,
                "Bloom Blur V Pass",
                "BloomBlur",
                &self.bloom.ping_a.view,
                &self.bloom.blur_v_bind_group,
                Some(&self.bloom.blur_v_params_bind_group),
            );

            // PASS 5: composite scene + glow onto the surface
            Self::fullscreen_pass(
                &mut self.pipeline_manager,
                &mut encoder,
                "Bloom Composite Pass",
                "BloomComposite",
                &surface_texture_view,
                &self.bloom.composite_bind_group,
                Some(&self.bloom.params_bind_group),
            );
        } else {
            Self::fullscreen_pass(
                &mut self.pipeline_manager,
                &mut encoder,
                "Blit Pass",
                "Blit",
                &surface_texture_view,
                &self.bloom.blit_bind_group,
                None,
            );
        }

        // Final pass: UI overlay (if provided)
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Convenience method for rendering with UI
    pub fn render_frame_with_ui<F>(
        &mut self,
        scene: &Scene,
        clear_color: [f32; 3],
        bloom_settings: &BloomSettings,
        ui_callback: F,
    ) where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.render_frame(scene, clear_color, bloom_settings, Some(ui_callback));
    }

    /// Convenience method for rendering without UI
    pub fn render_frame_simple(
        &mut self,
        scene: &Scene,
        clear_color: [f32; 3],
        bloom_settings: &BloomSettings,
    ) {
        self.render_frame(
            scene,
            clear_color,
            bloom_settings,
            None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
        );
    }

    /// Encodes one fullscreen triangle pass.
    ///
    /// Takes the pipeline manager separately so callers can keep borrowing
    /// the bloom chain's views and bind groups.
    fn fullscreen_pass(
        pipeline_manager: &mut PipelineManager,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        pipeline_name: &str,
        target: &wgpu::TextureView,
        input_bind_group: &wgpu::BindGroup,
        params_bind_group: Option<&wgpu::BindGroup>,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        if let Some(pipeline) = pipeline_manager.get_pipeline(pipeline_name) {
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, input_bind_group, &[]);
            if let Some(params) = params_bind_group {
                pass.set_bind_group(1, params, &[]);
            }
            pass.draw(0..3, 0..1);
        }
    }

    /// Resizes the surface and every size-dependent target.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
        self.scene_color = TextureResource::create_color_target(
            &self.device,
            width,
            height,
            TextureResource::HDR_FORMAT,
            "Scene Color",
        );
        self.bloom
            .resize(&self.device, &self.scene_color, width, height);
    }

    /// Returns current surface dimensions
    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Returns reference to the wgpu device
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns reference to the wgpu command queue
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
