//! Rendering system with wgpu pipeline and shader management.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::RenderError;
use crate::frame::{FrameInput, RenderTarget, SurfaceSize};
use crate::params::{RecordingConfig, ShoreParams};

/// Uniform buffer for the shoreline shader (layout matches `ShoreUniforms` in shore.wgsl)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShoreUniforms {
    pub time: f32,
    pub shore_base: f32,
    pub resolution: [f32; 2],
    pub wave_frequency: [f32; 4],
    pub wave_speed: [f32; 4],
    pub wave_phase: [f32; 4],
    /// bend, bend frequency, bend phase, sharpness
    pub crest: [f32; 4],
    /// threshold, band, time scale, unused
    pub foam: [f32; 4],
    pub deep_water: [f32; 4],
    pub shallow_water: [f32; 4],
    pub foam_color: [f32; 4],
    pub wet_sand: [f32; 4],
    pub dry_sand: [f32; 4],
}

impl ShoreUniforms {
    pub fn new(params: &ShoreParams, time_s: f32, size: SurfaceSize) -> Self {
        let palette = &params.palette;
        Self {
            time: time_s,
            shore_base: params.shore_base,
            resolution: [size.width as f32, size.height as f32],
            wave_frequency: params.waves.map(|w| w.frequency),
            wave_speed: params.waves.map(|w| w.speed),
            wave_phase: params.waves.map(|w| w.phase_offset),
            crest: [
                params.crest_bend,
                params.crest_bend_frequency,
                params.crest_bend_phase,
                params.crest_sharpness,
            ],
            foam: [params.foam_threshold, params.foam_band, params.time_scale, 0.0],
            deep_water: palette.deep_water.extend(1.0).to_array(),
            shallow_water: palette.shallow_water.extend(1.0).to_array(),
            foam_color: palette.foam.extend(1.0).to_array(),
            wet_sand: palette.wet_sand.extend(1.0).to_array(),
            dry_sand: palette.dry_sand.extend(1.0).to_array(),
        }
    }
}

/// Rendering system managing wgpu device, pipeline and uniforms.
///
/// Owns every GPU handle of the renderer; dropping it releases them.
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    params: ShoreParams,
    recording_config: Option<RecordingConfig>,
    size: SurfaceSize,
    configured: bool,
}

impl RenderSystem {
    /// Create new rendering system
    pub async fn new(
        window: Arc<Window>,
        size: SurfaceSize,
        params: ShoreParams,
        recording_config: Option<RecordingConfig>,
    ) -> Result<Self, RenderError> {
        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Shore Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Device(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        if surface_caps.formats.is_empty() {
            return Err(RenderError::Surface(
                "surface reports no supported formats".to_string(),
            ));
        }

        // Shader writes display-ready values, so skip the sRGB encode
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;

        // Add COPY_SRC if recording (needed for frame capture)
        if recording_config.is_some() {
            if !surface_caps.usages.contains(wgpu::TextureUsages::COPY_SRC) {
                return Err(RenderError::Capture(
                    "surface does not support copying frames".to_string(),
                ));
            }
            usage |= wgpu::TextureUsages::COPY_SRC;
        }

        let config = wgpu::SurfaceConfiguration {
            usage,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // Catch WGSL validation failures instead of panicking
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shore Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shore.wgsl").into()),
        });

        let uniforms = ShoreUniforms::new(&params, 0.0, size);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shore Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shore Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shore Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shore Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shore Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = device.pop_error_scope().await {
            return Err(RenderError::Shader(error.to_string()));
        }

        let mut system = Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            uniform_buffer,
            uniform_bind_group,
            params,
            recording_config,
            size: SurfaceSize::default(),
            configured: false,
        };
        system.resize(size);

        Ok(system)
    }

    /// Update shader uniforms for a frame
    pub fn update_uniforms(&self, uniforms: &ShoreUniforms) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));
    }

    /// Reapply the current configuration (after a lost or outdated surface)
    pub fn reconfigure(&mut self) {
        if self.configured {
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Render a frame (and capture it if recording)
    pub fn render(&mut self, frame: &FrameInput) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => {
                if matches!(e, wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) {
                    self.reconfigure();
                }
                return Err(e.into());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shore Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        // Capture frame if recording
        if let Some(ref config) = self.recording_config {
            self.capture_frame(frame.frame_index, config, &output)?;
        }

        output.present();

        Ok(())
    }

    /// Capture a frame to disk (recording mode only)
    fn capture_frame(
        &self,
        frame_num: u64,
        config: &RecordingConfig,
        texture: &wgpu::SurfaceTexture,
    ) -> Result<(), RenderError> {
        let width = self.config.width;
        let height = self.config.height;
        let bytes_per_pixel = 4; // RGBA8 / BGRA8
        let unpadded_bytes_per_row = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Capture Buffer"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Capture Encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|e| RenderError::Capture(e.to_string()))?
            .map_err(|e| RenderError::Capture(e.to_string()))?;

        let data = buffer_slice.get_mapped_range();
        let image_data = unpad_rows(
            &data,
            padded_bytes_per_row as usize,
            unpadded_bytes_per_row as usize,
            height as usize,
            is_bgra(self.config.format),
        );
        drop(data);
        buffer.unmap();

        let path = config.frame_path(frame_num);
        image::save_buffer(&path, &image_data, width, height, image::ColorType::Rgba8)?;
        log::debug!("Captured {}", path);

        Ok(())
    }
}

impl RenderTarget for RenderSystem {
    fn resize(&mut self, size: SurfaceSize) {
        if self.configured && size == self.size {
            return;
        }
        self.size = size;

        // wgpu rejects zero-sized surfaces; wait for a real size
        if size.is_empty() {
            self.configured = false;
            return;
        }

        let max = self.device.limits().max_texture_dimension_2d;
        self.config.width = size.width.min(max);
        self.config.height = size.height.min(max);
        self.surface.configure(&self.device, &self.config);
        self.configured = true;
        log::info!(
            "Surface configured at {}x{}",
            self.config.width,
            self.config.height
        );
    }

    fn draw(&mut self, frame: &FrameInput) -> Result<(), RenderError> {
        if !self.configured {
            self.resize(frame.size);
        }
        let render_size = SurfaceSize::new(self.config.width, self.config.height);
        self.update_uniforms(&ShoreUniforms::new(&self.params, frame.time_s, render_size));
        self.render(frame)
    }
}

impl Drop for RenderSystem {
    fn drop(&mut self) {
        log::info!("Releasing GPU resources");
    }
}

fn is_bgra(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    )
}

/// Strip row padding from a mapped texture copy, converting BGRA to RGBA
fn unpad_rows(
    data: &[u8],
    padded_bytes_per_row: usize,
    unpadded_bytes_per_row: usize,
    height: usize,
    swap_red_blue: bool,
) -> Vec<u8> {
    let mut image_data = Vec::with_capacity(unpadded_bytes_per_row * height);
    for row in 0..height {
        let start = row * padded_bytes_per_row;
        image_data.extend_from_slice(&data[start..start + unpadded_bytes_per_row]);
    }
    if swap_red_blue {
        for pixel in image_data.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }
    }
    image_data
}
