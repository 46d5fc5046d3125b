use std::collections::{BTreeSet, HashMap};

use facet_geometry::Topology;

use crate::backend::{
    BufferId, BufferTarget, DrawKind, Objects, ProgramId, RenderBackend, ShaderId,
    UniformLocation, VertexLayout,
};
use crate::error::{Error, Result};
use crate::shader::ShaderKind;

use super::GpuInit;

/// wgpu implementation of [`RenderBackend`].
///
/// Draws land in an offscreen colour target owned by the backend. Each draw is
/// recorded into its own render pass and submitted immediately.
///
/// Pipelines are created lazily per (program, topology, attribute layouts) and
/// cached; buffers are reallocated only when an upload outgrows them.
pub struct GpuBackend {
    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Offscreen colour target.
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    target_format: wgpu::TextureFormat,

    objects: Objects,

    /// Indexed by `ShaderId`.
    modules: Vec<wgpu::ShaderModule>,
    /// Indexed by `ProgramId`: the (vertex, fragment) units it was linked from.
    programs: Vec<(ShaderId, ShaderId)>,
    /// Indexed by `BufferId`.
    buffers: Vec<GpuBuffer>,

    uniforms: HashMap<(ProgramId, UniformLocation), wgpu::Buffer>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

#[derive(Default)]
struct GpuBuffer {
    raw: Option<wgpu::Buffer>,
    capacity: u64,
    /// Bytes of the last upload.
    len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramId,
    topology: Topology,
    layouts: Vec<VertexLayout>,
}

impl GpuBackend {
    /// Creates a device and an offscreen target.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: GpuInit) -> Result<Self> {
        let GpuInit {
            power_preference,
            target_size: (width, height),
            target_format,
            required_features,
            required_limits,
        } = init;

        if width == 0 || height == 0 {
            return Err(Error::ContextUnavailable("colour target has zero size".into()));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::ContextUnavailable(format!("no suitable GPU adapter: {e}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("facet device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| {
                Error::ContextUnavailable(format!("failed to create wgpu device/queue: {e}"))
            })?;

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("facet colour target"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: target_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let info = adapter.get_info();
        log::info!("gpu backend on {} ({:?}), target {width}x{height}", info.name, info.backend);

        Ok(Self {
            device,
            queue,
            target,
            target_view,
            target_format,
            objects: Objects::default(),
            modules: Vec::new(),
            programs: Vec::new(),
            buffers: Vec::new(),
            uniforms: HashMap::new(),
            pipelines: HashMap::new(),
        })
    }

    /// Blocking variant of [`GpuBackend::new`].
    pub fn new_blocking(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Offscreen texture draws are rendered into.
    pub fn target(&self) -> &wgpu::Texture {
        &self.target
    }

    /// Number of cached render pipelines.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, key: &PipelineKey) {
        if self.pipelines.contains_key(key) {
            return;
        }
        let Some(&(vs, fs)) = self.programs.get(key.program.index()) else { return };
        let Some(interface) = self.objects.program(key.program) else { return };

        let attributes: Vec<[wgpu::VertexAttribute; 1]> = key
            .layouts
            .iter()
            .map(|l| {
                [wgpu::VertexAttribute {
                    format: vertex_format(l.components()),
                    offset: 0,
                    shader_location: l.location,
                }]
            })
            .collect();

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = key
            .layouts
            .iter()
            .zip(&attributes)
            .map(|(l, attrs)| wgpu::VertexBufferLayout {
                array_stride: l.stride(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("facet program pipeline"),
            // Derived from the shaders, so bind groups follow the reflected uniforms.
            layout: None,
            vertex: wgpu::VertexState {
                module: &self.modules[vs.index()],
                entry_point: Some(interface.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.modules[fs.index()],
                entry_point: Some(interface.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: primitive_topology(key.topology),
                strip_index_format: strip_index_format(key.topology),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("created pipeline for {:?} as {:?}", key.program, key.topology);
        self.pipelines.insert(key.clone(), pipeline);
    }

    /// Gives every uniform of `program` a buffer, zero-filled if never written.
    fn ensure_uniform_buffers(&mut self, program: ProgramId) {
        let Some(interface) = self.objects.program(program) else { return };
        for slot in &interface.uniforms {
            self.uniforms.entry((program, slot.location)).or_insert_with(|| {
                self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("facet uniform buffer"),
                    size: uniform_size(slot.size as u64),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            });
        }
    }

    fn bind_groups(&self, program: ProgramId, pipeline: &wgpu::RenderPipeline) -> Vec<(u32, wgpu::BindGroup)> {
        let Some(interface) = self.objects.program(program) else { return Vec::new() };
        let groups: BTreeSet<u32> = interface.uniforms.iter().map(|u| u.location.group).collect();

        groups
            .into_iter()
            .map(|group| {
                let entries: Vec<wgpu::BindGroupEntry<'_>> = interface
                    .uniforms
                    .iter()
                    .filter(|u| u.location.group == group)
                    .filter_map(|u| {
                        let buffer = self.uniforms.get(&(program, u.location))?;
                        Some(wgpu::BindGroupEntry {
                            binding: u.location.binding,
                            resource: buffer.as_entire_binding(),
                        })
                    })
                    .collect();

                let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("facet uniform bind group"),
                    layout: &pipeline.get_bind_group_layout(group),
                    entries: &entries,
                });
                (group, bind_group)
            })
            .collect()
    }

    fn raw_slice(&self, id: BufferId) -> Option<wgpu::BufferSlice<'_>> {
        let buffer = self.buffers.get(id.index())?;
        let raw = buffer.raw.as_ref()?;
        (buffer.len > 0).then(|| raw.slice(..buffer.len))
    }

    fn color_pass<'e>(
        encoder: &'e mut wgpu::CommandEncoder,
        view: &'e wgpu::TextureView,
        load: wgpu::LoadOp<wgpu::Color>,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("facet pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations { load, store: wgpu::StoreOp::Store },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }

    fn draw(&mut self, topology: Topology, kind: DrawKind) {
        let Some(program) = self.objects.current() else {
            log::warn!("draw with no program in use");
            return;
        };
        let Some(interface) = self.objects.program(program) else { return };

        let attribs = self.objects.program_attribs(program);
        if let Some(missing) = interface
            .attributes
            .iter()
            .find(|a| !attribs.iter().any(|(_, l)| l.location == a.location))
        {
            log::warn!("attribute at location {} has no vertex buffer; draw skipped", missing.location);
            return;
        }

        let key = PipelineKey {
            program,
            topology,
            layouts: attribs.iter().map(|(_, l)| *l).collect(),
        };
        self.ensure_pipeline(&key);
        self.ensure_uniform_buffers(program);

        let Some(pipeline) = self.pipelines.get(&key) else { return };
        let bind_groups = self.bind_groups(program, pipeline);

        let mut vertex_slices = Vec::with_capacity(attribs.len());
        for (buffer, layout) in &attribs {
            let Some(slice) = self.raw_slice(*buffer) else {
                log::warn!("vertex buffer for location {} is empty; draw skipped", layout.location);
                return;
            };
            vertex_slices.push(slice);
        }

        let index_slice = match kind {
            DrawKind::Elements { .. } => {
                let slice = self
                    .objects
                    .bound(BufferTarget::Index)
                    .and_then(|id| self.raw_slice(id));
                if slice.is_none() {
                    log::warn!("indexed draw with no index data; draw skipped");
                    return;
                }
                slice
            }
            DrawKind::Arrays { .. } => None,
        };

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("facet draw encoder"),
        });
        {
            let mut rpass = Self::color_pass(&mut encoder, &self.target_view, wgpu::LoadOp::Load);
            rpass.set_pipeline(pipeline);
            for (group, bind_group) in &bind_groups {
                rpass.set_bind_group(*group, bind_group, &[]);
            }
            for (slot, slice) in vertex_slices.into_iter().enumerate() {
                rpass.set_vertex_buffer(slot as u32, slice);
            }
            match (kind, index_slice) {
                (DrawKind::Elements { count }, Some(indices)) => {
                    rpass.set_index_buffer(indices, wgpu::IndexFormat::Uint16);
                    rpass.draw_indexed(0..count, 0, 0..1);
                }
                (DrawKind::Arrays { first, count }, _) => rpass.draw(first..first + count, 0..1),
                (DrawKind::Elements { .. }, None) => {}
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl RenderBackend for GpuBackend {
    fn compile_shader(&mut self, kind: ShaderKind, source: &str) -> Result<ShaderId> {
        let id = self.objects.compile(kind, source)?;
        let label = format!("facet {kind} shader");
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label.as_str()),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        self.modules.push(module);
        Ok(id)
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId> {
        let id = self.objects.link(vertex, fragment)?;
        self.programs.push((vertex, fragment));
        Ok(id)
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.objects.attrib_location(program, name)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.objects.uniform_location(program, name)
    }

    fn create_buffer(&mut self, target: BufferTarget) -> BufferId {
        self.buffers.push(GpuBuffer::default());
        self.objects.create_buffer(target)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferId) {
        self.objects.bind(target, buffer);
    }

    fn vertex_attrib_pointer(&mut self, layout: VertexLayout) {
        self.objects.attrib_pointer(layout);
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        let Some(id) = self.objects.bound(target) else {
            log::warn!("upload with no {target} buffer bound");
            return;
        };
        let Some(buffer) = self.buffers.get_mut(id.index()) else { return };

        let padded = (data.len() as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        if buffer.raw.is_none() || buffer.capacity < padded {
            let capacity = padded.next_power_of_two().max(64);
            let usage = match target {
                BufferTarget::Vertex => wgpu::BufferUsages::VERTEX,
                BufferTarget::Index => wgpu::BufferUsages::INDEX,
            };
            buffer.raw = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("facet program buffer"),
                size: capacity,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            buffer.capacity = capacity;
        }

        if let Some(raw) = &buffer.raw {
            write_padded(&self.queue, raw, data);
        }
        buffer.len = data.len() as u64;
    }

    fn uniform_data(&mut self, program: ProgramId, location: UniformLocation, data: &[u8]) {
        let Some(slot) = self
            .objects
            .program(program)
            .and_then(|p| p.uniforms.iter().find(|u| u.location == location))
        else {
            log::warn!("{program:?} has no uniform at group {}, binding {}", location.group, location.binding);
            return;
        };

        let size = uniform_size((slot.size as u64).max(data.len() as u64));
        let buffer = self
            .uniforms
            .entry((program, location))
            .or_insert_with(|| create_uniform_buffer(&self.device, size));
        if buffer.size() < size {
            *buffer = create_uniform_buffer(&self.device, size);
        }
        write_padded(&self.queue, buffer, data);
    }

    fn use_program(&mut self, program: ProgramId) {
        self.objects.use_program(program);
    }

    fn clear(&mut self, color: [f32; 4]) {
        let [r, g, b, a] = color.map(f64::from);
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("facet clear encoder"),
        });
        drop(Self::color_pass(
            &mut encoder,
            &self.target_view,
            wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
        ));
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) {
        if count == 0 {
            return;
        }
        self.draw(topology, DrawKind::Arrays { first, count });
    }

    fn draw_elements(&mut self, topology: Topology, count: u32) {
        if count == 0 {
            return;
        }
        self.draw(topology, DrawKind::Elements { count });
    }
}

// ── wgpu mappings ─────────────────────────────────────────────────────────

fn vertex_format(components: u8) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

fn primitive_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::Points => wgpu::PrimitiveTopology::PointList,
        Topology::Lines => wgpu::PrimitiveTopology::LineList,
        Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
        Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

fn strip_index_format(topology: Topology) -> Option<wgpu::IndexFormat> {
    match topology {
        Topology::LineStrip | Topology::TriangleStrip => Some(wgpu::IndexFormat::Uint16),
        _ => None,
    }
}

/// Uniform buffers are sized in 16-byte steps (std140-style alignment).
fn uniform_size(bytes: u64) -> u64 {
    bytes.max(16).next_multiple_of(16)
}

fn create_uniform_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("facet uniform buffer"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// `Queue::write_buffer` needs a 4-byte multiple; odd `u16` index counts get a zero pad.
fn write_padded(queue: &wgpu::Queue, buffer: &wgpu::Buffer, data: &[u8]) {
    if data.is_empty() {
        return;
    }
    let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
    if data.len() % align == 0 {
        queue.write_buffer(buffer, 0, data);
    } else {
        let mut padded = data.to_vec();
        padded.resize(data.len().next_multiple_of(align), 0);
        queue.write_buffer(buffer, 0, &padded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_target_is_rejected_before_adapter_request() {
        let init = GpuInit { target_size: (0, 400), ..GpuInit::default() };
        assert!(matches!(GpuBackend::new_blocking(init), Err(Error::ContextUnavailable(_))));
    }

    #[test]
    fn uniform_sizes_round_up_to_16() {
        assert_eq!(uniform_size(0), 16);
        assert_eq!(uniform_size(12), 16);
        assert_eq!(uniform_size(64), 64);
        assert_eq!(uniform_size(65), 80);
    }

    const VS: &str = r#"
        @vertex
        fn vs_main(@location(0) a_Position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(a_Position.xy, 0.5, 1.0);
        }
    "#;

    const FS: &str = r#"
        @group(0) @binding(0) var<uniform> u_Color: vec4<f32>;

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return u_Color;
        }
    "#;

    /// A small backend, or `None` on machines without a usable adapter.
    fn gpu() -> Option<GpuBackend> {
        let init = GpuInit { target_size: (64, 64), ..GpuInit::default() };
        match GpuBackend::new_blocking(init) {
            Ok(gpu) => Some(gpu),
            Err(Error::ContextUnavailable(reason)) => {
                eprintln!("no GPU, skipping: {reason}");
                None
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    fn capacity_and_len(gpu: &GpuBackend, id: BufferId) -> (u64, u64) {
        let buffer = &gpu.buffers[id.index()];
        (buffer.capacity, buffer.len)
    }

    #[test]
    fn uploads_grow_buffers_and_draws_reuse_pipelines() {
        let Some(mut gpu) = gpu() else { return };

        let vs = gpu.compile_shader(ShaderKind::Vertex, VS).unwrap();
        let fs = gpu.compile_shader(ShaderKind::Fragment, FS).unwrap();
        let program = gpu.link_program(vs, fs).unwrap();

        let vbo = gpu.create_buffer(BufferTarget::Vertex);
        gpu.bind_buffer(BufferTarget::Vertex, vbo);
        gpu.vertex_attrib_pointer(VertexLayout::new(0, 3).unwrap());
        let quad: [f32; 12] = [
            -0.5, -0.5, 0.0, //
            -0.5, 0.5, 0.0, //
            0.5, 0.5, 0.0, //
            0.5, -0.5, 0.0,
        ];
        gpu.buffer_data(BufferTarget::Vertex, bytemuck::cast_slice(&quad));
        assert_eq!(capacity_and_len(&gpu, vbo), (64, 48));

        // Three u16 indices are 6 bytes; the write is padded, the draw range is not.
        let ibo = gpu.create_buffer(BufferTarget::Index);
        gpu.bind_buffer(BufferTarget::Index, ibo);
        gpu.buffer_data(BufferTarget::Index, bytemuck::cast_slice(&[0u16, 1, 2]));
        assert_eq!(capacity_and_len(&gpu, ibo), (64, 6));

        let color = gpu.uniform_location(program, "u_Color").unwrap();
        gpu.uniform_data(program, color, bytemuck::cast_slice(&[1.0f32, 0.0, 0.0, 1.0]));

        gpu.use_program(program);
        gpu.clear([0.0, 0.0, 0.0, 1.0]);
        gpu.draw_elements(Topology::Triangles, 3);
        gpu.draw_arrays(Topology::Triangles, 0, 3);
        assert_eq!(gpu.pipeline_count(), 1);

        gpu.draw_elements(Topology::TriangleStrip, 3);
        assert_eq!(gpu.pipeline_count(), 2);

        // 40 vertices outgrow the first allocation; a smaller refill keeps it.
        gpu.buffer_data(BufferTarget::Vertex, bytemuck::cast_slice(&[0.0f32; 120]));
        assert_eq!(capacity_and_len(&gpu, vbo), (512, 480));
        gpu.buffer_data(BufferTarget::Vertex, bytemuck::cast_slice(&quad));
        assert_eq!(capacity_and_len(&gpu, vbo), (512, 48));

        gpu.draw_arrays(Topology::Triangles, 0, 3);
        assert_eq!(gpu.pipeline_count(), 2);
    }

    #[test]
    fn strips_carry_an_index_format() {
        assert_eq!(strip_index_format(Topology::LineStrip), Some(wgpu::IndexFormat::Uint16));
        assert_eq!(strip_index_format(Topology::Triangles), None);
        assert_eq!(vertex_format(3), wgpu::VertexFormat::Float32x3);
    }
}
