use std::collections::HashMap;

use facet_geometry::Topology;

use crate::error::Result;
use crate::shader::ShaderKind;

use super::{
    BufferId, BufferTarget, Objects, ProgramId, RenderBackend, ShaderId, UniformLocation,
    VertexLayout,
};

/// What a recorded draw call asked for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawKind {
    Arrays { first: u32, count: u32 },
    Elements { count: u32 },
}

/// A draw call as seen by [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub program: ProgramId,
    pub topology: Topology,
    pub kind: DrawKind,
    /// Attribute layouts in effect, ordered by location.
    pub attributes: Vec<VertexLayout>,
}

#[derive(Debug, Default)]
struct Storage {
    data: Vec<u8>,
    uploads: usize,
}

/// In-memory backend that records every object, upload and draw.
///
/// Shader units go through the same validation and reflection as on the GPU, so
/// compile/link errors and location lookups behave identically. Useful for
/// tests and for tooling that only needs numerized buffers.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    objects: Objects,
    storage: Vec<Storage>,
    uniforms: HashMap<(ProgramId, UniformLocation), Vec<u8>>,
    clear_color: Option<[f32; 4]>,
    draws: Vec<DrawCall>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw contents of a buffer.
    pub fn buffer(&self, id: BufferId) -> Option<&[u8]> {
        self.storage.get(id.index()).map(|s| s.data.as_slice())
    }

    /// Buffer contents reinterpreted as `f32` values.
    pub fn buffer_floats(&self, id: BufferId) -> Option<Vec<f32>> {
        self.buffer(id).map(bytemuck::pod_collect_to_vec)
    }

    /// Buffer contents reinterpreted as `u16` indices.
    pub fn buffer_indices(&self, id: BufferId) -> Option<Vec<u16>> {
        self.buffer(id).map(bytemuck::pod_collect_to_vec)
    }

    /// Number of `buffer_data` uploads that reached `id`.
    pub fn upload_count(&self, id: BufferId) -> usize {
        self.storage.get(id.index()).map_or(0, |s| s.uploads)
    }

    /// Total uploads across all buffers.
    pub fn total_uploads(&self) -> usize {
        self.storage.iter().map(|s| s.uploads).sum()
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        self.objects.bound(target)
    }

    pub fn attribute_layout(&self, location: u32) -> Option<(BufferId, VertexLayout)> {
        self.objects.attrib(location)
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.objects.current()
    }

    pub fn uniform(&self, program: ProgramId, location: UniformLocation) -> Option<&[u8]> {
        self.uniforms.get(&(program, location)).map(Vec::as_slice)
    }

    pub fn clear_color(&self) -> Option<[f32; 4]> {
        self.clear_color
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Vertices available to `program`: the shortest attribute stream wins.
    fn vertex_count(&self, program: ProgramId) -> usize {
        self.objects
            .program_attribs(program)
            .iter()
            .map(|(buf, layout)| {
                let len = self.buffer(*buf).map_or(0, <[u8]>::len);
                len / layout.stride() as usize
            })
            .min()
            .unwrap_or(0)
    }

    fn record(&mut self, topology: Topology, kind: DrawKind) {
        let Some(program) = self.objects.current() else {
            log::warn!("draw with no program in use");
            return;
        };
        let attributes = self
            .objects
            .program_attribs(program)
            .into_iter()
            .map(|(_, layout)| layout)
            .collect();
        self.draws.push(DrawCall { program, topology, kind, attributes });
    }
}

impl RenderBackend for HeadlessBackend {
    fn compile_shader(&mut self, kind: ShaderKind, source: &str) -> Result<ShaderId> {
        self.objects.compile(kind, source)
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId> {
        self.objects.link(vertex, fragment)
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.objects.attrib_location(program, name)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.objects.uniform_location(program, name)
    }

    fn create_buffer(&mut self, target: BufferTarget) -> BufferId {
        self.storage.push(Storage::default());
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
        if let Some(storage) = self.storage.get_mut(id.index()) {
            storage.data.clear();
            storage.data.extend_from_slice(data);
            storage.uploads += 1;
        }
    }

    fn uniform_data(&mut self, program: ProgramId, location: UniformLocation, data: &[u8]) {
        self.uniforms.insert((program, location), data.to_vec());
    }

    fn use_program(&mut self, program: ProgramId) {
        self.objects.use_program(program);
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = Some(color);
        self.draws.clear();
    }

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) {
        if let Some(program) = self.objects.current() {
            let available = self.vertex_count(program);
            if first as usize + count as usize > available {
                log::warn!("draw of {first}+{count} vertices exceeds the {available} uploaded");
            }
        }
        self.record(topology, DrawKind::Arrays { first, count });
    }

    fn draw_elements(&mut self, topology: Topology, count: u32) {
        if let (Some(program), Some(ibo)) =
            (self.objects.current(), self.objects.bound(BufferTarget::Index))
        {
            let available = self.vertex_count(program);
            let indices = self.buffer_indices(ibo).unwrap_or_default();
            if count as usize > indices.len() {
                log::warn!("draw of {count} indices exceeds the {} uploaded", indices.len());
            } else if let Some(bad) = indices[..count as usize]
                .iter()
                .find(|&&i| i as usize >= available)
            {
                log::warn!("index {bad} is out of range for {available} vertices");
            }
        }
        self.record(topology, DrawKind::Elements { count });
    }
}
