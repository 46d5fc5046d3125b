//! Shader programs and the buffers that feed them.
//!
//! A [`GlProgram`] is built from a [`ProgramConfig`]: both stages are compiled
//! and linked, the configured attribute/uniform names are resolved once, and the
//! optional vertex/index buffers are created and bound. Afterwards the program
//! only moves data; draw calls stay with the caller.
//!
//! ```rust
//! use facet_engine::backend::HeadlessBackend;
//! use facet_engine::program::{GlProgram, ProgramConfig};
//! use facet_geometry::Point3;
//!
//! const VS: &str = "@vertex fn vs(@location(0) a_Position: vec3<f32>) -> @builtin(position) vec4<f32> { return vec4<f32>(a_Position, 1.0); }";
//! const FS: &str = "@fragment fn fs() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
//!
//! let mut backend = HeadlessBackend::new();
//! let config = ProgramConfig::new()
//!     .with_sources(VS, FS)
//!     .with_attributes(["a_Position"])
//!     .with_vertex_buffer("a_Position", 3);
//!
//! let program = GlProgram::new(&mut backend, &config)?;
//! program.write_vertices(&mut backend, &[Point3::zero(), Point3::xy(1.0, 0.0)])?;
//! # Ok::<(), facet_engine::Error>(())
//! ```

mod config;
mod fetch;

use facet_geometry::{Mesh, Point3, Topology};

use crate::backend::{BufferId, BufferTarget, ProgramId, RenderBackend, UniformLocation, VertexLayout};
use crate::error::{Error, Result};
use crate::shader::ShaderKind;

pub use config::{ProgramConfig, ShaderSource, VertexBufferConfig};
pub use fetch::{FileFetcher, SourceFetcher, StaticFetcher};

/// Construction progress of a program.
///
/// `BufferConfigured` is entered once per configured buffer. Only `Ready`
/// programs are handed out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProgramState {
    Uninitialized,
    Compiling,
    Linked,
    BufferConfigured,
    Ready,
}

#[derive(Debug, Copy, Clone)]
struct VertexBuffer {
    id: BufferId,
    layout: VertexLayout,
}

/// A linked program with its resolved locations and owned buffers.
#[derive(Debug)]
pub struct GlProgram {
    program: ProgramId,

    /// Configured attributes in declaration order; `None` when unresolved.
    attributes: Vec<(String, Option<u32>)>,
    uniforms: Vec<(String, Option<UniformLocation>)>,

    vertex_buffer: Option<VertexBuffer>,
    index_buffer: Option<BufferId>,

    state: ProgramState,
}

impl GlProgram {
    /// Compiles, links and configures a program from inline sources.
    ///
    /// Configurations naming shader URLs must go through
    /// [`GlProgram::from_sources`].
    pub fn new<B: RenderBackend + ?Sized>(backend: &mut B, config: &ProgramConfig) -> Result<Self> {
        config.validate()?;
        let (ShaderSource::Inline(vs_source), ShaderSource::Inline(fs_source)) =
            (config.source(ShaderKind::Vertex)?, config.source(ShaderKind::Fragment)?)
        else {
            return Err(Error::config(
                "shader URLs must be fetched first (use GlProgram::from_sources)",
            ));
        };

        let mut state = ProgramState::Uninitialized;
        advance(&mut state, ProgramState::Compiling);

        let vs = backend.compile_shader(ShaderKind::Vertex, vs_source)?;
        let fs = backend.compile_shader(ShaderKind::Fragment, fs_source)?;
        let program = backend.link_program(vs, fs)?;
        advance(&mut state, ProgramState::Linked);

        let attributes = resolve(&config.attributes, |name| backend.attrib_location(program, name));
        let uniforms = resolve(&config.uniforms, |name| backend.uniform_location(program, name));

        let vertex_buffer = match &config.vertex_buffer {
            Some(vb) => {
                let location = attributes
                    .iter()
                    .find(|(name, _)| *name == vb.name)
                    .and_then(|(_, location)| *location)
                    .ok_or_else(|| {
                        Error::config(format!("attribute `{}` is not exposed by the program", vb.name))
                    })?;
                let layout = VertexLayout::new(location, vb.size).ok_or_else(|| {
                    Error::config(format!("vertex buffer size {} is outside 1..=4", vb.size))
                })?;

                let id = backend.create_buffer(BufferTarget::Vertex);
                backend.bind_buffer(BufferTarget::Vertex, id);
                backend.vertex_attrib_pointer(layout);
                advance(&mut state, ProgramState::BufferConfigured);
                Some(VertexBuffer { id, layout })
            }
            None => None,
        };

        let index_buffer = if config.index_buffer {
            let id = backend.create_buffer(BufferTarget::Index);
            backend.bind_buffer(BufferTarget::Index, id);
            advance(&mut state, ProgramState::BufferConfigured);
            Some(id)
        } else {
            None
        };

        advance(&mut state, ProgramState::Ready);
        log::info!(
            "program {program:?} ready ({} attributes, {} uniforms)",
            attributes.len(),
            uniforms.len()
        );

        Ok(Self { program, attributes, uniforms, vertex_buffer, index_buffer, state })
    }

    /// Fetches both stages from URLs, then builds the program.
    ///
    /// Inline sources in `config` are ignored.
    pub async fn from_urls<B, F>(
        backend: &mut B,
        fetcher: &F,
        vertex_url: &str,
        fragment_url: &str,
        config: &ProgramConfig,
    ) -> Result<Self>
    where
        B: RenderBackend + ?Sized,
        F: SourceFetcher,
    {
        let config = config.clone().with_urls(vertex_url, fragment_url);
        Self::from_sources(backend, fetcher, &config).await
    }

    /// Resolves each stage (inline or fetched) and builds the program.
    ///
    /// Both fetches run concurrently. The first failure is returned and the
    /// other fetch is dropped; nothing is compiled unless both succeed.
    pub async fn from_sources<B, F>(backend: &mut B, fetcher: &F, config: &ProgramConfig) -> Result<Self>
    where
        B: RenderBackend + ?Sized,
        F: SourceFetcher,
    {
        config.validate()?;

        let stage = |kind: ShaderKind| async move {
            match config.source(kind) {
                Ok(ShaderSource::Inline(src)) => Ok(src.to_owned()),
                Ok(ShaderSource::Url(url)) => fetcher.fetch(url).await,
                Err(e) => Err(e),
            }
        };
        let (vertex, fragment) = tokio::try_join!(stage(ShaderKind::Vertex), stage(ShaderKind::Fragment))?;

        Self::new(backend, &config.clone().with_sources(vertex, fragment))
    }

    /// Uploads points to the vertex buffer, truncated or padded to the
    /// configured component count (`w = 1` for four components).
    pub fn write_vertices<B: RenderBackend + ?Sized>(&self, backend: &mut B, points: &[Point3]) -> Result<()> {
        let vb = self.vertex_buffer.ok_or(Error::NoBuffer(BufferTarget::Vertex))?;
        let data = numerize(points, vb.layout.components());
        self.upload_vertices(backend, vb, &data);
        Ok(())
    }

    /// Uploads pre-flattened vertex data.
    pub fn write_vertex_data<B: RenderBackend + ?Sized>(&self, backend: &mut B, data: &[f32]) -> Result<()> {
        let vb = self.vertex_buffer.ok_or(Error::NoBuffer(BufferTarget::Vertex))?;
        let components = vb.layout.components() as usize;
        if data.len() % components != 0 {
            return Err(Error::config(format!(
                "{} floats do not divide into {components}-component vertices",
                data.len()
            )));
        }
        self.upload_vertices(backend, vb, data);
        Ok(())
    }

    pub fn write_indices<B: RenderBackend + ?Sized>(&self, backend: &mut B, indices: &[u16]) -> Result<()> {
        let id = self.index_buffer.ok_or(Error::NoBuffer(BufferTarget::Index))?;
        backend.bind_buffer(BufferTarget::Index, id);
        backend.buffer_data(BufferTarget::Index, bytemuck::cast_slice(indices));
        Ok(())
    }

    /// Validates `mesh` for `topology`, then uploads its vertices and indices.
    ///
    /// A mesh without indices needs no index buffer.
    pub fn write_mesh<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        mesh: &Mesh,
        topology: Topology,
    ) -> Result<()> {
        mesh.validate(topology)?;
        if !mesh.indices.is_empty() && self.index_buffer.is_none() {
            return Err(Error::NoBuffer(BufferTarget::Index));
        }
        self.write_vertices(backend, &mesh.vertices)?;
        if !mesh.indices.is_empty() {
            self.write_indices(backend, &mesh.indices)?;
        }
        Ok(())
    }

    /// Uploads raw `f32` data to a configured uniform.
    pub fn write_uniform<B: RenderBackend + ?Sized>(&self, backend: &mut B, name: &str, data: &[f32]) -> Result<()> {
        let location = match self.uniforms.iter().find(|(n, _)| n == name) {
            Some((_, Some(location))) => *location,
            Some((_, None)) => {
                return Err(Error::config(format!("uniform `{name}` is not exposed by the program")));
            }
            None => return Err(Error::config(format!("uniform `{name}` was not configured"))),
        };
        backend.uniform_data(self.program, location, bytemuck::cast_slice(data));
        Ok(())
    }

    /// Makes this program current for subsequent draws.
    pub fn activate<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        backend.use_program(self.program);
    }

    #[inline]
    pub fn state(&self) -> ProgramState {
        self.state
    }

    #[inline]
    pub fn id(&self) -> ProgramId {
        self.program
    }

    /// Resolved location of a configured attribute.
    pub fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes.iter().find(|(n, _)| n == name)?.1
    }

    /// Resolved slot of a configured uniform.
    pub fn uniform(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.iter().find(|(n, _)| n == name)?.1
    }

    pub fn vertex_buffer(&self) -> Option<BufferId> {
        self.vertex_buffer.map(|vb| vb.id)
    }

    pub fn vertex_layout(&self) -> Option<VertexLayout> {
        self.vertex_buffer.map(|vb| vb.layout)
    }

    pub fn index_buffer(&self) -> Option<BufferId> {
        self.index_buffer
    }

    fn upload_vertices<B: RenderBackend + ?Sized>(&self, backend: &mut B, vb: VertexBuffer, data: &[f32]) {
        backend.bind_buffer(BufferTarget::Vertex, vb.id);
        // Rebinding the attribute keeps it on this buffer if another program moved it.
        backend.vertex_attrib_pointer(vb.layout);
        backend.buffer_data(BufferTarget::Vertex, bytemuck::cast_slice(data));
    }
}

fn advance(state: &mut ProgramState, next: ProgramState) {
    log::debug!("program state {state:?} -> {next:?}");
    *state = next;
}

/// Looks up each distinct name once; repeats are skipped.
fn resolve<T>(names: &[String], mut lookup: impl FnMut(&str) -> Option<T>) -> Vec<(String, Option<T>)> {
    let mut resolved: Vec<(String, Option<T>)> = Vec::with_capacity(names.len());
    for name in names {
        if resolved.iter().any(|(n, _)| n == name) {
            log::debug!("`{name}` listed twice; keeping the first entry");
            continue;
        }
        let location = lookup(name);
        if location.is_none() {
            log::warn!("`{name}` is not exposed by the program");
        }
        resolved.push((name.clone(), location));
    }
    resolved
}

fn numerize(points: &[Point3], components: u8) -> Vec<f32> {
    match components {
        3 => bytemuck::cast_slice(points).to_vec(),
        n => points
            .iter()
            .flat_map(|p| {
                let xyzw = [p.x, p.y, p.z, 1.0];
                xyzw.into_iter().take(n as usize)
            })
            .collect(),
    }
}
