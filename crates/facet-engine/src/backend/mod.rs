//! Rendering backends: the seam between program management and a rasterizer.
//!
//! The call set mirrors the handful of graphics-API entry points a program
//! wrapper needs (compile, link, locations, buffers, draw). Handles are plain
//! ids owned by the backend that issued them.
//!
//! Like GL, a backend keeps bind state: uploads go to the buffer currently
//! bound for a target, and attribute layouts capture the bound vertex buffer.

mod headless;
mod objects;

use std::fmt;

use facet_geometry::Topology;

use crate::error::Result;
use crate::shader::ShaderKind;

pub use headless::{DrawCall, DrawKind, HeadlessBackend};
pub(crate) use objects::Objects;

/// Handle to a compiled shader unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub(crate) u32);

/// Handle to a linked program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub(crate) u32);

/// Handle to a buffer object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub(crate) u32);

macro_rules! id_index {
    ($($id:ident),*) => {$(
        impl $id {
            #[inline]
            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    )*};
}

id_index!(ShaderId, ProgramId, BufferId);

/// Binding point of a buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data (`f32`).
    Vertex,
    /// Element indices (`u16`).
    Index,
}

impl fmt::Display for BufferTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BufferTarget::Vertex => "vertex",
            BufferTarget::Index => "index",
        })
    }
}

/// How an attribute reads the bound vertex buffer: `components` tightly packed,
/// non-normalized `f32` values per vertex, starting at offset 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub location: u32,
    components: u8,
}

impl VertexLayout {
    /// Returns `None` unless `components` is in `1..=4`.
    pub fn new(location: u32, components: u8) -> Option<Self> {
        (1..=4)
            .contains(&components)
            .then_some(Self { location, components })
    }

    #[inline]
    pub fn components(&self) -> u8 {
        self.components
    }

    /// Distance in bytes between consecutive vertices.
    #[inline]
    pub fn stride(&self) -> u64 {
        self.components as u64 * std::mem::size_of::<f32>() as u64
    }
}

/// Bind-group slot of a uniform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}

/// The external rasterizer as seen by [`GlProgram`](crate::program::GlProgram).
pub trait RenderBackend {
    /// Compiles one shader unit. Rejections return `Error::ShaderCompile`.
    fn compile_shader(&mut self, kind: ShaderKind, source: &str) -> Result<ShaderId>;

    /// Links a vertex and a fragment unit. Rejections return `Error::Link`.
    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId>;

    /// Location of a vertex attribute; `None` if the program has no such input.
    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32>;

    /// Slot of a uniform; `None` if the program has no such uniform.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn create_buffer(&mut self, target: BufferTarget) -> BufferId;

    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferId);

    /// Points `layout.location` at the currently bound vertex buffer.
    fn vertex_attrib_pointer(&mut self, layout: VertexLayout);

    /// Replaces the contents of the buffer bound to `target`.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);

    fn uniform_data(&mut self, program: ProgramId, location: UniformLocation, data: &[u8]);

    /// Makes `program` current for subsequent draws.
    fn use_program(&mut self, program: ProgramId);

    fn clear(&mut self, color: [f32; 4]);

    /// Draws `count` vertices starting at `first`, in attribute order.
    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32);

    /// Draws the first `count` indices of the bound index buffer.
    fn draw_elements(&mut self, topology: Topology, count: u32);
}
