use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::shader::{self, ProgramInterface, ShaderInterface, ShaderKind};

use super::{BufferId, BufferTarget, ProgramId, ShaderId, UniformLocation, VertexLayout};

/// Object tables and bind state shared by every backend.
///
/// Misuse that a GL driver would flag with an error code (unknown handle,
/// nothing bound) is logged and ignored, leaving state unchanged.
#[derive(Debug, Default)]
pub(crate) struct Objects {
    shaders: Vec<ShaderInterface>,
    programs: Vec<ProgramInterface>,
    buffers: Vec<BufferTarget>,

    bound_vertex: Option<BufferId>,
    bound_index: Option<BufferId>,

    /// Enabled attribute layouts by location, with the buffer they read.
    attribs: BTreeMap<u32, (BufferId, VertexLayout)>,
    current: Option<ProgramId>,
}

impl Objects {
    pub fn compile(&mut self, kind: ShaderKind, source: &str) -> Result<ShaderId> {
        let interface = ShaderInterface::compile(kind, source)?;
        let id = ShaderId(self.shaders.len() as u32);
        log::debug!("compiled {kind} shader {id:?} (entry `{}`)", interface.entry_point);
        self.shaders.push(interface);
        Ok(id)
    }

    pub fn link(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId> {
        let (Some(vs), Some(fs)) = (self.shader(vertex), self.shader(fragment)) else {
            return Err(Error::Link { log: "unknown shader handle".into() });
        };
        let interface = shader::link(vs, fs)?;
        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(interface);
        Ok(id)
    }

    #[inline]
    pub fn shader(&self, id: ShaderId) -> Option<&ShaderInterface> {
        self.shaders.get(id.index())
    }

    #[inline]
    pub fn program(&self, id: ProgramId) -> Option<&ProgramInterface> {
        self.programs.get(id.index())
    }

    pub fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.program(program)?.attribute(name)
    }

    pub fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.program(program)?.uniform(name).map(|u| u.location)
    }

    pub fn create_buffer(&mut self, target: BufferTarget) -> BufferId {
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(target);
        id
    }

    #[inline]
    pub fn buffer_target(&self, id: BufferId) -> Option<BufferTarget> {
        self.buffers.get(id.index()).copied()
    }

    pub fn bind(&mut self, target: BufferTarget, buffer: BufferId) {
        match self.buffer_target(buffer) {
            Some(t) if t == target => match target {
                BufferTarget::Vertex => self.bound_vertex = Some(buffer),
                BufferTarget::Index => self.bound_index = Some(buffer),
            },
            Some(t) => log::warn!("cannot bind {t} buffer {buffer:?} as {target} buffer"),
            None => log::warn!("bind of unknown buffer {buffer:?}"),
        }
    }

    #[inline]
    pub fn bound(&self, target: BufferTarget) -> Option<BufferId> {
        match target {
            BufferTarget::Vertex => self.bound_vertex,
            BufferTarget::Index => self.bound_index,
        }
    }

    pub fn attrib_pointer(&mut self, layout: VertexLayout) {
        let Some(buffer) = self.bound_vertex else {
            log::warn!("attribute {} configured with no vertex buffer bound", layout.location);
            return;
        };
        self.attribs.insert(layout.location, (buffer, layout));
    }

    pub fn use_program(&mut self, program: ProgramId) {
        if self.program(program).is_none() {
            log::warn!("use of unknown program {program:?}");
            return;
        }
        self.current = Some(program);
    }

    #[inline]
    pub fn current(&self) -> Option<ProgramId> {
        self.current
    }

    #[inline]
    pub fn attrib(&self, location: u32) -> Option<(BufferId, VertexLayout)> {
        self.attribs.get(&location).copied()
    }

    /// Enabled layouts feeding `program`'s attributes, ordered by location.
    pub fn program_attribs(&self, program: ProgramId) -> Vec<(BufferId, VertexLayout)> {
        let Some(interface) = self.program(program) else { return Vec::new() };
        self.attribs
            .iter()
            .filter(|(loc, _)| interface.attributes.iter().any(|a| a.location == **loc))
            .map(|(_, entry)| *entry)
            .collect()
    }
}
