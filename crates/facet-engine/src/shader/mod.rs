//! Shader units: WGSL validation and interface reflection.
//!
//! Both backends run every unit through naga before handing it to the GPU so
//! that compile and link failures carry readable diagnostics, and so attribute
//! and uniform lookups can be answered without a device.

mod reflect;

use std::fmt;

pub use reflect::{link, ProgramInterface, ShaderInterface, UniformSlot, Varying};

/// Pipeline stage a shader unit is compiled for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    pub(crate) fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderKind::Vertex => naga::ShaderStage::Vertex,
            ShaderKind::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderKind::Vertex => "vertex",
            ShaderKind::Fragment => "fragment",
        })
    }
}
