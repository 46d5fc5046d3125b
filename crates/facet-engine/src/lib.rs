//! Program resource management for the **facet** rendering harness.
//!
//! [`GlProgram`] compiles and links a WGSL shader pair, resolves the attribute
//! and uniform names it was configured with, and owns the vertex/index buffers
//! geometry is uploaded into. All GPU work goes through a [`RenderBackend`]:
//! [`GpuBackend`] drives wgpu, [`HeadlessBackend`] records calls in memory.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`program`] | `GlProgram`, `ProgramConfig`, source fetchers |
//! | [`backend`] | `RenderBackend`, `HeadlessBackend`, handles and layouts |
//! | [`device`] | `GpuBackend`, `GpuInit` |
//! | [`shader`] | WGSL validation and interface reflection |
//! | [`logging`] | `init_logging` |

pub mod backend;
pub mod device;
pub mod logging;
pub mod program;
pub mod shader;

mod error;

pub use backend::{HeadlessBackend, RenderBackend};
pub use device::{GpuBackend, GpuInit};
pub use error::{Error, Result};
pub use program::{GlProgram, ProgramConfig, ProgramState};
