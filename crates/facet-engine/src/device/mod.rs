//! GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - owning the offscreen colour target draws land in
//! - implementing [`RenderBackend`](crate::backend::RenderBackend) on top of wgpu

mod gpu;
mod init;

pub use gpu::GpuBackend;
pub use init::GpuInit;
