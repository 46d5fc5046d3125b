use crate::Topology;

/// Errors produced while assembling or checking a [`Mesh`](crate::Mesh).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// A vertex offset or index no longer fits the 16-bit index format.
    #[error("mesh needs index {required}, but indices are limited to {}", u16::MAX)]
    IndexOverflow { required: usize },
    #[error("index {index} at position {position} is out of bounds for {vertices} vertices")]
    IndexOutOfBounds { index: u16, position: usize, vertices: usize },
    #[error("{count} indices cannot be drawn as {topology:?}")]
    TopologyMismatch { topology: Topology, count: usize },
}
