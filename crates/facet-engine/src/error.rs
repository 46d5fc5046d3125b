use facet_geometry::GeometryError;

use crate::backend::BufferTarget;
use crate::shader::ShaderKind;

/// Errors surfaced by program construction, upload and shader fetching.
///
/// Every error is fatal to the operation that produced it; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No adapter/device could be obtained for rendering.
    #[error("no rendering context available: {0}")]
    ContextUnavailable(String),

    /// The backend rejected a shader unit. `log` holds the compiler diagnostics.
    #[error("failed to compile {kind} shader:\n{log}")]
    ShaderCompile { kind: ShaderKind, log: String },

    #[error("failed to link program: {log}")]
    Link { log: String },

    /// Malformed or inconsistent program configuration.
    #[error("invalid program configuration: {0}")]
    Config(String),

    /// Upload attempted without the corresponding buffer configured.
    #[error("no {0} buffer configured for this program")]
    NoBuffer(BufferTarget),

    #[error("failed to fetch `{location}`: {status}")]
    Fetch { location: String, status: String },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
