use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::shader::ShaderKind;

/// Vertex buffer request: the attribute it feeds and its component count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexBufferConfig {
    pub name: String,
    /// Components per vertex, `1..=4`.
    pub size: u8,
}

/// Where a stage's source comes from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderSource<'a> {
    Inline(&'a str),
    Url(&'a str),
}

/// Everything needed to build a [`GlProgram`](super::GlProgram).
///
/// Deserializes from camelCase JSON:
///
/// ```json
/// {
///   "vertexShaderUrl": "shaders/flat.vert.wgsl",
///   "fragmentShaderUrl": "shaders/flat.frag.wgsl",
///   "attributes": ["a_Position"],
///   "uniforms": ["u_Color"],
///   "vertexBuffer": { "name": "a_Position", "size": 3 },
///   "indexBuffer": true
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramConfig {
    pub vertex_shader: Option<String>,
    pub fragment_shader: Option<String>,
    pub vertex_shader_url: Option<String>,
    pub fragment_shader_url: Option<String>,
    pub attributes: Vec<String>,
    pub uniforms: Vec<String>,
    pub vertex_buffer: Option<VertexBufferConfig>,
    pub index_buffer: bool,
}

impl ProgramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))
    }

    /// Sets inline sources for both stages, dropping any URLs.
    pub fn with_sources(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.vertex_shader = Some(vertex.into());
        self.fragment_shader = Some(fragment.into());
        self.vertex_shader_url = None;
        self.fragment_shader_url = None;
        self
    }

    /// Sets source URLs for both stages, dropping any inline sources.
    pub fn with_urls(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.vertex_shader_url = Some(vertex.into());
        self.fragment_shader_url = Some(fragment.into());
        self.vertex_shader = None;
        self.fragment_shader = None;
        self
    }

    pub fn with_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_uniforms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uniforms = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_vertex_buffer(mut self, name: impl Into<String>, size: u8) -> Self {
        self.vertex_buffer = Some(VertexBufferConfig { name: name.into(), size });
        self
    }

    pub fn with_index_buffer(mut self) -> Self {
        self.index_buffer = true;
        self
    }

    /// Source of one stage. Exactly one of inline/URL must be set.
    pub fn source(&self, kind: ShaderKind) -> Result<ShaderSource<'_>> {
        let (inline, url) = match kind {
            ShaderKind::Vertex => (&self.vertex_shader, &self.vertex_shader_url),
            ShaderKind::Fragment => (&self.fragment_shader, &self.fragment_shader_url),
        };
        match (inline.as_deref(), url.as_deref()) {
            (Some(src), None) => Ok(ShaderSource::Inline(src)),
            (None, Some(url)) => Ok(ShaderSource::Url(url)),
            (Some(_), Some(_)) => Err(Error::config(format!(
                "{kind} shader has both an inline source and a URL"
            ))),
            (None, None) => Err(Error::config(format!("{kind} shader has no source"))),
        }
    }

    /// Checks everything that can be checked without a backend.
    pub fn validate(&self) -> Result<()> {
        self.source(ShaderKind::Vertex)?;
        self.source(ShaderKind::Fragment)?;

        if let Some(vb) = &self.vertex_buffer {
            if !self.attributes.iter().any(|a| *a == vb.name) {
                return Err(Error::config(format!(
                    "vertex buffer feeds `{}`, which is not a declared attribute",
                    vb.name
                )));
            }
            if !(1..=4).contains(&vb.size) {
                return Err(Error::config(format!(
                    "vertex buffer size {} is outside 1..=4",
                    vb.size
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_json() {
        let config = ProgramConfig::from_json(
            r#"{
                "vertexShaderUrl": "a.vert.wgsl",
                "fragmentShader": "@fragment fn main() {}",
                "attributes": ["a_Position"],
                "vertexBuffer": { "name": "a_Position", "size": 2 },
                "indexBuffer": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.source(ShaderKind::Vertex).unwrap(), ShaderSource::Url("a.vert.wgsl"));
        assert!(matches!(config.source(ShaderKind::Fragment).unwrap(), ShaderSource::Inline(_)));
        assert_eq!(config.vertex_buffer.as_ref().unwrap().size, 2);
        assert!(config.index_buffer);
        assert!(config.uniforms.is_empty());
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert!(matches!(ProgramConfig::from_json("{ nope"), Err(Error::Config(_))));
    }

    #[test]
    fn both_or_neither_source_is_rejected() {
        let mut config = ProgramConfig::new().with_sources("vs", "fs");
        config.vertex_shader_url = Some("vs.wgsl".into());
        assert!(matches!(config.source(ShaderKind::Vertex), Err(Error::Config(_))));
        assert!(matches!(ProgramConfig::new().validate(), Err(Error::Config(_))));
    }

    #[test]
    fn with_urls_replaces_inline_sources() {
        let config = ProgramConfig::new().with_sources("vs", "fs").with_urls("a", "b");
        assert_eq!(config.source(ShaderKind::Fragment).unwrap(), ShaderSource::Url("b"));
    }

    #[test]
    fn vertex_buffer_must_name_declared_attribute() {
        let config = ProgramConfig::new()
            .with_sources("vs", "fs")
            .with_attributes(["a_Position"])
            .with_vertex_buffer("a_Normal", 3);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn vertex_buffer_size_is_bounded() {
        let base = ProgramConfig::new().with_sources("vs", "fs").with_attributes(["a_Position"]);
        for size in [0, 5] {
            let config = base.clone().with_vertex_buffer("a_Position", size);
            assert!(matches!(config.validate(), Err(Error::Config(_))), "size {size}");
        }
        assert!(base.with_vertex_buffer("a_Position", 4).validate().is_ok());
    }
}
