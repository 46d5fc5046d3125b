use naga::valid::{Capabilities, FunctionInfo, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, Module, Type, TypeInner};

use crate::backend::UniformLocation;
use crate::error::{Error, Result};

use super::ShaderKind;

/// A user-defined (`@location`) stage input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varying {
    /// Argument or struct member name; `None` for an unnamed entry-point result.
    pub name: Option<String>,
    pub location: u32,
}

/// A `var<uniform>` global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: String,
    pub location: UniformLocation,
    /// Byte size of the uniform's type.
    pub size: u32,
}

/// What a compiled unit exposes to the rest of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderInterface {
    pub kind: ShaderKind,
    pub entry_point: String,
    pub inputs: Vec<Varying>,
    pub outputs: Vec<Varying>,
    pub uniforms: Vec<UniformSlot>,
}

impl ShaderInterface {
    /// Parses and validates a WGSL unit, then reflects the entry point for `kind`.
    ///
    /// The unit must contain exactly one entry point of the requested stage.
    pub fn compile(kind: ShaderKind, source: &str) -> Result<Self> {
        let rejected = |log: String| Error::ShaderCompile { kind, log };

        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| rejected(e.emit_to_string(source)))?;

        let info = Validator::new(ValidationFlags::all(), Capabilities::default())
            .validate(&module)
            .map_err(|e| rejected(e.emit_to_string(source)))?;

        let stage = kind.naga_stage();
        let mut entries = module
            .entry_points
            .iter()
            .enumerate()
            .filter(|(_, ep)| ep.stage == stage);
        let (index, entry) = match (entries.next(), entries.next()) {
            (Some(found), None) => found,
            (None, _) => return Err(rejected(format!("no {kind} entry point"))),
            (Some(_), Some(_)) => {
                return Err(rejected(format!("more than one {kind} entry point")));
            }
        };

        let mut inputs = Vec::new();
        for arg in &entry.function.arguments {
            collect_varyings(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
        }

        let mut outputs = Vec::new();
        if let Some(result) = &entry.function.result {
            collect_varyings(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
        }

        Ok(Self {
            kind,
            entry_point: entry.name.clone(),
            inputs,
            outputs,
            uniforms: collect_uniforms(&module, info.get_entry_point(index)),
        })
    }
}

fn collect_varyings(
    module: &Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            name: name.map(str::to_owned),
            location: *location,
        }),
        Some(_) => {} // builtin
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_varyings(module, m.name.as_deref(), m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

/// Uniforms the entry point actually reads; unused declarations have no location.
fn collect_uniforms(module: &Module, entry: &FunctionInfo) -> Vec<UniformSlot> {
    module
        .global_variables
        .iter()
        .filter(|(handle, var)| var.space == AddressSpace::Uniform && !entry[*handle].is_empty())
        .filter_map(|(_, var)| {
            let name = var.name.clone()?;
            let binding = var.binding.as_ref()?;
            Some(UniformSlot {
                name,
                location: UniformLocation { group: binding.group, binding: binding.binding },
                size: module.types[var.ty].inner.size(module.to_ctx()),
            })
        })
        .collect()
}

/// Linked view of a vertex + fragment pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramInterface {
    pub vertex_entry: String,
    pub fragment_entry: String,
    /// Vertex stage inputs, i.e. the attributes.
    pub attributes: Vec<Varying>,
    /// Uniforms of both stages; a name shared by both stages appears once.
    pub uniforms: Vec<UniformSlot>,
}

impl ProgramInterface {
    pub fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| a.location)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformSlot> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

/// Checks that two units form a program and merges their interfaces.
///
/// Every fragment input location must be written by the vertex stage, and a
/// uniform slot may only be shared under one name.
pub fn link(vertex: &ShaderInterface, fragment: &ShaderInterface) -> Result<ProgramInterface> {
    let fail = |log: String| Err(Error::Link { log });

    if vertex.kind != ShaderKind::Vertex || fragment.kind != ShaderKind::Fragment {
        return fail(format!(
            "expected a vertex and a fragment shader, got {} and {}",
            vertex.kind, fragment.kind
        ));
    }

    for input in &fragment.inputs {
        if !vertex.outputs.iter().any(|o| o.location == input.location) {
            let name = input.name.as_deref().unwrap_or("<unnamed>");
            return fail(format!(
                "fragment input `{name}` at location {} is not written by the vertex stage",
                input.location
            ));
        }
    }

    let mut uniforms = vertex.uniforms.clone();
    for slot in &fragment.uniforms {
        match uniforms
            .iter()
            .find(|u| u.name == slot.name || u.location == slot.location)
        {
            None => uniforms.push(slot.clone()),
            Some(u) if u == slot => {}
            Some(u) => {
                return fail(format!(
                    "uniform `{}` (group {}, binding {}) conflicts with `{}` (group {}, binding {})",
                    slot.name,
                    slot.location.group,
                    slot.location.binding,
                    u.name,
                    u.location.group,
                    u.location.binding,
                ));
            }
        }
    }

    Ok(ProgramInterface {
        vertex_entry: vertex.entry_point.clone(),
        fragment_entry: fragment.entry_point.clone(),
        attributes: vertex.inputs.clone(),
        uniforms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
        @vertex
        fn vs_main(@location(0) a_Position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(a_Position, 1.0);
        }
    "#;

    const VS_STRUCT: &str = r#"
        struct VertexInput {
            @location(0) position: vec3<f32>,
            @location(1) color: vec4<f32>,
        }

        struct VertexOutput {
            @builtin(position) clip: vec4<f32>,
            @location(0) color: vec4<f32>,
        }

        @vertex
        fn vs_main(in: VertexInput) -> VertexOutput {
            var out: VertexOutput;
            out.clip = vec4<f32>(in.position, 1.0);
            out.color = in.color;
            return out;
        }
    "#;

    const FS_UNIFORM: &str = r#"
        @group(0) @binding(0) var<uniform> u_Color: vec4<f32>;

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return u_Color;
        }
    "#;

    const FS_VARYING: &str = r#"
        @fragment
        fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
            return color;
        }
    "#;

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn reflects_argument_attributes() {
        let s = ShaderInterface::compile(ShaderKind::Vertex, VS).unwrap();
        assert_eq!(s.entry_point, "vs_main");
        assert_eq!(s.inputs, vec![Varying { name: Some("a_Position".into()), location: 0 }]);
        assert!(s.outputs.is_empty()); // builtin only
    }

    #[test]
    fn reflects_struct_members() {
        let s = ShaderInterface::compile(ShaderKind::Vertex, VS_STRUCT).unwrap();
        let names: Vec<_> = s.inputs.iter().map(|v| (v.name.clone().unwrap(), v.location)).collect();
        assert_eq!(names, vec![("position".to_owned(), 0), ("color".to_owned(), 1)]);
        assert_eq!(s.outputs.len(), 1);
        assert_eq!(s.outputs[0].location, 0);
    }

    #[test]
    fn reflects_uniform_slot() {
        let s = ShaderInterface::compile(ShaderKind::Fragment, FS_UNIFORM).unwrap();
        assert_eq!(s.uniforms.len(), 1);
        assert_eq!(s.uniforms[0].name, "u_Color");
        assert_eq!(s.uniforms[0].location, UniformLocation { group: 0, binding: 0 });
        assert_eq!(s.uniforms[0].size, 16);
    }

    #[test]
    fn unused_uniform_has_no_slot() {
        let src = r#"
            @group(0) @binding(0) var<uniform> u_Unused: vec4<f32>;

            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return vec4<f32>(1.0);
            }
        "#;
        let s = ShaderInterface::compile(ShaderKind::Fragment, src).unwrap();
        assert!(s.uniforms.is_empty());
    }

    #[test]
    fn syntax_error_carries_log() {
        let err = ShaderInterface::compile(ShaderKind::Vertex, "fn broken( {").unwrap_err();
        match err {
            Error::ShaderCompile { kind, log } => {
                assert_eq!(kind, ShaderKind::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wrong_stage_is_rejected() {
        let err = ShaderInterface::compile(ShaderKind::Fragment, VS).unwrap_err();
        assert!(matches!(err, Error::ShaderCompile { kind: ShaderKind::Fragment, .. }));
    }

    // ── link ──────────────────────────────────────────────────────────────

    #[test]
    fn link_merges_interfaces() {
        let vs = ShaderInterface::compile(ShaderKind::Vertex, VS).unwrap();
        let fs = ShaderInterface::compile(ShaderKind::Fragment, FS_UNIFORM).unwrap();
        let p = link(&vs, &fs).unwrap();
        assert_eq!(p.attribute("a_Position"), Some(0));
        assert_eq!(p.attribute("a_Color"), None);
        assert!(p.uniform("u_Color").is_some());
        assert_eq!(p.fragment_entry, "fs_main");
    }

    #[test]
    fn link_rejects_unwritten_varying() {
        let vs = ShaderInterface::compile(ShaderKind::Vertex, VS).unwrap();
        let fs = ShaderInterface::compile(ShaderKind::Fragment, FS_VARYING).unwrap();
        assert!(matches!(link(&vs, &fs), Err(Error::Link { .. })));
    }

    #[test]
    fn link_accepts_matching_varying() {
        let vs = ShaderInterface::compile(ShaderKind::Vertex, VS_STRUCT).unwrap();
        let fs = ShaderInterface::compile(ShaderKind::Fragment, FS_VARYING).unwrap();
        assert!(link(&vs, &fs).is_ok());
    }

    #[test]
    fn link_rejects_swapped_stages() {
        let vs = ShaderInterface::compile(ShaderKind::Vertex, VS).unwrap();
        let fs = ShaderInterface::compile(ShaderKind::Fragment, FS_UNIFORM).unwrap();
        assert!(matches!(link(&fs, &vs), Err(Error::Link { .. })));
    }
}
