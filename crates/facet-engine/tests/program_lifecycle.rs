use facet_engine::backend::{BufferTarget, HeadlessBackend, RenderBackend};
use facet_engine::program::{GlProgram, ProgramConfig, ProgramState, StaticFetcher};
use facet_engine::Error;
use facet_geometry::shapes::{Circle, Quad, QuadTopology};
use facet_geometry::{Point3, Topology};

const VS: &str = r#"
    @vertex
    fn vs_main(@location(0) a_Position: vec3<f32>) -> @builtin(position) vec4<f32> {
        return vec4<f32>(a_Position, 1.0);
    }
"#;

const FS: &str = r#"
    @group(0) @binding(0) var<uniform> u_Color: vec4<f32>;

    @fragment
    fn fs_main() -> @location(0) vec4<f32> {
        return u_Color;
    }
"#;

fn indexed_config() -> ProgramConfig {
    ProgramConfig::new()
        .with_sources(VS, FS)
        .with_attributes(["a_Position"])
        .with_uniforms(["u_Color"])
        .with_vertex_buffer("a_Position", 3)
        .with_index_buffer()
}

#[test]
fn quad_upload_end_to_end() {
    let mut backend = HeadlessBackend::new();
    let program = GlProgram::new(&mut backend, &indexed_config()).unwrap();

    let corners = [
        Point3::new(-0.5, -0.5, 0.0),
        Point3::new(-0.5, 0.5, 0.0),
        Point3::new(0.5, 0.5, 0.0),
        Point3::new(0.5, -0.5, 0.0),
    ];
    program.write_vertices(&mut backend, &corners).unwrap();
    program.write_indices(&mut backend, &[0, 1, 2, 0, 3, 2]).unwrap();
    assert_eq!(program.state(), ProgramState::Ready);

    program.activate(&mut backend);
    backend.draw_elements(Topology::Triangles, 6);

    let vbo = program.vertex_buffer().unwrap();
    let ibo = program.index_buffer().unwrap();
    assert_eq!(backend.buffer_floats(vbo).unwrap().len(), 12);
    assert_eq!(backend.buffer_indices(ibo).unwrap(), vec![0, 1, 2, 0, 3, 2]);

    let draw = &backend.draws()[0];
    assert_eq!(draw.program, program.id());
    assert_eq!(draw.attributes, vec![program.vertex_layout().unwrap()]);
}

#[test]
fn shapes_upload_through_write_mesh() {
    let mut backend = HeadlessBackend::new();
    let program = GlProgram::new(&mut backend, &indexed_config()).unwrap();

    let quad = Quad::xy(Point3::zero(), 1.0, 1.0).to_geometry(0, QuadTopology::Triangles).unwrap();
    program.write_mesh(&mut backend, &quad, Topology::Triangles).unwrap();

    let ring = Circle::new(Point3::zero(), 0.5, 12).as_line_loop(0).unwrap();
    program.write_mesh(&mut backend, &ring, Topology::LineStrip).unwrap();

    let ibo = program.index_buffer().unwrap();
    let indices = backend.buffer_indices(ibo).unwrap();
    assert_eq!(indices.len(), 13);
    assert_eq!(indices.last(), Some(&0));
    assert_eq!(backend.upload_count(ibo), 2);
}

#[test]
fn two_programs_keep_their_own_buffers() {
    let mut backend = HeadlessBackend::new();
    let a = GlProgram::new(&mut backend, &indexed_config()).unwrap();
    let b = GlProgram::new(&mut backend, &indexed_config().with_vertex_buffer("a_Position", 2))
        .unwrap();

    a.write_vertices(&mut backend, &[Point3::new(1.0, 2.0, 3.0)]).unwrap();
    b.write_vertices(&mut backend, &[Point3::new(4.0, 5.0, 6.0)]).unwrap();

    assert_eq!(backend.buffer_floats(a.vertex_buffer().unwrap()).unwrap(), vec![1.0, 2.0, 3.0]);
    assert_eq!(backend.buffer_floats(b.vertex_buffer().unwrap()).unwrap(), vec![4.0, 5.0]);
    assert_eq!(backend.bound_buffer(BufferTarget::Vertex), b.vertex_buffer());
}

#[test]
fn no_vertex_buffer_means_no_upload() {
    let mut backend = HeadlessBackend::new();
    let config = ProgramConfig::new().with_sources(VS, FS).with_attributes(["a_Position"]);
    let program = GlProgram::new(&mut backend, &config).unwrap();

    let err = program.write_vertices(&mut backend, &[Point3::zero()]).unwrap_err();
    assert!(matches!(err, Error::NoBuffer(BufferTarget::Vertex)));
    assert_eq!(backend.total_uploads(), 0);
}

#[test]
fn config_errors_stop_construction() {
    let mut backend = HeadlessBackend::new();

    let undeclared = ProgramConfig::new().with_sources(VS, FS).with_vertex_buffer("a_Position", 3);
    assert!(matches!(GlProgram::new(&mut backend, &undeclared), Err(Error::Config(_))));

    let oversized = indexed_config().with_vertex_buffer("a_Position", 5);
    assert!(matches!(GlProgram::new(&mut backend, &oversized), Err(Error::Config(_))));

    let mut conflicting = indexed_config();
    conflicting.fragment_shader_url = Some("flat.frag.wgsl".into());
    assert!(matches!(GlProgram::new(&mut backend, &conflicting), Err(Error::Config(_))));
}

#[test]
fn link_errors_carry_a_log() {
    let mut backend = HeadlessBackend::new();
    let fs = r#"
        @fragment
        fn fs_main(@location(3) v_Color: vec4<f32>) -> @location(0) vec4<f32> {
            return v_Color;
        }
    "#;
    let config = ProgramConfig::new().with_sources(VS, fs);
    match GlProgram::new(&mut backend, &config).unwrap_err() {
        Error::Link { log } => assert!(log.contains("v_Color")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn json_config_with_fetched_sources() {
    let config = ProgramConfig::from_json(
        r#"{
            "vertexShaderUrl": "flat.vert.wgsl",
            "fragmentShaderUrl": "flat.frag.wgsl",
            "attributes": ["a_Position"],
            "uniforms": ["u_Color"],
            "vertexBuffer": { "name": "a_Position", "size": 3 },
            "indexBuffer": true
        }"#,
    )
    .unwrap();
    let fetcher = StaticFetcher::new().with("flat.vert.wgsl", VS).with("flat.frag.wgsl", FS);

    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let mut backend = HeadlessBackend::new();
    let program = runtime
        .block_on(GlProgram::from_sources(&mut backend, &fetcher, &config))
        .unwrap();

    assert_eq!(program.state(), ProgramState::Ready);
    assert!(program.uniform("u_Color").is_some());
}
