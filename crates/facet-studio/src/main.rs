mod trail;

use anyhow::{Context, Result};
use facet_engine::logging::{init_logging, LoggingConfig};
use facet_engine::program::{FileFetcher, GlProgram, ProgramConfig};
use facet_engine::{GpuBackend, GpuInit, RenderBackend};
use facet_geometry::shapes::{Circle, Cuboid, Cylinder, Quad, QuadTopology};
use facet_geometry::{Mesh, Point3, Topology};

use trail::ClickTrail;

/// Program used when no configuration path is given.
const DEFAULT_CONFIG: &str = include_str!("../studio.json");

const SHADER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders");

/// Clicks replayed onto the canvas, in pixels.
const CLICKS: [(f32, f32); 4] = [(40.0, 340.0), (110.0, 90.0), (190.0, 300.0), (260.0, 70.0)];
const CURSOR: (f32, f32) = (360.0, 330.0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading program config {path}"))?;
            ProgramConfig::from_json(&json)?
        }
        None => ProgramConfig::from_json(DEFAULT_CONFIG)?,
    };

    let init = GpuInit::default();
    let (width, height) = init.target_size;
    let mut gpu = GpuBackend::new(init).await.context("creating GPU backend")?;

    let fetcher = FileFetcher::new(SHADER_DIR);
    let program = GlProgram::from_sources(&mut gpu, &fetcher, &config)
        .await
        .context("building flat program")?;
    program.activate(&mut gpu);
    gpu.clear([0.0, 0.0, 0.0, 1.0]);

    let mut scene = Scene { gpu: &mut gpu, program: &program, draws: 0 };

    // ── polyline ──────────────────────────────────────────────────────────
    let mut trail = ClickTrail::new(width as f32, height as f32);
    for (x, y) in CLICKS {
        trail.click(x, y);
    }
    if let Some(band) = trail.with_cursor(CURSOR.0, CURSOR.1) {
        scene.place(Point3::zero(), [1.0, 1.0, 1.0, 1.0])?;
        let band = Mesh::from_parts(band, Vec::new());
        scene.draw(&band, Topology::LineStrip)?;
        scene.draw(&trail.to_mesh(), Topology::Points)?;
    }

    // ── shapes ────────────────────────────────────────────────────────────
    scene.place(Point3::xy(0.55, 0.6), [0.9, 0.3, 0.2, 1.0])?;
    let quad = Quad::xy(Point3::zero(), 0.3, 0.3);
    scene.draw(&quad.to_geometry(0, QuadTopology::Triangles)?, Topology::Triangles)?;

    scene.place(Point3::xy(-0.55, -0.55), [0.2, 0.6, 0.9, 1.0])?;
    let circle = Circle::new(Point3::zero(), 0.25, 24);
    scene.draw(&circle.as_line_loop(0)?, Topology::LineStrip)?;

    scene.place(Point3::xy(0.55, -0.45), [0.3, 0.85, 0.4, 1.0])?;
    scene.draw(&Cylinder::new(0.25, 16).to_surface(), Topology::Triangles)?;

    scene.place(Point3::xy(-0.1, 0.1), [0.95, 0.8, 0.2, 1.0])?;
    let cuboid = Cuboid::new(Point3::zero(), 0.3, 0.2, 0.4).to_geometry(QuadTopology::Triangles)?;
    scene.draw(&cuboid, Topology::Triangles)?;

    log::info!(
        "rendered {} draws ({} clicks) into a {width}x{height} target",
        scene.draws,
        trail.len()
    );
    Ok(())
}

/// One program drawing a sequence of meshes.
struct Scene<'a> {
    gpu: &'a mut GpuBackend,
    program: &'a GlProgram,
    draws: usize,
}

impl Scene<'_> {
    fn place(&mut self, offset: Point3, color: [f32; 4]) -> Result<()> {
        let [x, y, z] = offset.to_array();
        self.program.write_uniform(self.gpu, "u_Offset", &[x, y, z, 0.0])?;
        self.program.write_uniform(self.gpu, "u_Color", &color)?;
        Ok(())
    }

    fn draw(&mut self, mesh: &Mesh, topology: Topology) -> Result<()> {
        self.program
            .write_mesh(self.gpu, mesh, topology)
            .with_context(|| format!("uploading {topology:?} mesh"))?;

        if mesh.indices.is_empty() {
            self.gpu.draw_arrays(topology, 0, mesh.vertex_count() as u32);
        } else {
            self.gpu.draw_elements(topology, mesh.index_count() as u32);
        }
        self.draws += 1;
        Ok(())
    }
}
