//! CLI command implementations.

use std::error::Error;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tetrasoft_body::{tetra_path, visual_path, SoftBody};
use tetrasoft_math::Vec3;
use tetrasoft_mesh::generators::{point_grid, tetra_box};
use tetrasoft_mesh::{load_obj, load_tetra, save_obj, save_tetra, TetMesh};
use tetrasoft_solver::XpbdConfig;
use tetrasoft_telemetry::{EventBus, TracingSink};
use tetrasoft_types::TetraId;
use tracing::info;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Arguments of the `simulate` command.
pub struct SimulateArgs {
    pub asset_dir: PathBuf,
    pub name: String,
    pub config: Option<PathBuf>,
    pub frames: u32,
    pub pin_above: Option<f32>,
    pub output: Option<PathBuf>,
}

/// JSON summary written by `simulate --output`.
#[derive(Debug, Serialize)]
struct SimulationReport<'a> {
    name: &'a str,
    frames: u64,
    config: &'a XpbdConfig,
    kinetic_energy: f64,
    max_volume_error: f32,
    max_length_error: f32,
    visual_positions: &'a [Vec3],
}

/// Reads a TOML solver config, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> CliResult<XpbdConfig> {
    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str::<XpbdConfig>(&content)?
        }
        None => XpbdConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Runs a simulation from assets on disk.
pub fn simulate(args: &SimulateArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let mut visual = load_obj(&visual_path(&args.asset_dir, &args.name), &args.name)?;

    let bus = EventBus::new().with_sink(TracingSink::default());
    let mut body = SoftBody::load(&args.asset_dir, &visual, config)?.with_telemetry(bus);

    if let Some(height) = args.pin_above {
        let pinned = body.pin_where(|p| p.y >= height);
        info!(pinned, height, "Pinned vertices");
    }

    let mut wall_time = 0.0;
    let mut floor_contacts = 0;
    for _ in 0..args.frames {
        let result = body.step(&mut visual)?;
        wall_time += result.wall_time;
        floor_contacts += result.floor_contacts;
    }
    if let Some(bus) = body.telemetry_mut() {
        bus.finalize();
    }

    let state = body.state();
    let mesh = body.tet_mesh();
    println!("tetrasoft simulation");
    println!("────────────────────");
    println!("Body:           {}", body.name());
    println!("Frames:         {}", body.frame());
    println!("Solver time:    {:.3}s", wall_time);
    println!("Floor contacts: {floor_contacts}");
    println!("Kinetic energy: {:.6e}", state.kinetic_energy());
    println!("Max vol error:  {:.6e}", state.max_volume_error(mesh));
    println!("Max len error:  {:.6e}", state.max_length_error(mesh));

    if let Some(path) = &args.output {
        let report = SimulationReport {
            name: body.name(),
            frames: body.frame(),
            config: body.config(),
            kinetic_energy: state.kinetic_energy(),
            max_volume_error: state.max_volume_error(mesh),
            max_length_error: state.max_length_error(mesh),
            visual_positions: &visual.positions,
        };
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("Report written to: {}", path.display());
    }

    Ok(())
}

/// Prints counts and rest-shape statistics of a `.tetra` file.
pub fn inspect(path: &Path) -> CliResult<()> {
    let mesh = load_tetra(path)?;
    let stats = RestStats::of(&mesh);

    println!("tetrasoft tetra inspector");
    println!("─────────────────────────");
    println!("File:         {}", path.display());
    println!("Vertices:     {}", mesh.vertex_count());
    println!("Edges:        {}", mesh.edge_count());
    println!("Faces:        {}", mesh.face_count());
    println!("Tetrahedra:   {}", mesh.tetra_count());
    println!("Neighbours:   {}", mesh.neighbours().len());
    println!("Total volume: {:.6}", stats.total_volume);
    println!("Volume range: [{:.3e}, {:.3e}]", stats.min_volume, stats.max_volume);
    println!("Edge range:   [{:.4}, {:.4}]", stats.min_length, stats.max_length);
    println!("Inverted:     {}", stats.inverted);
    let (lo, hi) = mesh.bounds();
    println!("Bounds:       {lo} .. {hi}");
    Ok(())
}

/// Validates a config, tetra asset, or visual mesh by file extension.
pub fn validate(path: &Path) -> CliResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => {
            let config = load_config(Some(path))?;
            println!("Config is valid ({} substeps, dt {}).", config.substeps, config.dt);
        }
        Some("tetra") => {
            let mesh = load_tetra(path)?;
            let inverted = RestStats::of(&mesh).inverted;
            println!(
                "Tetra asset is valid ({} verts, {} tets, {inverted} inverted).",
                mesh.vertex_count(),
                mesh.tetra_count()
            );
        }
        Some("obj") => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("mesh");
            let mesh = load_obj(path, name)?;
            println!(
                "Visual mesh is valid ({} verts, {} tris).",
                mesh.positions.len(),
                mesh.triangle_count()
            );
        }
        _ => return Err(format!("Unsupported file: {}. Use .toml, .tetra or .obj.", path.display()).into()),
    }
    Ok(())
}

/// Writes a box-shaped tetra asset and a matching visual point grid.
pub fn generate(
    asset_dir: &Path,
    name: &str,
    cells: usize,
    cell_size: f32,
    lift: f32,
    resolution: usize,
) -> CliResult<()> {
    if cells == 0 || cell_size.is_nan() || cell_size <= 0.0 {
        return Err("cells and cell size must be positive".into());
    }
    let origin = Vec3::new(0.0, lift, 0.0);
    let tet_mesh = tetra_box(cells, cells, cells, cell_size, origin);
    // Inset so every visual point lies strictly inside the box.
    let extent = cells as f32 * cell_size;
    let inset = Vec3::splat(extent * 0.02);
    let visual = point_grid(name, origin + inset, origin + Vec3::splat(extent) - inset, resolution);

    save_tetra(&tetra_path(asset_dir, name), &tet_mesh)?;
    save_obj(&visual_path(asset_dir, name), &visual)?;
    println!(
        "Wrote '{name}' to {} ({} tets, {} visual points).",
        asset_dir.display(),
        tet_mesh.tetra_count(),
        visual.positions.len()
    );
    Ok(())
}

/// Rest-shape statistics of a tetrahedral mesh.
struct RestStats {
    total_volume: f32,
    min_volume: f32,
    max_volume: f32,
    min_length: f32,
    max_length: f32,
    inverted: usize,
}

impl RestStats {
    fn of(mesh: &TetMesh) -> Self {
        let volumes = (0..mesh.tetra_count()).map(|t| mesh.rest_volume(TetraId(t as u32)));
        let lengths = (0..mesh.edge_count()).map(|e| mesh.rest_length(e));
        let mut stats = Self {
            total_volume: 0.0,
            min_volume: f32::INFINITY,
            max_volume: f32::NEG_INFINITY,
            min_length: f32::INFINITY,
            max_length: f32::NEG_INFINITY,
            inverted: 0,
        };
        for v in volumes {
            stats.total_volume += v;
            stats.min_volume = stats.min_volume.min(v);
            stats.max_volume = stats.max_volume.max(v);
            if v <= 0.0 {
                stats.inverted += 1;
            }
        }
        for l in lengths {
            stats.min_length = stats.min_length.min(l);
            stats.max_length = stats.max_length.max(l);
        }
        stats
    }
}
