use clap::{Args, Parser, Subcommand};
use diffib_core::{BodyRecord, EulerField, Geometry, IbConfig, ImmersedBoundary};
use glam::{DVec3, IVec3};
use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "diffib")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Diffused-interface immersed boundary coupling for rigid spheres", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Advance spheres through a uniform-velocity box
    Run(RunArgs),
    /// Check a configuration file
    Validate {
        /// Path to the JSON configuration
        config: PathBuf,
    },
    /// Write the default configuration as JSON
    InitConfig {
        #[arg(default_value = "diffib.json")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Engine configuration (JSON); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cells per side of the cubic box (unit spacing)
    #[arg(long, default_value_t = 32)]
    cells: i32,

    /// Uniform initial fluid velocity, as `u,v,w`
    #[arg(long, value_parser = parse_vec3, default_value = "0,0,0")]
    ambient: DVec3,

    /// Sphere center, as `x,y,z`; repeat for several bodies
    #[arg(long = "body", value_parser = parse_vec3)]
    bodies: Vec<DVec3>,

    #[arg(long, default_value_t = 4.0)]
    radius: f64,

    #[arg(long, default_value_t = 2.0)]
    density: f64,

    #[arg(long, default_value_t = 10)]
    steps: usize,

    #[arg(long, default_value_t = 0.01)]
    dt: f64,

    /// Write body records (JSON) after the last step
    #[arg(long)]
    save_bodies: Option<PathBuf>,

    /// Start from body records (JSON) instead of `--body`
    #[arg(long)]
    restart: Option<PathBuf>,

    /// Dump marker positions, velocities and forces (CSV) after the last step
    #[arg(long)]
    markers: Option<PathBuf>,
}

const GHOST_CELLS: i32 = 2;

fn parse_vec3(s: &str) -> Result<DVec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected `x,y,z`, got `{s}`"));
    }
    let mut v = [0.0; 3];
    for (slot, part) in v.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|e| format!("invalid component `{part}`: {e}"))?;
    }
    Ok(DVec3::from_array(v))
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Run(args) => run(&args),
        Commands::Validate { config } => validate(&config),
        Commands::InitConfig { output } => init_config(&output),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<IbConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(IbConfig::from_file(path)?),
        None => Ok(IbConfig::default()),
    }
}

fn build_field(config: &IbConfig, cells: i32, ambient: DVec3) -> Result<EulerField, Box<dyn Error>> {
    if cells < 1 {
        return Err(format!("--cells must be positive, got {cells}").into());
    }
    let n_comp = config.force_component.max(config.velocity_component) + 3;
    let mut field = EulerField::new(IVec3::ZERO, IVec3::splat(cells - 1), GHOST_CELLS, n_comp)?;
    let first = config.velocity_component;
    field.fill_components(first, 1, ambient.x);
    field.fill_components(first + 1, 1, ambient.y);
    field.fill_components(first + 2, 1, ambient.z);
    Ok(field)
}

fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_deref())?;
    let geom = Geometry::new(DVec3::ZERO, DVec3::ONE)?;
    let mut field = build_field(&config, args.cells, args.ambient)?;
    let mut ib = ImmersedBoundary::new(config, geom)?;

    match &args.restart {
        Some(path) => {
            let records: Vec<BodyRecord> = serde_json::from_str(&fs::read_to_string(path)?)?;
            ib.restore(&records)?;
        }
        None => {
            if args.bodies.is_empty() {
                return Err("no bodies: pass --body x,y,z or --restart".into());
            }
            let xs: Vec<f64> = args.bodies.iter().map(|c| c.x).collect();
            let ys: Vec<f64> = args.bodies.iter().map(|c| c.y).collect();
            let zs: Vec<f64> = args.bodies.iter().map(|c| c.z).collect();
            ib.init_bodies(&xs, &ys, &zs, args.radius, args.density)?;
        }
    }

    info!(steps = args.steps, dt = args.dt, cells = args.cells, "starting run");
    let mut reports = Vec::new();
    for step in 0..args.steps {
        reports = ib.advance(&mut field, args.dt)?;
        info!(step = step + 1, time = (step + 1) as f64 * args.dt, "step complete");
    }
    for report in &reports {
        println!("{}", report);
    }

    if let Some(path) = &args.save_bodies {
        fs::write(path, serde_json::to_string_pretty(&ib.records())?)?;
        info!(path = %path.display(), "saved body records");
    }
    if let Some(path) = &args.markers {
        write_markers(&ib, path)?;
        info!(path = %path.display(), "wrote marker dump");
    }
    Ok(())
}

fn write_markers(ib: &ImmersedBoundary, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut out = std::io::BufWriter::new(fs::File::create(path)?);
    writeln!(out, "body,marker,x,y,z,u,v,w,fx,fy,fz")?;
    for index in 0..ib.bodies().len() {
        let Some(markers) = ib.marker_snapshot(index) else {
            continue;
        };
        for (m, s) in markers.iter().enumerate() {
            writeln!(
                out,
                "{index},{m},{},{},{},{},{},{},{},{},{}",
                s.position.x,
                s.position.y,
                s.position.z,
                s.velocity.x,
                s.velocity.y,
                s.velocity.z,
                s.force.x,
                s.force.y,
                s.force.z
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

fn validate(path: &Path) -> Result<(), Box<dyn Error>> {
    let config = IbConfig::from_file(path)?;
    println!(
        "{}: valid ({:?} kernel, {} sub-iterations, relaxation {})",
        path.display(),
        config.forcing.kernel,
        config.forcing.sub_iterations,
        config.forcing.relaxation
    );
    Ok(())
}

fn init_config(path: &Path) -> Result<(), Box<dyn Error>> {
    IbConfig::default().save_to_file(path)?;
    println!("wrote default configuration to {}", path.display());
    Ok(())
}
