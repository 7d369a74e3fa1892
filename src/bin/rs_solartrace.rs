// command line options
use clap::{Parser, ValueEnum};
// others
use log::{error, info, LevelFilter};
// solar
use rs_solartrace::analysis::export::{export_ascii, export_image};
use rs_solartrace::analysis::flux::{FluxAnalysis, FluxStatistics};
use rs_solartrace::core::aperture::{Aperture, ApertureAnnulus};
use rs_solartrace::core::error::AnalysisError;
use rs_solartrace::core::geometry::Vector3f;
use rs_solartrace::core::primitive::SurfaceRegistry;
use rs_solartrace::core::shape::{ActiveSide, Shape, SurfaceSide};
use rs_solartrace::core::solar::{radians, Float};
use rs_solartrace::core::transform::Transform;
use rs_solartrace::lights::sun::{SunPillbox, SunSource, DEFAULT_IRRADIANCE, DEFAULT_THETA_MAX};
use rs_solartrace::shapes::cylinder::Cylinder;
use rs_solartrace::shapes::disk::Disk;
use rs_solartrace::shapes::parabolic::ParabolicDish;
use rs_solartrace::shapes::plane::Plane;
use rs_solartrace::tracer::TraceSettings;
// std
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Copy, Clone, ValueEnum)]
enum ShapeKind {
    Plane,
    Cylinder,
    Disk,
    Parabolic,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Trace sun light onto one surface and analyse the flux on it.
#[derive(Parser)]
#[command(name = "rs_solartrace", version = VERSION)]
struct Cli {
    /// kind of target surface
    #[arg(long, value_enum, default_value = "plane")]
    shape: ShapeKind,
    /// extent along x (plane, parabolic)
    #[arg(long, default_value = "1")]
    width_x: Float,
    /// extent along y (plane, parabolic)
    #[arg(long, default_value = "1")]
    width_y: Float,
    /// radius (cylinder, disk)
    #[arg(long, default_value = "0.5")]
    radius: Float,
    /// length along z (cylinder)
    #[arg(long, default_value = "1")]
    length: Float,
    /// sweep angle in degrees (cylinder)
    #[arg(long, default_value = "360")]
    phi_max: Float,
    /// focus length (parabolic)
    #[arg(long, default_value = "1")]
    focus_length: Float,
    /// keep only (u, v) inside an annulus around the centre of the
    /// parametric square
    #[arg(long, num_args = 2, value_names = ["R_MIN", "R_MAX"])]
    annulus: Option<Vec<Float>>,
    /// position of the surface in the world
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    position: Option<Vec<Float>>,
    /// rotation about the x axis in degrees, applied before the
    /// translation
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    tilt: Float,
    /// sides on which the surface can be hit (front, back, both)
    #[arg(long, default_value = "both")]
    active_side: ActiveSide,
    /// side to analyse (front, back)
    #[arg(long, default_value = "front")]
    side: SurfaceSide,
    /// sun azimuth in degrees, from +y towards +x
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    azimuth: Float,
    /// sun elevation in degrees
    #[arg(long, default_value = "90")]
    elevation: Float,
    /// direct normal irradiance in W/m^2
    #[arg(long, default_value_t = DEFAULT_IRRADIANCE)]
    irradiance: Float,
    /// angular radius of the sun disk in radians
    #[arg(long, default_value_t = DEFAULT_THETA_MAX)]
    theta_max: Float,
    /// number of rays to trace
    #[arg(short = 'n', long, default_value = "100000")]
    rays: u64,
    /// rays per batch
    #[arg(long, default_value = "4096")]
    batch_size: u64,
    /// use specified number of threads for tracing
    #[arg(short = 't', long = "nthreads", default_value = "0")]
    nthreads: u8,
    #[arg(long, default_value = "0")]
    seed: u64,
    /// grid divisions along x
    #[arg(long, default_value = "20")]
    width_divisions: usize,
    /// grid divisions along y
    #[arg(long, default_value = "20")]
    height_divisions: usize,
    /// print the flux profiles through this point
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    sector: Option<Vec<Float>>,
    /// write the flux map as text
    #[arg(long)]
    ascii: Option<PathBuf>,
    /// include cell coordinates in the text export
    #[arg(long)]
    with_coords: bool,
    /// write the flux map as an image (.png or .jpg)
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long, default_value = "8")]
    pixels_per_cell: u32,
    /// show a progress bar while tracing
    #[arg(short, long)]
    progress: bool,
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn make_shape(args: &Cli) -> Arc<dyn Shape> {
    match args.shape {
        ShapeKind::Plane => Arc::new(Plane::new(args.width_x, args.width_y, args.active_side)),
        ShapeKind::Cylinder => Arc::new(Cylinder::new(
            args.radius,
            args.length,
            radians(args.phi_max),
            args.active_side,
        )),
        ShapeKind::Disk => Arc::new(Disk::new(args.radius, args.active_side)),
        ShapeKind::Parabolic => Arc::new(ParabolicDish::new(
            args.focus_length,
            args.width_x,
            args.width_y,
            args.active_side,
        )),
    }
}

fn print_statistics(stats: &FluxStatistics) {
    println!("Total power [W]:            {}", stats.total_power);
    println!("Minimum flux [W/m2]:        {}", stats.minimum_flux);
    println!("Average flux [W/m2]:        {}", stats.average_flux);
    println!("Maximum flux [W/m2]:        {}", stats.maximum_flux);
    println!(
        "Maximum flux coordinates:   {} ; {}",
        stats.max_coordinates.x, stats.max_coordinates.y
    );
    println!("Maximum flux error:         {}", stats.max_flux_error);
    println!("Uniformity:                 {}", stats.uniformity);
    println!(
        "Centroid:                   {} ; {}",
        stats.centroid.x, stats.centroid.y
    );
}

fn run(args: &Cli) -> Result<(), AnalysisError> {
    let aperture: Option<Arc<dyn Aperture>> = match args.annulus.as_deref() {
        Some([r_min, r_max]) => Some(Arc::new(ApertureAnnulus::new(*r_min, *r_max)?)),
        _ => None,
    };
    let translation: Vector3f = match args.position.as_deref() {
        Some([x, y, z]) => Vector3f::new(*x, *y, *z),
        _ => Vector3f::default(),
    };
    let object_to_world: Transform =
        Transform::translate(&translation) * Transform::rotate_x(radians(args.tilt));
    let mut registry = SurfaceRegistry::new();
    let id = registry.add("target", make_shape(args), aperture, object_to_world)?;
    let sun = SunSource::new(
        SunPillbox::new(args.irradiance, args.theta_max)?,
        radians(args.azimuth),
        radians(args.elevation),
    );
    let settings = TraceSettings {
        n_rays: args.rays,
        batch_size: args.batch_size,
        n_threads: args.nthreads,
        seed: args.seed,
        show_progress: args.progress,
        ..TraceSettings::default()
    };
    let mut analysis = FluxAnalysis::new();
    analysis.select_surface(registry.get(id)?);
    analysis.set_side(args.side);
    let cancel = AtomicBool::new(false);
    let result = analysis.run(&sun, &settings, false, &cancel)?;
    info!(
        "{} of {} photons on the {} side",
        analysis.photon_count(),
        result.photons.len(),
        args.side
    );
    analysis.update_photon_counts(args.width_divisions, args.height_divisions)?;
    analysis.log_summary();
    print_statistics(&analysis.statistics());
    if let Some([x, y]) = args.sector.as_deref() {
        if let Some(sector) = analysis.sector(*x, *y) {
            println!("Horizontal sector at y = {}:", y);
            for (position, flux) in sector.horizontal.iter() {
                println!("  {}\t{}", position, flux);
            }
            println!("Vertical sector at x = {}:", x);
            for (position, flux) in sector.vertical.iter() {
                println!("  {}\t{}", position, flux);
            }
        }
    }
    if let Some(path) = args.ascii.as_ref() {
        let mut writer = BufWriter::new(File::create(path)?);
        export_ascii(&analysis, &mut writer, args.with_coords)?;
        println!("Flux map written to {:?}", path);
    }
    if let Some(path) = args.image.as_ref() {
        export_image(&analysis, path, args.pixels_per_cell)?;
        println!("Flux image written to {:?}", path);
    }
    Ok(())
}

fn main() {
    // handle command line options
    let args = Cli::parse();
    init_logger(args.log_level.into());
    let num_cores = num_cpus::get();
    println!(
        "rs_solartrace version {} [Detected {} cores]",
        VERSION, num_cores
    );
    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
