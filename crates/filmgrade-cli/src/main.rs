//! filmgrade: film-style colour grading from the command line.
//!
//! Decodes images with the `image` crate, drives `filmgrade-core`, and
//! writes the results.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod image_loader;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "filmgrade")]
#[command(author, version, about = "Film emulation and colour grading")]
#[command(long_about = "
Grade images with film stock emulation, LUTs, and reference matching.

Examples:
  filmgrade grade in.jpg out.png --film portrait-400 --preset cinema
  filmgrade grade in.jpg out.png --params look.json --lut print.cube --lut-strength 60
  filmgrade grade in.jpg out.png --reference golden.json --match-strength 80 --adaptive
  filmgrade analyze in.jpg --stride 2
  filmgrade profile ref.jpg golden.json --name Golden --thumbnail
  filmgrade identity-lut identity.cube --size 33
  filmgrade films
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads (0 = auto, default from FILMGRADE_THREADS)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade an image
    Grade(GradeArgs),
    /// Print image statistics as JSON
    Analyze(AnalyzeArgs),
    /// Create a reference profile from an image
    Profile(ProfileArgs),
    /// Write an identity .cube LUT
    #[command(name = "identity-lut")]
    IdentityLut(IdentityLutArgs),
    /// List film stocks and character presets
    Films,
}

#[derive(Args)]
pub struct GradeArgs {
    /// Input image
    pub input: PathBuf,
    /// Output image
    pub output: PathBuf,

    /// Grading parameters (JSON)
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// Film stock id (see `filmgrade films`)
    #[arg(short, long)]
    pub film: Option<String>,

    /// Character preset: clean, standard, cinema, vintage, gritty
    #[arg(long)]
    pub preset: Option<String>,

    /// Creative LUT (.cube)
    #[arg(short, long)]
    pub lut: Option<PathBuf>,

    /// Creative LUT blend, 0..100 (overrides the params file)
    #[arg(long)]
    pub lut_strength: Option<f32>,

    /// Input transform LUT (.cube), applied after log decode
    #[arg(long)]
    pub input_lut: Option<PathBuf>,

    /// Output transform LUT (.cube), applied at full strength
    #[arg(long)]
    pub output_lut: Option<PathBuf>,

    /// Reference profile (JSON) to match
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Reference match strength, 0..100
    #[arg(long, default_value = "100")]
    pub match_strength: f32,

    /// Also run Reinhard colour transfer toward the reference
    #[arg(long, requires = "reference")]
    pub adaptive: bool,

    /// Automatic exposure, contrast, and white balance
    #[arg(long)]
    pub auto: bool,

    /// Grain seed
    #[arg(long, default_value = "0")]
    pub seed: f32,

    /// Keep log-decoded values above 1.0 until the final clamp
    #[arg(long)]
    pub log_headroom: bool,

    /// Analysis stride for --auto and --reference (default from FILMGRADE_STATS_STRIDE)
    #[arg(long)]
    pub stride: Option<usize>,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input image
    pub input: PathBuf,
    /// Sample every Nth pixel (default from FILMGRADE_STATS_STRIDE)
    #[arg(short, long)]
    pub stride: Option<usize>,
}

#[derive(Args)]
pub struct ProfileArgs {
    /// Reference image
    pub input: PathBuf,
    /// Output profile (JSON)
    pub output: PathBuf,
    /// Profile name
    #[arg(short, long)]
    pub name: String,
    /// Profile description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Embed a small thumbnail
    #[arg(long)]
    pub thumbnail: bool,
    /// Film stock to accompany the look
    #[arg(short, long)]
    pub film: Option<String>,
    /// Sample every Nth pixel (default from FILMGRADE_STATS_STRIDE)
    #[arg(short, long)]
    pub stride: Option<usize>,
}

#[derive(Args)]
pub struct IdentityLutArgs {
    /// Output .cube file
    pub output: PathBuf,
    /// Grid points per axis (2 to 256)
    #[arg(short, long, default_value = "33")]
    pub size: usize,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "filmgrade=debug,filmgrade_core=debug" } else { "filmgrade=info,filmgrade_core=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = CliConfig::default();

    let threads = cli.threads.unwrap_or(config.threads);
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Grade(args) => commands::grade(args, &config),
        Commands::Analyze(args) => commands::analyze(args, &config),
        Commands::Profile(args) => commands::profile(args, &config),
        Commands::IdentityLut(args) => commands::identity_lut(args),
        Commands::Films => {
            commands::films();
            Ok(())
        }
    }
}
