use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use cartopress::foundation::config::{
    DEFAULT_DISTANCE_M, DEFAULT_DPI, FONTS_DIR, POSTERS_DIR, REFERENCE_HEIGHT_IN,
    REFERENCE_WIDTH_IN, THEMES_DIR, cache_dir_from_env,
};
use cartopress::foundation::error::FetchStage;
use cartopress::cache::CacheStore;
use cartopress::geodata::fetch::{FetchObserver, FetchOrchestrator, RatePolicy};
use cartopress::geodata::http::ReqwestClient;
use cartopress::geodata::nominatim::NominatimGeocoder;
use cartopress::geodata::overpass::OverpassProvider;
use cartopress::poster::batch::{BatchRequest, CpuPosterRenderer, generate_batch, generate_single};
use cartopress::poster::output::{dpi_from_resolution, parse_resolution};
use cartopress::render::backend::{Canvas, OutputFormat};
use cartopress::style::fonts::FontSet;
use cartopress::style::theme::available_themes;

#[derive(Parser, Debug)]
#[command(name = "cartopress", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate posters for a city.
    Generate(GenerateArgs),
    /// List the themes available in the themes directory.
    Themes(ThemesArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// City name, e.g. "Paris".
    #[arg(long)]
    city: String,

    /// Country name, e.g. "France".
    #[arg(long)]
    country: String,

    /// Themes to render; repeat the flag for more than one.
    #[arg(long = "theme", required_unless_present = "all_themes")]
    themes: Vec<String>,

    /// Render every theme in the themes directory.
    #[arg(long, conflicts_with = "themes")]
    all_themes: bool,

    /// Half-width of the mapped area in meters.
    #[arg(long, default_value_t = DEFAULT_DISTANCE_M)]
    distance: f64,

    /// Raster resolution in dots per inch.
    #[arg(long, conflicts_with = "resolution")]
    dpi: Option<u32>,

    /// Target pixel size as WIDTHxHEIGHT, e.g. 3600x4800.
    #[arg(long)]
    resolution: Option<String>,

    /// Output format (png).
    #[arg(long, default_value = "png")]
    format: String,

    #[arg(long, default_value = POSTERS_DIR)]
    output_dir: PathBuf,

    #[arg(long, default_value = THEMES_DIR)]
    themes_dir: PathBuf,

    #[arg(long, default_value = FONTS_DIR)]
    fonts_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ThemesArgs {
    #[arg(long, default_value = THEMES_DIR)]
    themes_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Themes(args) => cmd_themes(args),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let dpi = match (&args.resolution, args.dpi) {
        (Some(res), _) => {
            let (w, h) = parse_resolution(res)?;
            dpi_from_resolution(w, h)
        }
        (None, Some(dpi)) => dpi,
        (None, None) => DEFAULT_DPI,
    };
    let canvas = Canvas {
        width_in: REFERENCE_WIDTH_IN,
        height_in: REFERENCE_HEIGHT_IN,
        dpi,
        format,
    };

    let themes = if args.all_themes {
        let found = available_themes(&args.themes_dir);
        anyhow::ensure!(
            !found.is_empty(),
            "no themes found in '{}'",
            args.themes_dir.display()
        );
        found
    } else {
        args.themes.clone()
    };

    let cache = CacheStore::new(cache_dir_from_env());
    cache.init().context("initialize cache directory")?;

    let http = ReqwestClient::new().context("build http client")?;
    let provider = OverpassProvider::new(http);
    let geocoder = NominatimGeocoder::new(ReqwestClient::new().context("build http client")?);
    let fetcher = FetchOrchestrator::new(cache, provider, RatePolicy::default());

    let renderer = CpuPosterRenderer {
        canvas,
        fonts: FontSet::load(&args.fonts_dir),
    };

    let request = BatchRequest {
        city: &args.city,
        country: &args.country,
        distance_m: args.distance,
        aspect: canvas.height_over_width(),
        themes: &themes,
        themes_dir: &args.themes_dir,
        output_root: &args.output_dir,
        format,
    };

    let mut progress = ConsoleObserver;
    // One explicit theme writes straight into the output dir; everything else
    // goes through the batch path and its per-city folder.
    let result = if !args.all_themes && themes.len() == 1 {
        generate_single(&fetcher, &geocoder, &renderer, &mut progress, &request)
    } else {
        generate_batch(&fetcher, &geocoder, &renderer, &mut progress, &request)
    };

    match result.output_dir {
        Some(dir) => {
            println!(
                "{} poster(s) written to {} ({} failed)",
                result.successful,
                dir.display(),
                result.failed
            );
            anyhow::ensure!(result.successful > 0, "every theme failed to render");
            Ok(())
        }
        None => anyhow::bail!("could not fetch map data for {}, {}", args.city, args.country),
    }
}

fn cmd_themes(args: ThemesArgs) -> anyhow::Result<()> {
    let themes = available_themes(&args.themes_dir);
    anyhow::ensure!(
        !themes.is_empty(),
        "no themes found in '{}'",
        args.themes_dir.display()
    );
    for name in themes {
        println!("{name}");
    }
    Ok(())
}

/// Prints fetch progress to the terminal.
struct ConsoleObserver;

impl FetchObserver for ConsoleObserver {
    fn on_step(&mut self, step: FetchStage) {
        match step {
            FetchStage::Network => println!("fetching street network..."),
            FetchStage::Water => println!("fetching water features..."),
            FetchStage::Parks => println!("fetching park features..."),
            FetchStage::Geocode => println!("resolving coordinates..."),
        }
    }
}
