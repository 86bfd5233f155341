use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "crux-overlay", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the overlay video for an analysis (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Write annotated sample frames of an analysis as PNG files.
    Preview(PreviewArgs),
    /// Print the probed properties and resolved orientation of a video.
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
struct AnalysisArgs {
    /// Analysis identifier.
    #[arg(long)]
    analysis_id: String,

    /// Directory holding uploaded source videos.
    #[arg(long, default_value = "static/uploads")]
    uploads: PathBuf,

    /// Directory holding pose data and receiving outputs.
    #[arg(long, default_value = "static/outputs")]
    outputs: PathBuf,

    /// Overlay options JSON. Command-line flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rotation strategy: pre, compensate or post.
    #[arg(long)]
    strategy: Option<crux_overlay::RotationStrategy>,

    /// Draw every joint, colored by confidence band, regardless of the threshold.
    #[arg(long)]
    debug_joints: bool,

    /// Disable the hip motion trail.
    #[arg(long)]
    no_trail: bool,

    /// Visibility threshold for drawing connections and joints.
    #[arg(long)]
    threshold: Option<f64>,

    /// Crop odd-sized output to even dimensions instead of failing.
    #[arg(long)]
    crop_to_even: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    analysis: AnalysisArgs,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    analysis: AnalysisArgs,

    /// Number of evenly spaced frames to annotate.
    #[arg(long, default_value_t = 5)]
    count: usize,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    /// Input video.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

impl AnalysisArgs {
    fn paths(&self) -> crux_overlay::AnalysisPaths {
        crux_overlay::AnalysisPaths::new(&self.uploads, &self.outputs)
    }

    fn opts(&self) -> anyhow::Result<crux_overlay::OverlayOpts> {
        let mut opts = match &self.config {
            Some(path) => crux_overlay::OverlayOpts::from_path(path)
                .with_context(|| format!("load overlay options '{}'", path.display()))?,
            None => crux_overlay::OverlayOpts::default(),
        };
        if let Some(strategy) = self.strategy {
            opts.strategy = strategy;
        }
        if self.debug_joints {
            opts.policy.mode = crux_overlay::RenderMode::Debug;
        }
        if self.no_trail {
            opts.trail.enabled = false;
        }
        if let Some(threshold) = self.threshold {
            opts.policy.threshold = threshold;
        }
        if self.crop_to_even {
            opts.crop_to_even = true;
        }
        opts.validate()?;
        Ok(opts)
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let opts = args.analysis.opts()?;
    let paths = args.analysis.paths();
    let store = paths.landmark_store();

    let report =
        crux_overlay::render_overlay_video(&args.analysis.analysis_id, &paths, &store, &opts)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if let Some(out) = &report.output_path {
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let opts = args.analysis.opts()?;
    let paths = args.analysis.paths();
    let store = paths.landmark_store();

    let written = crux_overlay::render_previews(
        &args.analysis.analysis_id,
        &paths,
        &store,
        &opts,
        args.count,
    )?;

    for path in &written {
        eprintln!("wrote {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&written)?);
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let info = crux_overlay::probe_video(&args.in_path)?;
    let orientation =
        crux_overlay::OrientationResolver::new(crux_overlay::OrientationOpts::default())
            .resolve(&info);
    let props =
        crux_overlay::VideoProperties::from_raw(info.fps, info.raw_size, orientation.rotation);

    let out = serde_json::json!({
        "source": info.source_path,
        "raw_width": info.raw_size.width,
        "raw_height": info.raw_size.height,
        "frame_count": info.frame_count,
        "metadata_rotation": info.metadata_rotation,
        "orientation": orientation,
        "properties": props,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
