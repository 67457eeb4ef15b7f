use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "reelfx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dry-run a single frame on the headless backend and print its stats as JSON.
    ///
    /// The headless backend does not rasterize, so no pixels are produced.
    Frame(FrameArgs),
    /// Dry-run every frame of a time range and print one stats line per frame.
    Range(RangeArgs),
    /// List registered effects with their uniforms and presets.
    Effects,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,
}

#[derive(Parser, Debug)]
struct RangeArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// First frame time in seconds.
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Last frame time in seconds (inclusive).
    #[arg(long)]
    end: f64,

    /// Frame rate; defaults to the scene's.
    #[arg(long)]
    fps: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Range(args) => cmd_range(args),
        Command::Effects => cmd_effects(),
    }
}

fn load(path: &std::path::Path) -> anyhow::Result<reelfx::FrameRenderer<reelfx::RecordingGpu>> {
    let scene = reelfx::SceneDesc::from_path(path)
        .with_context(|| format!("load scene '{}'", path.display()))?;
    let mut renderer = reelfx::FrameRenderer::new(reelfx::RecordingGpu::new(), scene.settings)?;
    renderer.load_scene(&scene)?;
    Ok(renderer)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut renderer = load(&args.in_path)?;
    let outcome = renderer.render_at_time(args.time)?;
    let stats = outcome
        .stats()
        .copied()
        .context("frame was skipped")?;
    println!("{}", serde_json::to_string(&stats)?);
    renderer.dispose();
    Ok(())
}

fn cmd_range(args: RangeArgs) -> anyhow::Result<()> {
    let mut renderer = load(&args.in_path)?;
    let fps = args.fps.unwrap_or(renderer.settings().fps);
    let count = renderer.for_each_frame(args.start, args.end, fps, |r, _, stats| {
        r.gpu_mut().clear_commands();
        let line = serde_json::to_string(&stats)?;
        println!("{line}");
        Ok(())
    })?;
    eprintln!("rendered {count} frames");
    renderer.dispose();
    Ok(())
}

fn cmd_effects() -> anyhow::Result<()> {
    let registry = reelfx::EffectRegistry::with_builtins();
    for id in registry.ids() {
        let Some(effect) = registry.get(id) else {
            continue;
        };
        let uniforms: Vec<&str> = effect.uniforms.iter().map(|u| u.name.as_str()).collect();
        let presets: Vec<&str> = effect.presets.keys().map(String::as_str).collect();
        let category = format!("{:?}", effect.category);
        println!(
            "{id:<22} {category:<10} uniforms: {}  presets: {}",
            uniforms.join(", "),
            presets.join(", ")
        );
    }
    Ok(())
}
