use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "zepp-player", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render PNG previews of one or more project directories.
    Preview(PreviewArgs),
    /// List the available device profiles.
    Profiles,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Project directories (each containing `app.json`).
    #[arg(required = true)]
    projects: Vec<PathBuf>,

    /// Device profile name.
    #[arg(long, default_value = zepp_player::DeviceProfile::DEFAULT_NAME)]
    profile: String,

    /// Also export one PNG per draw op of the still preview.
    #[arg(long)]
    stage: bool,

    /// Animated frames to export; the second half renders at the AOD level.
    #[arg(long, default_value_t = 0)]
    frames: usize,

    /// Output directory; `{}` is replaced with the project path.
    #[arg(short = 'o', long = "out", default_value = "{}")]
    out: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args),
        Command::Profiles => {
            for p in zepp_player::DeviceProfile::all() {
                println!(
                    "{:<14} {:>4}x{:<4} {:<12} {}",
                    p.name,
                    p.screen.width,
                    p.screen.height,
                    p.shape.as_str(),
                    p.display_name
                );
            }
            Ok(())
        }
    }
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let opts = zepp_player::PreviewOpts::default()
        .with_profile(args.profile)
        .with_stages(args.stage)
        .with_frames(args.frames);

    let summary = zepp_player::preview_batch(&args.projects, &opts, |project, out| {
        let dir = PathBuf::from(args.out.replace("{}", &project.to_string_lossy()));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;

        let preview = dir.join("preview.png");
        write_png(&preview, &out.preview)?;
        println!("[zepp-player] PNG saved to: {}", preview.display());
        for (i, stage) in out.stages.iter().enumerate() {
            write_png(&dir.join(format!("stage_{i}.png")), stage)?;
        }
        for (i, frame) in out.frames.iter().enumerate() {
            write_png(&dir.join(format!("frame_{i}.png")), frame)?;
        }
        Ok(())
    });

    println!();
    println!("Processed: {}", summary.processed);
    if summary.failed > 0 {
        eprintln!("Failed: {}", summary.failed);
        anyhow::bail!("{} project(s) failed", summary.failed);
    }
    Ok(())
}

fn write_png(path: &Path, frame: &zepp_player::FrameRGBA) -> zepp_player::PlayerResult<()> {
    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
