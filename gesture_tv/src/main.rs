//! gesture_tv - command-line entry point.

use std::path::PathBuf;

use clap::Parser;
use gesture_tv::app::{run, AppConfig, SourceKind};
use gesture_tv::samples::{SampleRef, SampleStore};
use tracing::info;
use tv_remote::CommandMapping;

#[derive(Parser, Debug)]
#[command(name = "gesture_tv", about = "Control TV playback with hand gestures")]
struct Cli {
    /// Read tracker frames (JSON lines) from this file instead of stdin
    #[arg(long, conflicts_with = "sim")]
    frames: Option<PathBuf>,

    /// Keyboard simulation instead of tracker frames
    #[arg(long)]
    sim: bool,

    /// Open the skeleton preview window (simulation mode)
    #[arg(long, requires = "sim")]
    preview: bool,

    /// Log key presses instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Save every hand that produced a gesture under this directory
    #[arg(long)]
    capture: Option<PathBuf>,

    /// Do not print a JSON report per frame
    #[arg(long)]
    quiet: bool,

    /// Print the gesture table and exit
    #[arg(long)]
    list: bool,

    /// Print the samples stored under DIR and exit
    #[arg(long, value_name = "DIR")]
    list_samples: Option<PathBuf>,

    /// Print one stored sample (`--show-sample DIR thumbs_up/<file>`) and exit
    #[arg(long, num_args = 2, value_names = ["DIR", "GESTURE/FILE"])]
    show_sample: Vec<String>,

    /// Delete one stored sample (`--delete-sample DIR thumbs_up/<file>`) and exit
    #[arg(long, num_args = 2, value_names = ["DIR", "GESTURE/FILE"])]
    delete_sample: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_tv=info,tv_remote=info,hand_pose=info".into()),
        )
        .init();

    if cli.list {
        for info in CommandMapping::standard().available_commands() {
            println!("  {:<12} → {}", info.gesture.as_str(), info.description);
        }
        return Ok(());
    }

    if let Some(dir) = &cli.list_samples {
        let store = SampleStore::open(dir)?;
        for group in store.list()? {
            println!("  {} ({})", group.gesture, group.samples.len());
            for s in &group.samples {
                println!("    {}", s.name);
            }
        }
        return Ok(());
    }

    if let [dir, sample] = cli.show_sample.as_slice() {
        let sample: SampleRef = sample.parse()?;
        let hand = SampleStore::open(dir)?.load_ref(&sample)?;
        println!("{}", serde_json::to_string_pretty(&hand)?);
        eprintln!("  classifies as: {}", hand_pose::classify(&hand).map_or("none", |g| g.as_str()));
        return Ok(());
    }

    if let [dir, sample] = cli.delete_sample.as_slice() {
        let sample: SampleRef = sample.parse()?;
        SampleStore::open(dir)?.delete_ref(&sample)?;
        info!("deleted {}/{}", sample.gesture, sample.name);
        return Ok(());
    }

    let source = match (cli.sim, cli.frames) {
        (true, _) => SourceKind::Sim,
        (false, Some(path)) => SourceKind::File(path),
        (false, None) => SourceKind::Stdin,
    };

    let cfg = AppConfig {
        source,
        dry_run: cli.dry_run,
        capture_dir: cli.capture,
        reports: !cli.quiet,
        preview: cli.preview,
        ..AppConfig::default()
    };

    info!("gesture_tv v{} starting ({:?})", env!("CARGO_PKG_VERSION"), cfg.source);
    run(cfg)?;
    Ok(())
}
