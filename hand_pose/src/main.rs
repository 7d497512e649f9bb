//! Gesture probe: read landmark frames, print what the classifier sees.
//!
//! Useful for checking a tracker integration before wiring up the remote.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use hand_pose::{thumb_angle_deg, Frame};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "hand_pose_probe", about = "Classify landmark frames (JSON lines)")]
struct Cli {
    /// Frames file; stdin when omitted
    input: Option<PathBuf>,

    /// Also print the thumb angle for each frame
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hand_pose=info".into()),
        )
        .init();

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };

    let mut counts = [0usize; 6];
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = match Frame::parse_line(&line) {
            Ok(f) => f,
            Err(e) => {
                warn!("line {}: {e}", n + 1);
                continue;
            }
        };

        let gesture = frame.gesture();
        let label = gesture.map_or("none", |g| g.as_str());
        counts[gesture.map_or(5, |g| g as usize)] += 1;

        match (cli.verbose, frame.first_hand()) {
            (true, Ok(Some(hand))) => {
                println!("{:>6}  {:<12} thumb={:+7.1}°", n + 1, label, thumb_angle_deg(&hand));
            }
            _ => println!("{:>6}  {}", n + 1, label),
        }
    }

    eprintln!();
    for (g, c) in hand_pose::Gesture::ALL.iter().zip(counts.iter()) {
        eprintln!("  {:<12} {}", g.as_str(), c);
    }
    eprintln!("  {:<12} {}", "none", counts[5]);
    Ok(())
}
