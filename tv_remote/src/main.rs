//! Command-line access to the remote: list the gesture table or press an
//! action by hand to check that key injection reaches the player.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tv_remote::{open_injector, Action, CommandMapping, KeyInjector};

#[derive(Parser, Debug)]
#[command(name = "tv_remote", about = "TV key-press remote")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the gesture → command table
    List,
    /// Send one action to the focused window
    Press {
        /// volume-up, volume-down, seek-back, seek-forward or play-pause
        action: Action,
        /// Number of presses
        #[arg(long, default_value_t = 1)]
        repeats: u32,
        /// Seconds to wait first, to give focus to the player
        #[arg(long, default_value = "0", value_parser = parse_delay)]
        delay: Duration,
        /// Log instead of pressing
        #[arg(long)]
        dry_run: bool,
    },
}

/// Seconds as a float; anything a `Duration` cannot hold is rejected.
fn parse_delay(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("`{s}`: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("`{s}`: {e}"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tv_remote=info".into()),
        )
        .init();

    match cli.command {
        Commands::List => {
            println!("  {:<12} {:<13} {:>7}  {}", "gesture", "action", "presses", "description");
            for info in CommandMapping::standard().available_commands() {
                println!(
                    "  {:<12} {:<13} {:>7}  {}",
                    info.gesture.as_str(),
                    info.command.action.name(),
                    info.command.repeats,
                    info.description
                );
            }
        }
        Commands::Press { action, repeats, delay, dry_run } => {
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            let mut injector = open_injector(dry_run);
            for i in 0..repeats {
                if i > 0 {
                    std::thread::sleep(tv_remote::REPEAT_DELAY);
                }
                injector.press(action)?;
            }
            println!("  {} ×{} via {}", action, repeats, injector.name());
        }
    }
    Ok(())
}
