use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for tankfield")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests and the replay smoke run
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Run the terrain streaming bench
    Bench,
    /// Replay a scripted session twice through the CLI and compare hashes
    Smoke {
        #[arg(long, default_value = "1200")]
        frames: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            fmt()?;
            clippy()?;
            test()?;
            smoke(600)?;
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test => test()?,
        Commands::Bench => bench()?,
        Commands::Smoke { frames } => smoke(frames)?,
    }

    Ok(())
}

fn fmt() -> Result<()> {
    cargo("fmt --check", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Result<()> {
    cargo(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn test() -> Result<()> {
    cargo("test", &["test", "--workspace"])
}

fn bench() -> Result<()> {
    cargo(
        "bench",
        &["bench", "-p", "tankfield-stream", "--bench", "bench_terrain_stream"],
    )
}

fn smoke(frames: u64) -> Result<()> {
    let frames = frames.to_string();
    cargo(
        "replay smoke run",
        &[
            "run", "-q", "-p", "tankfield-cli", "--", "replay", "--frames", &frames,
            "--forward", "--turn", "left", "--fire-every", "45",
        ],
    )
}

fn cargo(label: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {label}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {label} failed");
    }
    Ok(())
}
