use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for warpspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt check, clippy with warnings denied, then the full test suite
    Check,
    /// Run all tests
    Test,
    /// Run the exploration search benchmark
    Bench,
    /// Drive every warpspace-cli subcommand once with a fixed seed
    Smoke {
        #[arg(short, long, default_value = "abc")]
        seed: String,
    },
}

const CLIPPY: &[&str] = &[
    "clippy",
    "--workspace",
    "--all-targets",
    "--",
    "-D",
    "warnings",
];

const BENCH: &[&str] = &[
    "bench",
    "-p",
    "warpspace-explore",
    "--bench",
    "bench_exploration_search",
];

const SMOKE: &[&str] = &[
    "info",
    "generate 3,3,3",
    "attributes krell frigate --tier 3 --location Nexus",
    "link -n 32",
    "route -n 32 --from 0 --to 5",
    "scan 2,-1,0 --radius 3 --direction +y",
];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cargo("fmt", &["fmt", "--all", "--", "--check"])?;
            cargo("clippy", CLIPPY)?;
            cargo("test", &["test", "--workspace"])?;
        }
        Commands::Test => cargo("test", &["test", "--workspace"])?,
        Commands::Bench => cargo("bench", BENCH)?,
        Commands::Smoke { seed } => {
            for scenario in SMOKE {
                let mut args = vec!["run", "-q", "-p", "warpspace-cli", "--", "--seed"];
                args.push(seed.as_str());
                args.extend(scenario.split_whitespace());
                cargo(scenario, &args)?;
            }
        }
    }

    Ok(())
}

fn cargo(step: &str, args: &[&str]) -> Result<()> {
    println!("==> cargo {step}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {step} failed ({status})");
    }
    Ok(())
}
