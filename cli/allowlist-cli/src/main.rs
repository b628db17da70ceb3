#![forbid(unsafe_code)]
#![allow(unreachable_pub)]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod build_tree;
mod claim;
mod encode;
mod verify;

#[derive(Parser, Debug)]
#[command(name = "allowlist")]
#[command(about = "Merkle allowlist tools for whitelist minting", long_about = None)]
#[command(version)]
struct Cli {
    /// Log filter, e.g. "info" or "allowlist_cli=debug"
    #[arg(long, global = true, env = "ALLOWLIST_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the Merkle tree and proof map from an address list
    BuildTree(build_tree::Cli),
    /// Look up the whitelist mint proof for an address or wallet key
    Claim(claim::Cli),
    /// Recompute a root from an address and proof, as the contract does
    Verify(verify::Cli),
    /// Encode contract calldata
    #[command(subcommand)]
    Calldata(encode::Command),
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries results; logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::BuildTree(args) => build_tree::run(&args),
        Commands::Claim(args) => claim::run(&args),
        Commands::Verify(args) => verify::run(&args),
        Commands::Calldata(command) => encode::run(&command),
    }
}
