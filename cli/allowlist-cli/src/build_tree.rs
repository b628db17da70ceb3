use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use allowlist_cli::{hex_encode, write_file_atomic, Allowlist, ChecksumPolicy};

#[derive(Args, Debug)]
pub struct Cli {
    /// Input file with one address per row (first column, no header)
    #[arg(short, long, env = "ALLOWLIST_INPUT")]
    input: PathBuf,

    /// Output file for the proof map (address -> proof)
    #[arg(short, long, env = "ALLOWLIST_PROOFS")]
    output: PathBuf,

    /// Output file for the Merkle root
    #[arg(short, long)]
    root_output: Option<PathBuf>,

    /// Re-derive checksum casing instead of rejecting mismatched mixed-case input
    #[arg(long)]
    lenient_checksum: bool,
}

pub fn run(cli: &Cli) -> Result<ExitCode> {
    let policy = ChecksumPolicy::from_lenient_flag(cli.lenient_checksum);

    info!(input = %cli.input.display(), ?policy, "reading addresses");
    let allowlist = Allowlist::from_path(&cli.input, policy)
        .with_context(|| format!("Failed to read allowlist from {}", cli.input.display()))?;
    if !allowlist.rejected().is_empty() {
        warn!(count = allowlist.rejected().len(), "skipped invalid entries");
    }
    if allowlist.duplicates() > 0 {
        info!(count = allowlist.duplicates(), "collapsed duplicate addresses");
    }

    let output = allowlist.build().context("Failed to build Merkle tree")?;
    output
        .proofs
        .verify_all(&output.root)
        .context("Proof self-check failed")?;

    output
        .proofs
        .write_atomic(&cli.output)
        .with_context(|| format!("Failed to write proof map to {}", cli.output.display()))?;

    let root = hex_encode(output.root);
    if let Some(root_path) = &cli.root_output {
        write_file_atomic(root_path, format!("{root}\n").as_bytes())
            .with_context(|| format!("Failed to write root to {}", root_path.display()))?;
    }

    println!("Merkle root: {root}");
    println!("Addresses: {}", allowlist.len());
    Ok(ExitCode::SUCCESS)
}
