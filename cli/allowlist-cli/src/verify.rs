use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use allowlist_cli::{
    hex_encode, leaf_hash, parse_hash32, process_proof, Address, ChecksumPolicy, Hash32,
};

#[derive(Args, Debug)]
pub struct Cli {
    /// Merkle root (hex format)
    #[arg(short, long, env = "ALLOWLIST_ROOT")]
    root: String,

    /// Address whose membership is being checked
    #[arg(short, long)]
    address: String,

    /// Proof as a JSON array of hashes, or @path to a file holding one
    #[arg(short, long)]
    proof: String,

    /// Re-derive checksum casing instead of rejecting mismatched mixed-case input
    #[arg(long)]
    lenient_checksum: bool,
}

fn parse_proof(arg: &str) -> Result<Vec<Hash32>> {
    let text = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read proof file {path}"))?,
        None => arg.to_owned(),
    };
    let hashes: Vec<String> = serde_json::from_str(&text).context("Proof must be a JSON array")?;
    hashes
        .iter()
        .map(|h| parse_hash32(h).context("Invalid proof element"))
        .collect()
}

pub fn run(cli: &Cli) -> Result<ExitCode> {
    let policy = ChecksumPolicy::from_lenient_flag(cli.lenient_checksum);
    let root = parse_hash32(&cli.root).context("Invalid Merkle root")?;
    let address = Address::parse(&cli.address, policy).context("Invalid address")?;
    let proof = parse_proof(&cli.proof)?;

    let computed = process_proof(&leaf_hash(&address), &proof);
    if computed == root {
        println!("valid: {address} is included in {}", hex_encode(root));
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "invalid: proof for {address} yields {}, expected {}",
            hex_encode(computed),
            hex_encode(root)
        );
        Ok(ExitCode::FAILURE)
    }
}
