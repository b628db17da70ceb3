use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::{info, warn};
use zeroize::Zeroize;

use allowlist_cli::calldata;
use allowlist_cli::{
    hex_encode, leaf_hash, parse_hash32, verify_proof, Address, ChecksumPolicy, Eligibility,
    ProofMap,
};

/// Exit status for a well-formed address that is not on the allowlist.
const NOT_ELIGIBLE: u8 = 2;

#[derive(Args, Debug)]
pub struct Cli {
    /// Proof map written by `build-tree`
    #[arg(short, long, env = "ALLOWLIST_PROOFS")]
    proofs: PathBuf,

    /// Address to look up
    #[arg(short, long, required_unless_present = "private_key", conflicts_with = "private_key")]
    address: Option<String>,

    /// Wallet private key (hex format, with or without 0x prefix)
    /// Alternatively, use "-" to read from stdin (more secure)
    #[arg(short = 'k', long)]
    private_key: Option<String>,

    /// Published Merkle root; when given, the proof is checked against it
    #[arg(short, long, env = "ALLOWLIST_ROOT")]
    root: Option<String>,

    /// Quantity to encode in the whitelistMint calldata
    #[arg(short, long, default_value_t = 1)]
    quantity: u64,

    /// Also print whitelistMint calldata
    #[arg(long)]
    calldata: bool,

    /// Re-derive checksum casing instead of rejecting mismatched mixed-case input
    #[arg(long)]
    lenient_checksum: bool,
}

#[derive(Debug, Serialize)]
struct ClaimOutput {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    merkle_root: Option<String>,
    merkle_proof: Vec<String>,
    quantity: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    calldata: Option<String>,
}

fn read_private_key(arg: &str) -> Result<Address> {
    let mut key_str = if arg == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read private key from stdin")?;
        buffer
    } else {
        arg.to_owned()
    };
    let address = Address::from_private_key_hex(&key_str);
    key_str.zeroize();
    address.context("Invalid private key")
}

fn resolve_address(cli: &Cli, policy: ChecksumPolicy) -> Result<Address> {
    match (&cli.address, &cli.private_key) {
        (Some(text), _) => Address::parse(text, policy).context("Invalid address"),
        (None, Some(key)) => {
            info!("deriving address from private key");
            read_private_key(key)
        }
        (None, None) => anyhow::bail!("Either --address or --private-key is required"),
    }
}

pub fn run(cli: &Cli) -> Result<ExitCode> {
    let policy = ChecksumPolicy::from_lenient_flag(cli.lenient_checksum);

    let root = cli
        .root
        .as_deref()
        .map(parse_hash32)
        .transpose()
        .context("Invalid Merkle root")?;

    let proofs = ProofMap::load(&cli.proofs, policy)
        .with_context(|| format!("Failed to load proof map from {}", cli.proofs.display()))?;
    if proofs.is_empty() {
        warn!(path = %cli.proofs.display(), "proof map has no entries");
    }
    let address = resolve_address(cli, policy)?;

    let proof = match proofs.lookup(&address) {
        Eligibility::Eligible(proof) => proof,
        Eligibility::NotEligible => {
            println!("{address} is not eligible");
            return Ok(ExitCode::from(NOT_ELIGIBLE));
        }
    };

    if let Some(root) = &root {
        if !verify_proof(&leaf_hash(&address), &proof, root) {
            anyhow::bail!(
                "Proof for {address} does not match root {}; the proof map is stale",
                hex_encode(root)
            );
        }
        info!("proof verified against root");
    }

    let claim = ClaimOutput {
        address: address.to_checksum(),
        merkle_root: root.map(hex_encode),
        merkle_proof: proof.iter().map(hex_encode).collect(),
        quantity: cli.quantity,
        calldata: cli
            .calldata
            .then(|| hex_encode(calldata::whitelist_mint(cli.quantity, &proof))),
    };

    let json = serde_json::to_string_pretty(&claim).context("Failed to serialize claim")?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}
