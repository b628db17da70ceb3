use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};

use allowlist_cli::calldata;
use allowlist_cli::{hex_encode, parse_hash32};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// setMerkleRoot(bytes32): publish a new root
    SetRoot {
        /// Merkle root (hex format)
        #[arg(short, long, env = "ALLOWLIST_ROOT")]
        root: String,
    },
    /// publicMint(uint256) and the value to send with it
    PublicMint {
        #[arg(short, long, default_value_t = 1)]
        quantity: u64,

        /// Public price per token in wei, as returned by publicPrice()
        #[arg(long)]
        price_wei: u128,
    },
    /// toggleWhitelistSale(): open or close the allowlist sale
    ToggleWhitelistSale,
    /// togglePublicSale(): open or close the public sale
    TogglePublicSale,
    /// setPublicPrice(uint256): set the public price per token
    SetPublicPrice {
        /// New price per token in wei
        #[arg(long)]
        price_wei: u128,
    },
    /// setUnrevealedURI(string): set the pre-reveal metadata URI
    SetUnrevealedUri {
        #[arg(long)]
        uri: String,
    },
    /// A sale-state or price getter
    View {
        #[arg(value_enum)]
        getter: Getter,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Getter {
    WhitelistSaleActive,
    PublicSaleActive,
    PublicPrice,
}

impl Getter {
    fn calldata(self) -> Vec<u8> {
        match self {
            Self::WhitelistSaleActive => calldata::no_args::<calldata::whitelistSaleActiveCall>(),
            Self::PublicSaleActive => calldata::no_args::<calldata::publicSaleActiveCall>(),
            Self::PublicPrice => calldata::no_args::<calldata::publicPriceCall>(),
        }
    }
}

pub fn run(command: &Command) -> Result<ExitCode> {
    match command {
        Command::SetRoot { root } => {
            let root = parse_hash32(root).context("Invalid Merkle root")?;
            println!("{}", hex_encode(calldata::set_merkle_root(&root)));
        }
        Command::PublicMint {
            quantity,
            price_wei,
        } => {
            let value = calldata::public_mint_value(*price_wei, *quantity)?;
            println!("calldata: {}", hex_encode(calldata::public_mint(*quantity)));
            println!("value: {value} wei");
        }
        Command::ToggleWhitelistSale => {
            println!("{}", hex_encode(calldata::toggle_whitelist_sale()));
        }
        Command::TogglePublicSale => {
            println!("{}", hex_encode(calldata::toggle_public_sale()));
        }
        Command::SetPublicPrice { price_wei } => {
            println!("{}", hex_encode(calldata::set_public_price(*price_wei)));
        }
        Command::SetUnrevealedUri { uri } => {
            println!("{}", hex_encode(calldata::set_unrevealed_uri(uri)));
        }
        Command::View { getter } => {
            println!("{}", hex_encode(getter.calldata()));
        }
    }
    Ok(ExitCode::SUCCESS)
}
