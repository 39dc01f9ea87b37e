//! SlowFood - recipes, cooks and an AI kitchen assistant from the terminal.
//!
//! Architecture:
//! - CLI is a thin client over the `slowfood` library
//! - The session is verified once per invocation and gates every command
//! - All platform access goes through the typed API client

mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    execute(cli).await
}
