//! Prospect brief generator CLI.
//!
//! Researches target companies, matches them against past campaign case
//! studies, and writes a one-page sales brief per company.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
