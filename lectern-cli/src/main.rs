//! `lectern`: normalize text from standard input, one line per sentence

use clap::Parser;
use lectern_cli::commands::NormalizeArgs;

/// Grammar-driven text normalization for speech synthesis
#[derive(Debug, Parser)]
#[command(name = "lectern", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    normalize: NormalizeArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.normalize.execute()
}
