use clap::Parser;
use safe_cache::cli::{self, Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Regions(args) => cli::regions::run(args),
        Command::Demo(args) => cli::demo::run(args),
    }
}
