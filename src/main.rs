use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = collections_bot::cli::Cli::parse();
    collections_bot::run(cli)
}
