use anyhow::Result;
use clap::Parser;
use gbfsm::Cli;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    gbfsm::run(&cli)
}
