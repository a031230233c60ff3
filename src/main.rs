use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    match cli.command {
        None | Some(Commands::Run) => cli::run::run(&cli).await,
        Some(Commands::Config(ref args)) => {
            let path = cli.config_path()?;
            cli::config::run(args, &path)
        }
    }
}
