mod cli;
mod commands;
mod pack;

use clap::Parser;

use cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = cli.validation.options()?;

    match &cli.command {
        Command::Check { files } => commands::check(files, &options),
        Command::Show { name, paths } => commands::show(name, paths, &options),
        Command::Pack { dir, output, level } => pack::run(dir, output, *level, &options),
    }
}
