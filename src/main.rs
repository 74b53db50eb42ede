mod cli;
mod commands;
mod errors;
mod installers;
mod libs;
mod logger;
mod schemas;

use clap::Parser;
use cli::cmd_enums::{Cli, Commands};
use commands::{generate, install, plan, pycharm_env, version};

fn main() {
    let cli = Cli::parse();
    logger::init(cli.debug);

    let result = match cli.command {
        Commands::Version => version::run(),
        Commands::Install { overrides } => install::run(overrides),
        Commands::Plan { overrides } => plan::run(overrides),
        Commands::Generate { output, force } => generate::run(output, force),
        Commands::PycharmEnv {
            output,
            newest_year,
            oldest_year,
        } => pycharm_env::run(output, newest_year, oldest_year),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            crate::log_error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
