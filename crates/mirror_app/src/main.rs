mod cli;
mod config;
mod logging;
mod run;

use std::process::ExitCode;

use clap::Parser;
use mirror_logging::mirror_error;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    match run::run(cli).await {
        Ok(report) => {
            println!("{}", run::summary(&report));
            if report.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            mirror_error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
