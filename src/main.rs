use clap::Parser;
use restful::cli::Args;
use restful::{Config, Runner};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let runner = Runner::new(Config::from_env());

    let result = args
        .into_request_spec()
        .and_then(|spec| runner.run(&spec, &mut std::io::stdout().lock()));

    match result {
        Ok(outcome) => {
            log::debug!("Finished: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::debug!("Failed ({:?}): {:?}", err.kind(), err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
