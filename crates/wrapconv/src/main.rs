use std::process::ExitCode;

use wrapconv::app::{run, Args};

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();

    match run(&args) {
        Ok(elapsed) => {
            println!(
                "Took {} milliseconds ({} seconds)",
                elapsed.as_secs_f64() * 1000.0,
                elapsed.as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
