//! Logger setup for the binary.
//!
//! File output goes to `./mirror.log` in the current working directory.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use crate::cli::LogArg;

const LOG_FILE: &str = "./mirror.log";

pub fn initialize(destination: LogArg, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = build_config();

    let terminal = |config: Config| -> Box<dyn SharedLogger> {
        TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
    };

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogArg::Terminal => vec![terminal(config)],
        // Fall back to the terminal rather than running silent.
        LogArg::File => match create_file_logger(level, config.clone()) {
            Some(file_logger) => vec![file_logger],
            None => vec![terminal(config)],
        },
        LogArg::Both => {
            let mut loggers = vec![terminal(config.clone())];
            if let Some(file_logger) = create_file_logger(level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_ignore_str("reqwest")
        .add_filter_ignore_str("hyper")
        .build()
}

fn create_file_logger(level: LevelFilter, config: Config) -> Option<Box<dyn SharedLogger>> {
    let log_path = PathBuf::from(LOG_FILE);
    match File::create(&log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
