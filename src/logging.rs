//! log4rs setup.

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::path::Path;

const CONSOLE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l:5})} {t} - {m}{n}";

/// Initialise logging from `config_file`, or a console logger at `info` when
/// the file is missing or invalid.
pub fn init_logging(config_file: &Path) -> Result<(), Box<dyn Error>> {
    match log4rs::init_file(config_file, Default::default()) {
        Ok(()) => {
            log::debug!("log4rs configured from {}", config_file.display());
            Ok(())
        }
        Err(e) => {
            log4rs::init_config(console_config(LevelFilter::Info)?)?;
            log::warn!(
                "Using console logging, could not load {}: {e}",
                config_file.display()
            );
            Ok(())
        }
    }
}

fn console_config(level: LevelFilter) -> Result<LogConfig, Box<dyn Error>> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))?;
    Ok(config)
}
