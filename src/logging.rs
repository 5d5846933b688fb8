// Copyright (c) 2026 rezky_nightky

//! File logging. The terminal is in raw alternate-screen mode while the rain
//! runs, so log lines only go to a file.

use std::path::Path;

use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {t} {m}{n}";

pub fn init_file_log(level: LevelFilter, path: &Path) -> Result<(), String> {
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(path)
        .map_err(|e| format!("failed to open log file {}: {}", path.display(), e))?;
    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(level)))
                .build("logfile", Box::new(logfile)),
        )
        .build(Root::builder().appender("logfile").build(level))
        .map_err(|e| format!("invalid log config: {}", e))?;
    log4rs::init_config(config).map_err(|e| format!("failed to install logger: {}", e))?;
    Ok(())
}
