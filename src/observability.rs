// In: src/observability.rs

//! The crate's logger hook.
//!
//! Everything in the bridge logs through the `log` facade. Nothing is printed
//! until a host application installs a logger, either its own or the one below.

use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

use crate::error::SimplaceError;

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` at `Info` level that prints `[LEVEL] message`.
///
/// With `log_file` set, records are appended to that file instead of stderr.
/// Only the first call in a process has any effect; if another logger is
/// already installed, this one is silently skipped.
pub fn enable_verbose_logging(log_file: Option<&Path>) -> Result<(), SimplaceError> {
    // Opened outside `call_once` so a bad path surfaces as an error.
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);

        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
