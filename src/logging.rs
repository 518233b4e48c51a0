//! Logger setup.
//!
//! Diagnostics go through the [`log`] facade; [`init`] routes them to stderr
//! through a [`fern`] dispatcher with a wall-clock timestamp on every line.

use log::LevelFilter;

use crate::error::Result;

/// Builds the dispatcher without installing it.
fn dispatch(level: LevelFilter, output: impl Into<fern::Output>) -> fern::Dispatch {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(output)
}

/// Installs the global logger, writing everything at `level` or above to stderr.
pub fn init(level: LevelFilter) -> Result<()> {
    dispatch(level, std::io::stderr()).apply()?;
    log::debug!("logger ready at {level}");
    Ok(())
}
