use core::fmt::{self, Write};
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use spin::Once;

/// Byte sink the log lines end up on.
pub trait Console: Sync {
    fn write_str(&self, s: &str);
}

static CONSOLE: Once<&'static dyn Console> = Once::new();

struct ConsoleWriter(&'static dyn Console);

impl Write for ConsoleWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

struct El3Logger;

impl log::Log for El3Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record<'_>) {
        let Some(console) = CONSOLE.get() else {
            return;
        };
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut out = ConsoleWriter(*console);
        let _ = if record.metadata().level() <= Level::Warn {
            writeln!(
                out,
                "\x1b[0;31m[{}]{} -- {}\x1b[0m",
                record.level(),
                record.target(),
                record.args()
            )
        } else {
            writeln!(
                out,
                "[{}]{} -- {}",
                record.level(),
                record.target(),
                record.args()
            )
        };
    }

    fn flush(&self) {}
}

static LOGGER: El3Logger = El3Logger;

pub fn register_global_logger(
    maxlevel: LevelFilter,
    console: &'static dyn Console,
) -> Result<(), SetLoggerError> {
    CONSOLE.call_once(|| console);
    log::set_logger(&LOGGER)?;
    log::set_max_level(maxlevel);
    Ok(())
}
