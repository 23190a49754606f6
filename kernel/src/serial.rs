//! Serial console and kernel logger.
//!
//! This module provides serial console output using the 16550 UART on
//! COM1, and a [`log::Log`] implementation on top of it. On hosted builds
//! there is no port and output is discarded.

use core::fmt;
use core::fmt::Write;

use log::{Level, Log, Metadata, Record, SetLoggerError};

use crate::config::LOG_LEVEL;

#[cfg(target_os = "none")]
mod port {
    use spin::Mutex;
    use uart_16550::SerialPort;

    use crate::config::DEBUG_SERIAL_PORT;

    /// Global serial port (COM1).
    static SERIAL1: Mutex<Option<SerialPort>> = Mutex::new(None);

    pub fn init() {
        let mut port = unsafe { SerialPort::new(DEBUG_SERIAL_PORT) };
        port.init();
        *SERIAL1.lock() = Some(port);
    }

    pub fn write_str(s: &str) {
        // Disable interrupts to prevent deadlock
        x86_64::instructions::interrupts::without_interrupts(|| {
            if let Some(ref mut serial) = *SERIAL1.lock() {
                for byte in s.bytes() {
                    serial.send(byte);
                }
            }
        });
    }
}

#[cfg(not(target_os = "none"))]
mod port {
    pub fn init() {}

    pub fn write_str(_s: &str) {}
}

/// Serial writer for formatting.
pub struct SerialWriter;

impl fmt::Write for SerialWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        #[cfg(feature = "serial-console")]
        port::write_str(s);
        Ok(())
    }
}

/// Print macro for serial output.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::serial::_print(format_args!($($arg)*));
    };
}

/// Println macro for serial output.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => {
        $crate::serial_print!("{}\n", format_args!($($arg)*));
    };
}

/// Internal print function.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    // SerialWriter never fails.
    let _ = SerialWriter.write_fmt(args);
}

/// `log` backend writing `[LEVEL] target: message` lines to the serial
/// console.
pub struct SerialLogger {
    level: Level,
}

impl SerialLogger {
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    fn prefix(level: Level) -> &'static str {
        match level {
            Level::Trace => "[TRACE]",
            Level::Debug => "[DEBUG]",
            Level::Info => "[INFO ]",
            Level::Warn => "[WARN ]",
            Level::Error => "[ERROR]",
        }
    }
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            serial_println!(
                "{} {}: {}",
                Self::prefix(record.level()),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger::new(LOG_LEVEL);

/// Initialize the serial port and install [`SerialLogger`] as the global
/// logger.
pub fn init() -> Result<(), SetLoggerError> {
    port::init();
    log::set_logger(&LOGGER)?;
    log::set_max_level(LOG_LEVEL.to_level_filter());
    Ok(())
}
