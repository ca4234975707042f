//! Console logging for the browser build.
//!
//! Events go through `tracing`; in the browser a fmt subscriber writes each
//! formatted line to the devtools console. The level accepts the same spellings
//! as the server verbosity flag: a name (`error` .. `trace`) or a number `0..=4`.

use tracing::Level;

/// Parses a configured log level, returning `None` for unknown values.
pub fn parse_level(value: &str) -> Option<Level> {
    if let Ok(parsed) = value.trim().parse::<u8>() {
        return match parsed {
            0 => Some(Level::ERROR),
            1 => Some(Level::WARN),
            2 => Some(Level::INFO),
            3 => Some(Level::DEBUG),
            4 | 5 => Some(Level::TRACE),
            _ => None,
        };
    }

    match value.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

#[cfg(target_arch = "wasm32")]
pub use console::init;

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io;
    use tracing::Level;
    use tracing_subscriber::{EnvFilter, fmt, fmt::MakeWriter};

    /// Buffers one formatted event and hands it to `console.log` on drop.
    pub struct ConsoleWriter {
        level: Level,
        buffer: Vec<u8>,
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            let line = String::from_utf8_lossy(&self.buffer);
            let line = line.trim_end();
            if line.is_empty() {
                return;
            }
            let value = wasm_bindgen::JsValue::from_str(line);
            match self.level {
                Level::ERROR => web_sys::console::error_1(&value),
                Level::WARN => web_sys::console::warn_1(&value),
                Level::INFO => web_sys::console::info_1(&value),
                _ => web_sys::console::debug_1(&value),
            }
        }
    }

    struct MakeConsoleWriter;

    impl<'a> MakeWriter<'a> for MakeConsoleWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleWriter {
                level: Level::INFO,
                buffer: Vec::new(),
            }
        }

        fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
            ConsoleWriter {
                level: *meta.level(),
                buffer: Vec::new(),
            }
        }
    }

    /// Installs the global subscriber. Calling it twice keeps the first one.
    pub fn init(level: &str) {
        let level = super::parse_level(level).unwrap_or(Level::WARN);

        let subscriber = fmt()
            .with_writer(MakeConsoleWriter)
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_env_filter(
                EnvFilter::builder()
                    .with_default_directive(level.into())
                    .from_env_lossy(),
            )
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}
