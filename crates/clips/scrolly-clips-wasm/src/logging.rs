//! `log` records routed to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = debug)]
    fn console_debug(s: &str);
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    fn console_log(s: &str);
    #[wasm_bindgen(js_namespace = console, js_name = warn)]
    fn console_warn(s: &str);
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    fn console_error(s: &str);
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        match record.level() {
            Level::Error => console_error(&line),
            Level::Warn => console_warn(&line),
            Level::Info => console_log(&line),
            Level::Debug | Level::Trace => console_debug(&line),
        }
    }

    fn flush(&self) {}
}

pub(crate) fn parse_level(level: Option<&str>) -> Result<LevelFilter, String> {
    match level {
        None => Ok(LevelFilter::Info),
        Some(s) => s
            .parse::<LevelFilter>()
            .map_err(|_| format!("unknown log level '{s}'")),
    }
}

/// Install the console logger. Later calls only change the level.
pub(crate) fn install(filter: LevelFilter) {
    // Already installed by an earlier call; keep that logger.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(filter);
}
