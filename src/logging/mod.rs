use log::{Level, LevelFilter, Log, Metadata, Record};

/// `log` sink writing to the browser console.
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

        let line = format_line(record.level(), record.target(), &record.args().to_string());
        let msg = wasm_bindgen::JsValue::from_str(&line);
        match record.level() {
            Level::Error => web_sys::console::error_1(&msg),
            Level::Warn => web_sys::console::warn_1(&msg),
            Level::Info => web_sys::console::info_1(&msg),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

pub(crate) fn format_line(level: Level, target: &str, message: &str) -> String {
    let target = target.strip_prefix("todo_manager::").unwrap_or(target);
    format!("[{level}] [{target}] {message}")
}

/// Installs the console logger. Later calls only adjust the level.
pub(crate) fn init(max_level: LevelFilter) {
    install(&LOGGER, max_level);
}

/// Returns whether `logger` became the global logger.
fn install(logger: &'static dyn Log, max_level: LevelFilter) -> bool {
    let installed = log::set_logger(logger).is_ok();
    log::set_max_level(max_level);
    if !installed {
        log::debug!("logger already installed, level now {max_level}");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullLogger;

    impl Log for NullLogger {
        fn enabled(&self, _: &Metadata) -> bool {
            false
        }

        fn log(&self, _: &Record) {}

        fn flush(&self) {}
    }

    static NULL: NullLogger = NullLogger;

    #[test]
    fn test_second_install_only_changes_level() {
        install(&NULL, LevelFilter::Debug);
        assert!(!install(&NULL, LevelFilter::Warn));
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_format_line_shortens_crate_targets() {
        assert_eq!(
            format_line(Level::Warn, "todo_manager::todos::list", "fetch failed"),
            "[WARN] [todos::list] fetch failed"
        );
        assert_eq!(
            format_line(Level::Info, "reqwest", "x"),
            "[INFO] [reqwest] x"
        );
    }
}
