use crate::library::logger::interface::{join_namespace, Level, Logger};
use chrono::Utc;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct LoggerConsole {
    namespace: Option<String>,
    timezone: chrono::FixedOffset,
    min_level: Level,
}

impl LoggerConsole {
    pub fn new(timezone: chrono::FixedOffset, min_level: Level) -> Self {
        Self {
            namespace: None,
            timezone,
            min_level,
        }
    }

    fn format_line(&self, level: Level, message: &str) -> String {
        let local_time = Utc::now().with_timezone(&self.timezone);
        let formatted = local_time.format("%Y-%m-%d %I:%M:%S%.3f %p");
        match &self.namespace {
            Some(namespace) => format!("[{}] {} {}: {}", formatted, level, namespace, message),
            None => format!("[{}] {} {}", formatted, level, message),
        }
    }
}

impl Logger for LoggerConsole {
    fn log(&self, level: Level, message: &str) {
        if level < self.min_level {
            return;
        }
        write_line(level, &self.format_line(level, message));
    }

    fn with_namespace(&self, namespace: &str) -> Rc<dyn Logger> {
        Rc::new(LoggerConsole {
            namespace: Some(join_namespace(self.namespace.as_deref(), namespace)),
            timezone: self.timezone,
            min_level: self.min_level,
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn write_line(level: Level, line: &str) {
    let line = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Debug => web_sys::console::debug_1(&line),
        Level::Info => web_sys::console::log_1(&line),
        Level::Warn => web_sys::console::warn_1(&line),
        Level::Error => web_sys::console::error_1(&line),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_line(level: Level, line: &str) {
    match level {
        Level::Warn | Level::Error => eprintln!("{}", line),
        Level::Debug | Level::Info => println!("{}", line),
    }
}
