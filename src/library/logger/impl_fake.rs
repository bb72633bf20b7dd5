use crate::library::logger::interface::{join_namespace, Level, Logger};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub level: Level,
    pub namespace: Option<String>,
    pub message: String,
}

/// Records every line so tests can assert on what was reported.
#[derive(Debug, Clone, Default)]
pub struct LoggerFake {
    namespace: Option<String>,
    lines: Rc<RefCell<Vec<LogLine>>>,
}

impl LoggerFake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.borrow().clone()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .borrow()
            .iter()
            .any(|line| line.level == level && line.message.contains(needle))
    }

    pub fn count(&self, level: Level) -> usize {
        self.lines
            .borrow()
            .iter()
            .filter(|line| line.level == level)
            .count()
    }
}

impl Logger for LoggerFake {
    fn log(&self, level: Level, message: &str) {
        self.lines.borrow_mut().push(LogLine {
            level,
            namespace: self.namespace.clone(),
            message: message.to_string(),
        });
    }

    fn with_namespace(&self, namespace: &str) -> Rc<dyn Logger> {
        Rc::new(LoggerFake {
            namespace: Some(join_namespace(self.namespace.as_deref(), namespace)),
            lines: self.lines.clone(),
        })
    }
}
