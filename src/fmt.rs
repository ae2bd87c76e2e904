//! Multi-line, aligned pretty-printing of decoded structures.

#[derive(Debug, Clone)]
pub enum LogOutput {
    Log(log::Level),
    LogTarget(log::Level, String),
    StdOut,
    StdErr,
    #[cfg(feature = "log-to-file")]
    File(std::sync::Arc<parking_lot::Mutex<std::fs::File>>),
}

impl From<log::Level> for LogOutput {
    fn from(value: log::Level) -> Self {
        Self::Log(value)
    }
}

impl LogOutput {
    fn print(&self, msg: &str) {
        match self {
            LogOutput::Log(level) => log::log!(*level, "{}", msg),
            LogOutput::LogTarget(level, target) => {
                log::log!(target: target, *level, "{}", msg)
            }
            LogOutput::StdOut => println!("{}", msg),
            LogOutput::StdErr => eprintln!("{}", msg),
            #[cfg(feature = "log-to-file")]
            LogOutput::File(file) => {
                use std::io::Write;

                let mut file = file.lock();
                if let Err(e) = writeln!(file, "{msg}") {
                    log::warn!("Failed to write log line to file: {e}");
                }
            }
        }
    }
}

/// One line of a [`Loggable`] rendering: a title at an indentation
/// level, with an optional value.
#[derive(Debug, Clone, PartialEq)]
pub struct LogItem {
    level: usize,
    title: String,
    value: Option<String>,
}

impl LogItem {
    pub fn new<T: ToString>(level: usize, title: T, value: Option<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            value,
        }
    }
}

impl<T: ToString, V: ToString> From<(usize, T, V)> for LogItem {
    fn from((level, title, value): (usize, T, V)) -> Self {
        Self::new(level, title, Some(value.to_string()))
    }
}

/// Renders [`LogItem`]s, aligning the values of consecutive
/// items at the same level.
pub struct Logger;

impl Logger {
    pub fn log<T>(output: &LogOutput, loggable: &T)
    where
        T: Loggable,
    {
        Self::render(&loggable.as_log())
            .iter()
            .for_each(|line| output.print(line));
    }

    pub fn render(items: &[LogItem]) -> Vec<String> {
        let mut lines = Vec::with_capacity(items.len());
        let mut group_start = 0;

        while group_start < items.len() {
            let level = items[group_start].level;
            let group_end = items[group_start..]
                .iter()
                .position(|i| i.level != level)
                .map(|p| group_start + p)
                .unwrap_or(items.len());

            let group = &items[group_start..group_end];
            let align = group
                .iter()
                .filter(|i| i.value.is_some())
                .map(|i| i.title.len())
                .max()
                .unwrap_or(0);

            for item in group {
                let indent = " ".repeat(item.level * 2);
                let line = match &item.value {
                    Some(value) => {
                        let padding = " ".repeat(align - item.title.len());
                        format!("{indent}{}: {padding}{value}", item.title)
                    }
                    None => format!("{indent}{}", item.title),
                };
                lines.push(line);
            }

            group_start = group_end;
        }

        lines
    }
}

pub trait Loggable {
    fn as_log(&self) -> Vec<LogItem>;
}

/// Build a `Vec<LogItem>` from `(level, title)` and `(level, title, value)` tuples.
#[macro_export]
macro_rules! log_vec {
    (@value) => {
        None
    };

    (@value $value:expr) => {
        Some($value.to_string())
    };

    [$(($level:literal, $title:expr $(, $value:expr)?)),* $(,)?] => {
        vec![$($crate::LogItem::new($level, $title, $crate::log_vec!(@value $($value)?))),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_values_per_level() {
        let items = log_vec![
            (0, "SEL information"),
            (1, "Version", "1.5"),
            (1, "Number of entries", 12),
            (2, "Nested", true),
            (1, "Free space", "1024 bytes"),
        ];

        assert_eq!(
            Logger::render(&items),
            vec![
                "SEL information",
                "  Version:           1.5",
                "  Number of entries: 12",
                "    Nested: true",
                "  Free space: 1024 bytes",
            ]
        );
    }
}
