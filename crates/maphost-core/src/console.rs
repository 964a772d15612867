//! Forwards the hosted page's console output into tracing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Tip,
    Log,
    Warning,
    Error,
    Debug,
}

impl ConsoleLevel {
    pub fn tracing_level(self) -> tracing::Level {
        match self {
            ConsoleLevel::Tip => tracing::Level::INFO,
            ConsoleLevel::Log => tracing::Level::TRACE,
            ConsoleLevel::Warning => tracing::Level::WARN,
            ConsoleLevel::Error => tracing::Level::ERROR,
            ConsoleLevel::Debug => tracing::Level::DEBUG,
        }
    }
}

pub fn format_message(source: &str, line: u32, message: &str) -> String {
    format!("{source}:{line} - {message}")
}

pub fn forward(level: ConsoleLevel, source: &str, line: u32, message: &str) {
    let text = format_message(source, line, message);
    match level {
        ConsoleLevel::Error => tracing::error!(target: "web_console", "{text}"),
        ConsoleLevel::Warning => tracing::warn!(target: "web_console", "{text}"),
        ConsoleLevel::Tip => tracing::info!(target: "web_console", "{text}"),
        ConsoleLevel::Debug => tracing::debug!(target: "web_console", "{text}"),
        ConsoleLevel::Log => tracing::trace!(target: "web_console", "{text}"),
    }
}
