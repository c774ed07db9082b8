/// Structured logging for the COVID-19 statistics service
///
/// Provides context-rich logging with data-source tags, optional context
/// identifiers (a state name, a route), timestamps, and severity levels.
/// Supports console output and file-based logging.
///
/// There is no global logger: components receive an `Arc<dyn LogSink>`,
/// so tests can swap in a `MemoryLogger` and assert on what was logged.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// The Corona Data Scraper feed
    Feed,
    Http,
    Config,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Feed => write!(f, "FEED"),
            DataSource::Http => write!(f, "HTTP"),
            DataSource::Config => write!(f, "CFG"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - upstream reachable but answered with nothing usable
    Expected,
    /// Unexpected failure - indicates service degradation or an API change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a feed failure based on its error message.
pub fn classify_feed_failure(error_message: &str) -> FailureType {
    if error_message.contains("HTTP error") || error_message.contains("timed out") {
        FailureType::Unexpected
    } else if error_message.contains("Parse error") {
        // Malformed JSON usually means the upstream format changed
        FailureType::Unexpected
    } else if error_message.contains("empty") {
        FailureType::Expected
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

/// Destination for log entries. Implementations must be shareable across
/// request handlers.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, source: DataSource, context: Option<&str>, message: &str);

    fn debug(&self, source: DataSource, context: Option<&str>, message: &str) {
        self.log(LogLevel::Debug, source, context, message);
    }

    fn info(&self, source: DataSource, context: Option<&str>, message: &str) {
        self.log(LogLevel::Info, source, context, message);
    }

    fn warn(&self, source: DataSource, context: Option<&str>, message: &str) {
        self.log(LogLevel::Warning, source, context, message);
    }

    fn error(&self, source: DataSource, context: Option<&str>, message: &str) {
        self.log(LogLevel::Error, source, context, message);
    }
}

pub type SharedLogger = Arc<dyn LogSink>;

// ---------------------------------------------------------------------------
// Console / file logger
// ---------------------------------------------------------------------------

pub struct ConsoleLogger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) -> Self {
        ConsoleLogger {
            min_level,
            log_file: log_file.map(String::from),
            console_timestamps,
        }
    }

    pub fn shared(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) -> SharedLogger {
        Arc::new(Self::new(min_level, log_file, console_timestamps))
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

impl LogSink for ConsoleLogger {
    fn log(&self, level: LogLevel, source: DataSource, context: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let context_part = context.map(|c| format!(" [{}]", c)).unwrap_or_default();
        let log_entry = format!("{} {} {}{}: {}", timestamp, level, source, context_part, message);

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, context_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, context_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory logger
// ---------------------------------------------------------------------------

/// One captured log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub source: DataSource,
    pub context: Option<String>,
    pub message: String,
}

/// Sink that keeps every entry in memory so tests can assert on it.
#[derive(Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn count_at(&self, level: LogLevel) -> usize {
        self.entries().iter().filter(|e| e.level == level).count()
    }
}

impl LogSink for MemoryLogger {
    fn log(&self, level: LogLevel, source: DataSource, context: Option<&str>, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                source,
                context: context.map(String::from),
                message: message.to_string(),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a feed failure with automatic classification.
///
/// Always emits exactly one error-level entry: the caller is about to serve
/// a placeholder instead of data, whatever the cause. The classification
/// only tags the message.
pub fn log_feed_failure(logger: &dyn LogSink, url: &str, operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_feed_failure(&error_msg);

    let message = format!(
        "{} failed [{}]: {}",
        operation,
        failure_type,
        error_msg
    );

    logger.error(DataSource::Feed, Some(url), &message);
}

/// Log a summary of one feed ingestion pass.
pub fn log_ingest_summary(logger: &dyn LogSink, total: usize, kept: usize, skipped: usize) {
    let message = format!(
        "Ingest complete: {}/{} records kept, {} malformed records skipped",
        kept,
        total,
        skipped
    );

    if skipped == 0 {
        logger.info(DataSource::Feed, None, &message);
    } else {
        logger.warn(DataSource::Feed, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!(" ERROR ".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(classify_feed_failure("HTTP error: 503"), FailureType::Unexpected);
        assert_eq!(classify_feed_failure("Parse error: expected value"), FailureType::Unexpected);
        assert_eq!(classify_feed_failure("feed returned an empty body"), FailureType::Expected);
        assert_eq!(classify_feed_failure("connection reset"), FailureType::Unknown);
    }

    #[test]
    fn test_memory_logger_records_entries() {
        let logger = MemoryLogger::new();
        logger.info(DataSource::System, None, "starting");
        logger.error(DataSource::Feed, Some("https://example.test"), "boom");

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].level, LogLevel::Error);
        assert_eq!(entries[1].context.as_deref(), Some("https://example.test"));
        assert_eq!(logger.count_at(LogLevel::Error), 1);
    }

    #[test]
    fn test_log_feed_failure_emits_single_entry() {
        #[derive(Debug)]
        struct Boom;
        impl fmt::Display for Boom {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "HTTP error: 500")
            }
        }
        impl std::error::Error for Boom {}

        let logger = MemoryLogger::new();
        log_feed_failure(&logger, "https://example.test/data.json", "Fetch", &Boom);

        assert_eq!(logger.entries().len(), 1);
        assert_eq!(logger.count_at(LogLevel::Error), 1);
        assert!(logger.entries()[0].message.contains("UNEXPECTED"));
    }

    #[test]
    fn test_ingest_summary_level_depends_on_skips() {
        let logger = MemoryLogger::new();
        log_ingest_summary(&logger, 10, 10, 0);
        log_ingest_summary(&logger, 10, 8, 2);
        assert_eq!(logger.count_at(LogLevel::Info), 1);
        assert_eq!(logger.count_at(LogLevel::Warning), 1);
    }
}
