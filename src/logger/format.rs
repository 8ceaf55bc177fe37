//! Log formatting and console output with ANSI colors

use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::Colorize;

/// Alignment width for the tag bracket
const TAG_WIDTH: usize = 10;

/// Format and print a log line
///
/// Layout: `HH:MM:SS [TAG       ] [LEVEL] message`
pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();
    let tag_str = format!("{:<width$}", tag.as_str(), width = TAG_WIDTH)
        .color(tag.color())
        .to_string();
    let level_str = color_level(level);

    let line = format!("{} [{}] [{}] {}", time.dimmed(), tag_str, level_str, message);
    if level == LogLevel::Error {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

fn color_level(level: LogLevel) -> String {
    match level {
        LogLevel::Error => level.as_str().red().bold().to_string(),
        LogLevel::Warning => level.as_str().yellow().to_string(),
        LogLevel::Info => level.as_str().green().to_string(),
        LogLevel::Debug => level.as_str().cyan().to_string(),
        LogLevel::Verbose => level.as_str().dimmed().to_string(),
    }
}
