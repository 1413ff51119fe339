use std::time::Duration;

use crate::cli::{BufferSummary, DecodeSummary, StreamReport};
use crate::config::StreamerConfig;
use crate::error::{ErrorSeverity, StreamError};

/// Output formatting for the CLI
pub struct StreamDisplay;

impl StreamDisplay {
    /// Display what `info` found in a stream
    pub fn display_report(report: &StreamReport) {
        println!("┌─ Stream Information ────────────────────────────────────┐");
        println!("│ Format: {}", report.info.describe());
        println!("│ Header: {}", Self::format_file_size(report.header_len as u64));
        println!("│ Buffer: {}", Self::format_file_size(report.buffer_size as u64));
        println!("│ Vendor: {}", Self::truncate(&report.vendor, 48));
        for (key, value) in &report.comments {
            println!("│ {}: {}", key, Self::truncate(value, 50));
        }
        println!("└─────────────────────────────────────────────────────────┘");
    }

    pub fn display_decode_summary(summary: &DecodeSummary) {
        println!(
            "Decoded {} ({}) of {}",
            Self::format_file_size(summary.bytes_written),
            Self::format_duration(summary.info.duration_of(summary.bytes_written as usize)),
            summary.info.describe()
        );
        println!("{}", summary.stats.format_summary());
    }

    pub fn display_buffer_summary(summary: &BufferSummary) {
        match &summary.info {
            Some(info) => println!(
                "Buffered {} of PCM ({}, {})",
                Self::format_file_size(summary.bytes as u64),
                Self::format_duration(info.duration_of(summary.bytes)),
                info.describe()
            ),
            None => println!("Buffered {} of raw data", Self::format_file_size(summary.bytes as u64)),
        }
    }

    pub fn display_config(config: &StreamerConfig) {
        println!("min_buffer_size = {}", config.min_buffer_size);
        println!("max_buffer_size = {}", config.max_buffer_size);
        println!("read_size = {}", config.read_size);
        println!("log_level = \"{}\"", config.log_level);
    }

    /// Display error message with severity and suggestions
    pub fn display_error(error: &StreamError) {
        let severity = error.severity();
        let severity_icon = match severity {
            ErrorSeverity::Info => "ℹ",
            ErrorSeverity::Warning => "⚠",
            ErrorSeverity::Error => "✗",
            ErrorSeverity::Critical => "🔥",
        };

        eprintln!("┌─ {} {} ─────────────────────────────────────────────────┐", severity_icon, severity.as_str());

        for line in Self::wrap_text(&error.user_message(), 55) {
            eprintln!("│ {}", line);
        }

        let suggestions = error.recovery_suggestions();
        if !suggestions.is_empty() {
            eprintln!("│");
            eprintln!("│ Suggestions:");
            for suggestion in suggestions.iter().take(3) {
                for line in Self::wrap_text(&format!("• {}", suggestion), 53) {
                    eprintln!("│   {}", line);
                }
            }
        }

        eprintln!("└─────────────────────────────────────────────────────────┘");
    }

    fn wrap_text(text: &str, width: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current_line = String::new();

        for word in text.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.len() + word.len() + 1 <= width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(current_line);
                current_line = word.to_string();
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }

        lines
    }

    /// Truncate string to fit display width
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        }
    }

    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{:02}:{:02}", minutes, seconds)
        }
    }

    /// Format byte counts in human-readable format
    pub fn format_file_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size_f = size as f64;
        let mut unit_index = 0;

        while size_f >= 1024.0 && unit_index < UNITS.len() - 1 {
            size_f /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size, UNITS[unit_index])
        } else {
            format!("{:.1} {}", size_f, UNITS[unit_index])
        }
    }
}
