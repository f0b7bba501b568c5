use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;

// @module: SRT parsing and rendering

// @const: SRT timestamp line
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2},\d{3})\s+-->\s+(\d{2}:\d{2}:\d{2},\d{3})").unwrap()
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number as found in the file
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, possibly multi-line
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: impl Into<String>) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text: text.into(),
        }
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm`) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
        let invalid = || SubtitleError::InvalidTimestamp(timestamp.to_string());

        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();
        if parts.len() != 4 {
            return Err(invalid());
        }

        let mut values = [0u64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }
        let [hours, minutes, seconds, millis] = values;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(invalid());
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Text with carriage returns removed and outer whitespace trimmed
    pub fn normalised_text(&self) -> String {
        self.text.replace('\r', "").trim().to_string()
    }

    /// Non-blank, trimmed lines of the normalised text
    pub fn dialogue_lines(&self) -> Vec<String> {
        self.normalised_text()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Collection of subtitle entries read from one file
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Entries in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Read and parse an SRT file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;

        let entries = Self::parse_srt_string(&content);
        if entries.is_empty() {
            return Err(SubtitleError::NoEntries(path.display().to_string()).into());
        }
        debug!("Parsed {} subtitle entries from {}", entries.len(), path.display());

        Ok(Self {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Parse SRT content into entries.
    ///
    /// Blocks without text or with an unreadable header are skipped. Entries
    /// keep their file order and original numbering.
    pub fn parse_srt_string(content: &str) -> Vec<SubtitleEntry> {
        let content = content.trim_start_matches('\u{feff}');
        let mut entries = Vec::new();

        // State for the block being read
        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_text = String::new();

        let mut finish_block =
            |seq_num: &mut Option<usize>, times: &mut Option<(u64, u64)>, text: &mut String| {
                if let (Some(num), Some((start_ms, end_ms))) = (*seq_num, *times) {
                    if text.trim().is_empty() {
                        debug!("Skipping empty subtitle entry {}", num);
                    } else {
                        entries.push(SubtitleEntry::new(num, start_ms, end_ms, text.trim()));
                    }
                }
                *seq_num = None;
                *times = None;
                text.clear();
            };

        for (line_idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if current_seq_num.is_some() {
                    finish_block(&mut current_seq_num, &mut current_times, &mut current_text);
                }
                continue;
            }

            if current_seq_num.is_none() {
                match trimmed.parse::<usize>() {
                    Ok(num) => current_seq_num = Some(num),
                    Err(_) => warn!("Unexpected text at line {} before sequence number: {}", line_idx + 1, trimmed),
                }
                continue;
            }

            if current_times.is_none() {
                match Self::parse_timestamp_line(trimmed) {
                    Ok(times) => current_times = Some(times),
                    Err(e) => {
                        warn!("{} (line {})", e, line_idx + 1);
                        current_seq_num = trimmed.parse::<usize>().ok();
                    }
                }
                continue;
            }

            if !current_text.is_empty() {
                current_text.push('\n');
            }
            current_text.push_str(line.trim_end());
        }

        finish_block(&mut current_seq_num, &mut current_times, &mut current_text);
        entries
    }

    /// Parse a `start --> end` line
    fn parse_timestamp_line(line: &str) -> Result<(u64, u64), SubtitleError> {
        let caps = TIMESTAMP_REGEX
            .captures(line)
            .ok_or_else(|| SubtitleError::InvalidTimestamp(line.to_string()))?;

        let start_ms = SubtitleEntry::parse_timestamp(&caps[1])?;
        let end_ms = SubtitleEntry::parse_timestamp(&caps[2])?;
        Ok((start_ms, end_ms))
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())
    }
}

/// One rendered output block: timing plus translated (and optionally original) lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedBlock {
    pub index: usize,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    pub lines: Vec<String>,
}

impl fmt::Display for TranslatedBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(
            f,
            "{} --> {}",
            SubtitleEntry::format_timestamp(self.start_time_ms),
            SubtitleEntry::format_timestamp(self.end_time_ms)
        )?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Render blocks as SRT, separated by blank lines
pub fn render_srt(blocks: &[TranslatedBlock]) -> String {
    blocks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
