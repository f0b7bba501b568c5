use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::TranslationEndpoint;
use crate::subtitle_processor::{SubtitleCollection, TranslatedBlock, render_srt};
use crate::translation::{SubtitleTranslator, TranslationStats};

// @module: Application controller for subtitle files

/// Outcome of translating one file
#[derive(Debug, Clone)]
pub struct TranslationReport {
    pub output_path: PathBuf,
    pub blocks_written: usize,
    pub stats: TranslationStats,
    pub elapsed: Duration,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(mut config: Config) -> Result<Self> {
        config.normalise_languages();
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate `input_file` and write the result to `output_file`.
    ///
    /// One translator session is used for the whole file so context carries
    /// across entries. The first failed line aborts the run and nothing is
    /// written.
    pub async fn translate_file(&self, input_file: &Path, output_file: &Path, include_original: bool) -> Result<TranslationReport> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(AppError::File(format!("Input subtitle file does not exist: {}", input_file.display())).into());
        }
        let subtitles = SubtitleCollection::load(input_file)?;

        info!(
            "Translating {} entries from {} to {} with {}",
            subtitles.entries.len(),
            language_utils::display_name(&self.config.source_language),
            language_utils::display_name(&self.config.target_language),
            self.config.model
        );

        let mut translator = SubtitleTranslator::from_config(&self.config);
        let progress_bar = Self::create_progress_bar(subtitles.entries.len() as u64);
        let outcome = Self::translate_collection(&mut translator, &subtitles, include_original, &progress_bar).await;
        progress_bar.finish_and_clear();
        let blocks = outcome.map_err(AppError::from)?;

        FileManager::write_to_file(output_file, &render_srt(&blocks))?;

        let elapsed = start_time.elapsed();
        info!("{}", translator.stats().summary());
        info!("Success: {} ({})", output_file.display(), Self::format_duration(elapsed));

        Ok(TranslationReport {
            output_path: output_file.to_path_buf(),
            blocks_written: blocks.len(),
            stats: translator.stats().clone(),
            elapsed,
        })
    }

    /// Translate every entry in order, numbering output blocks from 1.
    ///
    /// Entries whose normalised text is empty are skipped and take no number.
    pub async fn translate_collection<E: TranslationEndpoint>(
        translator: &mut SubtitleTranslator<E>,
        subtitles: &SubtitleCollection,
        include_original: bool,
        progress_bar: &ProgressBar,
    ) -> Result<Vec<TranslatedBlock>, crate::errors::ApiError> {
        let mut blocks = Vec::with_capacity(subtitles.entries.len());

        for entry in &subtitles.entries {
            progress_bar.inc(1);

            let text = entry.normalised_text();
            if text.is_empty() {
                debug!("Skipping empty entry {}", entry.seq_num);
                continue;
            }

            let result = translator.translate(&text).await?;

            let mut lines = vec![result.translated];
            if include_original {
                lines.extend(entry.dialogue_lines());
            }

            blocks.push(TranslatedBlock {
                index: blocks.len() + 1,
                start_time_ms: entry.start_time_ms,
                end_time_ms: entry.end_time_ms,
                lines,
            });
        }

        Ok(blocks)
    }

    fn create_progress_bar(len: u64) -> ProgressBar {
        let progress_bar = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lines ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");
        progress_bar
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
