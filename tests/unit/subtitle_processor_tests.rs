/*!
 * Tests for SRT loading and rendering
 */

use anyhow::Result;

use subctx::subtitle_processor::{SubtitleCollection, SubtitleEntry, TranslatedBlock, render_srt};
use crate::common;

#[test]
fn test_load_sampleFile_shouldParseAllEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;

    let collection = SubtitleCollection::load(&path)?;

    assert_eq!(collection.entries.len(), 3);
    assert_eq!(collection.entries[1].normalised_text(), "It contains\nmultiple lines.");
    assert_eq!(SubtitleEntry::format_timestamp(collection.entries[2].start_time_ms), "00:00:10,000");
    Ok(())
}

#[test]
fn test_load_windowsLineEndings_shouldNormalise() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "1\r\n00:00:01,000 --> 00:00:02,000\r\n  Hola  \r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nAdiós\r\n";
    let path = common::create_test_file(temp_dir.path(), "crlf.srt", content)?;

    let collection = SubtitleCollection::load(&path)?;

    let texts: Vec<String> = collection.entries.iter().map(SubtitleEntry::normalised_text).collect();
    assert_eq!(texts, vec!["Hola", "Adiós"]);
    Ok(())
}

#[test]
fn test_load_noEntries_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "empty.srt", "\n\n")?;

    let err = SubtitleCollection::load(&path).unwrap_err();
    assert!(err.to_string().contains("No subtitle entries"));
    Ok(())
}

#[test]
fn test_renderSrt_thenParse_shouldKeepTimings() {
    let blocks = vec![
        TranslatedBlock {
            index: 1,
            start_time_ms: 61_000,
            end_time_ms: 62_500,
            lines: vec!["Bonjour".to_string(), "Hello".to_string()],
        },
        TranslatedBlock {
            index: 2,
            start_time_ms: 3_600_000,
            end_time_ms: 3_601_000,
            lines: vec!["Au revoir".to_string()],
        },
    ];

    let parsed = SubtitleCollection::parse_srt_string(&render_srt(&blocks));

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].start_time_ms, 61_000);
    assert_eq!(parsed[0].dialogue_lines(), vec!["Bonjour", "Hello"]);
    assert_eq!(SubtitleEntry::format_timestamp(parsed[1].end_time_ms), "01:00:01,000");
}

#[test]
fn test_load_missingFile_shouldReportPath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("missing.srt");

    let err = SubtitleCollection::load(&path).unwrap_err();

    assert!(err.to_string().contains("does not exist"));
    assert!(err.to_string().contains("missing.srt"));
    Ok(())
}
