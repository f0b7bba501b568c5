/*!
 * Tests for context selection through the public translation API
 */

use subctx::translation::{ContextWindow, SubtitleHistory, TruncationMode, estimate_token_count};

fn history_of(lines: &[&str]) -> SubtitleHistory {
    let mut history = SubtitleHistory::new();
    for line in lines {
        history.add(*line);
    }
    history
}

#[test]
fn test_estimateTokenCount_multibyteText_shouldCountCharacters() {
    assert_eq!(estimate_token_count(""), 0);
    assert_eq!(estimate_token_count("abc"), 0);
    assert_eq!(estimate_token_count("abcdefgh"), 2);
    // 8 characters, 24 bytes
    assert_eq!(estimate_token_count("日本語のテキスト"), 2);
}

#[test]
fn test_history_afterAddAndShrink_shouldHoldNoEmptyAndRespectTarget() {
    let mut history = SubtitleHistory::new();
    let mut last_target = usize::MAX;

    for round in 0..50usize {
        history.add(format!("line {}", round));
        history.add("");
        if round % 7 == 0 {
            last_target = 5 + round % 3;
            history.shrink(last_target);
            assert!(history.len() <= last_target);
        }
    }

    assert!(history.entries().all(|entry| !entry.is_empty()));
    let newest: Vec<&str> = history.entries().collect();
    assert_eq!(newest.last().copied(), Some("line 49"));
    assert!(last_target < usize::MAX);
}

#[test]
fn test_iterRecent_shouldSkipCurrentAndBeRestartable() {
    let history = history_of(&["first", "second", "current"]);

    let once: Vec<&str> = history.iter_recent().collect();
    let twice: Vec<&str> = history.iter_recent().collect();

    assert_eq!(once, vec!["second", "first"]);
    assert_eq!(once, twice);
    assert_eq!(history_of(&["only"]).iter_recent().count(), 0);
}

#[test]
fn test_buildSegments_droppedEntries_shouldKeepChronologicalOrder() {
    let lines: Vec<String> = (0..20).map(|i| format!("dialogue line number {:02}", i)).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let history = history_of(&refs);

    for budget in [0, 6, 12, 30, 60, 6000] {
        let window = ContextWindow::new(budget, TruncationMode::DropOldest);
        let segments = window.build_segments(&history, &lines[19], 128000);

        let positions: Vec<usize> = segments
            .iter()
            .map(|segment| lines.iter().position(|line| line == segment).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "budget {}", budget);
        assert!(!segments.contains(&lines[19]));
    }
}

#[test]
fn test_buildSegments_helloScenario_shouldHaveNoContext() {
    let history = history_of(&["Hello"]);
    let window = ContextWindow::new(6000, TruncationMode::DropOldest);

    assert!(window.build_segments(&history, "Hello", 4096).is_empty());
}

#[test]
fn test_buildSegments_smartTrimExactOverflow_shouldKeepSizedSuffix() {
    // The oldest line costs 3 tokens and only 2 remain after the newer one
    let history = history_of(&["abcdefghijkl", "wxyz", "current"]);

    let trim = ContextWindow::new(3, TruncationMode::SmartTrim);
    let drop = ContextWindow::new(3, TruncationMode::DropOldest);

    assert_eq!(trim.build_segments(&history, "current", 4096), vec!["efghijkl", "wxyz"]);
    assert_eq!(drop.build_segments(&history, "current", 4096), vec!["wxyz"]);
}
